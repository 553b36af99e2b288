// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export the handler entry points for convenience
pub use handlers::{handle_check, resolve_links_path};
