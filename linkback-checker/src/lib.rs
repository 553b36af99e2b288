pub mod check;
pub mod error;
pub mod fetch;
pub mod locate;
pub mod render;
pub mod result;
pub mod runner;
pub mod scan;

pub use check::check_site;
pub use error::CheckError;
pub use render::Renderer;
pub use result::{CheckOutcome, SiteStatus};
pub use runner::CheckRunner;
pub use scan::TargetIdentity;
