pub mod config;
pub mod report;
pub mod run;

use colored::Colorize;

pub fn print_banner() {
    println!();
    println!(
        "  {}  {}",
        "linkback".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  {}", "do your friends still link back?".dimmed());
    println!();
}
