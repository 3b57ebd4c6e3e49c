pub mod completion;
pub mod config;
pub mod rank;
pub mod suggest;

use colored::Colorize;

pub fn print_version() {
    println!(
        "{} {}",
        "saferide".bold(),
        env!("CARGO_PKG_VERSION").green()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION").dimmed());
}
