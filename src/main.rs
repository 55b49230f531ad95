//! zipapp_bundler - packages a Python project into an executable zipapp.

use owo_colors::{OwoColorize, Stream};
use std::process;
use zipapp_bundler::cli;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!(
                "{} {}",
                "Error:".if_supports_color(Stream::Stderr, |s| s.red()),
                e
            );
            for suggestion in e.recovery_suggestions() {
                eprintln!("  {suggestion}");
            }
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
