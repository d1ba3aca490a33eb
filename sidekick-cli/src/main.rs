//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = sidekick_cli::init_logging() {
        eprintln!("sidekick: {err}");
    }
    if let Err(err) = sidekick_cli::run() {
        eprintln!("sidekick: {err}");
        std::process::exit(1);
    }
}
