use clap::Parser;
use colored::Colorize;
use dc_harness::Cli;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = dc_harness::entry(&cli) {
        eprintln!("❌ {}: {}", "ERROR".red().bold(), err.to_string().red());
        std::process::exit(1);
    }
}
