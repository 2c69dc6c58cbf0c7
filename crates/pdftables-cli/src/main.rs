mod cli;
mod page_range;
mod shared;
mod tables_cmd;
mod template_cmd;

use std::io::IsTerminal;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

/// Send core diagnostics to stderr. `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Tables {
            ref file,
            ref pages,
            ref format,
            ref detection,
        } => tables_cmd::run(file, pages.as_deref(), format, detection),
        cli::Commands::Template {
            ref file,
            ref template,
            ref pages,
            ref format,
        } => template_cmd::run(file, template, pages.as_deref(), format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
