use clap::Parser;
use taskmate::cli::commands::Cli;
use taskmate::cli::handlers;
use taskmate::io::config_io;
use taskmate::logging::{self, LogTarget};
use taskmate::tui;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config_io::read_config()?;
    if let Some(url) = cli.base_url {
        config.server.base_url = url;
    }

    // The TUI owns the terminal, so by default it logs to a file
    let is_tui = cli.command.is_none();
    let target = match cli.log.as_deref() {
        Some(value) => value.parse::<LogTarget>().unwrap_or(LogTarget::Off),
        None if is_tui => LogTarget::File(tui::app::default_log_path()),
        None => LogTarget::Stderr,
    };
    let quiet_default = if is_tui { "taskmate=info" } else { "warn" };
    let filter = logging::build_filter(config.log.filter.as_deref(), cli.verbose, quiet_default);
    logging::init(&target, filter)?;

    match cli.command {
        None => tui::run(&config).await,
        Some(command) => handlers::dispatch(command, cli.json, &config).await,
    }
}
