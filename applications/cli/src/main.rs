/// Budget Tracker - command-line front end
use budget_cli::{execute, open_store, render_failure, Cli, CliConfig};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budget=info,budget_cli=info,budget_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let store = open_store(&config, cli.data_dir)?;

    let result = execute(&store, cli.command, chrono::Utc::now());
    store.flush();

    match result {
        Ok(rendered) => {
            println!("{}", rendered.render(cli.json));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}", render_failure(&e, cli.json));
            Ok(ExitCode::FAILURE)
        }
    }
}
