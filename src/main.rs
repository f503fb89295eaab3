use std::process::ExitCode;

use clap::Parser;
use figma_tokens::{dry_run, run, Cli, FigmaClient, ImportError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("figma_tokens=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut out = std::io::stdout();
    let result = if cli.dry_run {
        dry_run(&cli, &mut out).map(|_| ())
    } else {
        run(&cli, FigmaClient::new, &mut out).await.map(|_| ())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn report(err: &ImportError) {
    tracing::debug!(error = ?err, "import failed");
    eprintln!("\n  Error: {err}\n");
    for hint in err.hints() {
        eprintln!("  {hint}");
    }
    eprintln!();
}
