#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::Result;
use biotools_curator::cli::{Cli, Commands};
use biotools_curator::config::Config;
use biotools_curator::{observability, pipeline};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Run(args) => {
            args.apply_overrides(&mut config);
            config.validate()?;
            observability::init_tracing(&config.observability, cli.verbose);

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, stopping after in-flight candidates");
                    on_signal.cancel();
                }
            });

            let summary = pipeline::run(&config, args.request(), cancel).await?;
            println!(
                "{} records written to {}{}",
                summary.records_written,
                summary.report,
                if summary.cancelled { " (cancelled)" } else { "" }
            );
            Ok(())
        }
    }
}
