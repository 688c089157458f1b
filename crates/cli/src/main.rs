mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magima_cli::{Cli, Commands};
use magima_pipeline::PipelineConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "magima_cli=info,magima_pipeline=info,magima_core=warn",
        1 => "magima_cli=debug,magima_pipeline=debug,magima_core=info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let pipeline = cli.endpoints.apply_to(PipelineConfig::from_env());

    match cli.command {
        Commands::Generate(args) => commands::generate::run(args, &pipeline).await,
        Commands::Warmup => commands::warmup::run(&pipeline).await,
        Commands::Presets => {
            commands::presets::run();
            Ok(())
        }
    }
}
