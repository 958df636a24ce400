use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetscribe::cli::{Cli, Commands};
use sheetscribe::config::Config;
use sheetscribe::pipeline::SummaryPipeline;
use sheetscribe::utils;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "sheetscribe=debug"
    } else {
        "sheetscribe=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run { dry_run, limit } => {
            let config = Config::load()?;
            let pipeline = SummaryPipeline::new(&config)
                .await?
                .show_progress(!cli.quiet);

            if dry_run {
                let worklist = pipeline.scan().await?;
                if worklist.is_empty() {
                    println!("No new URLs to process");
                } else {
                    println!("{} row(s) would be processed:", worklist.len());
                    for entry in &worklist {
                        let domain = utils::extract_domain(&entry.url)
                            .unwrap_or_else(|| "?".to_string());
                        println!("  row {:>4}  [{}] {}", entry.row, domain, entry.url);
                    }
                }
                return Ok(());
            }

            let summary = pipeline.run(limit).await;
            println!(
                "Processed {} of {} row(s), {} error(s)",
                summary.processed, summary.discovered, summary.errors
            );
        }
        Commands::Config { show } => {
            if show {
                let config = Config::load()?;
                config.display();
            } else {
                match Config::config_path() {
                    Some(path) => println!("Config file: {}", path.display()),
                    None => println!("No config directory available; using environment variables only"),
                }
                println!("Secrets are read from the environment (see README)");
            }
        }
        Commands::Platforms => {
            println!("Supported platforms:");
            for domain in utils::supported_domains() {
                println!("  • {}", domain);
            }
        }
    }

    Ok(())
}
