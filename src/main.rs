use clap::{Parser, Subcommand};
use flyer_sync::config::Config;
use flyer_sync::contacts::InMemoryContactBook;
use flyer_sync::extraction::FlyerExtractor;
use flyer_sync::logging::init_logging;
use flyer_sync::sync::SyncOrchestrator;
use flyer_sync::transport::RetryingClient;
use flyer_sync::types::SyncStatus;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "flyer_sync")]
#[command(about = "Extract events from a flyer photo and sync them to the calendar store")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract events from a flyer image and print them as JSON
    Extract {
        /// Path to the flyer image (JPEG)
        #[arg(long)]
        image: PathBuf,
    },
    /// Extract events and sync each one to the remote calendar store
    Run {
        /// Path to the flyer image (JPEG)
        #[arg(long)]
        image: PathBuf,
        /// Optional TOML contact book with [[contacts]] entries
        #[arg(long)]
        contacts: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let transport = RetryingClient::new(&config.transport)?;
    let extractor = FlyerExtractor::new(
        transport.clone(),
        config.extraction.endpoint.clone(),
        config.api_key()?,
    );

    match cli.command {
        Commands::Extract { image } => {
            let bytes = std::fs::read(&image)?;
            info!(image = %image.display(), "extracting events");
            let records = extractor.extract(&bytes).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Run { image, contacts } => {
            let bytes = std::fs::read(&image)?;
            info!(image = %image.display(), "extracting events");
            let mut records = extractor.extract(&bytes).await?;

            let book = match contacts {
                Some(path) => InMemoryContactBook::load_from(
                    path.to_str()
                        .ok_or_else(|| anyhow::anyhow!("contact book path is not valid UTF-8"))?,
                )?,
                None => InMemoryContactBook::default(),
            };

            let orchestrator =
                SyncOrchestrator::new(transport, config.sync.endpoint.clone(), Arc::new(book));
            let report = orchestrator.sync_all(&mut records).await;

            println!("\n📊 Sync results:");
            println!("   Total events: {}", records.len());
            println!("   Synced: {}", report.success_count);
            println!("   Failed: {}", report.fail_count);
            for record in &records {
                match &record.status {
                    SyncStatus::Success => println!(
                        "   ✅ {} ({}) -> page {}",
                        record.main_artist,
                        record.date,
                        record.page_id.as_deref().unwrap_or("?")
                    ),
                    SyncStatus::Failed(reason) => {
                        println!("   ❌ {} ({}): {}", record.main_artist, record.date, reason)
                    }
                    SyncStatus::ReadyToSync => {
                        println!("   ⏳ {} ({}): still pending", record.main_artist, record.date)
                    }
                }
            }
        }
    }

    Ok(())
}
