use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use streamer::cli::{execute_digest, execute_range, Cli, Commands, DigestConfig, RangeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Range {
            count,
            workers,
            depth,
            summary,
        } => {
            let config = RangeConfig {
                count,
                workers,
                depth,
                summary,
            };
            let stdout = std::io::stdout();
            execute_range(config, &mut stdout.lock())?;
        }
        Commands::Digest {
            directory,
            workers,
            depth,
            output,
        } => {
            let config = DigestConfig {
                directory,
                workers,
                depth,
                output,
            };
            execute_digest(config).await?;
        }
    }

    Ok(())
}
