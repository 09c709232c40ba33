use clap::{Parser, Subcommand};
use hh_vacancies::{
    config::{get_config, init_config, load_employers},
    database::pool::{create_pool, recreate_database},
    AppState,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hh-vacancies", about = "Load hh.ru vacancies into PostgreSQL and report on them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild the schema and ingest every employer from the employers file.
    Ingest {
        /// Drop and recreate the whole database before creating the tables.
        #[arg(long)]
        recreate_database: bool,
    },
    /// Print the analytical report as JSON.
    Report {
        /// Case-insensitive search term for vacancy titles.
        #[arg(long, short)]
        keyword: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    init_config()?;
    let config = get_config();

    match cli.command {
        Command::Ingest { recreate_database: recreate } => {
            let employers = load_employers(&config.employers_file)?;
            info!(
                employers = employers.len(),
                file = %config.employers_file.display(),
                "Loaded employers"
            );

            if recreate {
                recreate_database(&config.database_url).await?;
            }

            let pool = create_pool(config).await?;
            let state = AppState::new(pool, config)?;
            state.repository.reset_schema().await?;

            let summary = state.ingestion_service().run(&employers).await;
            summary.log();
        }
        Command::Report { keyword } => {
            let pool = create_pool(config).await?;
            let state = AppState::new(pool, config)?;
            let report = state.report_service.build(keyword.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
