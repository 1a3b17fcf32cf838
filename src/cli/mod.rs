use std::sync::Arc;
use clap::{Parser, Subcommand};
use tracing::info;
use crate::api::{self, ApiContext};
use crate::config::{Config, FlatConfig};
use crate::db::SiteDb;
use crate::plugins::BakkesPluginsSource;
use crate::seed;
use crate::storage::FileStorage;

#[derive(Parser, Debug)]
#[command(name = "tirl", version, about = "This Is Rocket League community site backend")]
pub struct Cli {
    #[command(flatten)]
    pub config: FlatConfig,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API (default)
    #[default]
    Serve,
    /// Add the sample terms and records to the operation log
    Seed,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from(cli.config);
    info!("{:?}", &config);
    match cli.command.unwrap_or_default() {
        Command::Serve => serve_api(config).await,
        Command::Seed => seed_db(config).await,
    }
}

async fn open_db(config: &Config) -> anyhow::Result<SiteDb> {
    info!("db_path: {}", config.db.db_path.display());
    let storage = FileStorage::new(&config.db.db_path)?;
    let db = SiteDb::init(Box::new(storage)).await?;
    Ok(db)
}

pub async fn serve_api(config: Config) -> anyhow::Result<()> {
    let db = open_db(&config).await?;
    let plugins = BakkesPluginsSource::new(&config.plugins.url, config.plugins.timeout)?;
    let ctx = ApiContext::new(config, db, Arc::new(plugins));
    api::serve(ctx).await
}

pub async fn seed_db(config: Config) -> anyhow::Result<()> {
    let mut db = open_db(&config).await?;
    let report = seed::seed(&mut db).await?;
    println!("Seeded {} terms and {} records into {}", report.terms, report.records, config.db.db_path.display());
    Ok(())
}
