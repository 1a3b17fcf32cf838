use clap::Parser;
use tirl_lib::api;
use tirl_lib::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    api::init_tracing();
    cli::run(cli).await
}
