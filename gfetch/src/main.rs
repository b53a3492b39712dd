mod config;
mod download;
mod harvest;
mod util;

use crate::harvest::Harvester;
use anyhow::Result;

#[macro_use]
extern crate log;

#[tokio::main]
async fn main() -> Result<()> {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()));
    builder.init();

    let conf = config::read_config()?;
    info!("config: {conf:?}");

    let harvester = Harvester::new(conf)?;
    let archived = harvester.run().await?;
    let shown = harvester.curate().await?;
    info!("done: {archived} archived, {shown} on display");
    Ok(())
}
