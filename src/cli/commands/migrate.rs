use anyhow::Context;

use crate::config::config;
use crate::database::PgStore;

pub async fn handle() -> anyhow::Result<()> {
    let store = PgStore::connect(&config().database).await.context("migrate needs DATABASE_URL")?;
    store.migrate().await?;
    store.close().await;
    println!("Migrations applied");
    Ok(())
}
