use anyhow::Context;

use crate::auth::bootstrap::{ensure_admin, AdminBootstrap};
use crate::config::config;
use crate::database::PgStore;

pub async fn handle(email: &str, password: &str, name: &str) -> anyhow::Result<()> {
    let config = config();
    let store = PgStore::connect(&config.database)
        .await
        .context("create-admin needs DATABASE_URL; the in-memory store does not outlive the command")?;

    let outcome = ensure_admin(&store, email, password, name, config.security.bcrypt_cost).await;
    store.close().await;

    match outcome? {
        AdminBootstrap::Created(user) => println!("Created admin {} ({})", user.email, user.id),
        AdminBootstrap::Exists(user) => println!("{} is already registered as {:?}", user.email, user.role),
    }
    Ok(())
}
