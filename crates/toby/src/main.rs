use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use toby_core::{config::Config, store::EventStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    toby_core::logging::init("toby")?;

    let cfg = Arc::new(Config::load()?);

    let store = Arc::new(
        EventStore::open(&cfg.db_path)
            .with_context(|| format!("failed to open database {}", cfg.db_path.display()))?,
    );
    info!(
        walks = store.walk_count()?,
        "walk log ready at {}",
        cfg.db_path.display()
    );

    toby_telegram::router::run_polling(cfg, store)
        .await
        .context("telegram bot failed")?;

    Ok(())
}
