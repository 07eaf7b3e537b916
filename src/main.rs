use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use orbitrip::config::Config;
use orbitrip::db::{DynStore, MemoryStore, PgStore};
use orbitrip::engine::Engine;
use orbitrip::error::Error;
use orbitrip::external::{DynNotifier, HttpNotifier, LogNotifier};
use orbitrip::server::serve;
use orbitrip::signal::ChangeSignal;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        tracing::error!("exiting: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;

    let store: DynStore = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(url, config.max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let notifier: DynNotifier = match (&config.sms, &config.email) {
        (None, None) => Arc::new(LogNotifier),
        (sms, email) => Arc::new(HttpNotifier::new(
            sms.clone(),
            email.clone(),
            config.collaborator_timeout,
        )?),
    };

    let engine = Engine::new(store, notifier, ChangeSignal::new(), &config);

    serve(engine, config.listen_addr).await
}
