mod run;

use std::sync::{Arc, Once};

use anyhow::Result;
use monthbook::config::Config;
use monthbook::db::Database;
use monthbook::identity::StaticIdentity;
use monthbook::Ledger;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::resolve()?;
    init_tracing(&config.log_filter);

    let db = Database::open(&config.db_path)?;
    tracing::debug!(db = %config.db_path.display(), user = %config.user_id, "Opened ledger");
    let ledger = Ledger::new(
        Arc::new(db),
        Arc::new(StaticIdentity::signed_in(config.user_id)),
    );

    run::as_cli(&args, &ledger).await
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
