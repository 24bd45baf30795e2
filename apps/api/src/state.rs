use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::assessment::catalog::AssessmentCatalog;
use crate::assessment::postgres::PgAssessmentCatalog;
use crate::assessment::strategy::{build_strategy, ClassificationStrategy};
use crate::config::Config;
use crate::db::create_pool;
use crate::matching::notify::{MatchNotifier, TracingNotifier};
use crate::matching::postgres::PgMatchStore;
use crate::matching::service::MatchService;
use crate::matching::store::MatchStore;
use crate::memory::MemoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn AssessmentCatalog>,
    /// Pluggable classifier. Default: ThresholdClassifier. Swap via CLASSIFICATION_STRATEGY.
    pub classifier: Arc<dyn ClassificationStrategy>,
    pub matches: Arc<MatchService>,
}

impl AppState {
    /// Wires the PostgreSQL stores when `DATABASE_URL` is set, in-memory ones otherwise.
    pub async fn from_config(config: Config) -> Result<Self> {
        let notifier: Arc<dyn MatchNotifier> = Arc::new(TracingNotifier);

        let (catalog, store): (Arc<dyn AssessmentCatalog>, Arc<dyn MatchStore>) =
            match &config.database_url {
                Some(url) => {
                    let pool = create_pool(url).await?;
                    let catalog = PgAssessmentCatalog::new(pool.clone());
                    if config.seed_catalog {
                        catalog.seed_if_empty().await?;
                    }
                    (Arc::new(catalog), Arc::new(PgMatchStore::new(pool)))
                }
                None => {
                    warn!("DATABASE_URL not set; using in-memory stores");
                    let memory = Arc::new(MemoryStore::seeded()?);
                    (memory.clone(), memory)
                }
            };

        Ok(Self::new(config, catalog, store, notifier))
    }

    pub fn new(
        config: Config,
        catalog: Arc<dyn AssessmentCatalog>,
        store: Arc<dyn MatchStore>,
        notifier: Arc<dyn MatchNotifier>,
    ) -> Self {
        let classifier: Arc<dyn ClassificationStrategy> = Arc::from(build_strategy(
            config.classification_strategy,
            config.profile_fallback,
        ));
        info!(
            "Classification strategy: {:?} (profile fallback: {:?})",
            classifier.kind(),
            config.profile_fallback
        );

        Self {
            config,
            catalog,
            classifier,
            matches: Arc::new(MatchService::new(store, notifier)),
        }
    }
}
