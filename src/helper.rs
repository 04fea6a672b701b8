use crate::aggregator::Aggregator;
use crate::configuration::Settings;
use crate::error::Result;
use crate::logging;
use crate::providers;
use crate::proxy::ProxySet;
use crate::store::Store;
use crate::verification::HttpProber;

use log::info;
use rand::Rng;
use std::sync::Arc;

/// Cache-aware entry point: serves the stored proxies while they are fresh
/// and refreshes them otherwise.
pub struct ProxyHelper {
    aggregator: Aggregator,
    store: Store,
    proxies: ProxySet,
}

impl ProxyHelper {
    /// Wires the configured sources, prober and store, and installs the
    /// logger described by `settings.logging`.
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        logging::init(&settings.logging)?;

        let client = providers::new_client(settings.fetch_timeout())?;
        let sources = providers::from_settings(&settings.providers, &client);
        let prober = Arc::new(HttpProber::from_settings(settings));
        let aggregator = Aggregator::new(sources, prober)
            .with_probe_concurrency(settings.probe.concurrency);
        let store = Store::new(settings.cache_path.clone(), settings.freshness());

        Ok(Self::from_parts(aggregator, store))
    }

    pub fn from_parts(aggregator: Aggregator, store: Store) -> Self {
        Self {
            aggregator,
            store,
            proxies: ProxySet::new(),
        }
    }

    /// Returns the working set, refreshing when `force` is set or when the
    /// stored record is missing or stale.
    ///
    /// Only a failure to write the cache file is an error.
    pub async fn get_proxies(&mut self, force: bool) -> Result<&ProxySet> {
        if !force {
            if let Some(record) = self.store.load().await {
                if self.store.is_fresh(&record) {
                    info!("Retrieved {} proxies from file", record.proxies.len());
                    self.proxies = record.proxies;
                    return Ok(&self.proxies);
                }
                info!("Proxies file is outdated, fetching new proxies");
            } else {
                info!("Fetching new proxies");
            }
        } else {
            info!("Forced refresh, fetching new proxies");
        }

        self.proxies = self.refresh_and_save().await?;
        Ok(&self.proxies)
    }

    /// One uniformly random proxy, or `None` when nothing works.
    pub async fn get_proxy(&mut self) -> Result<Option<String>> {
        self.populate().await?;
        let mut rng = rand::thread_rng();
        Ok(self.proxies.choose(&mut rng).map(str::to_string))
    }

    /// Like [`get_proxy`](Self::get_proxy) with a caller-supplied RNG.
    pub async fn get_proxy_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<String>> {
        self.populate().await?;
        Ok(self.proxies.choose(rng).map(str::to_string))
    }

    // Single attempt, no retry loop.
    async fn populate(&mut self) -> Result<()> {
        if self.proxies.is_empty() {
            self.get_proxies(false).await?;
        }
        Ok(())
    }

    async fn refresh_and_save(&self) -> Result<ProxySet> {
        let proxies = self.aggregator.refresh().await;
        if proxies.is_empty() {
            log::error!("No proxies to save.");
            return Ok(proxies);
        }
        let record = self.store.save(proxies).await?;
        Ok(record.proxies)
    }
}
