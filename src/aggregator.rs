use crate::provider::Provider;
use crate::proxy::ProxySet;
use crate::verification::Prober;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use log::{error, info, warn};
use moka::future::Cache;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Upper bound on distinct candidates remembered within one refresh.
const VERIFIED_CAPACITY: u64 = 100_000;

pub const DEFAULT_PROBE_CONCURRENCY: usize = 64;

/// Fetches every source, probes their candidates and merges the survivors.
///
/// Nothing is spawned: all work lives inside the `refresh` future, so
/// dropping it cancels every in-flight fetch and probe.
pub struct Aggregator {
    providers: Vec<Arc<dyn Provider>>,
    prober: Arc<dyn Prober>,
    probe_concurrency: usize,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn Provider>>, prober: Arc<dyn Prober>) -> Self {
        Self {
            providers,
            prober,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }

    /// Probes in flight per source (at least 1).
    pub fn with_probe_concurrency(mut self, limit: usize) -> Self {
        self.probe_concurrency = limit.max(1);
        self
    }

    /// Runs one full cycle. Never fails: broken sources and dead candidates
    /// only shrink the result, possibly to empty.
    pub async fn refresh(&self) -> ProxySet {
        // Shared by all sources of this cycle only, so a candidate listed
        // twice is probed once.
        let verified: Cache<String, bool> = Cache::new(VERIFIED_CAPACITY);

        let per_provider = join_all(
            self.providers
                .iter()
                .map(|provider| self.collect_alive(provider.as_ref(), &verified)),
        )
        .await;

        let proxies: ProxySet = per_provider.into_iter().flatten().collect();
        if proxies.is_empty() {
            warn!("refresh finished without a single working proxy");
        } else {
            info!(
                "refresh finished with {} unique proxies from {} sources",
                proxies.len(),
                self.providers.len()
            );
        }
        proxies
    }

    async fn collect_alive(
        &self,
        provider: &dyn Provider,
        verified: &Cache<String, bool>,
    ) -> Vec<String> {
        let candidates = match provider.list().await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("cannot load list of proxy: {}", e);
                return Vec::new();
            }
        };

        let candidates: BTreeSet<String> = candidates.into_iter().collect();
        let total = candidates.len();
        info!("{} found candidates {}", provider.name(), total);

        let prober = &self.prober;
        let alive: Vec<String> = stream::iter(candidates)
            .map(|candidate| async move {
                let ok = verified
                    .get_with(candidate.clone(), prober.probe(&candidate))
                    .await;
                ok.then_some(candidate)
            })
            .buffer_unordered(self.probe_concurrency)
            .filter_map(|res| async move { res })
            .collect()
            .await;

        info!("{} alive {} of {}", provider.name(), alive.len(), total);
        alive
    }
}
