// # Proxy Store
//
// Timestamped CSV cache of the last refresh.
//
// ## File Format
//
// One column. The header is the moment the refresh completed, each row is
// one proxy:
//
// ```text
// 2026-10-18T09:12:44.120431Z
// 1.1.1.1:80
// 2.2.2.2:3128
// ```
//
// The header, not the file mtime, is the freshness clock. Headers written
// as naive ISO-8601 local time (no offset) are accepted on load.
//
// ## Writes
//
// The table is written to a sibling temp file and renamed over the target,
// so readers see either the old record or the new one. Every save gets its
// own temp file, so concurrent writers never clobber each other's table.

use crate::error::{Error, Result};
use crate::proxy::ProxySet;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const NAIVE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Sub-second digits kept in the header.
const TIMESTAMP_DIGITS: u16 = 6;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A persisted refresh result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    /// When the whole refresh cycle completed.
    pub fetched_at: DateTime<Utc>,
    pub proxies: ProxySet,
}

/// File-backed cache with a freshness window.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    freshness: Duration,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, freshness: Duration) -> Self {
        Self {
            path: path.into(),
            freshness,
        }
    }

    /// Reads the persisted record.
    ///
    /// `None` when the file does not exist, cannot be read or does not
    /// parse; all three mean "no cache".
    pub async fn load(&self) -> Option<CacheRecord> {
        match self.read_record().await {
            Ok(record) => {
                log::info!(
                    "loaded {} proxies fetched at {} from {}",
                    record.proxies.len(),
                    record.fetched_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    self.path.display()
                );
                Some(record)
            }
            Err(LoadError::Missing) => {
                log::warn!("cache file {} does not exist", self.path.display());
                None
            }
            Err(LoadError::Unusable(reason)) => {
                log::warn!(
                    "cache file {} is unusable ({}), ignoring it",
                    self.path.display(),
                    reason
                );
                None
            }
        }
    }

    /// Replaces the persisted record with `proxies`, stamped now.
    pub async fn save(&self, proxies: ProxySet) -> Result<CacheRecord> {
        self.save_at(proxies, Utc::now()).await
    }

    /// Replaces the persisted record with `proxies`, stamped `fetched_at`.
    ///
    /// The stamp is truncated to microseconds, the precision of the file
    /// header, so the returned record equals what `load` reads back.
    pub async fn save_at(
        &self,
        proxies: ProxySet,
        fetched_at: DateTime<Utc>,
    ) -> Result<CacheRecord> {
        let fetched_at = fetched_at.trunc_subsecs(TIMESTAMP_DIGITS);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::store(parent, e))?;
            }
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true)])?;
        for proxy in proxies.iter() {
            writer.write_record([proxy])?;
        }
        let table = writer
            .into_inner()
            .map_err(|e| Error::store(&self.path, e.into_error()))?;

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &table).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::store(&temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::store(&self.path, e));
        }

        log::info!("{} proxies saved to {}", proxies.len(), self.path.display());
        Ok(CacheRecord {
            fetched_at,
            proxies,
        })
    }

    /// True while the record is younger than the freshness window.
    pub fn is_fresh(&self, record: &CacheRecord) -> bool {
        self.is_fresh_at(record, Utc::now())
    }

    /// Fresh iff `fetched_at <= now < fetched_at + freshness`. A record
    /// stamped in the future is treated as stale.
    pub fn is_fresh_at(&self, record: &CacheRecord, now: DateTime<Utc>) -> bool {
        let Ok(age) = (now - record.fetched_at).to_std() else {
            return false;
        };
        age < self.freshness
    }

    async fn read_record(&self) -> std::result::Result<CacheRecord, LoadError> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(LoadError::Missing),
            Err(e) => return Err(LoadError::Unusable(e.to_string())),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_slice());

        let header = reader
            .headers()
            .map_err(|e| LoadError::Unusable(e.to_string()))?
            .get(0)
            .map(str::to_string)
            .ok_or_else(|| LoadError::Unusable("missing timestamp header".into()))?;
        let fetched_at = parse_timestamp(&header)
            .ok_or_else(|| LoadError::Unusable(format!("bad timestamp header {:?}", header)))?;

        let mut proxies = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| LoadError::Unusable(e.to_string()))?;
            if let Some(proxy) = row.get(0).map(str::trim).filter(|p| !p.is_empty()) {
                proxies.push(proxy.to_string());
            }
        }

        Ok(CacheRecord {
            fetched_at,
            proxies: proxies.into_iter().collect(),
        })
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "proxies".to_string());
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

enum LoadError {
    Missing,
    Unusable(String),
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, NAIVE_TIMESTAMP).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
}
