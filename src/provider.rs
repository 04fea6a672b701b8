use crate::error::FetchError;
use async_trait::async_trait;

/// A public proxy list.
///
/// `list` returns raw candidates (`host:port` or bare `host`) without any
/// liveness check. Malformed entries are dropped silently; only a failure of
/// the origin itself is an error.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, FetchError>;
    fn name(&self) -> &str;
}
