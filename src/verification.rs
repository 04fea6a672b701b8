use crate::configuration::Settings;
use anyhow::{anyhow, bail, ensure, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Liveness check for a single candidate.
///
/// Returns `true` only when the candidate relayed a request successfully.
/// Every failure (timeout, refusal, DNS, TLS, bad status) is `false`; callers
/// never learn why.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, candidate: &str) -> bool;
}

/// Probes by sending one GET to a fixed target with the candidate as
/// forward HTTP proxy.
#[derive(Debug, Clone)]
pub struct HttpProber {
    target: String,
    timeout: Duration,
    allow_private: bool,
}

impl HttpProber {
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            timeout,
            allow_private: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.probe.target.clone(), settings.probe_timeout())
            .allow_private(settings.probe.allow_private)
    }

    pub fn allow_private(mut self, allow: bool) -> Self {
        self.allow_private = allow;
        self
    }

    async fn check(&self, candidate: &str) -> Result<()> {
        if !self.allow_private {
            let addr = resolve(candidate).await?;
            ensure!(is_safe_ip(addr.ip()), "unsafe proxy ip refused: {}", addr.ip());
        }

        let proxy = reqwest::Proxy::all(format!("http://{}", candidate))?;
        let client = Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .pool_max_idle_per_host(0) // one-off client
            .build()?;

        let resp = client.get(&self.target).send().await?;
        if resp.status() != StatusCode::OK {
            bail!("probe through {} answered {}", candidate, resp.status());
        }
        Ok(())
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, candidate: &str) -> bool {
        // Resolution plus request share one deadline.
        matches!(
            tokio::time::timeout(self.timeout, self.check(candidate)).await,
            Ok(Ok(()))
        )
    }
}

/// Resolves `host[:port]`; bare hosts get the HTTP proxy default port 80.
async fn resolve(candidate: &str) -> Result<SocketAddr> {
    let target = if candidate.contains(':') {
        candidate.to_string()
    } else {
        format!("{}:80", candidate)
    };

    let mut addrs = tokio::net::lookup_host(target.as_str()).await?;
    addrs
        .next()
        .ok_or_else(|| anyhow!("cannot resolve proxy address {}", candidate))
}

pub fn is_safe_ip(ip: IpAddr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() {
        return false;
    }

    match ip {
        IpAddr::V4(ipv4) => {
            let [a, b, ..] = ipv4.octets();
            let private = a == 10 // 10.0.0.0/8
                || (a == 172 && (16..=31).contains(&b)) // 172.16.0.0/12
                || (a == 192 && b == 168) // 192.168.0.0/16
                || (a == 169 && b == 254); // link-local
            !private && !ipv4.is_broadcast()
        }
        IpAddr::V6(ipv6) => {
            let head = ipv6.segments()[0];
            let unique_local = (head & 0xfe00) == 0xfc00;
            let link_local = (head & 0xffc0) == 0xfe80;
            !unique_local && !link_local
        }
    }
}
