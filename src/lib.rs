//! Collects free HTTP proxies from public lists, checks each one by sending a
//! real request through it, and caches the working set in a timestamped CSV
//! file so repeated runs within an hour skip the network.
//!
//! ```rust,no_run
//! use proxyhelper::{ProxyHelper, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut helper = ProxyHelper::new(&Settings::new()?)?;
//!     let all = helper.get_proxies(false).await?.to_vec();
//!     println!("{} proxies", all.len());
//!     if let Some(proxy) = helper.get_proxy().await? {
//!         println!("using {}", proxy);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod configuration;
pub mod error;
pub mod helper;
pub mod logging;
pub mod provider;
pub mod providers;
pub mod proxy;
pub mod store;
pub mod verification;

pub use aggregator::Aggregator;
pub use configuration::Settings;
pub use error::{Error, FetchError, Result};
pub use helper::ProxyHelper;
pub use provider::Provider;
pub use proxy::ProxySet;
pub use store::{CacheRecord, Store};
pub use verification::{HttpProber, Prober};
