use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Protocol label a source attaches to a listed proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    Http,
    Https,
    Socks4,
    Socks5,
    Unknown,
}

impl ProxyType {
    /// Parses a protocol label as printed in source tables ("HTTP", "socks5", ...).
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "http" => ProxyType::Http,
            "https" => ProxyType::Https,
            "socks4" => ProxyType::Socks4,
            "socks5" => ProxyType::Socks5,
            _ => ProxyType::Unknown,
        }
    }
}

/// Deduplicated set of verified proxy addresses.
///
/// Identity is the exact string: `Example.com:80` and `example.com:80` are
/// two entries. Iteration follows sorted string order, which keeps random
/// selection reproducible under a seeded RNG.
///
/// A set is only ever built whole (via `FromIterator`); there is no insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySet {
    proxies: BTreeSet<String>,
}

impl ProxySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn contains(&self, proxy: &str) -> bool {
        self.proxies.contains(proxy)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.proxies.iter().map(String::as_str)
    }

    /// Uniform pick, `None` when empty.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.iter().choose(rng)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.proxies.iter().cloned().collect()
    }
}

impl FromIterator<String> for ProxySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            proxies: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ProxySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl IntoIterator for ProxySet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.proxies.into_iter()
    }
}
