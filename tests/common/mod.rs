//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use proxyhelper::{FetchError, Prober, Provider};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A source returning a fixed list, or failing.
pub struct StubProvider {
    name: String,
    result: Option<Vec<String>>,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn ok(name: &str, candidates: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            result: Some(candidates.iter().map(|c| c.to_string()).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            result: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for StubProvider {
    async fn list(&self) -> Result<Vec<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Some(list) => Ok(list.clone()),
            None => Err(FetchError::parse(&self.name, "stubbed failure")),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A prober that knows in advance which candidates are alive.
pub struct ScriptedProber {
    alive: HashSet<String>,
    probed: Mutex<Vec<String>>,
}

impl ScriptedProber {
    pub fn new(alive: &[&str]) -> Self {
        Self {
            alive: alive.iter().map(|c| c.to_string()).collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, candidate: &str) -> bool {
        self.probed.lock().unwrap().push(candidate.to_string());
        tokio::task::yield_now().await;
        self.alive.contains(candidate)
    }
}

/// A prober that never answers and counts the probes still pending.
///
/// The count goes down when a pending probe future is dropped, so it reads
/// zero once an abandoned refresh has released all of its work.
#[derive(Default)]
pub struct HangingProber {
    in_flight: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
}

impl HangingProber {
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Prober for HangingProber {
    async fn probe(&self, _candidate: &str) -> bool {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight(self.in_flight.clone());
        futures::future::pending::<()>().await;
        unreachable!()
    }
}

/// Accepts connections and never writes a byte back.
pub async fn silent() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

pub fn providers(list: Vec<StubProvider>) -> Vec<Arc<dyn Provider>> {
    list.into_iter()
        .map(|p| Arc::new(p) as Arc<dyn Provider>)
        .collect()
}

/// Minimal HTTP/1.1 responder on 127.0.0.1.
///
/// Answers every request with `status` and `body`, closing the connection
/// afterwards. Works as an origin and, since it ignores the request line,
/// as a forward proxy. The request count is returned alongside the address.
pub async fn serve(status: u16, body: impl Into<String>) -> (SocketAddr, Arc<AtomicUsize>) {
    let body: Arc<str> = body.into().into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let counter = counter.clone();
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}

/// An address on 127.0.0.1 with nothing listening.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
