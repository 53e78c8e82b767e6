//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use endpoint_watch::health::{HealthResult, ProbeError, Prober};
use endpoint_watch::registry::{ConnectionStore, StoreError, StoreResult};
use endpoint_watch::{Connection, ConnectionConfig, ConnectionId, MonitorService};

/// In-memory store. Every operation fails while `fail` is set.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Connection>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn with(records: Vec<Connection>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            failing: AtomicBool::new(false),
        })
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<Connection> {
        self.records.lock().unwrap().clone()
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Io(std::io::Error::other("injected failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ConnectionStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Connection>> {
        self.check()?;
        Ok(self.records())
    }

    async fn persist(&self, connection: Connection) -> StoreResult<()> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|c| c.id == connection.id) {
            Some(existing) => *existing = connection,
            None => records.push(connection),
        }
        Ok(())
    }

    async fn delete(&self, id: ConnectionId) -> StoreResult<()> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|c| c.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn reorder(&self, ids: &[ConnectionId]) -> StoreResult<()> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        for (index, id) in ids.iter().enumerate() {
            if let Some(record) = records.iter_mut().find(|c| c.id == *id) {
                record.order = index as i32;
            }
        }
        Ok(())
    }
}

/// How the scripted prober answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    Online,
    TransportError,
    Hang,
}

/// Prober that counts calls per connection and answers per `mode`.
pub struct ScriptedProber {
    mode: Mutex<ProbeMode>,
    calls: Mutex<HashMap<ConnectionId, usize>>,
}

impl ScriptedProber {
    pub fn new(mode: ProbeMode) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            calls: Mutex::new(HashMap::new()),
        })
    }

    pub fn set_mode(&self, mode: ProbeMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self, id: ConnectionId) -> usize {
        self.calls.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, connection: &Connection) -> Result<HealthResult, ProbeError> {
        *self.calls.lock().unwrap().entry(connection.id).or_default() += 1;
        let mode = *self.mode.lock().unwrap();
        match mode {
            ProbeMode::Online => Ok(HealthResult::online(connection.id, Duration::from_millis(5))),
            ProbeMode::TransportError => Err(ProbeError::Transport("connection reset by peer".into())),
            ProbeMode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(HealthResult::online(connection.id, Duration::from_secs(3600)))
            }
        }
    }
}

pub fn website(name: &str, url: &str, order: i32) -> Connection {
    Connection::new(name, ConnectionConfig::Website { url: url.into(), check_path: None }, order)
}

pub fn ssh(name: &str, host: &str, port: u16, order: i32) -> Connection {
    Connection::new(
        name,
        ConnectionConfig::Ssh {
            host: host.into(),
            port,
            username: "root".into(),
            wol_enabled: false,
            mac_address: None,
            broadcast_addr: None,
        },
        order,
    )
}

pub fn service_with(
    records: Vec<Connection>,
    mode: ProbeMode,
    probe_timeout: Duration,
) -> (Arc<MonitorService>, Arc<MemoryStore>, Arc<ScriptedProber>) {
    let store = MemoryStore::with(records);
    let prober = ScriptedProber::new(mode);
    let service = MonitorService::new(store.clone(), prober.clone(), probe_timeout);
    (Arc::new(service), store, prober)
}

/// Start a mock backend answering every request with `status_line`.
/// Returns the bound address.
pub async fn start_mock_backend(status_line: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let response = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
