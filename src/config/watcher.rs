//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched so editors that save by renaming a temp
//! file are noticed. A burst of events is coalesced into one reload, and a
//! configuration is forwarded only when it differs from the last one.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::MonitorConfig;

const DEBOUNCE: Duration = Duration::from_millis(300);

pub struct ConfigWatcher {
    path: PathBuf,
    last: MonitorConfig,
}

impl ConfigWatcher {
    /// `current` is the configuration already in effect.
    pub fn new(path: &Path, current: MonitorConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            last: current,
        }
    }

    /// Start watching. Returns the watcher, which must be kept alive, and a
    /// receiver of validated, changed configurations.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<MonitorConfig>), notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<()>();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let file_name: Option<OsString> = self.path.file_name().map(|n| n.to_os_string());
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if event.paths.iter().any(|p| p.file_name() == file_name.as_deref()) {
                        let _ = event_tx.send(());
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %self.path.display(), "Config watcher started");

        tokio::spawn(self.forward(event_rx, update_tx));
        Ok((watcher, update_rx))
    }

    async fn forward(
        mut self,
        mut events: mpsc::UnboundedReceiver<()>,
        updates: mpsc::UnboundedSender<MonitorConfig>,
    ) {
        while events.recv().await.is_some() {
            tokio::time::sleep(DEBOUNCE).await;
            while events.try_recv().is_ok() {}

            match load_config(&self.path) {
                Ok(config) if config == self.last => {
                    tracing::debug!("Config file touched without changes");
                }
                Ok(config) => {
                    tracing::info!(path = %self.path.display(), "Configuration reloaded");
                    self.last = config.clone();
                    if updates.send(config).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                }
            }
        }
    }
}
