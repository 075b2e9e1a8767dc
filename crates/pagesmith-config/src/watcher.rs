//! Change notification for the configuration store.
//!
//! Watches the store file's directory and publishes the reloaded record on a
//! `tokio::sync::watch` channel after writes settle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::error::ConfigError;
use crate::schema::LlmConfig;
use crate::store::ConfigStore;

const DEBOUNCE: Duration = Duration::from_millis(300);
const TICK: Duration = Duration::from_millis(100);

/// Handle that keeps the file watcher alive.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl ConfigWatcher {
    /// Start watching `store`. The receiver starts at `initial` and sees
    /// every reloaded record that differs from the previous one.
    pub fn spawn(
        store: ConfigStore,
        initial: Option<LlmConfig>,
    ) -> Result<(Self, watch::Receiver<Option<LlmConfig>>), ConfigError> {
        let dir = store
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;

        let (event_tx, mut event_rx) = mpsc::channel::<Event>(100);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (config_tx, config_rx) = watch::channel(initial);

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                if let Ok(event) = result {
                    let _ = event_tx.blocking_send(event);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| ConfigError::Watch(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Watch(format!("Failed to watch {}: {}", dir.display(), e)))?;
        info!("Watching config store: {}", store.path().display());

        tokio::spawn(async move {
            let mut debounce_timer: Option<tokio::time::Instant> = None;

            loop {
                tokio::select! {
                    Some(event) = event_rx.recv() => {
                        if Self::is_relevant_event(&event, store.path()) {
                            debug!("Config store change detected: {:?}", event.kind);
                            debounce_timer = Some(tokio::time::Instant::now());
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Config watcher shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(TICK) => {
                        if let Some(timer) = debounce_timer {
                            if timer.elapsed() >= DEBOUNCE {
                                debounce_timer = None;
                                Self::reload(&store, &config_tx);
                            }
                        }
                    }
                }
            }
        });

        Ok((
            Self {
                _watcher: watcher,
                shutdown_tx: Some(shutdown_tx),
            },
            config_rx,
        ))
    }

    fn is_relevant_event(event: &Event, target: &Path) -> bool {
        matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some() && p.file_name() == target.file_name())
    }

    fn reload(store: &ConfigStore, config_tx: &watch::Sender<Option<LlmConfig>>) {
        match store.load() {
            Ok(config) => {
                let changed = config_tx.send_if_modified(|current| {
                    if *current == config {
                        false
                    } else {
                        *current = config;
                        true
                    }
                });
                if changed {
                    info!("Configuration reloaded from {}", store.path().display());
                }
            }
            Err(e) => error!("Failed to reload configuration: {}", e),
        }
    }

    /// Stop watching.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
