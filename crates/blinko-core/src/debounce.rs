//! Trailing-edge debounced settings persistence.
//!
//! Field-by-field edits in the settings view each produce a full record.
//! [`DebouncedSaver`] keeps only the latest one and writes it once no new
//! record has arrived for the configured delay.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::defaults::SAVE_DEBOUNCE_MS;
use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::models::Settings;
use crate::settings::persist_settings;
use crate::store::SettingsStore;

enum Command {
    Schedule(Box<Settings>),
    Flush(oneshot::Sender<Result<()>>),
}

/// Coalesces settings writes issued in quick succession.
///
/// Dropping the saver closes its channel; a pending record is written before
/// the background task exits.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

impl DebouncedSaver {
    /// Spawn a saver with the default 750 ms delay.
    pub fn spawn<S>(store: Arc<S>, events: EventBus) -> Self
    where
        S: SettingsStore + ?Sized + 'static,
    {
        Self::with_delay(store, events, Duration::from_millis(SAVE_DEBOUNCE_MS))
    }

    pub fn with_delay<S>(store: Arc<S>, events: EventBus, delay: Duration) -> Self
    where
        S: SettingsStore + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, events, delay, rx));
        Self { tx, handle }
    }

    /// Queue `settings` for saving, replacing any record still waiting.
    pub fn schedule(&self, settings: Settings) {
        if self.tx.send(Command::Schedule(Box::new(settings))).is_err() {
            warn!(
                subsystem = "settings",
                component = "debounce",
                "Saver task stopped, settings change dropped"
            );
        }
    }

    /// Write any pending record now and wait for the result.
    pub async fn flush(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .map_err(|_| Error::Storage("settings saver has stopped".to_string()))?;
        done.await
            .map_err(|_| Error::Storage("settings saver has stopped".to_string()))?
    }

    /// Close the channel and wait for the pending write, if any.
    pub async fn shutdown(self) {
        let Self { tx, handle } = self;
        drop(tx);
        if let Err(e) = handle.await {
            warn!(subsystem = "settings", component = "debounce", error = %e, "Saver task failed");
        }
    }
}

async fn write<S>(store: &S, events: &EventBus, settings: &Settings) -> Result<()>
where
    S: SettingsStore + ?Sized,
{
    let result = persist_settings(store, events, settings).await;
    if let Err(ref e) = result {
        warn!(
            subsystem = "settings",
            component = "debounce",
            op = "save",
            error = %e,
            "Debounced settings save failed"
        );
    }
    result
}

async fn run<S>(
    store: Arc<S>,
    events: EventBus,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) where
    S: SettingsStore + ?Sized,
{
    let mut pending: Option<Box<Settings>> = None;

    loop {
        let command = if pending.is_none() {
            rx.recv().await
        } else {
            tokio::select! {
                command = rx.recv() => command,
                _ = tokio::time::sleep(delay) => {
                    if let Some(settings) = pending.take() {
                        debug!(subsystem = "settings", component = "debounce", "Delay elapsed, saving");
                        let _ = write(store.as_ref(), &events, &settings).await;
                    }
                    continue;
                }
            }
        };

        match command {
            Some(Command::Schedule(settings)) => pending = Some(settings),
            Some(Command::Flush(reply)) => {
                let result = match pending.take() {
                    Some(settings) => write(store.as_ref(), &events, &settings).await,
                    None => Ok(()),
                };
                let _ = reply.send(result);
            }
            None => {
                if let Some(settings) = pending.take() {
                    let _ = write(store.as_ref(), &events, &settings).await;
                }
                break;
            }
        }
    }
}
