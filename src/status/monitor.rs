use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::BroadcastStream;

use super::{Integration, IntegrationStatus, StatusProbe};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

type StatusTable = Arc<RwLock<BTreeMap<String, IntegrationStatus>>>;

/// Owns one polling task per integration and the latest status of each.
///
/// Dropping the monitor (or calling [`shutdown`](Self::shutdown)) aborts
/// every timer.
pub struct StatusMonitor {
    integrations: Vec<Integration>,
    probe: Arc<dyn StatusProbe>,
    statuses: StatusTable,
    updates: broadcast::Sender<IntegrationStatus>,
    tasks: Vec<JoinHandle<()>>,
}

impl StatusMonitor {
    /// Start polling. The first probe of each integration runs immediately.
    ///
    /// Spawns onto the current Tokio runtime when `integrations` is non-empty.
    pub fn start(
        integrations: Vec<Integration>,
        probe: Arc<dyn StatusProbe>,
        interval: Duration,
    ) -> Self {
        let statuses: StatusTable = Arc::new(RwLock::new(
            integrations
                .iter()
                .map(|i| (i.name.clone(), IntegrationStatus::pending(i)))
                .collect(),
        ));
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let tasks = integrations
            .iter()
            .cloned()
            .map(|integration| {
                let probe = probe.clone();
                let statuses = statuses.clone();
                let updates = updates.clone();
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(interval);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        ticker.tick().await;
                        check(&integration, probe.as_ref(), &statuses, &updates).await;
                    }
                })
            })
            .collect();

        log::info!(
            "Status monitor started for {} integration(s), interval {:?}",
            integrations.len(),
            interval
        );

        Self {
            integrations,
            probe,
            statuses,
            updates,
            tasks,
        }
    }

    /// Probe every integration now, outside the regular schedule.
    pub async fn refresh(&self) -> Vec<IntegrationStatus> {
        futures::future::join_all(
            self.integrations
                .iter()
                .map(|i| check(i, self.probe.as_ref(), &self.statuses, &self.updates)),
        )
        .await
    }

    /// Latest status of every integration, ordered by name.
    pub fn snapshot(&self) -> Vec<IntegrationStatus> {
        self.statuses.read().values().cloned().collect()
    }

    pub fn status(&self, name: &str) -> Option<IntegrationStatus> {
        self.statuses.read().get(name).cloned()
    }

    /// Stream of status updates as probes complete.
    pub fn subscribe(&self) -> BroadcastStream<IntegrationStatus> {
        BroadcastStream::new(self.updates.subscribe())
    }

    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn check(
    integration: &Integration,
    probe: &dyn StatusProbe,
    statuses: &StatusTable,
    updates: &broadcast::Sender<IntegrationStatus>,
) -> IntegrationStatus {
    let started = Instant::now();
    let outcome = probe.probe(integration).await;
    let elapsed = started.elapsed().as_millis() as u64;

    let status = match outcome {
        Ok(()) => IntegrationStatus {
            name: integration.name.clone(),
            kind: integration.kind,
            connected: true,
            last_check: Some(Utc::now()),
            latency_ms: Some(elapsed),
            last_error: None,
        },
        Err(e) => {
            log::warn!("Integration '{}' probe failed: {}", integration.name, e);
            IntegrationStatus {
                name: integration.name.clone(),
                kind: integration.kind,
                connected: false,
                last_check: Some(Utc::now()),
                latency_ms: None,
                last_error: Some(e.to_string()),
            }
        }
    };

    let previous = statuses
        .write()
        .insert(integration.name.clone(), status.clone());
    if previous.map(|p| p.connected) != Some(status.connected) {
        log::info!(
            "Integration '{}' is now {}",
            integration.name,
            if status.connected { "connected" } else { "disconnected" }
        );
    }

    // No subscribers is fine.
    let _ = updates.send(status.clone());
    status
}
