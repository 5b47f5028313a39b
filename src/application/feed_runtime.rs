// Feed runtime - Drives the simulator on cancellable schedules
use crate::application::feed_simulator::{FeedSimulator, ScheduleChange};
use crate::domain::service::{ServiceId, ServiceStatus};
use crate::domain::snapshot::FeedSnapshot;
use crate::domain::telemetry::{ProcessRow, Settings};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct RuntimeTiming {
    pub status_interval: Duration,
    pub alert_duration: Duration,
}

impl Default for RuntimeTiming {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_secs(10),
            alert_duration: Duration::from_secs(3),
        }
    }
}

/// Spawned task that is aborted when dropped.
pub struct ScheduledTask(JoinHandle<()>);

impl ScheduledTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Holds at most one live task; storing a new one cancels the old one first.
#[derive(Default)]
struct TaskSlot(Option<ScheduledTask>);

impl TaskSlot {
    fn replace(&mut self, task: ScheduledTask) {
        self.cancel();
        self.0 = Some(task);
    }

    fn cancel(&mut self) {
        // dropping aborts
        self.0.take();
    }
}

pub struct FeedRuntime {
    simulator: Arc<Mutex<FeedSimulator>>,
    updates: broadcast::Sender<FeedSnapshot>,
    timing: RuntimeTiming,
    generation: Mutex<TaskSlot>,
    status: Mutex<TaskSlot>,
    alert_clear: Arc<Mutex<TaskSlot>>,
}

impl FeedRuntime {
    /// Start the status schedule, and the generation schedule when realtime is on.
    /// Must be called from within a tokio runtime.
    pub fn start(simulator: FeedSimulator, timing: RuntimeTiming) -> Self {
        let settings = simulator.settings();
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let mut runtime = Self {
            simulator: Arc::new(Mutex::new(simulator)),
            updates,
            timing,
            generation: Mutex::new(TaskSlot::default()),
            status: Mutex::new(TaskSlot::default()),
            alert_clear: Arc::new(Mutex::new(TaskSlot::default())),
        };

        let status_task = runtime.spawn_status();
        runtime.status.get_mut().replace(status_task);

        if settings.realtime {
            let generation_task = runtime.spawn_generation(settings.period());
            runtime.generation.get_mut().replace(generation_task);
        }

        tracing::info!(
            realtime = settings.realtime,
            interval = settings.interval,
            status_interval = ?timing.status_interval,
            "Feed runtime started"
        );

        runtime
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        self.simulator.lock().await.snapshot()
    }

    pub async fn process_table(&self) -> Vec<ProcessRow> {
        self.simulator.lock().await.process_table().await
    }

    /// Switch service and restart the generation schedule from now.
    /// Re-selecting the current service leaves the schedule alone.
    pub async fn select(&self, service: ServiceId) -> FeedSnapshot {
        let mut generation = self.generation.lock().await;

        let snapshot = {
            let mut simulator = self.simulator.lock().await;
            if simulator.select(service) {
                // the old schedule may be queued on the simulator lock; it must
                // not run again once the lock is released
                generation.cancel();
                self.alert_clear.lock().await.cancel();

                let settings = simulator.settings();
                if settings.realtime {
                    generation.replace(self.spawn_generation(settings.period()));
                }
            }
            simulator.snapshot()
        };

        self.publish(snapshot)
    }

    pub async fn configure(&self, settings: Settings) -> FeedSnapshot {
        let mut generation = self.generation.lock().await;

        let snapshot = {
            let mut simulator = self.simulator.lock().await;
            match simulator.configure(settings) {
                ScheduleChange::Unchanged => {}
                ScheduleChange::Suspend => generation.cancel(),
                ScheduleChange::Restart(period) => generation.replace(self.spawn_generation(period)),
            }
            simulator.snapshot()
        };

        self.publish(snapshot)
    }

    pub async fn set_service_status(&self, service: ServiceId, status: ServiceStatus) -> FeedSnapshot {
        let snapshot = {
            let mut simulator = self.simulator.lock().await;
            simulator.set_service_status(service, status);
            simulator.snapshot()
        };
        self.publish(snapshot)
    }

    /// Cancel every schedule. The simulator keeps its state.
    pub async fn shutdown(&self) {
        self.generation.lock().await.cancel();
        self.status.lock().await.cancel();
        self.alert_clear.lock().await.cancel();
        tracing::info!("Feed runtime stopped");
    }

    fn publish(&self, snapshot: FeedSnapshot) -> FeedSnapshot {
        // no subscribers is fine
        let _ = self.updates.send(snapshot.clone());
        snapshot
    }

    fn spawn_generation(&self, period: Duration) -> ScheduledTask {
        let simulator = self.simulator.clone();
        let updates = self.updates.clone();
        let alert_clear = self.alert_clear.clone();
        let alert_duration = self.timing.alert_duration;

        tracing::debug!(?period, "Scheduling sample generation");

        ScheduledTask::spawn(async move {
            let mut ticker = interval_at(first_tick(period), period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let (outcome, snapshot) = {
                    let mut simulator = simulator.lock().await;
                    let outcome = simulator.tick().await;
                    (outcome, simulator.snapshot())
                };

                if outcome.alert_raised {
                    let task = spawn_alert_clear(simulator.clone(), updates.clone(), alert_duration);
                    alert_clear.lock().await.replace(task);
                }

                let _ = updates.send(snapshot);
            }
        })
    }

    fn spawn_status(&self) -> ScheduledTask {
        let simulator = self.simulator.clone();
        let updates = self.updates.clone();
        let period = self.timing.status_interval;

        ScheduledTask::spawn(async move {
            let mut ticker = interval_at(first_tick(period), period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let snapshot = {
                    let mut simulator = simulator.lock().await;
                    let changes = simulator.status_tick().await;
                    if changes.is_empty() {
                        continue;
                    }
                    tracing::debug!("{} service status change(s)", changes.len());
                    simulator.snapshot()
                };

                let _ = updates.send(snapshot);
            }
        })
    }
}

/// One period from now, or now if that is past the clock's range.
fn first_tick(period: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(period).unwrap_or(now)
}

fn spawn_alert_clear(
    simulator: Arc<Mutex<FeedSimulator>>,
    updates: broadcast::Sender<FeedSnapshot>,
    after: Duration,
) -> ScheduledTask {
    ScheduledTask::spawn(async move {
        tokio::time::sleep(after).await;
        let snapshot = {
            let mut simulator = simulator.lock().await;
            simulator.clear_alert();
            simulator.snapshot()
        };
        let _ = updates.send(snapshot);
    })
}
