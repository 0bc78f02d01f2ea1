/// Top-level state machine: authentication gate in front of the
/// monitoring tick loop.
use log::{debug, info, warn};
use std::sync::{Arc, RwLock};
use tokio::sync::oneshot;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

use crate::auth::{AuthGate, AuthOutcome};
use crate::models::{LogRecord, Reading, SystemState};
use crate::sensors::{CardReader, SensorHub, SensorInterface};
use crate::storage::{HistoryBuffer, PersistenceLog};

// Pacing for reader faults so a broken reader cannot spin the wait loop
const READER_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Read-only view handed to the display collaborator. Cheap to clone;
/// snapshots are owned copies, never a buffer mid-eviction.
#[derive(Clone)]
pub struct DisplayHandle {
    latest: Arc<RwLock<Option<Reading>>>,
    history: Arc<RwLock<HistoryBuffer>>,
}

impl DisplayHandle {
    pub fn latest_reading(&self) -> Option<Reading> {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn history_snapshot(&self) -> Vec<Reading> {
        self.history
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot()
    }
}

/// Drives WaitingAuth -> Monitoring and owns every mutable collaborator:
/// the sensor hub, the rolling history and the persistence log.
pub struct ControlLoop<I: SensorInterface, R: CardReader> {
    state: SystemState,
    gate: AuthGate,
    reader: R,
    hub: SensorHub<I>,
    log: PersistenceLog,
    latest: Arc<RwLock<Option<Reading>>>,
    history: Arc<RwLock<HistoryBuffer>>,
    tick_interval: Duration,
}

impl<I: SensorInterface, R: CardReader> ControlLoop<I, R> {
    pub fn new(
        gate: AuthGate,
        reader: R,
        hub: SensorHub<I>,
        log: PersistenceLog,
        tick_interval: Duration,
        history_capacity: usize,
    ) -> (Self, DisplayHandle) {
        let latest = Arc::new(RwLock::new(None));
        let history = Arc::new(RwLock::new(HistoryBuffer::new(history_capacity)));

        let display = DisplayHandle {
            latest: Arc::clone(&latest),
            history: Arc::clone(&history),
        };

        let control = ControlLoop {
            state: SystemState::WaitingAuth,
            gate,
            reader,
            hub,
            log,
            latest,
            history,
            tick_interval,
        };

        (control, display)
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    /// Run until the shutdown signal fires. The persistence log is
    /// synced on the way out regardless of which phase was interrupted.
    pub async fn run(
        mut self,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.await_authentication(&mut shutdown).await {
            self.monitor(&mut shutdown).await;
        }

        if let Err(e) = self.log.sync().await {
            warn!("Final log sync failed: {}", e);
        }
        info!("Control loop stopped");
        Ok(())
    }

    /// WaitingAuth phase: block on card presentations until one is
    /// accepted. Returns false if shutdown arrived first.
    async fn await_authentication(&mut self, shutdown: &mut oneshot::Receiver<()>) -> bool {
        info!("Waiting for card authentication...");

        while self.state == SystemState::WaitingAuth {
            let raw = tokio::select! {
                _ = &mut *shutdown => return false,
                presented = self.reader.wait_for_presentation() => match presented {
                    Ok(raw) => raw,
                    Err(fault) => {
                        debug!("Card wait {}", fault);
                        sleep(READER_RETRY_DELAY).await;
                        continue;
                    }
                },
            };

            self.process_credential(&raw).await;
        }

        true
    }

    /// Authenticate one presented credential and apply the state
    /// transition. Only an accepted card in WaitingAuth moves the
    /// machine; there is no path back.
    async fn process_credential(&mut self, raw: &str) -> AuthOutcome {
        let outcome = self.gate.authenticate(raw, &mut self.log).await;

        if outcome == AuthOutcome::Accepted && self.state == SystemState::WaitingAuth {
            self.state = SystemState::Monitoring;
            info!("Session started, entering monitoring");
        }

        outcome
    }

    /// Monitoring phase: wall-clock-paced ticks. A poll that overruns
    /// its period delays the next tick instead of accumulating a
    /// backlog; per-tick failures degrade that Reading only.
    async fn monitor(&mut self, shutdown: &mut oneshot::Receiver<()>) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut *shutdown => break,
                _ = ticker.tick() => {}
            }

            let reading = self.hub.poll_once().await;

            self.history
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(reading.clone());
            *self
                .latest
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(reading.clone());

            if let Err(e) = self.log.append(&LogRecord::Reading(reading)).await {
                warn!("Logging degraded, monitoring continues: {}", e);
            }
        }

        info!("Shutdown requested, finishing in-flight tick");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_credential, CredentialStore};
    use crate::models::AuthResult;
    use crate::sensors::sim::{SimulatedCardReader, SimulatedHardware};
    use std::collections::HashSet;

    const KNOWN_CARD: &str = "01020304";

    async fn build_loop(
        dir: &tempfile::TempDir,
        reader: SimulatedCardReader,
    ) -> (
        ControlLoop<SimulatedHardware, SimulatedCardReader>,
        DisplayHandle,
    ) {
        let path = dir.path().join("data.jsonl");
        let log = PersistenceLog::open(path.to_str().unwrap()).await.unwrap();

        let store = CredentialStore::new(HashSet::from([hash_credential(KNOWN_CARD)]));
        ControlLoop::new(
            AuthGate::new(store),
            reader,
            SensorHub::new(SimulatedHardware::new()),
            log,
            Duration::from_millis(50),
            10,
        )
    }

    fn persisted_records(dir: &tempfile::TempDir) -> Vec<LogRecord> {
        let contents = std::fs::read_to_string(dir.path().join("data.jsonl")).unwrap();
        contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn starts_in_waiting_auth() {
        let dir = tempfile::tempdir().unwrap();
        let (control, display) = build_loop(&dir, SimulatedCardReader::new()).await;
        assert_eq!(control.state(), SystemState::WaitingAuth);
        assert!(display.latest_reading().is_none());
    }

    #[tokio::test]
    async fn rejected_credential_keeps_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let (mut control, _) = build_loop(&dir, SimulatedCardReader::new()).await;

        assert_eq!(
            control.process_credential("DEADBEEF").await,
            AuthOutcome::Rejected
        );
        assert_eq!(control.state(), SystemState::WaitingAuth);
    }

    #[tokio::test]
    async fn accepted_credential_transitions_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let (mut control, _) = build_loop(&dir, SimulatedCardReader::new()).await;

        assert_eq!(
            control.process_credential(KNOWN_CARD).await,
            AuthOutcome::Accepted
        );
        assert_eq!(control.state(), SystemState::Monitoring);

        // A second accepted card changes nothing
        control.process_credential(KNOWN_CARD).await;
        assert_eq!(control.state(), SystemState::Monitoring);
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_produces_readings_and_audit_trail() {
        let dir = tempfile::tempdir().unwrap();
        let (control, display) =
            build_loop(&dir, SimulatedCardReader::with_card(KNOWN_CARD)).await;

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(control.run(rx));

        // Card presentation takes 2 simulated seconds, then ticks run.
        // Poll the display handle so real-time file I/O can catch up
        // with the paused clock before shutdown is requested.
        for _ in 0..200 {
            if display.history_snapshot().len() >= 3 {
                break;
            }
            sleep(Duration::from_millis(100)).await;
        }
        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();

        let latest = display.latest_reading().expect("no reading published");
        let snapshot = display.history_snapshot();
        assert!(!snapshot.is_empty());
        assert!(snapshot.len() <= 10);
        assert_eq!(snapshot.last().unwrap(), &latest);

        let ticks: Vec<u64> = snapshot.iter().map(|r| r.tick).collect();
        let mut sorted = ticks.clone();
        sorted.sort_unstable();
        assert_eq!(ticks, sorted, "history out of chronological order");

        let records = persisted_records(&dir);
        assert!(records.iter().any(|r| matches!(
            r,
            LogRecord::Auth(a) if a.outcome == AuthResult::Accepted
        )));
        assert!(records
            .iter()
            .any(|r| matches!(r, LogRecord::Reading(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_card_never_starts_monitoring() {
        let dir = tempfile::tempdir().unwrap();
        let (control, display) =
            build_loop(&dir, SimulatedCardReader::with_card("FFFFFFFF")).await;

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(control.run(rx));

        // Wait until the rejection has been persisted
        for _ in 0..200 {
            let path = dir.path().join("data.jsonl");
            if std::fs::read_to_string(&path).is_ok_and(|c| !c.is_empty()) {
                break;
            }
            sleep(Duration::from_millis(100)).await;
        }
        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();

        assert!(display.latest_reading().is_none());
        assert!(display.history_snapshot().is_empty());

        let records = persisted_records(&dir);
        assert!(records.iter().all(|r| matches!(
            r,
            LogRecord::Auth(a) if a.outcome == AuthResult::RejectedUnknown
        )));
    }
}
