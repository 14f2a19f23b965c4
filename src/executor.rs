//! Serialised access to a [`FusionEngine`].
//!
//! [`FusionWorker`] owns the engine, the sensor state and the display sink on a
//! single thread; sensor callbacks on any thread submit events through cloned
//! [`FusionHandle`]s and the worker applies them one at a time in arrival order.
//! [`SharedEngine`] is the lock-based alternative for hosts that would rather
//! call the engine directly from several threads.

use crossbeam::channel::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::config::FusionConfig;
use crate::error::{FusionError, FusionResult};
use crate::sensors::SensorState;
use crate::step_fusion::{DisplaySink, FusionEngine, FusionEvent, FusionSnapshot};
use crate::types::SensorEvent;

enum Command {
    Sensor(SensorEvent),
    UpdateConfig(FusionConfig, Sender<FusionResult<()>>),
    Recalibrate,
    Snapshot(Sender<FusionSnapshot>),
    Shutdown,
}

/// Cloneable submission side of a running worker.
#[derive(Clone)]
pub struct FusionHandle {
    tx: Sender<Command>,
}

impl FusionHandle {
    pub fn submit(&self, event: SensorEvent) -> FusionResult<()> {
        self.send(Command::Sensor(event))
    }

    pub fn update_config(&self, config: FusionConfig) -> FusionResult<()> {
        let (reply_tx, reply_rx) = channel::bounded(1);
        self.send(Command::UpdateConfig(config, reply_tx))?;
        reply_rx.recv().map_err(|_| FusionError::WorkerStopped)?
    }

    pub fn recalibrate(&self) -> FusionResult<()> {
        self.send(Command::Recalibrate)
    }

    /// Snapshot taken after every command queued before it has been applied.
    pub fn snapshot(&self) -> FusionResult<FusionSnapshot> {
        let (reply_tx, reply_rx) = channel::bounded(1);
        self.send(Command::Snapshot(reply_tx))?;
        reply_rx.recv().map_err(|_| FusionError::WorkerStopped)
    }

    fn send(&self, command: Command) -> FusionResult<()> {
        self.tx.send(command).map_err(|_| FusionError::WorkerStopped)
    }
}

/// Everything the worker owned, handed back on shutdown.
pub struct WorkerReport<S> {
    pub engine: FusionEngine,
    pub sensors: SensorState,
    pub sink: S,
    pub events_processed: u64,
}

pub struct FusionWorker<S> {
    handle: FusionHandle,
    thread: JoinHandle<WorkerReport<S>>,
}

impl<S> FusionWorker<S>
where
    S: DisplaySink + Send + 'static,
{
    /// Start the worker thread. Produced [`FusionEvent`]s are forwarded to `events` when given.
    pub fn spawn(engine: FusionEngine, sink: S, events: Option<Sender<FusionEvent>>) -> FusionResult<Self> {
        let (tx, rx) = channel::unbounded();
        let thread = thread::Builder::new()
            .name("fusion-worker".to_string())
            .spawn(move || run(rx, engine, sink, events))?;
        Ok(Self {
            handle: FusionHandle { tx },
            thread,
        })
    }

    pub fn handle(&self) -> FusionHandle {
        self.handle.clone()
    }

    /// Drain commands queued so far, stop the thread and return its state.
    pub fn shutdown(self) -> FusionResult<WorkerReport<S>> {
        if self.handle.send(Command::Shutdown).is_err() {
            log::warn!("fusion worker already stopped before shutdown");
        }
        self.thread.join().map_err(|_| FusionError::WorkerStopped)
    }
}

fn run<S: DisplaySink>(
    rx: Receiver<Command>,
    mut engine: FusionEngine,
    mut sink: S,
    mut events: Option<Sender<FusionEvent>>,
) -> WorkerReport<S> {
    let mut sensors = SensorState::new();
    let mut events_processed = 0u64;

    for command in rx.iter() {
        match command {
            Command::Sensor(event) => {
                let produced = engine.dispatch(&event, &mut sensors, &mut sink);
                events_processed += 1;
                forward(&mut events, produced);
            }
            Command::UpdateConfig(config, reply) => {
                let result = engine
                    .update_config(config)
                    .map(|produced| forward(&mut events, produced));
                let _ = reply.send(result);
            }
            Command::Recalibrate => {
                let produced = engine.recalibrate();
                forward(&mut events, produced);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(engine.snapshot());
            }
            Command::Shutdown => break,
        }
    }

    log::debug!("fusion worker stopping after {events_processed} sensor events");
    WorkerReport {
        engine,
        sensors,
        sink,
        events_processed,
    }
}

fn forward(events: &mut Option<Sender<FusionEvent>>, produced: Vec<FusionEvent>) {
    let Some(tx) = events.as_ref() else {
        return;
    };
    let delivered = produced.into_iter().all(|event| tx.send(event).is_ok());
    if !delivered {
        log::warn!("fusion event receiver dropped, no longer forwarding events");
        *events = None;
    }
}

// ─── Lock-based sharing ──────────────────────────────────────────────────────

struct EngineCell {
    engine: FusionEngine,
    sensors: SensorState,
}

/// Engine plus sensor state behind one mutex, so a step and a GPS update can
/// never interleave mid-update.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<EngineCell>>,
}

impl SharedEngine {
    pub fn new(engine: FusionEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineCell {
                engine,
                sensors: SensorState::new(),
            })),
        }
    }

    pub fn dispatch(&self, event: &SensorEvent, sink: &mut impl DisplaySink) -> FusionResult<Vec<FusionEvent>> {
        let mut cell = self.lock()?;
        let EngineCell { engine, sensors } = &mut *cell;
        Ok(engine.dispatch(event, sensors, sink))
    }

    pub fn update_config(&self, config: FusionConfig) -> FusionResult<Vec<FusionEvent>> {
        self.lock()?.engine.update_config(config)
    }

    pub fn recalibrate(&self) -> FusionResult<Vec<FusionEvent>> {
        Ok(self.lock()?.engine.recalibrate())
    }

    pub fn snapshot(&self) -> FusionResult<FusionSnapshot> {
        Ok(self.lock()?.engine.snapshot())
    }

    fn lock(&self) -> FusionResult<MutexGuard<'_, EngineCell>> {
        self.inner.lock().map_err(|_| {
            log::warn!("engine mutex poisoned");
            FusionError::LockPoisoned("engine")
        })
    }
}
