//! Collection window: one bounded channel per source, one task owning the buffers.
//!
//! Producers only ever send; the collector task is the single owner of both
//! growing sequences. When the window closes (timeout, explicit completion, or
//! every producer gone) both channels are closed and whatever was already
//! queued is drained into the buffers. The task then hands back an immutable
//! [`Snapshot`], so alignment never sees a sequence that is still growing.
//! Sends after close are rejected and counted as late.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::datapoint::{Datapoint, Source};
use crate::error::ValidationError;
use crate::sensor::{SensorType, SensorTypeMap};
use crate::telemetry;

/// Default per-source channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A sample from the platform sensor callback.
#[derive(Debug, Clone)]
pub struct ReferenceEvent {
    /// Platform sensor type of the event.
    pub ap_sensor_type: i32,
    pub timestamp: i64,
    pub values: Vec<f32>,
}

/// A decoded data message from the device under test.
#[derive(Debug, Clone)]
pub struct DeviceBatch {
    /// CHRE sensor type the batch claims to carry.
    pub chre_sensor_type: i32,
    /// `(timestamp, values)` in arrival order.
    pub datapoints: Vec<(i64, Vec<f32>)>,
}

/// Immutable copy of both sequences, taken when the window closed.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub sensor: SensorType,
    pub reference: Vec<Datapoint>,
    pub device: Vec<Datapoint>,
    /// Samples whose send was rejected because the window had already
    /// closed, counted up to [`CollectionHandle::finish`].
    pub late_samples: usize,
}

impl Snapshot {
    /// Fail fast when either side collected nothing.
    pub fn ensure_non_empty(&self) -> Result<(), ValidationError> {
        if self.device.is_empty() {
            return Err(ValidationError::NoData(Source::DeviceUnderTest));
        }
        if self.reference.is_empty() {
            return Err(ValidationError::NoData(Source::Reference));
        }
        Ok(())
    }
}

/// Why the window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Timeout,
    Completed,
    ProducersGone,
}

/// Samples rejected after close, per source.
#[derive(Debug, Default)]
struct LateCounts {
    reference: AtomicUsize,
    device: AtomicUsize,
}

/// Sending half for reference samples. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReferenceProducer {
    tx: mpsc::Sender<ReferenceEvent>,
    late: Arc<LateCounts>,
}

impl ReferenceProducer {
    pub async fn send(&self, event: ReferenceEvent) -> Result<(), ValidationError> {
        self.tx.send(event).await.map_err(|_| self.rejected())
    }

    /// Non-blocking send for synchronous callback contexts.
    pub fn try_send(&self, event: ReferenceEvent) -> Result<(), ValidationError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                ValidationError::Collector("reference channel full".into())
            }
            mpsc::error::TrySendError::Closed(_) => self.rejected(),
        })
    }

    fn rejected(&self) -> ValidationError {
        self.late.reference.fetch_add(1, Ordering::Relaxed);
        window_closed()
    }
}

/// Sending half for device batches. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DeviceProducer {
    tx: mpsc::Sender<DeviceBatch>,
    late: Arc<LateCounts>,
}

impl DeviceProducer {
    pub async fn send(&self, batch: DeviceBatch) -> Result<(), ValidationError> {
        self.tx
            .send(batch)
            .await
            .map_err(|mpsc::error::SendError(batch)| self.rejected(&batch))
    }

    pub fn try_send(&self, batch: DeviceBatch) -> Result<(), ValidationError> {
        self.tx.try_send(batch).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                ValidationError::Collector("device channel full".into())
            }
            mpsc::error::TrySendError::Closed(batch) => self.rejected(&batch),
        })
    }

    fn rejected(&self, batch: &DeviceBatch) -> ValidationError {
        self.late.device.fetch_add(batch.datapoints.len(), Ordering::Relaxed);
        window_closed()
    }
}

fn window_closed() -> ValidationError {
    ValidationError::Collector("collection window closed".into())
}

/// Settings for one collection window.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub channel_capacity: usize,
    pub window: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            window: Duration::from_millis(5000),
        }
    }
}

/// Handle to a running collection window.
#[derive(Debug)]
pub struct CollectionHandle {
    reference: ReferenceProducer,
    device: DeviceProducer,
    done: CancellationToken,
    late: Arc<LateCounts>,
    task: JoinHandle<Result<Snapshot, ValidationError>>,
}

impl CollectionHandle {
    pub fn reference_producer(&self) -> ReferenceProducer {
        self.reference.clone()
    }

    pub fn device_producer(&self) -> DeviceProducer {
        self.device.clone()
    }

    /// Close the window early. Idempotent.
    pub fn complete(&self) {
        self.done.cancel();
    }

    /// Wait for the window to close and take the snapshot.
    pub async fn finish(self) -> Result<Snapshot, ValidationError> {
        let Self { reference, device, late, task, .. } = self;
        drop(reference);
        drop(device);
        let result = task
            .await
            .map_err(|e| ValidationError::Collector(format!("collector task failed: {}", e)))?;

        let late_reference = late.reference.load(Ordering::Relaxed);
        let late_device = late.device.load(Ordering::Relaxed);
        telemetry::record_late_samples(Source::Reference, late_reference);
        telemetry::record_late_samples(Source::DeviceUnderTest, late_device);
        if late_reference + late_device > 0 {
            tracing::debug!(late_reference, late_device, "samples rejected after close");
        }

        let mut snapshot = result?;
        snapshot.late_samples = late_reference + late_device;
        Ok(snapshot)
    }
}

/// Open a collection window for `sensor`.
///
/// Spawns the collector task, so this must be called within a Tokio runtime.
/// Incoming samples are checked against the sensor's type and values length;
/// the first violation is latched and returned from [`CollectionHandle::finish`].
pub fn open(
    sensor: SensorType,
    map: &SensorTypeMap,
    config: CollectorConfig,
) -> Result<CollectionHandle, ValidationError> {
    let expected_chre = map
        .to_chre(sensor.ap_type())
        .ok_or(ValidationError::UnknownSensorType(sensor.ap_type()))?;
    let capacity = config.channel_capacity.max(1);
    let (ref_tx, ref_rx) = mpsc::channel(capacity);
    let (dev_tx, dev_rx) = mpsc::channel(capacity);
    let done = CancellationToken::new();
    let late = Arc::new(LateCounts::default());

    let state = CollectorState {
        sensor,
        expected_chre,
        ap_for_chre: map.clone(),
        reference: Vec::new(),
        device: Vec::new(),
        error: None,
    };
    // The window runs from open, not from the task's first poll.
    let deadline = Instant::now() + config.window;
    let task = tokio::spawn(run(state, ref_rx, dev_rx, done.clone(), deadline));

    Ok(CollectionHandle {
        reference: ReferenceProducer { tx: ref_tx, late: Arc::clone(&late) },
        device: DeviceProducer { tx: dev_tx, late: Arc::clone(&late) },
        done,
        late,
        task,
    })
}

struct CollectorState {
    sensor: SensorType,
    expected_chre: i32,
    ap_for_chre: SensorTypeMap,
    reference: Vec<Datapoint>,
    device: Vec<Datapoint>,
    error: Option<ValidationError>,
}

impl CollectorState {
    fn latch(&mut self, error: ValidationError) {
        if self.error.is_none() {
            tracing::warn!(error = %error, "rejecting collected data");
            self.error = Some(error);
        }
    }

    fn expected_len(&self) -> usize {
        self.sensor.config().expected_values_length
    }

    fn on_reference(&mut self, event: ReferenceEvent) {
        let expected = self.sensor.ap_type();
        if event.ap_sensor_type != expected {
            self.latch(ValidationError::SensorTypeMismatch {
                expected,
                actual: event.ap_sensor_type,
            });
            return;
        }
        if event.values.len() != self.expected_len() {
            self.latch(ValidationError::ValuesLength {
                origin: Source::Reference,
                expected: self.expected_len(),
                actual: event.values.len(),
            });
            return;
        }
        self.reference.push(Datapoint::reference(event.timestamp, event.values));
    }

    fn on_device(&mut self, batch: DeviceBatch) {
        if batch.chre_sensor_type != self.expected_chre {
            let actual = self
                .ap_for_chre
                .to_ap(batch.chre_sensor_type)
                .unwrap_or(batch.chre_sensor_type);
            self.latch(ValidationError::SensorTypeMismatch {
                expected: self.sensor.ap_type(),
                actual,
            });
            return;
        }
        for (timestamp, values) in batch.datapoints {
            if values.len() != self.expected_len() {
                self.latch(ValidationError::ValuesLength {
                    origin: Source::DeviceUnderTest,
                    expected: self.expected_len(),
                    actual: values.len(),
                });
                break;
            }
            self.device.push(Datapoint::device(timestamp, values));
        }
    }
}

async fn run(
    mut state: CollectorState,
    mut ref_rx: mpsc::Receiver<ReferenceEvent>,
    mut dev_rx: mpsc::Receiver<DeviceBatch>,
    done: CancellationToken,
    deadline: Instant,
) -> Result<Snapshot, ValidationError> {
    let deadline = tokio::time::sleep_until(deadline);
    tokio::pin!(deadline);
    let (mut ref_open, mut dev_open) = (true, true);

    let reason = loop {
        if !ref_open && !dev_open {
            break CloseReason::ProducersGone;
        }
        tokio::select! {
            biased;
            () = done.cancelled() => break CloseReason::Completed,
            () = &mut deadline => break CloseReason::Timeout,
            event = ref_rx.recv(), if ref_open => match event {
                Some(event) => state.on_reference(event),
                None => ref_open = false,
            },
            batch = dev_rx.recv(), if dev_open => match batch {
                Some(batch) => state.on_device(batch),
                None => dev_open = false,
            },
        }
    };

    // Closing stops new sends; anything enqueued before this point belongs
    // to the window.
    ref_rx.close();
    dev_rx.close();
    while let Ok(event) = ref_rx.try_recv() {
        state.on_reference(event);
    }
    while let Ok(batch) = dev_rx.try_recv() {
        state.on_device(batch);
    }

    tracing::debug!(
        ?reason,
        reference = state.reference.len(),
        device = state.device.len(),
        "collection window closed"
    );
    telemetry::record_samples_collected(Source::Reference, state.reference.len());
    telemetry::record_samples_collected(Source::DeviceUnderTest, state.device.len());

    if let Some(error) = state.error {
        return Err(error);
    }
    Ok(Snapshot {
        sensor: state.sensor,
        reference: state.reference,
        device: state.device,
        late_samples: 0,
    })
}
