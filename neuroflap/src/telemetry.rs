//! An optional per-tick feed of what every live agent fed its
//! network, for offline analysis.
use crate::geometry::Rect;
use crate::populations::NetworkId;

use serde::{Deserialize, Serialize};

use std::sync::{Arc, Mutex, PoisonError};

/// Network inputs and output of one agent during one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub agent: NetworkId,
    /// Scroll position of the tick.
    pub scroll: u32,
    /// Sensor values followed by the scaled speed and acceleration.
    pub inputs: Vec<f64>,
    pub output: f64,
    /// Obstacles handed to the sensor, relative to the agent's position.
    pub obstacles: Vec<Rect>,
}

/// A consumer of telemetry records.
///
/// Records are delivered in agent id order after every tick,
/// whatever the execution mode. Sinks only observe the
/// simulation; they cannot alter it.
pub trait TelemetrySink {
    fn record(&mut self, record: &TelemetryRecord);
}

/// Keeps every record in memory. Clones share the same storage,
/// so a clone can be handed to a trainer and read back later.
///
/// # Examples
/// ```
/// use neuroflap::telemetry::{TelemetryBuffer, TelemetrySink};
///
/// let buffer = TelemetryBuffer::default();
/// let mut sink = buffer.clone();
/// # let record = neuroflap::telemetry::TelemetryRecord {
/// #     agent: neuroflap::NetworkId(0), scroll: 1, inputs: vec![], output: 0.0, obstacles: vec![],
/// # };
/// sink.record(&record);
/// assert_eq!(buffer.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TelemetryBuffer {
    records: Arc<Mutex<Vec<TelemetryRecord>>>,
}

impl TelemetryBuffer {
    /// Returns a copy of all records received so far.
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns all records received so far.
    pub fn drain(&self) -> Vec<TelemetryRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl TelemetrySink for TelemetryBuffer {
    fn record(&mut self, record: &TelemetryRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(agent: usize) -> TelemetryRecord {
        TelemetryRecord {
            agent: NetworkId(agent),
            scroll: 7,
            inputs: vec![0.0, 0.5],
            output: -0.25,
            obstacles: vec![Rect::new(1.0, 2.0, 3.0, 4.0)],
        }
    }

    #[test]
    fn clones_share_records() {
        let buffer = TelemetryBuffer::default();
        let mut sink = buffer.clone();
        sink.record(&record(0));
        sink.record(&record(1));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.records()[1].agent, NetworkId(1));

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn records_serialize() {
        let json = serde_json::to_string(&record(3)).unwrap();
        let back: TelemetryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record(3));
    }
}
