use serde::{Deserialize, Serialize};

/// One telemetry sample as the controller expects it: a compact JSON object
/// carried in a single UDP datagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub device_id: String,
    pub iface: String,
    pub ts_unix_ms: i64,   // milliseconds since UNIX epoch
    pub rx_bps: f64,       // bytes per second
    pub tx_bps: f64,       // bytes per second
    pub drops: u32,
    pub queue_depth: i32,
    pub latency_ms: f64,
    pub seq: u64,
}

impl TelemetrySample {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// A break in the sequence seen by a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqGap {
    pub expected: u64,
    pub got: u64,
}

/// Follows `seq` across received samples.
#[derive(Debug, Default)]
pub struct SeqTracker {
    last: Option<u64>,
}

impl SeqTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `seq` and reports a gap when it does not follow the previous one.
    /// The first sample never reports a gap.
    pub fn observe(&mut self, seq: u64) -> Option<SeqGap> {
        let gap = self.last.and_then(|prev| {
            let expected = prev.wrapping_add(1);
            (seq != expected).then_some(SeqGap { expected, got: seq })
        });
        self.last = Some(seq);
        gap
    }
}

/// Converts megabits per second to bytes per second.
pub fn mbps_to_bytes_per_sec(mbps: f64) -> f64 {
    mbps * 1e6 / 8.0
}
