//! Mapping from CSV rows to telemetry readings.
//!
//! Only `meanThroughputMbps` is required. Every other recognised column falls
//! back to a default when the header does not have it. A column that is present
//! but holds an empty or non-numeric cell fails the row.

use csv::StringRecord;

use crate::error::RowError;
use crate::protocol::{TelemetrySample, mbps_to_bytes_per_sec};

pub const CLIENT_LOCATION: &str = "clientLocation";
pub const IFACE: &str = "iface";
pub const MEAN_THROUGHPUT_MBPS: &str = "meanThroughputMbps";
pub const PACKET_RETRANSMITS: &str = "packetRetransmits";
pub const QUEUE_DEPTH: &str = "queueDepth";
pub const MIN_RTT: &str = "minRTT";

pub const DEFAULT_DEVICE_ID: &str = "mlab-demo";
pub const DEFAULT_IFACE: &str = "uplink";
pub const DEFAULT_DROPS: u32 = 0;
pub const DEFAULT_QUEUE_DEPTH: i32 = 3;
pub const DEFAULT_LATENCY_MS: f64 = 1.0;

/// Positions of the recognised columns in the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    client_location: Option<usize>,
    iface: Option<usize>,
    mean_throughput_mbps: Option<usize>,
    packet_retransmits: Option<usize>,
    queue_depth: Option<usize>,
    min_rtt: Option<usize>,
}

impl Columns {
    /// Locates the recognised columns. When a name repeats, the last one wins.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut columns = Columns::default();

        for (i, name) in headers.iter().enumerate() {
            let slot = match name {
                CLIENT_LOCATION => &mut columns.client_location,
                IFACE => &mut columns.iface,
                MEAN_THROUGHPUT_MBPS => &mut columns.mean_throughput_mbps,
                PACKET_RETRANSMITS => &mut columns.packet_retransmits,
                QUEUE_DEPTH => &mut columns.queue_depth,
                MIN_RTT => &mut columns.min_rtt,
                _ => continue,
            };
            *slot = Some(i);
        }

        columns
    }

    pub fn has_throughput(&self) -> bool {
        self.mean_throughput_mbps.is_some()
    }
}

/// Everything a sample needs except the timestamp and sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub device_id: String,
    pub iface: String,
    pub throughput_bps: f64,
    pub drops: u32,
    pub queue_depth: i32,
    pub latency_ms: f64,
}

impl Reading {
    pub fn into_sample(self, ts_unix_ms: i64, seq: u64) -> TelemetrySample {
        TelemetrySample {
            device_id: self.device_id,
            iface: self.iface,
            ts_unix_ms,
            rx_bps: self.throughput_bps,
            tx_bps: self.throughput_bps,
            drops: self.drops,
            queue_depth: self.queue_depth,
            latency_ms: self.latency_ms,
            seq,
        }
    }
}

pub fn parse_row(columns: &Columns, record: &StringRecord) -> Result<Reading, RowError> {
    let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i));

    let throughput_mbps = cell(columns.mean_throughput_mbps)
        .ok_or(RowError::MissingColumn(MEAN_THROUGHPUT_MBPS))
        .and_then(|v| parse_number(MEAN_THROUGHPUT_MBPS, v))?;

    let drops = match cell(columns.packet_retransmits) {
        Some(v) => truncate_u32(PACKET_RETRANSMITS, parse_number(PACKET_RETRANSMITS, v)?)?,
        None => DEFAULT_DROPS,
    };

    let queue_depth = match cell(columns.queue_depth) {
        Some(v) => truncate_i32(QUEUE_DEPTH, parse_number(QUEUE_DEPTH, v)?)?,
        None => DEFAULT_QUEUE_DEPTH,
    };

    let latency_ms = match cell(columns.min_rtt) {
        Some(v) => parse_number(MIN_RTT, v)?,
        None => DEFAULT_LATENCY_MS,
    };

    Ok(Reading {
        device_id: cell(columns.client_location)
            .unwrap_or(DEFAULT_DEVICE_ID)
            .to_string(),
        iface: cell(columns.iface).unwrap_or(DEFAULT_IFACE).to_string(),
        throughput_bps: mbps_to_bytes_per_sec(throughput_mbps),
        drops,
        queue_depth,
        latency_ms,
    })
}

/// Renders a row as `{column: "value", ...}` for diagnostics.
pub fn describe_row(headers: &StringRecord, record: &StringRecord) -> String {
    let fields: Vec<String> = record
        .iter()
        .enumerate()
        .map(|(i, value)| format!("{}: {:?}", headers.get(i).unwrap_or("?"), value))
        .collect();
    format!("{{{}}}", fields.join(", "))
}

fn parse_number(column: &'static str, raw: &str) -> Result<f64, RowError> {
    let value: f64 = raw.trim().parse().map_err(|_| RowError::InvalidNumber {
        column,
        value: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(RowError::NotFinite { column, value });
    }
    Ok(value)
}

fn truncate_u32(column: &'static str, value: f64) -> Result<u32, RowError> {
    let t = value.trunc();
    if t < 0.0 || t > u32::MAX as f64 {
        return Err(RowError::OutOfRange { column, value });
    }
    Ok(t as u32)
}

fn truncate_i32(column: &'static str, value: f64) -> Result<i32, RowError> {
    let t = value.trunc();
    if t < i32::MIN as f64 || t > i32::MAX as f64 {
        return Err(RowError::OutOfRange { column, value });
    }
    Ok(t as i32)
}
