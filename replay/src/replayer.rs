use chrono::Utc;
use csv::StringRecord;
use log::{debug, info, warn};
use std::{fs::File, io, thread, time::Duration};

use crate::{
    config::ReplayConfig,
    error::{ReplayError, Result},
    row::{self, Columns, Reading},
    sink::{DatagramSink, UdpSink},
};

/// Counts for one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub sent: u64,
    pub skipped: u64,
}

/// Turns CSV rows into telemetry datagrams, one row at a time.
///
/// The sequence counter only advances for samples that reach the sink, so the
/// receiver sees 0, 1, 2, ... regardless of how many rows were skipped.
pub struct Replayer<S> {
    sink: S,
    interval: Duration,
    seq: u64,
}

impl<S: DatagramSink> Replayer<S> {
    pub fn new(sink: S, interval: Duration) -> Self {
        Self {
            sink,
            interval,
            seq: 0,
        }
    }

    pub fn replay<R: io::Read>(&mut self, mut reader: csv::Reader<R>) -> Result<ReplaySummary> {
        let headers = reader.headers()?.clone();
        let columns = Columns::from_headers(&headers);
        if !columns.has_throughput() {
            warn!(
                "header has no `{}` column, every row will be skipped",
                row::MEAN_THROUGHPUT_MBPS
            );
        }

        let mut summary = ReplaySummary::default();
        let mut record = StringRecord::new();

        while reader.read_record(&mut record)? {
            match row::parse_row(&columns, &record) {
                Ok(reading) => {
                    self.send(reading)?;
                    summary.sent += 1;
                    thread::sleep(self.interval);
                }
                Err(err) => {
                    // Printed regardless of the log filter.
                    let line = record.position().map_or(0, |p| p.line());
                    eprintln!(
                        "skipping row {} {}: {}",
                        line,
                        row::describe_row(&headers, &record),
                        err
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "input exhausted: {} sent, {} skipped",
            summary.sent, summary.skipped
        );
        Ok(summary)
    }

    fn send(&mut self, reading: Reading) -> Result<()> {
        let sample = reading.into_sample(Utc::now().timestamp_millis(), self.seq);
        self.seq += 1;

        let payload = sample.to_json()?;
        self.sink
            .send(payload.as_bytes())
            .map_err(ReplayError::Send)?;

        debug!("seq {}: {} byte datagram", sample.seq, payload.len());
        println!("sent: {payload}");
        Ok(())
    }
}

/// CSV reader with a header row. Short and long rows are accepted.
pub fn csv_reader<R: io::Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr)
}

/// Runs a full replay: resolve, connect, then stream the file.
pub fn run(config: &ReplayConfig) -> Result<ReplaySummary> {
    let addr = config.destination.resolve()?;
    let sink = UdpSink::connect(addr)?;

    let file = File::open(&config.csv_path).map_err(|source| ReplayError::Open {
        path: config.csv_path.clone(),
        source,
    })?;

    info!(
        "replaying {} to {} ({})",
        config.csv_path.display(),
        config.destination,
        addr
    );

    Replayer::new(sink, config.interval()).replay(csv_reader(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TelemetrySample;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingSink {
        datagrams: Vec<Vec<u8>>,
    }

    impl DatagramSink for RecordingSink {
        fn send(&mut self, payload: &[u8]) -> io::Result<()> {
            self.datagrams.push(payload.to_vec());
            Ok(())
        }
    }

    struct FailingSink;

    impl DatagramSink for FailingSink {
        fn send(&mut self, _payload: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }
    }

    fn replay_str(input: &str) -> (ReplaySummary, Vec<TelemetrySample>) {
        let mut sink = RecordingSink::default();
        let summary = Replayer::new(&mut sink, Duration::ZERO)
            .replay(csv_reader(input.as_bytes()))
            .unwrap();

        let samples = sink
            .datagrams
            .iter()
            .map(|d| TelemetrySample::from_bytes(d).unwrap())
            .collect();
        (summary, samples)
    }

    #[test]
    fn test_example_row() {
        let input = "clientLocation,iface,meanThroughputMbps,packetRetransmits,queueDepth,minRTT\n\
                     nyc-01,eth0,12.5,2,5,14.3\n";
        let (summary, samples) = replay_str(input);

        assert_eq!(summary, ReplaySummary { sent: 1, skipped: 0 });
        let sample = &samples[0];
        assert_eq!(sample.device_id, "nyc-01");
        assert_eq!(sample.iface, "eth0");
        assert_eq!(sample.rx_bps, 1_562_500.0);
        assert_eq!(sample.tx_bps, 1_562_500.0);
        assert_eq!(sample.drops, 2);
        assert_eq!(sample.queue_depth, 5);
        assert_eq!(sample.latency_ms, 14.3);
        assert_eq!(sample.seq, 0);
        assert!(sample.ts_unix_ms > 0);
    }

    #[test]
    fn test_skipped_rows_do_not_consume_seq() {
        let input = "clientLocation,meanThroughputMbps\n\
                     a,not_a_number\n\
                     b,1\n\
                     c,\n\
                     d,2\n\
                     e,oops\n\
                     f,3\n";
        let (summary, samples) = replay_str(input);

        assert_eq!(summary, ReplaySummary { sent: 3, skipped: 3 });
        let seqs: Vec<u64> = samples.iter().map(|s| s.seq).collect();
        let devices: Vec<&str> = samples.iter().map(|s| s.device_id.as_str()).collect();
        assert_eq!(seqs, [0, 1, 2]);
        assert_eq!(devices, ["b", "d", "f"]);
    }

    #[test]
    fn test_rx_equals_tx() {
        let input = "meanThroughputMbps\n0.5\n12.5\n1000\n";
        let (_, samples) = replay_str(input);

        assert_eq!(samples.len(), 3);
        for (sample, mbps) in samples.iter().zip([0.5, 12.5, 1000.0]) {
            assert_eq!(sample.rx_bps, mbps * 1e6 / 8.0);
            assert_eq!(sample.rx_bps, sample.tx_bps);
        }
    }

    #[test]
    fn test_missing_throughput_column_skips_everything() {
        let mut sink = RecordingSink::default();
        let mut replayer = Replayer::new(&mut sink, Duration::ZERO);
        let summary = replayer
            .replay(csv_reader("clientLocation,iface\nx,eth0\ny,eth1\n".as_bytes()))
            .unwrap();

        assert_eq!(summary, ReplaySummary { sent: 0, skipped: 2 });
        assert!(sink.datagrams.is_empty());

        // counter untouched: the next usable row still goes out as seq 0
        let (_, samples) = replay_str("meanThroughputMbps\n4\n");
        assert_eq!(samples[0].seq, 0);
    }

    #[test]
    fn test_pause_follows_sent_rows_only() {
        let interval = Duration::from_millis(50);
        let input = "meanThroughputMbps\n\
                     bad\n\
                     1\n\
                     \x20\n\
                     nope\n\
                     2\n";

        let mut sink = RecordingSink::default();
        let started = Instant::now();
        let summary = Replayer::new(&mut sink, interval)
            .replay(csv_reader(input.as_bytes()))
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(summary, ReplaySummary { sent: 2, skipped: 3 });
        assert!(elapsed >= interval * 2, "elapsed {:?}", elapsed);
        assert!(elapsed < interval * 5, "elapsed {:?}", elapsed);
    }

    #[test]
    fn test_empty_input() {
        let (summary, samples) = replay_str("");
        assert_eq!(summary, ReplaySummary::default());
        assert!(samples.is_empty());
    }

    #[test]
    fn test_send_failure_is_fatal() {
        let mut replayer = Replayer::new(FailingSink, Duration::ZERO);
        let err = replayer
            .replay(csv_reader("meanThroughputMbps\n1\n2\n".as_bytes()))
            .unwrap_err();
        assert!(matches!(err, ReplayError::Send(_)));
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let mut input = b"meanThroughputMbps,iface\n1,".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);

        let mut replayer = Replayer::new(RecordingSink::default(), Duration::ZERO);
        let err = replayer.replay(csv_reader(input.as_slice())).unwrap_err();
        assert!(matches!(err, ReplayError::Csv(_)));
    }
}
