//! Optional throughput probe run inside `CONNECTED`, piggy-backed on the
//! existing protocol-control (`SetPeerBandwidth`/`Acknowledgement`) and
//! command (`Call`) machinery rather than a dedicated wire format.
//!
//! The connection state machine drives this: it sends the probe burst
//! with the chunk writer it already owns, and feeds every acknowledged
//! byte count into `record_ack` until the window closes.
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
pub struct BandwidthCheckConfig {
    pub enabled: bool,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct BandwidthEstimate {
    pub bytes_acked: u64,
    pub elapsed: Duration,
    pub bits_per_sec: f64,
}

/// Measures elapsed wall-clock time against bytes acknowledged during a
/// bounded window. Never feeds its result back into flow control; the
/// estimate is advisory metadata surfaced to the caller once finished.
#[derive(Debug)]
pub struct BandwidthTest {
    started_at: Instant,
    window: Duration,
    bytes_acked: u64,
}

impl BandwidthTest {
    pub fn start(window: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            window,
            bytes_acked: 0,
        }
    }

    pub fn record_ack(&mut self, bytes: u64) {
        self.bytes_acked += bytes;
    }

    pub fn is_expired(&self) -> bool {
        self.started_at.elapsed() >= self.window
    }

    pub fn finish(self) -> BandwidthEstimate {
        let elapsed = self.started_at.elapsed();
        let bits_per_sec = if elapsed.as_secs_f64() > 0.0 {
            (self.bytes_acked as f64 * 8.0) / elapsed.as_secs_f64()
        } else {
            0.0
        };

        BandwidthEstimate {
            bytes_acked: self.bytes_acked,
            elapsed,
            bits_per_sec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn estimate_reflects_acked_bytes_over_elapsed_time() {
        let mut probe = BandwidthTest::start(Duration::from_secs(5));
        probe.record_ack(125_000);
        sleep(Duration::from_millis(10));
        let estimate = probe.finish();
        assert_eq!(estimate.bytes_acked, 125_000);
        assert!(estimate.bits_per_sec > 0.0);
    }

    #[test]
    fn disabled_config_defaults_to_off() {
        let config = BandwidthCheckConfig::default();
        assert!(!config.enabled);
    }
}
