//! Monotonic per-stream timestamp correction applied to audio/video/meta
//! messages before they are handed to a downstream source.

/// Which correction algorithm a session runs.
///
/// `threshold_ms` only matters for `Full` and is read from session
/// configuration rather than hard-coded, so the 250 ms commonly seen in
/// the wild is just the default, not a constant the corrector assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterAlgorithm {
    Full,
    Zero,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTrack {
    Audio,
    Video,
}

impl MediaTrack {
    /// Forced delta (ms) used by the `Full` algorithm when the observed
    /// delta falls outside the configured threshold.
    fn forced_delta_ms(&self) -> u32 {
        match self {
            MediaTrack::Audio => 10,
            MediaTrack::Video => 20,
        }
    }
}

/// Tracks the last raw and corrected timestamps seen on a stream so
/// corrected output stays non-decreasing even across clock wraps or
/// a publisher that jumps its clock backwards.
#[derive(Debug, Clone)]
pub struct JitterState {
    algorithm: JitterAlgorithm,
    threshold_ms: u32,
    last_pkt_time: Option<u32>,
    last_pkt_correct_time: u32,
    /// `Zero` mode's origin: the raw timestamp of the first packet seen
    /// since the last reset.
    origin: Option<u32>,
}

impl JitterState {
    pub fn new(algorithm: JitterAlgorithm, threshold_ms: u32) -> Self {
        Self {
            algorithm,
            threshold_ms,
            last_pkt_time: None,
            last_pkt_correct_time: 0,
            origin: None,
        }
    }

    /// Clears all correction state. Called on publish start and on
    /// stream switch so a new publisher's clock never inherits the
    /// previous one's corrected baseline.
    pub fn reset(&mut self) {
        self.last_pkt_time = None;
        self.last_pkt_correct_time = 0;
        self.origin = None;
    }

    pub fn correct(&mut self, track: MediaTrack, raw_timestamp: u32) -> u32 {
        let corrected = match self.algorithm {
            JitterAlgorithm::Off => raw_timestamp,
            JitterAlgorithm::Zero => {
                let origin = *self.origin.get_or_insert(raw_timestamp);
                raw_timestamp.wrapping_sub(origin)
            }
            JitterAlgorithm::Full => self.correct_full(track, raw_timestamp),
        };

        self.last_pkt_time = Some(raw_timestamp);
        if self.algorithm == JitterAlgorithm::Full {
            self.last_pkt_correct_time = corrected;
        }
        corrected
    }

    fn correct_full(&mut self, track: MediaTrack, raw_timestamp: u32) -> u32 {
        let delta = match self.last_pkt_time {
            None => 0,
            Some(last) => raw_timestamp.wrapping_sub(last),
        };

        let applied_delta = if self.last_pkt_time.is_none() {
            0
        } else if delta <= self.threshold_ms {
            delta
        } else {
            track.forced_delta_ms()
        };

        self.last_pkt_correct_time
            .saturating_add(applied_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_passes_through_unchanged() {
        let mut state = JitterState::new(JitterAlgorithm::Off, 250);
        assert_eq!(state.correct(MediaTrack::Video, 1000), 1000);
        assert_eq!(state.correct(MediaTrack::Video, 900), 900);
    }

    #[test]
    fn zero_rebases_to_first_packet() {
        let mut state = JitterState::new(JitterAlgorithm::Zero, 250);
        assert_eq!(state.correct(MediaTrack::Audio, 5000), 0);
        assert_eq!(state.correct(MediaTrack::Audio, 5040), 40);
    }

    #[test]
    fn full_passes_small_deltas_through() {
        let mut state = JitterState::new(JitterAlgorithm::Full, 250);
        assert_eq!(state.correct(MediaTrack::Video, 1000), 0);
        assert_eq!(state.correct(MediaTrack::Video, 1033), 33);
        assert_eq!(state.correct(MediaTrack::Video, 1066), 66);
    }

    #[test]
    fn full_clamps_large_jumps_to_forced_delta() {
        let mut state = JitterState::new(JitterAlgorithm::Full, 250);
        state.correct(MediaTrack::Video, 1000);
        let corrected = state.correct(MediaTrack::Video, 5000);
        assert_eq!(corrected, 20);
    }

    #[test]
    fn reset_clears_baseline() {
        let mut state = JitterState::new(JitterAlgorithm::Zero, 250);
        state.correct(MediaTrack::Audio, 5000);
        state.reset();
        assert_eq!(state.correct(MediaTrack::Audio, 100), 0);
    }

    #[test]
    fn output_never_decreases_under_full() {
        let mut state = JitterState::new(JitterAlgorithm::Full, 250);
        let mut prev = 0;
        for raw in [1000u32, 1010, 990, 1005, 10000, 10010] {
            let corrected = state.correct(MediaTrack::Audio, raw);
            assert!(corrected >= prev);
            prev = corrected;
        }
    }
}
