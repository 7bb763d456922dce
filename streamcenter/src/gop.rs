use std::collections::VecDeque;

use crate::frame_info::FrameData;

/// Bounded recent-frame cache for a single stream. Deliberately not a
/// GOP-aligned replay buffer: it keeps the last sequence header per
/// track plus a capped deque of recent frames, enough to seed a late
/// subscriber without tuning replay windows.
#[derive(Debug)]
pub struct RecentFrameCache {
    pub video_sequence_header: Option<FrameData>,
    pub audio_sequence_header: Option<FrameData>,
    pub meta_frame: Option<FrameData>,
    frames: VecDeque<FrameData>,
    max_frames: usize,
    dropped_frame_cnt: u64,
}

impl RecentFrameCache {
    pub fn new(max_frames: usize) -> Self {
        Self {
            video_sequence_header: None,
            audio_sequence_header: None,
            meta_frame: None,
            frames: VecDeque::with_capacity(max_frames),
            max_frames,
            dropped_frame_cnt: 0,
        }
    }

    pub fn dropped_frame_cnt(&self) -> u64 {
        self.dropped_frame_cnt
    }

    pub fn frame_cnt(&self) -> usize {
        self.frames.len()
    }

    pub fn append(&mut self, frame: FrameData) {
        if frame.is_sequence_header() {
            match &frame {
                FrameData::Video { .. } => self.video_sequence_header = Some(frame),
                FrameData::Audio { .. } => self.audio_sequence_header = Some(frame),
                FrameData::Meta { .. } | FrameData::Aggregate { .. } => {
                    self.meta_frame = Some(frame)
                }
            }
            return;
        }

        if frame.is_meta() {
            self.meta_frame = Some(frame);
            return;
        }

        if self.frames.len() >= self.max_frames {
            self.frames.pop_front();
            self.dropped_frame_cnt += 1;
        }
        self.frames.push_back(frame);
    }

    /// Sequence headers followed by the recent-frame window, in the
    /// order a fresh subscriber should receive them.
    pub fn snapshot(&self) -> Vec<FrameData> {
        let mut out = Vec::with_capacity(self.frames.len() + 3);
        out.extend(self.video_sequence_header.clone());
        out.extend(self.audio_sequence_header.clone());
        out.extend(self.meta_frame.clone());
        out.extend(self.frames.iter().cloned());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_info::FrameMeta;
    use tokio_util::bytes::BytesMut;

    fn frame(kind_key: u8, is_sequence_header: bool) -> FrameData {
        let meta = FrameMeta {
            pts: 0,
            is_key_frame: false,
            is_sequence_header,
            ..Default::default()
        };
        match kind_key {
            0 => FrameData::Video {
                meta,
                payload: BytesMut::new(),
            },
            1 => FrameData::Audio {
                meta,
                payload: BytesMut::new(),
            },
            _ => FrameData::Meta {
                meta,
                payload: BytesMut::new(),
            },
        }
    }

    #[test]
    fn sequence_headers_are_cached_outside_the_window() {
        let mut cache = RecentFrameCache::new(2);
        cache.append(frame(0, true));
        assert!(cache.video_sequence_header.is_some());
        assert_eq!(cache.frame_cnt(), 0);
    }

    #[test]
    fn window_drops_oldest_frame_once_full() {
        let mut cache = RecentFrameCache::new(2);
        cache.append(frame(1, false));
        cache.append(frame(1, false));
        cache.append(frame(1, false));
        assert_eq!(cache.frame_cnt(), 2);
        assert_eq!(cache.dropped_frame_cnt(), 1);
    }
}
