use tokio_util::bytes::BytesMut;

#[derive(Debug, Default, Clone, Copy)]
pub struct MediaMessageRuntimeStat {
    pub read_time_ns: u128,
    pub session_process_time_ns: u128,
    pub publish_stream_source_time_ns: u128,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameMeta {
    pub pts: u32,
    pub is_key_frame: bool,
    pub is_sequence_header: bool,
    pub runtime_stat: MediaMessageRuntimeStat,
}

/// One raw media unit as handed off by the connection core, already
/// jitter corrected. The payload is opaque here — codec-specific
/// parsing (AVC/AAC/script data) is an external collaborator's job.
#[derive(Debug, Clone)]
pub enum FrameData {
    Video { meta: FrameMeta, payload: BytesMut },
    Audio { meta: FrameMeta, payload: BytesMut },
    Meta { meta: FrameMeta, payload: BytesMut },
    /// An RTMP aggregate message, relayed whole rather than split into
    /// its constituent sub-messages.
    Aggregate { meta: FrameMeta, payload: BytesMut },
}

impl FrameData {
    pub fn log_runtime_stat(&self) {
        tracing::debug!("frame stat: {:?}", self.meta().runtime_stat);
    }

    pub fn meta(&self) -> &FrameMeta {
        match self {
            FrameData::Video { meta, .. } => meta,
            FrameData::Audio { meta, .. } => meta,
            FrameData::Meta { meta, .. } => meta,
            FrameData::Aggregate { meta, .. } => meta,
        }
    }

    #[inline]
    pub fn is_video(&self) -> bool {
        matches!(self, FrameData::Video { .. })
    }

    #[inline]
    pub fn is_audio(&self) -> bool {
        matches!(self, FrameData::Audio { .. })
    }

    #[inline]
    pub fn is_meta(&self) -> bool {
        matches!(self, FrameData::Meta { .. })
    }

    #[inline]
    pub fn is_video_key_frame(&self) -> bool {
        matches!(self, FrameData::Video { meta, .. } if meta.is_key_frame)
    }

    #[inline]
    pub fn is_sequence_header(&self) -> bool {
        self.meta().is_sequence_header
    }

    pub fn payload(&self) -> &BytesMut {
        match self {
            FrameData::Video { payload, .. } => payload,
            FrameData::Audio { payload, .. } => payload,
            FrameData::Meta { payload, .. } => payload,
            FrameData::Aggregate { payload, .. } => payload,
        }
    }
}
