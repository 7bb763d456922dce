use thiserror::Error;

use crate::stream_source::StreamIdentifier;

#[derive(Debug, Error)]
pub enum StreamCenterError {
    #[error("stream is already publishing: {0:?}")]
    DuplicateStream(StreamIdentifier),
    #[error("stream not found: {0:?}")]
    StreamNotFound(StreamIdentifier),
    #[error("stream is busy and cannot accept a new publisher: {0:?}")]
    StreamBusy(StreamIdentifier),
    #[error("channel send failed")]
    ChannelSendFailed,
    #[error("channel closed unexpectedly")]
    ChannelClosed,
}

pub type StreamCenterResult<T> = Result<T, StreamCenterError>;
