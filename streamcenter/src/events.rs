use std::time::SystemTime;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::{
    errors::StreamCenterResult,
    frame_info::FrameData,
    stream_source::{StreamIdentifier, StreamType},
};

#[derive(Debug)]
pub enum StreamCenterEvent {
    Publish {
        stream_id: StreamIdentifier,
        stream_type: StreamType,
        result_sender: oneshot::Sender<StreamCenterResult<mpsc::Sender<FrameData>>>,
    },
    Unpublish {
        stream_id: StreamIdentifier,
        result_sender: oneshot::Sender<StreamCenterResult<()>>,
    },
    Subscribe {
        stream_id: StreamIdentifier,
        result_sender: oneshot::Sender<StreamCenterResult<SubscribeResponse>>,
    },
    Unsubscribe {
        stream_id: StreamIdentifier,
        subscriber_id: Uuid,
        result_sender: oneshot::Sender<StreamCenterResult<()>>,
    },
    Describe {
        stream_id: StreamIdentifier,
        result_sender: oneshot::Sender<StreamCenterResult<StreamDescription>>,
    },
}

#[derive(Debug)]
pub struct StreamDescription {
    pub stream_id: StreamIdentifier,
    pub stream_type: StreamType,
    pub publish_start_time: SystemTime,
    pub subscriber_cnt: usize,
}

#[derive(Debug)]
pub struct SubscribeResponse {
    pub subscriber_id: Uuid,
    pub media_receiver: mpsc::Receiver<FrameData>,
}
