use std::{collections::HashMap, fmt::Display, sync::Arc};

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::{
    errors::StreamCenterResult,
    frame_info::FrameData,
    gop::RecentFrameCache,
    signal::StreamSignal,
};

#[derive(Debug, PartialEq, Eq)]
enum StreamStatus {
    NotStarted,
    Running,
    Stopped,
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamType {
    #[default]
    Live,
    Record,
}

impl Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Record => f.write_str("record"),
        }
    }
}

#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub struct StreamIdentifier {
    pub app: String,
    pub stream_name: String,
}

#[derive(Debug, Default)]
pub struct PlayStat {
    sequence_headers_sent: bool,
    frames_sent: u64,
    frames_send_failed: u64,
}

#[derive(Debug)]
pub struct SubscribeHandler {
    pub id: Uuid,
    pub data_sender: mpsc::Sender<FrameData>,
    pub stat: PlayStat,
}

/// Single-stream actor: owns the recent-frame cache and fans every
/// incoming frame out to the current subscribers, seeding a late
/// joiner with cached sequence headers and recent frames on its first
/// delivery.
#[derive(Debug)]
pub struct StreamSource {
    pub identifier: StreamIdentifier,
    pub stream_type: StreamType,

    data_receiver: mpsc::Receiver<FrameData>,
    signal_receiver: mpsc::Receiver<StreamSignal>,
    subscribers: Arc<RwLock<HashMap<Uuid, SubscribeHandler>>>,
    cache: RecentFrameCache,
    status: StreamStatus,
}

impl StreamSource {
    pub fn new(
        identifier: StreamIdentifier,
        stream_type: StreamType,
        data_receiver: mpsc::Receiver<FrameData>,
        signal_receiver: mpsc::Receiver<StreamSignal>,
        subscribers: Arc<RwLock<HashMap<Uuid, SubscribeHandler>>>,
        max_cached_frames: usize,
    ) -> Self {
        Self {
            identifier,
            stream_type,
            data_receiver,
            signal_receiver,
            subscribers,
            cache: RecentFrameCache::new(max_cached_frames),
            status: StreamStatus::NotStarted,
        }
    }

    pub async fn run(&mut self) -> StreamCenterResult<()> {
        if self.status == StreamStatus::Running {
            return Ok(());
        }
        self.status = StreamStatus::Running;
        tracing::info!("stream source running: {:?}", self.identifier);

        loop {
            tokio::select! {
                frame = self.data_receiver.recv() => {
                    match frame {
                        Some(frame) => self.on_frame(frame).await,
                        None => {
                            self.status = StreamStatus::Stopped;
                            return Ok(());
                        }
                    }
                }
                signal = self.signal_receiver.recv() => {
                    match signal {
                        Some(StreamSignal::Stop) | None => {
                            self.status = StreamStatus::Stopped;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn on_frame(&mut self, frame: FrameData) {
        frame.log_runtime_stat();

        let mut subscribers = self.subscribers.write().await;
        if subscribers.is_empty() {
            self.cache.append(frame);
            return;
        }

        for handler in subscribers.values_mut() {
            if !handler.stat.sequence_headers_sent {
                for seeded in self.cache.snapshot() {
                    Self::send_to(handler, seeded);
                }
                handler.stat.sequence_headers_sent = true;
            }
        }

        for handler in subscribers.values_mut() {
            Self::send_to(handler, frame.clone());
        }
        drop(subscribers);

        self.cache.append(frame);
    }

    fn send_to(handler: &mut SubscribeHandler, frame: FrameData) {
        match handler.data_sender.try_send(frame) {
            Ok(()) => handler.stat.frames_sent += 1,
            Err(err) => {
                handler.stat.frames_send_failed += 1;
                tracing::warn!("dropping frame for subscriber {}: {:?}", handler.id, err);
            }
        }
    }
}
