use std::{collections::HashMap, sync::Arc, time::SystemTime};

use tokio::sync::{RwLock, mpsc, oneshot};
use uuid::Uuid;

use crate::{
    errors::{StreamCenterError, StreamCenterResult},
    events::{StreamCenterEvent, StreamDescription, SubscribeResponse},
    signal::StreamSignal,
    stream_source::{StreamIdentifier, StreamSource, StreamType, SubscribeHandler},
};

const DEFAULT_RECENT_FRAME_WINDOW: usize = 1024;

#[derive(Debug)]
struct StreamHandle {
    signal_sender: mpsc::Sender<StreamSignal>,
    frame_sender: mpsc::Sender<crate::frame_info::FrameData>,
    subscribers: Arc<RwLock<HashMap<Uuid, SubscribeHandler>>>,
    stream_type: StreamType,
    publish_start_time: SystemTime,
}

/// Process-wide registry of `{app, stream_name}` → running `StreamSource`,
/// driven entirely through `StreamCenterEvent`s so callers never touch a
/// `StreamSource` directly.
#[derive(Debug)]
pub struct StreamCenter {
    streams: HashMap<StreamIdentifier, StreamHandle>,
    event_receiver: mpsc::UnboundedReceiver<StreamCenterEvent>,
    event_sender: mpsc::UnboundedSender<StreamCenterEvent>,
}

impl StreamCenter {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        Self {
            streams: HashMap::new(),
            event_receiver,
            event_sender,
        }
    }

    pub fn event_sender(&self) -> mpsc::UnboundedSender<StreamCenterEvent> {
        self.event_sender.clone()
    }

    pub async fn run(&mut self) {
        tracing::info!("stream center running");
        while let Some(event) = self.event_receiver.recv().await {
            if let Err(err) = self.process_event(event).await {
                tracing::error!("stream center event failed: {:?}", err);
            }
        }
    }

    async fn process_event(&mut self, event: StreamCenterEvent) -> StreamCenterResult<()> {
        match event {
            StreamCenterEvent::Publish {
                stream_id,
                stream_type,
                result_sender,
            } => {
                let result = self.publish(stream_id, stream_type);
                let _ = result_sender.send(result);
            }
            StreamCenterEvent::Unpublish {
                stream_id,
                result_sender,
            } => {
                let result = self.unpublish(stream_id).await;
                let _ = result_sender.send(result);
            }
            StreamCenterEvent::Subscribe {
                stream_id,
                result_sender,
            } => {
                let result = self.subscribe(&stream_id).await;
                let _ = result_sender.send(result);
            }
            StreamCenterEvent::Unsubscribe {
                stream_id,
                subscriber_id,
                result_sender,
            } => {
                let result = self.unsubscribe(&stream_id, subscriber_id).await;
                let _ = result_sender.send(result);
            }
            StreamCenterEvent::Describe {
                stream_id,
                result_sender,
            } => {
                let result = self.describe(&stream_id).await;
                let _ = result_sender.send(result);
            }
        }
        Ok(())
    }

    fn publish(
        &mut self,
        stream_id: StreamIdentifier,
        stream_type: StreamType,
    ) -> StreamCenterResult<mpsc::Sender<crate::frame_info::FrameData>> {
        if self.streams.contains_key(&stream_id) {
            return Err(StreamCenterError::DuplicateStream(stream_id));
        }

        let (frame_sender, frame_receiver) = mpsc::channel(256);
        let (signal_sender, signal_receiver) = mpsc::channel(1);
        let subscribers = Arc::new(RwLock::new(HashMap::new()));

        let mut source = StreamSource::new(
            stream_id.clone(),
            stream_type,
            frame_receiver,
            signal_receiver,
            Arc::clone(&subscribers),
            DEFAULT_RECENT_FRAME_WINDOW,
        );
        tokio::spawn(async move {
            if let Err(err) = source.run().await {
                tracing::error!("stream source exited with error: {:?}", err);
            }
        });

        self.streams.insert(
            stream_id.clone(),
            StreamHandle {
                signal_sender,
                frame_sender: frame_sender.clone(),
                subscribers,
                stream_type,
                publish_start_time: SystemTime::now(),
            },
        );

        tracing::info!("published stream: {:?}", stream_id);
        Ok(frame_sender)
    }

    async fn unpublish(&mut self, stream_id: StreamIdentifier) -> StreamCenterResult<()> {
        let handle = self
            .streams
            .remove(&stream_id)
            .ok_or_else(|| StreamCenterError::StreamNotFound(stream_id.clone()))?;
        let _ = handle.signal_sender.send(StreamSignal::Stop).await;
        Ok(())
    }

    async fn subscribe(&mut self, stream_id: &StreamIdentifier) -> StreamCenterResult<SubscribeResponse> {
        let handle = self
            .streams
            .get(stream_id)
            .ok_or_else(|| StreamCenterError::StreamNotFound(stream_id.clone()))?;

        let subscriber_id = Uuid::now_v7();
        let (data_sender, media_receiver) = mpsc::channel(256);
        handle.subscribers.write().await.insert(
            subscriber_id,
            SubscribeHandler {
                id: subscriber_id,
                data_sender,
                stat: Default::default(),
            },
        );

        Ok(SubscribeResponse {
            subscriber_id,
            media_receiver,
        })
    }

    async fn unsubscribe(
        &mut self,
        stream_id: &StreamIdentifier,
        subscriber_id: Uuid,
    ) -> StreamCenterResult<()> {
        let handle = self
            .streams
            .get(stream_id)
            .ok_or_else(|| StreamCenterError::StreamNotFound(stream_id.clone()))?;
        handle.subscribers.write().await.remove(&subscriber_id);
        Ok(())
    }

    async fn describe(&self, stream_id: &StreamIdentifier) -> StreamCenterResult<StreamDescription> {
        let handle = self
            .streams
            .get(stream_id)
            .ok_or_else(|| StreamCenterError::StreamNotFound(stream_id.clone()))?;
        Ok(StreamDescription {
            stream_id: stream_id.clone(),
            stream_type: handle.stream_type,
            publish_start_time: handle.publish_start_time,
            subscriber_cnt: handle.subscribers.read().await.len(),
        })
    }
}

impl Default for StreamCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_id() -> StreamIdentifier {
        StreamIdentifier {
            app: "live".to_string(),
            stream_name: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn publish_then_describe_reports_zero_subscribers() {
        let mut center = StreamCenter::new();
        center.publish(stream_id(), StreamType::Live).unwrap();
        let description = center.describe(&stream_id()).await.unwrap();
        assert_eq!(description.subscriber_cnt, 0);
    }

    #[tokio::test]
    async fn duplicate_publish_is_rejected() {
        let mut center = StreamCenter::new();
        center.publish(stream_id(), StreamType::Live).unwrap();
        let err = center.publish(stream_id(), StreamType::Live).unwrap_err();
        assert!(matches!(err, StreamCenterError::DuplicateStream(_)));
    }

    #[tokio::test]
    async fn subscribe_unknown_stream_fails() {
        let mut center = StreamCenter::new();
        let err = center.subscribe(&stream_id()).await.unwrap_err();
        assert!(matches!(err, StreamCenterError::StreamNotFound(_)));
    }
}
