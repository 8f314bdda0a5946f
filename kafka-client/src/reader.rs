use crate::{BrokerError, BrokerResult, utils};
use log::{debug, info, warn};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::future::Future;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// One message as read back from a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    pub topic: String,
    pub value: String,
}

impl TopicMessage {
    pub fn new(topic: impl Into<String>, value: impl Into<String>) -> Self {
        TopicMessage {
            topic: topic.into(),
            value: value.into(),
        }
    }
}

pub trait TopicReader {
    /// Everything currently stored in the cluster's topics, from the earliest offset.
    fn read_all(&self) -> impl Future<Output = BrokerResult<Vec<TopicMessage>>> + Send;
}

/// Reads every non-internal topic with a throwaway consumer group, so each
/// call starts again from the earliest offset and commits nothing.
#[derive(Clone)]
pub struct KafkaTopicReader {
    config: ClientConfig,
    metadata_timeout: Duration,
    window: Duration,
}

impl KafkaTopicReader {
    pub fn new(config: ClientConfig, metadata_timeout: Duration, window: Duration) -> Self {
        KafkaTopicReader {
            config,
            metadata_timeout,
            window,
        }
    }

    async fn topics(&self) -> BrokerResult<Vec<String>> {
        let config = self.config.clone();
        let timeout = self.metadata_timeout;
        let names = tokio::task::spawn_blocking(move || {
            let consumer: BaseConsumer = config.create()?;
            utils::topic_names(consumer.client(), timeout)
        })
        .await?
        .map_err(BrokerError::ListTopics)?;

        let mut topics: Vec<String> = names
            .into_iter()
            .filter(|t| !t.starts_with("__"))
            .collect();
        topics.sort();
        Ok(topics)
    }
}

impl TopicReader for KafkaTopicReader {
    fn read_all(&self) -> impl Future<Output = BrokerResult<Vec<TopicMessage>>> + Send {
        async move {
            let topics = self.topics().await?;
            if topics.is_empty() {
                info!("No topics to read");
                return Ok(Vec::new());
            }

            let consumer: StreamConsumer = self
                .config
                .clone()
                .set("group.id", format!("report-{}", Uuid::new_v4()))
                .set("enable.auto.commit", "false")
                .set("auto.offset.reset", "earliest")
                .create()
                .map_err(BrokerError::Consume)?;

            let names: Vec<&str> = topics.iter().map(String::as_str).collect();
            consumer.subscribe(&names).map_err(BrokerError::Consume)?;
            info!("Subscribed to {} topics", names.len());

            let deadline = Instant::now() + self.window;
            let mut messages = Vec::new();
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match tokio::time::timeout(remaining, consumer.recv()).await {
                    Err(_) => break,
                    Ok(Err(e)) => return Err(BrokerError::Consume(e)),
                    Ok(Ok(message)) => match message.payload_view::<str>() {
                        Some(Ok(value)) => {
                            debug!("Read {value:?} from {}", message.topic());
                            messages.push(TopicMessage::new(message.topic(), value));
                        }
                        Some(Err(e)) => {
                            warn!("Skipping non-UTF-8 message on {}: {e}", message.topic())
                        }
                        None => {}
                    },
                }
            }

            info!("Read {} messages", messages.len());
            Ok(messages)
        }
    }
}
