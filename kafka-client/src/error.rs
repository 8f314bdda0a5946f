use rdkafka::error::KafkaError;
use thiserror::Error;

/// Failure kinds at the broker boundary.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unreachable: {0}")]
    Connect(#[source] KafkaError),

    #[error("failed to list topics: {0}")]
    ListTopics(#[source] KafkaError),

    #[error("failed to create topic {topic}: {source}")]
    CreateTopic {
        topic: String,
        #[source]
        source: KafkaError,
    },

    #[error("failed to publish to topic {topic}: {source}")]
    Publish {
        topic: String,
        #[source]
        source: KafkaError,
    },

    #[error("failed to consume: {0}")]
    Consume(#[source] KafkaError),

    #[error("metadata worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type BrokerResult<T> = Result<T, BrokerError>;
