pub mod error;
pub mod provisioner;
pub mod reader;
pub mod utils;

pub use error::{BrokerError, BrokerResult};
pub use provisioner::TopicProvisioner;
pub use reader::{KafkaTopicReader, TopicMessage, TopicReader};
pub use utils::TopicSettings;

use log::info;
use rdkafka::admin::AdminClient;
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, Producer};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub trait Publisher {
    fn connect(&self) -> impl Future<Output = BrokerResult<()>> + Send;

    fn publish(&self, topic: &str, payload: &str)
    -> impl Future<Output = BrokerResult<()>> + Send;
}

pub trait TopicAdmin {
    fn connect(&self) -> impl Future<Output = BrokerResult<()>> + Send;

    fn list_topics(&self) -> impl Future<Output = BrokerResult<HashSet<String>>> + Send;

    fn create_topic(&self, topic: &str) -> impl Future<Output = BrokerResult<()>> + Send;
}

#[derive(Clone)]
pub struct KafkaPublisher {
    pub producer: FutureProducer,
    metadata_timeout: Duration,
    connected: Arc<AtomicBool>,
}

impl KafkaPublisher {
    pub fn new(producer: FutureProducer, metadata_timeout: Duration) -> Self {
        KafkaPublisher {
            producer,
            metadata_timeout,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Publisher for KafkaPublisher {
    fn connect(&self) -> impl Future<Output = BrokerResult<()>> + Send {
        let producer = self.producer.clone();
        let timeout = self.metadata_timeout;
        async move {
            if self.connected.load(Ordering::Acquire) {
                return Ok(());
            }
            tokio::task::spawn_blocking(move || utils::topic_names(producer.client(), timeout))
                .await?
                .map_err(BrokerError::Connect)?;
            self.connected.store(true, Ordering::Release);
            info!("Producer connected");
            Ok(())
        }
    }

    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = BrokerResult<()>> + Send {
        async move {
            utils::publish_message(&self.producer, topic, payload)
                .await
                .map_err(|source| BrokerError::Publish {
                    topic: topic.to_string(),
                    source,
                })
        }
    }
}

#[derive(Clone)]
pub struct KafkaAdmin {
    admin: Arc<AdminClient<DefaultClientContext>>,
    settings: TopicSettings,
    metadata_timeout: Duration,
    connected: Arc<AtomicBool>,
}

impl KafkaAdmin {
    pub fn new(
        admin: AdminClient<DefaultClientContext>,
        settings: TopicSettings,
        metadata_timeout: Duration,
    ) -> Self {
        KafkaAdmin {
            admin: Arc::new(admin),
            settings,
            metadata_timeout,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl TopicAdmin for KafkaAdmin {
    fn connect(&self) -> impl Future<Output = BrokerResult<()>> + Send {
        let admin = self.admin.clone();
        let timeout = self.metadata_timeout;
        async move {
            if self.connected.load(Ordering::Acquire) {
                return Ok(());
            }
            tokio::task::spawn_blocking(move || utils::topic_names(admin.inner(), timeout))
                .await?
                .map_err(BrokerError::Connect)?;
            self.connected.store(true, Ordering::Release);
            info!("Admin client connected");
            Ok(())
        }
    }

    fn list_topics(&self) -> impl Future<Output = BrokerResult<HashSet<String>>> + Send {
        let admin = self.admin.clone();
        let timeout = self.metadata_timeout;
        async move {
            tokio::task::spawn_blocking(move || utils::topic_names(admin.inner(), timeout))
                .await?
                .map_err(BrokerError::ListTopics)
        }
    }

    fn create_topic(&self, topic: &str) -> impl Future<Output = BrokerResult<()>> + Send {
        async move {
            utils::create_topic(&self.admin, topic, self.settings)
                .await
                .map_err(|source| BrokerError::CreateTopic {
                    topic: topic.to_string(),
                    source,
                })
        }
    }
}
