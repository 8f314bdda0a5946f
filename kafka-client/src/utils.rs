use log::{debug, error, info};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::{Client, ClientContext, DefaultClientContext};
use rdkafka::error::{KafkaError, KafkaResult, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::collections::HashSet;
use std::time::Duration;

/// Partition count and replication factor for topics created on demand.
/// `-1` leaves the value to the broker's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicSettings {
    pub partitions: i32,
    pub replication: i32,
}

impl Default for TopicSettings {
    fn default() -> Self {
        TopicSettings {
            partitions: -1,
            replication: -1,
        }
    }
}

pub async fn publish_message(
    producer: &FutureProducer,
    topic: &str,
    payload: &str,
) -> Result<(), KafkaError> {
    let record = FutureRecord::<(), str>::to(topic).payload(payload);

    let produce_future = producer.send(record, Duration::from_secs(0));

    match produce_future.await {
        Ok(delivery) => {
            debug!("Message delivered to {topic}: {:?}", delivery);
            Ok(())
        }
        Err(e) => {
            error!("Failed to enqueue message for {topic}: {:?}", e);
            Err(e.0)
        }
    }
}

/// Blocking metadata fetch; call it from `spawn_blocking`.
pub fn topic_names<C: ClientContext>(
    client: &Client<C>,
    timeout: Duration,
) -> KafkaResult<HashSet<String>> {
    let metadata = client.fetch_metadata(None, timeout)?;
    Ok(metadata
        .topics()
        .iter()
        .map(|t| t.name().to_string())
        .collect())
}

pub async fn create_topic(
    admin: &AdminClient<DefaultClientContext>,
    topic: &str,
    settings: TopicSettings,
) -> Result<(), KafkaError> {
    let new_topic = NewTopic::new(
        topic,
        settings.partitions,
        TopicReplication::Fixed(settings.replication),
    );
    let res = admin
        .create_topics([&new_topic], &AdminOptions::new())
        .await?;

    for r in res {
        match r {
            Ok(t) => info!("Created topic: {t}"),
            Err((t, e)) => {
                // another request created it between our listing and this call
                if e == RDKafkaErrorCode::TopicAlreadyExists {
                    info!("Topic already exists: {t}");
                } else {
                    return Err(KafkaError::AdminOp(e));
                }
            }
        }
    }

    Ok(())
}
