use kafka_client::TopicSettings;
use rdkafka::config::ClientConfig;
use std::str::FromStr;
use std::time::Duration;

pub fn load_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_env_parsed<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub brokers: String,
    pub client_id: String,
    pub bind_address: String,
    pub topic_settings: TopicSettings,
    pub message_timeout_ms: u64,
    pub metadata_timeout: Duration,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        let defaults = TopicSettings::default();
        BridgeConfig {
            brokers: load_env("KAFKA_BROKERS", "localhost:9092"),
            client_id: load_env("KAFKA_CLIENT_ID", "my-app"),
            bind_address: load_env("BIND_ADDRESS", "0.0.0.0:3000"),
            topic_settings: TopicSettings {
                partitions: load_env_parsed("KAFKA_TOPIC_PARTITIONS", defaults.partitions),
                replication: load_env_parsed("KAFKA_TOPIC_REPLICATION", defaults.replication),
            },
            message_timeout_ms: load_env_parsed("KAFKA_MESSAGE_TIMEOUT_MS", 5000),
            metadata_timeout: Duration::from_millis(load_env_parsed(
                "KAFKA_METADATA_TIMEOUT_MS",
                5000,
            )),
        }
    }

    /// Settings shared by the admin and producer clients.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("client.id", &self.client_id);
        config
    }

    pub fn producer_config(&self) -> ClientConfig {
        let mut config = self.client_config();
        config.set("message.timeout.ms", self.message_timeout_ms.to_string());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_carries_brokers_and_client_id() {
        let config = BridgeConfig {
            brokers: "kafka-1:9092,kafka-2:9092".to_string(),
            client_id: "my-app".to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            topic_settings: TopicSettings::default(),
            message_timeout_ms: 2500,
            metadata_timeout: Duration::from_secs(1),
        };

        let client = config.client_config();
        assert_eq!(client.get("bootstrap.servers"), Some("kafka-1:9092,kafka-2:9092"));
        assert_eq!(client.get("client.id"), Some("my-app"));
        assert_eq!(client.get("message.timeout.ms"), None);

        let producer = config.producer_config();
        assert_eq!(producer.get("message.timeout.ms"), Some("2500"));
    }

    #[test]
    fn unparsable_numbers_fall_back_to_default() {
        assert_eq!(
            load_env_parsed("KAFKA_BRIDGE_TEST_SURELY_UNSET_VARIABLE", -1i32),
            -1
        );
    }
}
