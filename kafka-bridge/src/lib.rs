pub mod config;
pub mod report;
pub mod send_to_kafka;

use kafka_client::{BrokerError, BrokerResult, Publisher, TopicAdmin, TopicProvisioner};
use ntex::web;
use thiserror::Error;

pub struct AppState<P, A> {
    pub publisher: P,
    pub provisioner: TopicProvisioner<A>,
}

impl<P: Publisher, A: TopicAdmin> AppState<P, A> {
    pub fn new(publisher: P, admin: A) -> Self {
        AppState {
            publisher,
            provisioner: TopicProvisioner::new(admin),
        }
    }
}

/// Query string of `GET /sendToKafka`. Nothing is validated beyond presence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SendQuery {
    pub age: Option<String>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub topic: Option<String>,
    pub id: Option<String>,
}

impl SendQuery {
    /// Builds the query from raw pairs. A repeated key keeps every value,
    /// joined with `,`; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = SendQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "age" => &mut query.age,
                "city" => &mut query.city,
                "gender" => &mut query.gender,
                "topic" => &mut query.topic,
                "id" => &mut query.id,
                _ => continue,
            };
            match slot {
                Some(existing) => {
                    existing.push(',');
                    existing.push_str(&value);
                }
                None => *slot = Some(value),
            }
        }
        query
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),
}

/// Connects the producer first, then the admin client.
pub async fn connect_clients<P: Publisher, A: TopicAdmin>(
    publisher: &P,
    admin: &A,
) -> BrokerResult<()> {
    publisher.connect().await?;
    admin.connect().await
}

pub fn cors_headers() -> web::middleware::DefaultHeaders {
    web::middleware::DefaultHeaders::new()
        .header("access-control-allow-origin", "*")
        .header(
            "access-control-allow-headers",
            "Origin, X-Requested-With, Content-Type, Accept",
        )
}

pub fn configure<P, A>(cfg: &mut web::ServiceConfig)
where
    P: Publisher + 'static,
    A: TopicAdmin + 'static,
{
    cfg.route("/health", web::get().to(async || "OK"))
        .route(
            "/sendToKafka",
            web::get().to(send_to_kafka::send_to_kafka::<P, A>),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_keys_are_joined() {
        let query = SendQuery::from_pairs(pairs(&[
            ("topic", "promo"),
            ("age", "30"),
            ("age", "31"),
        ]));

        assert_eq!(query.age.as_deref(), Some("30,31"));
        assert_eq!(query.topic.as_deref(), Some("promo"));
        assert_eq!(query.city, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let query = SendQuery::from_pairs(pairs(&[("clicks", "99"), ("id", "x1")]));

        assert_eq!(
            query,
            SendQuery {
                id: Some("x1".to_string()),
                ..Default::default()
            }
        );
    }
}
