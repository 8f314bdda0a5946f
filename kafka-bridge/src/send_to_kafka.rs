use crate::{AppState, BridgeError, SendQuery};
use kafka_client::{Publisher, TopicAdmin};
use log::{error, info};
use ntex::http::StatusCode;
use ntex::web;
use std::sync::Arc;

pub const HOME_TOPIC: &str = "home";
pub const HOME_BODY: &str = "Skipping topic creation for ID=#home";
pub const SUCCESS_BODY: &str = "Wiadomość wysłana do Kafka";
pub const ERROR_BODY: &str = "Wystąpił błąd podczas wysyłania wiadomości do Kafka";

/// Payload of every message on the `_clicks` topic.
pub const CLICK_VALUE: &str = "1";

/// Base used when the request carries no `topic`.
pub const UNDEFINED_TOPIC: &str = "undefined";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// The four topics fed from one request, in provisioning and publishing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTopics {
    pub age: String,
    pub city: String,
    pub gender: String,
    pub clicks: String,
}

impl DerivedTopics {
    pub fn new(base: &str) -> Self {
        DerivedTopics {
            age: format!("{base}_age"),
            city: format!("{base}_city"),
            gender: format!("{base}_gender"),
            clicks: format!("{base}_clicks"),
        }
    }

    pub fn all(&self) -> [&str; 4] {
        [&self.age, &self.city, &self.gender, &self.clicks]
    }
}

pub async fn send_to_kafka<P, A>(
    data: web::types::State<Arc<AppState<P, A>>>,
    query: web::types::Query<Vec<(String, String)>>,
) -> Result<web::HttpResponse, web::Error>
where
    P: Publisher + 'static,
    A: TopicAdmin + 'static,
{
    let query = SendQuery::from_pairs(query.into_inner());

    if query.topic.as_deref() == Some(HOME_TOPIC) {
        return Ok(web::HttpResponse::Ok()
            .content_type(TEXT_PLAIN)
            .body(HOME_BODY));
    }

    info!(
        "Received data: age={:?}, city={:?}, gender={:?}, topic={:?}, id={:?}",
        query.age, query.city, query.gender, query.topic, query.id
    );

    match forward(&data, &query).await {
        Ok(()) => Ok(web::HttpResponse::Ok()
            .content_type(TEXT_PLAIN)
            .body(SUCCESS_BODY)),
        Err(e) => {
            error!("Failed to send messages to Kafka: {e}");
            Ok(web::HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                .content_type(TEXT_PLAIN)
                .body(ERROR_BODY))
        }
    }
}

/// Provisions all four topics, then publishes one message to each.
/// Stops at the first failure; messages already published stay published.
async fn forward<P: Publisher, A: TopicAdmin>(
    state: &AppState<P, A>,
    query: &SendQuery,
) -> Result<(), BridgeError> {
    let topics = DerivedTopics::new(query.topic.as_deref().unwrap_or(UNDEFINED_TOPIC));

    for topic in topics.all() {
        state.provisioner.ensure_topic(topic).await?;
    }

    let messages = [
        (&topics.age, "age", query.age.as_deref()),
        (&topics.city, "city", query.city.as_deref()),
        (&topics.gender, "gender", query.gender.as_deref()),
        (&topics.clicks, "clicks", Some(CLICK_VALUE)),
    ];
    for (topic, field, value) in messages {
        let value = value.ok_or(BridgeError::MissingParameter(field))?;
        state.publisher.publish(topic, value).await?;
    }

    Ok(())
}
