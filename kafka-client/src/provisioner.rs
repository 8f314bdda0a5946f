use crate::{BrokerResult, TopicAdmin};
use log::debug;

/// Creates topics lazily, the first time something is about to be published to them.
pub struct TopicProvisioner<A> {
    admin: A,
}

impl<A: TopicAdmin> TopicProvisioner<A> {
    pub fn new(admin: A) -> Self {
        TopicProvisioner { admin }
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    /// Makes sure `topic` exists, creating it with the admin's settings if it is not listed.
    ///
    /// Errors are returned as-is; nothing is retried.
    pub async fn ensure_topic(&self, topic: &str) -> BrokerResult<()> {
        self.admin.connect().await?;
        let topics = self.admin.list_topics().await?;
        if topics.contains(topic) {
            debug!("Topic {topic} already listed, skipping creation");
            return Ok(());
        }
        self.admin.create_topic(topic).await
    }
}
