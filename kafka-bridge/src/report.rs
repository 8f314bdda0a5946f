//! Interest report built from everything the bridge has published.
//!
//! Each `{service}_{suffix}` topic is read back in full and its values are
//! counted; `_clicks` topics are summed into a per-service total.

use crate::send_to_kafka::HOME_TOPIC;
use kafka_client::{BrokerResult, TopicMessage, TopicReader};
use log::info;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

pub const ATTRIBUTE_SUFFIXES: [&str; 3] = ["age", "city", "gender"];
pub const CLICKS_SUFFIX: &str = "clicks";

pub type ValueCounts = BTreeMap<String, u64>;

/// Splits `promo_city` into (`promo`, `city`) for the suffixes the bridge writes.
pub fn split_topic(topic: &str) -> Option<(&str, &str)> {
    ATTRIBUTE_SUFFIXES
        .iter()
        .chain(std::iter::once(&CLICKS_SUFFIX))
        .find_map(|suffix| {
            let base = topic.strip_suffix(suffix)?.strip_suffix('_')?;
            Some((base, *suffix))
        })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    counts: BTreeMap<String, ValueCounts>,
}

impl Report {
    pub fn aggregate<'a>(messages: impl IntoIterator<Item = &'a TopicMessage>) -> Self {
        let mut report = Report::default();
        for message in messages {
            report.record(&message.topic, &message.value);
        }
        report
    }

    pub fn record(&mut self, topic: &str, value: &str) {
        *self
            .counts
            .entry(topic.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default() += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn value_counts(&self, topic: &str) -> Option<&ValueCounts> {
        self.counts.get(topic)
    }

    /// Number of click messages per service, over every `_clicks` topic.
    pub fn clicks_per_service(&self) -> BTreeMap<String, u64> {
        let mut clicks = BTreeMap::new();
        for (topic, counts) in &self.counts {
            if let Some((base, CLICKS_SUFFIX)) = split_topic(topic) {
                *clicks.entry(base.to_string()).or_default() += counts.values().sum::<u64>();
            }
        }
        clicks
    }

    /// Services that get their own breakdown; the `home` page is left out.
    pub fn services(&self) -> BTreeSet<&str> {
        self.counts
            .keys()
            .filter_map(|topic| split_topic(topic))
            .map(|(base, _)| base)
            .filter(|base| *base != HOME_TOPIC)
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Interest in individual web services\n");

        let clicks = self.clicks_per_service();
        let total: u64 = clicks.values().sum();
        if total > 0 {
            out.push_str("\nClicks per service\n");
            for (service, count) in &clicks {
                let share = *count as f64 * 100.0 / total as f64;
                let _ = writeln!(out, "  {service}: {count} ({share:.1}%)");
            }
        }

        for service in self.services() {
            let _ = writeln!(out, "\nService {service}");
            for suffix in ATTRIBUTE_SUFFIXES {
                let Some(counts) = self.value_counts(&format!("{service}_{suffix}")) else {
                    continue;
                };
                let values: Vec<String> = counts.iter().map(|(v, n)| format!("{v}={n}")).collect();
                let _ = writeln!(out, "  {suffix}: {}", values.join(", "));
            }
        }

        out
    }
}

/// Reads all topics once and aggregates them. `None` when there was nothing to read.
pub async fn run_cycle<R: TopicReader>(reader: &R) -> BrokerResult<Option<Report>> {
    let messages = reader.read_all().await?;
    if messages.is_empty() {
        info!("No data to process");
        return Ok(None);
    }
    let report = Report::aggregate(&messages);
    info!(
        "Aggregated {} messages from {} topics",
        messages.len(),
        report.counts.len()
    );
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kafka_client::BrokerError;
    use rdkafka::error::{KafkaError, RDKafkaErrorCode};
    use std::future::Future;

    fn messages(raw: &[(&str, &str)]) -> Vec<TopicMessage> {
        raw.iter().map(|(t, v)| TopicMessage::new(*t, *v)).collect()
    }

    struct FixedReader(BrokerResult<Vec<TopicMessage>>);

    impl TopicReader for FixedReader {
        fn read_all(&self) -> impl Future<Output = BrokerResult<Vec<TopicMessage>>> + Send {
            let result = match &self.0 {
                Ok(messages) => Ok(messages.clone()),
                Err(_) => Err(BrokerError::Consume(KafkaError::MessageConsumption(
                    RDKafkaErrorCode::BrokerTransportFailure,
                ))),
            };
            async move { result }
        }
    }

    #[test]
    fn splits_known_suffixes_only() {
        assert_eq!(split_topic("promo_age"), Some(("promo", "age")));
        assert_eq!(split_topic("summer_sale_clicks"), Some(("summer_sale", "clicks")));
        assert_eq!(split_topic("promo_views"), None);
        assert_eq!(split_topic("clicks"), None);
    }

    #[test]
    fn counts_values_per_topic() {
        let report = Report::aggregate(&messages(&[
            ("promo_city", "NYC"),
            ("promo_city", "LA"),
            ("promo_city", "NYC"),
            ("promo_age", "30"),
        ]));

        let cities = report.value_counts("promo_city").unwrap();
        assert_eq!(cities.get("NYC"), Some(&2));
        assert_eq!(cities.get("LA"), Some(&1));
        assert_eq!(report.value_counts("promo_age").unwrap().get("30"), Some(&1));
        assert_eq!(report.value_counts("promo_gender"), None);
    }

    #[test]
    fn sums_clicks_per_service() {
        let report = Report::aggregate(&messages(&[
            ("promo_clicks", "1"),
            ("promo_clicks", "1"),
            ("news_clicks", "1"),
            ("news_age", "30"),
        ]));

        let clicks = report.clicks_per_service();
        assert_eq!(clicks.get("promo"), Some(&2));
        assert_eq!(clicks.get("news"), Some(&1));
        assert_eq!(clicks.len(), 2);
    }

    #[test]
    fn home_gets_no_breakdown() {
        let report = Report::aggregate(&messages(&[
            ("home_age", "30"),
            ("promo_age", "30"),
            ("stray-topic", "x"),
        ]));

        assert_eq!(report.services().into_iter().collect::<Vec<_>>(), vec!["promo"]);
    }

    #[test]
    fn render_lists_shares_and_breakdowns() {
        let report = Report::aggregate(&messages(&[
            ("promo_clicks", "1"),
            ("promo_clicks", "1"),
            ("promo_clicks", "1"),
            ("news_clicks", "1"),
            ("promo_gender", "F"),
            ("promo_gender", "M"),
            ("promo_gender", "F"),
        ]));

        let text = report.render();
        assert!(text.contains("  promo: 3 (75.0%)"));
        assert!(text.contains("  news: 1 (25.0%)"));
        assert!(text.contains("Service promo\n  gender: F=2, M=1"));
        assert!(!text.contains("  age:"));
    }

    #[tokio::test]
    async fn empty_read_yields_no_report() {
        let reader = FixedReader(Ok(Vec::new()));

        assert_eq!(run_cycle(&reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cycle_aggregates_what_was_read() {
        let reader = FixedReader(Ok(messages(&[("promo_clicks", "1"), ("promo_age", "41")])));

        let report = run_cycle(&reader).await.unwrap().unwrap();

        assert_eq!(report.clicks_per_service().get("promo"), Some(&1));
        assert!(!report.is_empty());
    }

    #[tokio::test]
    async fn read_failure_is_propagated() {
        let reader = FixedReader(Err(BrokerError::Consume(KafkaError::MessageConsumption(
            RDKafkaErrorCode::BrokerTransportFailure,
        ))));

        assert!(matches!(
            run_cycle(&reader).await,
            Err(BrokerError::Consume(_))
        ));
    }
}
