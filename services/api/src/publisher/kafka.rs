//! Appends answer records to a Kafka topic.
//!
//! The broker connection is opened by the first publish and then shared by
//! every session in the process. If that first connection fails nothing is
//! cached, so a later publish connects afresh. A single publish is never
//! retried: on failure the record is dropped and the error returned.

use async_trait::async_trait;
use chrono::Utc;
use game_chat_core::{answer::AnswerRecord, channel::EventPublisher, error::PublishError};
use rskafka::{
    client::{
        ClientBuilder,
        partition::{Compression, PartitionClient, UnknownTopicHandling},
    },
    record::Record,
};
use std::{collections::BTreeMap, time::Duration};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::balancer::LeastBytes;

/// Upper bound on connecting plus producing a single record.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Partition clients for the topic, created on first use.
struct TopicHandle {
    partitions: Vec<PartitionClient>,
    balancer: LeastBytes,
}

pub struct KafkaPublisher {
    brokers: Vec<String>,
    topic: String,
    timeout: Duration,
    handle: OnceCell<TopicHandle>,
}

impl KafkaPublisher {
    /// Creates a publisher for `topic` on the given brokers. Does not connect.
    pub fn new(brokers: Vec<String>, topic: impl Into<String>) -> Self {
        Self::with_timeout(brokers, topic, DEFAULT_PUBLISH_TIMEOUT)
    }

    pub fn with_timeout(brokers: Vec<String>, topic: impl Into<String>, timeout: Duration) -> Self {
        Self {
            brokers,
            topic: topic.into(),
            timeout,
            handle: OnceCell::new(),
        }
    }

    async fn connect(&self) -> Result<TopicHandle, PublishError> {
        let client = ClientBuilder::new(self.brokers.clone())
            .build()
            .await
            .map_err(broker_error)?;

        let partition_count = client
            .list_topics()
            .await
            .map_err(broker_error)?
            .into_iter()
            .find(|t| t.name == self.topic)
            .map(|t| t.partitions.len())
            .unwrap_or(0);
        if partition_count == 0 {
            return Err(PublishError::Broker(format!(
                "topic '{}' has no partitions",
                self.topic
            )));
        }

        let mut partitions = Vec::with_capacity(partition_count);
        for partition in 0..partition_count as i32 {
            let partition_client = client
                .partition_client(self.topic.clone(), partition, UnknownTopicHandling::Error)
                .await
                .map_err(broker_error)?;
            partitions.push(partition_client);
        }

        info!(
            brokers = ?self.brokers,
            topic = %self.topic,
            partitions = partition_count,
            "Connected to event stream."
        );
        Ok(TopicHandle {
            balancer: LeastBytes::new(partitions.len()),
            partitions,
        })
    }

    async fn produce(&self, payload: Vec<u8>) -> Result<(), PublishError> {
        let handle = self.handle.get_or_try_init(|| self.connect()).await?;

        let partition = handle.balancer.pick(payload.len());
        let record = Record {
            key: None,
            value: Some(payload),
            headers: BTreeMap::new(),
            timestamp: Utc::now(),
        };
        handle.partitions[partition]
            .produce(vec![record], Compression::NoCompression)
            .await
            .map_err(broker_error)?;

        debug!(topic = %self.topic, partition, "Answer record appended.");
        Ok(())
    }
}

fn broker_error(e: rskafka::client::error::Error) -> PublishError {
    PublishError::Broker(e.to_string())
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, record: &AnswerRecord) -> Result<(), PublishError> {
        let payload = record.to_event_payload()?;
        tokio::time::timeout(self.timeout, self.produce(payload))
            .await
            .map_err(|_| {
                PublishError::Broker(format!("publish timed out after {:?}", self.timeout))
            })?
    }
}
