//! Event stream publishing.
//!
//! - `kafka`: the `EventPublisher` that appends answer records to a Kafka topic.
//! - `balancer`: chooses the partition each record is written to.

mod balancer;
pub mod kafka;

pub use kafka::KafkaPublisher;
