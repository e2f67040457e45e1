use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Topic '{0}' already exists")]
    TopicExists(String),

    #[error("Failed to create topic {topic}: {reason}")]
    TopicCreation { topic: String, reason: String },

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Publish error: {0}")]
    Publish(String),
}

pub type Result<T> = std::result::Result<T, BrokerError>;
