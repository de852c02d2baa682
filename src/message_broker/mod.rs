// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::notifier::{Notifier, NotifyError};
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    /// 메시지 전송
    pub async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), String> {
        debug!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| format!("Error sending message: {:?}", e))?;

        Ok(())
    }
}

// endregion: --- Kafka Producer

// region:    --- Kafka Notifier
/// 경매 이벤트를 Kafka 토픽으로 발행 (key = 방 id, 같은 방 이벤트는 같은 파티션)
pub struct KafkaNotifier {
    producer: KafkaProducer,
    topic: String,
}

impl KafkaNotifier {
    pub fn new(producer: KafkaProducer, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl Notifier for KafkaNotifier {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(event)?;
        self.producer
            .send_message(&self.topic, &event.room_id().to_string(), &payload)
            .await
            .map_err(NotifyError::Transport)
    }
}

// endregion: --- Kafka Notifier

// region:    --- Kafka Manager
pub struct KafkaManager {
    producer: KafkaProducer,
    brokers: String,
}

/// KafkaManager 구현
impl KafkaManager {
    pub fn new(brokers: &str) -> Result<Self, KafkaError> {
        Ok(KafkaManager {
            producer: KafkaProducer::new(brokers)?,
            brokers: brokers.to_string(),
        })
    }

    /// 프로듀서 반환
    pub fn get_producer(&self) -> KafkaProducer {
        self.producer.clone()
    }

    /// 토픽 생성 (이미 있으면 성공으로 처리)
    pub async fn create_topic(
        &self,
        topic_name: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), String> {
        info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Manager", topic_name);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()
            .map_err(|e| format!("AdminClient 생성 실패: {:?}", e))?;

        let new_topic = NewTopic::new(
            topic_name,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        let results = admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await
            .map_err(|e| {
                error!("{:<12} --> Kafka 토픽 생성 실패: {:?}", "Manager", e);
                format!("토픽 생성 실패: {:?}", e)
            })?;

        for result in results {
            match result {
                Ok(topic) => info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Manager", topic),
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("{:<12} --> Kafka 토픽 이미 존재: {}", "Manager", topic)
                }
                Err((topic, code)) => {
                    error!(
                        "{:<12} --> Kafka 토픽 생성 실패: {} ({:?})",
                        "Manager", topic, code
                    );
                    return Err(format!("토픽 생성 실패: {} ({:?})", topic, code));
                }
            }
        }
        Ok(())
    }

    /// 경매 이벤트 발행기
    pub fn notifier(&self, topic: &str) -> KafkaNotifier {
        KafkaNotifier::new(self.get_producer(), topic)
    }
}

// endregion: --- Kafka Manager
