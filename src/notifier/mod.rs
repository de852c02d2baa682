/// 알림 협력자
/// 컨트롤러는 이 트레이트로만 이벤트를 내보내고, 실제 전달 방식(프로세스 내 broadcast, Kafka 등)은 모른다.
// region:    --- Imports
use crate::auction::error::AuctionError;
use crate::auction::events::AuctionEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

// endregion: --- Imports

// region:    --- Notifier Trait
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("직렬화 실패: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("전송 실패: {0}")]
    Transport(String),
}

impl From<NotifyError> for AuctionError {
    fn from(value: NotifyError) -> Self {
        AuctionError::NotificationFailed(value.to_string())
    }
}

/// 방 단위 이벤트 발행 (at-least-once)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), NotifyError>;
}

// endregion: --- Notifier Trait

// region:    --- Broadcast Notifier
/// 프로세스 내 구독자에게 tokio broadcast 로 전달
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<AuctionEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), NotifyError> {
        // 구독자가 없어도 실패가 아니다
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        debug!(
            "{:<12} --> {} 이벤트 전달: room={}, 구독자={}",
            "Broadcast",
            event.kind(),
            event.room_id(),
            receivers
        );
        Ok(())
    }
}

// endregion: --- Broadcast Notifier

// region:    --- Fanout Notifier
/// 여러 알림 채널에 순서대로 발행. 하나라도 실패하면 실패
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<Arc<dyn Notifier>>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), NotifyError> {
        for target in &self.targets {
            target.publish(event).await?;
        }
        Ok(())
    }
}

// endregion: --- Fanout Notifier

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::RoomId;
    use chrono::Utc;

    fn left(room_id: RoomId) -> AuctionEvent {
        AuctionEvent::ParticipantLeft {
            room_id,
            display_name: "A".into(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_is_ok() {
        let notifier = BroadcastNotifier::default();
        assert!(notifier.publish(&left(RoomId::new())).await.is_ok());
    }

    #[tokio::test]
    async fn fanout_delivers_to_every_target() {
        let first = BroadcastNotifier::default();
        let second = BroadcastNotifier::default();
        let mut first_rx = first.subscribe();
        let mut second_rx = second.subscribe();

        let fanout = FanoutNotifier::new(vec![Arc::new(first), Arc::new(second)]);
        let room_id = RoomId::new();
        fanout.publish(&left(room_id)).await.unwrap();

        assert_eq!(first_rx.recv().await.unwrap().room_id(), room_id);
        assert_eq!(second_rx.recv().await.unwrap().kind(), "participant_left");
    }
}
// endregion: --- Tests
