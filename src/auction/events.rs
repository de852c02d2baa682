use super::model::{Item, ItemId, ItemStatus, Participant, RoomId, RoomStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 방 단위로 전파되는 경매 이벤트
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    // 방 또는 상품 상태 변경
    StatusChange {
        room_id: RoomId,
        room_status: RoomStatus,
        item: Option<Item>,
        timestamp: DateTime<Utc>,
    },
    // 입찰 이벤트
    BidPlaced {
        room_id: RoomId,
        item_id: ItemId,
        bidder: String,
        amount: i64,
        timestamp: DateTime<Utc>,
    },
    // 콜 단계 변경
    CallUpdate {
        room_id: RoomId,
        item_id: ItemId,
        call_count: u8,
        status: ItemStatus,
        timestamp: DateTime<Utc>,
    },
    // 낙찰/유찰 안내
    AuctionNotification {
        room_id: RoomId,
        item_id: ItemId,
        message: String,
        status: ItemStatus,
        timestamp: DateTime<Utc>,
    },
    ParticipantJoined {
        room_id: RoomId,
        participant: Participant,
        timestamp: DateTime<Utc>,
    },
    ParticipantLeft {
        room_id: RoomId,
        display_name: String,
        timestamp: DateTime<Utc>,
    },
}

impl AuctionEvent {
    pub fn room_id(&self) -> RoomId {
        match self {
            Self::StatusChange { room_id, .. }
            | Self::BidPlaced { room_id, .. }
            | Self::CallUpdate { room_id, .. }
            | Self::AuctionNotification { room_id, .. }
            | Self::ParticipantJoined { room_id, .. }
            | Self::ParticipantLeft { room_id, .. } => *room_id,
        }
    }

    /// 직렬화된 `type` 값
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StatusChange { .. } => "status_change",
            Self::BidPlaced { .. } => "bid_placed",
            Self::CallUpdate { .. } => "call_update",
            Self::AuctionNotification { .. } => "auction_notification",
            Self::ParticipantJoined { .. } => "participant_joined",
            Self::ParticipantLeft { .. } => "participant_left",
        }
    }
}
