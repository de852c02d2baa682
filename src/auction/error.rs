/// 경매 에러 분류
/// 모든 에러는 고정된 코드(code)와 사람이 읽을 수 있는 메시지를 함께 가진다.
// region:    --- Imports
use super::model::{ItemId, RoomId};
use thiserror::Error;

// endregion: --- Imports

// region:    --- Auction Error
pub type AuctionResult<T> = Result<T, AuctionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuctionError {
    #[error("잘못된 입력입니다: {0}")]
    Validation(String),
    #[error("경매방을 찾을 수 없습니다: {0}")]
    RoomNotFound(RoomId),
    #[error("상품을 찾을 수 없습니다: {0}")]
    ItemNotFound(ItemId),
    #[error("권한이 없습니다: {0}")]
    NotAuthorized(String),
    #[error("이미 진행 중인 상품이 있습니다: {0}")]
    ItemAlreadyActive(ItemId),
    #[error("입찰할 수 없는 상품 상태입니다: {0}")]
    ItemNotBiddable(String),
    #[error("현재 최고 입찰자는 다시 입찰할 수 없습니다.")]
    SelfOutbid,
    #[error("경매사는 입찰할 수 없습니다.")]
    AuctioneerCannotBid,
    #[error("입찰 금액이 최소 금액보다 낮습니다. (최소: {min_required})")]
    BelowMinimum { min_required: i64 },
    #[error("진행 중인 상품이 없습니다.")]
    NoActiveItem,
    #[error("입찰이 없어 낙찰할 수 없습니다.")]
    NoBidsToSell,
    #[error("이미 낙찰된 상품입니다: {0}")]
    AlreadySold(ItemId),
    #[error("이미 종료된 경매방입니다: {0}")]
    RoomEnded(RoomId),
    #[error("대기 중인 상품이 없습니다.")]
    QueueEmpty,
    #[error("허용되지 않는 상태 전이입니다: {0}")]
    InvalidTransition(String),
    #[error("저장소 처리 실패: {0}")]
    PersistenceFailed(String),
    #[error("알림 전송 실패: {0}")]
    NotificationFailed(String),
}

impl AuctionError {
    /// 응답에 실리는 고정 코드
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::NotAuthorized(_) => "NOT_AUTHORIZED",
            Self::ItemAlreadyActive(_) => "ITEM_ALREADY_ACTIVE",
            Self::ItemNotBiddable(_) => "ITEM_NOT_BIDDABLE",
            Self::SelfOutbid => "SELF_OUTBID",
            Self::AuctioneerCannotBid => "AUCTIONEER_CANNOT_BID",
            Self::BelowMinimum { .. } => "BELOW_MINIMUM",
            Self::NoActiveItem => "NO_ACTIVE_ITEM",
            Self::NoBidsToSell => "NO_BIDS_TO_SELL",
            Self::AlreadySold(_) => "ALREADY_SOLD",
            Self::RoomEnded(_) => "ROOM_ENDED",
            Self::QueueEmpty => "QUEUE_EMPTY",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::PersistenceFailed(_) => "PERSISTENCE_FAILED",
            Self::NotificationFailed(_) => "NOTIFICATION_FAILED",
        }
    }

    /// 외부 협력자 실패 여부 (같은 요청을 그대로 재시도 가능)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::PersistenceFailed(_) | Self::NotificationFailed(_)
        )
    }
}

// endregion: --- Auction Error
