// region:    --- Imports
use crate::auction::error::AuctionError;
use crate::auction::model::{Bid, Item, ItemId, Participant, Room, RoomId, WinRecord};
use async_trait::async_trait;
use thiserror::Error;

mod memory;

pub use memory::MemoryAuctionStore;

// endregion: --- Imports

// region:    --- Changeset
/// 이전 값이 없으면 insert-if-absent, 있으면 이전 상태를 조건으로 한 update
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    pub before: Option<T>,
    pub after: T,
}

/// 한 번의 상태 전이로 발생한 저장소 변경분
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    pub rooms: Vec<Change<Room>>,
    pub items: Vec<Change<Item>>,
    pub participants: Vec<Change<Participant>>,
    pub bids: Vec<Bid>,
    pub wins: Vec<WinRecord>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
            && self.items.is_empty()
            && self.participants.is_empty()
            && self.bids.is_empty()
            && self.wins.is_empty()
    }

    pub fn room(&mut self, before: Option<&Room>, after: &Room) {
        if before != Some(after) {
            self.rooms.push(Change {
                before: before.cloned(),
                after: after.clone(),
            });
        }
    }

    pub fn item(&mut self, before: Option<&Item>, after: &Item) {
        if before != Some(after) {
            self.items.push(Change {
                before: before.cloned(),
                after: after.clone(),
            });
        }
    }

    pub fn participant(&mut self, before: Option<&Participant>, after: &Participant) {
        if before != Some(after) {
            self.participants.push(Change {
                before: before.cloned(),
                after: after.clone(),
            });
        }
    }
}

// endregion: --- Changeset

// region:    --- Store Error
#[derive(Debug, Error)]
pub enum StoreError {
    /// 낙관적 조건 불일치 또는 중복 낙찰 기록
    #[error("저장소 충돌: {0}")]
    Conflict(String),
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
    #[error("잘못된 저장 데이터: {0}")]
    Corrupt(String),
    #[error("저장소 사용 불가: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuctionError {
    fn from(value: StoreError) -> Self {
        AuctionError::PersistenceFailed(value.to_string())
    }
}

// endregion: --- Store Error

// region:    --- Auction Store Trait
/// 경매 저장소 트레이트 (영속화 협력자)
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// 변경분을 원자적으로 반영
    async fn apply(&self, changes: &Changeset) -> Result<(), StoreError>;

    /// 반영했던 변경분을 되돌림 (알림 실패 시 보상)
    async fn revert(&self, changes: &Changeset) -> Result<(), StoreError>;

    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, StoreError>;

    /// 종료되지 않은 방과 그 상품들 (등록 순서)
    async fn load_open_rooms(&self) -> Result<Vec<(Room, Vec<Item>)>, StoreError>;

    /// 시간 순 입찰 이력
    async fn bids_for_item(&self, item_id: ItemId) -> Result<Vec<Bid>, StoreError>;

    /// 등록 순 상품 목록
    async fn items_in_room(&self, room_id: RoomId) -> Result<Vec<Item>, StoreError>;

    async fn win_records_for_room(&self, room_id: RoomId) -> Result<Vec<WinRecord>, StoreError>;

    async fn win_records_for_bidder(&self, bidder: &str) -> Result<Vec<WinRecord>, StoreError>;

    async fn find_participant(&self, display_name: &str)
        -> Result<Option<Participant>, StoreError>;
}

// endregion: --- Auction Store Trait
