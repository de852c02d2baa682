/// 경매방 레지스트리
/// 방 id -> 진행 상태(RoomState). 방마다 비동기 뮤텍스 하나로 변경을 직렬화하고,
/// 조회는 마지막으로 확정된 스냅샷을 잠금 없이 읽는다.
// region:    --- Imports
use crate::auction::model::{Item, ItemId, ItemStatus, Participant, Room, RoomId};
use crate::calling::CallState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

// endregion: --- Imports

// region:    --- Room State
/// 방 하나의 진행 상태
#[derive(Debug, Clone)]
pub struct RoomState {
    pub room: Room,
    /// 방의 모든 상품 (등록 순서 유지)
    pub items: Vec<Item>,
    /// 현재 상품. 낙찰 후에도 다음 상품으로 넘어가기 전까지 유지된다.
    pub current: Option<ItemId>,
    pub call: CallState,
    /// 표시 이름 -> 참가자
    pub roster: BTreeMap<String, Participant>,
}

impl RoomState {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            items: Vec::new(),
            current: None,
            call: CallState::default(),
            roster: BTreeMap::new(),
        }
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == item_id)
    }

    pub fn current_item(&self) -> Option<&Item> {
        self.current.as_ref().and_then(|id| self.item(id))
    }

    /// 진행 중(active/콜) 상품
    pub fn in_play_item(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.status.is_in_play())
    }

    /// 대기열 맨 앞의 pending 상품
    pub fn next_pending(&self) -> Option<&Item> {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Pending)
            .min_by_key(|item| (item.position, item.created_at))
    }

    pub fn next_position(&self) -> i64 {
        self.items.iter().map(|item| item.position + 1).max().unwrap_or(0)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room: self.room.clone(),
            current_item: self.current_item().cloned(),
            call: self.call,
            pending_items: self
                .items
                .iter()
                .filter(|item| item.status == ItemStatus::Pending)
                .count(),
            participants: self.roster.values().cloned().collect(),
        }
    }
}

/// 조회용 스냅샷
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub room: Room,
    pub current_item: Option<Item>,
    pub call: CallState,
    pub pending_items: usize,
    pub participants: Vec<Participant>,
}

// endregion: --- Room State

// region:    --- Room Slot
/// 레지스트리 엔트리: 변경용 잠금 + 조회용 스냅샷
pub struct RoomSlot {
    state: Mutex<RoomState>,
    snapshot: RwLock<Arc<RoomSnapshot>>,
}

impl RoomSlot {
    fn new(state: RoomState) -> Self {
        let snapshot = Arc::new(state.snapshot());
        Self {
            state: Mutex::new(state),
            snapshot: RwLock::new(snapshot),
        }
    }

    /// 방 단위 배타 잠금
    pub async fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().await
    }

    /// 마지막으로 공개된 스냅샷
    pub fn snapshot(&self) -> Arc<RoomSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// 잠금을 잡은 쪽이 변경 직후 호출
    pub fn publish(&self, state: &RoomState) {
        *self.snapshot.write() = Arc::new(state.snapshot());
    }
}

// endregion: --- Room Slot

// region:    --- Room Registry
/// 방 id 로 구분되는 유일한 공유 가변 자원
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Arc<RoomSlot>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &RoomId) -> Option<Arc<RoomSlot>> {
        self.rooms.get(room_id).map(|slot| Arc::clone(slot.value()))
    }

    /// 없을 때만 등록. 이미 있으면 기존 엔트리 반환
    pub fn create(&self, state: RoomState) -> Arc<RoomSlot> {
        match self.rooms.entry(state.room.id) {
            Entry::Occupied(occupied) => Arc::clone(occupied.get()),
            Entry::Vacant(vacant) => Arc::clone(&vacant.insert(Arc::new(RoomSlot::new(state)))),
        }
    }

    pub fn remove(&self, room_id: &RoomId) -> Option<Arc<RoomSlot>> {
        self.rooms.remove(room_id).map(|(_, slot)| slot)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

// endregion: --- Room Registry

// endregion: --- Tests
