// region:    --- Imports
use super::{AuctionStore, Change, Changeset, StoreError};
use crate::auction::model::{
    Bid, Item, ItemId, Participant, Room, RoomId, RoomStatus, WinRecord,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

// endregion: --- Imports

// region:    --- Memory Store
#[derive(Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    items: HashMap<ItemId, Item>,
    participants: HashMap<String, Participant>,
    bids: Vec<Bid>,
    wins: HashMap<ItemId, WinRecord>,
}

/// 메모리 저장소 (DATABASE_URL 미설정 시 및 테스트용)
#[derive(Default)]
pub struct MemoryAuctionStore {
    tables: RwLock<Tables>,
}

impl MemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bid_count(&self) -> usize {
        self.tables.read().bids.len()
    }

    pub fn win_count(&self) -> usize {
        self.tables.read().wins.len()
    }

    pub fn item(&self, item_id: ItemId) -> Option<Item> {
        self.tables.read().items.get(&item_id).cloned()
    }

    pub fn room(&self, room_id: RoomId) -> Option<Room> {
        self.tables.read().rooms.get(&room_id).cloned()
    }
}

/// 이전 상태 조건 확인 (insert 는 부재, update 는 상태 일치)
fn check_room(tables: &Tables, change: &Change<Room>) -> Result<(), StoreError> {
    let stored = tables.rooms.get(&change.after.id);
    match (&change.before, stored) {
        (None, None) => Ok(()),
        (Some(before), Some(stored)) if before.status == stored.status => Ok(()),
        _ => Err(StoreError::Conflict(format!(
            "room {} 상태 조건 불일치",
            change.after.id
        ))),
    }
}

fn check_item(tables: &Tables, change: &Change<Item>) -> Result<(), StoreError> {
    let stored = tables.items.get(&change.after.id);
    match (&change.before, stored) {
        (None, None) => Ok(()),
        (Some(before), Some(stored)) if before.status == stored.status => Ok(()),
        _ => Err(StoreError::Conflict(format!(
            "item {} 상태 조건 불일치",
            change.after.id
        ))),
    }
}

fn check_participant(tables: &Tables, change: &Change<Participant>) -> Result<(), StoreError> {
    let stored = tables.participants.get(&change.after.display_name);
    if change.before.as_ref() == stored {
        return Ok(());
    }
    Err(StoreError::Conflict(format!(
        "participant {} 이전 값 불일치",
        change.after.display_name
    )))
}

#[async_trait]
impl AuctionStore for MemoryAuctionStore {
    async fn apply(&self, changes: &Changeset) -> Result<(), StoreError> {
        let mut tables = self.tables.write();

        // 조건을 모두 확인한 뒤에만 반영
        for change in &changes.rooms {
            check_room(&tables, change)?;
        }
        for change in &changes.items {
            check_item(&tables, change)?;
        }
        for change in &changes.participants {
            check_participant(&tables, change)?;
        }
        if let Some(win) = changes
            .wins
            .iter()
            .find(|win| tables.wins.contains_key(&win.item_id))
        {
            return Err(StoreError::Conflict(format!(
                "item {} 낙찰 기록이 이미 존재",
                win.item_id
            )));
        }

        for change in &changes.rooms {
            tables.rooms.insert(change.after.id, change.after.clone());
        }
        for change in &changes.items {
            tables.items.insert(change.after.id, change.after.clone());
        }
        for change in &changes.participants {
            tables
                .participants
                .insert(change.after.display_name.clone(), change.after.clone());
        }
        tables.bids.extend(changes.bids.iter().cloned());
        for win in &changes.wins {
            tables.wins.insert(win.item_id, win.clone());
        }
        Ok(())
    }

    async fn revert(&self, changes: &Changeset) -> Result<(), StoreError> {
        let mut tables = self.tables.write();

        for win in &changes.wins {
            tables.wins.remove(&win.item_id);
        }
        tables
            .bids
            .retain(|bid| !changes.bids.iter().any(|added| added.id == bid.id));
        for change in changes.participants.iter().rev() {
            match &change.before {
                Some(before) => {
                    tables
                        .participants
                        .insert(before.display_name.clone(), before.clone());
                }
                None => {
                    tables.participants.remove(&change.after.display_name);
                }
            }
        }
        for change in changes.items.iter().rev() {
            match &change.before {
                Some(before) => {
                    tables.items.insert(before.id, before.clone());
                }
                None => {
                    tables.items.remove(&change.after.id);
                }
            }
        }
        for change in changes.rooms.iter().rev() {
            match &change.before {
                Some(before) => {
                    tables.rooms.insert(before.id, before.clone());
                }
                None => {
                    tables.rooms.remove(&change.after.id);
                }
            }
        }
        Ok(())
    }

    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.tables.read().rooms.get(&room_id).cloned())
    }

    async fn load_open_rooms(&self) -> Result<Vec<(Room, Vec<Item>)>, StoreError> {
        let tables = self.tables.read();
        let mut rooms: Vec<Room> = tables
            .rooms
            .values()
            .filter(|room| room.status != RoomStatus::Ended)
            .cloned()
            .collect();
        rooms.sort_by_key(|room| room.created_at);

        Ok(rooms
            .into_iter()
            .map(|room| {
                let items = sorted_items(&tables, room.id);
                (room, items)
            })
            .collect())
    }

    async fn bids_for_item(&self, item_id: ItemId) -> Result<Vec<Bid>, StoreError> {
        let mut bids: Vec<Bid> = self
            .tables
            .read()
            .bids
            .iter()
            .filter(|bid| bid.item_id == item_id)
            .cloned()
            .collect();
        bids.sort_by_key(|bid| bid.placed_at);
        Ok(bids)
    }

    async fn items_in_room(&self, room_id: RoomId) -> Result<Vec<Item>, StoreError> {
        Ok(sorted_items(&self.tables.read(), room_id))
    }

    async fn win_records_for_room(&self, room_id: RoomId) -> Result<Vec<WinRecord>, StoreError> {
        let mut wins: Vec<WinRecord> = self
            .tables
            .read()
            .wins
            .values()
            .filter(|win| win.room_id == room_id)
            .cloned()
            .collect();
        wins.sort_by_key(|win| win.won_at);
        Ok(wins)
    }

    async fn win_records_for_bidder(&self, bidder: &str) -> Result<Vec<WinRecord>, StoreError> {
        let mut wins: Vec<WinRecord> = self
            .tables
            .read()
            .wins
            .values()
            .filter(|win| win.winner == bidder)
            .cloned()
            .collect();
        wins.sort_by_key(|win| win.won_at);
        Ok(wins)
    }

    async fn find_participant(
        &self,
        display_name: &str,
    ) -> Result<Option<Participant>, StoreError> {
        Ok(self.tables.read().participants.get(display_name).cloned())
    }
}

fn sorted_items(tables: &Tables, room_id: RoomId) -> Vec<Item> {
    let mut items: Vec<Item> = tables
        .items
        .values()
        .filter(|item| item.room_id == room_id)
        .cloned()
        .collect();
    items.sort_by_key(|item| (item.position, item.created_at));
    items
}

// endregion: --- Memory Store

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{BidId, ItemStatus, NewItem, Role};
    use chrono::Utc;

    fn room() -> Room {
        Room {
            id: RoomId::new(),
            label: "room".into(),
            bid_increment: 10,
            auctioneer: "host".into(),
            status: RoomStatus::Lobby,
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    fn item(room: &Room, position: i64) -> Item {
        NewItem {
            name: format!("item-{position}"),
            categories: vec![],
            image_ref: None,
            starting_price: 100,
            bid_increment: None,
        }
        .into_item(room.id, "host".into(), position, Utc::now())
    }

    fn win(item: &Item) -> WinRecord {
        WinRecord {
            room_id: item.room_id,
            item_id: item.id,
            item_name: item.name.clone(),
            winner: "B".into(),
            amount: 120,
            won_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_then_conditional_update() {
        let store = MemoryAuctionStore::new();
        let room = room();
        let mut changes = Changeset::default();
        changes.room(None, &room);
        store.apply(&changes).await.unwrap();

        // 같은 방을 다시 insert 하면 충돌
        assert!(matches!(
            store.apply(&changes).await,
            Err(StoreError::Conflict(_))
        ));

        let mut active = room.clone();
        active.status = RoomStatus::Active;
        let mut update = Changeset::default();
        update.room(Some(&room), &active);
        store.apply(&update).await.unwrap();
        assert_eq!(store.room(room.id).unwrap().status, RoomStatus::Active);

        // 이전 상태가 lobby 라는 조건은 이제 맞지 않음
        assert!(store.apply(&update).await.is_err());
    }

    #[tokio::test]
    async fn win_record_is_insert_if_absent() {
        let store = MemoryAuctionStore::new();
        let room = room();
        let item = item(&room, 0);

        let mut changes = Changeset::default();
        changes.item(None, &item);
        changes.wins.push(win(&item));
        store.apply(&changes).await.unwrap();

        let mut again = Changeset::default();
        again.wins.push(win(&item));
        assert!(matches!(
            store.apply(&again).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.win_count(), 1);
    }

    #[tokio::test]
    async fn failed_apply_changes_nothing() {
        let store = MemoryAuctionStore::new();
        let room = room();
        let item = item(&room, 0);

        let mut stale = item.clone();
        stale.status = ItemStatus::Active;
        let mut changes = Changeset::default();
        changes.room(None, &room);
        // 존재하지 않는 상품을 update 하려는 변경 포함
        changes.items.push(Change {
            before: Some(item.clone()),
            after: stale,
        });

        assert!(store.apply(&changes).await.is_err());
        assert!(store.room(room.id).is_none());
    }

    #[tokio::test]
    async fn participant_write_requires_matching_previous() {
        let store = MemoryAuctionStore::new();
        let joined = Participant {
            client_id: "client-1".into(),
            display_name: "A".into(),
            role: Role::Bidder,
            current_room: Some(RoomId::new()),
            online: true,
        };
        let mut first = Changeset::default();
        first.participants.push(Change {
            before: None,
            after: joined.clone(),
        });
        store.apply(&first).await.unwrap();

        // 같은 "없음" 을 전제로 한 두 번째 참가는 충돌
        assert!(matches!(
            store.apply(&first).await,
            Err(StoreError::Conflict(_))
        ));

        let moved = Participant {
            current_room: Some(RoomId::new()),
            ..joined.clone()
        };
        let mut second = Changeset::default();
        second.participants.push(Change {
            before: Some(joined),
            after: moved.clone(),
        });
        store.apply(&second).await.unwrap();
        assert_eq!(store.find_participant("A").await.unwrap(), Some(moved));
    }

    #[tokio::test]
    async fn revert_undoes_apply() {
        let store = MemoryAuctionStore::new();
        let room = room();
        let item = item(&room, 0);
        let mut setup = Changeset::default();
        setup.room(None, &room);
        setup.item(None, &item);
        store.apply(&setup).await.unwrap();

        let mut bid_item = item.clone();
        bid_item.status = ItemStatus::Active;
        bid_item.current_price = 110;
        let mut changes = Changeset::default();
        changes.item(Some(&item), &bid_item);
        changes.bids.push(Bid {
            id: BidId::new(),
            item_id: item.id,
            room_id: room.id,
            bidder: "A".into(),
            amount: 110,
            placed_at: Utc::now(),
        });
        store.apply(&changes).await.unwrap();
        assert_eq!(store.bid_count(), 1);

        store.revert(&changes).await.unwrap();
        assert_eq!(store.bid_count(), 0);
        assert_eq!(store.item(item.id).unwrap(), item);
    }

    #[tokio::test]
    async fn open_rooms_skip_ended_and_order_items() {
        let store = MemoryAuctionStore::new();
        let open = room();
        let mut ended = room();
        ended.status = RoomStatus::Ended;

        let mut changes = Changeset::default();
        changes.room(None, &open);
        changes.room(None, &ended);
        changes.item(None, &item(&open, 1));
        changes.item(None, &item(&open, 0));
        store.apply(&changes).await.unwrap();

        let rooms = store.load_open_rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        let positions: Vec<i64> = rooms[0].1.iter().map(|item| item.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }
}
// endregion: --- Tests
