/// Postgres 경매 저장소
/// 변경분 하나를 트랜잭션 하나로 반영하고, 조건 불일치 시 롤백한다.
// region:    --- Imports
use super::DatabaseManager;
use crate::auction::model::{Bid, Item, ItemId, Participant, Room, RoomId, WinRecord};
use crate::event_store::{AuctionStore, Change, Changeset, StoreError};
use crate::query::{handlers, queries};
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Postgres Store
pub struct PostgresAuctionStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresAuctionStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl AuctionStore for PostgresAuctionStore {
    async fn apply(&self, changes: &Changeset) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }
        let changes = changes.clone();
        self.db_manager
            .transaction(move |tx| Box::pin(async move { apply_changes(tx, &changes).await }))
            .await
    }

    async fn revert(&self, changes: &Changeset) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }
        warn!("{:<12} --> 변경분 되돌리기", "Store");
        let changes = changes.clone();
        self.db_manager
            .transaction(move |tx| Box::pin(async move { revert_changes(tx, &changes).await }))
            .await
    }

    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, StoreError> {
        handlers::get_room(self.db_manager.pool(), room_id).await
    }

    async fn load_open_rooms(&self) -> Result<Vec<(Room, Vec<Item>)>, StoreError> {
        let pool = self.db_manager.pool();
        let mut rooms = Vec::new();
        for room in handlers::get_open_rooms(pool).await? {
            let items = handlers::get_room_items(pool, room.id).await?;
            rooms.push((room, items));
        }
        info!("{:<12} --> 진행 중인 방 {}개 로드", "Store", rooms.len());
        Ok(rooms)
    }

    async fn bids_for_item(&self, item_id: ItemId) -> Result<Vec<Bid>, StoreError> {
        handlers::get_bid_history(self.db_manager.pool(), item_id).await
    }

    async fn items_in_room(&self, room_id: RoomId) -> Result<Vec<Item>, StoreError> {
        handlers::get_room_items(self.db_manager.pool(), room_id).await
    }

    async fn win_records_for_room(&self, room_id: RoomId) -> Result<Vec<WinRecord>, StoreError> {
        handlers::get_room_win_records(self.db_manager.pool(), room_id).await
    }

    async fn win_records_for_bidder(&self, bidder: &str) -> Result<Vec<WinRecord>, StoreError> {
        handlers::get_bidder_win_records(self.db_manager.pool(), bidder).await
    }

    async fn find_participant(
        &self,
        display_name: &str,
    ) -> Result<Option<Participant>, StoreError> {
        handlers::get_participant(self.db_manager.pool(), display_name).await
    }
}

// endregion: --- Postgres Store

// region:    --- Apply / Revert
async fn apply_changes(
    tx: &mut Transaction<'_, Postgres>,
    changes: &Changeset,
) -> Result<(), StoreError> {
    for change in &changes.rooms {
        write_room(tx, change).await?;
    }
    for change in &changes.items {
        write_item(tx, change).await?;
    }
    for change in &changes.participants {
        write_participant(tx, change).await?;
    }
    for bid in &changes.bids {
        sqlx::query(queries::INSERT_BID)
            .bind(bid.id.0)
            .bind(bid.item_id.0)
            .bind(bid.room_id.0)
            .bind(&bid.bidder)
            .bind(bid.amount)
            .bind(bid.placed_at)
            .execute(&mut **tx)
            .await?;
    }
    for win in &changes.wins {
        let inserted = sqlx::query(queries::INSERT_WIN_RECORD)
            .bind(win.item_id.0)
            .bind(win.room_id.0)
            .bind(&win.item_name)
            .bind(&win.winner)
            .bind(win.amount)
            .bind(win.won_at)
            .execute(&mut **tx)
            .await?
            .rows_affected();
        if inserted == 0 {
            return Err(StoreError::Conflict(format!(
                "item {} 낙찰 기록이 이미 존재",
                win.item_id
            )));
        }
    }
    Ok(())
}

async fn revert_changes(
    tx: &mut Transaction<'_, Postgres>,
    changes: &Changeset,
) -> Result<(), StoreError> {
    for win in &changes.wins {
        sqlx::query(queries::DELETE_WIN_RECORD)
            .bind(win.item_id.0)
            .execute(&mut **tx)
            .await?;
    }
    for bid in &changes.bids {
        sqlx::query(queries::DELETE_BID)
            .bind(bid.id.0)
            .execute(&mut **tx)
            .await?;
    }
    for change in changes.participants.iter().rev() {
        match &change.before {
            Some(before) => upsert_participant(tx, before).await?,
            None => {
                sqlx::query(queries::DELETE_PARTICIPANT)
                    .bind(&change.after.display_name)
                    .execute(&mut **tx)
                    .await?;
            }
        }
    }
    for change in changes.items.iter().rev() {
        match &change.before {
            // after -> before 방향의 조건부 갱신
            Some(before) => {
                write_item(
                    tx,
                    &Change {
                        before: Some(change.after.clone()),
                        after: before.clone(),
                    },
                )
                .await?
            }
            None => {
                sqlx::query(queries::DELETE_ITEM)
                    .bind(change.after.id.0)
                    .execute(&mut **tx)
                    .await?;
            }
        }
    }
    for change in changes.rooms.iter().rev() {
        match &change.before {
            Some(before) => {
                write_room(
                    tx,
                    &Change {
                        before: Some(change.after.clone()),
                        after: before.clone(),
                    },
                )
                .await?
            }
            None => {
                sqlx::query(queries::DELETE_ROOM)
                    .bind(change.after.id.0)
                    .execute(&mut **tx)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn write_room(
    tx: &mut Transaction<'_, Postgres>,
    change: &Change<Room>,
) -> Result<(), StoreError> {
    let room = &change.after;
    let query = match &change.before {
        None => sqlx::query(queries::INSERT_ROOM),
        Some(_) => sqlx::query(queries::UPDATE_ROOM),
    }
    .bind(room.id.0)
    .bind(&room.label)
    .bind(room.bid_increment)
    .bind(&room.auctioneer)
    .bind(room.status.as_str())
    .bind(room.created_at)
    .bind(room.ended_at);

    let query = match &change.before {
        None => query,
        Some(before) => query.bind(before.status.as_str()),
    };

    if query.execute(&mut **tx).await?.rows_affected() == 0 {
        return Err(StoreError::Conflict(format!(
            "room {} 상태 조건 불일치",
            room.id
        )));
    }
    Ok(())
}

async fn write_item(
    tx: &mut Transaction<'_, Postgres>,
    change: &Change<Item>,
) -> Result<(), StoreError> {
    let item = &change.after;
    let query = match &change.before {
        None => sqlx::query(queries::INSERT_ITEM),
        Some(_) => sqlx::query(queries::UPDATE_ITEM),
    }
    .bind(item.id.0)
    .bind(item.room_id.0)
    .bind(&item.name)
    .bind(item.categories.clone())
    .bind(item.image_ref.clone())
    .bind(item.starting_price)
    .bind(item.current_price)
    .bind(item.bid_increment)
    .bind(item.status.as_str())
    .bind(&item.listed_by)
    .bind(item.last_bidder.clone())
    .bind(item.winner.clone())
    .bind(item.winning_amount)
    .bind(item.position)
    .bind(item.created_at)
    .bind(item.sold_at);

    let query = match &change.before {
        None => query,
        Some(before) => query.bind(before.status.as_str()),
    };

    if query.execute(&mut **tx).await?.rows_affected() == 0 {
        return Err(StoreError::Conflict(format!(
            "item {} 상태 조건 불일치",
            item.id
        )));
    }
    Ok(())
}

async fn write_participant(
    tx: &mut Transaction<'_, Postgres>,
    change: &Change<Participant>,
) -> Result<(), StoreError> {
    let participant = &change.after;
    let query = match &change.before {
        None => sqlx::query(queries::INSERT_PARTICIPANT),
        Some(_) => sqlx::query(queries::UPDATE_PARTICIPANT),
    }
    .bind(&participant.display_name)
    .bind(&participant.client_id)
    .bind(participant.role.as_str())
    .bind(participant.current_room.map(|room| room.0))
    .bind(participant.online);

    let query = match &change.before {
        None => query,
        Some(before) => query
            .bind(&before.client_id)
            .bind(before.role.as_str())
            .bind(before.current_room.map(|room| room.0))
            .bind(before.online),
    };

    if query.execute(&mut **tx).await?.rows_affected() == 0 {
        return Err(StoreError::Conflict(format!(
            "participant {} 이전 값 불일치",
            participant.display_name
        )));
    }
    Ok(())
}

async fn upsert_participant(
    tx: &mut Transaction<'_, Postgres>,
    participant: &Participant,
) -> Result<(), StoreError> {
    sqlx::query(queries::UPSERT_PARTICIPANT)
        .bind(&participant.display_name)
        .bind(&participant.client_id)
        .bind(participant.role.as_str())
        .bind(participant.current_room.map(|room| room.0))
        .bind(participant.online)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

// endregion: --- Apply / Revert
