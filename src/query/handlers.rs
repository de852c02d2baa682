// region:    --- Imports
use super::queries;
use crate::auction::model::{
    Bid, Item, ItemId, Participant, Room, RoomId, WinRecord,
};
use crate::event_store::StoreError;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Rows
#[derive(FromRow)]
pub struct RoomRow {
    pub id: Uuid,
    pub label: String,
    pub bid_increment: i64,
    pub auctioneer: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl TryFrom<RoomRow> for Room {
    type Error = StoreError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            id: RoomId(row.id),
            label: row.label,
            bid_increment: row.bid_increment,
            auctioneer: row.auctioneer,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
            ended_at: row.ended_at,
        })
    }
}

#[derive(FromRow)]
pub struct ItemRow {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    pub image_ref: Option<String>,
    pub starting_price: i64,
    pub current_price: i64,
    pub bid_increment: Option<i64>,
    pub status: String,
    pub listed_by: String,
    pub last_bidder: Option<String>,
    pub winner: Option<String>,
    pub winning_amount: Option<i64>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub sold_at: Option<DateTime<Utc>>,
}

impl TryFrom<ItemRow> for Item {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Item {
            id: ItemId(row.id),
            room_id: RoomId(row.room_id),
            name: row.name,
            categories: row.categories,
            image_ref: row.image_ref,
            starting_price: row.starting_price,
            current_price: row.current_price,
            bid_increment: row.bid_increment,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            listed_by: row.listed_by,
            last_bidder: row.last_bidder,
            winner: row.winner,
            winning_amount: row.winning_amount,
            position: row.position,
            created_at: row.created_at,
            sold_at: row.sold_at,
        })
    }
}

#[derive(FromRow)]
pub struct BidRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub room_id: Uuid,
    pub bidder: String,
    pub amount: i64,
    pub placed_at: DateTime<Utc>,
}

impl From<BidRow> for Bid {
    fn from(row: BidRow) -> Self {
        Bid {
            id: row.id.into(),
            item_id: ItemId(row.item_id),
            room_id: RoomId(row.room_id),
            bidder: row.bidder,
            amount: row.amount,
            placed_at: row.placed_at,
        }
    }
}

#[derive(FromRow)]
pub struct ParticipantRow {
    pub display_name: String,
    pub client_id: String,
    pub role: String,
    pub current_room: Option<Uuid>,
    pub online: bool,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = StoreError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(Participant {
            client_id: row.client_id,
            display_name: row.display_name,
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            current_room: row.current_room.map(RoomId),
            online: row.online,
        })
    }
}

#[derive(FromRow)]
pub struct WinRecordRow {
    pub item_id: Uuid,
    pub room_id: Uuid,
    pub item_name: String,
    pub winner: String,
    pub amount: i64,
    pub won_at: DateTime<Utc>,
}

impl From<WinRecordRow> for WinRecord {
    fn from(row: WinRecordRow) -> Self {
        WinRecord {
            room_id: RoomId(row.room_id),
            item_id: ItemId(row.item_id),
            item_name: row.item_name,
            winner: row.winner,
            amount: row.amount,
            won_at: row.won_at,
        }
    }
}

// endregion: --- Rows

// region:    --- Query Handlers

/// 방 조회
pub async fn get_room(pool: &PgPool, room_id: RoomId) -> Result<Option<Room>, StoreError> {
    info!("{:<12} --> 방 조회 id: {}", "Query", room_id);
    sqlx::query_as::<_, RoomRow>(queries::GET_ROOM)
        .bind(room_id.0)
        .fetch_optional(pool)
        .await?
        .map(Room::try_from)
        .transpose()
}

/// 종료되지 않은 방 조회
pub async fn get_open_rooms(pool: &PgPool) -> Result<Vec<Room>, StoreError> {
    info!("{:<12} --> 진행 중인 방 조회", "Query");
    sqlx::query_as::<_, RoomRow>(queries::GET_OPEN_ROOMS)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Room::try_from)
        .collect()
}

/// 방 상품 조회 (등록 순)
pub async fn get_room_items(pool: &PgPool, room_id: RoomId) -> Result<Vec<Item>, StoreError> {
    info!("{:<12} --> 방 상품 조회 id: {}", "Query", room_id);
    sqlx::query_as::<_, ItemRow>(&queries::get_room_items())
        .bind(room_id.0)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Item::try_from)
        .collect()
}

/// 입찰 이력 조회
pub async fn get_bid_history(pool: &PgPool, item_id: ItemId) -> Result<Vec<Bid>, StoreError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", item_id);
    Ok(sqlx::query_as::<_, BidRow>(queries::GET_BID_HISTORY)
        .bind(item_id.0)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Bid::from)
        .collect())
}

/// 참가자 조회
pub async fn get_participant(
    pool: &PgPool,
    display_name: &str,
) -> Result<Option<Participant>, StoreError> {
    info!("{:<12} --> 참가자 조회: {}", "Query", display_name);
    sqlx::query_as::<_, ParticipantRow>(queries::GET_PARTICIPANT)
        .bind(display_name)
        .fetch_optional(pool)
        .await?
        .map(Participant::try_from)
        .transpose()
}

/// 방 낙찰 기록 조회
pub async fn get_room_win_records(
    pool: &PgPool,
    room_id: RoomId,
) -> Result<Vec<WinRecord>, StoreError> {
    info!("{:<12} --> 방 낙찰 기록 조회 id: {}", "Query", room_id);
    Ok(sqlx::query_as::<_, WinRecordRow>(queries::GET_ROOM_WIN_RECORDS)
        .bind(room_id.0)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(WinRecord::from)
        .collect())
}

/// 입찰자 낙찰 기록 조회
pub async fn get_bidder_win_records(
    pool: &PgPool,
    bidder: &str,
) -> Result<Vec<WinRecord>, StoreError> {
    info!("{:<12} --> 입찰자 낙찰 기록 조회: {}", "Query", bidder);
    Ok(sqlx::query_as::<_, WinRecordRow>(queries::GET_BIDDER_WIN_RECORDS)
        .bind(bidder)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(WinRecord::from)
        .collect())
}

// endregion: --- Query Handlers
