// region:    --- Room
/// 방 생성 (insert-if-absent)
pub const INSERT_ROOM: &str = r#"
    INSERT INTO rooms (id, label, bid_increment, auctioneer, status, created_at, ended_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (id) DO NOTHING
"#;

/// 방 조건부 갱신 ($8 = 이전 상태)
pub const UPDATE_ROOM: &str = r#"
    UPDATE rooms
    SET label = $2, bid_increment = $3, auctioneer = $4, status = $5, created_at = $6, ended_at = $7
    WHERE id = $1 AND status = $8
"#;

pub const DELETE_ROOM: &str = "DELETE FROM rooms WHERE id = $1";

pub const GET_ROOM: &str = "SELECT id, label, bid_increment, auctioneer, status, created_at, ended_at FROM rooms WHERE id = $1";

/// 종료되지 않은 방 조회
pub const GET_OPEN_ROOMS: &str = "SELECT id, label, bid_increment, auctioneer, status, created_at, ended_at FROM rooms WHERE status <> 'ended' ORDER BY created_at";

// endregion: --- Room

// region:    --- Item
const ITEM_COLUMNS: &str = "id, room_id, name, categories, image_ref, starting_price, current_price, bid_increment, status, listed_by, last_bidder, winner, winning_amount, position, created_at, sold_at";

/// 상품 등록 (insert-if-absent)
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (id, room_id, name, categories, image_ref, starting_price, current_price, bid_increment, status, listed_by, last_bidder, winner, winning_amount, position, created_at, sold_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
    ON CONFLICT (id) DO NOTHING
"#;

/// 상품 조건부 갱신 ($17 = 이전 상태)
pub const UPDATE_ITEM: &str = r#"
    UPDATE items
    SET room_id = $2, name = $3, categories = $4, image_ref = $5, starting_price = $6, current_price = $7,
        bid_increment = $8, status = $9, listed_by = $10, last_bidder = $11, winner = $12,
        winning_amount = $13, position = $14, created_at = $15, sold_at = $16
    WHERE id = $1 AND status = $17
"#;

pub const DELETE_ITEM: &str = "DELETE FROM items WHERE id = $1";

/// 방 상품 조회 (등록 순)
pub fn get_room_items() -> String {
    format!("SELECT {ITEM_COLUMNS} FROM items WHERE room_id = $1 ORDER BY position, created_at")
}

// endregion: --- Item

// region:    --- Bid
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (id, item_id, room_id, bidder, amount, placed_at)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

pub const DELETE_BID: &str = "DELETE FROM bids WHERE id = $1";

/// 입찰 이력 조회 (시간 순)
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, item_id, room_id, bidder, amount, placed_at
    FROM bids
    WHERE item_id = $1
    ORDER BY placed_at
"#;

// endregion: --- Bid

// region:    --- Participant
pub const UPSERT_PARTICIPANT: &str = r#"
    INSERT INTO participants (display_name, client_id, role, current_room, online)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (display_name) DO UPDATE
    SET client_id = EXCLUDED.client_id, role = EXCLUDED.role,
        current_room = EXCLUDED.current_room, online = EXCLUDED.online
"#;

/// 최초 참가 (이미 있으면 0건)
pub const INSERT_PARTICIPANT: &str = r#"
    INSERT INTO participants (display_name, client_id, role, current_room, online)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (display_name) DO NOTHING
"#;

/// 이전 값 조건부 갱신 ($6~$9 = 이전 client_id, role, current_room, online)
pub const UPDATE_PARTICIPANT: &str = r#"
    UPDATE participants
    SET client_id = $2, role = $3, current_room = $4, online = $5
    WHERE display_name = $1
      AND client_id = $6 AND role = $7
      AND current_room IS NOT DISTINCT FROM $8 AND online = $9
"#;

pub const DELETE_PARTICIPANT: &str = "DELETE FROM participants WHERE display_name = $1";

pub const GET_PARTICIPANT: &str = "SELECT display_name, client_id, role, current_room, online FROM participants WHERE display_name = $1";

// endregion: --- Participant

// region:    --- Win Record
/// 낙찰 기록 (상품 id 기준 1회)
pub const INSERT_WIN_RECORD: &str = r#"
    INSERT INTO win_records (item_id, room_id, item_name, winner, amount, won_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (item_id) DO NOTHING
"#;

pub const DELETE_WIN_RECORD: &str = "DELETE FROM win_records WHERE item_id = $1";

pub const GET_ROOM_WIN_RECORDS: &str = "SELECT item_id, room_id, item_name, winner, amount, won_at FROM win_records WHERE room_id = $1 ORDER BY won_at";

pub const GET_BIDDER_WIN_RECORDS: &str = "SELECT item_id, room_id, item_name, winner, amount, won_at FROM win_records WHERE winner = $1 ORDER BY won_at";

// endregion: --- Win Record
