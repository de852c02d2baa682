/// 입찰 검증기
/// 현재 상품/방 상태만 보고 입찰 허용 여부를 판단하는 순수 함수 모음. I/O 없음.
// region:    --- Imports
use crate::auction::error::AuctionError;
use crate::auction::model::{Item, Room};

// endregion: --- Imports

// region:    --- Rejection
/// 입찰 거절 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidRejection {
    ItemNotBiddable,
    SelfOutbid,
    AuctioneerCannotBid,
    BelowMinimum { min_required: i64 },
}

impl BidRejection {
    pub fn into_error(self, item: &Item) -> AuctionError {
        match self {
            Self::ItemNotBiddable => AuctionError::ItemNotBiddable(item.status.to_string()),
            Self::SelfOutbid => AuctionError::SelfOutbid,
            Self::AuctioneerCannotBid => AuctionError::AuctioneerCannotBid,
            Self::BelowMinimum { min_required } => AuctionError::BelowMinimum { min_required },
        }
    }
}

// endregion: --- Rejection

// region:    --- Validation
/// 상품 입찰 단위 (상품 지정값이 없으면 방 기본값)
pub fn effective_increment(item: &Item, room: &Room) -> i64 {
    item.bid_increment.unwrap_or(room.bid_increment)
}

/// 다음 입찰의 최소 허용 금액
pub fn min_acceptable(item: &Item, room: &Room) -> i64 {
    item.current_price.saturating_add(effective_increment(item, room))
}

/// 입찰 검증
/// 1. 입찰 가능한 상태인지 (active 및 콜 진행 중)
/// 2. 현재 최고 입찰자가 아닌지
/// 3. 상품을 등록한 경매사가 아닌지
/// 4. 최소 금액 이상인지
pub fn validate_bid(item: &Item, room: &Room, amount: i64, bidder: &str) -> Result<(), BidRejection> {
    if !item.status.is_in_play() {
        return Err(BidRejection::ItemNotBiddable);
    }

    if item.last_bidder.as_deref() == Some(bidder) {
        return Err(BidRejection::SelfOutbid);
    }

    if item.listed_by == bidder {
        return Err(BidRejection::AuctioneerCannotBid);
    }

    let min_required = min_acceptable(item, room);
    if amount < min_required {
        return Err(BidRejection::BelowMinimum { min_required });
    }

    Ok(())
}

// endregion: --- Validation

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{ItemId, ItemStatus, RoomId, RoomStatus};
    use chrono::Utc;

    fn room(increment: i64) -> Room {
        Room {
            id: RoomId::new(),
            label: "room".into(),
            bid_increment: increment,
            auctioneer: "host".into(),
            status: RoomStatus::Active,
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    fn item(room: &Room, price: i64) -> Item {
        Item {
            id: ItemId::new(),
            room_id: room.id,
            name: "item".into(),
            categories: vec![],
            image_ref: None,
            starting_price: price,
            current_price: price,
            bid_increment: None,
            status: ItemStatus::Active,
            listed_by: "host".into(),
            last_bidder: None,
            winner: None,
            winning_amount: None,
            position: 0,
            created_at: Utc::now(),
            sold_at: None,
        }
    }

    #[test]
    fn accepts_bid_at_exact_minimum() {
        let room = room(10);
        let item = item(&room, 100);
        assert_eq!(min_acceptable(&item, &room), 110);
        assert_eq!(validate_bid(&item, &room, 110, "A"), Ok(()));
    }

    #[test]
    fn rejects_below_minimum_with_required_amount() {
        let room = room(10);
        let item = item(&room, 110);
        assert_eq!(
            validate_bid(&item, &room, 115, "B"),
            Err(BidRejection::BelowMinimum { min_required: 120 })
        );
    }

    #[test]
    fn item_override_wins_over_room_increment() {
        let room = room(10);
        let mut item = item(&room, 100);
        item.bid_increment = Some(50);
        assert_eq!(effective_increment(&item, &room), 50);
        assert!(validate_bid(&item, &room, 120, "A").is_err());
        assert!(validate_bid(&item, &room, 150, "A").is_ok());
    }

    #[test]
    fn leading_bidder_is_rejected_regardless_of_amount() {
        let room = room(10);
        let mut item = item(&room, 110);
        item.last_bidder = Some("A".into());
        for amount in [0, 120, 1_000_000] {
            assert_eq!(
                validate_bid(&item, &room, amount, "A"),
                Err(BidRejection::SelfOutbid)
            );
        }
    }

    #[test]
    fn listing_auctioneer_cannot_bid() {
        let room = room(10);
        let item = item(&room, 100);
        assert_eq!(
            validate_bid(&item, &room, 500, "host"),
            Err(BidRejection::AuctioneerCannotBid)
        );
    }

    #[test]
    fn bids_allowed_during_calls_but_not_after() {
        let room = room(10);
        let mut item = item(&room, 100);
        item.status = ItemStatus::SecondCall;
        assert!(validate_bid(&item, &room, 110, "A").is_ok());

        for status in [ItemStatus::Pending, ItemStatus::Sold, ItemStatus::Cancelled] {
            item.status = status;
            assert_eq!(
                validate_bid(&item, &room, 110, "A"),
                Err(BidRejection::ItemNotBiddable)
            );
        }
    }

    #[test]
    fn status_check_comes_before_self_outbid() {
        let room = room(10);
        let mut item = item(&room, 100);
        item.status = ItemStatus::Sold;
        item.last_bidder = Some("A".into());
        assert_eq!(
            validate_bid(&item, &room, 500, "A"),
            Err(BidRejection::ItemNotBiddable)
        );
    }
}
// endregion: --- Tests
