// region:    --- Imports
use super::error::AuctionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Ids
macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(RoomId);
id_type!(ItemId);
id_type!(BidId);

// endregion: --- Ids

// region:    --- Status
/// 경매방 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Lobby,
    Active,
    Ended,
}

/// 상품 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Active,
    FirstCall,
    SecondCall,
    Sold,
    Cancelled,
}

impl ItemStatus {
    /// 진행 중(active, first_call, second_call)인 상태인지 여부
    pub fn is_in_play(self) -> bool {
        matches!(self, Self::Active | Self::FirstCall | Self::SecondCall)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sold | Self::Cancelled)
    }
}

/// 참가자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Auctioneer,
    Bidder,
}

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("알 수 없는 {} 값: {}", stringify!($name), other)),
                }
            }
        }
    };
}

text_enum!(RoomStatus {
    Lobby => "lobby",
    Active => "active",
    Ended => "ended",
});

text_enum!(ItemStatus {
    Pending => "pending",
    Active => "active",
    FirstCall => "first_call",
    SecondCall => "second_call",
    Sold => "sold",
    Cancelled => "cancelled",
});

text_enum!(Role {
    Auctioneer => "auctioneer",
    Bidder => "bidder",
});

// endregion: --- Status

// region:    --- Entities
/// 경매방
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub label: String,
    /// 방 기본 입찰 단위
    pub bid_increment: i64,
    pub auctioneer: String,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// 경매 상품
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub room_id: RoomId,
    pub name: String,
    pub categories: Vec<String>,
    pub image_ref: Option<String>,
    pub starting_price: i64,
    pub current_price: i64,
    /// 상품별 입찰 단위 (없으면 방 기본값)
    pub bid_increment: Option<i64>,
    pub status: ItemStatus,
    pub listed_by: String,
    pub last_bidder: Option<String>,
    pub winner: Option<String>,
    pub winning_amount: Option<i64>,
    /// 방 안에서의 등록 순번 (FIFO 대기열 순서)
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub sold_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn has_bids(&self) -> bool {
        self.winner.is_some() && self.winning_amount.is_some()
    }
}

/// 입찰 기록 (추가만 가능)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub item_id: ItemId,
    pub room_id: RoomId,
    pub bidder: String,
    pub amount: i64,
    pub placed_at: DateTime<Utc>,
}

/// 참가자
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub client_id: String,
    pub display_name: String,
    pub role: Role,
    pub current_room: Option<RoomId>,
    pub online: bool,
}

/// 낙찰 기록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRecord {
    pub room_id: RoomId,
    pub item_id: ItemId,
    pub item_name: String,
    pub winner: String,
    pub amount: i64,
    pub won_at: DateTime<Utc>,
}

// endregion: --- Entities

// region:    --- Inputs
/// 상품 등록 입력
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub starting_price: i64,
    #[serde(default)]
    pub bid_increment: Option<i64>,
}

impl NewItem {
    /// 상태를 건드리기 전에 입력값 검증
    pub fn validate(&self) -> Result<(), AuctionError> {
        if self.name.trim().is_empty() {
            return Err(AuctionError::Validation("상품 이름이 비어 있습니다.".into()));
        }
        if self.starting_price <= 0 {
            return Err(AuctionError::Validation(
                "시작 가격은 0보다 커야 합니다.".into(),
            ));
        }
        if matches!(self.bid_increment, Some(inc) if inc <= 0) {
            return Err(AuctionError::Validation(
                "입찰 단위는 0보다 커야 합니다.".into(),
            ));
        }
        Ok(())
    }

    pub fn into_item(
        self,
        room_id: RoomId,
        listed_by: String,
        position: i64,
        now: DateTime<Utc>,
    ) -> Item {
        Item {
            id: ItemId::new(),
            room_id,
            name: self.name.trim().to_string(),
            categories: self.categories,
            image_ref: self.image_ref,
            starting_price: self.starting_price,
            current_price: self.starting_price,
            bid_increment: self.bid_increment,
            status: ItemStatus::Pending,
            listed_by,
            last_bidder: None,
            winner: None,
            winning_amount: None,
            position,
            created_at: now,
            sold_at: None,
        }
    }
}

/// 방 생성 입력 검증
pub fn validate_room_input(label: &str, bid_increment: i64) -> Result<(), AuctionError> {
    if label.trim().is_empty() {
        return Err(AuctionError::Validation("방 이름이 비어 있습니다.".into()));
    }
    if bid_increment <= 0 {
        return Err(AuctionError::Validation(
            "입찰 단위는 0보다 커야 합니다.".into(),
        ));
    }
    Ok(())
}

// endregion: --- Inputs

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_round_trips_through_from_str() {
        for status in [
            ItemStatus::Pending,
            ItemStatus::FirstCall,
            ItemStatus::SecondCall,
            ItemStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ItemStatus>().unwrap(), status);
        }
        assert!("closed".parse::<RoomStatus>().is_err());
    }

    #[test]
    fn in_play_statuses() {
        assert!(ItemStatus::Active.is_in_play());
        assert!(ItemStatus::SecondCall.is_in_play());
        assert!(!ItemStatus::Pending.is_in_play());
        assert!(!ItemStatus::Sold.is_in_play());
    }

    #[test]
    fn new_item_rejects_bad_input() {
        let mut input = NewItem {
            name: "  ".into(),
            categories: vec![],
            image_ref: None,
            starting_price: 100,
            bid_increment: None,
        };
        assert_eq!(input.validate().unwrap_err().code(), "VALIDATION");

        input.name = "Son".into();
        input.starting_price = 0;
        assert!(input.validate().is_err());

        input.starting_price = 100;
        input.bid_increment = Some(-5);
        assert!(input.validate().is_err());

        input.bid_increment = Some(5);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn room_input_requires_label_and_positive_increment() {
        assert!(validate_room_input("", 10).is_err());
        assert!(validate_room_input("Draft", 0).is_err());
        assert!(validate_room_input("Draft", 10).is_ok());
    }
}
// endregion: --- Tests
