/// 경매 관련 커맨드 페이로드
/// 1. 방 생성/시작/종료
/// 2. 참가/퇴장
/// 3. 상품 등록/활성화
/// 4. 입찰, 콜, 낙찰
// region:    --- Imports
use crate::auction::error::AuctionError;
use crate::auction::model::{ItemId, NewItem, Role};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Actor
/// 요청을 보낸 주체 (표시 이름 + 역할)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn auctioneer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Auctioneer,
        }
    }

    pub fn bidder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Bidder,
        }
    }

    /// 앞뒤 공백을 뺀 이름. 비어 있으면 거절
    pub fn display_name(&self) -> Result<String, AuctionError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AuctionError::Validation("표시 이름이 비어 있습니다.".into()));
        }
        Ok(name.to_string())
    }

    /// 경매사 전용 동작 권한 확인. 정규화된 이름을 돌려준다.
    pub fn require_auctioneer(&self, action: &str) -> Result<String, AuctionError> {
        let name = self.display_name()?;
        match self.role {
            Role::Auctioneer => Ok(name),
            Role::Bidder => Err(AuctionError::NotAuthorized(format!(
                "{}은(는) 경매사만 할 수 있습니다. (요청자: {})",
                action, self.name
            ))),
        }
    }
}

// endregion: --- Actor

// region:    --- Commands
/// 방 생성 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateRoomCommand {
    pub actor: Actor,
    pub label: String,
    pub bid_increment: i64,
}

/// 경매사 단독 명령 (시작, 종료, 콜, 낙찰, 다음 상품)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActorCommand {
    pub actor: Actor,
}

/// 참가 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JoinRoomCommand {
    pub client_id: String,
    pub display_name: String,
    pub role: Role,
}

/// 퇴장 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LeaveRoomCommand {
    pub display_name: String,
}

/// 상품 등록 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListItemCommand {
    pub actor: Actor,
    pub item: NewItem,
}

/// 상품 활성화 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivateItemCommand {
    pub actor: Actor,
    pub item_id: ItemId,
}

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub bidder: String,
    pub amount: i64,
}

// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidder_cannot_act_as_auctioneer() {
        let err = Actor::bidder("A").require_auctioneer("콜").unwrap_err();
        assert_eq!(err.code(), "NOT_AUTHORIZED");
        assert!(Actor::auctioneer("host").require_auctioneer("콜").is_ok());
    }

    #[test]
    fn auctioneer_name_is_trimmed_and_required() {
        assert_eq!(
            Actor::auctioneer("  host ").require_auctioneer("콜").unwrap(),
            "host"
        );
        let err = Actor::auctioneer("   ").require_auctioneer("콜").unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn actor_deserializes_from_snake_case_role() {
        let actor: Actor =
            serde_json::from_value(serde_json::json!({"name": "host", "role": "auctioneer"}))
                .unwrap();
        assert_eq!(actor, Actor::auctioneer("host"));
    }
}
