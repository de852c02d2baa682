/// 콜 단계 엔진
/// 0(콜 없음) -> 1(first_call) -> 2(second_call) -> 3(낙찰 트리거)
/// 새 입찰이 들어오면 0으로 돌아가고, 돌아갈 때마다 epoch 가 증가한다.
/// 예약된 낙찰은 epoch 가 같을 때만 실행된다.
// region:    --- Imports
use crate::auction::error::AuctionError;
use crate::auction::model::{Item, ItemStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Call State
pub const FINAL_CALL: u8 = 3;

/// 진행 중인 상품의 콜 상태 (메모리 전용)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallState {
    pub count: u8,
    pub last_call_at: Option<DateTime<Utc>>,
    pub epoch: u64,
}

/// 콜 진행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// 1, 2 단계로 진행
    Escalated { count: u8, status: ItemStatus },
    /// 3 단계 도달. 유예 시간 뒤 낙찰 (epoch 로 식별)
    SaleTriggered { epoch: u64 },
    /// 이미 3 단계. 중복 콜은 무시
    AlreadyFinal { epoch: u64 },
}

impl CallState {
    /// 단계 초기화. 진행 중이던 예약 낙찰은 무효가 된다.
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_call_at = None;
        self.epoch += 1;
    }

    pub fn is_final(&self) -> bool {
        self.count >= FINAL_CALL
    }
}

// endregion: --- Call State

// region:    --- Transitions
/// 콜 단계 상태 값
pub fn status_for_count(count: u8) -> ItemStatus {
    match count {
        0 => ItemStatus::Active,
        1 => ItemStatus::FirstCall,
        _ => ItemStatus::SecondCall,
    }
}

/// 콜 진행
/// 3 단계에서는 상태를 바꾸지 않고 낙찰 트리거만 알린다.
pub fn advance_call(
    item: &mut Item,
    call: &mut CallState,
    now: DateTime<Utc>,
) -> Result<CallOutcome, AuctionError> {
    if !item.status.is_in_play() {
        return Err(AuctionError::NoActiveItem);
    }

    if call.is_final() {
        return Ok(CallOutcome::AlreadyFinal { epoch: call.epoch });
    }

    call.count += 1;
    call.last_call_at = Some(now);

    if call.count == FINAL_CALL {
        return Ok(CallOutcome::SaleTriggered { epoch: call.epoch });
    }

    let status = status_for_count(call.count);
    item.status = status;
    Ok(CallOutcome::Escalated {
        count: call.count,
        status,
    })
}

/// 입찰 수락 시 콜 초기화
pub fn reset_on_bid(item: &mut Item, call: &mut CallState) {
    call.reset();
    item.status = ItemStatus::Active;
}

// endregion: --- Transitions

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{ItemId, RoomId};

    fn active_item() -> Item {
        Item {
            id: ItemId::new(),
            room_id: RoomId::new(),
            name: "item".into(),
            categories: vec![],
            image_ref: None,
            starting_price: 100,
            current_price: 100,
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
    fn escalates_through_three_calls() {
        let mut item = active_item();
        let mut call = CallState::default();
        let now = Utc::now();

        assert_eq!(
            advance_call(&mut item, &mut call, now).unwrap(),
            CallOutcome::Escalated {
                count: 1,
                status: ItemStatus::FirstCall
            }
        );
        assert_eq!(item.status, ItemStatus::FirstCall);

        advance_call(&mut item, &mut call, now).unwrap();
        assert_eq!(item.status, ItemStatus::SecondCall);

        assert_eq!(
            advance_call(&mut item, &mut call, now).unwrap(),
            CallOutcome::SaleTriggered { epoch: 0 }
        );
        assert_eq!(item.status, ItemStatus::SecondCall);
        assert_eq!(call.count, 3);
    }

    #[test]
    fn fourth_call_is_idempotent() {
        let mut item = active_item();
        let mut call = CallState::default();
        for _ in 0..3 {
            advance_call(&mut item, &mut call, Utc::now()).unwrap();
        }
        assert_eq!(
            advance_call(&mut item, &mut call, Utc::now()).unwrap(),
            CallOutcome::AlreadyFinal { epoch: 0 }
        );
        assert_eq!(call.count, 3);
    }

    #[test]
    fn bid_resets_sequence_and_bumps_epoch() {
        let mut item = active_item();
        let mut call = CallState::default();
        advance_call(&mut item, &mut call, Utc::now()).unwrap();

        reset_on_bid(&mut item, &mut call);
        assert_eq!(call.count, 0);
        assert_eq!(call.epoch, 1);
        assert_eq!(item.status, ItemStatus::Active);

        assert_eq!(
            advance_call(&mut item, &mut call, Utc::now()).unwrap(),
            CallOutcome::Escalated {
                count: 1,
                status: ItemStatus::FirstCall
            }
        );
    }

    #[test]
    fn no_call_on_finished_item() {
        let mut item = active_item();
        item.status = ItemStatus::Sold;
        let mut call = CallState::default();
        assert_eq!(
            advance_call(&mut item, &mut call, Utc::now()),
            Err(AuctionError::NoActiveItem)
        );
        assert_eq!(call.count, 0);
    }
}
// endregion: --- Tests
