/// 경매 진행 컨트롤러
/// 방/상품 상태 전이, 입찰, 콜, 낙찰을 방 단위 잠금 안에서 처리한다.
/// 1. 메모리 상태를 먼저 바꾸고 스냅샷을 공개한다.
/// 2. 저장소 반영 -> 알림 발행 순서로 확정한다.
/// 3. 어느 단계든 실패하면 메모리(와 저장소)를 되돌리고 실패를 보고한다.
// region:    --- Imports
use crate::auction::error::{AuctionError, AuctionResult};
use crate::auction::events::AuctionEvent;
use crate::auction::model::{
    validate_room_input, Bid, BidId, Item, ItemId, ItemStatus, NewItem, Participant, Room,
    RoomId, RoomStatus, WinRecord,
};
use crate::bidding::commands::{Actor, JoinRoomCommand};
use crate::bidding::validator::validate_bid;
use crate::calling::{self, CallOutcome};
use crate::event_store::{AuctionStore, Change, Changeset};
use crate::notifier::Notifier;
use crate::registry::{RoomRegistry, RoomSlot, RoomSnapshot, RoomState};
use crate::scheduler::SaleScheduler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Types
/// 콜 진행 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallReport {
    pub item_id: ItemId,
    pub call_count: u8,
    pub status: ItemStatus,
    /// 유예 시간 뒤 낙찰 예정 여부
    pub sale_pending: bool,
}

/// 낙찰 기록 조회 조건
#[derive(Debug, Clone)]
pub enum WinRecordFilter {
    Room(RoomId),
    Bidder(String),
}

enum TimerAction {
    Schedule { item_id: ItemId, epoch: u64 },
    Cancel(ItemId),
}

/// 한 번의 상태 전이에서 쌓이는 부수 효과
/// 방/상품 변경분은 전이 전후 상태를 비교해 자동으로 만든다.
#[derive(Default)]
struct Transition {
    bids: Vec<Bid>,
    wins: Vec<WinRecord>,
    participants: Vec<Change<Participant>>,
    events: Vec<AuctionEvent>,
    timer: Option<TimerAction>,
}

impl Transition {
    fn emit(&mut self, event: AuctionEvent) {
        self.events.push(event);
    }

    fn into_changeset(
        self,
        before: &RoomState,
        after: &RoomState,
    ) -> (Changeset, Vec<AuctionEvent>, Option<TimerAction>) {
        let mut changes = Changeset {
            participants: self.participants,
            bids: self.bids,
            wins: self.wins,
            ..Default::default()
        };
        changes.room(Some(&before.room), &after.room);
        for item in &after.items {
            changes.item(before.item(&item.id), item);
        }
        (changes, self.events, self.timer)
    }
}

// endregion: --- Types

// region:    --- Controller
struct Inner {
    registry: RoomRegistry,
    store: Arc<dyn AuctionStore>,
    notifier: Arc<dyn Notifier>,
    scheduler: SaleScheduler,
    sale_grace: Duration,
}

#[derive(Clone)]
pub struct AuctionController {
    inner: Arc<Inner>,
}

impl AuctionController {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        notifier: Arc<dyn Notifier>,
        sale_grace: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RoomRegistry::new(),
                store,
                notifier,
                scheduler: SaleScheduler::new(),
                sale_grace,
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn scheduler(&self) -> &SaleScheduler {
        &self.inner.scheduler
    }

    /// 저장소의 진행 중인 방을 레지스트리로 복원
    /// 콜 상태는 저장되지 않으므로 콜 진행 중이던 상품은 active 로 돌린다.
    pub async fn restore(&self) -> AuctionResult<usize> {
        let rooms = self.inner.store.load_open_rooms().await?;
        let mut restored = 0;

        for (room, items) in rooms {
            if self.inner.registry.contains(&room.id) {
                continue;
            }
            let mut state = RoomState::new(room);
            state.items = items;
            let before = state.clone();

            if let Some(item) = state.items.iter_mut().find(|item| item.status.is_in_play()) {
                item.status = ItemStatus::Active;
                state.current = Some(item.id);
            }

            let (changes, _, _) = Transition::default().into_changeset(&before, &state);
            self.inner.store.apply(&changes).await?;
            self.inner.registry.create(state);
            restored += 1;
        }

        info!("{:<12} --> 경매방 {}개 복원", "Controller", restored);
        Ok(restored)
    }

    // region:    --- Room Commands

    /// 방 생성 (경매사 전용)
    pub async fn create_room(
        &self,
        actor: &Actor,
        label: &str,
        bid_increment: i64,
    ) -> AuctionResult<Room> {
        let auctioneer = actor.require_auctioneer("방 생성")?;
        validate_room_input(label, bid_increment)?;

        let now = Utc::now();
        let room = Room {
            id: RoomId::new(),
            label: label.trim().to_string(),
            bid_increment,
            auctioneer,
            status: RoomStatus::Lobby,
            created_at: now,
            ended_at: None,
        };

        let mut changes = Changeset::default();
        changes.room(None, &room);
        let events = vec![room_status_event(&room, None, now)];
        // 등록 전이므로 다른 요청이 볼 수 없다. 확정된 뒤에만 레지스트리에 넣는다.
        let controller = self.clone();
        let registered = room.clone();
        detached(async move {
            controller.commit(&changes, &events).await?;
            controller.inner.registry.create(RoomState::new(registered));
            Ok(())
        })
        .await?;

        info!(
            "{:<12} --> 방 생성: id={}, label={}, 입찰 단위={}",
            "Controller", room.id, room.label, room.bid_increment
        );
        Ok(room)
    }

    /// 방 시작 (lobby -> active)
    pub async fn start_room(&self, room_id: RoomId, actor: &Actor) -> AuctionResult<Room> {
        actor.require_auctioneer("방 시작")?;
        self.mutate(room_id, |state, tx| {
            if state.room.status == RoomStatus::Lobby {
                let now = Utc::now();
                state.room.status = RoomStatus::Active;
                tx.emit(room_status_event(&state.room, None, now));
            }
            Ok(state.room.clone())
        })
        .await
    }

    /// 방 종료 (되돌릴 수 없음)
    /// 진행 중인 상품은 취소되고 예약된 낙찰도 함께 취소된다.
    pub async fn end_room(&self, room_id: RoomId, actor: &Actor) -> AuctionResult<Room> {
        actor.require_auctioneer("방 종료")?;
        let room = self
            .mutate(room_id, |state, tx| {
                let now = Utc::now();
                state.room.status = RoomStatus::Ended;
                state.room.ended_at = Some(now);

                for item in state.items.iter_mut().filter(|item| !item.status.is_terminal()) {
                    let was_in_play = item.status.is_in_play();
                    item.status = ItemStatus::Cancelled;
                    if was_in_play {
                        tx.timer = Some(TimerAction::Cancel(item.id));
                        tx.emit(AuctionEvent::AuctionNotification {
                            room_id: state.room.id,
                            item_id: item.id,
                            message: format!("경매 종료로 '{}' 경매가 취소되었습니다.", item.name),
                            status: ItemStatus::Cancelled,
                            timestamp: now,
                        });
                    }
                }
                state.call.reset();
                tx.emit(room_status_event(&state.room, None, now));
                Ok(state.room.clone())
            })
            .await?;

        self.inner.registry.remove(&room_id);
        info!("{:<12} --> 방 종료: id={}", "Controller", room_id);
        Ok(room)
    }

    /// 방 참가
    pub async fn join_room(
        &self,
        room_id: RoomId,
        cmd: JoinRoomCommand,
    ) -> AuctionResult<Participant> {
        let display_name = cmd.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AuctionError::Validation("표시 이름이 비어 있습니다.".into()));
        }

        // 저장된 현재 방이 기준. 다른 방에 있으면 먼저 그 방에서 내보낸다.
        let previous = self.inner.store.find_participant(&display_name).await?;
        if let Some(old_room) = previous
            .as_ref()
            .and_then(|participant| participant.current_room)
            .filter(|old_room| *old_room != room_id)
        {
            match self.leave_room(old_room, &display_name).await {
                Ok(()) | Err(AuctionError::RoomEnded(_)) | Err(AuctionError::RoomNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        // 퇴장으로 바뀌었을 수 있으므로 다시 읽는다. 이후 변경은 저장소에서 이 값을 조건으로 검사한다.
        let previous = self.inner.store.find_participant(&display_name).await?;

        self.mutate(room_id, move |state, tx| {
            let participant = Participant {
                client_id: cmd.client_id,
                display_name: display_name.clone(),
                role: cmd.role,
                current_room: Some(state.room.id),
                online: true,
            };
            tx.participants.push(Change {
                before: previous,
                after: participant.clone(),
            });
            state.roster.insert(display_name, participant.clone());
            tx.emit(AuctionEvent::ParticipantJoined {
                room_id: state.room.id,
                participant: participant.clone(),
                timestamp: Utc::now(),
            });
            Ok(participant)
        })
        .await
    }

    /// 방 퇴장 (참가자가 아니면 아무 일도 없음)
    pub async fn leave_room(&self, room_id: RoomId, display_name: &str) -> AuctionResult<()> {
        let display_name = display_name.trim().to_string();
        self.mutate(room_id, move |state, tx| {
            let Some(participant) = state.roster.remove(&display_name) else {
                return Ok(());
            };
            let after = Participant {
                current_room: None,
                online: false,
                ..participant.clone()
            };
            tx.participants.push(Change {
                before: Some(participant),
                after,
            });
            tx.emit(AuctionEvent::ParticipantLeft {
                room_id: state.room.id,
                display_name,
                timestamp: Utc::now(),
            });
            Ok(())
        })
        .await
    }

    // endregion: --- Room Commands

    // region:    --- Item Commands

    /// 상품 등록 (대기열 맨 뒤)
    pub async fn list_item(
        &self,
        room_id: RoomId,
        actor: &Actor,
        new_item: NewItem,
    ) -> AuctionResult<Item> {
        let listed_by = actor.require_auctioneer("상품 등록")?;
        new_item.validate()?;

        self.mutate(room_id, move |state, tx| {
            let now = Utc::now();
            let position = state.next_position();
            let item = new_item.into_item(state.room.id, listed_by, position, now);
            state.items.push(item.clone());
            tx.emit(room_status_event(&state.room, Some(&item), now));
            Ok(item)
        })
        .await
    }

    /// 상품 활성화 (pending -> active)
    pub async fn activate_item(
        &self,
        room_id: RoomId,
        actor: &Actor,
        item_id: ItemId,
    ) -> AuctionResult<Item> {
        actor.require_auctioneer("상품 활성화")?;
        self.mutate(room_id, move |state, tx| activate(state, tx, item_id))
            .await
    }

    /// 대기열의 다음 상품 활성화
    pub async fn next_item(&self, room_id: RoomId, actor: &Actor) -> AuctionResult<Item> {
        actor.require_auctioneer("다음 상품")?;
        self.mutate(room_id, |state, tx| {
            if let Some(active) = state.in_play_item() {
                return Err(AuctionError::ItemAlreadyActive(active.id));
            }
            let next = state.next_pending().ok_or(AuctionError::QueueEmpty)?.id;
            activate(state, tx, next)
        })
        .await
    }

    // endregion: --- Item Commands

    // region:    --- Bidding Commands

    /// 입찰
    pub async fn place_bid(&self, room_id: RoomId, bidder: &str, amount: i64) -> AuctionResult<Item> {
        let bidder = bidder.trim().to_string();
        if bidder.is_empty() {
            return Err(AuctionError::Validation("입찰자 이름이 비어 있습니다.".into()));
        }

        let item = self
            .mutate(room_id, move |state, tx| {
                let now = Utc::now();
                let current = state.current.ok_or(AuctionError::NoActiveItem)?;
                let RoomState {
                    room, items, call, ..
                } = state;
                let item = items
                    .iter_mut()
                    .find(|item| item.id == current)
                    .ok_or(AuctionError::ItemNotFound(current))?;

                validate_bid(item, room, amount, &bidder).map_err(|reason| reason.into_error(item))?;

                let was_calling = call.count > 0;
                item.current_price = amount;
                item.last_bidder = Some(bidder.clone());
                item.winner = Some(bidder.clone());
                item.winning_amount = Some(amount);
                calling::reset_on_bid(item, call);

                tx.bids.push(Bid {
                    id: BidId::new(),
                    item_id: item.id,
                    room_id: room.id,
                    bidder: bidder.clone(),
                    amount,
                    placed_at: now,
                });
                tx.timer = Some(TimerAction::Cancel(item.id));
                tx.emit(AuctionEvent::BidPlaced {
                    room_id: room.id,
                    item_id: item.id,
                    bidder,
                    amount,
                    timestamp: now,
                });
                if was_calling {
                    tx.emit(call_event(room.id, item, 0, now));
                }
                Ok(item.clone())
            })
            .await?;

        info!(
            "{:<12} --> 입찰 수락: item={}, bidder={:?}, amount={}",
            "Controller", item.id, item.last_bidder, item.current_price
        );
        Ok(item)
    }

    /// 콜 진행 (경매사 전용)
    pub async fn advance_call(&self, room_id: RoomId, actor: &Actor) -> AuctionResult<CallReport> {
        actor.require_auctioneer("콜")?;
        let scheduler = self.inner.scheduler.clone();
        let outcome = self
            .mutate(room_id, move |state, tx| {
                let now = Utc::now();
                let room_id = state.room.id;
                let current = state.current.ok_or(AuctionError::NoActiveItem)?;
                let RoomState { items, call, .. } = state;
                let item = items
                    .iter_mut()
                    .find(|item| item.id == current)
                    .ok_or(AuctionError::NoActiveItem)?;

                match calling::advance_call(item, call, now)? {
                    CallOutcome::Escalated { count, status } => {
                        tx.emit(call_event(room_id, item, count, now));
                        Ok(Ok(CallReport {
                            item_id: item.id,
                            call_count: count,
                            status,
                            sale_pending: false,
                        }))
                    }
                    CallOutcome::SaleTriggered { epoch } => {
                        if !item.has_bids() {
                            // 입찰이 없으면 낙찰하지 않고 콜만 처음으로
                            call.reset();
                            tx.emit(call_event(room_id, item, 0, now));
                            return Ok(Err(AuctionError::NoBidsToSell));
                        }
                        tx.timer = Some(TimerAction::Schedule {
                            item_id: item.id,
                            epoch,
                        });
                        tx.emit(call_event(room_id, item, calling::FINAL_CALL, now));
                        Ok(Ok(CallReport {
                            item_id: item.id,
                            call_count: calling::FINAL_CALL,
                            status: item.status,
                            sale_pending: true,
                        }))
                    }
                    CallOutcome::AlreadyFinal { epoch } => {
                        // 예약이 사라졌으면(낙찰 실패 후 등) 같은 epoch 로 다시 건다
                        if !scheduler.is_pending(&item.id) {
                            tx.timer = Some(TimerAction::Schedule {
                                item_id: item.id,
                                epoch,
                            });
                        }
                        Ok(Ok(CallReport {
                            item_id: item.id,
                            call_count: call.count,
                            status: item.status,
                            sale_pending: true,
                        }))
                    }
                }
            })
            .await?;
        outcome
    }

    /// 즉시 낙찰 (경매사 전용)
    pub async fn sell_item(&self, room_id: RoomId, actor: &Actor) -> AuctionResult<WinRecord> {
        actor.require_auctioneer("낙찰")?;
        let outcome = self.mutate(room_id, |state, tx| Ok(finalize_sale(state, tx))).await?;
        if let Ok(win) = &outcome {
            info!(
                "{:<12} --> 낙찰: item={}, winner={}, amount={}",
                "Controller", win.item_id, win.winner, win.amount
            );
        }
        outcome
    }

    /// 유예 시간이 지난 예약 낙찰 실행
    /// 예약 이후 상품이 바뀌었거나 콜이 초기화됐으면(epoch 불일치) 아무 것도 하지 않는다.
    async fn finalize_due_sale(&self, room_id: RoomId, item_id: ItemId, epoch: u64) {
        let result = self
            .mutate(room_id, move |state, tx| {
                let still_due = state.current == Some(item_id)
                    && state.call.epoch == epoch
                    && state.call.is_final()
                    && state
                        .current_item()
                        .is_some_and(|item| item.status.is_in_play());
                if !still_due {
                    return Ok(None);
                }
                Ok(Some(finalize_sale(state, tx)))
            })
            .await;

        match result {
            Ok(Some(Ok(win))) => info!(
                "{:<12} --> 예약 낙찰: item={}, winner={}, amount={}",
                "Controller", win.item_id, win.winner, win.amount
            ),
            Ok(Some(Err(e))) => warn!(
                "{:<12} --> 예약 낙찰 거절: item={}, {} ({})",
                "Controller",
                item_id,
                e,
                e.code()
            ),
            Ok(None) => info!(
                "{:<12} --> 지난 예약 낙찰 무시: item={}, epoch={}",
                "Controller", item_id, epoch
            ),
            Err(e) if e.is_transient() => {
                warn!(
                    "{:<12} --> 예약 낙찰 실패, 재예약: item={}, {} ({})",
                    "Controller",
                    item_id,
                    e,
                    e.code()
                );
                // 전이는 되돌려졌으므로 epoch 는 그대로 유효하다
                self.apply_timer(room_id, TimerAction::Schedule { item_id, epoch });
            }
            Err(e) => error!(
                "{:<12} --> 예약 낙찰 실패: item={}, {} ({})",
                "Controller",
                item_id,
                e,
                e.code()
            ),
        }
    }

    // endregion: --- Bidding Commands

    // region:    --- Queries

    /// 현재 상품/콜/참가자 스냅샷 (잠금 없이 조회)
    pub async fn get_item_state(&self, room_id: RoomId) -> AuctionResult<Arc<RoomSnapshot>> {
        Ok(self.slot(room_id).await?.snapshot())
    }

    /// 방 상품 목록 (등록 순)
    pub async fn list_items(&self, room_id: RoomId) -> AuctionResult<Vec<Item>> {
        self.slot(room_id).await?;
        Ok(self.inner.store.items_in_room(room_id).await?)
    }

    /// 입찰 이력 (시간 순)
    pub async fn get_bid_history(&self, item_id: ItemId) -> AuctionResult<Vec<Bid>> {
        Ok(self.inner.store.bids_for_item(item_id).await?)
    }

    /// 낙찰 기록
    pub async fn get_win_records(&self, filter: WinRecordFilter) -> AuctionResult<Vec<WinRecord>> {
        let records = match filter {
            WinRecordFilter::Room(room_id) => self.inner.store.win_records_for_room(room_id).await?,
            WinRecordFilter::Bidder(bidder) => {
                self.inner.store.win_records_for_bidder(bidder.trim()).await?
            }
        };
        Ok(records)
    }

    // endregion: --- Queries

    // region:    --- Internals

    async fn slot(&self, room_id: RoomId) -> AuctionResult<Arc<RoomSlot>> {
        if let Some(slot) = self.inner.registry.get(&room_id) {
            return Ok(slot);
        }
        match self.inner.store.find_room(room_id).await? {
            Some(room) if room.status == RoomStatus::Ended => Err(AuctionError::RoomEnded(room_id)),
            _ => Err(AuctionError::RoomNotFound(room_id)),
        }
    }

    /// 방 잠금 안에서 상태 전이 실행
    /// 전이는 별도 태스크에서 끝까지 진행된다. 호출자가 응답을 기다리다 버려져도
    /// 메모리와 저장소가 어긋나지 않는다.
    async fn mutate<T, F>(&self, room_id: RoomId, f: F) -> AuctionResult<T>
    where
        F: FnOnce(&mut RoomState, &mut Transition) -> AuctionResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let controller = self.clone();
        detached(async move { controller.transition(room_id, f).await }).await
    }

    async fn transition<T, F>(&self, room_id: RoomId, f: F) -> AuctionResult<T>
    where
        F: FnOnce(&mut RoomState, &mut Transition) -> AuctionResult<T> + Send,
        T: Send,
    {
        let slot = self.slot(room_id).await?;
        let mut state = slot.lock().await;
        if state.room.status == RoomStatus::Ended {
            return Err(AuctionError::RoomEnded(room_id));
        }

        let before = state.clone();
        let mut tx = Transition::default();
        let output = match f(&mut *state, &mut tx) {
            Ok(output) => output,
            Err(e) => {
                *state = before;
                return Err(e);
            }
        };

        // 확정 전에 공개해 뒤이은 요청이 전이 후 상태를 보게 한다
        slot.publish(&state);
        let (changes, events, timer) = tx.into_changeset(&before, &state);
        if let Err(e) = self.commit(&changes, &events).await {
            *state = before;
            slot.publish(&state);
            return Err(e);
        }

        if let Some(timer) = timer {
            self.apply_timer(room_id, timer);
        }
        Ok(output)
    }

    /// 저장소 반영 후 알림 발행. 알림 실패 시 저장소를 되돌린다.
    /// 실패 전에 이미 나간 이벤트는 회수하지 않는다 (at-least-once). 구독자는 이벤트를
    /// 힌트로 취급하고 권위 있는 상태는 조회로 다시 읽어야 한다.
    async fn commit(&self, changes: &Changeset, events: &[AuctionEvent]) -> AuctionResult<()> {
        if let Err(e) = self.inner.store.apply(changes).await {
            warn!("{:<12} --> 저장소 반영 실패: {}", "Controller", e);
            return Err(e.into());
        }

        for event in events {
            if let Err(e) = self.inner.notifier.publish(event).await {
                warn!(
                    "{:<12} --> {} 알림 실패, 변경분 되돌림: {}",
                    "Controller",
                    event.kind(),
                    e
                );
                if let Err(revert_err) = self.inner.store.revert(changes).await {
                    error!(
                        "{:<12} --> 저장소 되돌리기 실패: {}",
                        "Controller", revert_err
                    );
                }
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn apply_timer(&self, room_id: RoomId, timer: TimerAction) {
        match timer {
            TimerAction::Schedule { item_id, epoch } => {
                let controller = self.clone();
                self.inner.scheduler.schedule(
                    item_id,
                    epoch,
                    self.inner.sale_grace,
                    async move {
                        controller.finalize_due_sale(room_id, item_id, epoch).await;
                    },
                );
            }
            TimerAction::Cancel(item_id) => {
                self.inner.scheduler.cancel(&item_id);
            }
        }
    }

    // endregion: --- Internals
}

// endregion: --- Controller

// region:    --- Transitions
/// 호출자 future 와 분리된 태스크에서 끝까지 실행
async fn detached<T, Fut>(fut: Fut) -> AuctionResult<T>
where
    Fut: Future<Output = AuctionResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut).await.map_err(|e| {
        error!("{:<12} --> 전이 태스크 중단: {}", "Controller", e);
        AuctionError::PersistenceFailed(format!("전이 태스크 중단: {}", e))
    })?
}

/// 상품 활성화 공통 처리
fn activate(state: &mut RoomState, tx: &mut Transition, item_id: ItemId) -> AuctionResult<Item> {
    if let Some(active) = state.in_play_item() {
        return Err(AuctionError::ItemAlreadyActive(active.id));
    }

    let now = Utc::now();
    if state.room.status == RoomStatus::Lobby {
        state.room.status = RoomStatus::Active;
        tx.emit(room_status_event(&state.room, None, now));
    }

    let item = state
        .item_mut(&item_id)
        .ok_or(AuctionError::ItemNotFound(item_id))?;
    match item.status {
        ItemStatus::Pending => {}
        ItemStatus::Sold => return Err(AuctionError::AlreadySold(item_id)),
        other => {
            return Err(AuctionError::InvalidTransition(format!(
                "{} 상태의 상품은 활성화할 수 없습니다.",
                other
            )))
        }
    }
    item.status = ItemStatus::Active;
    let item = item.clone();

    state.current = Some(item_id);
    state.call.reset();
    tx.emit(room_status_event(&state.room, Some(&item), now));
    info!(
        "{:<12} --> 상품 활성화: room={}, item={}",
        "Controller", state.room.id, item_id
    );
    Ok(item)
}

/// 낙찰 확정 공통 처리
/// 입찰이 없으면 상태는 그대로 두고 콜만 초기화한다.
fn finalize_sale(state: &mut RoomState, tx: &mut Transition) -> AuctionResult<WinRecord> {
    let now = Utc::now();
    let room_id = state.room.id;
    let room_status = state.room.status;
    let item_id = state.current.ok_or(AuctionError::NoActiveItem)?;
    let RoomState { items, call, .. } = state;
    let item = items
        .iter_mut()
        .find(|item| item.id == item_id)
        .ok_or(AuctionError::NoActiveItem)?;

    match item.status {
        ItemStatus::Sold => return Err(AuctionError::AlreadySold(item_id)),
        status if !status.is_in_play() => return Err(AuctionError::NoActiveItem),
        _ => {}
    }

    let (Some(winner), Some(amount)) = (item.winner.clone(), item.winning_amount) else {
        call.reset();
        tx.timer = Some(TimerAction::Cancel(item_id));
        return Err(AuctionError::NoBidsToSell);
    };

    item.status = ItemStatus::Sold;
    item.sold_at = Some(now);
    call.reset();

    let win = WinRecord {
        room_id,
        item_id,
        item_name: item.name.clone(),
        winner: winner.clone(),
        amount,
        won_at: now,
    };
    tx.wins.push(win.clone());
    tx.timer = Some(TimerAction::Cancel(item_id));
    tx.emit(AuctionEvent::AuctionNotification {
        room_id,
        item_id,
        message: format!("'{}' {}님께 {}에 낙찰되었습니다.", item.name, winner, amount),
        status: ItemStatus::Sold,
        timestamp: now,
    });
    tx.emit(AuctionEvent::StatusChange {
        room_id,
        room_status,
        item: Some(item.clone()),
        timestamp: now,
    });
    Ok(win)
}

fn room_status_event(room: &Room, item: Option<&Item>, now: DateTime<Utc>) -> AuctionEvent {
    AuctionEvent::StatusChange {
        room_id: room.id,
        room_status: room.status,
        item: item.cloned(),
        timestamp: now,
    }
}

fn call_event(room_id: RoomId, item: &Item, call_count: u8, now: DateTime<Utc>) -> AuctionEvent {
    AuctionEvent::CallUpdate {
        room_id,
        item_id: item.id,
        call_count,
        status: item.status,
        timestamp: now,
    }
}

// endregion: --- Transitions
