// region:    --- Imports
use crate::auction::error::AuctionError;
use crate::auction::model::{ItemId, RoomId};
use crate::bidding::commands::{
    ActivateItemCommand, ActorCommand, CreateRoomCommand, JoinRoomCommand, LeaveRoomCommand,
    ListItemCommand, PlaceBidCommand,
};
use crate::controller::{AuctionController, WinRecordFilter};
use crate::notifier::BroadcastNotifier;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Router
pub fn routes(controller: AuctionController, events: BroadcastNotifier) -> Router {
    Router::new()
        .route("/rooms", post(handle_create_room))
        .route("/rooms/:room_id/start", post(handle_start_room))
        .route("/rooms/:room_id/end", post(handle_end_room))
        .route("/rooms/:room_id/join", post(handle_join_room))
        .route("/rooms/:room_id/leave", post(handle_leave_room))
        .route(
            "/rooms/:room_id/items",
            post(handle_list_item).get(handle_get_room_items),
        )
        .route(
            "/rooms/:room_id/items/:item_id/activate",
            post(handle_activate_item),
        )
        .route("/rooms/:room_id/bids", post(handle_bid))
        .route("/rooms/:room_id/call", post(handle_advance_call))
        .route("/rooms/:room_id/sell", post(handle_sell))
        .route("/rooms/:room_id/next", post(handle_next_item))
        .route("/rooms/:room_id/state", get(handle_get_item_state))
        .route("/rooms/:room_id/wins", get(handle_get_room_wins))
        .route("/items/:item_id/bids", get(handle_get_bid_history))
        .route("/bidders/:name/wins", get(handle_get_bidder_wins))
        .with_state(controller)
        .merge(
            Router::new()
                .route("/rooms/:room_id/events", get(handle_room_events))
                .with_state(events),
        )
}

// endregion: --- Router

// region:    --- Error Response
impl AuctionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound(_) | Self::ItemNotFound(_) => StatusCode::NOT_FOUND,
            Self::NotAuthorized(_) => StatusCode::FORBIDDEN,
            Self::PersistenceFailed(_) | Self::NotificationFailed(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let Self::BelowMinimum { min_required } = &self {
            body["min_required"] = serde_json::json!(min_required);
        }
        if self.is_transient() {
            warn!("{:<12} --> 일시적 실패: {}", "Handler", self);
        }
        (self.status_code(), Json(body)).into_response()
    }
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, AuctionError>) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(e) => e.into_response(),
    }
}

// endregion: --- Error Response

// region:    --- Command Handlers

/// 방 생성
pub async fn handle_create_room(
    State(controller): State<AuctionController>,
    Json(cmd): Json<CreateRoomCommand>,
) -> Response {
    info!("{:<12} --> 방 생성 요청: {:?}", "Command", cmd);
    let result = controller
        .create_room(&cmd.actor, &cmd.label, cmd.bid_increment)
        .await;
    respond(StatusCode::CREATED, result)
}

/// 방 시작
pub async fn handle_start_room(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<ActorCommand>,
) -> Response {
    info!("{:<12} --> 방 시작 요청 room: {}", "Command", room_id);
    respond(StatusCode::OK, controller.start_room(room_id, &cmd.actor).await)
}

/// 방 종료
pub async fn handle_end_room(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<ActorCommand>,
) -> Response {
    info!("{:<12} --> 방 종료 요청 room: {}", "Command", room_id);
    respond(StatusCode::OK, controller.end_room(room_id, &cmd.actor).await)
}

/// 방 참가
pub async fn handle_join_room(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<JoinRoomCommand>,
) -> Response {
    info!("{:<12} --> 참가 요청 room: {}, {:?}", "Command", room_id, cmd);
    respond(StatusCode::OK, controller.join_room(room_id, cmd).await)
}

/// 방 퇴장
pub async fn handle_leave_room(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<LeaveRoomCommand>,
) -> Response {
    info!("{:<12} --> 퇴장 요청 room: {}, {:?}", "Command", room_id, cmd);
    match controller.leave_room(room_id, &cmd.display_name).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// 상품 등록
pub async fn handle_list_item(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<ListItemCommand>,
) -> Response {
    info!("{:<12} --> 상품 등록 요청 room: {}", "Command", room_id);
    respond(
        StatusCode::CREATED,
        controller.list_item(room_id, &cmd.actor, cmd.item).await,
    )
}

/// 상품 활성화
pub async fn handle_activate_item(
    State(controller): State<AuctionController>,
    Path((room_id, item_id)): Path<(RoomId, ItemId)>,
    Json(cmd): Json<ActorCommand>,
) -> Response {
    info!(
        "{:<12} --> 상품 활성화 요청 room: {}, item: {}",
        "Command", room_id, item_id
    );
    let cmd = ActivateItemCommand {
        actor: cmd.actor,
        item_id,
    };
    respond(
        StatusCode::OK,
        controller
            .activate_item(room_id, &cmd.actor, cmd.item_id)
            .await,
    )
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Response {
    info!("{:<12} --> 입찰 요청 room: {}, {:?}", "Command", room_id, cmd);
    respond(
        StatusCode::OK,
        controller.place_bid(room_id, &cmd.bidder, cmd.amount).await,
    )
}

/// 콜 진행
pub async fn handle_advance_call(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<ActorCommand>,
) -> Response {
    info!("{:<12} --> 콜 요청 room: {}", "Command", room_id);
    respond(
        StatusCode::OK,
        controller.advance_call(room_id, &cmd.actor).await,
    )
}

/// 즉시 낙찰
pub async fn handle_sell(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<ActorCommand>,
) -> Response {
    info!("{:<12} --> 낙찰 요청 room: {}", "Command", room_id);
    respond(StatusCode::OK, controller.sell_item(room_id, &cmd.actor).await)
}

/// 다음 상품
pub async fn handle_next_item(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
    Json(cmd): Json<ActorCommand>,
) -> Response {
    info!("{:<12} --> 다음 상품 요청 room: {}", "Command", room_id);
    respond(StatusCode::OK, controller.next_item(room_id, &cmd.actor).await)
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 현재 경매 상태 조회
pub async fn handle_get_item_state(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
) -> Response {
    info!("{:<12} --> 경매 상태 조회 room: {}", "HandlerQuery", room_id);
    match controller.get_item_state(room_id).await {
        Ok(snapshot) => Json(snapshot.as_ref()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 방 상품 목록 조회
pub async fn handle_get_room_items(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
) -> Response {
    info!("{:<12} --> 상품 목록 조회 room: {}", "HandlerQuery", room_id);
    respond(StatusCode::OK, controller.list_items(room_id).await)
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State(controller): State<AuctionController>,
    Path(item_id): Path<ItemId>,
) -> Response {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", item_id);
    respond(StatusCode::OK, controller.get_bid_history(item_id).await)
}

/// 방 낙찰 기록 조회
pub async fn handle_get_room_wins(
    State(controller): State<AuctionController>,
    Path(room_id): Path<RoomId>,
) -> Response {
    info!("{:<12} --> 방 낙찰 기록 조회 room: {}", "HandlerQuery", room_id);
    respond(
        StatusCode::OK,
        controller
            .get_win_records(WinRecordFilter::Room(room_id))
            .await,
    )
}

/// 입찰자 낙찰 기록 조회
pub async fn handle_get_bidder_wins(
    State(controller): State<AuctionController>,
    Path(name): Path<String>,
) -> Response {
    info!("{:<12} --> 입찰자 낙찰 기록 조회: {}", "HandlerQuery", name);
    respond(
        StatusCode::OK,
        controller
            .get_win_records(WinRecordFilter::Bidder(name))
            .await,
    )
}

/// 방 이벤트 구독 (SSE)
/// 느린 구독자가 놓친 이벤트는 건너뛴다. 상태는 /state 로 다시 읽는다.
pub async fn handle_room_events(
    State(events): State<BroadcastNotifier>,
    Path(room_id): Path<RoomId>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("{:<12} --> 이벤트 구독 room: {}", "HandlerQuery", room_id);
    let stream = BroadcastStream::new(events.subscribe()).filter_map(move |received| {
        let event = received.ok().filter(|event| event.room_id() == room_id)?;
        Event::default()
            .event(event.kind())
            .json_data(&event)
            .ok()
            .map(Ok)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

// endregion: --- Query Handlers
