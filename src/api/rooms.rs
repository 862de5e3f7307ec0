use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};

use livekit_protocol as proto;

use crate::error::{AppError, Result};
use crate::models::{
    room_name_for, CreateRoomResponse, DeleteRoomRequest, DeleteRoomResponse, JoinRoomRequest,
    ListRoomsResponse, TokenResponse,
};
use crate::room_service::NewRoom;
use crate::state::AppState;

/// Identity given to the human participant in admission tokens
const HUMAN_IDENTITY: &str = "human";

/// Room routes
pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/get/token", post(get_token))
        .route("/create/room", post(create_room))
        .route("/delete/room", post(delete_room))
        .route("/list/rooms", get(list_rooms))
}

/// Create room `name` with the configured defaults
async fn create_named_room(state: &AppState, name: &str) -> Result<proto::Room> {
    let room = NewRoom {
        name: name.to_string(),
        empty_timeout: state.config.room_empty_timeout_seconds,
        max_participants: state.config.room_max_participants,
    };

    Ok(state.rooms.create_room(room).await?)
}

/// POST /get/token
/// 1. create a room for the user
/// 2. issue an admission token for the room
/// 3. queue the worker join
async fn get_token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(request) = payload?;
    if request.userid.is_empty() {
        return Err(AppError::BadRequest("userid is required".to_string()));
    }

    let name = room_name_for(&request.userid);
    let room = create_named_room(&state, &name).await?;

    let token = state
        .tokens
        .participant_token(&name, HUMAN_IDENTITY, &request.userid)?;

    // Outcome is only logged by the dispatcher.
    state.worker.notify(&name);

    tracing::info!(room = %name, user = %request.userid, "Admission token issued");

    Ok(Json(TokenResponse { token, room }))
}

/// POST /create/room
async fn create_room(
    State(state): State<AppState>,
    payload: std::result::Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<Json<CreateRoomResponse>> {
    let Json(request) = payload?;

    let name = room_name_for(&request.userid);
    let room = create_named_room(&state, &name).await?;
    tracing::info!(room = %name, user = %request.userid, "Room created on request");

    Ok(Json(CreateRoomResponse { room }))
}

/// POST /delete/room
async fn delete_room(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeleteRoomRequest>, JsonRejection>,
) -> Result<Json<DeleteRoomResponse>> {
    let Json(request) = payload?;
    if request.roomid.is_empty() {
        return Err(AppError::BadRequest("roomid is required".to_string()));
    }

    state.rooms.delete_room(&request.roomid).await?;

    Ok(Json(DeleteRoomResponse {
        room: request.roomid,
        status: "deleted",
    }))
}

/// GET /list/rooms
async fn list_rooms(State(state): State<AppState>) -> Result<Json<ListRoomsResponse>> {
    let rooms = state.rooms.list_rooms().await?;
    Ok(Json(ListRoomsResponse { rooms }))
}
