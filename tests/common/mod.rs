//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use livekit_protocol::Room;
use room_gateway::auth::AccessTokenIssuer;
use room_gateway::room_service::{NewRoom, RoomService, RoomServiceError, RoomServiceResult};
use room_gateway::worker::{
    SessionConnector, SessionError, SessionJoin, SessionObserver, SessionTask,
};
use room_gateway::{api, AppState, Config};

pub fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 3000,
        livekit_api_key: "APItestkey".to_string(),
        livekit_api_secret: "test-secret-key".to_string(),
        livekit_host: "http://127.0.0.1:7880".to_string(),
        token_ttl_seconds: 3600,
        room_empty_timeout_seconds: 600,
        room_max_participants: 10,
        room_service_timeout_seconds: 5,
        worker_identity: "nox".to_string(),
        worker_queue_capacity: 8,
        worker_max_attempts: 3,
        worker_retry_base_ms: 1,
    }
}

/// How the stub room service should fail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    None,
    Unreachable,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(NewRoom),
    Delete(String),
}

/// In-memory room service recording every call
pub struct StubRoomService {
    pub calls: Mutex<Vec<Call>>,
    pub rooms: Vec<Room>,
    pub failure: Failure,
}

impl StubRoomService {
    pub fn new() -> Self {
        Self::with_rooms(Vec::new())
    }

    pub fn with_rooms(rooms: Vec<Room>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rooms,
            failure: Failure::None,
        }
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            failure,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call, method: &'static str) -> RoomServiceResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure {
            Failure::None => Ok(()),
            Failure::Unreachable => Err(RoomServiceError::Unreachable {
                url: "http://127.0.0.1:7880".to_string(),
                message: "connection refused".to_string(),
            }),
            Failure::Rejected => Err(RoomServiceError::Rejected {
                method,
                code: "not_found".to_string(),
                message: "room not found".to_string(),
            }),
        }
    }
}

#[async_trait]
impl RoomService for StubRoomService {
    async fn list_rooms(&self) -> RoomServiceResult<Vec<Room>> {
        self.record(Call::List, "ListRooms")?;
        Ok(self.rooms.clone())
    }

    async fn create_room(&self, room: NewRoom) -> RoomServiceResult<Room> {
        self.record(Call::Create(room.clone()), "CreateRoom")?;
        Ok(Room {
            sid: "RM_stub".to_string(),
            name: room.name,
            empty_timeout: room.empty_timeout,
            max_participants: room.max_participants,
            creation_time: 1_700_000_000,
            ..Default::default()
        })
    }

    async fn delete_room(&self, name: &str) -> RoomServiceResult<()> {
        self.record(Call::Delete(name.to_string()), "DeleteRoom")
    }
}

/// Connector whose joins always fail
#[derive(Default)]
pub struct FailingConnector {
    pub attempts: AtomicU32,
}

impl FailingConnector {
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionConnector for FailingConnector {
    async fn join(
        &self,
        join: SessionJoin,
        _observer: Arc<dyn SessionObserver>,
    ) -> Result<SessionTask, SessionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SessionError::Connect {
            room: join.room,
            message: "signal connection refused".to_string(),
        })
    }
}

/// Connector recording every join; sessions end as soon as they start
#[derive(Default)]
pub struct RecordingConnector {
    pub joins: Mutex<Vec<SessionJoin>>,
}

impl RecordingConnector {
    pub fn rooms(&self) -> Vec<String> {
        self.joins
            .lock()
            .unwrap()
            .iter()
            .map(|join| join.room.clone())
            .collect()
    }
}

#[async_trait]
impl SessionConnector for RecordingConnector {
    async fn join(
        &self,
        join: SessionJoin,
        _observer: Arc<dyn SessionObserver>,
    ) -> Result<SessionTask, SessionError> {
        self.joins.lock().unwrap().push(join);
        Ok(Box::pin(async {}))
    }
}

pub fn router(rooms: Arc<StubRoomService>) -> Router {
    let config = test_config();
    let tokens = AccessTokenIssuer::new(&config);
    let state = AppState::new(
        config,
        tokens,
        rooms,
        room_gateway::worker::WorkerDispatcher::disabled(),
    );
    api::create_router(state)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec();
    (status, body)
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, request).await;
    let json = serde_json::from_slice(&body).expect("Failed to parse JSON");
    (status, json)
}
