//! Room service backed by the LiveKit server SDK.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use livekit_api::services::{ServiceError, ServiceResult, TwirpError};
use livekit_protocol as proto;

use super::{NewRoom, RoomService, RoomServiceError, RoomServiceResult};
use crate::config::Config;

/// Room service client with a per-call timeout
pub struct LiveKitRoomClient {
    client: RoomClient,
    url: String,
    timeout: Duration,
}

impl LiveKitRoomClient {
    pub fn new(config: &Config) -> Self {
        let url = config.room_service_url();
        Self {
            client: RoomClient::with_api_key(
                &url,
                &config.livekit_api_key,
                &config.livekit_api_secret,
            ),
            url,
            timeout: config.room_service_timeout(),
        }
    }

    async fn run<T, F>(&self, method: &'static str, call: F) -> RoomServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = classify(method, &self.url, e);
                tracing::warn!(method, error = %err, "Room service call failed");
                Err(err)
            }
            Err(_) => {
                tracing::warn!(
                    method,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Room service call timed out"
                );
                Err(RoomServiceError::Unreachable {
                    url: self.url.clone(),
                    message: format!("{} timed out after {:?}", method, self.timeout),
                })
            }
        }
    }
}

/// Split SDK errors into unreachable, rejected and undecodable responses.
pub(crate) fn classify(method: &'static str, url: &str, err: ServiceError) -> RoomServiceError {
    match err {
        ServiceError::Twirp(TwirpError::Twirp(code)) => RoomServiceError::Rejected {
            method,
            code: code.code,
            message: code.msg,
        },
        ServiceError::Twirp(TwirpError::Request(e)) => RoomServiceError::Unreachable {
            url: url.to_string(),
            message: e.to_string(),
        },
        ServiceError::AccessToken(e) => RoomServiceError::Credentials(e.to_string()),
        other => RoomServiceError::InvalidResponse(format!("{}: {}", method, other)),
    }
}

#[async_trait]
impl RoomService for LiveKitRoomClient {
    async fn list_rooms(&self) -> RoomServiceResult<Vec<proto::Room>> {
        let rooms = self
            .run("ListRooms", self.client.list_rooms(Vec::new()))
            .await?;
        tracing::debug!(count = rooms.len(), "Listed rooms");
        Ok(rooms)
    }

    async fn create_room(&self, room: NewRoom) -> RoomServiceResult<proto::Room> {
        let options = CreateRoomOptions {
            empty_timeout: room.empty_timeout,
            max_participants: room.max_participants,
            ..Default::default()
        };
        let created = self
            .run("CreateRoom", self.client.create_room(&room.name, options))
            .await?;
        tracing::info!(room = %created.name, sid = %created.sid, "Room created");
        Ok(created)
    }

    async fn delete_room(&self, name: &str) -> RoomServiceResult<()> {
        self.run("DeleteRoom", self.client.delete_room(name)).await?;
        tracing::info!(room = %name, "Room deleted");
        Ok(())
    }
}
