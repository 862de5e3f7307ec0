//! Client side of the external room service.

pub mod client;

pub use client::LiveKitRoomClient;

use async_trait::async_trait;
use livekit_protocol as proto;

pub type RoomServiceResult<T> = Result<T, RoomServiceError>;

/// Parameters for creating a room
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub name: String,
    pub empty_timeout: u32,
    pub max_participants: u32,
}

/// Errors returned by the room service client.
#[derive(Debug, thiserror::Error)]
pub enum RoomServiceError {
    /// The service could not be reached (connect failure, timeout).
    #[error("Room service unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// The service answered with a Twirp error.
    #[error("Room service rejected {method}: {message} (code: {code})")]
    Rejected {
        method: &'static str,
        code: String,
        message: String,
    },

    /// The service answered with a body that could not be decoded.
    #[error("Invalid response from room service: {0}")]
    InvalidResponse(String),

    /// The service token for the call could not be built.
    #[error("Room service credentials error: {0}")]
    Credentials(String),
}

/// Room management operations offered by the external service
#[async_trait]
pub trait RoomService: Send + Sync {
    async fn list_rooms(&self) -> RoomServiceResult<Vec<proto::Room>>;

    async fn create_room(&self, room: NewRoom) -> RoomServiceResult<proto::Room>;

    async fn delete_room(&self, name: &str) -> RoomServiceResult<()>;
}
