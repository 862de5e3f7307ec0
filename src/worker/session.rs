//! Worker session seams: the connector that joins a room and the observer
//! that receives the session's events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

/// Participant seen by the worker session
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantInfo {
    pub identity: String,
    pub sid: String,
}

/// Track the worker session subscribed to
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub sid: String,
    pub name: String,
    pub kind: String,
}

/// Everything needed to join a room as the worker
#[derive(Debug, Clone)]
pub struct SessionJoin {
    pub url: String,
    pub room: String,
    pub identity: String,
    pub token: String,
    /// Changes when the dispatcher shuts down; the session must then leave the room.
    pub stop: watch::Receiver<bool>,
}

/// Event loop of an established session, resolving when the session ends
pub type SessionTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to connect to room {room}: {message}")]
    Connect { room: String, message: String },

    #[error("Failed to issue worker token: {0}")]
    Token(#[from] crate::auth::TokenError),
}

/// Receives events from a worker session, one method per event kind.
pub trait SessionObserver: Send + Sync {
    fn on_participant_connected(&self, _room: &str, _participant: &ParticipantInfo) {}

    fn on_participant_disconnected(&self, _room: &str, _participant: &ParticipantInfo) {}

    fn on_track_subscribed(&self, _room: &str, _track: &TrackInfo, _participant: &ParticipantInfo) {}

    fn on_data_received(&self, _room: &str, _data: &[u8], _participant: Option<&ParticipantInfo>) {}

    fn on_disconnected(&self, _room: &str, _reason: &str) {}
}

/// Joins rooms on behalf of the worker.
///
/// `join` resolves once the session is established and returns its event
/// loop, which delivers events to `observer` until the session disconnects
/// or `SessionJoin::stop` changes.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn join(
        &self,
        join: SessionJoin,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<SessionTask, SessionError>;
}

/// Observer writing one log line per session event
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver;

impl SessionObserver for LoggingObserver {
    fn on_participant_connected(&self, room: &str, participant: &ParticipantInfo) {
        tracing::info!(
            room = %room,
            identity = %participant.identity,
            sid = %participant.sid,
            "Participant connected"
        );
    }

    fn on_participant_disconnected(&self, room: &str, participant: &ParticipantInfo) {
        tracing::info!(
            room = %room,
            identity = %participant.identity,
            sid = %participant.sid,
            "Participant disconnected"
        );
    }

    fn on_track_subscribed(&self, room: &str, track: &TrackInfo, participant: &ParticipantInfo) {
        tracing::info!(
            room = %room,
            track_sid = %track.sid,
            track_name = %track.name,
            kind = %track.kind,
            identity = %participant.identity,
            sid = %participant.sid,
            "Track subscribed"
        );
    }

    fn on_data_received(&self, room: &str, data: &[u8], participant: Option<&ParticipantInfo>) {
        tracing::info!(
            room = %room,
            bytes = data.len(),
            identity = participant.map(|p| p.identity.as_str()).unwrap_or("server"),
            "Data received"
        );
    }

    fn on_disconnected(&self, room: &str, reason: &str) {
        tracing::info!(room = %room, reason = %reason, "Worker session disconnected");
    }
}
