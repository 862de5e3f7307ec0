//! Worker sessions backed by the LiveKit SDK.

use std::sync::Arc;

use async_trait::async_trait;
use livekit::prelude::*;

use super::session::{
    ParticipantInfo, SessionConnector, SessionError, SessionJoin, SessionObserver, SessionTask,
    TrackInfo,
};

/// Connects the worker to rooms through the LiveKit SDK
#[derive(Debug, Clone, Default)]
pub struct LiveKitConnector;

fn participant_info(participant: &RemoteParticipant) -> ParticipantInfo {
    ParticipantInfo {
        identity: participant.identity().to_string(),
        sid: participant.sid().to_string(),
    }
}

#[async_trait]
impl SessionConnector for LiveKitConnector {
    async fn join(
        &self,
        join: SessionJoin,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<SessionTask, SessionError> {
        let (room, mut events) = Room::connect(&join.url, &join.token, RoomOptions::default())
            .await
            .map_err(|e| SessionError::Connect {
                room: join.room.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(room = %join.room, identity = %join.identity, "Worker session connected");

        let name = join.room;
        let mut stop = join.stop;
        Ok(Box::pin(async move {
            loop {
                let event = tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                    _ = stop.changed() => {
                        tracing::info!(room = %name, "Worker leaving room on shutdown");
                        break;
                    }
                };

                match event {
                    RoomEvent::ParticipantConnected(participant) => {
                        observer.on_participant_connected(&name, &participant_info(&participant));
                    }
                    RoomEvent::ParticipantDisconnected(participant) => {
                        observer
                            .on_participant_disconnected(&name, &participant_info(&participant));
                    }
                    RoomEvent::TrackSubscribed {
                        track, participant, ..
                    } => {
                        let track = TrackInfo {
                            sid: track.sid().to_string(),
                            name: track.name(),
                            kind: format!("{:?}", track.kind()),
                        };
                        observer.on_track_subscribed(&name, &track, &participant_info(&participant));
                    }
                    RoomEvent::DataReceived {
                        payload,
                        participant,
                        ..
                    } => {
                        let sender = participant.as_ref().map(participant_info);
                        observer.on_data_received(&name, &payload, sender.as_ref());
                    }
                    RoomEvent::Disconnected { reason, .. } => {
                        observer.on_disconnected(&name, &format!("{:?}", reason));
                        break;
                    }
                    _ => {}
                }
            }

            if let Err(e) = room.close().await {
                tracing::debug!(room = %name, error = %e, "Worker session close failed");
            }
        }))
    }
}
