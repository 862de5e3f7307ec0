use std::time::Duration;

use livekit_api::access_token::{AccessToken, AccessTokenError, VideoGrants};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    Signing(#[from] AccessTokenError),
}

/// Join grant for a single room with publish and subscribe rights.
pub fn participant_grants(room: &str) -> VideoGrants {
    VideoGrants {
        room_join: true,
        room: room.to_string(),
        can_publish: true,
        can_subscribe: true,
        ..Default::default()
    }
}

/// Signs admission tokens with the room service API key and secret
#[derive(Clone)]
pub struct AccessTokenIssuer {
    api_key: String,
    api_secret: String,
    ttl: Duration,
}

impl AccessTokenIssuer {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.livekit_api_key.clone(),
            api_secret: config.livekit_api_secret.clone(),
            ttl: Duration::from_secs(config.token_ttl_seconds),
        }
    }

    /// Generate a token admitting `identity` into `room`
    pub fn participant_token(
        &self,
        room: &str,
        identity: &str,
        display_name: &str,
    ) -> Result<String, TokenError> {
        let token = AccessToken::with_api_key(&self.api_key, &self.api_secret)
            .with_identity(identity)
            .with_name(display_name)
            .with_grants(participant_grants(room))
            .with_ttl(self.ttl)
            .to_jwt()?;
        Ok(token)
    }
}
