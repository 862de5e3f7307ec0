use std::sync::Arc;

use crate::auth::AccessTokenIssuer;
use crate::config::Config;
use crate::room_service::RoomService;
use crate::worker::WorkerDispatcher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<AccessTokenIssuer>,
    pub rooms: Arc<dyn RoomService>,
    pub worker: WorkerDispatcher,
}

impl AppState {
    pub fn new(
        config: Config,
        tokens: AccessTokenIssuer,
        rooms: Arc<dyn RoomService>,
        worker: WorkerDispatcher,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            rooms,
            worker,
        }
    }
}
