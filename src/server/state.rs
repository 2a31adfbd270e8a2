use axum::extract::FromRef;

use crate::recommend::RecommendationEngine;
use std::sync::Arc;
use std::time::Instant;

use super::image_relay::ImageRelay;
use super::ServerConfig;

pub type GuardedEngine = Arc<RecommendationEngine>;
pub type GuardedImageRelay = Arc<ImageRelay>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub engine: GuardedEngine,
    pub image_relay: GuardedImageRelay,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.engine.clone()
    }
}

impl FromRef<ServerState> for GuardedImageRelay {
    fn from_ref(input: &ServerState) -> Self {
        input.image_relay.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
