use std::sync::Arc;

use cooldown::CooldownGate;
use relay::Relay;

pub mod cache;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod relay;
pub mod router;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<CooldownGate>,
    pub relay: Arc<dyn Relay>,
}

impl AppState {
    pub fn new(gate: CooldownGate, relay: impl Relay + 'static) -> Self {
        Self {
            gate: Arc::new(gate),
            relay: Arc::new(relay),
        }
    }
}
