#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use linkmint::api::handlers::{health_handler, redirect_handler};
use linkmint::api::routes::api_routes;
use linkmint::application::{Engine, EngineConfig};
use linkmint::domain::clock::{Clock, ManualClock};
use linkmint::domain::entities::Ttl;
use linkmint::state::AppState;

pub const BASE_URL: &str = "https://s.example.com";

/// Engine settings with a generous attempt bound and no deadline, so tests
/// are not sensitive to machine speed.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        max_attempts: 100,
        create_deadline: None,
        ..Default::default()
    }
}

/// Settings that leave only `symbols.len()^length` codes to hand out.
pub fn tiny_keyspace(symbols: &str, length: usize) -> EngineConfig {
    EngineConfig {
        alphabet: symbols.to_string(),
        code_length: length,
        reserved_codes: Vec::new(),
        ..test_config()
    }
}

pub fn create_engine(config: &EngineConfig) -> Engine {
    Engine::in_memory(config).unwrap()
}

/// Engine on a clock that only moves when the test advances it.
pub fn create_engine_with_clock(config: &EngineConfig) -> (Engine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let engine = Engine::in_memory_with_clock(config, clock.clone() as Arc<dyn Clock>).unwrap();
    (engine, clock)
}

pub fn create_test_state(engine: &Engine) -> AppState {
    AppState::new(engine.shortener.clone(), BASE_URL)
}

/// All routes without the rate limiter, which needs a real peer address.
pub fn create_test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

pub fn ttl_secs(secs: u64) -> Option<Ttl> {
    Some(Ttl::After(Duration::from_secs(secs)))
}
