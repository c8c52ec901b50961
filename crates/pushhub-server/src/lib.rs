//! Pushhub server: Web Push subscription registry and delivery over HTTP.
//!
//! Browsers register their push subscriptions, operators send a
//! notification to one of them on demand, and a periodic sweep broadcasts to
//! all of them. A subscription whose push service answers 410 Gone is
//! deleted.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod storage;
pub mod subscriptions;

pub use config::{AppConfig, PostgresStorageConfig, ServerConfig, StorageBackend, SweepConfig};
pub use observability::init_tracing;
pub use server::{AppState, PushhubServer, ServerBuilder, build_app};
