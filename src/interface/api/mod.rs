//! HTTP API

pub mod metrics_handler;
pub mod router;

pub use metrics_handler::{init_metrics, metrics_handler};
pub use router::{build_router, health_check};
