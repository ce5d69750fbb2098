//! HTTP Layer - 任务入口 + 运维接口

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::create_routes;
pub use server::{build_router, serve, MAX_JOB_BODY_BYTES};
pub use state::AppState;
