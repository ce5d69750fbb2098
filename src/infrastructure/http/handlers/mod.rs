//! HTTP Handlers

mod job;
mod models;
mod ping;

pub use job::*;
pub use models::*;
pub use ping::*;
