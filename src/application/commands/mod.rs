//! 应用层 - 命令
//!
//! 合成任务命令及其处理器

mod synthesize_commands;

pub mod handlers;

pub use synthesize_commands::*;
