//! CLI commands

pub mod export;
pub mod list;
pub mod search;
pub mod show;
pub mod tags;
