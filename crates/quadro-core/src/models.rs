//! Domain models for Quadro.
//!
//! These are the core types shared across all crates.

pub mod activity;
pub mod automation;
pub mod board;
pub mod column;
pub mod column_value;
pub mod group;
pub mod item;
pub mod membership;
pub mod notification;
pub mod session;
pub mod update;
pub mod user;
pub mod view;
pub mod workspace;
