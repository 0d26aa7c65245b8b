//! Quadro API — the typed operation layer.
//!
//! Transport-agnostic: a server exposes these operations over
//! whatever protocol it likes; everything here deals in validated
//! inputs, authorized operations, and change events.

mod api;
mod board;
pub mod events;
pub mod input;
mod item;
mod subscription;
mod user;
mod workspace;

pub use api::Api;
pub use events::{ChangeEvent, EventBus, EventEnvelope};
