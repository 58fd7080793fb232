//! Source watching and live reload.

mod debouncer;
mod manager;
mod websocket;

pub(crate) use manager::{LiveReloadManager, ReloadEvent};
pub(crate) use websocket::ws_handler;
