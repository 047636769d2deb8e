//! EduGPT API Library Crate
//!
//! This library contains the web layer of EduGPT: configuration, the shared
//! application state, REST handlers, the WebSocket chat and routing. The
//! binaries under `bin/` are thin wrappers around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;

#[cfg(test)]
mod test_support;
