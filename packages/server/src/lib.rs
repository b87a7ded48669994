//! Parlor chat server.
//!
//! Layers, inner to outer:
//! - `domain`: value objects, entities, the shared chat state and its traits
//! - `usecase`: connect, disconnect, command dispatch, room listing, shutdown
//! - `infrastructure`: in-memory repository, message stores, DTOs
//! - `ui`: axum router, WebSocket and HTTP handlers

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
