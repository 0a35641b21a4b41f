//! HTTP API module.
//!
//! This module provides the axum server exposing the task CRUD surface.

mod server;

pub use server::{TaskApi, start_server};
