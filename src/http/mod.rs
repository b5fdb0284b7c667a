//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, RequestDescriptor)
//!     → routing::Router::resolve_with
//!     → response.rs (controller JSON, redirect, 404)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{describe, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer, Routes};
