//! URI routing resolver.
//!
//! Maps a request (host, path, query) onto a controller dispatch target or a
//! redirect, driven by a declarative TOML configuration.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RoutingConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RequestDescriptor, ResolutionResult, Router};
