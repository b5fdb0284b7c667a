//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, regex compile)
//!     → RoutingConfig (validated, immutable)
//!     → routing::Router::from_config (compiled once)
//!
//! On reload signal (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server compiles and swaps Arc<Router> atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CommonUrlConfig, HostRuleConfig, LegacyRouteConfig, PrevalidateConfig, RedirectRuleConfig,
    RoutingConfig, DYNAMIC_HOST,
};
pub use validation::ValidationError;
