//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, query)
//!     → request.rs (RequestDescriptor)
//!     → router.rs (resolution pipeline)
//!         → matcher.rs (host rules, segment namespaces, legacy routes)
//!         → prevalidate.rs (controller segment checks)
//!         → redirect.rs (redirect table)
//!     → Return: Dispatch, Redirect or NotFound
//!
//! Route Compilation (at startup or reload):
//!     RoutingConfig
//!     → Compile regexes (host rules, legacy routes, validators)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - Deterministic: same config and request always give the same result
//! - First match wins (declaration order)

pub mod matcher;
pub mod prevalidate;
pub mod redirect;
pub mod request;
pub mod router;
pub mod url;

pub use request::RequestDescriptor;
pub use router::{class_name, ControllerCatalog, DispatchTarget, ResolutionResult, Router};
pub use url::UrlBuilder;
