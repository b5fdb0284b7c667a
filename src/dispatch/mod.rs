//! Controller dispatch.
//!
//! # Data Flow
//! ```text
//! ResolutionResult::Dispatch(target)
//!     → registry.rs (class name → Arc<dyn Controller>)
//!     → Controller::handle(DispatchContext)
//!     → ControllerResponse (status + JSON body)
//! ```

pub mod registry;

pub use registry::{
    Controller, ControllerRegistry, ControllerResponse, DispatchContext, EchoController, RegistryBuilder,
};
