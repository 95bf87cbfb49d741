//! Application-level configuration.
//!
//! - [`DispatchParams`] — per-call deadline for provider queries
//! - [`ModeCatalog`] — presets and resolution of user-supplied mode text
//! - [`ComplexityRouter`] — mode targets for `auto`, one per complexity level

pub mod complexity_router;
pub mod dispatch_params;
pub mod mode_catalog;

pub use complexity_router::{AUTO_MODE, ComplexityRouter};
pub use dispatch_params::DispatchParams;
pub use mode_catalog::{ModeCatalog, ModeChoice};
