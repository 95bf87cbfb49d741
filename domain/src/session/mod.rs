//! Chat session domain.
//!
//! - [`entities::ChatTurn`] — one user or assistant turn, used to give
//!   providers conversation context

pub mod entities;
