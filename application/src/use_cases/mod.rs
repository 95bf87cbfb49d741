//! Use cases (application services)

pub mod compose;
pub mod dispatch;
pub mod check_providers;
