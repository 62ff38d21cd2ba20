//! Router Module Index
//!
//! Routes are split by who may reach them. The split is the coarse first gate; the
//! per-resource rules are applied inside the handlers.

/// Anonymous-friendly reads, health and registration.
pub mod public;

/// Routes behind the `AuthUser` middleware.
pub mod authenticated;

/// Staff-only routes, nested under `/admin`.
pub mod admin;
