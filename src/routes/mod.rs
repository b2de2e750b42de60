//! Route tables, split by how the caller is authenticated.

/// No credentials: health check and session exchange.
pub mod public;

/// Browser session (cookie or bearer JWT) required; writes further gated by the ACL.
pub mod authenticated;

/// User management, reserved to the roles the ACL allows on `/users`.
pub mod admin;

/// Products sync API, authenticated by per-profile bearer tokens.
pub mod sync;
