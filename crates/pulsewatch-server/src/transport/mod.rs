//! HTTP plumbing shared by every route.
//!
//! Caller identification from request parts, plus the middleware that times
//! each request and adds CORS headers.

pub mod caller;
pub mod middleware;
