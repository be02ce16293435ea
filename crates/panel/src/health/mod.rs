//! Health module — liveness endpoint.

pub mod route;
