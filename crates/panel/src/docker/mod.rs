//! Docker module — the bollard-backed container collaborator.

pub mod client;
pub mod container;

pub use client::{DockerClient, DockerError};
pub use container::{ContainerState, LogFollowRequest};
