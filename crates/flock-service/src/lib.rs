//! # flock-service
//!
//! Application layer: the permission gate, business services, outbound
//! delivery (Web Push, SMS) and the request/response DTOs.

pub mod delivery;
pub mod dto;
pub mod gate;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use gate::{AccessPolicy, Actor, PermissionGate};
pub use services::{ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, ServiceSettings};
