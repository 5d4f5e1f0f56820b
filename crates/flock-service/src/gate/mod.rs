//! Permission gate
//!
//! Every privileged read or mutation passes through [`PermissionGate::authorize`]
//! before touching storage. The gate consults a single [`AccessPolicy`] table.

mod actor;
mod policy;

pub use actor::Actor;
pub use policy::AccessPolicy;

use tracing::warn;

use crate::services::{ServiceError, ServiceResult};

/// Evaluates actors against the access policy
#[derive(Debug, Clone)]
pub struct PermissionGate {
    policy: AccessPolicy,
}

impl PermissionGate {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Succeed if the actor may access `resource`, else `Unauthorized`
    ///
    /// Unregistered resources are denied unless the actor is an administrator.
    pub fn authorize(&self, actor: &Actor, resource: &str) -> ServiceResult<()> {
        let allowed = match self.policy.required(resource) {
            Some(required) => actor.can(required),
            None => actor.can(flock_core::Capabilities::ADMINISTRATOR),
        };

        if allowed {
            Ok(())
        } else {
            warn!(
                member_id = %actor.member_id,
                role = %actor.role,
                resource = %resource,
                "Access denied"
            );
            Err(ServiceError::unauthorized(resource))
        }
    }
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new(AccessPolicy::standard())
    }
}
