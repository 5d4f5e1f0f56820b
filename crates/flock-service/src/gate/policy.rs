//! Resource to capability table

use std::collections::HashMap;

use flock_core::value_objects::Capabilities;

/// Dashboard route paths and the capability each requires
const DASHBOARD_ROUTES: &[(&str, Capabilities)] = &[
    ("/dashboard", Capabilities::VIEW_DASHBOARD),
    ("/dashboard/members", Capabilities::VIEW_MEMBERS),
    ("/dashboard/groups", Capabilities::VIEW_GROUPS),
    ("/dashboard/territories", Capabilities::VIEW_TERRITORIES),
    (
        "/dashboard/territories/analytics",
        Capabilities::VIEW_TERRITORY_ANALYTICS,
    ),
    ("/dashboard/duties", Capabilities::VIEW_DUTIES),
    ("/dashboard/reports", Capabilities::VIEW_REPORTS),
    ("/dashboard/notifications", Capabilities::SEND_NOTIFICATIONS),
    ("/dashboard/sms", Capabilities::SEND_SMS),
];

/// Maps resource identifiers to the capabilities they require
///
/// Two kinds of resource are registered:
/// - capability names such as `members:locations`, matched exactly
/// - route paths such as `/dashboard/territories`, matched by the longest
///   registered prefix ending on a `/` boundary
///
/// Anything not registered requires an impossible capability set, so it is
/// denied to everyone except administrators.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: HashMap<String, Capabilities>,
}

impl AccessPolicy {
    /// Empty policy; denies every resource
    pub fn new() -> Self {
        Self::default()
    }

    /// The dashboard policy: every capability name plus the dashboard routes
    pub fn standard() -> Self {
        let mut policy = Self::new();
        for (capability, name) in Capabilities::catalog() {
            policy.register(*name, *capability);
        }
        for (path, capability) in DASHBOARD_ROUTES {
            policy.register(*path, *capability);
        }
        policy
    }

    /// Protect a resource; replaces any existing rule for it
    pub fn register(&mut self, resource: impl Into<String>, required: Capabilities) -> &mut Self {
        self.rules
            .insert(normalize(&resource.into()).to_string(), required);
        self
    }

    /// Capabilities required for `resource`, or `None` if unregistered
    pub fn required(&self, resource: &str) -> Option<Capabilities> {
        let resource = normalize(resource);
        if let Some(required) = self.rules.get(resource) {
            return Some(*required);
        }
        if !resource.starts_with('/') {
            return None;
        }

        let mut prefix = resource;
        while let Some(idx) = prefix.rfind('/') {
            prefix = &prefix[..idx];
            if prefix.is_empty() {
                break;
            }
            if let Some(required) = self.rules.get(prefix) {
                return Some(*required);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Strip query string and trailing slash from paths
fn normalize(resource: &str) -> &str {
    let resource = resource.split('?').next().unwrap_or(resource);
    if resource.len() > 1 {
        resource.trim_end_matches('/')
    } else {
        resource
    }
}
