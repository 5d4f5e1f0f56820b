//! Readiness checks over the registered health probes

use futures::future::join_all;
use tracing::warn;

use crate::dto::{HealthResponse, ReadinessResponse};

use super::context::ServiceContext;

pub struct HealthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> HealthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn liveness(&self) -> HealthResponse {
        HealthResponse::healthy()
    }

    /// Ping every dependency concurrently, each bounded by the storage timeout
    pub async fn readiness(&self) -> ReadinessResponse {
        let timeout = self.ctx.settings().storage_timeout;
        let probes = self.ctx.health_probes();

        let results = join_all(probes.iter().map(|probe| async move {
            let healthy = match tokio::time::timeout(timeout, probe.check()).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!(component = probe.name(), error = %e, "Health probe failed");
                    false
                }
                Err(_) => {
                    warn!(component = probe.name(), "Health probe timed out");
                    false
                }
            };
            (probe.name(), healthy)
        }))
        .await;

        ReadinessResponse::from_checks(results)
    }
}
