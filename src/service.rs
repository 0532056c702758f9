//! Async facade over the view builder.
//!
//! Snapshot acquisition is the only I/O. It is bounded by the configured
//! timeout; the builds themselves run on the blocking pool against a shared
//! `Arc<Snapshot>`.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{Result, SnapshotError};
use crate::snapshot::{Snapshot, SnapshotProvider};
use crate::views::{self, RoleView, ViewRequest};

pub struct ViewService {
    provider: Arc<dyn SnapshotProvider>,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl ViewService {
    pub fn new(
        provider: Arc<dyn SnapshotProvider>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build one view from a fresh snapshot.
    pub async fn view(&self, request: ViewRequest) -> Result<RoleView> {
        let snapshot = self.acquire().await?;
        self.build_on_pool(snapshot, request).await
    }

    /// Build several views from one snapshot, concurrently.
    ///
    /// Results come back in request order. A failed acquisition fails every
    /// request.
    pub async fn views(&self, requests: Vec<ViewRequest>) -> Result<Vec<Result<RoleView>>> {
        let snapshot = self.acquire().await?;
        let builds = requests
            .into_iter()
            .map(|request| self.build_on_pool(Arc::clone(&snapshot), request));
        Ok(join_all(builds).await)
    }

    async fn acquire(&self) -> Result<Arc<Snapshot>> {
        let limit = self.config.snapshot_timeout;
        match tokio::time::timeout(limit, self.provider.snapshot()).await {
            Ok(Ok(snapshot)) => {
                info!(
                    employees = snapshot.employees.len(),
                    records = snapshot.onboarding_records.len(),
                    "Snapshot acquired"
                );
                Ok(Arc::new(snapshot))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Snapshot acquisition failed");
                Err(e.into())
            }
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Snapshot acquisition timed out");
                Err(SnapshotError::Timeout(limit).into())
            }
        }
    }

    async fn build_on_pool(&self, snapshot: Arc<Snapshot>, request: ViewRequest) -> Result<RoleView> {
        let now = self.clock.now();
        let config = Arc::clone(&self.config);
        let role = request.role;
        let view =
            tokio::task::spawn_blocking(move || views::build(&request, &snapshot, now, &config))
                .await??;
        info!(%role, anomalies = view.anomalies().len(), "View served");
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::clock::FixedClock;
    use crate::error::{Error, ViewError};
    use crate::onboarding::{Employee, OnboardingRecord, Role};
    use crate::snapshot::StaticProvider;

    struct SlowProvider;

    #[async_trait]
    impl SnapshotProvider for SlowProvider {
        async fn snapshot(&self) -> std::result::Result<Snapshot, SnapshotError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Snapshot::default())
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2023, 10, 9, 12, 0, 0).unwrap()))
    }

    fn snapshot() -> Snapshot {
        let hired = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        Snapshot {
            employees: vec![Employee::new("e1", "Emily Davis", Role::Employee, hired)],
            onboarding_records: vec![OnboardingRecord::start(
                "e1",
                Utc.with_ymd_and_hms(2023, 9, 1, 9, 0, 0).unwrap(),
            )],
            ..Snapshot::default()
        }
    }

    fn service(provider: Arc<dyn SnapshotProvider>, config: EngineConfig) -> ViewService {
        ViewService::new(provider, clock(), config)
    }

    #[tokio::test]
    async fn view_builds_from_provider() {
        let svc = service(Arc::new(StaticProvider::new(snapshot())), EngineConfig::default());
        let view = svc.view(ViewRequest::new(Role::Employee, "e1")).await.unwrap();
        let RoleView::Employee(view) = view else {
            panic!("expected employee view");
        };
        assert_eq!(view.name, "Emily Davis");
        assert_eq!(view.days_in_stage, 38);
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let config = EngineConfig {
            snapshot_timeout: Duration::from_millis(20),
            ..EngineConfig::default()
        };
        let svc = service(Arc::new(SlowProvider), config);
        let err = svc.view(ViewRequest::new(Role::Hr, "hr")).await.unwrap_err();
        assert!(matches!(err, Error::Snapshot(SnapshotError::Timeout(_))));
    }

    #[tokio::test]
    async fn views_keep_request_order() {
        let svc = service(Arc::new(StaticProvider::new(snapshot())), EngineConfig::default());
        let results = svc
            .views(vec![
                ViewRequest::new(Role::Hr, "hr"),
                ViewRequest::new(Role::Supervisor, "ghost"),
                ViewRequest::new(Role::Employee, "e1"),
            ])
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Ok(RoleView::Hr(_))));
        assert!(matches!(
            &results[1],
            Err(Error::View(ViewError::UnknownRequester { id })) if id == "ghost"
        ));
        assert!(matches!(results[2], Ok(RoleView::Employee(_))));
    }
}
