//! Notification dispatcher contract.
//!
//! Invoked after a successful status transition. Implementations must be
//! fire-and-forget: failures are logged, never block and never reverse the
//! transition.

use monteo_types::event::StatusChangeEvent;

pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        event: StatusChangeEvent,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Dispatcher that drops events; useful in tests and minimal deployments.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn notify(&self, _event: StatusChangeEvent) {}
}
