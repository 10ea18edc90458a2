use crate::{Notifier, NotifyError};
use async_trait::async_trait;
use std::sync::Arc;
use suspendwatch_types::ChangeEvent;

/// Fans an event out to several sinks in order, stopping at the first error.
#[derive(Default)]
pub struct MultiNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl MultiNotifier {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    pub fn push(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        for notifier in &self.notifiers {
            notifier.notify(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use suspendwatch_types::{ResourceReference, ResourceType};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Counting {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl Notifier for Counting {
        async fn notify(&self, _event: &ChangeEvent) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(NotifyError::Status {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(())
        }
    }

    fn event() -> ChangeEvent {
        ChangeEvent {
            resource: ResourceReference::new(
                ResourceType::new("source.toolkit.fluxcd.io", "v1", "gitrepositories"),
                "flux-system",
                "repo",
            ),
            suspended: true,
            acting_principal: "a@b".to_string(),
            cluster_context_id: "proj".to_string(),
        }
    }

    #[tokio::test]
    async fn test_delivers_to_all() {
        let (a, b) = (Counting::new(false), Counting::new(false));
        let multi = MultiNotifier::new(vec![a.clone() as Arc<dyn Notifier>, b.clone()]);

        multi.notify(&event()).await.unwrap();

        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_error() {
        let (a, b, c) = (Counting::new(false), Counting::new(true), Counting::new(false));
        let multi = MultiNotifier::new(vec![a.clone() as Arc<dyn Notifier>, b.clone(), c.clone()]);

        assert!(multi.notify(&event()).await.is_err());
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_is_noop() {
        let multi = MultiNotifier::default();
        assert!(multi.is_empty());
        multi.notify(&event()).await.unwrap();
    }
}
