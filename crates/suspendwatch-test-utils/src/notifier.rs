use async_trait::async_trait;
use parking_lot::Mutex;
use suspendwatch_notify::{Notifier, NotifyError};
use suspendwatch_types::ChangeEvent;

/// Records every delivered event.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
