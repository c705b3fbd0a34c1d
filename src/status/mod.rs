//! Status reporting on the interactive thread.
//!
//! Workers never touch a [`StatusSink`]. They send [`UiEvent`]s over a
//! channel, and the interactive side drives a [`StatusPump`], which is the
//! only caller of the sink. Sinks therefore need neither `Send` nor `Sync`.

use tokio::sync::mpsc;

use crate::download::{DownloadOutcome, Phase};

/// UI surface receiving pipeline state. Interactive thread only.
pub trait StatusSink {
    fn update(&mut self, text: &str);

    fn set_busy(&mut self, busy: bool);

    fn show_dialog(&mut self, title: &str, message: &str);

    fn phase_changed(&mut self, _phase: &Phase) {}

    fn progress(&mut self, _done: u64, _total: Option<u64>) {}
}

/// Event marshaled from a worker to the interactive thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Busy(bool),
    Phase(Phase),
    Progress { done: u64, total: Option<u64> },
    Finished(DownloadOutcome),
}

/// Receiving end of the worker-to-UI channel.
pub struct StatusPump {
    rx: mpsc::UnboundedReceiver<UiEvent>,
}

impl StatusPump {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<UiEvent>) -> Self {
        Self { rx }
    }

    /// Deliver one event to `sink`.
    pub fn dispatch(sink: &mut dyn StatusSink, event: &UiEvent) {
        match event {
            UiEvent::Busy(busy) => sink.set_busy(*busy),
            UiEvent::Phase(phase) => sink.phase_changed(phase),
            UiEvent::Progress { done, total } => sink.progress(*done, *total),
            UiEvent::Finished(outcome) => {
                sink.update(&outcome.status_text());
                sink.show_dialog(outcome.dialog_title(), &outcome.dialog_message());
                sink.set_busy(false);
            }
        }
    }

    /// Deliver whatever is queued without waiting. Returns the number of events.
    pub fn drain(&mut self, sink: &mut dyn StatusSink) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.rx.try_recv() {
            Self::dispatch(sink, &event);
            delivered += 1;
        }
        delivered
    }

    /// Deliver events until the next terminal outcome and return it.
    ///
    /// Returns `None` once every coordinator handle is gone.
    pub async fn run_until_finished(&mut self, sink: &mut dyn StatusSink) -> Option<DownloadOutcome> {
        while let Some(event) = self.rx.recv().await {
            Self::dispatch(sink, &event);
            if let UiEvent::Finished(outcome) = event {
                return Some(outcome);
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Sink recording every call, for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub updates: Vec<String>,
        pub busy: Vec<bool>,
        pub dialogs: Vec<(String, String)>,
        pub phases: Vec<Phase>,
        pub progress: Vec<(u64, Option<u64>)>,
    }

    impl StatusSink for RecordingSink {
        fn update(&mut self, text: &str) {
            self.updates.push(text.to_string());
        }

        fn set_busy(&mut self, busy: bool) {
            self.busy.push(busy);
        }

        fn show_dialog(&mut self, title: &str, message: &str) {
            self.dialogs.push((title.to_string(), message.to_string()));
        }

        fn phase_changed(&mut self, phase: &Phase) {
            self.phases.push(phase.clone());
        }

        fn progress(&mut self, done: u64, total: Option<u64>) {
            self.progress.push((done, total));
        }
    }
}
