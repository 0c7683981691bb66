#![forbid(unsafe_code)]

//! Threaded driver for one [`AvailabilityField`].
//!
//! Each issued check runs on its own worker thread and sends its
//! [`CheckCompletion`] back over a channel; the loop applies completions on
//! the owning thread, so the field itself is never shared. Worker handles
//! are reaped as they finish. A panicked worker is logged and its check is
//! later settled by the request timeout.
//!
//! Unmounting (or dropping the loop) abandons running workers without
//! joining them: their results are discarded by the guard or, once the
//! receiver is gone, never delivered.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use availcheck_core::{CheckError, CheckSequence, FieldKind};

use crate::client::{AvailabilityBackend, CheckCompletion, CheckRequest};
use crate::config::FieldConfig;
use crate::field::{AvailabilityField, FieldError, InputOutcome};
use crate::state::{AvailabilityHandle, Status};

/// Runs an [`AvailabilityField`] against a blocking backend.
pub struct FieldLoop<B: AvailabilityBackend + 'static> {
    field: AvailabilityField,
    backend: Arc<B>,
    sender: mpsc::Sender<CheckCompletion>,
    receiver: mpsc::Receiver<CheckCompletion>,
    workers: Vec<JoinHandle<()>>,
}

impl<B: AvailabilityBackend + 'static> FieldLoop<B> {
    /// Mount a field of `kind` backed by `backend`.
    pub fn new(kind: FieldKind, config: FieldConfig, backend: B) -> Self {
        Self::with_shared_backend(kind, config, Arc::new(backend))
    }

    /// Mount a field that shares `backend` with other fields.
    pub fn with_shared_backend(kind: FieldKind, config: FieldConfig, backend: Arc<B>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            field: AvailabilityField::new(kind, config),
            backend,
            sender,
            receiver,
            workers: Vec::new(),
        }
    }

    /// Feed a keystroke.
    pub fn keystroke(&mut self, value: impl Into<String>) -> InputOutcome {
        self.field.input(value)
    }

    /// Accept an offered suggestion; its check starts immediately.
    pub fn select_suggestion(&mut self, suggestion: &str) -> Result<CheckSequence, FieldError> {
        let request = self.field.select_suggestion(suggestion)?;
        let sequence = request.sequence;
        self.spawn(request);
        Ok(sequence)
    }

    /// Apply arrived completions, fire due timers, and reap workers.
    ///
    /// Never blocks. Returns the number of completions received.
    pub fn pump(&mut self) -> usize {
        let mut received = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            self.deliver(completion);
            received += 1;
        }
        if let Some(request) = self.field.tick() {
            self.spawn(request);
        }
        self.reap_finished_workers();
        received
    }

    /// Pump until the field has nothing pending or `max` elapses.
    ///
    /// Sleeps on the completion channel between timer deadlines.
    pub fn run_until_settled(&mut self, max: Duration) -> Status {
        let deadline = Instant::now() + max;
        loop {
            self.pump();
            if self.is_quiescent() {
                return self.field.status();
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(
                    kind = self.field.kind().as_str(),
                    status = self.field.status().as_str(),
                    "field did not settle in time"
                );
                return self.field.status();
            }

            let wake = self
                .field
                .next_wakeup()
                .map_or(deadline, |at| at.min(deadline));
            match self
                .receiver
                .recv_timeout(wake.saturating_duration_since(now))
            {
                Ok(completion) => self.deliver(completion),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                // The loop holds a sender, so this cannot happen while it lives.
                Err(mpsc::RecvTimeoutError::Disconnected) => return self.field.status(),
            }
        }
    }

    /// Unmount the field and abandon running workers.
    pub fn unmount(&mut self) {
        self.field.unmount();
        let abandoned = self.workers.len();
        self.workers.clear();
        if abandoned > 0 {
            tracing::debug!(abandoned, "availability workers abandoned");
        }
    }

    /// Check if no timer is armed and no check is awaited.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        !self.field.is_debouncing() && self.field.status() != Status::Checking
    }

    /// Reactive snapshot.
    #[must_use]
    pub fn handle(&self) -> AvailabilityHandle {
        self.field.handle()
    }

    /// External status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.field.status()
    }

    /// The driven field.
    #[must_use]
    pub fn field(&self) -> &AvailabilityField {
        &self.field
    }

    /// Number of workers not yet reaped.
    #[must_use]
    pub fn running_workers(&self) -> usize {
        self.workers.len()
    }

    fn deliver(&mut self, completion: CheckCompletion) {
        let sequence = completion.sequence;
        let decision = self.field.apply(completion);
        tracing::trace!(
            sequence = sequence.raw(),
            decision = decision.as_str(),
            "completion delivered"
        );
    }

    fn spawn(&mut self, request: CheckRequest) {
        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();
        let sequence = request.sequence;
        let worker = request.clone();
        let spawned = thread::Builder::new()
            .name(format!("availcheck-{}", sequence.raw()))
            .spawn(move || {
                let completion = worker.execute(&*backend);
                let _ = sender.send(completion);
            });
        match spawned {
            Ok(handle) => self.workers.push(handle),
            Err(err) => {
                tracing::error!(
                    sequence = sequence.raw(),
                    "failed to spawn availability worker: {err}"
                );
                let failed = request.complete_with(
                    Err(CheckError::Transport(err.to_string())),
                    Duration::ZERO,
                );
                self.deliver(failed);
            }
        }
    }

    fn reap_finished_workers(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        let mut remaining = Vec::with_capacity(self.workers.len());
        for handle in self.workers.drain(..) {
            if handle.is_finished() {
                if let Err(payload) = handle.join() {
                    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                        (*s).to_owned()
                    } else if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "unknown panic payload".to_owned()
                    };
                    tracing::error!("availability worker panicked: {msg}");
                }
            } else {
                remaining.push(handle);
            }
        }
        self.workers = remaining;
    }
}

impl<B: AvailabilityBackend + 'static> Drop for FieldLoop<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<B: AvailabilityBackend + 'static> std::fmt::Debug for FieldLoop<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldLoop")
            .field("field", &self.field)
            .field("backend", &self.backend.name())
            .field("workers", &self.workers.len())
            .finish()
    }
}
