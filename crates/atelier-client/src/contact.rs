//! Contact form state machine.
//!
//! ```text
//! idle --submit--> submitting --ok--> success --(reset delay)--> idle
//!                             --err-> error --submit--> submitting
//! ```
//!
//! A submit while a submission is in flight does nothing. After a success
//! the fields are cleared once the reset delay elapses, and an externally
//! attached subject tag is released through the removal callback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use atelier_shared::constants::{
    MSG_FORM_HANDOFF, MSG_FORM_RETRY, MSG_FORM_SUBMITTING, MSG_FORM_SUCCESS,
};
use atelier_shared::{ContactSubmission, Variant};

use crate::error::ClientError;
use crate::strategy::{Delivery, SubmissionStrategy};

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Badge set from outside the form (e.g. a clicked portfolio item).
    pub subject_tag: Option<String>,
}

impl FormFields {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    HandedOff { link: String },
    Failed { message: String },
    /// A submission from this form is already in flight.
    AlreadySubmitting,
    /// Name, email or message is blank.
    Incomplete,
}

#[derive(Debug, Default)]
struct FormState {
    fields: FormFields,
    phase: FormPhase,
    error: Option<String>,
    handoff_link: Option<String>,
}

type RemovalCallback = Arc<dyn Fn() + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clones share the same form.
#[derive(Clone)]
pub struct ContactForm {
    state: Arc<Mutex<FormState>>,
    strategy: Arc<dyn SubmissionStrategy>,
    variant: Variant,
    reset_delay: Duration,
    runtime: Option<Handle>,
    on_subject_removed: Option<RemovalCallback>,
    reset_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ContactForm {
    pub fn new(strategy: Arc<dyn SubmissionStrategy>, variant: Variant) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState::default())),
            strategy,
            variant,
            reset_delay: DEFAULT_RESET_DELAY,
            runtime: Handle::try_current().ok(),
            on_subject_removed: None,
            reset_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    /// Run the post-success reset timer on `runtime` instead of the one
    /// current at construction.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Called whenever the subject tag is dropped, by the visitor or by the
    /// post-success reset.
    pub fn on_subject_removed<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_subject_removed = Some(Arc::new(callback));
        self
    }

    pub fn set_name(&self, value: impl Into<String>) {
        lock(&self.state).fields.name = value.into();
    }

    pub fn set_email(&self, value: impl Into<String>) {
        lock(&self.state).fields.email = value.into();
    }

    pub fn set_message(&self, value: impl Into<String>) {
        lock(&self.state).fields.message = value.into();
    }

    pub fn set_subject_tag(&self, tag: impl Into<String>) {
        let tag = tag.into();
        lock(&self.state).fields.subject_tag = (!tag.trim().is_empty()).then_some(tag);
    }

    /// Drop the subject tag badge. Returns `false` when there was none.
    pub fn remove_subject_tag(&self) -> bool {
        let removed = lock(&self.state).fields.subject_tag.take().is_some();
        if removed {
            self.notify_subject_removed();
        }
        removed
    }

    pub fn fields(&self) -> FormFields {
        lock(&self.state).fields.clone()
    }

    pub fn phase(&self) -> FormPhase {
        lock(&self.state).phase
    }

    pub fn handoff_link(&self) -> Option<String> {
        lock(&self.state).handoff_link.clone()
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        let state = lock(&self.state);
        state.phase != FormPhase::Submitting && state.fields.is_complete()
    }

    /// Localised status line for the current phase.
    pub fn status_message(&self) -> Option<String> {
        let state = lock(&self.state);
        match state.phase {
            FormPhase::Idle => None,
            FormPhase::Submitting => Some(MSG_FORM_SUBMITTING.to_string()),
            FormPhase::Success if state.handoff_link.is_some() => {
                Some(MSG_FORM_HANDOFF.to_string())
            }
            FormPhase::Success => Some(MSG_FORM_SUCCESS.to_string()),
            FormPhase::Error => Some(
                state
                    .error
                    .clone()
                    .unwrap_or_else(|| MSG_FORM_RETRY.to_string()),
            ),
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let submission = {
            let mut state = lock(&self.state);
            if state.phase == FormPhase::Submitting {
                debug!("Submit ignored, submission already in flight");
                return SubmitOutcome::AlreadySubmitting;
            }
            if !state.fields.is_complete() {
                return SubmitOutcome::Incomplete;
            }
            state.phase = FormPhase::Submitting;
            state.error = None;
            state.handoff_link = None;
            self.build_submission(&state.fields)
        };
        self.cancel_reset();

        let strategy = self.strategy.name();
        let result = self.strategy.submit(&submission).await;

        let outcome = {
            let mut state = lock(&self.state);
            match result {
                Ok(delivery) => {
                    state.phase = FormPhase::Success;
                    match delivery {
                        Delivery::Sent { .. } => {
                            info!(strategy, "Contact form submitted");
                            SubmitOutcome::Sent
                        }
                        Delivery::Handoff { link } => {
                            info!(strategy, "Contact form handed off to mail client");
                            state.handoff_link = Some(link.clone());
                            SubmitOutcome::HandedOff { link }
                        }
                    }
                }
                Err(e) => {
                    warn!(strategy, error = %e, "Contact form submission failed");
                    let message = failure_message(&e);
                    state.phase = FormPhase::Error;
                    state.error = Some(message.clone());
                    SubmitOutcome::Failed { message }
                }
            }
        };

        if self.phase() == FormPhase::Success {
            self.schedule_reset();
        }
        outcome
    }

    fn build_submission(&self, fields: &FormFields) -> ContactSubmission {
        ContactSubmission {
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            message: fields.message.clone(),
            selected_subjects: fields.subject_tag.iter().cloned().collect(),
            variant: self.variant,
        }
    }

    fn schedule_reset(&self) {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            warn!("No tokio runtime available, contact form will not reset");
            return;
        };
        let form = self.clone();
        let delay = self.reset_delay;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            form.reset_after_success();
        });
        if let Some(previous) = lock(&self.reset_task).replace(handle) {
            previous.abort();
        }
    }

    fn cancel_reset(&self) {
        if let Some(handle) = lock(&self.reset_task).take() {
            handle.abort();
        }
    }

    fn reset_after_success(&self) {
        let had_tag = {
            let mut state = lock(&self.state);
            if state.phase != FormPhase::Success {
                return;
            }
            let had_tag = state.fields.subject_tag.is_some();
            *state = FormState::default();
            had_tag
        };
        debug!("Contact form reset");
        if had_tag {
            self.notify_subject_removed();
        }
    }

    fn notify_subject_removed(&self) {
        if let Some(callback) = &self.on_subject_removed {
            callback();
        }
    }
}

/// Server-provided messages are already user-facing; anything else gets
/// the generic retry text.
fn failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
        _ => MSG_FORM_RETRY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::error::Result;
    use crate::strategy::MailtoSubmission;

    #[derive(Default)]
    struct FakeStrategy {
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
        reject_with: Option<String>,
        last: Mutex<Option<ContactSubmission>>,
    }

    #[async_trait]
    impl SubmissionStrategy for FakeStrategy {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn submit(&self, submission: &ContactSubmission) -> Result<Delivery> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(submission.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reject_with {
                Some(message) => Err(ClientError::Rejected {
                    status: 500,
                    message: message.clone(),
                    details: None,
                }),
                None => Ok(Delivery::Sent {
                    message: "ok".into(),
                }),
            }
        }
    }

    fn filled(form: &ContactForm) {
        form.set_name("Anna");
        form.set_email("a@b.de");
        form.set_message("Hallo");
    }

    #[tokio::test]
    async fn test_incomplete_form_cannot_submit() {
        let strategy = Arc::new(FakeStrategy::default());
        let form = ContactForm::new(strategy.clone(), Variant::Art);
        form.set_name("Anna");
        form.set_message("Hallo");

        assert!(!form.can_submit());
        assert_eq!(form.submit().await, SubmitOutcome::Incomplete);
        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_then_reset() {
        let strategy = Arc::new(FakeStrategy::default());
        let removed = Arc::new(AtomicUsize::new(0));
        let r = removed.clone();
        let form = ContactForm::new(strategy.clone(), Variant::Photography)
            .on_subject_removed(move || {
                r.fetch_add(1, Ordering::SeqCst);
            });
        filled(&form);
        form.set_subject_tag("Porträt");

        assert_eq!(form.submit().await, SubmitOutcome::Sent);
        assert_eq!(form.phase(), FormPhase::Success);
        assert_eq!(form.status_message().as_deref(), Some(MSG_FORM_SUCCESS));

        let sent = strategy.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.subject_line(), "Fotografie Anfrage - Porträt - Anna");

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(form.phase(), FormPhase::Success);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.fields(), FormFields::default());
        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_noop() {
        let gate = Arc::new(Notify::new());
        let strategy = Arc::new(FakeStrategy {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let form = ContactForm::new(strategy.clone(), Variant::UxUi);
        filled(&form);

        let first = {
            let form = form.clone();
            tokio::spawn(async move { form.submit().await })
        };
        while form.phase() != FormPhase::Submitting {
            tokio::task::yield_now().await;
        }

        assert!(!form.can_submit());
        assert_eq!(form.submit().await, SubmitOutcome::AlreadySubmitting);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Sent);
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_runs_on_construction_runtime() {
        let form = ContactForm::new(
            Arc::new(MailtoSubmission::new("kontakt@atelier.example")),
            Variant::Art,
        );
        filled(&form);

        // Submitted from a thread with its own short-lived runtime.
        let ui = form.clone();
        std::thread::spawn(move || {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(ui.submit())
        })
        .join()
        .unwrap();
        assert_eq!(form.phase(), FormPhase::Success);

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.fields(), FormFields::default());
    }

    #[tokio::test]
    async fn test_failure_then_resubmit() {
        let strategy = Arc::new(FakeStrategy {
            reject_with: Some("Fehler beim Senden der E-Mail".into()),
            ..Default::default()
        });
        let form = ContactForm::new(strategy.clone(), Variant::Art);
        filled(&form);

        let outcome = form.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "Fehler beim Senden der E-Mail".into()
            }
        );
        assert_eq!(form.phase(), FormPhase::Error);
        assert_eq!(form.fields().name, "Anna");
        assert!(form.can_submit());

        form.submit().await;
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_network_failure_message_is_generic() {
        let err = ClientError::NoConfigDir;
        assert_eq!(failure_message(&err), MSG_FORM_RETRY);
        let err = ClientError::Rejected {
            status: 400,
            message: "Name, E-Mail und Nachricht sind erforderlich".into(),
            details: None,
        };
        assert_eq!(
            failure_message(&err),
            "Name, E-Mail und Nachricht sind erforderlich"
        );
    }

    #[tokio::test]
    async fn test_remove_subject_tag_calls_back() {
        let removed = Arc::new(AtomicUsize::new(0));
        let r = removed.clone();
        let form = ContactForm::new(Arc::new(FakeStrategy::default()), Variant::Art)
            .on_subject_removed(move || {
                r.fetch_add(1, Ordering::SeqCst);
            });

        assert!(!form.remove_subject_tag());
        form.set_subject_tag("Logo");
        assert!(form.remove_subject_tag());
        assert_eq!(form.fields().subject_tag, None);
        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mailto_strategy_hands_off() {
        let form = ContactForm::new(
            Arc::new(MailtoSubmission::new("kontakt@atelier.example")),
            Variant::ContactSection,
        );
        filled(&form);

        let outcome = form.submit().await;
        let SubmitOutcome::HandedOff { link } = outcome else {
            panic!("expected handoff, got {outcome:?}");
        };
        assert!(link.starts_with("mailto:kontakt@atelier.example?subject=Kunst"));
        assert_eq!(form.handoff_link(), Some(link));
        assert_eq!(form.status_message().as_deref(), Some(MSG_FORM_HANDOFF));
    }
}
