//! Dialog handling for browser-driven scenarios.
//!
//! A scenario arms a one-shot handler for the dialog it expects *before* the
//! action that raises it. Dialogs arriving with nothing armed, or of a
//! different type than the armed one, are dismissed and recorded as
//! unexpected.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogType {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// Action taken on a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    /// Dialog was accepted (OK/Yes/Leave)
    Accept,
    /// Dialog was accepted with input text (for prompts)
    AcceptWith(String),
    /// Dialog was dismissed (Cancel/No/Stay)
    Dismiss,
    /// Dialog is pending (not yet handled)
    Pending,
}

impl DialogAction {
    /// Whether the action accepts the dialog
    #[must_use]
    pub const fn is_accept(&self) -> bool {
        matches!(self, Self::Accept | Self::AcceptWith(_))
    }
}

/// Represents a browser dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialog {
    dialog_type: DialogType,
    message: String,
    action: DialogAction,
}

impl Dialog {
    /// Create a new dialog
    #[must_use]
    pub fn new(dialog_type: DialogType, message: impl Into<String>) -> Self {
        Self {
            dialog_type,
            message: message.into(),
            action: DialogAction::Pending,
        }
    }

    /// Create a confirm dialog
    #[must_use]
    pub fn confirm(message: impl Into<String>) -> Self {
        Self::new(DialogType::Confirm, message)
    }

    /// Get dialog type
    #[must_use]
    pub fn dialog_type(&self) -> DialogType {
        self.dialog_type
    }

    /// Get dialog message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get action taken
    #[must_use]
    pub fn action(&self) -> &DialogAction {
        &self.action
    }

    /// Check if dialog was handled
    #[must_use]
    pub fn is_handled(&self) -> bool {
        !matches!(self.action, DialogAction::Pending)
    }

    /// Whether the dialog ended up accepted
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.action.is_accept()
    }

    /// Apply an action to the dialog
    pub fn resolve(&mut self, action: DialogAction) {
        self.action = action;
    }
}

/// What to do with dialogs nobody armed a handler for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AutoDialogBehavior {
    /// Accept unexpected dialogs
    AcceptAll,
    /// Dismiss unexpected dialogs
    #[default]
    DismissAll,
}

#[derive(Debug, Clone)]
struct ArmedHandler {
    id: u64,
    expected: DialogType,
    action: DialogAction,
}

#[derive(Debug, Default)]
struct HandlerState {
    next_id: u64,
    armed: Option<ArmedHandler>,
    fired: Vec<(u64, Dialog)>,
    mismatched: Vec<(u64, Dialog)>,
    unexpected: Vec<Dialog>,
    auto_behavior: AutoDialogBehavior,
}

/// Shared dialog handler for one browser context.
///
/// Cloning yields another handle to the same state, so a driver can feed
/// dialogs from its event loop while the scenario awaits the outcome.
#[derive(Clone, Default)]
pub struct DialogHandler {
    state: Arc<Mutex<HandlerState>>,
}

impl DialogHandler {
    /// Create a new dialog handler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set behaviour for unexpected dialogs
    pub fn set_auto_behavior(&self, behavior: AutoDialogBehavior) {
        if let Ok(mut state) = self.state.lock() {
            state.auto_behavior = behavior;
        }
    }

    /// Arm a one-shot handler for the next dialog.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if another handler is still armed.
    pub fn arm(&self, expected: DialogType, action: DialogAction) -> ProbeResult<DialogExpectation> {
        let mut state = self.state.lock().map_err(|_| ProbeError::InvalidState {
            message: "dialog handler poisoned".to_string(),
        })?;
        if let Some(ref armed) = state.armed {
            return Err(ProbeError::InvalidState {
                message: format!("a {} handler is already armed", armed.expected),
            });
        }
        state.next_id += 1;
        let id = state.next_id;
        state.armed = Some(ArmedHandler {
            id,
            expected,
            action,
        });
        tracing::debug!(%expected, id, "armed dialog handler");
        Ok(DialogExpectation {
            id,
            expected,
            handler: self.clone(),
        })
    }

    /// Handle an incoming dialog and return it with its action resolved
    pub fn handle(&self, mut dialog: Dialog) -> Dialog {
        let Ok(mut state) = self.state.lock() else {
            dialog.resolve(DialogAction::Dismiss);
            return dialog;
        };

        if let Some(armed) = state.armed.take() {
            if armed.expected == dialog.dialog_type() {
                dialog.resolve(armed.action);
                tracing::debug!(kind = %dialog.dialog_type(), id = armed.id, "dialog handled");
                state.fired.push((armed.id, dialog.clone()));
            } else {
                dialog.resolve(DialogAction::Dismiss);
                tracing::warn!(
                    expected = %armed.expected,
                    actual = %dialog.dialog_type(),
                    "dialog type mismatch, dismissed"
                );
                state.mismatched.push((armed.id, dialog.clone()));
            }
            return dialog;
        }

        let action = match state.auto_behavior {
            AutoDialogBehavior::AcceptAll => DialogAction::Accept,
            AutoDialogBehavior::DismissAll => DialogAction::Dismiss,
        };
        dialog.resolve(action);
        tracing::warn!(
            kind = %dialog.dialog_type(),
            message = dialog.message(),
            "unexpected dialog with no armed handler"
        );
        state.unexpected.push(dialog.clone());
        dialog
    }

    /// Whether a handler is currently armed
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state.lock().map(|s| s.armed.is_some()).unwrap_or(false)
    }

    /// Dialogs handled by armed handlers
    #[must_use]
    pub fn handled(&self) -> Vec<Dialog> {
        self.state
            .lock()
            .map(|s| s.fired.iter().map(|(_, d)| d.clone()).collect())
            .unwrap_or_default()
    }

    /// Dialogs that arrived with nothing armed
    #[must_use]
    pub fn unexpected(&self) -> Vec<Dialog> {
        self.state
            .lock()
            .map(|s| s.unexpected.clone())
            .unwrap_or_default()
    }

    /// Total dialogs seen by this handler
    #[must_use]
    pub fn dialog_count(&self) -> usize {
        self.state
            .lock()
            .map(|s| s.fired.len() + s.mismatched.len() + s.unexpected.len())
            .unwrap_or(0)
    }

    fn outcome(&self, id: u64) -> Option<Result<Dialog, Dialog>> {
        let state = self.state.lock().ok()?;
        if let Some((_, d)) = state.fired.iter().find(|(i, _)| *i == id) {
            return Some(Ok(d.clone()));
        }
        state
            .mismatched
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, d)| Err(d.clone()))
    }

    fn disarm(&self, id: u64) {
        if let Ok(mut state) = self.state.lock() {
            if state.armed.as_ref().is_some_and(|a| a.id == id) {
                state.armed = None;
            }
        }
    }
}

impl std::fmt::Debug for DialogHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogHandler")
            .field("dialog_count", &self.dialog_count())
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// Outcome handle for an armed dialog handler
#[derive(Debug)]
pub struct DialogExpectation {
    id: u64,
    expected: DialogType,
    handler: DialogHandler,
}

impl DialogExpectation {
    /// Expected dialog type
    #[must_use]
    pub const fn expected(&self) -> DialogType {
        self.expected
    }

    /// The handled dialog, if the handler already fired
    #[must_use]
    pub fn dialog(&self) -> Option<Dialog> {
        self.handler.outcome(self.id).and_then(Result::ok)
    }

    /// Disarm the handler if it has not fired yet
    pub fn cancel(self) {
        self.handler.disarm(self.id);
    }

    /// Wait until the armed handler fires.
    ///
    /// On timeout the handler is disarmed so a late dialog is treated as
    /// unexpected.
    ///
    /// # Errors
    ///
    /// `UnexpectedDialog` if a dialog of another type consumed the handler,
    /// `AssertionTimeout` if no dialog arrived in time.
    pub async fn wait(&self, timeout: Duration, poll_interval: Duration) -> ProbeResult<Dialog> {
        let start = Instant::now();
        loop {
            match self.handler.outcome(self.id) {
                Some(Ok(dialog)) => return Ok(dialog),
                Some(Err(dialog)) => {
                    return Err(ProbeError::UnexpectedDialog {
                        message: format!(
                            "expected {} dialog, got {} ({:?})",
                            self.expected,
                            dialog.dialog_type(),
                            dialog.message()
                        ),
                    })
                }
                None => {}
            }
            if start.elapsed() >= timeout {
                self.handler.disarm(self.id);
                return Err(ProbeError::AssertionTimeout {
                    expected: format!("{} dialog", self.expected),
                    actual: "no dialog opened".to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // =========================================================================
    // Dialog values
    // =========================================================================

    #[test]
    fn test_dialog_new_is_pending() {
        let dialog = Dialog::confirm("Remove blog?");
        assert_eq!(dialog.dialog_type(), DialogType::Confirm);
        assert_eq!(dialog.message(), "Remove blog?");
        assert!(!dialog.is_handled());
    }

    #[test]
    fn test_dialog_type_display() {
        assert_eq!(DialogType::Confirm.to_string(), "confirm");
        assert_eq!(DialogType::BeforeUnload.to_string(), "beforeunload");
    }

    #[test]
    fn test_accept_with_counts_as_accept() {
        let mut dialog = Dialog::new(DialogType::Prompt, "name?");
        dialog.resolve(DialogAction::AcceptWith("x".to_string()));
        assert!(dialog.is_accepted());
    }

    // =========================================================================
    // Armed handlers
    // =========================================================================

    #[test]
    fn test_armed_handler_fires_once() {
        let handler = DialogHandler::new();
        let expectation = handler
            .arm(DialogType::Confirm, DialogAction::Accept)
            .unwrap();
        assert!(handler.is_armed());

        let first = handler.handle(Dialog::confirm("Remove blog?"));
        assert!(first.is_accepted());
        assert!(!handler.is_armed());
        assert_eq!(expectation.dialog().unwrap().message(), "Remove blog?");

        let second = handler.handle(Dialog::confirm("again?"));
        assert_eq!(second.action(), &DialogAction::Dismiss);
        assert_eq!(handler.handled().len(), 1);
        assert_eq!(handler.unexpected().len(), 1);
    }

    #[test]
    fn test_double_arm_is_rejected() {
        let handler = DialogHandler::new();
        let _first = handler
            .arm(DialogType::Confirm, DialogAction::Accept)
            .unwrap();
        let second = handler.arm(DialogType::Confirm, DialogAction::Accept);
        assert!(matches!(second, Err(ProbeError::InvalidState { .. })));
    }

    #[test]
    fn test_unarmed_dialog_is_dismissed_by_default() {
        let handler = DialogHandler::new();
        let dialog = handler.handle(Dialog::confirm("Remove blog?"));
        assert_eq!(dialog.action(), &DialogAction::Dismiss);
        assert_eq!(handler.unexpected().len(), 1);
    }

    #[test]
    fn test_auto_accept_behavior() {
        let handler = DialogHandler::new();
        handler.set_auto_behavior(AutoDialogBehavior::AcceptAll);
        let dialog = handler.handle(Dialog::new(DialogType::Alert, "hi"));
        assert!(dialog.is_accepted());
    }

    #[test]
    fn test_cancel_allows_rearm() {
        let handler = DialogHandler::new();
        let expectation = handler
            .arm(DialogType::Confirm, DialogAction::Accept)
            .unwrap();
        expectation.cancel();
        assert!(!handler.is_armed());
        assert!(handler.arm(DialogType::Confirm, DialogAction::Dismiss).is_ok());
    }

    #[tokio::test]
    async fn test_wait_reports_type_mismatch() {
        let handler = DialogHandler::new();
        let expectation = handler
            .arm(DialogType::Confirm, DialogAction::Accept)
            .unwrap();
        let dialog = handler.handle(Dialog::new(DialogType::Alert, "surprise"));
        assert_eq!(dialog.action(), &DialogAction::Dismiss);

        let err = expectation
            .wait(Duration::from_millis(50), Duration::from_millis(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::UnexpectedDialog { .. }));
    }

    #[tokio::test]
    async fn test_wait_times_out_and_disarms() {
        let handler = DialogHandler::new();
        let expectation = handler
            .arm(DialogType::Confirm, DialogAction::Accept)
            .unwrap();
        let err = expectation
            .wait(Duration::from_millis(30), Duration::from_millis(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::AssertionTimeout { .. }));
        assert!(!handler.is_armed());
    }

    #[tokio::test]
    async fn test_wait_sees_dialog_from_other_task() {
        let handler = DialogHandler::new();
        let expectation = handler
            .arm(DialogType::Confirm, DialogAction::Accept)
            .unwrap();
        let feeder = handler.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            feeder.handle(Dialog::confirm("Remove blog?"));
        });
        let dialog = expectation
            .wait(Duration::from_secs(2), Duration::from_millis(5))
            .await
            .unwrap();
        assert!(dialog.is_accepted());
    }
}
