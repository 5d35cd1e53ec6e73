use crate::config::ProgressSettings;
use crate::upload::{
    Delivery, Environment, FileSelectionError, Notification, SelectedFile, SimulatedProgress,
    Submission, TransferError, UploadForm,
};
use derivative::Derivative;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;
use tracing::{info, warn};

pub type UploadOutcome = Result<Delivery, TransferError>;
pub type FileLoad = Result<SelectedFile, FileSelectionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting {
        environment: Environment,
    },
    Succeeded,
    Failed,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct UploadState {
    pub form: UploadForm,
    pub phase: SubmissionPhase,
    pub progress: SimulatedProgress,
    pub notification: Option<Notification>,
    pub drop_hovered: bool,
    #[derivative(Debug = "ignore")]
    pub outcome_receiver: Option<Receiver<UploadOutcome>>,
    #[derivative(Debug = "ignore")]
    pub file_receiver: Option<Receiver<FileLoad>>,
}

impl Default for UploadState {
    fn default() -> Self {
        Self::new(ProgressSettings::default())
    }
}

impl UploadState {
    pub fn new(settings: ProgressSettings) -> Self {
        Self {
            form: UploadForm::default(),
            phase: SubmissionPhase::Idle,
            progress: SimulatedProgress::new(settings),
            notification: None,
            drop_hovered: false,
            outcome_receiver: None,
            file_receiver: None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Submitting { .. })
    }

    /// Whether the send button is enabled. A missing file is still reported
    /// on click rather than disabling the button.
    pub fn can_submit(&self) -> bool {
        !self.is_in_flight() && self.form.metadata_complete()
    }

    /// Replacing the file mid-flight only changes the form; the request
    /// already owns its own snapshot.
    pub fn select_file(&mut self, file: SelectedFile) {
        info!("Selected file '{}' ({} bytes)", file.name, file.size());
        self.form.file = Some(file);
    }

    pub fn reject_file(&mut self, err: &FileSelectionError) {
        warn!("File rejected: {}", err);
        self.notification = Some(Notification::file_rejected(err));
    }

    /// Drops of more than one file are refused as a whole.
    pub fn reject_multiple_files(&mut self, count: usize) {
        warn!("Rejected drop of {} files, only one is accepted", count);
        self.notification = Some(Notification::too_many_files(count));
    }

    pub fn is_loading_file(&self) -> bool {
        self.file_receiver.is_some()
    }

    /// Pick up a file read off the UI thread. A newer pick replaces the
    /// receiver, so only the latest read lands in the form.
    pub fn poll_file_load(&mut self) -> bool {
        let Some(receiver) = &self.file_receiver else {
            return false;
        };

        let loaded = match receiver.try_recv() {
            Ok(loaded) => loaded,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                warn!("File reader exited without a result");
                self.file_receiver = None;
                return true;
            }
        };

        self.file_receiver = None;
        match loaded {
            Ok(file) => self.select_file(file),
            Err(e) => self.reject_file(&e),
        }
        true
    }

    pub fn begin_submission(&mut self, now: Instant) -> Option<Submission> {
        if self.is_in_flight() {
            warn!("Upload already in progress, ignoring send request");
            return None;
        }

        match self.form.validate() {
            Ok(submission) => {
                self.phase = SubmissionPhase::Submitting {
                    environment: submission.environment,
                };
                self.progress.start(now);
                self.notification = None;
                Some(submission)
            }
            Err(e) => {
                warn!("Submission blocked: {}", e);
                self.notification = Some(Notification::validation_failed(&e));
                None
            }
        }
    }

    pub fn finish_submission(&mut self, outcome: UploadOutcome, now: Instant) {
        let SubmissionPhase::Submitting { environment } = self.phase else {
            warn!("Received upload outcome with no submission in flight");
            return;
        };

        self.outcome_receiver = None;
        self.progress.settle(now);

        match outcome {
            Ok(delivery) => {
                info!("Upload delivered to {} ({})", delivery.url, delivery.status);
                self.phase = SubmissionPhase::Succeeded;
                self.notification = Some(Notification::delivered(delivery.environment));
            }
            Err(e) => {
                warn!("Upload failed: {}", e);
                self.phase = SubmissionPhase::Failed;
                self.notification = Some(Notification::transfer_failed(&e, environment));
            }
        }
    }

    /// Pick up the worker's result if it has arrived. Returns true when the
    /// submission settled during this call.
    pub fn poll_outcome(&mut self, now: Instant) -> bool {
        let Some(receiver) = &self.outcome_receiver else {
            return false;
        };

        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(TransferError::Worker(
                "upload worker exited without a result".to_string(),
            )),
        };

        self.finish_submission(outcome, now);
        true
    }

    /// Return to idle once the settled progress bar has been shown long enough.
    pub fn tick(&mut self, now: Instant) {
        let settled = matches!(
            self.phase,
            SubmissionPhase::Succeeded | SubmissionPhase::Failed
        );
        if settled && self.progress.is_reset_due(now) {
            self.phase = SubmissionPhase::Idle;
            self.progress.reset();
        }
    }

    pub fn progress_value(&self, now: Instant) -> u8 {
        self.progress.value(now)
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebhookTargets;
    use crate::upload::{Month, NotificationKind, Region};
    use reqwest::StatusCode;
    use std::sync::mpsc;
    use std::time::Duration;

    fn file(name: &str) -> SelectedFile {
        SelectedFile::from_bytes(name, b"content".to_vec()).unwrap()
    }

    fn filled_state() -> UploadState {
        let mut state = UploadState::default();
        state.select_file(file("januar.xlsx"));
        state.form.set_year("2024");
        state.form.month = Some(Month::January);
        state.form.region = Some(Region::Berlin);
        state
    }

    fn delivered(environment: Environment) -> UploadOutcome {
        Ok(Delivery {
            environment,
            url: WebhookTargets::default().url_for(environment).to_string(),
            status: StatusCode::OK,
        })
    }

    #[test]
    fn test_missing_file_blocks_and_notifies() {
        let mut state = UploadState::default();
        state.form.set_year("2024");
        state.form.month = Some(Month::May);
        state.form.region = Some(Region::Bremen);

        assert!(state.can_submit());
        assert!(state.begin_submission(Instant::now()).is_none());
        assert_eq!(state.phase, SubmissionPhase::Idle);
        assert_eq!(state.progress_value(Instant::now()), 0);
        let note = state.notification.as_ref().unwrap();
        assert_eq!(note.title, "Keine Datei ausgewählt");
    }

    #[test]
    fn test_send_button_disabled_until_metadata_complete() {
        let mut state = UploadState::default();
        state.select_file(file("a.pdf"));
        assert!(!state.can_submit());
        state.form.set_year("2023");
        state.form.month = Some(Month::July);
        assert!(!state.can_submit());
        state.form.region = Some(Region::Saarland);
        assert!(state.can_submit());
    }

    #[test]
    fn test_second_send_while_in_flight_is_ignored() {
        let now = Instant::now();
        let mut state = filled_state();
        assert!(state.begin_submission(now).is_some());
        assert!(state.is_in_flight());
        assert!(!state.can_submit());
        assert!(state.begin_submission(now).is_none());
    }

    #[test]
    fn test_replacing_file_in_flight_keeps_request_snapshot() {
        let now = Instant::now();
        let mut state = filled_state();
        let submission = state.begin_submission(now).unwrap();

        state.select_file(file("februar.csv"));

        assert_eq!(submission.file.name, "januar.xlsx");
        assert_eq!(submission.file.contents(), b"content");
        assert_eq!(state.form.file.as_ref().unwrap().name, "februar.csv");
        assert!(state.is_in_flight());

        state.finish_submission(delivered(Environment::Test), now);
        assert_eq!(state.phase, SubmissionPhase::Succeeded);
        assert_eq!(state.form.file.as_ref().unwrap().name, "februar.csv");
    }

    #[test]
    fn test_full_cycle_returns_to_idle_after_delay() {
        let start = Instant::now();
        let mut state = filled_state();
        state.begin_submission(start).unwrap();

        let (sender, receiver) = mpsc::channel();
        state.outcome_receiver = Some(receiver);
        assert!(!state.poll_outcome(start + Duration::from_millis(400)));
        assert_eq!(state.progress_value(start + Duration::from_millis(400)), 20);

        let settled = start + Duration::from_millis(700);
        sender.send(delivered(Environment::Test)).unwrap();
        assert!(state.poll_outcome(settled));
        assert_eq!(state.phase, SubmissionPhase::Succeeded);
        assert!(state.outcome_receiver.is_none());
        assert_eq!(state.progress_value(settled), 100);
        assert!(state.notification.as_ref().unwrap().is_success());

        state.tick(settled + Duration::from_millis(1500));
        assert_eq!(state.phase, SubmissionPhase::Succeeded);

        state.tick(settled + Duration::from_millis(2000));
        assert_eq!(state.phase, SubmissionPhase::Idle);
        assert_eq!(state.progress_value(settled + Duration::from_millis(2000)), 0);
        assert!(state.notification.is_some());
    }

    #[test]
    fn test_server_error_marks_failure_with_submitted_environment() {
        let now = Instant::now();
        let mut state = filled_state();
        state.form.environment = Environment::Production;
        state.begin_submission(now).unwrap();

        state.form.environment = Environment::Test;
        state.finish_submission(Err(TransferError::Network("refused".to_string())), now);

        assert_eq!(state.phase, SubmissionPhase::Failed);
        let note = state.notification.as_ref().unwrap();
        assert_eq!(note.kind, NotificationKind::Failure);
        assert!(note.description.starts_with("CORS-Fehler"));
    }

    #[test]
    fn test_vanished_worker_is_a_failure() {
        let now = Instant::now();
        let mut state = filled_state();
        state.begin_submission(now).unwrap();

        let (sender, receiver) = mpsc::channel::<UploadOutcome>();
        state.outcome_receiver = Some(receiver);
        drop(sender);

        assert!(state.poll_outcome(now));
        assert_eq!(state.phase, SubmissionPhase::Failed);
        assert_eq!(
            state.notification.as_ref().unwrap().description,
            "Es gab einen Fehler beim Senden der Datei."
        );
    }

    #[test]
    fn test_rejected_file_keeps_current_selection() {
        let mut state = UploadState::default();
        state.select_file(file("a.xlsx"));

        state.reject_file(&FileSelectionError::Unsupported("b.txt".to_string()));

        assert_eq!(state.form.file.as_ref().unwrap().name, "a.xlsx");
        assert_eq!(
            state.notification.as_ref().unwrap().title,
            "Dateityp nicht unterstützt"
        );
    }

    #[test]
    fn test_multi_file_drop_keeps_current_selection() {
        let mut state = UploadState::default();
        state.select_file(file("a.xlsx"));

        state.reject_multiple_files(2);

        assert_eq!(state.form.file.as_ref().unwrap().name, "a.xlsx");
        let note = state.notification.as_ref().unwrap();
        assert_eq!(note.title, "Nur eine Datei erlaubt");
        assert!(!note.is_success());
    }

    #[test]
    fn test_file_load_lands_in_form_when_it_arrives() {
        let mut state = UploadState::default();
        let (sender, receiver) = mpsc::channel();
        state.file_receiver = Some(receiver);

        assert!(state.is_loading_file());
        assert!(!state.poll_file_load());

        sender.send(Ok(file("april.pdf"))).unwrap();
        assert!(state.poll_file_load());
        assert!(!state.is_loading_file());
        assert_eq!(state.form.file.as_ref().unwrap().name, "april.pdf");
    }

    #[test]
    fn test_failed_file_load_notifies_and_keeps_selection() {
        let mut state = UploadState::default();
        state.select_file(file("a.csv"));
        let (sender, receiver) = mpsc::channel();
        state.file_receiver = Some(receiver);

        sender
            .send(Err(FileSelectionError::Read {
                name: "gross.pdf".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            }))
            .unwrap();

        assert!(state.poll_file_load());
        assert_eq!(state.form.file.as_ref().unwrap().name, "a.csv");
        assert_eq!(
            state.notification.as_ref().unwrap().title,
            "Datei konnte nicht gelesen werden"
        );
    }

    #[test]
    fn test_stray_outcome_is_ignored() {
        let mut state = filled_state();
        state.finish_submission(delivered(Environment::Test), Instant::now());
        assert_eq!(state.phase, SubmissionPhase::Idle);
        assert!(state.notification.is_none());
    }
}
