use crate::upload::form::ValidationError;
use crate::upload::types::{Environment, FileSelectionError};
use crate::upload::webhook::TransferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// User-facing message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn failure(title: &str, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn delivered(environment: Environment) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Upload erfolgreich!".to_string(),
            description: format!("Datei wurde an {} Webhook gesendet.", environment.label()),
        }
    }

    pub fn validation_failed(err: &ValidationError) -> Self {
        match err {
            ValidationError::MissingFile => Self::failure(
                "Keine Datei ausgewählt",
                "Bitte wählen Sie zuerst eine Datei aus.",
            ),
            ValidationError::MissingFields(_) => Self::failure(
                "Fehlende Informationen",
                "Bitte füllen Sie alle Felder aus.",
            ),
        }
    }

    /// Network failures against production usually mean the endpoint is
    /// unreachable or refuses cross-origin calls, so they get a hint.
    pub fn transfer_failed(err: &TransferError, environment: Environment) -> Self {
        let description = match (err.is_network(), environment) {
            (true, Environment::Production) => {
                "CORS-Fehler: Der Production Webhook ist möglicherweise nicht erreichbar \
                 oder erlaubt keine Cross-Origin-Requests."
            }
            (true, Environment::Test) => "Netzwerk-Fehler beim Senden der Datei.",
            (false, _) => "Es gab einen Fehler beim Senden der Datei.",
        };
        Self::failure("Upload fehlgeschlagen", description)
    }

    pub fn file_rejected(err: &FileSelectionError) -> Self {
        match err {
            FileSelectionError::Unsupported(name) => Self::failure(
                "Dateityp nicht unterstützt",
                format!(
                    "{} kann nicht hochgeladen werden. Unterstützte Formate: Excel (.xlsx, .xls), CSV, PDF",
                    name
                ),
            ),
            FileSelectionError::Read { name, .. } => Self::failure(
                "Datei konnte nicht gelesen werden",
                format!("{} konnte nicht geöffnet werden.", name),
            ),
        }
    }

    pub fn too_many_files(count: usize) -> Self {
        Self::failure(
            "Nur eine Datei erlaubt",
            format!(
                "{} Dateien abgelegt. Bitte laden Sie genau eine Stundenübersicht hoch.",
                count
            ),
        )
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::form::RequiredField;
    use reqwest::StatusCode;

    #[test]
    fn test_success_names_environment() {
        let note = Notification::delivered(Environment::Production);
        assert!(note.is_success());
        assert_eq!(note.description, "Datei wurde an Production Webhook gesendet.");
    }

    #[test]
    fn test_server_error_is_generic_failure() {
        let err = TransferError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        for environment in [Environment::Test, Environment::Production] {
            let note = Notification::transfer_failed(&err, environment);
            assert_eq!(note.kind, NotificationKind::Failure);
            assert_eq!(note.title, "Upload fehlgeschlagen");
            assert_eq!(note.description, "Es gab einen Fehler beim Senden der Datei.");
        }
    }

    #[test]
    fn test_network_error_hint_depends_on_environment() {
        let err = TransferError::Network("connection refused".to_string());

        let production = Notification::transfer_failed(&err, Environment::Production);
        assert!(production.description.starts_with("CORS-Fehler"));

        let test = Notification::transfer_failed(&err, Environment::Test);
        assert_eq!(test.description, "Netzwerk-Fehler beim Senden der Datei.");
    }

    #[test]
    fn test_validation_messages() {
        let file = Notification::validation_failed(&ValidationError::MissingFile);
        assert_eq!(file.title, "Keine Datei ausgewählt");

        let fields = Notification::validation_failed(&ValidationError::MissingFields(vec![
            RequiredField::Month,
        ]));
        assert_eq!(fields.title, "Fehlende Informationen");
        assert!(!fields.is_success());
    }

    #[test]
    fn test_multi_file_drop_names_count() {
        let note = Notification::too_many_files(3);
        assert_eq!(note.kind, NotificationKind::Failure);
        assert!(note.description.starts_with("3 Dateien"));
    }

    #[test]
    fn test_rejected_file_names_it() {
        let note =
            Notification::file_rejected(&FileSelectionError::Unsupported("notes.txt".to_string()));
        assert!(note.description.starts_with("notes.txt"));
    }
}
