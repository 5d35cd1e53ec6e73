use crate::upload::form::Submission;
use crate::upload::types::SelectedFile;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};

pub const FILE_FIELD: &str = "file";

/// The multipart body of one webhook call, before it is encoded.
#[derive(Debug, Clone)]
pub struct WebhookPayload {
    pub file: SelectedFile,
    fields: Vec<(&'static str, String)>,
}

impl WebhookPayload {
    pub fn new(submission: Submission, timestamp: DateTime<Utc>) -> Self {
        let fields = vec![
            ("environment", submission.environment.as_str().to_string()),
            ("timestamp", format_timestamp(timestamp)),
            ("year", submission.year),
            ("month", submission.month.code().to_string()),
            ("bundesland", submission.region.name().to_string()),
        ];

        Self {
            file: submission.file,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Part names in the order they are written, starting with the file.
    pub fn part_names(&self) -> Vec<&'static str> {
        std::iter::once(FILE_FIELD)
            .chain(self.fields.iter().map(|(key, _)| *key))
            .collect()
    }

    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let file_part = Part::bytes(self.file.contents().to_vec())
            .file_name(self.file.name.clone())
            .mime_str(self.file.mime_type())?;

        let form = self
            .fields
            .into_iter()
            .fold(Form::new().part(FILE_FIELD, file_part), |form, (key, value)| {
                form.text(key, value)
            });
        Ok(form)
    }
}

/// UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
