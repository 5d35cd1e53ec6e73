use crate::upload::types::{Environment, Month, Region, SelectedFile};
use std::fmt;
use thiserror::Error;

const YEAR_MAX_DIGITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Year,
    Month,
    Region,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredField::Year => "year",
            RequiredField::Month => "month",
            RequiredField::Region => "region",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file selected")]
    MissingFile,
    #[error("Missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything the user has entered so far.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<SelectedFile>,
    pub year: String,
    pub month: Option<Month>,
    pub region: Option<Region>,
    pub environment: Environment,
}

/// A validated snapshot of the form, owned by the request that sends it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub file: SelectedFile,
    pub year: String,
    pub month: Month,
    pub region: Region,
    pub environment: Environment,
}

impl UploadForm {
    /// Keeps only digits and at most four of them, like a number input
    /// bounded to four-digit years.
    pub fn set_year(&mut self, input: &str) {
        self.year = sanitize_year(input);
    }

    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.year.trim().is_empty() {
            missing.push(RequiredField::Year);
        }
        if self.month.is_none() {
            missing.push(RequiredField::Month);
        }
        if self.region.is_none() {
            missing.push(RequiredField::Region);
        }
        missing
    }

    pub fn metadata_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// The file is checked first; metadata gaps are reported together.
    pub fn validate(&self) -> Result<Submission, ValidationError> {
        let file = self.file.clone().ok_or(ValidationError::MissingFile)?;

        match (self.month, self.region) {
            (Some(month), Some(region)) if !self.year.trim().is_empty() => Ok(Submission {
                file,
                year: self.year.trim().to_string(),
                month,
                region,
                environment: self.environment,
            }),
            _ => Err(ValidationError::MissingFields(self.missing_fields())),
        }
    }
}

pub fn sanitize_year(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(YEAR_MAX_DIGITS)
        .collect()
}
