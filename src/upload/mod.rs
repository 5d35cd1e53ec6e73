mod form;
mod notification;
mod payload;
mod progress;
mod types;
mod webhook;

pub use form::{sanitize_year, RequiredField, Submission, UploadForm, ValidationError};
pub use notification::{Notification, NotificationKind};
pub use payload::{format_timestamp, WebhookPayload, FILE_FIELD};
pub use progress::SimulatedProgress;
pub use types::{Environment, FileKind, FileSelectionError, Month, Region, SelectedFile};
pub use webhook::{Delivery, ReqwestTransport, TransferError, WebhookClient, WebhookTransport};
