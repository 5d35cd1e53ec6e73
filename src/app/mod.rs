mod state;
mod ui;

use crate::config::AppConfig;
use crate::upload::{ReqwestTransport, SelectedFile, TransferError, WebhookClient};
use eframe::{egui, App};
pub use state::{SubmissionPhase, UploadOutcome, UploadState};
use std::path::Path;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct TimeTrackingUploader {
    state: UploadState,
    client: Arc<WebhookClient<ReqwestTransport>>,
}

impl TimeTrackingUploader {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        info!("Initializing time tracking uploader");
        Self {
            state: UploadState::new(config.progress),
            client: Arc::new(WebhookClient::new(ReqwestTransport::new(), config.webhooks)),
        }
    }

    /// Read the picked file on a worker thread so large files do not stall
    /// the frame. The result is picked up in `update_state`.
    pub fn select_path(&mut self, path: &Path) {
        info!("Loading {:?}", path);
        let (sender, receiver) = std_mpsc::channel();
        self.state.file_receiver = Some(receiver);
        let path = path.to_path_buf();

        std::thread::spawn(move || {
            let loaded = SelectedFile::from_path(&path);
            if let Ok(file) = &loaded {
                debug!("Read {:?} ({} bytes)", path, file.size());
            }
            if sender.send(loaded).is_err() {
                debug!("File load for {:?} superseded", path);
            }
        });
    }

    pub fn start_upload(&mut self) {
        let Some(submission) = self.state.begin_submission(Instant::now()) else {
            return;
        };

        let (sender, receiver) = std_mpsc::channel();
        self.state.outcome_receiver = Some(receiver);
        let client = Arc::clone(&self.client);

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(client.deliver(submission)),
                Err(e) => Err(TransferError::Worker(format!(
                    "failed to start async runtime: {}",
                    e
                ))),
            };

            if sender.send(outcome).is_err() {
                warn!("Upload finished after the window was closed");
            }
        });
    }

    /// Accept a single dropped file and track hover state. Dropping several
    /// files at once is refused.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, mut dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });
        self.state.drop_hovered = hovering;

        if dropped.len() > 1 {
            self.state.reject_multiple_files(dropped.len());
            return;
        }
        let Some(dropped) = dropped.pop() else {
            return;
        };
        debug!("File dropped: {:?} {}", dropped.path, dropped.name);

        if let Some(path) = &dropped.path {
            self.select_path(path);
        } else if let Some(bytes) = dropped.bytes {
            match SelectedFile::from_bytes(dropped.name, bytes) {
                Ok(file) => self.state.select_file(file),
                Err(e) => self.state.reject_file(&e),
            }
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.handle_dropped_files(ctx);

        let file_loaded = self.state.poll_file_load();
        let settled = self.state.poll_outcome(now);
        if file_loaded || settled {
            ctx.request_repaint();
        }
        self.state.tick(now);

        if let Some(delay) = self.state.progress.next_change_in(now) {
            ctx.request_repaint_after(delay);
        }
        if self.state.is_in_flight() || self.state.is_loading_file() {
            // keep polling the workers between progress ticks
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}

impl App for TimeTrackingUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
