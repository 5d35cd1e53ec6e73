use super::TimeTrackingUploader;
use crate::upload::{Environment, FileKind, Month, NotificationKind, Region};
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Color32, RichText};
use rfd::FileDialog;
use std::time::Instant;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);
const WARNING: Color32 = Color32::from_rgb(230, 160, 30);

impl TimeTrackingUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Stundenübersicht Upload");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new(
                            "Laden Sie Ihre Gesamtstundenübersicht hoch und senden Sie sie an den gewählten Webhook",
                        )
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);
                self.render_notification(ui);
                self.render_environment(ui);
                ui.add_space(20.0);
                self.render_drop_zone(ui);
                ui.add_space(20.0);
                self.render_metadata(ui);
                ui.add_space(20.0);
                self.render_webhook_info(ui);
                ui.add_space(20.0);
            });
        });
    }

    fn render_notification(&mut self, ui: &mut egui::Ui) {
        let Some(note) = self.state.notification.clone() else {
            return;
        };

        let color = match note.kind {
            NotificationKind::Success => SUCCESS,
            NotificationKind::Failure => FAILURE,
        };
        let icon = if note.is_success() { "✅" } else { "❌" };

        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(1.5, color))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(icon);
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&note.title).strong().color(color));
                        ui.label(&note.description);
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                        if ui.small_button("✖").clicked() {
                            self.state.dismiss_notification();
                        }
                    });
                });
            });
        ui.add_space(20.0);
    }

    fn render_environment(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new("⚙ Umgebung").strong());
                    let active = match self.state.form.environment {
                        Environment::Test => "Test Webhook aktiv",
                        Environment::Production => "Production Webhook aktiv",
                    };
                    ui.label(
                        RichText::new(active).color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    for environment in [Environment::Production, Environment::Test] {
                        ui.selectable_value(
                            &mut self.state.form.environment,
                            environment,
                            environment.label(),
                        );
                    }
                });
            });
        });
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        let border = if self.state.drop_hovered {
            ACCENT
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };

        egui::Frame::none()
            .stroke(egui::Stroke::new(2.0, border))
            .rounding(8.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    let title = if self.state.drop_hovered {
                        "Datei hier ablegen..."
                    } else {
                        "Datei hochladen"
                    };
                    ui.label(RichText::new(title).size(18.0).strong());
                    ui.add_space(5.0);
                    ui.label("Ziehen Sie Ihre Stundenübersicht hier hin oder klicken Sie zum Auswählen");
                    ui.label(
                        RichText::new("Unterstützte Formate: Excel (.xlsx, .xls), CSV, PDF")
                            .small()
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                    ui.add_space(10.0);
                    if ui.button("📁 Datei auswählen").clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("Stundenübersicht", &FileKind::extensions())
                            .pick_file()
                        {
                            self.select_path(&path);
                        }
                    }
                });
            });

        if self.state.is_loading_file() {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Datei wird geladen...");
            });
        }

        if self.state.is_in_flight() {
            ui.add_space(10.0);
            let value = self.state.progress_value(now);
            ui.label("Upload läuft...");
            let progress_bar = egui::ProgressBar::new(f32::from(value) / 100.0)
                .text(format!("{}%", value))
                .animate(false)
                .fill(ACCENT);
            ui.add(progress_bar);
        } else if let Some(file) = &self.state.form.file {
            ui.add_space(10.0);
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.label("📄");
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&file.name).strong());
                        ui.label(FileSizeUtils::format_megabytes(file.size()));
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.colored_label(SUCCESS, "✔");
                    });
                });
            });
        }
    }

    fn render_metadata(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(RichText::new("Zusätzliche Informationen").size(16.0).strong());
            ui.add_space(10.0);

            egui::Grid::new("metadata")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Jahr");
                    let mut year = self.state.form.year.clone();
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut year)
                            .hint_text("2024")
                            .desired_width(120.0),
                    );
                    if response.changed() {
                        self.state.form.set_year(&year);
                    }
                    ui.end_row();

                    ui.label("Monat");
                    let selected = self
                        .state
                        .form
                        .month
                        .map_or("Monat auswählen", Month::label);
                    egui::ComboBox::from_id_source("month")
                        .selected_text(selected)
                        .width(200.0)
                        .show_ui(ui, |ui| {
                            for month in Month::ALL {
                                ui.selectable_value(
                                    &mut self.state.form.month,
                                    Some(month),
                                    month.label(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Bundesland");
                    let selected = self
                        .state
                        .form
                        .region
                        .map_or("Bundesland auswählen", Region::name);
                    egui::ComboBox::from_id_source("bundesland")
                        .selected_text(selected)
                        .width(200.0)
                        .show_ui(ui, |ui| {
                            for region in Region::ALL {
                                ui.selectable_value(
                                    &mut self.state.form.region,
                                    Some(region),
                                    region.name(),
                                );
                            }
                        });
                    ui.end_row();
                });

            ui.add_space(15.0);
            ui.vertical_centered(|ui| {
                let label = if self.state.is_in_flight() {
                    "Wird gesendet..."
                } else {
                    "📤 Daten senden"
                };
                ui.add_enabled_ui(self.state.can_submit(), |ui| {
                    let button = egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
                    if ui.add(button).clicked() {
                        self.start_upload();
                    }
                });
            });
        });
    }

    fn render_webhook_info(&self, ui: &mut egui::Ui) {
        let url = self.client.targets().url_for(self.state.form.environment);
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.colored_label(WARNING, "⚠");
                ui.vertical(|ui| {
                    ui.label(RichText::new("Webhook Information").strong());
                    ui.horizontal_wrapped(|ui| {
                        ui.label("Aktueller Endpunkt:");
                        ui.code(url);
                    });
                    ui.label(
                        RichText::new(
                            "Die Datei wird nach dem Klick auf \"Daten senden\" an den gewählten Webhook gesendet.",
                        )
                        .small(),
                    );
                });
            });
        });
    }
}

