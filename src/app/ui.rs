use super::state::{AdminAction, Screen, UploadPhase};
use super::ChurnSight;
use crate::report::{
    chat_tone, percent, AnalysisReport, ChatTone, DataOutput, FilePrediction, PredictionDetail,
    Verdict,
};
use crate::staging::Category;
use crate::utils::color::palette;
use crate::utils::file_size::format_bytes;
use eframe::egui::{self, RichText};
use rfd::FileDialog;
use std::path::PathBuf;
use std::time::Instant;

impl ChurnSight {
    pub(crate) fn render(&mut self, ctx: &egui::Context, now: Instant) {
        egui::TopBottomPanel::top("screen_tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("ChurnSight").strong());
                ui.separator();
                for screen in Screen::ALL {
                    if ui
                        .selectable_label(self.screen == screen, screen.title())
                        .clicked()
                    {
                        self.screen = screen;
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.screen {
                Screen::Staging => self.render_staging(ui, ctx, now),
                Screen::Signup => self.render_signup(ui, now),
                Screen::Admin => self.render_admin(ui),
            });
        });

        self.render_upload_dialogs(ctx);
        self.render_admin_dialogs(ctx);
        self.render_toasts(ctx);
    }

    fn render_staging(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, now: Instant) {
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.heading("Customer Churn Analysis");
            ui.add_space(3.0);
            ui.label(
                RichText::new("Stage audio, data and chat history files, then upload them all")
                    .color(ui.visuals().text_color().gamma_multiply(0.7)),
            );
        });
        ui.add_space(12.0);

        let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let mut drop_targets: Vec<(Category, egui::Rect)> = Vec::new();

        for category in Category::ALL {
            let response = ui.group(|ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new(category.label()).strong());
                    ui.label(
                        RichText::new(category.allowed_extensions().join(" / ")).weak(),
                    );
                    if ui.button("📁 Select Files").clicked() {
                        let extensions: Vec<&str> = category
                            .allowed_extensions()
                            .iter()
                            .map(|e| e.trim_start_matches('.'))
                            .collect();
                        if let Some(paths) = FileDialog::new()
                            .add_filter(category.label(), &extensions)
                            .pick_files()
                        {
                            self.stage_paths(category, paths, now);
                        }
                    }
                });
                ui.add_space(4.0);
                self.render_file_list(ui, category);
            });

            let rect = response.response.rect;
            if hovering_files {
                ui.painter()
                    .rect_stroke(rect, 6.0, egui::Stroke::new(2.0, palette::DATA_ACCENT));
            }
            drop_targets.push((category, rect));
            ui.add_space(8.0);
        }

        // Dropped files are routed to whichever category section the pointer
        // is over when they land.
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            let pointer = ctx.input(|i| i.pointer.hover_pos().or_else(|| i.pointer.interact_pos()));
            let target = pointer.and_then(|pos| {
                drop_targets
                    .iter()
                    .find(|(_, rect)| rect.contains(pos))
                    .map(|(category, _)| *category)
            });
            match target {
                Some(category) => {
                    let paths: Vec<PathBuf> =
                        dropped.iter().filter_map(|f| f.path.clone()).collect();
                    self.stage_paths(category, paths, now);
                }
                None => {
                    self.toasts
                        .push("Drop files onto one of the category sections", true, now)
                }
            }
        }

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let can_submit = self.staging.files.can_submit()
                && matches!(self.staging.phase, UploadPhase::Idle);
            ui.add_enabled_ui(can_submit, |ui| {
                let button =
                    egui::Button::new("📤 Upload All Files").min_size(egui::vec2(200.0, 40.0));
                if ui.add(button).clicked() {
                    self.request_upload_confirmation();
                }
            });
        });
        ui.add_space(16.0);
    }

    fn render_file_list(&mut self, ui: &mut egui::Ui, category: Category) {
        let files = self.staging.files.files(category);
        if files.is_empty() {
            ui.label(RichText::new("No files selected").weak());
            return;
        }

        let mut remove_index = None;
        for (index, file) in files.iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&file.name).strong());
                ui.label(RichText::new(format!("({})", format_bytes(file.size))).weak());
                if ui.small_button("Remove").clicked() {
                    remove_index = Some(index);
                }
            });
        }

        if let Some(index) = remove_index {
            self.staging.files.remove_file(category, index);
        }
    }

    fn render_upload_dialogs(&mut self, ctx: &egui::Context) {
        if matches!(self.staging.phase, UploadPhase::Confirming) {
            let total = self.staging.files.total();
            egui::Window::new("Confirm Upload")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(format!("Ready to upload {} file(s):", total));
                    ui.add_space(4.0);
                    for category in Category::ALL {
                        ui.label(format!(
                            "• {} files: {}",
                            category.label(),
                            self.staging.files.count(category)
                        ));
                    }
                    ui.add_space(8.0);
                    let has_data_files = self.staging.files.count(Category::Data) > 0;
                    ui.label(
                        RichText::new(customer_id_preview(has_data_files))
                            .color(palette::DATA_ACCENT),
                    );
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Continue Upload").clicked() {
                            self.start_upload();
                        }
                        if ui.button("Cancel").clicked() {
                            self.staging.phase = UploadPhase::Idle;
                        }
                    });
                });
        }

        if matches!(self.staging.phase, UploadPhase::Uploading) {
            egui::Window::new("Processing")
                .title_bar(false)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Uploading and analyzing files...");
                    });
                });
        }

        let report = match &self.staging.phase {
            UploadPhase::Viewing(report) => Some(report.clone()),
            _ => None,
        };
        if let Some(report) = report {
            egui::Window::new("Analysis Results")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.set_width(420.0);
                    egui::ScrollArea::vertical().max_height(440.0).show(ui, |ui| {
                        render_report(ui, &report);
                    });
                    ui.add_space(6.0);
                    ui.vertical_centered(|ui| {
                        if ui
                            .add(egui::Button::new("OK").min_size(egui::vec2(120.0, 30.0)))
                            .clicked()
                        {
                            self.staging.phase = UploadPhase::Idle;
                        }
                    });
                });
        }
    }

    fn render_admin(&mut self, ui: &mut egui::Ui) {
        ui.add_space(12.0);
        ui.heading("Admin Tools");
        ui.label(
            RichText::new("Manage portal accounts")
                .color(ui.visuals().text_color().gamma_multiply(0.7)),
        );
        ui.add_space(8.0);

        ui.group(|ui| {
            egui::Grid::new("admin_fields")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("User ID");
                    ui.text_edit_singleline(&mut self.admin.user_id);
                    ui.end_row();

                    ui.label("Name");
                    ui.text_edit_singleline(&mut self.admin.name);
                    ui.end_row();

                    ui.label("Email");
                    ui.text_edit_singleline(&mut self.admin.email);
                    ui.end_row();

                    ui.label("Role");
                    ui.text_edit_singleline(&mut self.admin.role);
                    ui.end_row();
                });
        });

        ui.add_space(8.0);
        let has_user = !self.admin.user_id.trim().is_empty();
        ui.horizontal(|ui| {
            ui.add_enabled_ui(has_user && !self.admin.busy, |ui| {
                if ui.button("💾 Update User").clicked() {
                    self.start_admin_update();
                }
                if ui.button("🔑 Reset Password").clicked() {
                    self.admin.pending = Some(AdminAction::ResetPassword);
                }
                if ui.button("🗑 Delete User").clicked() {
                    self.admin.pending = Some(AdminAction::Delete);
                }
            });
            if self.admin.busy {
                ui.spinner();
            }
        });
    }

    fn render_admin_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(action) = self.admin.pending {
            let target = if self.admin.name.trim().is_empty() {
                format!("user {}", self.admin.user_id.trim())
            } else {
                self.admin.name.trim().to_string()
            };
            let (title, prompt, confirm_label) = match action {
                AdminAction::Delete => (
                    "Delete User",
                    format!(
                        "Are you sure you want to delete {}? This cannot be undone.",
                        target
                    ),
                    "Delete",
                ),
                AdminAction::ResetPassword => (
                    "Reset Password",
                    format!("Generate a temporary password for {}?", target),
                    "Reset",
                ),
            };

            egui::Window::new(title)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(prompt);
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        ui.add_enabled_ui(!self.admin.busy, |ui| {
                            if ui.button(confirm_label).clicked() {
                                self.start_admin_action(action);
                            }
                            if ui.button("Cancel").clicked() {
                                self.admin.pending = None;
                            }
                        });
                        if self.admin.busy {
                            ui.spinner();
                        }
                    });
                });
        }

        if let Some(temp_password) = self.admin.temp_password.clone() {
            egui::Window::new("Temporary Password")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("Share this temporary password with the user:");
                    ui.add_space(4.0);
                    ui.label(RichText::new(temp_password).monospace().strong().size(16.0));
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.admin.temp_password = None;
                    }
                });
        }
    }

    fn render_toasts(&mut self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                for (index, toast) in self.toasts.iter().enumerate() {
                    let accent = if toast.is_error {
                        palette::ERROR
                    } else {
                        palette::SUCCESS
                    };
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, accent))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.colored_label(accent, &toast.message);
                                if ui.small_button("✕").clicked() {
                                    dismissed = Some(index);
                                }
                            });
                        });
                    ui.add_space(4.0);
                }
            });

        if let Some(index) = dismissed {
            self.toasts.dismiss(index);
        }
    }
}

fn render_report(ui: &mut egui::Ui, report: &AnalysisReport) {
    section_frame(ui, palette::CUSTOMER_ACCENT, "Customer ID", |ui| {
        ui.label(RichText::new(&report.customer_id).strong().size(16.0));
    });

    section_frame(ui, palette::AUDIO_ACCENT, "Audio Analysis", |ui| {
        ui.label(&report.audio);
    });

    section_frame(ui, palette::DATA_ACCENT, "Data Analysis", |ui| {
        match &report.data {
            DataOutput::Text(text) => {
                ui.label(text);
            }
            DataOutput::Predictions(predictions) => {
                for prediction in predictions {
                    render_prediction_card(ui, prediction);
                }
            }
        }
    });

    section_frame(ui, palette::CHAT_ACCENT, "Chat Analysis", |ui| {
        match chat_tone(&report.chat) {
            Some(ChatTone::Positive) => {
                ui.colored_label(palette::STAY, RichText::new(&report.chat).strong());
            }
            Some(ChatTone::Negative) => {
                ui.colored_label(palette::CHURN, RichText::new(&report.chat).strong());
            }
            None => {
                ui.label(&report.chat);
            }
        }
    });

    section_frame(ui, palette::FINAL_ACCENT, "Final Result", |ui| {
        ui.label(RichText::new(&report.final_decision).strong());
    });

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
        ui.label(
            RichText::new(format!(
                "Processed at: {} · triggered by {}",
                report.processed_at, report.triggered_by
            ))
            .italics()
            .small()
            .color(palette::MUTED),
        );
    });
}

fn section_frame(
    ui: &mut egui::Ui,
    accent: egui::Color32,
    title: &str,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    egui::Frame::none()
        .fill(ui.style().visuals.extreme_bg_color)
        .stroke(egui::Stroke::new(1.0, accent))
        .rounding(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.colored_label(accent, RichText::new(title).strong());
            ui.separator();
            add_contents(ui);
        });
    ui.add_space(8.0);
}

/// The customer id is recovered server-side from the data files; with none
/// staged there is nothing to extract it from.
fn customer_id_preview(has_data_files: bool) -> &'static str {
    if has_data_files {
        "Customer ID: Will be extracted during processing"
    } else {
        "Customer ID: Unknown"
    }
}

fn render_prediction_card(ui: &mut egui::Ui, prediction: &FilePrediction) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(format!("File: {}", prediction.file)).strong());
            match &prediction.detail {
                PredictionDetail::Scored {
                    stay_probability,
                    churn_probability,
                    verdict,
                } => {
                    ui.label(format!("Stay Probability: {}", percent(*stay_probability)));
                    ui.label(format!("Churn Probability: {}", percent(*churn_probability)));
                    ui.horizontal(|ui| {
                        ui.label("Final Prediction:");
                        let color = match verdict {
                            Verdict::Stay => palette::STAY,
                            Verdict::Churn => palette::CHURN,
                        };
                        ui.colored_label(color, RichText::new(verdict.label()).strong());
                    });
                }
                PredictionDetail::Plain(text) => {
                    ui.label(text);
                }
            }
        });
    ui.add_space(6.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_id_extraction_is_only_promised_with_data_files() {
        assert_eq!(
            customer_id_preview(true),
            "Customer ID: Will be extracted during processing"
        );
        assert_eq!(customer_id_preview(false), "Customer ID: Unknown");
    }
}
