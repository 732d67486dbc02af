use super::ChurnSight;
use crate::signup::{
    is_common_password, password_checks, password_strength, OtpPhase, PasswordStrength, CODE_LEN,
};
use crate::utils::color::palette;
use eframe::egui::{self, RichText};
use std::time::Instant;

impl ChurnSight {
    pub(crate) fn render_signup(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.heading("Create an Account");
        });
        ui.add_space(8.0);

        match self.signup.flow.phase() {
            OtpPhase::Idle | OtpPhase::Requesting => self.render_registration_form(ui),
            OtpPhase::AwaitingCode | OtpPhase::Verifying | OtpPhase::Expired => {
                self.render_code_panel(ui, now)
            }
            OtpPhase::Complete => self.render_signup_complete(ui),
        }
        ui.add_space(16.0);
    }

    fn render_registration_form(&mut self, ui: &mut egui::Ui) {
        let requesting = self.signup.flow.phase() == OtpPhase::Requesting;

        ui.group(|ui| {
            form_field(
                ui,
                "Full Name",
                &mut self.signup.form.name,
                &self.signup.errors.name,
                false,
            );
            form_field(
                ui,
                "Email",
                &mut self.signup.form.email,
                &self.signup.errors.email,
                false,
            );
            form_field(
                ui,
                "Password",
                &mut self.signup.form.password,
                &self.signup.errors.password,
                true,
            );

            let password = self.signup.form.password.clone();
            if !password.is_empty() {
                let strength = password_strength(&password);
                let color = match strength {
                    PasswordStrength::VeryWeak | PasswordStrength::Weak => palette::ERROR,
                    PasswordStrength::Medium => palette::CHAT_ACCENT,
                    PasswordStrength::Strong => palette::SUCCESS,
                };
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Strength:").small());
                    ui.colored_label(color, RichText::new(strength.label()).small());
                });
                if is_common_password(&password) {
                    ui.colored_label(
                        palette::ERROR,
                        RichText::new("This password is too common.").small(),
                    );
                }
            }

            let checks = password_checks(&password);
            requirement_row(ui, checks.length, "At least 8 characters");
            requirement_row(ui, checks.uppercase, "One uppercase letter");
            requirement_row(ui, checks.lowercase, "One lowercase letter");
            requirement_row(ui, checks.digit, "One number");
            requirement_row(ui, checks.special, "One special character");
            ui.add_space(6.0);

            form_field(
                ui,
                "Confirm Password",
                &mut self.signup.form.confirm_password,
                &self.signup.errors.confirm_password,
                true,
            );
            form_field(
                ui,
                "CAPTCHA response",
                &mut self.signup.form.captcha_token,
                &self.signup.errors.captcha,
                false,
            );
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let label = if requesting { "Sending..." } else { "Request OTP" };
            ui.add_enabled_ui(!requesting, |ui| {
                if ui
                    .add(egui::Button::new(label).min_size(egui::vec2(180.0, 32.0)))
                    .clicked()
                {
                    self.submit_signup();
                }
            });
            if requesting {
                ui.spinner();
            }
        });

        if let Some(error) = &self.signup.flow.error {
            ui.colored_label(palette::ERROR, error);
        }
    }

    fn render_code_panel(&mut self, ui: &mut egui::Ui, now: Instant) {
        let phase = self.signup.flow.phase();
        let email = self
            .signup
            .data
            .as_ref()
            .map(|d| d.email.clone())
            .unwrap_or_default();

        ui.label(format!("Enter the 6-digit code sent to {}", email));
        ui.add_space(8.0);
        self.render_code_segments(ui);
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Code expires in:");
            let color = if phase == OtpPhase::Expired {
                palette::ERROR
            } else {
                ui.visuals().text_color()
            };
            ui.colored_label(
                color,
                RichText::new(self.signup.flow.countdown_label(now))
                    .monospace()
                    .strong(),
            );
        });

        if let Some(error) = &self.signup.flow.error {
            ui.colored_label(palette::ERROR, error);
        }
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let verifying = phase == OtpPhase::Verifying;
            let verify_label = if verifying {
                "Verifying..."
            } else {
                "Verify & Create Account"
            };
            ui.add_enabled_ui(self.signup.flow.can_verify(now), |ui| {
                if ui.button(verify_label).clicked() {
                    self.verify_otp(now);
                }
            });
            ui.add_enabled_ui(self.signup.flow.can_resend(now), |ui| {
                if ui.button("Resend OTP").clicked() {
                    self.resend_otp(now);
                }
            });
            if verifying {
                ui.spinner();
            }
        });

        ui.add_space(6.0);
        if ui.small_button("Start over").clicked() {
            self.signup.flow.reset();
            self.signup.data = None;
            self.signup.segment_focus = None;
        }
    }

    fn render_code_segments(&mut self, ui: &mut egui::Ui) {
        let enabled = self.signup.flow.phase() == OtpPhase::AwaitingCode;

        ui.horizontal(|ui| {
            for index in 0..CODE_LEN {
                let digit = self.signup.flow.code.digit(index);
                let mut buffer: String = digit.map(String::from).unwrap_or_default();

                let response = ui.add_enabled(
                    enabled,
                    egui::TextEdit::singleline(&mut buffer)
                        .id(egui::Id::new(("otp_segment", index)))
                        .desired_width(26.0)
                        .font(egui::TextStyle::Heading),
                );

                if self.signup.segment_focus == Some(index) {
                    response.request_focus();
                    self.signup.segment_focus = None;
                }

                if response.changed() {
                    self.apply_segment_input(index, &buffer);
                }

                // Backspace on an already-empty segment steps back.
                if response.has_focus()
                    && digit.is_none()
                    && ui.input(|i| i.key_pressed(egui::Key::Backspace))
                {
                    if let Some(previous) = self.signup.flow.code.backspace(index) {
                        self.signup.segment_focus = Some(previous);
                    }
                }
            }
        });
    }

    /// Reconciles raw text-edit contents with the code entry: a full paste
    /// fills everything, a single digit advances focus, anything else is
    /// dropped.
    fn apply_segment_input(&mut self, index: usize, text: &str) {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            self.signup.flow.code.clear_digit(index);
            return;
        }

        if trimmed.chars().count() >= CODE_LEN {
            if self.signup.flow.code.paste(trimmed) {
                self.signup.segment_focus = Some(CODE_LEN - 1);
            }
            return;
        }

        if let Some(ch) = trimmed.chars().rev().find(|c| c.is_ascii_digit()) {
            if let Some(next) = self.signup.flow.code.set_digit(index, ch) {
                self.signup.segment_focus = Some(next);
            }
        }
    }

    fn render_signup_complete(&mut self, ui: &mut egui::Ui) {
        let message = self
            .signup
            .completed_message
            .clone()
            .unwrap_or_else(|| "Account created successfully!".to_string());

        ui.colored_label(palette::SUCCESS, RichText::new(message).strong());
        ui.label("The portal sign-in page has been opened in your browser.");
        ui.add_space(8.0);
        if ui.button("Sign up another account").clicked() {
            self.signup.reset();
        }
    }
}

fn form_field(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut String,
    error: &Option<String>,
    password: bool,
) {
    ui.label(label);
    ui.add(
        egui::TextEdit::singleline(value)
            .desired_width(260.0)
            .password(password),
    );
    if let Some(message) = error {
        ui.colored_label(palette::ERROR, message);
    }
    ui.add_space(6.0);
}

fn requirement_row(ui: &mut egui::Ui, met: bool, text: &str) {
    let (icon, color) = if met {
        ("✓", palette::SUCCESS)
    } else {
        ("✕", palette::MUTED)
    };
    ui.horizontal(|ui| {
        ui.colored_label(color, icon);
        ui.label(RichText::new(text).small());
    });
}
