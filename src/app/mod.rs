mod signup_ui;
mod state;
mod ui;

use crate::api::{AdminAck, ApiClient, OtpAck, PasswordReset, UploadPart, UserUpdate, VerifyAck};
use crate::report::AnalysisReport;
use crate::session::IdleTimer;
use crate::signup::OtpPhase;
use crate::staging::{Category, StagedFile};
use eframe::{egui, App};
use std::future::Future;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

pub use state::{
    AdminAction, AdminState, Screen, SignupState, StagingState, ToastQueue, UploadPhase,
};

const DEFAULT_REDIRECT: &str = "/login?success=Account created successfully! Please login.";
const GENERIC_NETWORK_ERROR: &str = "An error occurred. Please try again later.";

pub enum AdminOutcome {
    Deleted(AdminAck),
    Updated(AdminAck),
    PasswordReset(PasswordReset),
}

/// Results of background network work, sent back to the UI thread. Every
/// event carries the generation current when its task started; stale events
/// are dropped on arrival.
pub enum AppEvent {
    UploadFinished {
        generation: u64,
        outcome: Result<serde_json::Value, String>,
    },
    OtpRequestFinished {
        generation: u64,
        outcome: Result<OtpAck, String>,
        resend: bool,
    },
    OtpVerifyFinished {
        generation: u64,
        outcome: Result<VerifyAck, String>,
    },
    AdminFinished {
        generation: u64,
        outcome: Result<AdminOutcome, String>,
    },
}

pub struct ChurnSight {
    pub(crate) screen: Screen,
    pub(crate) staging: StagingState,
    pub(crate) signup: SignupState,
    pub(crate) admin: AdminState,
    pub(crate) toasts: ToastQueue,
    idle: IdleTimer,
    api: ApiClient,
    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
}

impl ChurnSight {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let api = ApiClient::from_env();
        println!("Initializing ChurnSight Desktop (portal: {})", api.base_url());

        let (event_tx, event_rx) = channel();
        Self {
            screen: Screen::Staging,
            staging: StagingState::default(),
            signup: SignupState::default(),
            admin: AdminState::default(),
            toasts: ToastQueue::default(),
            idle: IdleTimer::new(Instant::now()),
            api,
            event_tx,
            event_rx,
        }
    }

    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(task);
        });
    }

    /// Routes picked or dropped paths into a category, surfacing every
    /// rejection as a toast.
    pub(crate) fn stage_paths(&mut self, category: Category, paths: Vec<PathBuf>, now: Instant) {
        let mut candidates = Vec::new();
        for path in paths {
            match StagedFile::from_path(&path) {
                Ok(file) => candidates.push(file),
                Err(e) => self.toasts.push(e, true, now),
            }
        }

        for rejection in self.staging.files.add_files(category, candidates) {
            println!(
                "Rejected {} from the {} section",
                rejection.name,
                rejection.category.key()
            );
            self.toasts.push(rejection.message(), true, now);
        }
    }

    /// Explicit confirmation precedes the network call.
    pub(crate) fn request_upload_confirmation(&mut self) {
        if self.staging.files.can_submit() {
            self.staging.phase = UploadPhase::Confirming;
        }
    }

    pub(crate) fn start_upload(&mut self) {
        let parts: Vec<UploadPart> = self
            .staging
            .files
            .iter_all()
            .map(|(category, file)| UploadPart {
                category,
                file_name: file.name.clone(),
                path: file.path.clone(),
            })
            .collect();

        let generation = self.staging.begin_upload();
        println!("Uploading {} staged files", parts.len());

        let api = self.api.clone();
        let tx = self.event_tx.clone();
        self.spawn_task(async move {
            let outcome = api.upload(parts).await;
            let _ = tx.send(AppEvent::UploadFinished {
                generation,
                outcome,
            });
        });
    }

    /// Validates the registration form; a passing form captures the data and
    /// fires the OTP request. No network call happens on validation failure.
    pub(crate) fn submit_signup(&mut self) {
        match self.signup.form.validate(self.api.csrf_token()) {
            Err(errors) => self.signup.errors = errors,
            Ok(data) => {
                self.signup.errors = Default::default();
                if let Some(generation) = self.signup.flow.begin_request() {
                    let api = self.api.clone();
                    let tx = self.event_tx.clone();
                    let email = data.email.clone();
                    let name = data.name.clone();
                    let recaptcha = data.recaptcha.clone();
                    self.signup.data = Some(data);

                    self.spawn_task(async move {
                        let outcome = api.request_otp(&email, &name, &recaptcha).await;
                        let _ = tx.send(AppEvent::OtpRequestFinished {
                            generation,
                            outcome,
                            resend: false,
                        });
                    });
                }
            }
        }
    }

    pub(crate) fn resend_otp(&mut self, now: Instant) {
        let Some(data) = self.signup.data.clone() else {
            return;
        };
        if let Some(generation) = self.signup.flow.begin_resend(now) {
            let api = self.api.clone();
            let tx = self.event_tx.clone();
            self.spawn_task(async move {
                let outcome = api.resend_otp(&data.email, &data.name).await;
                let _ = tx.send(AppEvent::OtpRequestFinished {
                    generation,
                    outcome,
                    resend: true,
                });
            });
        }
    }

    pub(crate) fn verify_otp(&mut self, now: Instant) {
        let Some(data) = self.signup.data.clone() else {
            return;
        };
        if let Some(generation) = self.signup.flow.begin_verify(now) {
            let otp = self.signup.flow.code.value();
            let api = self.api.clone();
            let tx = self.event_tx.clone();
            self.spawn_task(async move {
                let outcome = api.verify_otp(&otp, &data).await;
                let _ = tx.send(AppEvent::OtpVerifyFinished {
                    generation,
                    outcome,
                });
            });
        }
    }

    pub(crate) fn start_admin_action(&mut self, action: AdminAction) {
        let generation = self.admin.begin();
        let api = self.api.clone();
        let tx = self.event_tx.clone();
        let user_id = self.admin.user_id.trim().to_string();

        match action {
            AdminAction::Delete => {
                println!("Attempting to delete user with ID: {}", user_id);
                self.spawn_task(async move {
                    let outcome = api.delete_user(&user_id).await.map(AdminOutcome::Deleted);
                    let _ = tx.send(AppEvent::AdminFinished {
                        generation,
                        outcome,
                    });
                });
            }
            AdminAction::ResetPassword => {
                self.spawn_task(async move {
                    let outcome = api
                        .reset_password(&user_id)
                        .await
                        .map(AdminOutcome::PasswordReset);
                    let _ = tx.send(AppEvent::AdminFinished {
                        generation,
                        outcome,
                    });
                });
            }
        }
    }

    pub(crate) fn start_admin_update(&mut self) {
        let generation = self.admin.begin();
        let api = self.api.clone();
        let tx = self.event_tx.clone();
        let update = UserUpdate {
            user_id: self.admin.user_id.trim().to_string(),
            name: self.admin.name.trim().to_string(),
            email: self.admin.email.trim().to_string(),
            role: self.admin.role.trim().to_string(),
        };

        self.spawn_task(async move {
            let outcome = api.update_user(&update).await.map(AdminOutcome::Updated);
            let _ = tx.send(AppEvent::AdminFinished {
                generation,
                outcome,
            });
        });
    }

    fn drain_events(&mut self, now: Instant) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::UploadFinished {
                    generation,
                    outcome,
                } => self.apply_upload_event(generation, outcome, now),
                AppEvent::OtpRequestFinished {
                    generation,
                    outcome,
                    resend,
                } => self.apply_otp_request_event(generation, outcome, resend, now),
                AppEvent::OtpVerifyFinished {
                    generation,
                    outcome,
                } => self.apply_otp_verify_event(generation, outcome),
                AppEvent::AdminFinished {
                    generation,
                    outcome,
                } => self.apply_admin_event(generation, outcome, now),
            }
        }
    }

    fn apply_upload_event(
        &mut self,
        generation: u64,
        outcome: Result<serde_json::Value, String>,
        now: Instant,
    ) {
        if generation != self.staging.generation() {
            println!("Dropping stale upload response (generation {})", generation);
            return;
        }

        match outcome {
            Ok(value) => {
                println!("Upload completed; rendering analysis results");
                self.staging.phase = UploadPhase::Viewing(AnalysisReport::resolve(&value));
            }
            Err(e) => {
                eprintln!("Upload failed: {}", e);
                self.staging.phase = UploadPhase::Idle;
                self.toasts.push("Error uploading files!", true, now);
            }
        }
    }

    fn apply_otp_request_event(
        &mut self,
        generation: u64,
        outcome: Result<OtpAck, String>,
        resend: bool,
        now: Instant,
    ) {
        if !self.signup.flow.is_current(generation) {
            println!("Dropping stale OTP response (generation {})", generation);
            return;
        }

        let failure = |ack_message: Option<String>| {
            ack_message.unwrap_or_else(|| {
                if resend {
                    "Failed to resend OTP. Please try again.".to_string()
                } else {
                    "Failed to send OTP. Please try again.".to_string()
                }
            })
        };

        match outcome {
            Ok(ack) if ack.success => {
                if resend {
                    self.signup.flow.resend_succeeded(generation, now);
                } else {
                    self.signup.flow.request_succeeded(generation, now);
                }
                self.signup.segment_focus = Some(0);
            }
            Ok(ack) => {
                if resend {
                    self.signup.flow.resend_failed(generation, failure(ack.message));
                } else {
                    self.signup.flow.request_failed(generation, failure(ack.message));
                    // The CAPTCHA response is single-use; the widget resets.
                    self.signup.form.captcha_token.clear();
                }
            }
            Err(e) => {
                eprintln!("OTP request failed: {}", e);
                if resend {
                    self.signup
                        .flow
                        .resend_failed(generation, GENERIC_NETWORK_ERROR.to_string());
                } else {
                    self.signup
                        .flow
                        .request_failed(generation, GENERIC_NETWORK_ERROR.to_string());
                    self.signup.form.captcha_token.clear();
                }
            }
        }
    }

    fn apply_otp_verify_event(&mut self, generation: u64, outcome: Result<VerifyAck, String>) {
        if !self.signup.flow.is_current(generation) {
            println!(
                "Dropping stale verification response (generation {})",
                generation
            );
            return;
        }

        match outcome {
            Ok(ack) if ack.success => {
                self.signup.flow.verify_succeeded(generation);
                self.signup.completed_message =
                    Some("Account created successfully! Please login.".to_string());

                let redirect = ack
                    .redirect_url
                    .unwrap_or_else(|| DEFAULT_REDIRECT.to_string());
                let target = if redirect.starts_with('/') {
                    format!("{}{}", self.api.base_url(), redirect)
                } else {
                    redirect
                };
                if let Err(e) = open::that(&target) {
                    eprintln!("Failed to open sign-in page: {}", e);
                }
            }
            Ok(ack) => {
                let message = ack
                    .message
                    .unwrap_or_else(|| "Invalid OTP. Please try again.".to_string());
                self.signup.flow.verify_failed(generation, message);
                self.signup.segment_focus = Some(0);
            }
            Err(e) => {
                eprintln!("OTP verification failed: {}", e);
                self.signup
                    .flow
                    .verify_failed(generation, GENERIC_NETWORK_ERROR.to_string());
                self.signup.segment_focus = Some(0);
            }
        }
    }

    fn apply_admin_event(
        &mut self,
        generation: u64,
        outcome: Result<AdminOutcome, String>,
        now: Instant,
    ) {
        if generation != self.admin.generation() {
            println!("Dropping stale admin response (generation {})", generation);
            return;
        }
        self.admin.busy = false;

        match outcome {
            Ok(AdminOutcome::Deleted(ack)) => {
                self.admin.pending = None;
                self.toasts.push(
                    ack.message
                        .unwrap_or_else(|| "User deleted successfully".to_string()),
                    false,
                    now,
                );
            }
            Ok(AdminOutcome::Updated(ack)) => {
                self.toasts.push(
                    ack.message
                        .unwrap_or_else(|| "User updated successfully".to_string()),
                    false,
                    now,
                );
            }
            Ok(AdminOutcome::PasswordReset(reset)) => {
                self.admin.pending = None;
                self.admin.temp_password = Some(reset.temp_password);
                if let Some(message) = reset.message {
                    self.toasts.push(message, false, now);
                }
            }
            Err(e) => {
                // The confirmation dialog closes either way.
                self.admin.pending = None;
                self.toasts.push(e, true, now);
            }
        }
    }

    /// Rolling idle timeout: any input activity resets it; expiry signs the
    /// session out server-side and resets every workflow.
    fn process_idle(&mut self, ctx: &egui::Context, now: Instant) {
        let active = ctx.input(|i| {
            i.pointer.any_down()
                || i.pointer.delta() != egui::Vec2::ZERO
                || i.scroll_delta != egui::Vec2::ZERO
                || !i.events.is_empty()
        });

        if active {
            self.idle.note_activity(now);
        } else if self.idle.expired(now) {
            self.sign_out(now);
        }
    }

    fn sign_out(&mut self, now: Instant) {
        println!("Session idle timeout reached; signing out");

        let api = self.api.clone();
        self.spawn_task(async move {
            if let Err(e) = api.logout().await {
                eprintln!("Logout request failed: {}", e);
            }
        });

        self.staging.reset();
        self.signup.reset();
        self.admin.reset();
        self.screen = Screen::Staging;
        self.idle = IdleTimer::new(now);
        self.toasts
            .push("Session expired due to inactivity. You have been signed out.", true, now);
    }

    fn wants_ticks(&self) -> bool {
        !self.toasts.is_empty()
            || matches!(self.staging.phase, UploadPhase::Uploading)
            || matches!(
                self.signup.flow.phase(),
                OtpPhase::Requesting | OtpPhase::AwaitingCode | OtpPhase::Verifying
            )
            || self.admin.busy
    }
}

impl App for ChurnSight {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.drain_events(now);
        self.signup.flow.tick(now);
        self.toasts.prune(now);
        self.process_idle(ctx, now);

        self.render(ctx, now);

        // A quiescent frame still schedules a wake-up at the idle deadline;
        // without one, reactive mode would never call update() again and the
        // timeout could not fire.
        let wake = if self.wants_ticks() {
            Duration::from_millis(250)
        } else {
            self.idle.remaining(now)
        };
        ctx.request_repaint_after(wake);
    }
}
