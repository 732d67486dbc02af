use crate::report::AnalysisReport;
use crate::signup::{FieldErrors, OtpFlow, RegistrationData, RegistrationForm};
use crate::staging::StagedFileSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Staging,
    Signup,
    Admin,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Staging, Screen::Signup, Screen::Admin];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Staging => "Upload",
            Screen::Signup => "Sign Up",
            Screen::Admin => "Admin Tools",
        }
    }
}

/// Upload workflow phase. `Viewing` holds the resolved report for the result
/// dialog; it is dropped the moment the dialog closes.
#[derive(Debug, Clone, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Confirming,
    Uploading,
    Viewing(AnalysisReport),
}

#[derive(Default)]
pub struct StagingState {
    pub files: StagedFileSet,
    pub phase: UploadPhase,
    generation: u64,
}

impl StagingState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_upload(&mut self) -> u64 {
        self.phase = UploadPhase::Uploading;
        self.generation += 1;
        self.generation
    }

    /// Full reset; the bumped generation orphans any in-flight upload.
    pub fn reset(&mut self) {
        self.files.clear();
        self.phase = UploadPhase::Idle;
        self.generation += 1;
    }
}

#[derive(Default)]
pub struct SignupState {
    pub form: RegistrationForm,
    pub errors: FieldErrors,
    pub flow: OtpFlow,
    /// Captured when the form passes validation; replayed on verify.
    pub data: Option<RegistrationData>,
    /// Code segment that should grab keyboard focus next frame.
    pub segment_focus: Option<usize>,
    pub completed_message: Option<String>,
}

impl SignupState {
    pub fn reset(&mut self) {
        self.form = RegistrationForm::default();
        self.errors = FieldErrors::default();
        self.flow.reset();
        self.data = None;
        self.segment_focus = None;
        self.completed_message = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Delete,
    ResetPassword,
}

/// Admin tooling state: target user fields plus the confirmation dialog and
/// in-flight tracking.
#[derive(Default)]
pub struct AdminState {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub pending: Option<AdminAction>,
    pub busy: bool,
    pub temp_password: Option<String>,
    generation: u64,
}

impl AdminState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin(&mut self) -> u64 {
        self.busy = true;
        self.generation += 1;
        self.generation
    }

    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self::default();
        self.generation = generation;
    }
}

pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    pub expires_at: Instant,
}

/// Auto-dismissing notifications, newest last.
#[derive(Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, is_error: bool, now: Instant) {
        self.toasts.push(Toast {
            message: message.into(),
            is_error,
            expires_at: now + TOAST_LIFETIME,
        });
    }

    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.toasts.len() {
            self.toasts.remove(index);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
