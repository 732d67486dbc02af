mod form;
mod otp;

pub use form::{
    is_common_password, password_checks, password_strength, FieldErrors, PasswordChecks,
    PasswordStrength, RegistrationData, RegistrationForm,
};
pub use otp::{CodeEntry, OtpFlow, OtpPhase, CODE_LEN, OTP_VALIDITY, RESEND_COOLDOWN};
