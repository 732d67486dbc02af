use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const COMMON_PASSWORDS: [&str; 10] = [
    "123456",
    "password",
    "123456789",
    "12345678",
    "12345",
    "1234567",
    "qwerty",
    "abc123",
    "password1",
    "123123",
];

/// What the user has typed into the registration form. The CAPTCHA token is
/// read synchronously at submit time from the collaborator widget's field.
#[derive(Debug, Default, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub captcha_token: String,
}

/// Validated registration fields, captured when the form passes and replayed
/// to the verification endpoint as `userData`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegistrationData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub csrf_token: String,
    pub recaptcha: String,
}

/// Per-field inline errors; any set field blocks submission.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub captcha: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
            && self.captcha.is_none()
    }
}

impl RegistrationForm {
    /// Local validation; no network call happens unless this passes.
    pub fn validate(&self, csrf_token: &str) -> Result<RegistrationData, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() || name.chars().count() < 2 {
            errors.name = Some("Please enter your full name".to_string());
        }

        let email = self.email.trim();
        if !EMAIL_RE.is_match(email) {
            errors.email = Some("Please enter a valid email address".to_string());
        }

        if !password_checks(&self.password).all_met() {
            errors.password = Some("Password must meet all the requirements".to_string());
        }

        if self.confirm_password != self.password {
            errors.confirm_password = Some("Passwords do not match".to_string());
        }

        if self.captcha_token.trim().is_empty() {
            errors.captcha = Some("Please complete the CAPTCHA check".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RegistrationData {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            csrf_token: csrf_token.to_string(),
            recaptcha: self.captcha_token.trim().to_string(),
        })
    }
}

/// Individual policy requirements, shown live next to the password field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChecks {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

impl PasswordChecks {
    pub fn all_met(&self) -> bool {
        self.length && self.uppercase && self.lowercase && self.digit && self.special
    }

    fn met_count(&self) -> u8 {
        [self.length, self.uppercase, self.lowercase, self.digit, self.special]
            .iter()
            .filter(|m| **m)
            .count() as u8
    }
}

pub fn password_checks(password: &str) -> PasswordChecks {
    PasswordChecks {
        length: password.chars().count() >= 8,
        uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
        lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
        digit: password.chars().any(|c| c.is_ascii_digit()),
        special: password.chars().any(|c| !c.is_ascii_alphanumeric()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::VeryWeak => "Very Weak",
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Medium => "Medium",
            PasswordStrength::Strong => "Strong",
        }
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    match password_checks(password).met_count() {
        0..=2 => PasswordStrength::VeryWeak,
        3 => PasswordStrength::Weak,
        4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

pub fn is_common_password(password: &str) -> bool {
    COMMON_PASSWORDS.contains(&password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "Str0ng!pass".to_string(),
            confirm_password: "Str0ng!pass".to_string(),
            captcha_token: "tok-123".to_string(),
        }
    }

    #[test]
    fn valid_form_yields_registration_data() {
        let data = valid_form().validate("csrf-1").expect("form should pass");
        assert_eq!(data.name, "Ada Lovelace");
        assert_eq!(data.email, "ada@example.com");
        assert_eq!(data.csrf_token, "csrf-1");
        assert_eq!(data.recaptcha, "tok-123");
    }

    #[test]
    fn email_without_tld_is_rejected() {
        let mut form = valid_form();
        form.email = "a@b".to_string();

        let errors = form.validate("").unwrap_err();
        assert_eq!(
            errors.email.as_deref(),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn email_with_whitespace_is_rejected() {
        let mut form = valid_form();
        form.email = "a b@example.com".to_string();
        assert!(form.validate("").unwrap_err().email.is_some());
    }

    #[test]
    fn password_without_special_character_is_rejected() {
        let mut form = valid_form();
        form.password = "Abc12345".to_string();
        form.confirm_password = "Abc12345".to_string();

        let errors = form.validate("").unwrap_err();
        assert_eq!(
            errors.password.as_deref(),
            Some("Password must meet all the requirements")
        );
    }

    #[test]
    fn short_or_empty_name_is_rejected() {
        let mut form = valid_form();
        form.name = "A".to_string();
        assert!(form.validate("").unwrap_err().name.is_some());

        form.name = "   ".to_string();
        assert!(form.validate("").unwrap_err().name.is_some());
    }

    #[test]
    fn confirmation_mismatch_is_rejected() {
        let mut form = valid_form();
        form.confirm_password = "Different1!".to_string();

        let errors = form.validate("").unwrap_err();
        assert_eq!(
            errors.confirm_password.as_deref(),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn missing_captcha_token_is_rejected() {
        let mut form = valid_form();
        form.captcha_token = String::new();
        assert!(form.validate("").unwrap_err().captcha.is_some());
    }

    #[test]
    fn password_policy_checks_each_requirement() {
        let checks = password_checks("abc");
        assert!(!checks.length);
        assert!(!checks.uppercase);
        assert!(checks.lowercase);
        assert!(!checks.digit);
        assert!(!checks.special);

        assert!(password_checks("Str0ng!pass").all_met());
    }

    #[test]
    fn strength_bands_follow_met_requirement_count() {
        assert_eq!(password_strength(""), PasswordStrength::VeryWeak);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::VeryWeak);
        assert_eq!(password_strength("Abcdefgh"), PasswordStrength::Weak);
        assert_eq!(password_strength("Abcdefg1"), PasswordStrength::Medium);
        assert_eq!(password_strength("Abcdef1!"), PasswordStrength::Strong);
    }

    #[test]
    fn common_passwords_are_flagged() {
        assert!(is_common_password("qwerty"));
        assert!(!is_common_password("Str0ng!pass"));
    }
}
