use serde::{Deserialize, Serialize};

/// Envelope around the /upload response; `result` may be structured JSON or
/// the rendered notification template.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OtpAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VerifyAck {
    pub success: bool,
    #[serde(rename = "redirectUrl", default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AdminAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PasswordReset {
    pub temp_password: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserUpdate {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_ack_reads_camel_case_redirect() {
        let ack: VerifyAck = serde_json::from_str(
            r#"{"success": true, "redirectUrl": "/login?success=1"}"#,
        )
        .unwrap();
        assert!(ack.success);
        assert_eq!(ack.redirect_url.as_deref(), Some("/login?success=1"));
        assert_eq!(ack.message, None);
    }

    #[test]
    fn otp_ack_tolerates_missing_message() {
        let ack: OtpAck = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!ack.success);
        assert_eq!(ack.message, None);
    }

    #[test]
    fn password_reset_requires_temp_password() {
        let reset: PasswordReset =
            serde_json::from_str(r#"{"temp_password": "Zq8!x", "message": "Password reset"}"#)
                .unwrap();
        assert_eq!(reset.temp_password, "Zq8!x");

        assert!(serde_json::from_str::<PasswordReset>(r#"{"message": "no"}"#).is_err());
    }

    #[test]
    fn user_update_serializes_camel_case_id() {
        let update = UserUpdate {
            user_id: "7".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: "analyst".to_string(),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["userId"], "7");
        assert_eq!(value["role"], "analyst");
    }
}
