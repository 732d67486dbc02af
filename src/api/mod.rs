mod types;

pub use types::{AdminAck, OtpAck, PasswordReset, UploadResponse, UserUpdate, VerifyAck};

use crate::signup::RegistrationData;
use crate::staging::Category;
use serde_json::json;
use std::path::PathBuf;

pub const DEFAULT_PORTAL_URL: &str = "http://localhost:5000";

/// One staged file ready for the multipart body, tagged with the category
/// that decides its field name.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub category: Category,
    pub file_name: String,
    pub path: PathBuf,
}

/// Thin client over the portal's HTTP contract. Every state-changing request
/// carries the anti-forgery token as `X-CSRFToken`; a missing token is sent
/// as empty rather than blocking the request.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    csrf_token: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String, csrf_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: csrf_token.unwrap_or_default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var("CHURNSIGHT_PORTAL_URL").unwrap_or_else(|_| DEFAULT_PORTAL_URL.into());
        let csrf_token = std::env::var("CHURNSIGHT_CSRF_TOKEN").ok();
        Self::new(base_url, csrf_token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("X-CSRFToken", self.csrf_token.clone())
    }

    /// Submits the staged set as one multipart request and returns the raw
    /// `result` payload for resolution. Single user-initiated action; no
    /// retries.
    pub async fn upload(&self, parts: Vec<UploadPart>) -> Result<serde_json::Value, String> {
        let mut form = reqwest::multipart::Form::new();

        for part in parts {
            let bytes = tokio::fs::read(&part.path)
                .await
                .map_err(|e| format!("Failed to read {}: {}", part.file_name, e))?;
            form = form.part(
                part.category.field_name(),
                reqwest::multipart::Part::bytes(bytes).file_name(part.file_name),
            );
        }

        let response = self
            .post("/upload")
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => {
                return Err("Not authorized. Please sign in to the portal again.".to_string())
            }
            _ if !status.is_success() => {
                return Err(format!("Upload failed with status: {}", status))
            }
            _ => {}
        }

        let payload: UploadResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse upload response: {}", e))?;
        Ok(payload.result)
    }

    pub async fn request_otp(
        &self,
        email: &str,
        name: &str,
        recaptcha: &str,
    ) -> Result<OtpAck, String> {
        self.otp_call(json!({
            "email": email,
            "name": name,
            "recaptcha": recaptcha,
        }))
        .await
    }

    pub async fn resend_otp(&self, email: &str, name: &str) -> Result<OtpAck, String> {
        self.otp_call(json!({
            "email": email,
            "name": name,
            "resend": true,
        }))
        .await
    }

    async fn otp_call(&self, body: serde_json::Value) -> Result<OtpAck, String> {
        let response = self
            .post("/request_otp")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }

    /// Sends the assembled code plus the originally captured registration
    /// fields; the server creates the account on success.
    pub async fn verify_otp(
        &self,
        otp: &str,
        user: &RegistrationData,
    ) -> Result<VerifyAck, String> {
        let response = self
            .post("/verify_otp")
            .json(&json!({
                "email": user.email,
                "otp": otp,
                "userData": user,
            }))
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<AdminAck, String> {
        let response = self
            .post(&format!("/admin/delete_user/{}", user_id))
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        Self::admin_ack(response).await
    }

    pub async fn update_user(&self, update: &UserUpdate) -> Result<AdminAck, String> {
        let response = self
            .post("/admin/update_user")
            .json(update)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        Self::admin_ack(response).await
    }

    pub async fn reset_password(&self, user_id: &str) -> Result<PasswordReset, String> {
        let response = self
            .post("/admin/reset_password")
            .json(&json!({ "userId": user_id }))
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            return Err(Self::error_message(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }

    /// Fire on idle expiry so the server terminates the session.
    pub async fn logout(&self) -> Result<(), String> {
        self.client
            .get(self.endpoint("/logout"))
            .send()
            .await
            .map_err(|e| format!("Failed to reach logout endpoint: {}", e))?;
        Ok(())
    }

    async fn admin_ack(response: reqwest::Response) -> Result<AdminAck, String> {
        if !response.status().is_success() {
            return Err(Self::error_message(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }

    /// Prefers the server's own message over a bare status line.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<AdminAck>().await {
            Ok(AdminAck {
                message: Some(message),
            }) => message,
            _ => format!("Server error occurred (status {})", status),
        }
    }
}
