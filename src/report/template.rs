use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Banner the portal's notification template always carries. Its presence is
/// what distinguishes the templated result shape from structured JSON.
pub const RESULTS_BANNER: &str = "📋 Model Results Summary";

static AUDIO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Audio Model: ([^\n]*)").unwrap());
static DATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Data Model: ([^\n]*)").unwrap());
static CHAT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Chat Model: ([^\n]*)").unwrap());
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Timestamp: ([^\n]*)").unwrap());
static USER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)triggered by user: ([^\n]*)").unwrap());

/// Fields recovered from the notification template. Every field is optional;
/// the renderer substitutes placeholders for anything missing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedTemplate {
    pub audio_model: Option<String>,
    pub data_model: Option<serde_json::Value>,
    pub chat_model: Option<String>,
    pub timestamp: Option<String>,
    pub user: Option<String>,
}

pub fn parse_template(text: &str) -> ParsedTemplate {
    let mut parsed = ParsedTemplate::default();

    parsed.audio_model = capture(&AUDIO_RE, text);
    parsed.chat_model = capture(&CHAT_RE, text);
    parsed.user = capture(&USER_RE, text);

    if let Some(raw) = capture(&DATA_RE, text) {
        parsed.data_model = Some(parse_data_field(&raw));
    }

    if let Some(raw) = capture(&TIME_RE, text) {
        parsed.timestamp = Some(reformat_timestamp(&raw));
    }

    parsed
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('\r').to_string())
}

/// The data field may hold a JSON list of per-file predictions; anything that
/// does not parse stays raw text.
fn parse_data_field(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    serde_json::Value::String(raw.to_string())
}

/// Reformats a template timestamp for display, falling back to the raw
/// string when it does not parse.
pub fn reformat_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return dt.format("%m/%d/%Y, %H:%M:%S").to_string();
    }

    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return dt.format("%m/%d/%Y, %H:%M:%S").to_string();
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recovers_every_field_from_a_full_template() {
        let text = format!(
            "{}\nAudio Model: X\nData Model: [\"a\"]\nChat Model: POSITIVE\n\
             Timestamp: 2025-04-01T10:30:00+00:00\nThis run was triggered by user: Bob\n",
            RESULTS_BANNER
        );

        let parsed = parse_template(&text);
        assert_eq!(parsed.audio_model.as_deref(), Some("X"));
        assert_eq!(parsed.data_model, Some(json!(["a"])));
        assert_eq!(parsed.chat_model.as_deref(), Some("POSITIVE"));
        assert_eq!(parsed.user.as_deref(), Some("Bob"));
        assert_eq!(parsed.timestamp.as_deref(), Some("04/01/2025, 10:30:00"));
    }

    #[test]
    fn missing_fields_stay_none() {
        let parsed = parse_template(RESULTS_BANNER);
        assert_eq!(parsed, ParsedTemplate::default());
    }

    #[test]
    fn data_field_that_is_not_json_stays_raw_text() {
        let parsed = parse_template("Data Model: model unavailable");
        assert_eq!(
            parsed.data_model,
            Some(serde_json::Value::String("model unavailable".to_string()))
        );
    }

    #[test]
    fn malformed_json_list_stays_raw_text() {
        let parsed = parse_template("Data Model: [not, valid json]");
        assert_eq!(
            parsed.data_model,
            Some(serde_json::Value::String("[not, valid json]".to_string()))
        );
    }

    #[test]
    fn unparseable_timestamp_falls_back_to_raw() {
        assert_eq!(reformat_timestamp("sometime yesterday"), "sometime yesterday");
    }

    #[test]
    fn naive_timestamp_is_reformatted() {
        assert_eq!(
            reformat_timestamp("2025-04-01 08:05:09"),
            "04/01/2025, 08:05:09"
        );
    }

    #[test]
    fn user_marker_is_case_insensitive() {
        let parsed = parse_template("Triggered By User: alice");
        assert_eq!(parsed.user.as_deref(), Some("alice"));
    }
}
