mod template;

pub use template::{parse_template, reformat_timestamp, ParsedTemplate, RESULTS_BANNER};

use chrono::Local;
use serde_json::Value;

pub const NO_DECISION: &str = "No final decision available";
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";

/// Binary verdict derived from the data model's numeric prediction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Stay,
    Churn,
}

impl Verdict {
    /// Code 0 means the customer stays; every other value means churn.
    pub fn from_code(code: i64) -> Self {
        if code == 0 {
            Verdict::Stay
        } else {
            Verdict::Churn
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Stay => "STAY",
            Verdict::Churn => "CHURN",
        }
    }
}

/// Sentiment flag for the chat output; set only on the two exact tokens the
/// portal emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTone {
    Positive,
    Negative,
}

pub fn chat_tone(output: &str) -> Option<ChatTone> {
    match output {
        "POSITIVE" => Some(ChatTone::Positive),
        "NEGATIVE" => Some(ChatTone::Negative),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionDetail {
    Scored {
        stay_probability: Option<f64>,
        churn_probability: Option<f64>,
        verdict: Verdict,
    },
    Plain(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePrediction {
    pub file: String,
    pub detail: PredictionDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataOutput {
    Text(String),
    Predictions(Vec<FilePrediction>),
}

/// Canonical upload result, resolved from either response shape before any
/// rendering happens. Transient: lives only while the result dialog is open.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub customer_id: String,
    pub audio: String,
    pub data: DataOutput,
    pub chat: String,
    pub final_decision: String,
    pub processed_at: String,
    pub triggered_by: String,
}

impl AnalysisReport {
    /// Resolves the portal's `result` payload. A string bearing the results
    /// banner is the rendered notification template; everything else is
    /// treated as structured JSON.
    pub fn resolve(value: &Value) -> Self {
        match value {
            Value::String(text) if text.contains(RESULTS_BANNER) => Self::from_template(text),
            _ => Self::from_structured(value),
        }
    }

    fn from_template(text: &str) -> Self {
        let parsed = parse_template(text);

        Self {
            customer_id: UNKNOWN.to_string(),
            audio: parsed.audio_model.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            data: parsed
                .data_model
                .map(|v| resolve_data_output(&v))
                .unwrap_or_else(|| DataOutput::Text("No data available".to_string())),
            chat: parsed.chat_model.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            final_decision: NO_DECISION.to_string(),
            processed_at: parsed.timestamp.unwrap_or_else(now_label),
            triggered_by: parsed.user.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    fn from_structured(value: &Value) -> Self {
        Self {
            customer_id: string_field(value, "customer_id").unwrap_or_else(|| UNKNOWN.to_string()),
            audio: string_field(value, "audio_output").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            data: value
                .get("data_output")
                .map(resolve_data_output)
                .unwrap_or_else(|| DataOutput::Text("No data available".to_string())),
            chat: string_field(value, "chat_output").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            final_decision: string_field(value, "final_decision")
                .unwrap_or_else(|| NO_DECISION.to_string()),
            processed_at: now_label(),
            triggered_by: string_field(value, "triggered_by")
                .unwrap_or_else(|| "System".to_string()),
        }
    }
}

fn now_label() -> String {
    Local::now().format("%m/%d/%Y, %H:%M:%S").to_string()
}

/// Reads a field as display text; numbers and booleans are accepted,
/// null/missing are not.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn resolve_data_output(value: &Value) -> DataOutput {
    match value {
        Value::Array(items) => {
            DataOutput::Predictions(items.iter().map(resolve_prediction).collect())
        }
        Value::String(s) => DataOutput::Text(s.clone()),
        other => DataOutput::Text(other.to_string()),
    }
}

fn resolve_prediction(item: &Value) -> FilePrediction {
    let file = string_field(item, "file").unwrap_or_else(|| UNKNOWN.to_string());

    let detail = match item.get("prediction") {
        Some(Value::Object(pred)) => PredictionDetail::Scored {
            stay_probability: pred.get("stay_probability").and_then(Value::as_f64),
            churn_probability: pred.get("churn_probability").and_then(Value::as_f64),
            verdict: Verdict::from_code(
                pred.get("prediction").and_then(Value::as_i64).unwrap_or(1),
            ),
        },
        Some(Value::String(s)) => PredictionDetail::Plain(s.clone()),
        Some(other) => PredictionDetail::Plain(other.to_string()),
        None => PredictionDetail::Plain(NOT_AVAILABLE.to_string()),
    };

    FilePrediction { file, detail }
}

/// Probability rendered as a percentage with two decimals.
pub fn percent(probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!("{:.2}%", p * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verdict_code_zero_is_stay_anything_else_churn() {
        assert_eq!(Verdict::from_code(0), Verdict::Stay);
        assert_eq!(Verdict::from_code(1), Verdict::Churn);
        assert_eq!(Verdict::from_code(-3), Verdict::Churn);
        assert_eq!(Verdict::from_code(42), Verdict::Churn);
    }

    #[test]
    fn chat_tone_flags_only_exact_tokens() {
        assert_eq!(chat_tone("POSITIVE"), Some(ChatTone::Positive));
        assert_eq!(chat_tone("NEGATIVE"), Some(ChatTone::Negative));
        assert_eq!(chat_tone("positive"), None);
        assert_eq!(chat_tone("NEUTRAL"), None);
    }

    #[test]
    fn structured_result_resolves_to_canonical_report() {
        let value = json!({
            "customer_id": "C-1042",
            "audio_output": "calm",
            "data_output": [
                {
                    "file": "usage.csv",
                    "prediction": {
                        "stay_probability": 0.9131,
                        "churn_probability": 0.0869,
                        "prediction": 0
                    }
                }
            ],
            "chat_output": "NEGATIVE",
            "final_decision": "Retain with offer",
            "triggered_by": "alice"
        });

        let report = AnalysisReport::resolve(&value);
        assert_eq!(report.customer_id, "C-1042");
        assert_eq!(report.audio, "calm");
        assert_eq!(report.chat, "NEGATIVE");
        assert_eq!(report.final_decision, "Retain with offer");
        assert_eq!(report.triggered_by, "alice");

        match &report.data {
            DataOutput::Predictions(preds) => {
                assert_eq!(preds.len(), 1);
                assert_eq!(preds[0].file, "usage.csv");
                match &preds[0].detail {
                    PredictionDetail::Scored {
                        stay_probability,
                        churn_probability,
                        verdict,
                    } => {
                        assert_eq!(percent(*stay_probability), "91.31%");
                        assert_eq!(percent(*churn_probability), "8.69%");
                        assert_eq!(*verdict, Verdict::Stay);
                    }
                    other => panic!("expected scored prediction, got {:?}", other),
                }
            }
            other => panic!("expected predictions, got {:?}", other),
        }
    }

    #[test]
    fn structured_result_with_missing_fields_uses_placeholders() {
        let report = AnalysisReport::resolve(&json!({}));
        assert_eq!(report.customer_id, UNKNOWN);
        assert_eq!(report.audio, NOT_AVAILABLE);
        assert_eq!(report.chat, NOT_AVAILABLE);
        assert_eq!(report.final_decision, NO_DECISION);
        assert_eq!(report.triggered_by, "System");
        assert_eq!(report.data, DataOutput::Text("No data available".to_string()));
    }

    #[test]
    fn scalar_data_output_stays_text() {
        let report = AnalysisReport::resolve(&json!({ "data_output": "no model loaded" }));
        assert_eq!(report.data, DataOutput::Text("no model loaded".to_string()));
    }

    #[test]
    fn prediction_without_numeric_code_defaults_to_churn() {
        let value = json!({
            "data_output": [{ "file": "x.csv", "prediction": { "stay_probability": 0.5 } }]
        });
        let report = AnalysisReport::resolve(&value);
        match &report.data {
            DataOutput::Predictions(preds) => match &preds[0].detail {
                PredictionDetail::Scored { verdict, .. } => assert_eq!(*verdict, Verdict::Churn),
                other => panic!("expected scored prediction, got {:?}", other),
            },
            other => panic!("expected predictions, got {:?}", other),
        }
    }

    #[test]
    fn templated_result_resolves_through_the_parser() {
        let text = format!(
            "{}\nAudio Model: agitated\nData Model: [{{\"file\": \"d.csv\", \"prediction\": {{\"prediction\": 2}}}}]\n\
             Chat Model: POSITIVE\nTimestamp: 2025-04-01 10:30:00\ntriggered by user: Bob\n",
            RESULTS_BANNER
        );

        let report = AnalysisReport::resolve(&serde_json::Value::String(text));
        assert_eq!(report.audio, "agitated");
        assert_eq!(report.chat, "POSITIVE");
        assert_eq!(report.triggered_by, "Bob");
        assert_eq!(report.processed_at, "04/01/2025, 10:30:00");
        assert_eq!(report.customer_id, UNKNOWN);
        assert_eq!(report.final_decision, NO_DECISION);

        match &report.data {
            DataOutput::Predictions(preds) => {
                assert_eq!(preds[0].file, "d.csv");
                match &preds[0].detail {
                    PredictionDetail::Scored { verdict, .. } => {
                        assert_eq!(*verdict, Verdict::Churn)
                    }
                    other => panic!("expected scored prediction, got {:?}", other),
                }
            }
            other => panic!("expected predictions, got {:?}", other),
        }
    }

    #[test]
    fn plain_string_without_banner_is_not_a_template() {
        let report = AnalysisReport::resolve(&serde_json::Value::String(
            "Audio Model: should not parse".to_string(),
        ));
        // No banner means the structured path, which finds no fields.
        assert_eq!(report.audio, NOT_AVAILABLE);
    }
}
