//! Types needed by the API of our project.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /inference`. The provider stays a raw string so that an unknown tag is reported
/// as an unsupported provider rather than a malformed body.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRequest {
    pub model_id: String,
    pub provider: String,
    pub input: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
}

/// Modality corresponds to the medium a model consumes or produces.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Audio,
    Video,
    Multimodal,
}

/// Body of `POST /compare`. Missing or non-array fields read as empty so they fail validation with
/// the same message as empty arrays.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    #[serde(default, deserialize_with = "lenient_string_array")]
    pub models: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_array")]
    pub metrics: Vec<String>,
}

/// Non-string entries keep their JSON text, so `[5]` names the model or metric `5`.
fn lenient_string_array<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// One named axis of model comparison.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Latency,
    Modality,
    Popularity,
    Cost,
    Capabilities,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Latency,
        Metric::Modality,
        Metric::Popularity,
        Metric::Cost,
        Metric::Capabilities,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Latency => "latency",
            Metric::Modality => "modality",
            Metric::Popularity => "popularity",
            Metric::Cost => "cost",
            Metric::Capabilities => "capabilities",
        }
    }

    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Metric::name).collect()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.name() == s)
            .ok_or_else(|| s.to_owned())
    }
}

/// Price in currency units per 1K tokens.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Cost {
    pub input: f64,
    pub output: f64,
}

impl Cost {
    pub const fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }
}

/// Which media a model natively handles.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub text: bool,
    pub image: bool,
    pub audio: bool,
    pub video: bool,
    pub multimodal: bool,
}

impl Capabilities {
    pub const TEXT_ONLY: Capabilities = Capabilities {
        text: true,
        image: false,
        audio: false,
        video: false,
        multimodal: false,
    };

    pub const TEXT_AND_VISION: Capabilities = Capabilities {
        text: true,
        image: true,
        audio: false,
        video: false,
        multimodal: true,
    };
}

/// Derived metadata for one model. The default value is the record substituted whenever a lookup
/// fails or a model is not recognized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub modality: String,
    /// Proxy value: download count for hosted models.
    pub latency: u64,
    /// Proxy value: like count for hosted models.
    pub popularity: u64,
    pub cost: Cost,
    pub capabilities: Capabilities,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            modality: "unknown".to_owned(),
            latency: 0,
            popularity: 0,
            cost: Cost::default(),
            capabilities: Capabilities::default(),
        }
    }
}

/// Projection of [ModelMetadata] onto the requested metrics. Unrequested fields are left out of
/// the serialized row entirely.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Cost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
}

/// Body of `POST /demo`. Both fields are optional here so the handler can report which one is
/// missing.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DemoUrlRequest {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DemoUrlResponse {
    pub demo_url: String,
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    pub fn inference_request_serde() {
        let request = serde_json::from_str::<InferenceRequest>(
            r#"
            {
                "modelId": "gpt-4",
                "provider": "openai",
                "input": {"messages": [{"role": "user", "content": "hi"}]},
                "modality": "text"
            }
        "#,
        )
        .unwrap();

        assert_eq!(request.model_id, "gpt-4");
        assert_eq!(request.provider, "openai");
        assert_eq!(request.modality, Some(Modality::Text));
        assert_eq!(
            Value::Object(request.input),
            json!({"messages": [{"role": "user", "content": "hi"}]})
        );
    }

    #[test]
    pub fn inference_request_without_modality() {
        let request = serde_json::from_str::<InferenceRequest>(
            r#"{"modelId":"test-model","provider":"huggingface","input":{"inputs":"hello"}}"#,
        )
        .unwrap();
        assert_eq!(request.modality, None);
    }

    #[test]
    pub fn compare_request_non_arrays_read_as_empty() {
        let request = serde_json::from_value::<CompareRequest>(json!({
            "models": "gpt-4",
            "metrics": null
        }))
        .unwrap();
        assert!(request.models.is_empty());
        assert!(request.metrics.is_empty());

        let request = serde_json::from_value::<CompareRequest>(json!({
            "models": ["gpt-4", 5],
            "metrics": ["cost", true]
        }))
        .unwrap();
        assert_eq!(request.models, vec!["gpt-4", "5"]);
        assert_eq!(request.metrics, vec!["cost", "true"]);

        let request = serde_json::from_value::<CompareRequest>(json!({})).unwrap();
        assert!(request.models.is_empty());
    }

    #[test]
    pub fn comparison_row_omits_unrequested_fields() {
        let row = ComparisonRow {
            id: "gpt-4".to_owned(),
            modality: None,
            latency: None,
            popularity: None,
            cost: Some(Cost::new(0.03, 0.06)),
            capabilities: Some(Capabilities::TEXT_AND_VISION),
        };

        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"id":"gpt-4","cost":{"input":0.03,"output":0.06},"capabilities":{"text":true,"image":true,"audio":false,"video":false,"multimodal":true}}"#
        );
    }

    #[test]
    pub fn metric_parsing() {
        assert_eq!("latency".parse::<Metric>(), Ok(Metric::Latency));
        assert_eq!("capabilities".parse::<Metric>(), Ok(Metric::Capabilities));
        assert_eq!("Latency".parse::<Metric>(), Err("Latency".to_owned()));
    }

    #[test]
    pub fn default_metadata() {
        assert_eq!(
            serde_json::to_value(ModelMetadata::default()).unwrap(),
            json!({
                "modality": "unknown",
                "latency": 0,
                "popularity": 0,
                "cost": {"input": 0.0, "output": 0.0},
                "capabilities": {
                    "text": false,
                    "image": false,
                    "audio": false,
                    "video": false,
                    "multimodal": false
                }
            })
        );
    }

    #[test]
    pub fn demo_response_serde() {
        let response = DemoUrlResponse {
            demo_url: "https://huggingface.co/test-model".to_owned(),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"demoUrl":"https://huggingface.co/test-model"}"#
        );
    }
}
