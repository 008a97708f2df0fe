use serde::{Deserialize, Serialize};

/// Canonical request payload shape for the `generateContent` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(
        rename = "generationConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    #[serde(
        rename = "maxOutputTokens",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerateContentRequest {
    /// Wraps a single user prompt into the wire shape.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_prompt_wraps_user_content() {
        let request = GenerateContentRequest::from_prompt("draft a resume");

        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[0].parts[0].text, "draft a resume");
        assert!(request.generation_config.is_none());
    }

    #[test]
    fn serializes_generation_config_with_wire_names() {
        let request = GenerateContentRequest::from_prompt("p").with_generation_config(
            GenerationConfig {
                max_output_tokens: Some(2048),
                temperature: Some(0.4),
            },
        );

        let value = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(value["contents"][0]["parts"][0]["text"], "p");
    }

    #[test]
    fn omits_generation_config_when_absent() {
        let value = serde_json::to_value(GenerateContentRequest::from_prompt("p"))
            .expect("request should serialize");
        assert!(value.get("generationConfig").is_none());
    }
}
