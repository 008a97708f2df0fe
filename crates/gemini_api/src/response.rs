use serde::Deserialize;

/// Reason the model stopped producing tokens for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FinishReason {
    #[serde(rename = "STOP")]
    Stop,
    #[serde(rename = "MAX_TOKENS")]
    MaxTokens,
    #[serde(rename = "SAFETY")]
    Safety,
    #[serde(rename = "RECITATION")]
    Recitation,
    #[serde(other)]
    Other,
}

/// Parsed `generateContent` response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback", default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason", default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Returns the finish reason of the primary candidate.
    ///
    /// A response without candidates or without an explicit reason maps to
    /// [`FinishReason::Other`], which callers treat as a failed generation.
    pub fn finish_reason(&self) -> FinishReason {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason)
            .unwrap_or(FinishReason::Other)
    }

    /// Concatenates the primary candidate's text parts in wire order.
    ///
    /// Returns `None` when the candidate carries no readable text, which
    /// happens both for empty responses and for hard safety blocks.
    pub fn primary_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut merged = String::new();
        for part in &content.parts {
            if let Some(text) = part.text.as_deref() {
                merged.push_str(text);
            }
        }

        if merged.is_empty() {
            None
        } else {
            Some(merged)
        }
    }

    /// Returns the prompt-level block reason when the whole request was
    /// rejected before any candidate was produced.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
            .filter(|reason| !reason.is_empty())
    }
}
