//! Turns a raw generation outcome into usable output, salvaging truncated
//! responses where possible.

use gemini_api::FinishReason;

use crate::model::GenerationOutcome;

/// Appended to salvaged output so the reader knows the draft was cut short.
pub const TRUNCATION_NOTICE: &str =
    "\n\n---\n*Note: generation stopped at the maximum output length, so this resume may be incomplete.*";

const TRUNCATION_FAILURE: &str = "generation stopped at the maximum output length";

/// Output that survived recovery, flagged when it was salvaged from a
/// truncated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredOutput {
    pub text: String,
    pub truncated: bool,
}

/// Applies the recovery policy for one completed generation call.
///
/// A truncated response with usable partial text is salvaged rather than
/// failed: the partial text is kept and [`TRUNCATION_NOTICE`] appended. When
/// salvage is impossible the error reports both the truncation and the
/// reason recovery failed, so neither is lost.
pub fn apply(outcome: GenerationOutcome) -> Result<RecoveredOutput, String> {
    match outcome.finish_reason {
        FinishReason::Stop => outcome.extraction.map(|text| RecoveredOutput {
            text,
            truncated: false,
        }),
        FinishReason::MaxTokens => match outcome.extraction {
            Ok(text) if !text.trim().is_empty() => Ok(RecoveredOutput {
                text: format!("{text}{TRUNCATION_NOTICE}"),
                truncated: true,
            }),
            Ok(_) => Err(format!(
                "{TRUNCATION_FAILURE}; recovery failed: the response carried no partial output"
            )),
            Err(error) => Err(format!("{TRUNCATION_FAILURE}; recovery failed: {error}")),
        },
        FinishReason::Safety => Err("response blocked by the service's safety filters".to_string()),
        FinishReason::Recitation => {
            Err("response stopped: the service detected recitation of source material".to_string())
        }
        FinishReason::Other => Err("generation ended for an unknown reason".to_string()),
    }
}
