//! Prompt assembly for the resume generation call.

/// Builds the generation prompt from the source document and the user's
/// career notes. Pure string assembly; empty inputs produce a prompt that
/// says so rather than failing.
pub fn build_prompt(source: &str, user_input: &str) -> String {
    let mut prompt = String::with_capacity(source.len() + user_input.len() + 512);

    prompt.push_str(
        "You are an expert resume writer. Draft a complete, professional resume \
         in Markdown based on the material below.\n\n\
         Requirements:\n\
         - Use clear Markdown headings for each section.\n\
         - Lead with a short professional summary.\n\
         - Present experience as concise, achievement-oriented bullet points.\n\
         - Keep every fact grounded in the provided material; invent nothing.\n\
         - Output only the resume itself, with no commentary before or after.\n\n",
    );

    prompt.push_str("## Existing document\n\n");
    if source.trim().is_empty() {
        prompt.push_str("(none provided; draft the resume from the notes alone)\n\n");
    } else {
        prompt.push_str(source.trim_end());
        prompt.push_str("\n\n");
    }

    prompt.push_str("## Career notes\n\n");
    if user_input.trim().is_empty() {
        prompt.push_str("(none provided)\n");
    } else {
        prompt.push_str(user_input.trim_end());
        prompt.push('\n');
    }

    prompt
}
