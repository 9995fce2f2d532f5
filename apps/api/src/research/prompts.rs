// Research prompt constants and prompt composition.

use crate::research::models::ResearchRequest;

pub const RESEARCH_SYSTEM: &str = "\
You are a grant research assistant for nonprofit and community organizations. \
Recommend real, currently relevant funding opportunities that fit the organization. \
Do NOT invent funders, amounts or deadlines. \
If a detail is unknown, omit that line rather than guessing.";

/// Output shape the report parser understands: numbered entries separated by blank
/// lines, each with labelled detail lines.
pub const FORMAT_INSTRUCTION: &str = "\
Format your answer as a numbered list. Start each opportunity on a new line as \
\"<number>. <grant name>\" and separate opportunities with a blank line. \
Under each name, add these lines when known:
Organization: <funder>
Amount: <award size>
Deadline: <application deadline>
Then write a short paragraph on eligibility and fit.";

/// Builds the prompt sent to the language model.
pub fn compose_prompt(request: &ResearchRequest) -> String {
    let mut prompt = request.prompt.trim().to_string();

    if let Some(org) = request
        .org_description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        prompt.push_str("\n\nOrganization profile:\n");
        prompt.push_str(org);
    }

    if !request.context_parameters.is_empty() {
        prompt.push_str("\n\nFocus parameters:");
        for param in &request.context_parameters {
            prompt.push_str(&format!("\n- {}: {}", param.label, param.description));
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(FORMAT_INSTRUCTION);
    prompt
}
