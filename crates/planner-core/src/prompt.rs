use crate::types::TravelRequest;

pub const PROMPT_WORD_LIMIT: u32 = 300;

const PROMPT_SECTIONS: [&str; 4] = [
    "Daily activities",
    "Budget-friendly dining options",
    "Transportation tips",
    "Cultural highlights",
];

/// Builds the itinerary instruction sent to the completion service.
///
/// Field values are interpolated as-is; the output is only ever read by the
/// text model.
pub fn build_prompt(request: &TravelRequest) -> String {
    let mut prompt = format!(
        "Create a detailed {}-day travel itinerary for {} for {} year olds with a {} budget using {}. Include:",
        request.duration, request.location, request.age_group, request.budget, request.transport,
    );

    for section in PROMPT_SECTIONS {
        prompt.push_str("\n- ");
        prompt.push_str(section);
    }

    prompt.push_str(&format!("\nKeep response under {PROMPT_WORD_LIMIT} words."));
    prompt
}
