//! Pulls generated text out of a completion response.
//!
//! Responses have come back in more than one shape, so extraction walks an
//! ordered list of strategies and stops at the first one that yields
//! non-blank text. When none do, the fixed fallback plan is used.

use serde_json::Value;

use crate::provider::Completion;

pub const FALLBACK_PLAN: &str = "Sorry, we couldn't generate a travel plan at this time.";

type Strategy = fn(&Value) -> Option<&str>;

const STRATEGIES: [(&str, Strategy); 2] = [
    ("generations[0].text", first_generation_text),
    ("text", top_level_text),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Named after the response path the text was read from.
    Field(&'static str),
    Fallback,
}

pub fn extract_text(response: &Value) -> Completion {
    for (path, strategy) in STRATEGIES {
        if let Some(text) = strategy(response)
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            return Completion {
                text: text.to_string(),
                source: TextSource::Field(path),
            };
        }
    }

    Completion {
        text: FALLBACK_PLAN.to_string(),
        source: TextSource::Fallback,
    }
}

fn first_generation_text(response: &Value) -> Option<&str> {
    response
        .get("generations")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
}

fn top_level_text(response: &Value) -> Option<&str> {
    response.get("text")?.as_str()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prefers_generations_shape() {
        let completion = extract_text(&json!({
            "generations": [{ "text": "  Day 1: Eiffel Tower\n" }],
            "text": "ignored"
        }));

        assert_eq!(completion.text, "Day 1: Eiffel Tower");
        assert_eq!(completion.source, TextSource::Field("generations[0].text"));
    }

    #[test]
    fn falls_back_to_top_level_text() {
        let completion = extract_text(&json!({ "text": "Day 1: Colosseum" }));

        assert_eq!(completion.text, "Day 1: Colosseum");
        assert_eq!(completion.source, TextSource::Field("text"));
    }

    #[test]
    fn blank_generation_falls_through_to_next_strategy() {
        let completion = extract_text(&json!({
            "generations": [{ "text": "   " }],
            "text": "Day 1: Prado"
        }));

        assert_eq!(completion.text, "Day 1: Prado");
    }

    #[test]
    fn unknown_shape_uses_fallback() {
        for response in [
            json!({}),
            json!({ "generations": [] }),
            json!({ "generations": [{ "content": "x" }] }),
            json!({ "text": 42 }),
            json!("just a string"),
        ] {
            let completion = extract_text(&response);
            assert_eq!(completion.text, FALLBACK_PLAN, "{response}");
            assert_eq!(completion.source, TextSource::Fallback);
        }
    }
}
