use ring_params::{CHOICE_FIELDS, DEFAULT_PARAMS, NUMERIC_RANGES, NumericRange};

use crate::{ChatMessage, ChatRequest};

/// System message sent ahead of every concept instruction.
pub const SYSTEM_PROMPT: &str = "Return only valid JSON and never include markdown formatting.";

const EXAMPLE_SYMBOLS: [&str; 3] = ["Rose", "Chessboard", "Diamond"];

/// Builds the user instruction asking for a `{symbols, designParams}` object.
///
/// Legal enum values and numeric ranges come from the parameter schema tables,
/// so the instruction cannot drift from what normalization accepts.
pub fn build_concept_prompt(story: &str) -> String {
    let mut lines = vec![
        "You are a jewelry design assistant.".to_string(),
        "Return ONLY valid JSON with this shape:".to_string(),
        example_object(),
        "Rules:".to_string(),
        "- symbols: 3-5 short visual keywords.".to_string(),
    ];

    lines.extend(
        CHOICE_FIELDS
            .iter()
            .map(|(field, values)| format!("- {field} must be one of: {}", values.join(", "))),
    );
    lines.extend(NUMERIC_RANGES.iter().map(range_rule));

    lines.push("Do not include markdown.".to_string());
    lines.push(format!("Story: {story}"));
    lines.join("\n")
}

/// Full chat request for one concept generation.
pub fn concept_request(story: &str) -> ChatRequest {
    ChatRequest::json(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_concept_prompt(story)),
    ])
}

fn range_rule(range: &NumericRange) -> String {
    let kind = if range.integer { "integer " } else { "" };
    format!(
        "- {} range: {kind}{} to {}",
        range.field, range.min, range.max
    )
}

fn example_object() -> String {
    let params = serde_json::to_string(&DEFAULT_PARAMS).unwrap_or_else(|_| "{}".to_string());
    let symbols = EXAMPLE_SYMBOLS
        .iter()
        .map(|symbol| format!("\"{symbol}\""))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{\"symbols\":[{symbols}],\"designParams\":{params}}}")
}

#[cfg(test)]
mod tests {
    use ring_params::{DEFAULT_PARAMS, DesignParams};
    use serde_json::Value;

    use super::{SYSTEM_PROMPT, build_concept_prompt, concept_request};
    use crate::ChatRole;

    #[test]
    fn prompt_lists_every_choice_and_range() {
        let prompt = build_concept_prompt("A ring for my grandmother's garden");
        let lines: Vec<&str> = prompt.lines().collect();

        assert_eq!(lines[0], "You are a jewelry design assistant.");
        for expected in [
            "- symbols: 3-5 short visual keywords.",
            "- finish must be one of: yellow_gold, white_gold, rose_gold, silver, platinum",
            "- profile must be one of: classic, comfort, court",
            "- engraving must be one of: none, line, chevron, dots, twist",
            "- gemShape must be one of: round, princess, oval, marquise",
            "- bandRadius range: 0.7 to 1.6",
            "- bandThickness range: 0.05 to 0.22",
            "- bandWidth range: 0.08 to 0.45",
            "- gemCount range: integer 0 to 7",
            "- gemSize range: 0.05 to 0.25",
            "- gemHeight range: 0 to 0.22",
            "- twist range: 0 to 1",
            "Do not include markdown.",
        ] {
            assert!(lines.contains(&expected), "missing rule line: {expected}");
        }
        assert_eq!(
            lines.last().copied(),
            Some("Story: A ring for my grandmother's garden")
        );
    }

    #[test]
    fn example_shape_is_valid_json_with_default_params() {
        let prompt = build_concept_prompt("ignored story text");
        let example = prompt.lines().nth(2).expect("prompt should carry an example line");
        let value: Value = serde_json::from_str(example).expect("example should be valid JSON");

        assert_eq!(value["symbols"], serde_json::json!(["Rose", "Chessboard", "Diamond"]));
        let params: DesignParams = serde_json::from_value(value["designParams"].clone())
            .expect("example params should pass the schema");
        assert_eq!(params, DEFAULT_PARAMS);
        assert!(example.starts_with("{\"symbols\""));
    }

    #[test]
    fn concept_request_is_deterministic_json_mode() {
        let request = concept_request("Tides under a harvest moon");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert!(request.messages[1].content.ends_with("Story: Tides under a harvest moon"));
        assert_eq!(request.temperature, 0.0);
        assert!(request.json_object);
    }
}
