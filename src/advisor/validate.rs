//! Structural validation of raw LLM output.
//!
//! The raw text is narrowed to its JSON object (a surrounding markdown fence
//! and any chatter outside the outermost braces are dropped), parsed as an
//! untyped value, checked for cardinality and required fields, and only then
//! converted into typed records. Nothing semantic is checked.

use serde_json::{Map, Value};
use tracing::warn;

use super::error::AdvisorError;
use super::intent::Intent;
use super::types::{RecommendationItem, RecommendationResponse};

/// Field check order; the first missing field is the one reported.
const FIELDS: [&str; 7] = ["name", "line", "grade", "brand", "notes", "reason", "situation"];

fn is_required(intent: Intent, field: &str) -> bool {
    match field {
        "grade" | "notes" => intent == Intent::Recommendation,
        _ => true,
    }
}

/// Validate `raw_text` as the structured response for `intent`.
pub fn validate(intent: Intent, raw_text: &str) -> Result<RecommendationResponse, AdvisorError> {
    let expected = intent
        .expected_items()
        .ok_or(AdvisorError::UnsupportedForIntent(intent))?;

    let result = check(intent, expected, raw_text);
    if let Err(e) = &result {
        warn!(%intent, error = %e, raw_len = raw_text.len(), "LLM response rejected");
    }
    result
}

fn check(intent: Intent, expected: usize, raw_text: &str) -> Result<RecommendationResponse, AdvisorError> {
    let json = extract_json(raw_text)
        .ok_or_else(|| AdvisorError::MalformedResponse("no JSON object found".into()))?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| AdvisorError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let Value::Object(mut root) = value else {
        return Err(AdvisorError::MalformedResponse("top-level value is not an object".into()));
    };

    let items = match root.remove("recommendations") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AdvisorError::MalformedResponse("'recommendations' is not an array".into()));
        }
        None => {
            return Err(AdvisorError::MalformedResponse("missing 'recommendations' array".into()));
        }
    };

    if items.len() != expected {
        return Err(AdvisorError::CardinalityMismatch { expected, actual: items.len() });
    }

    let recommendations = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| check_item(intent, index, item))
        .collect::<Result<Vec<_>, _>>()?;

    let content = match root.remove("content") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(_) => {
            return Err(AdvisorError::MalformedResponse("'content' is not a string".into()));
        }
    };

    Ok(RecommendationResponse { recommendations, content })
}

fn check_item(intent: Intent, index: usize, item: Value) -> Result<RecommendationItem, AdvisorError> {
    let Value::Object(fields) = item else {
        return Err(AdvisorError::MalformedResponse(format!(
            "recommendation {index} is not an object"
        )));
    };

    if let Some(field) = FIELDS
        .into_iter()
        .find(|f| is_required(intent, f) && !is_present(&fields, f))
    {
        return Err(AdvisorError::MissingField { index, field });
    }

    let mut parsed: RecommendationItem = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AdvisorError::MalformedResponse(format!("recommendation {index}: {e}")))?;

    // Optional fields: blank means absent.
    parsed.grade = parsed.grade.filter(|g| !g.trim().is_empty());
    parsed.notes = parsed.notes.filter(|n| !n.is_empty());
    Ok(parsed)
}

/// Null, blank strings and empty objects count as missing.
fn is_present(fields: &Map<String, Value>, field: &str) -> bool {
    match fields.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Object(m)) => !m.is_empty(),
        Some(_) => true,
    }
}

/// Narrow raw model output to the JSON object it carries.
///
/// Takes the first fenced block containing braces (dropping a `json` language
/// tag), then the span from the first `{` to the last `}`. Only text inside
/// fences counts as a block; chatter between them is skipped.
fn extract_json(raw: &str) -> Option<&str> {
    let mut text = raw;
    let fenced = raw
        .split("```")
        .skip(1)
        .step_by(2)
        .find(|part| part.contains('{') && part.contains('}'));
    if let Some(block) = fenced {
        let block = block.trim();
        text = block.strip_prefix("json").unwrap_or(block);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::types::NotePosition;
    use serde_json::json;

    fn perfume(name: &str) -> Value {
        json!({
            "name": name,
            "line": "Woody",
            "grade": "Eau de Parfum",
            "brand": "Le Labo",
            "notes": {"top": "bergamot", "middle": "iris", "base": "sandalwood"},
            "reason": "Creamy and warm.",
            "situation": "Autumn evenings."
        })
    }

    fn diffuser(name: &str) -> Value {
        json!({
            "name": name,
            "line": "Citrus",
            "brand": "Jo Malone",
            "reason": "Bright and airy.",
            "situation": "A sunny kitchen."
        })
    }

    fn payload(items: Vec<Value>) -> String {
        json!({ "recommendations": items }).to_string()
    }

    #[test]
    fn three_perfumes_accepted() {
        let raw = payload(vec![perfume("Santal 33"), perfume("Another 13"), perfume("Rose 31")]);
        let resp = validate(Intent::Recommendation, &raw).unwrap();
        assert_eq!(resp.recommendations.len(), 3);
        assert_eq!(resp.recommendations[0].name, "Santal 33");
        let notes = resp.recommendations[0].notes.as_ref().unwrap();
        assert_eq!(notes[&NotePosition::Base], "sandalwood");
        assert!(resp.content.is_none());
    }

    #[test]
    fn two_perfumes_is_cardinality_mismatch() {
        let raw = payload(vec![perfume("a"), perfume("b")]);
        let err = validate(Intent::Recommendation, &raw).unwrap_err();
        assert!(matches!(err, AdvisorError::CardinalityMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn two_diffusers_accepted_in_order() {
        let raw = payload(vec![diffuser("Lime Basil"), diffuser("Wood Sage")]);
        let resp = validate(Intent::DiffuserRecommendation, &raw).unwrap();
        let names: Vec<_> = resp.recommendations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Lime Basil", "Wood Sage"]);
        assert!(resp.recommendations[0].grade.is_none());
        assert!(resp.recommendations[0].notes.is_none());
    }

    #[test]
    fn second_item_without_grade_reported() {
        let mut second = perfume("b");
        second.as_object_mut().unwrap().remove("grade");
        let raw = payload(vec![perfume("a"), second, perfume("c")]);
        let err = validate(Intent::Recommendation, &raw).unwrap_err();
        assert!(matches!(err, AdvisorError::MissingField { index: 1, field: "grade" }));
    }

    #[test]
    fn cardinality_checked_before_fields() {
        let raw = payload(vec![json!({}), json!({})]);
        let err = validate(Intent::Recommendation, &raw).unwrap_err();
        assert!(matches!(err, AdvisorError::CardinalityMismatch { .. }));
    }

    #[test]
    fn first_missing_field_in_fixed_order() {
        let raw = payload(vec![json!({"brand": "x"}), diffuser("b")]);
        let err = validate(Intent::DiffuserRecommendation, &raw).unwrap_err();
        assert!(matches!(err, AdvisorError::MissingField { index: 0, field: "name" }));
    }

    #[test]
    fn blank_and_null_count_as_missing() {
        let mut item = diffuser("a");
        item["situation"] = json!("   ");
        let raw = payload(vec![diffuser("ok"), item]);
        let err = validate(Intent::DiffuserRecommendation, &raw).unwrap_err();
        assert!(matches!(err, AdvisorError::MissingField { index: 1, field: "situation" }));

        let mut item = perfume("a");
        item["notes"] = Value::Null;
        let raw = payload(vec![item, perfume("b"), perfume("c")]);
        let err = validate(Intent::Recommendation, &raw).unwrap_err();
        assert!(matches!(err, AdvisorError::MissingField { index: 0, field: "notes" }));
    }

    #[test]
    fn diffuser_optional_fields_kept_when_given() {
        let mut item = diffuser("a");
        item["notes"] = json!({"single": "lavender"});
        item["grade"] = json!("");
        let raw = payload(vec![item, diffuser("b")]);
        let resp = validate(Intent::DiffuserRecommendation, &raw).unwrap();
        let notes = resp.recommendations[0].notes.as_ref().unwrap();
        assert_eq!(notes[&NotePosition::Single], "lavender");
        assert!(resp.recommendations[0].grade.is_none());
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let mut item = diffuser("a");
        item["brand"] = json!(42);
        let raw = payload(vec![item, diffuser("b")]);
        let err = validate(Intent::DiffuserRecommendation, &raw).unwrap_err();
        assert!(matches!(err, AdvisorError::MalformedResponse(ref m) if m.starts_with("recommendation 0")));
    }

    #[test]
    fn unknown_note_position_is_malformed() {
        let mut item = perfume("a");
        item["notes"] = json!({"heart": "rose"});
        let raw = payload(vec![item, perfume("b"), perfume("c")]);
        assert!(matches!(
            validate(Intent::Recommendation, &raw).unwrap_err(),
            AdvisorError::MalformedResponse(_)
        ));
    }

    #[test]
    fn extra_keys_ignored() {
        let mut item = diffuser("a");
        item["id"] = json!(17);
        let raw = payload(vec![item, diffuser("b")]);
        assert!(validate(Intent::DiffuserRecommendation, &raw).is_ok());
    }

    #[test]
    fn fenced_output_with_chatter_accepted() {
        let body = json!({
            "recommendations": [diffuser("a"), diffuser("b")],
            "content": " Fresh and bright. "
        });
        let raw = format!("Here you go!\n```json\n{body:#}\n```\nEnjoy.");
        let resp = validate(Intent::DiffuserRecommendation, &raw).unwrap();
        assert_eq!(resp.content.as_deref(), Some("Fresh and bright."));
    }

    #[test]
    fn braces_in_leading_chatter_ignored() {
        let body = json!({"recommendations": [diffuser("a"), diffuser("b")]});
        let raw = format!("Note {{x}} here ```json\n{body}\n``` and {{y}} after");
        let resp = validate(Intent::DiffuserRecommendation, &raw).unwrap();
        assert_eq!(resp.recommendations.len(), 2);
    }

    #[test]
    fn prose_is_malformed() {
        let err = validate(Intent::Recommendation, "I recommend Santal 33.").unwrap_err();
        assert!(matches!(err, AdvisorError::MalformedResponse(_)));
    }

    #[test]
    fn broken_json_is_malformed() {
        let err = validate(Intent::Recommendation, "{\"recommendations\": [}").unwrap_err();
        assert!(matches!(err, AdvisorError::MalformedResponse(ref m) if m.starts_with("invalid JSON")));
    }

    #[test]
    fn missing_or_mistyped_array_is_malformed() {
        assert!(matches!(
            validate(Intent::Recommendation, "{\"items\": []}").unwrap_err(),
            AdvisorError::MalformedResponse(_)
        ));
        assert!(matches!(
            validate(Intent::Recommendation, "{\"recommendations\": {}}").unwrap_err(),
            AdvisorError::MalformedResponse(_)
        ));
    }

    #[test]
    fn non_string_content_is_malformed() {
        let raw = json!({"recommendations": [diffuser("a"), diffuser("b")], "content": 3}).to_string();
        assert!(matches!(
            validate(Intent::DiffuserRecommendation, &raw).unwrap_err(),
            AdvisorError::MalformedResponse(_)
        ));
    }

    #[test]
    fn chat_is_not_validated() {
        let err = validate(Intent::Chat, "{}").unwrap_err();
        assert!(matches!(err, AdvisorError::UnsupportedForIntent(Intent::Chat)));
    }

    #[test]
    fn extract_json_spans_outermost_braces() {
        assert_eq!(extract_json("x {\"a\": {\"b\": 1}} y"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json("```\n{}\n```"), Some("{}"));
        assert_eq!(extract_json("} {"), None);
        assert_eq!(extract_json("nothing"), None);
        assert_eq!(extract_json("a {b} ```json\n{\"c\": 1}\n``` d"), Some("{\"c\": 1}"));
        // Unterminated fence still counts as a block.
        assert_eq!(extract_json("{x} ```{\"c\": 2}"), Some("{\"c\": 2}"));
    }
}
