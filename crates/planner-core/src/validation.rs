//! Turns the raw request body into a [`TravelRequest`].
//!
//! Fields are checked for presence and type explicitly instead of by
//! truthiness: `budget: 0` is a real budget, while `duration` has to be a
//! whole number of days greater than zero. Accepted text is kept exactly as
//! sent; surrounding whitespace only matters for the blank check.

use serde_json::{Map, Value};

use crate::error::{PlannerError, Result};
use crate::types::TravelRequest;

pub const MISSING_BODY: &str = "Missing request body";
pub const INVALID_JSON: &str = "Invalid JSON body";
pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INVALID_DURATION: &str = "Invalid duration: must be a whole number of days greater than zero";

pub const REQUIRED_FIELDS: [&str; 5] = ["location", "budget", "duration", "ageGroup", "transport"];

pub fn parse_request(body: Option<&str>) -> Result<TravelRequest> {
    let body = body
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .ok_or_else(|| PlannerError::validation(MISSING_BODY))?;

    let value: Value =
        serde_json::from_str(body).map_err(|_| PlannerError::validation(INVALID_JSON))?;
    let Value::Object(fields) = value else {
        return Err(PlannerError::validation(INVALID_JSON));
    };

    if REQUIRED_FIELDS
        .iter()
        .any(|name| !is_present(fields.get(*name)))
    {
        return Err(PlannerError::validation(MISSING_FIELDS));
    }

    Ok(TravelRequest {
        location: text_field(&fields, "location")?,
        budget: text_field(&fields, "budget")?,
        duration: duration_field(&fields)?,
        age_group: text_field(&fields, "ageGroup")?,
        transport: text_field(&fields, "transport")?,
    })
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn text_field(fields: &Map<String, Value>, name: &str) -> Result<String> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(PlannerError::validation(format!(
            "Invalid {name}: expected a string"
        ))),
    }
}

fn duration_field(fields: &Map<String, Value>) -> Result<u32> {
    let days = match fields.get("duration") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    days.filter(|days| *days >= 1)
        .and_then(|days| u32::try_from(days).ok())
        .ok_or_else(|| PlannerError::validation(INVALID_DURATION))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<TravelRequest>) -> String {
        match result {
            Err(PlannerError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn parses_complete_request() {
        let body = r#"{"location":"Paris","budget":"$500","duration":3,"ageGroup":"20-30","transport":"train"}"#;
        let request = parse_request(Some(body)).unwrap();

        assert_eq!(request.location, "Paris");
        assert_eq!(request.budget, "$500");
        assert_eq!(request.duration, 3);
        assert_eq!(request.age_group, "20-30");
        assert_eq!(request.transport, "train");
    }

    #[test]
    fn missing_body_is_rejected() {
        assert_eq!(message(parse_request(None)), MISSING_BODY);
        assert_eq!(message(parse_request(Some("   "))), MISSING_BODY);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert_eq!(message(parse_request(Some("{not json"))), INVALID_JSON);
        assert_eq!(message(parse_request(Some("[1,2]"))), INVALID_JSON);
    }

    #[test]
    fn empty_object_reports_missing_fields() {
        assert_eq!(message(parse_request(Some("{}"))), MISSING_FIELDS);
    }

    #[test]
    fn each_missing_field_is_reported() {
        for missing in REQUIRED_FIELDS {
            let mut value = serde_json::json!({
                "location": "Rome",
                "budget": "low",
                "duration": 2,
                "ageGroup": "60+",
                "transport": "bus"
            });
            value.as_object_mut().unwrap().remove(missing);

            let body = value.to_string();
            assert_eq!(message(parse_request(Some(&body))), MISSING_FIELDS, "{missing}");
        }
    }

    #[test]
    fn blank_and_null_fields_count_as_missing() {
        let body = r#"{"location":"  ","budget":"$1","duration":1,"ageGroup":"x","transport":null}"#;
        assert_eq!(message(parse_request(Some(body))), MISSING_FIELDS);
    }

    #[test]
    fn text_fields_are_kept_verbatim() {
        let body = r#"{"location":" Paris ","budget":"$500 ","duration":3,"ageGroup":"\t20-30","transport":"night train"}"#;
        let request = parse_request(Some(body)).unwrap();

        assert_eq!(request.location, " Paris ");
        assert_eq!(request.budget, "$500 ");
        assert_eq!(request.age_group, "\t20-30");
        assert_eq!(request.transport, "night train");
    }

    #[test]
    fn zero_budget_is_accepted() {
        let body = r#"{"location":"Oslo","budget":0,"duration":1,"ageGroup":"18-25","transport":"bike"}"#;
        let request = parse_request(Some(body)).unwrap();
        assert_eq!(request.budget, "0");
    }

    #[test]
    fn zero_duration_is_rejected() {
        let body = r#"{"location":"Oslo","budget":"$1","duration":0,"ageGroup":"18-25","transport":"bike"}"#;
        assert_eq!(message(parse_request(Some(body))), INVALID_DURATION);
    }

    #[test]
    fn numeric_string_duration_is_accepted() {
        let body = r#"{"location":"Oslo","budget":"$1","duration":"4","ageGroup":"18-25","transport":"bike"}"#;
        assert_eq!(parse_request(Some(body)).unwrap().duration, 4);
    }

    #[test]
    fn fractional_or_negative_duration_is_rejected() {
        for duration in ["2.5", "-1", "\"three\""] {
            let body = format!(
                r#"{{"location":"Oslo","budget":"$1","duration":{duration},"ageGroup":"18-25","transport":"bike"}}"#
            );
            assert_eq!(message(parse_request(Some(&body))), INVALID_DURATION, "{duration}");
        }
    }

    #[test]
    fn non_text_field_is_rejected() {
        let body = r#"{"location":["Oslo"],"budget":"$1","duration":1,"ageGroup":"18-25","transport":"bike"}"#;
        assert_eq!(
            message(parse_request(Some(body))),
            "Invalid location: expected a string"
        );
    }
}
