//! Outbound response bodies.
//!
//! Every body is JSON. Success is `{"success":true,"data":...}`, failure is
//! `{"success":false,"error":"..."}` with a non-2xx status.

use std::collections::BTreeMap;

use planner_core::{OutboundResponse, PlannerError, TravelPlanRecord};
use serde_json::{json, Value};

pub const PREFLIGHT_MESSAGE: &str = "CORS preflight successful";
pub const HTML_LINE_BREAK: &str = "<br>";

pub fn preflight(headers: BTreeMap<String, String>) -> OutboundResponse {
    json_response(200, headers, &json!({ "message": PREFLIGHT_MESSAGE }))
}

pub fn success(
    headers: BTreeMap<String, String>,
    record: &TravelPlanRecord,
    html_line_breaks: bool,
) -> OutboundResponse {
    let mut data = match serde_json::to_value(record) {
        Ok(data) => data,
        Err(err) => return failure(headers, &PlannerError::from(err)),
    };

    if html_line_breaks {
        if let Some(plan) = data.get_mut("generatedPlan") {
            if let Some(rendered) = plan.as_str().map(to_html_line_breaks) {
                *plan = Value::String(rendered);
            }
        }
    }

    json_response(200, headers, &json!({ "success": true, "data": data }))
}

pub fn failure(headers: BTreeMap<String, String>, err: &PlannerError) -> OutboundResponse {
    json_response(
        err.status_code(),
        headers,
        &json!({ "success": false, "error": err.to_string() }),
    )
}

pub fn method_not_allowed(
    mut headers: BTreeMap<String, String>,
    method: &str,
) -> OutboundResponse {
    headers.insert("Allow".to_string(), crate::cors::ALLOW_METHODS.to_string());
    json_response(
        405,
        headers,
        &json!({ "success": false, "error": format!("Method {method} not allowed") }),
    )
}

pub fn to_html_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', HTML_LINE_BREAK)
}

fn json_response(
    status_code: u16,
    headers: BTreeMap<String, String>,
    body: &Value,
) -> OutboundResponse {
    OutboundResponse {
        status_code,
        headers,
        body: body.to_string(),
    }
}
