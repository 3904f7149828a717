//! Adapter between actix requests and the handler's event contract.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use planner_core::{InboundEvent, OutboundResponse, RequestContext, RequestIdentity};

use crate::state::AppState;

pub async fn handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let event = to_event(&req, &body);
    let response = state.handler.handle(event).await;
    to_http_response(response)
}

/// The source IP comes from `Forwarded` / `X-Forwarded-For` when present, so
/// the server is expected to run behind a trusted proxy that overwrites those
/// headers. Without one the recorded address is whatever the client claims.
pub fn to_event(req: &HttpRequest, body: &[u8]) -> InboundEvent {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in req.headers() {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    let body = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(body).into_owned())
    };

    let source_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(strip_port);

    InboundEvent {
        http_method: req.method().as_str().to_string(),
        headers,
        body,
        request_context: Some(RequestContext {
            identity: Some(RequestIdentity { source_ip }),
        }),
    }
}

pub fn to_http_response(response: OutboundResponse) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = HttpResponse::build(status);
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }
    builder.body(response.body)
}

fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return ip.to_string();
    }
    addr.to_string()
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn port_is_stripped_from_peer_address() {
        assert_eq!(strip_port("203.0.113.9:54321"), "203.0.113.9");
        assert_eq!(strip_port("[::1]:8080"), "::1");
        assert_eq!(strip_port("[::1]"), "::1");
        assert_eq!(strip_port("198.51.100.1"), "198.51.100.1");
    }

    #[test]
    fn request_becomes_event() {
        let req = TestRequest::post()
            .uri("/plan")
            .insert_header(("Origin", "http://localhost:5173"))
            .insert_header(("X-Forwarded-For", "203.0.113.9"))
            .to_http_request();

        let event = to_event(&req, br#"{"a":1}"#);

        assert_eq!(event.http_method, "POST");
        assert_eq!(event.header("origin"), Some("http://localhost:5173"));
        assert_eq!(event.body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(event.source_ip(), Some("203.0.113.9"));
    }

    #[test]
    fn empty_body_is_absent() {
        let req = TestRequest::post().uri("/plan").to_http_request();
        assert!(to_event(&req, b"").body.is_none());
    }

    #[test]
    fn response_keeps_status_and_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("Vary".to_string(), "Origin".to_string());

        let response = to_http_response(OutboundResponse {
            status_code: 504,
            headers,
            body: "{}".to_string(),
        });

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(response.headers().get("vary").unwrap(), "Origin");
    }
}
