//! Function-style request and response documents.
//!
//! The handler consumes an [`InboundEvent`] and always produces an
//! [`OutboundResponse`]; the HTTP adapter and the `invoke` command both
//! translate to and from these shapes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    pub http_method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub identity: Option<RequestIdentity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdentity {
    #[serde(default)]
    pub source_ip: Option<String>,
}

impl InboundEvent {
    pub fn new(http_method: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_source_ip(mut self, ip: impl Into<String>) -> Self {
        self.request_context = Some(RequestContext {
            identity: Some(RequestIdentity {
                source_ip: Some(ip.into()),
            }),
        });
        self
    }

    /// Header lookup ignoring ASCII case, as header names arrive in whatever
    /// casing the client or gateway chose.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_preflight(&self) -> bool {
        self.http_method.eq_ignore_ascii_case("OPTIONS")
    }

    pub fn source_ip(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.identity.as_ref())
            .and_then(|identity| identity.source_ip.as_deref())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl OutboundResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
