use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UNKNOWN_IP: &str = "unknown";

/// Validated travel preferences. Only [`crate::validation::parse_request`]
/// builds one from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequest {
    pub location: String,
    pub budget: String,
    pub duration: u32,
    pub age_group: String,
    pub transport: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlanRecord {
    pub id: Uuid,
    pub location: String,
    pub budget: String,
    pub duration: u32,
    pub age_group: String,
    pub transport: String,
    pub generated_plan: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub ip_address: String,
}

impl TravelPlanRecord {
    pub fn new(request: TravelRequest, generated_plan: &str, source_ip: Option<&str>) -> Self {
        let TravelRequest {
            location,
            budget,
            duration,
            age_group,
            transport,
        } = request;

        Self {
            id: Uuid::new_v4(),
            location,
            budget,
            duration,
            age_group,
            transport,
            generated_plan: generated_plan.trim().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            ip_address: source_ip.unwrap_or(UNKNOWN_IP).to_string(),
        }
    }

    pub fn request(&self) -> TravelRequest {
        TravelRequest {
            location: self.location.clone(),
            budget: self.budget.clone(),
            duration: self.duration,
            age_group: self.age_group.clone(),
            transport: self.transport.clone(),
        }
    }
}
