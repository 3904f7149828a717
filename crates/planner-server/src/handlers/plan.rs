use std::sync::Arc;

use planner_core::{
    build_prompt, parse_request, InboundEvent, OutboundResponse, PlannerError, RecordStore,
    Result, TravelPlanRecord,
};
use planner_llm::{CompletionClient, TextSource};

use crate::cors::CorsPolicy;
use crate::logging::Timer;
use crate::response;

/// The request handler: one inbound event in, one outbound response out.
///
/// Clients and configuration are built once at startup and shared; nothing
/// here is mutated per request.
#[derive(Clone)]
pub struct TravelPlanHandler {
    completion: Arc<dyn CompletionClient>,
    store: Arc<dyn RecordStore>,
    cors: CorsPolicy,
    html_line_breaks: bool,
}

impl TravelPlanHandler {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        store: Arc<dyn RecordStore>,
        cors: CorsPolicy,
    ) -> Self {
        Self {
            completion,
            store,
            cors,
            html_line_breaks: true,
        }
    }

    pub fn with_html_line_breaks(mut self, enabled: bool) -> Self {
        self.html_line_breaks = enabled;
        self
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    /// Never fails: every error becomes a well-formed failure response.
    pub async fn handle(&self, event: InboundEvent) -> OutboundResponse {
        let headers = self.cors.headers_for(event.header("Origin"));

        if event.is_preflight() {
            log::debug!("CORS preflight from {:?}", event.header("Origin"));
            return response::preflight(headers);
        }

        if !event.http_method.eq_ignore_ascii_case("POST") {
            log::warn!("Rejected {} request", event.http_method);
            return response::method_not_allowed(headers, &event.http_method);
        }

        match self.create_plan(&event).await {
            Ok(record) => response::success(headers, &record, self.html_line_breaks),
            Err(err) => {
                match &err {
                    PlannerError::Validation(msg) => log::info!("Rejected request: {}", msg),
                    other => log::error!("Travel plan request failed ({}): {}", other.category(), other),
                }
                response::failure(headers, &err)
            }
        }
    }

    async fn create_plan(&self, event: &InboundEvent) -> Result<TravelPlanRecord> {
        let request = parse_request(event.body.as_deref())?;
        log::debug!("Validated request for a {}-day trip", request.duration);

        let prompt = build_prompt(&request);

        let timer = Timer::new(format!("completion call ({})", self.completion.model()));
        let completion = self.completion.complete(&prompt).await?;
        timer.debug();

        if completion.source == TextSource::Fallback {
            log::warn!("Completion response carried no text, using fallback plan");
        }

        let record = TravelPlanRecord::new(request, &completion.text, event.source_ip());
        self.store.put_if_absent(&record).await?;
        log::info!(
            "Stored travel plan {} ({} days, {} bytes)",
            record.id,
            record.duration,
            record.generated_plan.len()
        );

        Ok(record)
    }
}
