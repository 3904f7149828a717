pub mod error;
pub mod event;
pub mod prompt;
pub mod storage;
pub mod types;
pub mod validation;

pub use error::{PlannerError, Result};
pub use event::{InboundEvent, OutboundResponse, RequestContext, RequestIdentity};
pub use prompt::{build_prompt, PROMPT_WORD_LIMIT};
pub use storage::{MemoryRecordStore, RecordStore, SqliteRecordStore, StoreError, StoreResult};
pub use types::{TravelPlanRecord, TravelRequest, UNKNOWN_IP};
pub use validation::parse_request;
