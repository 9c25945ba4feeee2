//! AI copywriting for product drafts.
//!
//! Raw supplier listings go through one LLM call each, are validated
//! strictly, and land back on the draft with its status updated. Batches run
//! sequentially and stop at the first sign of provider throttling.

pub mod batch;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod translate;
pub mod workflow;

pub use batch::{BatchSummary, BatchTranslator};
pub use error::CurationError;
pub use llm::{ChatPrompt, LlmClient, OpenAiChatClient};
pub use prompt::RawProduct;
pub use translate::TranslationService;
pub use workflow::{translate_and_save_draft, translate_draft, DraftOutcome};
