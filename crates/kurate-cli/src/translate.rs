//! `translate` command handlers.
//!
//! Both commands print JSON and exit cleanly when a translation fails: the
//! failure is recorded on the draft itself.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use kurate_core::AppConfig;
use kurate_curation::{
    translate_and_save_draft, BatchTranslator, OpenAiChatClient, TranslationService,
};
use kurate_db::PgDraftStore;
use uuid::Uuid;

use crate::print_json;

/// Sub-commands available under `translate`.
#[derive(Debug, Subcommand)]
pub enum TranslateCommands {
    /// Translate a single draft by id
    Draft { id: Uuid },
    /// Translate pending drafts one at a time, oldest first
    Batch {
        /// Maximum number of drafts to process (defaults to KURATE_TRANSLATE_BATCH_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Builds the translation service from `config`.
///
/// # Errors
///
/// Returns an error if no LLM API key is configured or the HTTP client
/// cannot be built.
pub(crate) fn build_service(config: &AppConfig) -> anyhow::Result<TranslationService> {
    let api_key = config
        .llm_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("KURATE_LLM_API_KEY is required for translation"))?;
    let llm = OpenAiChatClient::with_base_url(
        &config.llm_base_url,
        api_key,
        &config.llm_model,
        config.llm_timeout_secs,
    )?;
    Ok(TranslationService::new(Arc::new(llm), &config.brand_name))
}

pub(crate) async fn run_translate(
    config: &AppConfig,
    command: TranslateCommands,
) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let pool = kurate_db::connect_pool_from_config(config).await?;
    let store = PgDraftStore::new(pool.clone());

    match command {
        TranslateCommands::Draft { id } => {
            let draft = translate_and_save_draft(&store, &service, id).await?;
            if let Some(error) = &draft.translation_error {
                tracing::warn!(draft_id = %id, error = %error, "translation failed");
            }
            print_json(&draft)?;
        }
        TranslateCommands::Batch { limit } => {
            let limit = limit.unwrap_or(config.translate_batch_limit);
            let translator = BatchTranslator::new(Arc::new(store), service)
                .with_delay(Duration::from_millis(config.translate_delay_ms));
            let summary = translator.batch_translate(limit).await;
            print_json(&summary)?;
        }
    }

    pool.close().await;
    Ok(())
}
