//! Sequential autofill pass.
//!
//! One pass walks the snapshot's fields in index order with a single request
//! in flight at a time:
//!
//! ```text
//! Idle -> ContextBuilt -> Filling(0) -> ... -> Filling(n-1) -> Done
//! ```
//!
//! A field that fails (generation or write-back) is counted and reported,
//! never allowed to abort the pass.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pagefill_protocols::{
    AutofillError, AutofillEvent, GenerationError, Page, PageError, PageSnapshot, PassState,
    PassSummary, TextGenerator,
};

use crate::extractor::PageContextExtractor;
use crate::label::LabelResolver;
use crate::prompt::{FieldMetadata, PromptBuilder};

/// Capacity of the notification channel.
const EVENT_CAPACITY: usize = 256;

/// Progress is reported only on pages with more fields than this.
const PROGRESS_MIN_FIELDS: usize = 5;

/// Progress is reported after every this-many fields.
const PROGRESS_EVERY: usize = 3;

#[derive(Debug, Error)]
enum FieldError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("write failed: {0}")]
    Write(#[from] PageError),
}

/// Drives autofill passes over one page.
pub struct AutofillOrchestrator {
    page: Arc<dyn Page>,
    generator: Arc<dyn TextGenerator>,
    events: broadcast::Sender<AutofillEvent>,
    snapshot: Option<PageSnapshot>,
    state: PassState,
}

impl AutofillOrchestrator {
    pub fn new(page: Arc<dyn Page>, generator: Arc<dyn TextGenerator>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            page,
            generator,
            events,
            snapshot: None,
            state: PassState::Idle,
        }
    }

    /// Receive notifications of subsequent passes.
    pub fn subscribe(&self) -> broadcast::Receiver<AutofillEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Cached snapshot, if one was built.
    pub fn snapshot(&self) -> Option<&PageSnapshot> {
        self.snapshot.as_ref()
    }

    /// Re-read the page and replace the cached snapshot.
    pub async fn refresh_snapshot(&mut self) -> Result<&PageSnapshot, AutofillError> {
        let document = self.page.document().await?;
        Ok(self
            .snapshot
            .insert(PageContextExtractor::extract(document)))
    }

    /// Drop the cached snapshot so the next pass re-extracts.
    pub fn invalidate_snapshot(&mut self) {
        self.snapshot = None;
    }

    /// Run one pass over every field of the page.
    ///
    /// Aborts before touching any field only when `credential` is blank or the
    /// page cannot be read. `cancel` is checked before each field.
    pub async fn run(
        &mut self,
        credential: &str,
        cancel: &CancellationToken,
    ) -> Result<PassSummary, AutofillError> {
        self.state = PassState::Idle;
        if credential.trim().is_empty() {
            error!("Autofill aborted: no credential");
            return Err(AutofillError::MissingCredential);
        }

        let snapshot = match self.snapshot.clone() {
            Some(snapshot) => snapshot,
            None => self.refresh_snapshot().await?.clone(),
        };
        self.state = PassState::ContextBuilt;

        let total = snapshot.field_count();
        let mut summary = PassSummary {
            total,
            ..Default::default()
        };

        if total == 0 {
            info!("No text inputs found on page");
            self.emit(AutofillEvent::NoFields);
            self.state = PassState::Done;
            return Ok(summary);
        }

        info!("Starting autofill of {} fields with {}", total, self.generator.id());
        self.emit(AutofillEvent::Started { total });

        for index in 0..total {
            if cancel.is_cancelled() {
                warn!("Autofill cancelled before field {}/{}", index + 1, total);
                self.emit(AutofillEvent::Cancelled {
                    filled: summary.filled,
                    errors: summary.errors,
                    total,
                });
                self.state = PassState::Done;
                return Ok(summary);
            }

            self.state = PassState::Filling { index };
            let context = &snapshot.field_contexts[index];
            let display_name = [&context.id, &context.name]
                .into_iter()
                .find(|value| !value.is_empty())
                .map(String::as_str)
                .unwrap_or("unnamed");
            debug!("Processing input {}/{}: {}", index + 1, total, display_name);

            match self.fill_field(&snapshot, index, credential).await {
                Ok(()) => summary.filled += 1,
                Err(e) => {
                    warn!("Failed to fill input {}/{}: {}", index + 1, total, e);
                    summary.errors += 1;
                    self.emit(AutofillEvent::FieldFailed {
                        index,
                        field: display_name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }

            if total > PROGRESS_MIN_FIELDS && index % PROGRESS_EVERY == 0 {
                self.emit(AutofillEvent::Progress {
                    filled: summary.filled,
                    total,
                });
            }
        }

        info!(
            "Autofill completed: {} filled, {} errors out of {} fields",
            summary.filled, summary.errors, total
        );
        self.emit(AutofillEvent::Completed {
            filled: summary.filled,
            errors: summary.errors,
            total,
        });
        self.state = PassState::Done;
        Ok(summary)
    }

    async fn fill_field(
        &self,
        snapshot: &PageSnapshot,
        index: usize,
        credential: &str,
    ) -> Result<(), FieldError> {
        let handle = &snapshot.fields[index];
        let context = &snapshot.field_contexts[index];
        let document = &snapshot.document;

        let existing_value = match self.page.read_value(handle).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not read live value of input {}: {}", index + 1, e);
                document.form_value(handle.node())
            }
        };

        let field = FieldMetadata {
            name: context.name.clone(),
            id: context.id.clone(),
            placeholder: context.placeholder.clone(),
            label: LabelResolver::resolve(document, handle.node(), &existing_value),
            existing_value,
        };
        let prompt = PromptBuilder::build(&snapshot.title, &field, context);
        debug!("Prompt for input {}: {} chars", index + 1, prompt.chars().count());

        let text = self.generator.generate(&prompt, credential).await?;
        let text = text.trim();
        debug!(
            "Filling input {} with: {}",
            index + 1,
            text.chars().take(30).collect::<String>()
        );
        self.page.fill(handle, text).await?;
        Ok(())
    }

    fn emit(&self, event: AutofillEvent) {
        // Fails only when nobody is subscribed.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
