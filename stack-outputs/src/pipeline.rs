//! One-call pipeline: extract, render, audit.

use crate::{
    audit::{AuditSink, DisclosureEvent},
    crypter::Crypter,
    error::Error,
    extract::extract_outputs,
    present::present,
    snapshot::Snapshot,
};

/// Name recorded in disclosure events.
pub const COMMAND_NAME: &str = "stack-output";

/// Everything one invocation needs to know. There is no ambient
/// configuration; callers build one of these per request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputRequest {
    pub stack: String,
    /// A single output to show; `None` shows them all.
    pub selector: Option<String>,
    /// Show secret values in plaintext.
    pub reveal: bool,
    /// Render JSON instead of text.
    pub json: bool,
}

impl OutputRequest {
    #[must_use]
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn with_reveal(mut self, reveal: bool) -> Self {
        self.reveal = reveal;
        self
    }

    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Renders the outputs `request` asks for.
///
/// When `request.reveal` is set and rendering succeeds, `audit` is notified
/// once. Failed requests reveal nothing and are not audited.
pub fn run(
    request: &OutputRequest,
    snapshot: &Snapshot,
    crypter: &dyn Crypter,
    audit: &dyn AuditSink,
) -> Result<String, Error> {
    let outputs = extract_outputs(snapshot, request.reveal, crypter)?;
    let rendered = present(&outputs, request.selector.as_deref(), request.json)?;

    if request.reveal {
        audit.secrets_revealed(&DisclosureEvent {
            stack: request.stack.clone(),
            command: COMMAND_NAME.to_string(),
        });
    }
    Ok(rendered)
}
