//! Audit trail for secret disclosure.
//!
//! Revealing secrets is the one operation in this crate with a security
//! consequence. The pipeline reports it through an [`AuditSink`] exactly once
//! per invocation, and only after revealed output was actually produced.

/// A record that secret values were shown to a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisclosureEvent {
    /// The stack whose secrets were revealed.
    pub stack: String,
    /// The command that revealed them.
    pub command: String,
}

/// Receives disclosure events.
pub trait AuditSink {
    fn secrets_revealed(&self, event: &DisclosureEvent);
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    fn secrets_revealed(&self, event: &DisclosureEvent) {
        (**self).secrets_revealed(event);
    }
}

/// Emits disclosure events as `tracing` warnings on the
/// `stack_outputs::audit` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn secrets_revealed(&self, event: &DisclosureEvent) {
        tracing::warn!(
            target: "stack_outputs::audit",
            stack = %event.stack,
            command = %event.command,
            "secret values were displayed in plaintext"
        );
    }
}

/// An [`AuditSink`] that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn secrets_revealed(&self, _event: &DisclosureEvent) {}
}
