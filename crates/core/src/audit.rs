//! Audit side channel.
//!
//! Every transition attempt emits one event. Emission is best-effort: a
//! failing sink is logged and ignored, never surfaced to the caller.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use receiva_shared::types::{TenantId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ReceivablesError;

/// The transition being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Document created.
    Create,
    /// Refund submitted.
    Submit,
    /// Document approved.
    Approve,
    /// Document posted.
    Post,
    /// Document voided.
    Void,
}

impl AuditAction {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Submit => "SUBMIT",
            Self::Approve => "APPROVE",
            Self::Post => "POST",
            Self::Void => "VOID",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a transition attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    /// Transition committed.
    Success,
    /// Rejected by temporal governance.
    Blocked,
    /// Any other failure.
    Failure,
}

impl AuditOutcome {
    /// Classifies the result of a transition.
    #[must_use]
    pub fn of<T>(result: &Result<T, ReceivablesError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) if e.is_blocked() => Self::Blocked,
            Err(_) => Self::Failure,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Blocked => "BLOCKED",
            Self::Failure => "FAILURE",
        }
    }
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// Tenant the transition ran for.
    pub tenant_id: TenantId,
    /// What was attempted.
    pub action: AuditAction,
    /// Entity kind (e.g., "credit note").
    pub entity_type: &'static str,
    /// Entity id, if known.
    pub entity_id: Option<Uuid>,
    /// How it ended.
    pub outcome: AuditOutcome,
    /// Acting user.
    pub actor: UserId,
    /// Void reason or failure message.
    pub reason: Option<String>,
    /// When the attempt finished.
    pub occurred_at: DateTime<Utc>,
}

/// Error from an audit sink.
#[derive(Debug, Error)]
#[error("Audit sink failed: {0}")]
pub struct AuditError(pub String);

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        (**self).record(event)
    }
}

/// Writes audit events as structured tracing events under the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            tenant_id = %event.tenant_id,
            action = event.action.as_str(),
            entity_type = event.entity_type,
            entity_id = ?event.entity_id,
            outcome = event.outcome.as_str(),
            actor = %event.actor,
            reason = event.reason.as_deref().unwrap_or(""),
            "Audit event"
        );
        Ok(())
    }
}

/// Records `event`, logging and swallowing any sink failure.
pub fn emit<A: AuditSink + ?Sized>(sink: &A, event: &AuditEvent) {
    if let Err(err) = sink.record(event) {
        tracing::warn!(
            tenant_id = %event.tenant_id,
            action = event.action.as_str(),
            entity_type = event.entity_type,
            error = %err,
            "Audit event dropped"
        );
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingSink, RecordingSink};
    use super::*;

    fn event(outcome: AuditOutcome) -> AuditEvent {
        AuditEvent {
            tenant_id: TenantId::new(),
            action: AuditAction::Post,
            entity_type: "credit note",
            entity_id: Some(Uuid::now_v7()),
            outcome,
            actor: UserId::new(),
            reason: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn test_outcome_classification() {
        let ok: Result<(), ReceivablesError> = Ok(());
        assert_eq!(AuditOutcome::of(&ok), AuditOutcome::Success);

        let blocked: Result<(), _> = Err(ReceivablesError::NoPeriodExists(
            chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        ));
        assert_eq!(AuditOutcome::of(&blocked), AuditOutcome::Blocked);

        let failed: Result<(), _> = Err(ReceivablesError::ValidationFailed("x".into()));
        assert_eq!(AuditOutcome::of(&failed), AuditOutcome::Failure);
    }

    #[test]
    fn test_emit_records_event() {
        let sink = RecordingSink::default();
        emit(&sink, &event(AuditOutcome::Success));
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_emit_swallows_sink_failure() {
        emit(&FailingSink, &event(AuditOutcome::Failure));
        emit(&TracingAuditSink, &event(AuditOutcome::Blocked));
    }
}
