//! Domain event sink for the web server.
//!
//! Events are written as structured `tracing` records under the
//! `spendquest::events` target so they can be filtered with `RUST_LOG`.

use spendquest_core::events::{DomainEvent, DomainEventSink};

#[derive(Clone, Default)]
pub struct TracingDomainEventSink;

impl TracingDomainEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl DomainEventSink for TracingDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        match &event {
            DomainEvent::GoalSettled {
                user_id,
                goal_id,
                status,
                coins_delta,
            } => tracing::info!(
                target: "spendquest::events",
                kind = event.kind(),
                user_id = %user_id,
                goal_id = %goal_id,
                status = ?status,
                coins_delta,
                "goal settled"
            ),
            DomainEvent::PaymentCompleted {
                user_id,
                transaction_id,
                amount,
                category,
            } => tracing::info!(
                target: "spendquest::events",
                kind = event.kind(),
                user_id = %user_id,
                transaction_id = %transaction_id,
                amount = %amount,
                category = %category,
                "payment completed"
            ),
            DomainEvent::PaymentFailed {
                user_id,
                transaction_id,
                reason,
            } => tracing::warn!(
                target: "spendquest::events",
                kind = event.kind(),
                user_id = %user_id,
                transaction_id = %transaction_id,
                reason = %reason,
                "payment failed"
            ),
            DomainEvent::CoinsAdjusted {
                user_id,
                delta,
                balance,
            } => tracing::info!(
                target: "spendquest::events",
                kind = event.kind(),
                user_id = %user_id,
                delta,
                balance,
                "coins adjusted"
            ),
        }
    }
}
