#![deny(missing_docs)]
//! Transfer state machine for zero-drop version upgrades (spec §4.8).
//!
//! Exactly one instance is ever `Active`. A joining instance starts
//! `Pending`; the instance currently serving traffic moves
//! `Active -> Draining -> Shutdown` once a successor announces itself.
//! No other transitions are permitted — [`TransferState`] only exposes
//! the four states, and every transition in this crate happens through
//! [`TransferCoordinator::join`] or [`TransferCoordinator::serve_handoff`].

mod error;

pub use error::TransferError;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use brain_bus::{subjects, BusClient};
use brain_proto::bus::{TransferAbort, TransferAck, TransferClear, TransferReady};
use brain_store::Store;

/// Upper bound on how long the active instance waits for in-flight
/// requests to finish before writing the handoff note. Callers may pass
/// a shorter drain future; this is the hard ceiling.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the active instance waits for an ack after publishing
/// `TransferClear` before shutting down regardless.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a joining instance waits for `TransferClear` (or `TransferAbort`)
/// before assuming a fresh start.
pub const NO_RESPONSE_TIMEOUT: Duration = Duration::from_secs(120);

const STREAM_NAME: &str = "transfer";

/// A position in the transfer lifecycle. No other transitions than
/// `Pending -> Active`, `Active -> Draining`, and `Draining -> Shutdown`
/// are permitted (spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Waiting to take over from an active instance, or to activate fresh.
    Pending,
    /// Serving traffic; the only instance that may accept new requests.
    Active,
    /// Refusing new requests, finishing in-flight ones, handing off.
    Draining,
    /// Handoff complete (or aborted); this instance is shutting down.
    Shutdown,
}

/// Outcome of [`TransferCoordinator::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// An active instance handed off state; the handoff note was read.
    HandoffReceived,
    /// No active instance responded (or it aborted); activated fresh.
    FreshStart,
}

/// Coordinates one side of the handshake. `instance_id` must be unique
/// per process; `version` is reported in `TransferReady` for diagnostics.
pub struct TransferCoordinator {
    store: Store,
    bus: BusClient,
    instance_id: String,
    version: String,
    state: Arc<Mutex<TransferState>>,
}

impl TransferCoordinator {
    /// Build a coordinator. Starts `Pending`; call [`Self::join`] to
    /// attempt activation.
    pub fn new(store: Store, bus: BusClient, instance_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            store,
            bus,
            instance_id: instance_id.into(),
            version: version.into(),
            state: Arc::new(Mutex::new(TransferState::Pending)),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TransferState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, state: TransferState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = state;
    }

    async fn ensure_stream(&self) -> Result<async_nats::jetstream::stream::Stream, TransferError> {
        self.bus
            .ensure_stream(
                STREAM_NAME,
                vec![
                    subjects::TRANSFER_READY.to_string(),
                    subjects::TRANSFER_CLEAR.to_string(),
                    subjects::TRANSFER_ACK.to_string(),
                    subjects::TRANSFER_ABORT.to_string(),
                ],
            )
            .await
            .map_err(Into::into)
    }

    /// Join as a new instance (spec §4.8 steps 1, 4, 5, 6).
    ///
    /// Publishes `TransferReady`, then waits up to [`NO_RESPONSE_TIMEOUT`]
    /// for either `TransferClear` (read the handoff note, publish
    /// `TransferAck`, transition to `Active`) or `TransferAbort`
    /// (transition to `Active` as a fresh start). A timeout with no
    /// response also activates fresh, per spec.
    pub async fn join(&self) -> Result<JoinOutcome, TransferError> {
        if self.state() != TransferState::Pending {
            return Err(TransferError::WrongState(self.state()));
        }

        let stream = self.ensure_stream().await?;
        let clear_consumer = self
            .bus
            .durable_consumer(
                &stream,
                &format!("joiner-clear-{}", self.instance_id),
                subjects::TRANSFER_CLEAR,
                Duration::from_secs(5),
                1,
            )
            .await?;
        let abort_consumer = self
            .bus
            .durable_consumer(
                &stream,
                &format!("joiner-abort-{}", self.instance_id),
                subjects::TRANSFER_ABORT,
                Duration::from_secs(5),
                1,
            )
            .await?;

        let ready = TransferReady::new(
            self.instance_id.clone(),
            self.version.clone(),
            chrono::Utc::now().to_rfc3339(),
        );
        self.bus.publish(subjects::TRANSFER_READY, &ready).await?;

        let outcome = tokio::time::timeout(NO_RESPONSE_TIMEOUT, async {
            loop {
                tokio::select! {
                    clear = clear_consumer.next::<TransferClear>() => {
                        if let Ok(delivered) = clear {
                            delivered.ack().await.ok();
                            return HandshakeSignal::Clear(delivered.payload);
                        }
                    }
                    abort = abort_consumer.next::<TransferAbort>() => {
                        if let Ok(delivered) = abort {
                            delivered.ack().await.ok();
                            return HandshakeSignal::Abort(delivered.payload);
                        }
                    }
                }
            }
        })
        .await;

        match outcome {
            Ok(HandshakeSignal::Clear(clear)) => {
                if let Some(note) = self.store.latest_handoff_note().await? {
                    if note.id != clear.handoff_note_id {
                        tracing::warn!(
                            expected = %clear.handoff_note_id,
                            actual = %note.id,
                            "transfer: handoff note id mismatch, reading latest anyway"
                        );
                    }
                } else {
                    tracing::warn!("transfer: received TransferClear but no handoff note exists");
                }
                let ack = TransferAck::new(self.instance_id.clone(), chrono::Utc::now().to_rfc3339());
                self.bus.publish(subjects::TRANSFER_ACK, &ack).await?;
                self.set_state(TransferState::Active);
                Ok(JoinOutcome::HandoffReceived)
            }
            Ok(HandshakeSignal::Abort(abort)) => {
                tracing::info!(reason = %abort.reason, "transfer: handoff aborted, activating fresh");
                self.set_state(TransferState::Active);
                Ok(JoinOutcome::FreshStart)
            }
            Err(_) => {
                tracing::info!("transfer: no response within timeout, activating fresh");
                self.set_state(TransferState::Active);
                Ok(JoinOutcome::FreshStart)
            }
        }
    }

    /// Serve one handoff cycle as the active instance (spec §4.8 steps 2,
    /// 3, 6), triggered by a `TransferReady` this process already
    /// received out of band (the caller owns the `transfer.ready`
    /// subscription since it also governs normal request handling).
    ///
    /// `drain` resolves once in-flight requests have finished; it is
    /// raced against [`DRAIN_TIMEOUT`] (or `drain_timeout` if shorter).
    /// `active_conversations`/`pending_schedules` populate the handoff
    /// note written before `TransferClear` is published.
    pub async fn serve_handoff(
        &self,
        drain_timeout: Duration,
        drain: impl std::future::Future<Output = ()>,
        active_conversations: &[String],
        pending_schedules: &[String],
    ) -> Result<(), TransferError> {
        if self.state() != TransferState::Active {
            return Err(TransferError::WrongState(self.state()));
        }
        self.set_state(TransferState::Draining);

        let bound = drain_timeout.min(DRAIN_TIMEOUT);
        let _ = tokio::time::timeout(bound, drain).await;

        let note = self
            .store
            .insert_handoff_note(&self.version, None, active_conversations, pending_schedules)
            .await?;

        let clear = TransferClear::new(self.instance_id.clone(), note.id, chrono::Utc::now().to_rfc3339());
        self.bus.publish(subjects::TRANSFER_CLEAR, &clear).await?;

        let stream = self.ensure_stream().await?;
        let ack_consumer = self
            .bus
            .durable_consumer(
                &stream,
                &format!("active-ack-{}", self.instance_id),
                subjects::TRANSFER_ACK,
                Duration::from_secs(5),
                1,
            )
            .await?;
        let _ = tokio::time::timeout(ACK_TIMEOUT, ack_consumer.next::<TransferAck>()).await;

        self.set_state(TransferState::Shutdown);
        Ok(())
    }

    /// Abandon an in-progress handoff. On abort, a joining instance
    /// activates as a fresh start and the active instance shuts down
    /// (spec §4.8 step 6); this coordinator only publishes the message,
    /// the caller applies the resulting state transition appropriate to
    /// its role (`join`'s abort branch already does this for joiners).
    pub async fn abort(&self, reason: impl Into<String>) -> Result<(), TransferError> {
        let abort = TransferAbort::new(self.instance_id.clone(), reason.into(), chrono::Utc::now().to_rfc3339());
        self.bus.publish(subjects::TRANSFER_ABORT, &abort).await?;
        Ok(())
    }
}

enum HandshakeSignal {
    Clear(TransferClear),
    Abort(TransferAbort),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_bound_never_exceeds_the_hard_ceiling() {
        let requested = Duration::from_secs(600);
        assert_eq!(requested.min(DRAIN_TIMEOUT), DRAIN_TIMEOUT);
    }

    #[test]
    fn join_outcome_variants_are_distinct() {
        assert_ne!(JoinOutcome::HandoffReceived, JoinOutcome::FreshStart);
    }

    #[test]
    fn wrong_state_error_reports_the_offending_state() {
        let err = TransferError::WrongState(TransferState::Draining);
        assert!(err.to_string().contains("Draining"));
    }
}
