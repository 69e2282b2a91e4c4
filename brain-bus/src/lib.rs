#![deny(missing_docs)]
//! Durable bus client for the Brain, built on NATS JetStream.
//!
//! Wraps a single [`async_nats::jetstream::Context`] with the idempotent
//! stream/consumer creation, explicit-ack, and redelivery semantics
//! described in SPEC_FULL.md §4.1. Envelope types live in
//! `brain_proto::bus` so publishers and subscribers agree on the wire
//! shape without this crate needing to know their field meanings.

pub mod subjects;

use std::time::Duration;

use async_nats::jetstream::consumer::{pull::Config as PullConfig, AckPolicy, DeliverPolicy};
use async_nats::jetstream::stream::Config as StreamConfig;
use futures::StreamExt;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors from bus operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BusError {
    /// Failed to connect to the NATS server.
    #[error("connect failed: {0}")]
    Connect(#[source] async_nats::ConnectError),

    /// Failed to create or look up a stream.
    #[error("stream error: {0}")]
    Stream(String),

    /// Failed to create or look up a consumer.
    #[error("consumer error: {0}")]
    Consumer(String),

    /// Failed to publish a message.
    #[error("publish failed: {0}")]
    Publish(String),

    /// Failed to serialize a payload to JSON.
    #[error("serialize failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to deserialize a payload from JSON.
    #[error("deserialize failed: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The message stream ended (connection closed) before a message arrived.
    #[error("message stream ended")]
    StreamEnded,
}

/// A durable pub/sub client over one NATS JetStream context.
///
/// Cheap to clone — `async_nats::Client` is itself a handle around a
/// shared connection.
#[derive(Clone)]
pub struct BusClient {
    jetstream: async_nats::jetstream::Context,
}

impl BusClient {
    /// Connect to a NATS server and wrap it in a JetStream context.
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = async_nats::connect(url).await.map_err(BusError::Connect)?;
        let jetstream = async_nats::jetstream::new(client);
        Ok(Self { jetstream })
    }

    /// Build a client from an already-established JetStream context.
    /// Useful for tests against an embedded or mocked server.
    pub fn from_context(jetstream: async_nats::jetstream::Context) -> Self {
        Self { jetstream }
    }

    /// Create a stream if it doesn't already exist, or return the existing
    /// one. Stream creation in JetStream is idempotent when the config
    /// matches, which is what callers always pass here.
    pub async fn ensure_stream(
        &self,
        name: &str,
        subjects: Vec<String>,
    ) -> Result<async_nats::jetstream::stream::Stream, BusError> {
        self.jetstream
            .get_or_create_stream(StreamConfig {
                name: name.to_string(),
                subjects,
                ..Default::default()
            })
            .await
            .map_err(|e| BusError::Stream(e.to_string()))
    }

    /// Publish a JSON-serializable payload to a subject and wait for the
    /// server to acknowledge the write landed in the stream.
    pub async fn publish<T: Serialize>(&self, subject: &str, payload: &T) -> Result<(), BusError> {
        let body = serde_json::to_vec(payload).map_err(BusError::Serialize)?;
        let ack = self
            .jetstream
            .publish(subject.to_string(), body.into())
            .await
            .map_err(|e| BusError::Publish(e.to_string()))?;
        ack.await.map_err(|e| BusError::Publish(e.to_string()))?;
        Ok(())
    }

    /// Create (idempotently) a durable pull consumer in a queue group and
    /// return a handle for fetching and acking messages.
    ///
    /// `max_deliver` bounds redelivery attempts before a message is
    /// considered a poison pill; `ack_wait` is how long the server waits
    /// for an explicit ack before redelivering.
    pub async fn durable_consumer(
        &self,
        stream: &async_nats::jetstream::stream::Stream,
        durable_name: &str,
        filter_subject: &str,
        ack_wait: Duration,
        max_deliver: i64,
    ) -> Result<Consumer, BusError> {
        let consumer = stream
            .get_or_create_consumer(
                durable_name,
                PullConfig {
                    durable_name: Some(durable_name.to_string()),
                    filter_subject: filter_subject.to_string(),
                    ack_policy: AckPolicy::Explicit,
                    ack_wait,
                    max_deliver,
                    deliver_policy: DeliverPolicy::All,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| BusError::Consumer(e.to_string()))?;
        Ok(Consumer { inner: consumer })
    }
}

/// A durable pull consumer bound to one subject filter.
///
/// Workers in the same queue group (same `durable_name`, same stream) share
/// load: each message goes to exactly one consumer instance.
pub struct Consumer {
    inner: async_nats::jetstream::consumer::PullConsumer,
}

impl Consumer {
    /// Pull and deserialize the next message, blocking until one arrives.
    /// The caller must `ack()` or `nack()` the returned message explicitly;
    /// dropping it without doing so lets `ack_wait` expire and triggers
    /// redelivery.
    pub async fn next<T: DeserializeOwned>(&self) -> Result<Delivered<T>, BusError> {
        let mut messages = self
            .inner
            .fetch()
            .max_messages(1)
            .messages()
            .await
            .map_err(|e| BusError::Consumer(e.to_string()))?;

        let message = messages
            .next()
            .await
            .ok_or(BusError::StreamEnded)?
            .map_err(|e| BusError::Consumer(e.to_string()))?;

        let payload: T =
            serde_json::from_slice(&message.payload).map_err(BusError::Deserialize)?;

        Ok(Delivered { message, payload })
    }
}

/// One delivered, not-yet-acked message.
pub struct Delivered<T> {
    message: async_nats::jetstream::Message,
    /// The deserialized envelope.
    pub payload: T,
}

impl<T> Delivered<T> {
    /// Acknowledge successful processing. The server will not redeliver.
    pub async fn ack(&self) -> Result<(), BusError> {
        self.message
            .ack()
            .await
            .map_err(|e| BusError::Consumer(e.to_string()))
    }

    /// Negative-acknowledge. The server redelivers immediately, subject to
    /// `max_deliver`.
    pub async fn nack(&self) -> Result<(), BusError> {
        self.message
            .ack_with(async_nats::jetstream::AckKind::Nak(None))
            .await
            .map_err(|e| BusError::Consumer(e.to_string()))
    }
}
