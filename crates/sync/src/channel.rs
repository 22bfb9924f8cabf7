//! The publish/subscribe channel seam.
//!
//! The remote article source is an external collaborator reached through the
//! traits here. A subscription delivers [`Message`]s in arrival order over an
//! unbounded stream; a write is a single request/response exchange answered
//! on a oneshot channel. Everything below these seams (framing, transport,
//! reconnection) is outside this crate.

use quill_proto::{Message, WriteAck, WriteRequest};
use tokio::sync::{mpsc, oneshot};

use crate::topic::Topic;

pub mod local;

/// Errors surfaced at the channel seam.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
	/// The topic already has an active subscriber.
	#[error("topic already has an active subscriber: {0}")]
	TopicBusy(Topic),
	/// The channel can no longer deliver.
	#[error("subscription channel closed")]
	Closed,
}

/// Subscription side of the channel.
///
/// At most one subscriber may be active per topic. `unsubscribe` is
/// idempotent; unknown topics are ignored.
pub trait Channel {
	/// Open a subscription on `topic` and return its message stream.
	fn subscribe(&self, topic: &Topic) -> Result<mpsc::UnboundedReceiver<Message>, ChannelError>;

	/// Tear down the subscription on `topic`, if any.
	fn unsubscribe(&self, topic: &Topic);
}

/// Write side of the channel.
pub trait WriteSink {
	/// Send one conditional write; the acknowledgement arrives on the
	/// returned receiver. A dropped sender means the transport failed.
	fn write(&self, request: WriteRequest) -> oneshot::Receiver<Result<WriteAck, ChannelError>>;
}
