//! Subscription lifecycle management.
//!
//! Each active view holds zero or one topic binding. Binding again tears the
//! previous subscription down first, unbinding is idempotent, and dropping
//! the holder releases the subscription, so a view can never leak a
//! server-side registration. Messages already in flight for a torn-down
//! topic are dropped by the consumer on article mismatch.

use std::fmt;
use std::sync::Arc;

use quill_proto::Message;
use tokio::sync::mpsc;

use crate::channel::{Channel, ChannelError};
use crate::topic::Topic;

/// An active topic registration and its message stream.
#[derive(Debug)]
pub struct Binding {
	topic: Topic,
	rx: mpsc::UnboundedReceiver<Message>,
}

impl Binding {
	/// The bound topic path.
	#[must_use]
	pub fn topic(&self) -> &Topic {
		&self.topic
	}
}

/// Holder of the zero-or-one topic binding of one view.
pub struct ViewSubscription {
	channel: Arc<dyn Channel>,
	bound: Option<Binding>,
}

impl ViewSubscription {
	/// Create an unbound holder on `channel`.
	#[must_use]
	pub fn new(channel: Arc<dyn Channel>) -> Self {
		Self {
			channel,
			bound: None,
		}
	}

	/// Bind to `topic`, tearing down any previous binding first.
	pub fn bind(&mut self, topic: Topic) -> Result<(), ChannelError> {
		self.unbind();
		let rx = self.channel.subscribe(&topic)?;
		tracing::debug!(topic = %topic, "bound view topic");
		self.bound = Some(Binding { topic, rx });
		Ok(())
	}

	/// Release the current binding. No-op when unbound.
	pub fn unbind(&mut self) {
		if let Some(binding) = self.bound.take() {
			self.channel.unsubscribe(&binding.topic);
			tracing::debug!(topic = %binding.topic, "dropped view topic");
		}
	}

	/// Topic of the active binding, if any.
	#[must_use]
	pub fn topic(&self) -> Option<&Topic> {
		self.bound.as_ref().map(Binding::topic)
	}

	/// Whether a binding is active.
	#[must_use]
	pub fn is_bound(&self) -> bool {
		self.bound.is_some()
	}

	/// Await the next message on the bound topic.
	///
	/// Returns `None` when unbound or when the channel side has gone away.
	pub async fn recv(&mut self) -> Option<Message> {
		match &mut self.bound {
			Some(binding) => binding.rx.recv().await,
			None => None,
		}
	}
}

impl Drop for ViewSubscription {
	fn drop(&mut self) {
		self.unbind();
	}
}

impl fmt::Debug for ViewSubscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewSubscription")
			.field("channel", &"<Channel>")
			.field("bound", &self.bound)
			.finish()
	}
}
