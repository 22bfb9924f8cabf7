//! Common test utilities.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use quill_proto::{ArticleName, Identity, Update, Version, WriteAck, WriteRequest};
use tokio::sync::oneshot;

use crate::channel::{ChannelError, WriteSink};

/// Build a content-stream update.
pub fn update(article: &str, version: &str, content: &str) -> Update {
	Update {
		article: ArticleName::from(article),
		version: Version::from(version),
		content: Some(content.to_string()),
		author: Some(Identity::from("zod")),
		at: DateTime::from_timestamp_millis(1_700_000_000_000),
		message: None,
		ok: None,
	}
}

/// Build a history-stream revision message.
pub fn revision(article: &str, version: &str, message: &str) -> Update {
	Update {
		message: Some(message.to_string()),
		..update(article, version, &format!("content at {version}"))
	}
}

/// Build a history-stream terminator; its revision fields are irrelevant.
pub fn terminator(article: &str) -> Update {
	Update {
		article: ArticleName::from(article),
		version: Version::from("0"),
		content: None,
		author: None,
		at: None,
		message: None,
		ok: Some(true),
	}
}

/// Scripted write sink recording requests and replaying queued replies.
///
/// With no scripted reply the acknowledgement sender is dropped, modeling a
/// transport failure.
pub struct TestWriter {
	requests: Mutex<Vec<WriteRequest>>,
	replies: Mutex<VecDeque<Result<WriteAck, ChannelError>>>,
}

impl TestWriter {
	/// Create an empty writer.
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			requests: Mutex::new(Vec::new()),
			replies: Mutex::new(VecDeque::new()),
		})
	}

	/// Queue the reply for the next write.
	pub fn enqueue(&self, reply: Result<WriteAck, ChannelError>) {
		self.replies.lock().unwrap().push_back(reply);
	}

	/// Requests seen so far.
	pub fn requests(&self) -> Vec<WriteRequest> {
		self.requests.lock().unwrap().clone()
	}

	/// Number of requests seen so far.
	pub fn request_count(&self) -> usize {
		self.requests.lock().unwrap().len()
	}
}

impl WriteSink for TestWriter {
	fn write(&self, request: WriteRequest) -> oneshot::Receiver<Result<WriteAck, ChannelError>> {
		self.requests.lock().unwrap().push(request);
		let (tx, rx) = oneshot::channel();
		if let Some(reply) = self.replies.lock().unwrap().pop_front() {
			let _ = tx.send(reply);
		}
		rx
	}
}
