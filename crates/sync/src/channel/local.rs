//! In-memory channel for tests and single-process embedding.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex};

use quill_proto::{ArticleList, ArticleName, Message, Update};
use tokio::sync::mpsc;

use super::{Channel, ChannelError};
use crate::topic::{Topic, encode_segment};

/// In-memory pub/sub hub.
///
/// Keeps a registry of active topics and fans article updates out to every
/// subscription whose path targets that article, the way a path-routed
/// broker would. Subscriptions whose receiver has gone away are pruned on
/// the next delivery attempt.
#[derive(Debug)]
pub struct LocalHub {
	app: String,
	topics: Mutex<HashMap<String, mpsc::UnboundedSender<Message>>>,
}

impl LocalHub {
	/// Create a hub for the default `wiki` application segment.
	#[must_use]
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Create a hub rooted at a custom application segment.
	#[must_use]
	pub fn with_app(app: impl Into<String>) -> Arc<Self> {
		Arc::new(Self {
			app: app.into(),
			topics: Mutex::new(HashMap::new()),
		})
	}

	/// Number of currently active subscriptions.
	#[must_use]
	pub fn active_topics(&self) -> usize {
		self.topics.lock().unwrap().len()
	}

	/// Whether `topic` currently has a subscriber.
	#[must_use]
	pub fn is_subscribed(&self, topic: &Topic) -> bool {
		self.topics.lock().unwrap().contains_key(topic.as_str())
	}

	/// Deliver `update` to every content subscription for its article.
	///
	/// Returns the number of subscriptions reached.
	pub fn publish_content(&self, update: Update) -> usize {
		let prefix = format!(
			"/{}/article/content/{}/",
			self.app,
			encode_segment(update.article.as_str())
		);
		self.fan_out(&prefix, Message::Article(update))
	}

	/// Deliver `update` to every history subscription for its article.
	pub fn publish_history(&self, update: Update) -> usize {
		let prefix = format!(
			"/{}/article/history/{}/",
			self.app,
			encode_segment(update.article.as_str())
		);
		self.fan_out(&prefix, Message::Article(update))
	}

	/// Deliver `update` to every content subscription for `article`.
	///
	/// Used to exercise cross-delivery: the payload's own article name may
	/// differ from the targeted topic.
	pub fn publish_content_to(&self, article: &ArticleName, update: Update) -> usize {
		let prefix = format!(
			"/{}/article/content/{}/",
			self.app,
			encode_segment(article.as_str())
		);
		self.fan_out(&prefix, Message::Article(update))
	}

	/// Deliver `list` on the article-list topic.
	pub fn publish_list(&self, list: ArticleList) -> usize {
		let path = format!("/{}/article/list", self.app);
		self.fan_out(&path, Message::List(list))
	}

	fn fan_out(&self, prefix: &str, message: Message) -> usize {
		let mut topics = self.topics.lock().unwrap();
		let mut delivered = 0;
		let mut dead = Vec::new();
		for (path, tx) in topics.iter() {
			if path.starts_with(prefix) {
				if tx.send(message.clone()).is_ok() {
					delivered += 1;
				} else {
					dead.push(path.clone());
				}
			}
		}
		for path in dead {
			topics.remove(&path);
		}
		delivered
	}
}

impl Default for LocalHub {
	fn default() -> Self {
		Self {
			app: "wiki".to_string(),
			topics: Mutex::new(HashMap::new()),
		}
	}
}

impl Channel for LocalHub {
	fn subscribe(&self, topic: &Topic) -> Result<mpsc::UnboundedReceiver<Message>, ChannelError> {
		let mut topics = self.topics.lock().unwrap();
		match topics.entry(topic.as_str().to_string()) {
			Entry::Occupied(mut entry) => {
				if !entry.get().is_closed() {
					return Err(ChannelError::TopicBusy(topic.clone()));
				}
				// Stale registration left by a dropped receiver.
				let (tx, rx) = mpsc::unbounded_channel();
				entry.insert(tx);
				Ok(rx)
			}
			Entry::Vacant(entry) => {
				let (tx, rx) = mpsc::unbounded_channel();
				entry.insert(tx);
				Ok(rx)
			}
		}
	}

	fn unsubscribe(&self, topic: &Topic) {
		self.topics.lock().unwrap().remove(topic.as_str());
	}
}
