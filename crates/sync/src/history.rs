//! Revision-history reconciliation.
//!
//! A history subscription may redeliver or replay revisions; the log keeps
//! the first occurrence of each version and the order it arrived in, so a
//! replayed stream reproduces the same display.

use std::collections::HashMap;
use std::sync::Arc;

use quill_proto::{ArticleName, Message, Revision, Update, Version};

use crate::binding::ViewSubscription;
use crate::channel::{Channel, ChannelError};
use crate::topic::TopicFactory;

/// What a consumed message meant to the revision log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
	/// Message was for another article, or carried no revision.
	Ignored,
	/// New revision appended in arrival order.
	Appended,
	/// Redelivery of an already-seen version; discarded.
	Duplicate,
	/// Stream terminator; the log is complete.
	Complete,
}

/// Deduplicated, arrival-ordered revision collection for one article.
#[derive(Debug)]
pub struct RevisionLog {
	article: ArticleName,
	by_version: HashMap<Version, Revision>,
	order: Vec<Version>,
	complete: bool,
}

impl RevisionLog {
	/// Start an empty log for `article`.
	#[must_use]
	pub fn new(article: ArticleName) -> Self {
		Self {
			article,
			by_version: HashMap::new(),
			order: Vec::new(),
			complete: false,
		}
	}

	/// Consume one message from the bound history topic.
	pub fn accept(&mut self, update: &Update) -> HistoryEvent {
		if update.is_terminator() {
			self.complete = true;
			return HistoryEvent::Complete;
		}
		if update.article != self.article {
			tracing::trace!(
				article = %update.article,
				expected = %self.article,
				"discarding revision for unrelated article"
			);
			return HistoryEvent::Ignored;
		}
		if self.by_version.contains_key(&update.version) {
			return HistoryEvent::Duplicate;
		}
		let Some(revision) = update.revision() else {
			return HistoryEvent::Ignored;
		};
		self.by_version.insert(update.version.clone(), revision);
		self.order.push(update.version.clone());
		HistoryEvent::Appended
	}

	/// The tracked article.
	#[must_use]
	pub fn article(&self) -> &ArticleName {
		&self.article
	}

	/// Look up one revision by version.
	#[must_use]
	pub fn get(&self, version: &Version) -> Option<&Revision> {
		self.by_version.get(version)
	}

	/// Revisions in display order: the arrival order of first-seen versions.
	pub fn revisions(&self) -> impl Iterator<Item = &Revision> {
		self.order.iter().filter_map(|v| self.by_version.get(v))
	}

	/// Number of distinct revisions seen.
	#[must_use]
	pub fn len(&self) -> usize {
		self.order.len()
	}

	/// True when no revision has arrived yet.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Whether the stream terminator has been seen.
	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.complete
	}
}

/// A live history view: one history-topic binding driving a
/// [`RevisionLog`].
#[derive(Debug)]
pub struct ArticleHistory {
	sub: ViewSubscription,
	topics: Arc<TopicFactory>,
	log: RevisionLog,
}

impl ArticleHistory {
	/// Open the history of `article`: bind its history topic.
	pub fn open(
		channel: Arc<dyn Channel>,
		topics: Arc<TopicFactory>,
		article: ArticleName,
	) -> Result<Self, ChannelError> {
		let mut sub = ViewSubscription::new(channel);
		sub.bind(topics.history(&article))?;
		Ok(Self {
			sub,
			topics,
			log: RevisionLog::new(article),
		})
	}

	/// Switch the history view to another article with a fresh log.
	pub fn retarget(&mut self, article: ArticleName) -> Result<(), ChannelError> {
		self.sub.bind(self.topics.history(&article))?;
		self.log = RevisionLog::new(article);
		Ok(())
	}

	/// Await the next meaningful history event.
	pub async fn next(&mut self) -> Option<HistoryEvent> {
		loop {
			let message = self.sub.recv().await?;
			let Message::Article(update) = message else {
				continue;
			};
			match self.log.accept(&update) {
				HistoryEvent::Ignored => continue,
				event => return Some(event),
			}
		}
	}

	/// The accumulated revision log.
	#[must_use]
	pub fn log(&self) -> &RevisionLog {
		&self.log
	}

	/// Release the binding early (navigation away).
	pub fn close(&mut self) {
		self.sub.unbind();
	}
}
