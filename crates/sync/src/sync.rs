//! Per-view document synchronization.
//!
//! [`DocumentSync`] is the state machine fed from an article's content
//! topic; [`ArticleViewer`] couples it with a topic binding for the life of
//! one view.

use std::sync::Arc;

use quill_proto::{ArticleName, Identity, Message, Timestamp, Update, Version};

use crate::binding::ViewSubscription;
use crate::channel::{Channel, ChannelError};
use crate::topic::TopicFactory;

/// Placeholder content shown while the first snapshot is in flight.
pub(crate) const LOADING_PLACEHOLDER: &str = "loading...";

/// Load phase of a synchronized view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// No snapshot accepted yet.
	Loading,
	/// First snapshot applied.
	Loaded,
}

/// What a consumed message meant to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
	/// Message was for another article (or a stale topic) and was discarded.
	Ignored,
	/// The document does not exist yet; the consumer should switch to the
	/// edit-creation flow.
	Missing,
	/// First snapshot applied; the view is now loaded.
	Loaded,
	/// A later snapshot refreshed content, author and timestamp.
	Refreshed,
}

/// Latest known state of one article, fed from its content topic.
#[derive(Debug)]
pub struct DocumentSync {
	article: ArticleName,
	phase: Phase,
	content: String,
	version: Option<Version>,
	author: Option<Identity>,
	at: Option<Timestamp>,
}

impl DocumentSync {
	/// Start tracking `article` in the loading phase.
	#[must_use]
	pub fn new(article: ArticleName) -> Self {
		Self {
			article,
			phase: Phase::Loading,
			content: LOADING_PLACEHOLDER.to_string(),
			version: None,
			author: None,
			at: None,
		}
	}

	/// Consume one message from the bound content topic.
	pub fn accept(&mut self, update: &Update) -> SyncEvent {
		if update.article != self.article {
			tracing::trace!(
				article = %update.article,
				expected = %self.article,
				"discarding update for unrelated article"
			);
			return SyncEvent::Ignored;
		}
		if self.phase == Phase::Loading && update.version.is_missing() {
			return SyncEvent::Missing;
		}

		if let Some(content) = &update.content {
			self.content = content.clone();
		}
		self.version = Some(update.version.clone());
		self.author = update.author.clone();
		self.at = update.at;

		match self.phase {
			Phase::Loading => {
				self.phase = Phase::Loaded;
				SyncEvent::Loaded
			}
			Phase::Loaded => SyncEvent::Refreshed,
		}
	}

	/// The tracked article.
	#[must_use]
	pub fn article(&self) -> &ArticleName {
		&self.article
	}

	/// Current load phase.
	#[must_use]
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// True until the first snapshot lands.
	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.phase == Phase::Loading
	}

	/// Latest known document text (a placeholder while loading).
	#[must_use]
	pub fn content(&self) -> &str {
		&self.content
	}

	/// Latest known version, once loaded.
	#[must_use]
	pub fn version(&self) -> Option<&Version> {
		self.version.as_ref()
	}

	/// Author of the latest known version.
	#[must_use]
	pub fn author(&self) -> Option<&Identity> {
		self.author.as_ref()
	}

	/// Save time of the latest known version.
	#[must_use]
	pub fn at(&self) -> Option<Timestamp> {
		self.at
	}
}

/// A live article view: one content-topic binding driving a
/// [`DocumentSync`].
///
/// Binds on open, rebinds with fresh state on retarget, releases on drop.
#[derive(Debug)]
pub struct ArticleViewer {
	sub: ViewSubscription,
	topics: Arc<TopicFactory>,
	doc: DocumentSync,
}

impl ArticleViewer {
	/// Open a view of `article`: bind its content topic and start loading.
	pub fn open(
		channel: Arc<dyn Channel>,
		topics: Arc<TopicFactory>,
		article: ArticleName,
	) -> Result<Self, ChannelError> {
		let mut sub = ViewSubscription::new(channel);
		sub.bind(topics.content(&article))?;
		Ok(Self {
			sub,
			topics,
			doc: DocumentSync::new(article),
		})
	}

	/// Switch the view to another article while it stays active.
	///
	/// Tears down the old binding, binds a fresh topic and resets to the
	/// loading phase. Messages still in flight for the old topic are
	/// discarded on article mismatch.
	pub fn retarget(&mut self, article: ArticleName) -> Result<(), ChannelError> {
		self.sub.bind(self.topics.content(&article))?;
		self.doc = DocumentSync::new(article);
		Ok(())
	}

	/// Await the next meaningful view event.
	///
	/// Unrelated messages are discarded silently; `None` means the stream
	/// has ended.
	pub async fn next(&mut self) -> Option<SyncEvent> {
		loop {
			let message = self.sub.recv().await?;
			let Message::Article(update) = message else {
				continue;
			};
			match self.doc.accept(&update) {
				SyncEvent::Ignored => continue,
				event => return Some(event),
			}
		}
	}

	/// Current document state.
	#[must_use]
	pub fn document(&self) -> &DocumentSync {
		&self.doc
	}

	/// Release the binding early (navigation away).
	pub fn close(&mut self) {
		self.sub.unbind();
	}
}
