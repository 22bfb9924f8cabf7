//! Edit sessions with optimistic conflict detection.
//!
//! An [`EditSession`] is seeded from the first snapshot accepted on the
//! article's content topic; every later message for the same article is
//! checked against the base version. Conflicts are detected, not prevented:
//! the session only refuses to submit once it knows its basis is outdated,
//! and the server remains the authority that sequences writes.

use std::sync::Arc;

use quill_proto::{ArticleName, Message, Update, Version, WriteRequest};

use crate::binding::ViewSubscription;
use crate::channel::{Channel, ChannelError, WriteSink};
use crate::save::{SaveError, SaveOutcome};
use crate::sync::{LOADING_PLACEHOLDER, Phase};
use crate::topic::TopicFactory;

/// What a consumed message meant to an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
	/// Message was for another article (or a stale topic) and was discarded.
	Ignored,
	/// First snapshot accepted; the working copy is seeded and editing may
	/// begin.
	Loaded,
	/// A different version landed on the server; the session is stale now.
	Conflicted,
	/// A redelivery of the base version; nothing changed.
	Unchanged,
}

/// Reasons a save is refused locally, before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SaveBlocked {
	/// The base snapshot has not arrived yet.
	#[error("the document is still loading")]
	Loading,
	/// A newer version was saved on the server; reload before saving.
	#[error("a newer version has been saved on the server")]
	Stale,
	/// The change description is empty.
	#[error("the change description is empty")]
	MissingMessage,
}

/// One in-flight local edit of an article.
///
/// `stale` is monotonic: once a concurrent edit has been observed the
/// session can only be abandoned and reloaded, never resumed.
#[derive(Debug)]
pub struct EditSession {
	article: ArticleName,
	phase: Phase,
	base_version: Option<Version>,
	content: String,
	message: String,
	stale: bool,
}

impl EditSession {
	/// Start an edit of `article` in the loading phase.
	#[must_use]
	pub fn new(article: ArticleName) -> Self {
		Self {
			article,
			phase: Phase::Loading,
			base_version: None,
			content: LOADING_PLACEHOLDER.to_string(),
			message: String::new(),
			stale: false,
		}
	}

	/// Consume one message from the bound content topic.
	///
	/// The first matching snapshot seeds the working copy and base version;
	/// a version of `"0"` seeds a creation session the same way. Afterwards
	/// the incoming content is never applied again, only compared.
	pub fn accept(&mut self, update: &Update) -> EditEvent {
		if update.article != self.article {
			tracing::trace!(
				article = %update.article,
				expected = %self.article,
				"discarding update for unrelated article"
			);
			return EditEvent::Ignored;
		}
		match self.phase {
			Phase::Loading => {
				self.content = update.content.clone().unwrap_or_default();
				self.base_version = Some(update.version.clone());
				self.phase = Phase::Loaded;
				EditEvent::Loaded
			}
			Phase::Loaded => {
				if self.base_version.as_ref() != Some(&update.version) {
					self.stale = true;
					EditEvent::Conflicted
				} else {
					EditEvent::Unchanged
				}
			}
		}
	}

	/// The edited article.
	#[must_use]
	pub fn article(&self) -> &ArticleName {
		&self.article
	}

	/// True until the base snapshot lands.
	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.phase == Phase::Loading
	}

	/// Version this edit is based on, once loaded.
	#[must_use]
	pub fn base_version(&self) -> Option<&Version> {
		self.base_version.as_ref()
	}

	/// Whether this session would create the document.
	#[must_use]
	pub fn is_create(&self) -> bool {
		self.base_version
			.as_ref()
			.is_some_and(Version::is_missing)
	}

	/// Whether the base version is known to be outdated.
	#[must_use]
	pub fn is_stale(&self) -> bool {
		self.stale
	}

	/// Working copy of the document text.
	#[must_use]
	pub fn content(&self) -> &str {
		&self.content
	}

	/// Replace the working copy.
	pub fn set_content(&mut self, content: impl Into<String>) {
		self.content = content.into();
	}

	/// Change description for the pending save.
	#[must_use]
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Set the change description.
	pub fn set_message(&mut self, message: impl Into<String>) {
		self.message = message.into();
	}

	/// Check the local save gate and build the conditional write.
	///
	/// Fails without side effects while the session is loading, stale, or
	/// missing a change description.
	pub fn prepare_save(&self) -> Result<WriteRequest, SaveBlocked> {
		let base = match &self.base_version {
			Some(version) if self.phase == Phase::Loaded => version.clone(),
			_ => return Err(SaveBlocked::Loading),
		};
		if self.stale {
			return Err(SaveBlocked::Stale);
		}
		if self.message.is_empty() {
			return Err(SaveBlocked::MissingMessage);
		}
		Ok(WriteRequest {
			article: self.article.clone(),
			content: self.content.clone(),
			version: base,
			message: self.message.clone(),
		})
	}
}

/// A live edit view: one content-topic binding driving an [`EditSession`].
#[derive(Debug)]
pub struct ArticleEditor {
	sub: ViewSubscription,
	topics: Arc<TopicFactory>,
	session: EditSession,
}

impl ArticleEditor {
	/// Open an edit of `article`: bind its content topic and start loading.
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
			session: EditSession::new(article),
		})
	}

	/// Switch to editing another article.
	///
	/// The previous session is discarded; edit sessions never survive a
	/// target change.
	pub fn retarget(&mut self, article: ArticleName) -> Result<(), ChannelError> {
		self.sub.bind(self.topics.content(&article))?;
		self.session = EditSession::new(article);
		Ok(())
	}

	/// Await the next meaningful edit event.
	///
	/// Unrelated messages are discarded silently; `None` means the stream
	/// has ended.
	pub async fn next(&mut self) -> Option<EditEvent> {
		loop {
			let message = self.sub.recv().await?;
			let Message::Article(update) = message else {
				continue;
			};
			match self.session.accept(&update) {
				EditEvent::Ignored => continue,
				event => return Some(event),
			}
		}
	}

	/// The current edit session.
	#[must_use]
	pub fn session(&self) -> &EditSession {
		&self.session
	}

	/// Mutable access for working-copy edits.
	pub fn session_mut(&mut self) -> &mut EditSession {
		&mut self.session
	}

	/// Submit the session's working state as a conditional write.
	pub async fn save(&self, sink: &dyn WriteSink) -> Result<SaveOutcome, SaveError> {
		crate::save::save(sink, &self.session).await
	}

	/// Release the binding early (navigation away).
	pub fn close(&mut self) {
		self.sub.unbind();
	}
}

#[cfg(test)]
mod tests {
	use quill_proto::Identity;

	use super::*;

	fn update(article: &str, version: &str, content: &str) -> Update {
		Update {
			article: ArticleName::from(article),
			version: Version::from(version),
			content: Some(content.to_string()),
			author: Some(Identity::from("~zod")),
			at: None,
			message: None,
			ok: None,
		}
	}

	fn loaded_session() -> EditSession {
		let mut session = EditSession::new(ArticleName::from("Foo"));
		assert_eq!(session.accept(&update("Foo", "5", "base text")), EditEvent::Loaded);
		session
	}

	#[test]
	fn first_snapshot_seeds_the_working_copy() {
		let session = loaded_session();
		assert_eq!(session.content(), "base text");
		assert_eq!(session.base_version().map(Version::as_str), Some("5"));
		assert!(!session.is_stale());
	}

	#[test]
	fn differing_version_marks_stale_forever() {
		let mut session = loaded_session();

		assert_eq!(session.accept(&update("Foo", "6", "newer")), EditEvent::Conflicted);
		assert!(session.is_stale());
		// The working copy is untouched by the conflicting snapshot.
		assert_eq!(session.content(), "base text");

		// Even a redelivery of the base version cannot clear the flag.
		assert_eq!(session.accept(&update("Foo", "5", "base text")), EditEvent::Unchanged);
		assert!(session.is_stale());
	}

	#[test]
	fn base_version_redelivery_is_harmless() {
		let mut session = loaded_session();
		assert_eq!(session.accept(&update("Foo", "5", "base text")), EditEvent::Unchanged);
		assert!(!session.is_stale());
	}

	#[test]
	fn missing_version_seeds_a_creation_session() {
		let mut session = EditSession::new(ArticleName::from("New Page"));
		assert_eq!(
			session.accept(&update("New Page", Version::MISSING, "")),
			EditEvent::Loaded
		);
		assert!(session.is_create());
		assert_eq!(session.base_version().map(Version::as_str), Some("0"));
	}

	#[test]
	fn save_gate_orders_its_checks() {
		let mut session = EditSession::new(ArticleName::from("Foo"));
		assert_eq!(session.prepare_save(), Err(SaveBlocked::Loading));

		session.accept(&update("Foo", "5", "text"));
		assert_eq!(session.prepare_save(), Err(SaveBlocked::MissingMessage));

		session.set_message("tweak wording");
		let request = session.prepare_save().expect("gate passes");
		assert_eq!(request.version.as_str(), "5");
		assert_eq!(request.message, "tweak wording");

		session.accept(&update("Foo", "6", "other"));
		assert_eq!(session.prepare_save(), Err(SaveBlocked::Stale));
	}
}
