//! Wire types for the wiki subscription protocol.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire timestamp: a UTC instant carried as epoch milliseconds.
pub type Timestamp = DateTime<Utc>;

/// Human-readable article title, the unique identifier of a document.
///
/// Arbitrary characters are allowed. The topic encoder is responsible for
/// folding a name into a safe subscription path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleName(pub String);

impl ArticleName {
	/// View as a plain string slice.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ArticleName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ArticleName {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

impl From<String> for ArticleName {
	fn from(s: String) -> Self {
		Self(s)
	}
}

/// Opaque ordinal token distinguishing successive saved states of a document.
///
/// Versions increase strictly per document on the server side; the client
/// only ever compares them for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub String);

impl Version {
	/// Reserved token meaning the document does not exist yet.
	pub const MISSING: &'static str = "0";

	/// View as a plain string slice.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// True when this version denotes a nonexistent document.
	#[must_use]
	pub fn is_missing(&self) -> bool {
		self.0 == Self::MISSING
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Version {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// Opaque identity string supplied by the surrounding platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
	/// View as a plain string slice.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Identity {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// Any message delivered on a subscription topic.
///
/// Untagged on the wire: article streams carry objects with `article` and
/// `version` fields, the article-list stream carries a name-keyed map. The
/// variant order matters for deserialization and must keep `Article` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	/// Content or history stream payload.
	Article(Update),
	/// Article-list stream payload.
	List(ArticleList),
}

/// One message on an article content or history topic.
///
/// Both streams share this shape; fields a stream does not carry stay
/// `None`. A history stream ends with a message carrying `ok`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
	/// Document this message is about.
	pub article: ArticleName,
	/// Version of the document this message reports.
	pub version: Version,
	/// Full document text, when the stream carries content.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	/// Author of this version.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub author: Option<Identity>,
	/// When this version was saved.
	#[serde(
		default,
		with = "chrono::serde::ts_milliseconds_option",
		skip_serializing_if = "Option::is_none"
	)]
	pub at: Option<Timestamp>,
	/// Change description attached to this version.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// End-of-stream marker on history topics; such a message is not a
	/// revision.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ok: Option<bool>,
}

impl Update {
	/// True when this message terminates a history stream.
	#[must_use]
	pub fn is_terminator(&self) -> bool {
		self.ok.is_some()
	}

	/// Project the historical-revision view of this message.
	///
	/// Returns `None` for terminators and for messages that carry no
	/// content.
	#[must_use]
	pub fn revision(&self) -> Option<Revision> {
		if self.is_terminator() {
			return None;
		}
		let content = self.content.clone()?;
		Some(Revision {
			article: self.article.clone(),
			version: self.version.clone(),
			author: self.author.clone(),
			at: self.at,
			message: self.message.clone(),
			content,
		})
	}
}

/// One historical snapshot of a document. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
	/// Document this revision belongs to.
	pub article: ArticleName,
	/// Version saved by this revision.
	pub version: Version,
	/// Author of the revision.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub author: Option<Identity>,
	/// When the revision was saved.
	#[serde(
		default,
		with = "chrono::serde::ts_milliseconds_option",
		skip_serializing_if = "Option::is_none"
	)]
	pub at: Option<Timestamp>,
	/// Change description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Full document text at this revision.
	pub content: String,
}

/// Article-list topic payload: article name to opaque per-article data.
///
/// Consumers use only the keys; the values are server-defined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleList(pub BTreeMap<ArticleName, serde_json::Value>);

impl ArticleList {
	/// Article names in the list, in key order.
	pub fn names(&self) -> impl Iterator<Item = &ArticleName> {
		self.0.keys()
	}

	/// Number of listed articles.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// True when no articles are listed.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Conditional write of a new document version.
///
/// `version` is the optimistic-concurrency precondition: the write is based
/// on that version and the server must refuse it if the document has moved
/// on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
	/// Document to write.
	pub article: ArticleName,
	/// New full document text.
	pub content: String,
	/// Version the edit was based on.
	pub version: Version,
	/// Change description for the history.
	pub message: String,
}

/// Acknowledgement of a write request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteAck {
	/// Whether the server accepted the write.
	pub ok: bool,
	/// Server-supplied rejection reason when `ok` is false.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub res: Option<String>,
}

impl WriteAck {
	/// An accepting acknowledgement.
	#[must_use]
	pub fn accepted() -> Self {
		Self { ok: true, res: None }
	}

	/// A refusing acknowledgement carrying the server's reason.
	#[must_use]
	pub fn rejected(reason: impl Into<String>) -> Self {
		Self {
			ok: false,
			res: Some(reason.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn update_timestamp_travels_as_millis() {
		let json = r#"{"article":"Foo","version":"5","content":"hi","at":1700000000000}"#;
		let update: Update = serde_json::from_str(json).expect("valid update");
		assert_eq!(update.at.map(|t| t.timestamp_millis()), Some(1_700_000_000_000));

		let back = serde_json::to_value(&update).expect("serializable");
		assert_eq!(back["at"], serde_json::json!(1_700_000_000_000_i64));
	}

	#[test]
	fn message_discriminates_article_from_list() {
		let article: Message =
			serde_json::from_str(r#"{"article":"Foo","version":"1"}"#).expect("article payload");
		assert!(matches!(article, Message::Article(_)));

		let list: Message =
			serde_json::from_str(r#"{"Foo":"3","Bar":"1"}"#).expect("list payload");
		match list {
			Message::List(list) => assert_eq!(list.len(), 2),
			other => panic!("expected list, got {:?}", other),
		}
	}

	#[test]
	fn terminator_is_not_a_revision() {
		let update: Update =
			serde_json::from_str(r#"{"article":"Foo","version":"3","ok":true}"#).expect("ack");
		assert!(update.is_terminator());
		assert!(update.revision().is_none());
	}
}
