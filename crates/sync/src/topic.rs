//! Topic path construction for article subscriptions.
//!
//! Article names are arbitrary human-supplied strings, while subscription
//! paths are drawn from a restricted alphabet. [`encode_segment`] folds a
//! name into a safe path segment injectively, so two distinct articles can
//! never collide on one topic. [`TopicFactory`] assembles the full paths and
//! appends a per-subscription uniqueness suffix, keeping rapid
//! rebind/unbind/rebind cycles on the same article from ever reusing an
//! in-flight topic name.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use quill_proto::ArticleName;

/// Escape marker for characters outside the safe alphabet.
const ESCAPE: char = '~';
/// Separator substituted for spaces and used to terminate hex escapes.
const SEPARATOR: char = '.';

/// A fully encoded subscription topic path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
	/// View the raw path.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Topic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Encode an article name into a safe topic path segment.
///
/// Lowercase letters, digits and hyphens pass through unchanged; a space
/// becomes `.`; a literal `.` becomes `~.`; the marker `~` doubles to `~~`;
/// any other character becomes `~`, its code point in lowercase hex, and a
/// terminating `.`. Total and deterministic, and injective because the
/// marker never appears unescaped in the output.
#[must_use]
pub fn encode_segment(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	for c in name.chars() {
		match c {
			'a'..='z' | '0'..='9' | '-' => out.push(c),
			' ' => out.push(SEPARATOR),
			SEPARATOR => {
				out.push(ESCAPE);
				out.push(SEPARATOR);
			}
			ESCAPE => {
				out.push(ESCAPE);
				out.push(ESCAPE);
			}
			other => {
				out.push(ESCAPE);
				out.push_str(&format!("{:x}", other as u32));
				out.push(SEPARATOR);
			}
		}
	}
	out
}

/// Source of subscription topic paths for one application.
///
/// Shared by all views; the counter guarantees that no two subscriptions
/// created through the same factory ever share a path.
#[derive(Debug)]
pub struct TopicFactory {
	app: String,
	seq: AtomicU64,
}

impl TopicFactory {
	/// Create a factory rooted at the given application path segment.
	#[must_use]
	pub fn new(app: impl Into<String>) -> Self {
		Self {
			app: app.into(),
			seq: AtomicU64::new(0),
		}
	}

	/// Topic for the live content stream of one article.
	#[must_use]
	pub fn content(&self, article: &ArticleName) -> Topic {
		Topic(format!(
			"/{}/article/content/{}/{}",
			self.app,
			encode_segment(article.as_str()),
			self.next_suffix()
		))
	}

	/// Topic for the revision-history stream of one article.
	#[must_use]
	pub fn history(&self, article: &ArticleName) -> Topic {
		Topic(format!(
			"/{}/article/history/{}/{}",
			self.app,
			encode_segment(article.as_str()),
			self.next_suffix()
		))
	}

	/// Topic for the article-list stream.
	///
	/// The list is a singleton resource and carries no uniqueness suffix.
	#[must_use]
	pub fn list(&self) -> Topic {
		Topic(format!("/{}/article/list", self.app))
	}

	fn next_suffix(&self) -> u64 {
		self.seq.fetch_add(1, Ordering::Relaxed)
	}
}

impl Default for TopicFactory {
	fn default() -> Self {
		Self::new("wiki")
	}
}
