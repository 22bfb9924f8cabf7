//! Application-owned article directory state.
//!
//! The directory replaces root-level reactive state with an explicitly
//! owned object: mutation happens only through [`ArticleDirectory::accept_list`],
//! and consumers receive read-only views.

use std::sync::Arc;

use quill_proto::{ArticleList, ArticleName, Message};

use crate::binding::ViewSubscription;
use crate::channel::{Channel, ChannelError};
use crate::topic::TopicFactory;

/// The list of known articles.
#[derive(Debug)]
pub struct ArticleDirectory {
	articles: Vec<ArticleName>,
	loading: bool,
}

impl ArticleDirectory {
	/// Start an empty directory in the loading state.
	#[must_use]
	pub fn new() -> Self {
		Self {
			articles: Vec::new(),
			loading: true,
		}
	}

	/// Replace the directory contents from an article-list message.
	pub fn accept_list(&mut self, list: &ArticleList) {
		self.articles = list.names().cloned().collect();
		self.loading = false;
	}

	/// Known article names.
	#[must_use]
	pub fn articles(&self) -> &[ArticleName] {
		&self.articles
	}

	/// True until the first list message lands.
	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.loading
	}

	/// True when the directory has loaded and lists nothing.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.articles.is_empty()
	}
}

impl Default for ArticleDirectory {
	fn default() -> Self {
		Self::new()
	}
}

/// A live directory view: the article-list binding driving an
/// [`ArticleDirectory`].
#[derive(Debug)]
pub struct DirectoryView {
	sub: ViewSubscription,
	directory: ArticleDirectory,
}

impl DirectoryView {
	/// Open the directory: bind the article-list topic.
	pub fn open(channel: Arc<dyn Channel>, topics: &TopicFactory) -> Result<Self, ChannelError> {
		let mut sub = ViewSubscription::new(channel);
		sub.bind(topics.list())?;
		Ok(Self {
			sub,
			directory: ArticleDirectory::new(),
		})
	}

	/// Await the next list message and apply it.
	///
	/// Returns `false` when the stream has ended.
	pub async fn refreshed(&mut self) -> bool {
		loop {
			let Some(message) = self.sub.recv().await else {
				return false;
			};
			let Message::List(list) = message else {
				continue;
			};
			self.directory.accept_list(&list);
			return true;
		}
	}

	/// Current directory state.
	#[must_use]
	pub fn directory(&self) -> &ArticleDirectory {
		&self.directory
	}

	/// Release the binding early.
	pub fn close(&mut self) {
		self.sub.unbind();
	}
}
