//! End-to-end scenarios over the in-memory hub.

use std::collections::BTreeMap;
use std::sync::Arc;

use quill_proto::{ArticleList, ArticleName, Version, WriteAck};

use super::helpers::{TestWriter, revision, terminator, update};
use crate::channel::ChannelError;
use crate::channel::local::LocalHub;
use crate::directory::DirectoryView;
use crate::edit::{ArticleEditor, EditEvent, EditSession, SaveBlocked};
use crate::history::{ArticleHistory, HistoryEvent};
use crate::save::{SaveError, SaveOutcome, save};
use crate::sync::{ArticleViewer, SyncEvent};
use crate::topic::TopicFactory;

#[tokio::test(flavor = "current_thread")]
async fn concurrent_edit_blocks_save_locally() {
	let hub = LocalHub::new();
	let topics = Arc::new(TopicFactory::default());
	let writer = TestWriter::new();

	// View Foo at version 5.
	let mut viewer = ArticleViewer::open(hub.clone(), topics.clone(), ArticleName::from("Foo"))
		.expect("open view");
	hub.publish_content(update("Foo", "5", "five"));
	assert_eq!(viewer.next().await, Some(SyncEvent::Loaded));

	// Open an edit based on it.
	let mut editor = ArticleEditor::open(hub.clone(), topics.clone(), ArticleName::from("Foo"))
		.expect("open editor");
	hub.publish_content(update("Foo", "5", "five"));
	assert_eq!(editor.next().await, Some(EditEvent::Loaded));
	assert_eq!(
		editor.session().base_version().map(Version::as_str),
		Some("5")
	);

	editor.session_mut().set_content("five plus local edits");
	editor.session_mut().set_message("expand the intro");

	// A concurrent save lands on the server.
	hub.publish_content(update("Foo", "6", "six"));
	assert_eq!(editor.next().await, Some(EditEvent::Conflicted));
	assert!(editor.session().is_stale());

	// The save is refused locally; no request is sent.
	let result = editor.save(writer.as_ref()).await;
	assert_eq!(result, Err(SaveError::Blocked(SaveBlocked::Stale)));
	assert_eq!(writer.request_count(), 0);

	// The working copy survives for a manual reload.
	assert_eq!(editor.session().content(), "five plus local edits");
}

#[tokio::test(flavor = "current_thread")]
async fn missing_document_routes_to_creation() {
	let hub = LocalHub::new();
	let topics = Arc::new(TopicFactory::default());
	let writer = TestWriter::new();

	let mut viewer =
		ArticleViewer::open(hub.clone(), topics.clone(), ArticleName::from("New Page"))
			.expect("open view");
	hub.publish_content(update("New Page", "0", ""));
	assert_eq!(viewer.next().await, Some(SyncEvent::Missing));

	// The consumer leaves the view and opens the creation edit instead.
	drop(viewer);
	let mut editor =
		ArticleEditor::open(hub.clone(), topics.clone(), ArticleName::from("New Page"))
			.expect("open editor");
	hub.publish_content(update("New Page", "0", ""));
	assert_eq!(editor.next().await, Some(EditEvent::Loaded));
	assert!(editor.session().is_create());

	editor.session_mut().set_content("first draft");
	editor.session_mut().set_message("create page");
	writer.enqueue(Ok(WriteAck::accepted()));
	assert_eq!(editor.save(writer.as_ref()).await, Ok(SaveOutcome::Accepted));

	let requests = writer.requests();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].version.as_str(), "0");
	assert_eq!(requests[0].content, "first draft");
	assert_eq!(requests[0].message, "create page");
}

#[tokio::test(flavor = "current_thread")]
async fn save_outcomes_follow_the_acknowledgement() {
	let writer = TestWriter::new();

	let mut session = EditSession::new(ArticleName::from("Foo"));
	session.accept(&update("Foo", "5", "five"));
	session.set_content("five, improved");
	session.set_message("clarify");

	writer.enqueue(Ok(WriteAck::accepted()));
	assert_eq!(
		save(writer.as_ref(), &session).await,
		Ok(SaveOutcome::Accepted)
	);

	writer.enqueue(Ok(WriteAck::rejected("version mismatch")));
	assert_eq!(
		save(writer.as_ref(), &session).await,
		Ok(SaveOutcome::Rejected("version mismatch".to_string()))
	);

	writer.enqueue(Err(ChannelError::Closed));
	assert_eq!(
		save(writer.as_ref(), &session).await,
		Err(SaveError::Transport(ChannelError::Closed))
	);

	// No scripted reply at all: the acknowledgement sender is dropped.
	assert_eq!(
		save(writer.as_ref(), &session).await,
		Err(SaveError::Transport(ChannelError::Closed))
	);

	// Every attempt passed the local gate and reached the sink.
	assert_eq!(writer.request_count(), 4);
}

#[tokio::test(flavor = "current_thread")]
async fn history_accumulates_over_the_channel() {
	let hub = LocalHub::new();
	let topics = Arc::new(TopicFactory::default());
	let mut history = ArticleHistory::open(hub.clone(), topics, ArticleName::from("Foo"))
		.expect("open history");

	hub.publish_history(revision("Foo", "1", "first"));
	hub.publish_history(revision("Foo", "2", "second"));
	hub.publish_history(revision("Foo", "1", "first again"));
	hub.publish_history(terminator("Foo"));

	assert_eq!(history.next().await, Some(HistoryEvent::Appended));
	assert_eq!(history.next().await, Some(HistoryEvent::Appended));
	assert_eq!(history.next().await, Some(HistoryEvent::Duplicate));
	assert_eq!(history.next().await, Some(HistoryEvent::Complete));

	let log = history.log();
	assert_eq!(log.len(), 2);
	assert!(log.is_complete());
	let order: Vec<&str> = log.revisions().map(|r| r.version.as_str()).collect();
	assert_eq!(order, ["1", "2"]);
}

#[tokio::test(flavor = "current_thread")]
async fn directory_follows_the_list_topic() {
	let hub = LocalHub::new();
	let topics = TopicFactory::default();
	let mut view = DirectoryView::open(hub.clone(), &topics).expect("open directory");
	assert!(view.directory().is_loading());

	let mut entries = BTreeMap::new();
	entries.insert(ArticleName::from("Foo"), serde_json::json!("5"));
	entries.insert(ArticleName::from("Main Page"), serde_json::json!("12"));
	hub.publish_list(ArticleList(entries));

	assert!(view.refreshed().await);
	assert_eq!(
		view.directory().articles(),
		[ArticleName::from("Foo"), ArticleName::from("Main Page")]
	);
	assert!(!view.directory().is_loading());
}
