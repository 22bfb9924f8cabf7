//! Subscription-synchronization core for wiki article views.
//!
//! # Purpose
//!
//! quill-sync keeps a local view of a named, versioned wiki article
//! consistent with a remote publish/subscribe source and detects
//! concurrent-edit conflicts without a distributed lock. Presentation
//! concerns (layout, routing, markdown rendering) live outside this crate
//! and call in through a small fixed surface.
//!
//! # Mental model
//!
//! Every active view owns exactly one topic binding and one state machine
//! fed from it. Messages are consumed to completion, one at a time, in
//! arrival order; views never share mutable state, so no locks guard view
//! state. The channel is the only source of concurrency.
//!
//! # Key types
//!
//! | Type | Role |
//! | --- | --- |
//! | [`TopicFactory`] | Injective article-name encoding plus unique topic paths. |
//! | [`ViewSubscription`] | Owner of the zero-or-one topic binding of a view. |
//! | [`DocumentSync`] / [`ArticleViewer`] | Loading/Loaded snapshot tracking for a read view. |
//! | [`EditSession`] / [`ArticleEditor`] | Working copy, conflict detection and the local save gate. |
//! | [`RevisionLog`] / [`ArticleHistory`] | Deduplicated, arrival-ordered revision history. |
//! | [`ArticleDirectory`] / [`DirectoryView`] | Owned article-list state with one mutation entry point. |
//! | [`save`] | One conditional write and its acknowledgement. |
//!
//! # Invariants
//!
//! - Injective Topic Encoding: distinct article names MUST encode to distinct
//!   topic segments.
//!   - Enforced in: `topic::encode_segment`
//!   - Tested by: `topic::tests::encoding_is_injective`
//!   - Failure symptom: two articles share one subscription and display each
//!     other's updates.
//!
//! - At-Most-One Binding: after any bind/unbind/rebind sequence a view holds
//!   zero or one active subscription.
//!   - Enforced in: `ViewSubscription::bind` (implicit teardown), `ViewSubscription::unbind`
//!   - Tested by: `tests::lifecycle::bind_replaces_previous_binding`
//!   - Failure symptom: leaked server-side subscriptions and duplicate
//!     message delivery.
//!
//! - Stale-Message Immunity: a message in flight for a torn-down topic MUST
//!   never mutate view state.
//!   - Enforced in: `ViewSubscription::unbind` (stream dropped),
//!     `DocumentSync::accept` (article mismatch discard)
//!   - Tested by: `tests::lifecycle::messages_after_unbind_never_reach_the_view`,
//!     `tests::lifecycle::cross_delivered_update_is_discarded`
//!   - Failure symptom: a view briefly shows another document's content
//!     after navigation.
//!
//! - Conflict Monotonicity: once an edit session turns stale it never turns
//!   fresh again.
//!   - Enforced in: `EditSession::accept`
//!   - Tested by: `edit::tests::differing_version_marks_stale_forever`
//!   - Failure symptom: a save silently overwrites a concurrent edit.
//!
//! - Local Save Gate: no write request leaves the client while the session
//!   is loading, stale, or missing a change description.
//!   - Enforced in: `EditSession::prepare_save`
//!   - Tested by: `tests::scenario::concurrent_edit_blocks_save_locally`
//!   - Failure symptom: the server receives writes it must reject, or
//!     unattributed history entries.
//!
//! - History Dedup and Order: one revision per version, displayed in first
//!   arrival order, never re-sorted.
//!   - Enforced in: `RevisionLog::accept`
//!   - Tested by: `history::tests::duplicate_versions_collapse_to_one`,
//!     `history::tests::display_order_is_arrival_order`
//!   - Failure symptom: replayed subscriptions duplicate rows or shuffle the
//!     displayed history.
//!
//! - Missing-Document Routing: a first snapshot with version `"0"` MUST
//!   surface as a creation signal, not an empty document.
//!   - Enforced in: `DocumentSync::accept`
//!   - Tested by: `tests::scenario::missing_document_routes_to_creation`
//!   - Failure symptom: readers see a blank page instead of the creation
//!     flow.
//!
//! # Lifecycle
//!
//! - View activation: `open` binds a freshly suffixed topic and starts in
//!   the loading phase.
//! - Target change: `retarget` rebinds (implicit teardown first) and resets
//!   the state machine.
//! - View deactivation: `close` or drop releases the binding; dropping can
//!   never leak a registration.
//!
//! # Concurrency & ordering
//!
//! Single logical thread, event driven. Each view drains its own stream;
//! ordering within a topic is FIFO by arrival. Suspension points exist only
//! at the channel seam (awaiting a message or a write acknowledgement).
//! Cancellation is `unbind`: the stream is dropped and late cross-deliveries
//! are discarded by article mismatch.
//!
//! # Failure modes & recovery
//!
//! - Transport failure: `save` returns a transport error and mutates
//!   nothing; the working copy survives for a manual retry.
//! - Semantic rejection: surfaced verbatim as [`SaveOutcome::Rejected`];
//!   never retried automatically.
//! - Protocol mismatch: unrelated or malformed messages are discarded
//!   silently, at most trace-logged; this is routine, not an error.
//! - Unacknowledged write: no timeout exists; the save stays pending.

pub mod binding;
pub mod channel;
pub mod directory;
pub mod edit;
pub mod history;
pub mod identity;
pub mod save;
pub mod sync;
pub mod topic;

#[cfg(test)]
mod tests;

pub use binding::{Binding, ViewSubscription};
pub use channel::{Channel, ChannelError, WriteSink, local::LocalHub};
pub use directory::{ArticleDirectory, DirectoryView};
pub use edit::{ArticleEditor, EditEvent, EditSession, SaveBlocked};
pub use history::{ArticleHistory, HistoryEvent, RevisionLog};
pub use identity::{IdentityPolicy, Tier};
pub use save::{SaveError, SaveOutcome, save};
pub use sync::{ArticleViewer, DocumentSync, Phase, SyncEvent};
pub use topic::{Topic, TopicFactory, encode_segment};
