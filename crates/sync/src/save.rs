//! Conditional writes and acknowledgement handling.

use quill_proto::WriteAck;

use crate::channel::{ChannelError, WriteSink};
use crate::edit::{EditSession, SaveBlocked};

/// Result of a save the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
	/// Write accepted; the caller should navigate to the saved view.
	Accepted,
	/// Write refused by the server. The reason is shown verbatim and the
	/// operation is not retried automatically.
	Rejected(String),
}

/// Save failures that never reach, or never hear back from, the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
	/// Refused locally before any request was sent.
	#[error(transparent)]
	Blocked(#[from] SaveBlocked),
	/// The write request could not be delivered or acknowledged.
	#[error("write transport failed: {0}")]
	Transport(#[from] ChannelError),
}

/// Submit one conditional write for `session`'s working state.
///
/// The session is read, never mutated: on any failure the working content
/// and base version are left untouched, so unsaved text is never lost here.
/// There is no timeout; a write that is never acknowledged leaves the save
/// pending.
pub async fn save(sink: &dyn WriteSink, session: &EditSession) -> Result<SaveOutcome, SaveError> {
	let request = session.prepare_save()?;
	let article = request.article.clone();
	let reply = sink.write(request);

	let ack: WriteAck = match reply.await {
		Ok(Ok(ack)) => ack,
		Ok(Err(err)) => {
			tracing::warn!(article = %article, error = %err, "write failed in transport");
			return Err(SaveError::Transport(err));
		}
		Err(_) => {
			tracing::warn!(article = %article, "write acknowledgement never arrived");
			return Err(SaveError::Transport(ChannelError::Closed));
		}
	};

	if ack.ok {
		Ok(SaveOutcome::Accepted)
	} else {
		let reason = ack
			.res
			.unwrap_or_else(|| "write rejected".to_string());
		Ok(SaveOutcome::Rejected(reason))
	}
}
