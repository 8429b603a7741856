use tagmesh_fabric::Status;
use thiserror::Error;

/// Errors surfaced by worker, endpoint and request operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// A transport call returned neither "done" nor "in progress".
	#[error("{op} failed: {status} (status {})", .status.code())]
	Transport {
		/// The operation that was submitted.
		op: &'static str,
		/// Status returned by the transport.
		status: Status,
	},

	/// The transport could not build a link to the given address.
	#[error("connection establishment failed: {status} (status {})", .status.code())]
	Connect {
		/// Status returned by the transport.
		status: Status,
	},

	/// A precondition of this API was violated by the caller.
	#[error("internal assertion failed: {0}")]
	Internal(&'static str),
}

impl Error {
	/// Returns the transport status carried by this error, if any.
	pub fn status(&self) -> Option<Status> {
		match self {
			Self::Transport { status, .. } | Self::Connect { status } => Some(*status),
			Self::Internal(_) => None,
		}
	}

	/// Returns the numeric transport status carried by this error, if any.
	pub fn code(&self) -> Option<i32> {
		self.status().map(Status::code)
	}

	/// Returns `true` for caller-side precondition violations.
	pub fn is_internal(&self) -> bool {
		matches!(self, Self::Internal(_))
	}
}

/// Result type for messaging operations.
pub type Result<T> = std::result::Result<T, Error>;
