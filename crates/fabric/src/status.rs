//! Transport status codes.

use std::fmt;

/// Status reported by the transport for calls and completed operations.
///
/// Discriminants are the transport's numeric codes: `0` is success, `1` marks
/// an operation still in flight, negative values are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
	/// Operation completed successfully.
	Ok = 0,
	/// Operation is in progress.
	InProgress = 1,
	/// No pending message.
	NoMessage = -1,
	/// Resources are temporarily exhausted.
	NoResource = -2,
	/// Generic input/output failure.
	IoError = -3,
	/// Memory allocation failed.
	NoMemory = -4,
	/// A parameter was invalid.
	InvalidParam = -5,
	/// The destination cannot be reached.
	Unreachable = -6,
	/// The address could not be parsed.
	InvalidAddr = -7,
	/// Functionality is not implemented.
	NotImplemented = -8,
	/// The receive buffer was shorter than the message.
	MessageTruncated = -9,
	/// No progress was made.
	NoProgress = -10,
	/// A user buffer was too small.
	BufferTooSmall = -11,
	/// No such element.
	NoElem = -12,
	/// The device is busy.
	Busy = -15,
	/// The operation was canceled.
	Canceled = -16,
	/// The element already exists.
	AlreadyExists = -18,
	/// A value fell outside the allowed range.
	OutOfRange = -19,
	/// The operation timed out.
	TimedOut = -20,
	/// The operation is not supported for these arguments.
	Unsupported = -22,
	/// The operation was rejected by the peer.
	Rejected = -23,
	/// The endpoint is not connected.
	NotConnected = -24,
	/// The connection was reset by the peer.
	ConnectionReset = -25,
}

impl Status {
	const ALL: [Self; 23] = [
		Self::Ok,
		Self::InProgress,
		Self::NoMessage,
		Self::NoResource,
		Self::IoError,
		Self::NoMemory,
		Self::InvalidParam,
		Self::Unreachable,
		Self::InvalidAddr,
		Self::NotImplemented,
		Self::MessageTruncated,
		Self::NoProgress,
		Self::BufferTooSmall,
		Self::NoElem,
		Self::Busy,
		Self::Canceled,
		Self::AlreadyExists,
		Self::OutOfRange,
		Self::TimedOut,
		Self::Unsupported,
		Self::Rejected,
		Self::NotConnected,
		Self::ConnectionReset,
	];

	/// Returns the numeric transport code.
	pub const fn code(self) -> i32 {
		self as i32
	}

	/// Looks up a status by numeric transport code.
	pub fn from_code(code: i32) -> Option<Self> {
		Self::ALL.into_iter().find(|status| status.code() == code)
	}

	/// Returns the human-readable description of this status.
	pub const fn description(self) -> &'static str {
		match self {
			Self::Ok => "Success",
			Self::InProgress => "Operation in progress",
			Self::NoMessage => "No pending message",
			Self::NoResource => "No resources are available to initiate the operation",
			Self::IoError => "Input/output error",
			Self::NoMemory => "Out of memory",
			Self::InvalidParam => "Invalid parameter",
			Self::Unreachable => "Destination is unreachable",
			Self::InvalidAddr => "Address not valid",
			Self::NotImplemented => "Function not implemented",
			Self::MessageTruncated => "Message truncated",
			Self::NoProgress => "No progress",
			Self::BufferTooSmall => "Provided buffer is too small",
			Self::NoElem => "No such element",
			Self::Busy => "Device is busy",
			Self::Canceled => "Request canceled",
			Self::AlreadyExists => "Element already exists",
			Self::OutOfRange => "Index out of range",
			Self::TimedOut => "Operation timed out",
			Self::Unsupported => "Unsupported operation",
			Self::Rejected => "Operation rejected by remote peer",
			Self::NotConnected => "Endpoint is not connected",
			Self::ConnectionReset => "Connection reset by remote peer",
		}
	}

	/// Returns `true` for [`Status::Ok`].
	pub const fn is_ok(self) -> bool {
		matches!(self, Self::Ok)
	}

	/// Returns `true` for [`Status::InProgress`].
	pub const fn is_pending(self) -> bool {
		matches!(self, Self::InProgress)
	}

	/// Returns `true` for every failure code.
	pub const fn is_error(self) -> bool {
		self.code() < 0
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.description())
	}
}

impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(Status::Ok, 0)]
	#[case(Status::InProgress, 1)]
	#[case(Status::NoResource, -2)]
	#[case(Status::InvalidAddr, -7)]
	#[case(Status::MessageTruncated, -9)]
	#[case(Status::Unsupported, -22)]
	#[case(Status::ConnectionReset, -25)]
	fn code_matches_transport_numbering(#[case] status: Status, #[case] code: i32) {
		assert_eq!(status.code(), code);
		assert_eq!(Status::from_code(code), Some(status));
	}

	#[test]
	fn unknown_code_has_no_status() {
		assert_eq!(Status::from_code(-14), None);
		assert_eq!(Status::from_code(2), None);
	}

	#[test]
	fn codes_are_unique() {
		for (i, a) in Status::ALL.iter().enumerate() {
			for b in &Status::ALL[i + 1..] {
				assert_ne!(a.code(), b.code(), "{a:?} and {b:?} share a code");
			}
		}
	}

	#[test]
	fn classification() {
		assert!(Status::Ok.is_ok());
		assert!(!Status::Ok.is_error());
		assert!(Status::InProgress.is_pending());
		assert!(!Status::InProgress.is_error());
		assert!(Status::Canceled.is_error());
		assert_eq!(Status::InvalidAddr.description(), "Address not valid");
	}

	#[test]
	fn display_is_the_static_description() {
		for status in Status::ALL {
			assert_eq!(status.to_string(), status.description());
			assert!(!status.description().is_empty());
		}
	}
}
