//! Traits and parameter types at the transport seam.
//!
//! A transport allocates and owns the tracking records of in-flight
//! operations. Callers only ever hold a [`RecordHandle`] and must hand it back
//! through [`TransportWorker::request_free`] exactly once.

use crate::memory::MemoryType;
use crate::status::Status;
use crate::tag::{Tag, TagMask, TagRecvInfo};

/// Opaque, serializable worker address exchanged out of band.
pub type Address = Vec<u8>;

/// Caller-visible area of a transport-owned tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSlot {
	/// Completion status written by the completion callbacks.
	pub status: Status,
	/// Receive metadata written by the receive completion callback.
	pub info: TagRecvInfo,
}

/// Hook run by the transport on every tracking record it allocates, before
/// the record is returned to the submitter.
pub type RequestInit = fn(&mut RequestSlot);

/// Completion callback for sends, run from inside `progress()`.
pub type SendCallback = fn(&mut RequestSlot, Status);

/// Completion callback for tagged receives, run from inside `progress()`.
pub type RecvCallback = fn(&mut RequestSlot, Status, &TagRecvInfo);

/// Parameters for creating a transport execution context.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerParams {
	/// Installed once for the lifetime of the execution context.
	pub request_init: Option<RequestInit>,
}

/// Per-operation parameter block passed to submission primitives.
#[derive(Debug, Clone, Copy)]
pub struct RequestParam {
	/// Residency of the operation's buffer.
	pub memory_type: MemoryType,
	/// Callback for send completions.
	pub send_cb: Option<SendCallback>,
	/// Callback for receive completions.
	pub recv_cb: Option<RecvCallback>,
}

impl RequestParam {
	/// Creates a parameter block for a buffer of the given memory type.
	pub const fn new(memory_type: MemoryType) -> Self {
		Self {
			memory_type,
			send_cb: None,
			recv_cb: None,
		}
	}
}

/// Generation-checked handle to a transport-owned tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
	index: usize,
	generation: u64,
}

impl RecordHandle {
	/// Creates a handle from a pool index and allocation generation.
	pub const fn new(index: usize, generation: u64) -> Self {
		Self { index, generation }
	}

	/// Returns the pool index.
	pub const fn index(self) -> usize {
		self.index
	}

	/// Returns the allocation generation.
	pub const fn generation(self) -> u64 {
		self.generation
	}
}

/// Generation-checked handle to a transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointHandle {
	index: usize,
	generation: u64,
}

impl EndpointHandle {
	/// Creates a handle from a connection index and allocation generation.
	pub const fn new(index: usize, generation: u64) -> Self {
		Self { index, generation }
	}

	/// Returns the connection index.
	pub const fn index(self) -> usize {
		self.index
	}

	/// Returns the allocation generation.
	pub const fn generation(self) -> u64 {
		self.generation
	}
}

/// Raw completion token returned by a submission primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPtr {
	/// The call finished inline with this status; no record was allocated.
	Status(Status),
	/// The call is in flight and tracked by this record.
	Request(RecordHandle),
}

impl StatusPtr {
	/// Returns the status encoded by the token.
	pub const fn status(self) -> Status {
		match self {
			Self::Status(status) => status,
			Self::Request(_) => Status::InProgress,
		}
	}
}

/// Transport context able to create execution contexts.
pub trait Transport: Send + Sync {
	/// Creates one execution context.
	fn create_worker(&self, params: WorkerParams) -> Result<Box<dyn TransportWorker>, Status>;
}

/// One transport execution context.
///
/// Dropping the box destroys the context. Submission and progress on one
/// context are expected to come from one thread at a time.
pub trait TransportWorker: Send + Sync {
	/// Returns the address peers connect to.
	fn address(&self) -> Address;

	/// Creates a connection to the worker at `address`.
	fn ep_create(&self, address: &[u8]) -> Result<EndpointHandle, Status>;

	/// Releases a connection.
	fn ep_close(&self, ep: EndpointHandle);

	/// Runs one non-blocking progress step and returns the number of events
	/// it handled.
	fn progress(&self) -> u32;

	/// Posts a tagged send on `ep`.
	///
	/// # Safety
	///
	/// `buffer` must be valid for reads of `length` bytes of the declared
	/// memory type until the returned record completes or is freed.
	unsafe fn tag_send(&self, ep: EndpointHandle, buffer: *const u8, length: usize, tag: Tag, param: &RequestParam) -> StatusPtr;

	/// Posts a tagged receive matching `tag` under `mask`.
	///
	/// # Safety
	///
	/// `buffer` must be valid for writes of `length` bytes of the declared
	/// memory type and must not be accessed by anyone else until the
	/// returned record completes or is freed.
	unsafe fn tag_recv(&self, buffer: *mut u8, length: usize, tag: Tag, mask: TagMask, param: &RequestParam) -> StatusPtr;

	/// Reads the caller-visible area of a live record.
	fn request_slot(&self, request: RecordHandle) -> Option<RequestSlot>;

	/// Applies `update` to the caller-visible area of a live record.
	fn update_request_slot(&self, request: RecordHandle, update: fn(&mut RequestSlot)) -> bool;

	/// Returns a record to the transport's pool.
	///
	/// Freeing a record that is still in flight is permitted; the transport
	/// detaches it from its buffer and reclaims it on completion.
	fn request_free(&self, request: RecordHandle);
}
