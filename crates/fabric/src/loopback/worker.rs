use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use bytes::Bytes;
use parking_lot::Mutex;
use slab::Slab;

use super::FabricInner;
use super::address::WorkerAddress;
use crate::status::Status;
use crate::tag::{Tag, TagMask, TagRecvInfo, tag_matches};
use crate::transport::{
	Address, EndpointHandle, RecordHandle, RecvCallback, RequestInit, RequestParam, RequestSlot, SendCallback, StatusPtr,
	TransportWorker, WorkerParams,
};

/// Contents of a record slot that no init hook has touched yet.
const UNSET_SLOT: RequestSlot = RequestSlot {
	status: Status::NoElem,
	info: TagRecvInfo {
		sender_tag: u64::MAX,
		length: usize::MAX,
	},
};

pub(crate) struct Message {
	tag: Tag,
	payload: Bytes,
}

#[derive(Clone, Copy)]
struct RecvBuffer {
	ptr: *mut u8,
	len: usize,
}

// SAFETY: the submitter of a receive guarantees exclusive access to the buffer
// until the record completes or is freed, whichever thread progresses it.
unsafe impl Send for RecvBuffer {}

enum RecordOp {
	Send {
		callback: Option<SendCallback>,
		/// Destination inbox owner; gone means the message was never consumed.
		peer: Weak<WorkerShared>,
		released: bool,
	},
	Recv {
		buffer: RecvBuffer,
		tag: Tag,
		mask: TagMask,
		callback: Option<RecvCallback>,
	},
	Completed,
}

struct Record {
	generation: u64,
	slot: RequestSlot,
	op: RecordOp,
}

struct EndpointEntry {
	generation: u64,
	peer_id: u64,
	peer: Weak<WorkerShared>,
}

pub(crate) struct WorkerState {
	records: Slab<Record>,
	/// Slot contents of freed records, handed out again without clearing.
	recycled: Vec<RequestSlot>,
	endpoints: Slab<EndpointEntry>,
	/// Receives awaiting a match, in post order.
	posted: VecDeque<RecordHandle>,
	/// Arrived messages without a matching receive, in arrival order.
	unexpected: VecDeque<Message>,
	send_completions: VecDeque<RecordHandle>,
	next_generation: u64,
}

/// Worker state reachable from peers through the fabric directory.
pub(crate) struct WorkerShared {
	pub(crate) inbox: Mutex<VecDeque<Message>>,
	pub(crate) state: Mutex<WorkerState>,
}

impl WorkerState {
	fn new() -> Self {
		Self {
			records: Slab::new(),
			recycled: Vec::new(),
			endpoints: Slab::new(),
			posted: VecDeque::new(),
			unexpected: VecDeque::new(),
			send_completions: VecDeque::new(),
			next_generation: 1,
		}
	}

	pub(crate) fn live_records(&self) -> usize {
		self.records.len()
	}

	pub(crate) fn endpoint_count(&self) -> usize {
		self.endpoints.len()
	}

	fn bump_generation(&mut self) -> u64 {
		let generation = self.next_generation;
		self.next_generation = self.next_generation.wrapping_add(1);
		generation
	}

	fn alloc(&mut self, limit: usize, init: Option<RequestInit>, op: RecordOp) -> Result<RecordHandle, Status> {
		if self.records.len() >= limit {
			return Err(Status::NoResource);
		}
		let generation = self.bump_generation();
		let mut slot = self.recycled.pop().unwrap_or(UNSET_SLOT);
		if let Some(init) = init {
			init(&mut slot);
		}
		let index = self.records.insert(Record { generation, slot, op });
		Ok(RecordHandle::new(index, generation))
	}

	fn record(&self, handle: RecordHandle) -> Option<&Record> {
		self.records.get(handle.index()).filter(|record| record.generation == handle.generation())
	}

	fn record_mut(&mut self, handle: RecordHandle) -> Option<&mut Record> {
		self.records
			.get_mut(handle.index())
			.filter(|record| record.generation == handle.generation())
	}

	/// Returns a record to the pool, keeping its slot contents for reuse.
	fn reclaim(&mut self, handle: RecordHandle) {
		let record = self.records.remove(handle.index());
		self.recycled.push(record.slot);
	}

	fn endpoint(&self, ep: EndpointHandle) -> Option<&EndpointEntry> {
		self.endpoints.get(ep.index()).filter(|entry| entry.generation == ep.generation())
	}

	fn posted_filter(&self, handle: RecordHandle) -> Option<(Tag, TagMask)> {
		match self.record(handle)?.op {
			RecordOp::Recv { tag, mask, .. } => Some((tag, mask)),
			_ => None,
		}
	}

	fn complete_send(&mut self, handle: RecordHandle) {
		let Some(record) = self.record_mut(handle) else {
			return;
		};
		let (callback, peer_alive) = match &record.op {
			RecordOp::Send { released: true, .. } => {
				self.reclaim(handle);
				return;
			}
			RecordOp::Send { callback, peer, .. } => (*callback, peer.strong_count() > 0),
			_ => return,
		};
		let status = if peer_alive { Status::Ok } else { Status::ConnectionReset };
		if let Some(callback) = callback {
			callback(&mut record.slot, status);
		}
		record.op = RecordOp::Completed;
	}

	/// Removes and returns the earliest posted receive matching `tag`.
	fn take_posted(&mut self, tag: Tag) -> Option<RecordHandle> {
		let pos = self.posted.iter().position(|&handle| {
			self.posted_filter(handle)
				.is_some_and(|(expected, mask)| tag_matches(expected, mask, tag))
		})?;
		self.posted.remove(pos)
	}

	/// Matches posted receives against queued unexpected messages.
	fn match_unexpected(&mut self) -> u32 {
		let mut events = 0;
		let mut i = 0;
		while i < self.posted.len() && !self.unexpected.is_empty() {
			let handle = self.posted[i];
			let Some((expected, mask)) = self.posted_filter(handle) else {
				self.posted.remove(i);
				continue;
			};
			let pos = self.unexpected.iter().position(|message| tag_matches(expected, mask, message.tag));
			let Some(message) = pos.and_then(|pos| self.unexpected.remove(pos)) else {
				i += 1;
				continue;
			};
			self.posted.remove(i);
			self.deliver(handle, message);
			events += 1;
		}
		events
	}

	fn deliver(&mut self, handle: RecordHandle, message: Message) {
		let Some(record) = self.record_mut(handle) else {
			return;
		};
		let RecordOp::Recv { buffer, callback, .. } = record.op else {
			return;
		};
		let sent = message.payload.len();
		let copied = sent.min(buffer.len);
		if copied > 0 {
			// SAFETY: the buffer stays writable and unaliased until this record
			// completes or is freed, and freed receives leave `posted`.
			unsafe { std::ptr::copy_nonoverlapping(message.payload.as_ptr(), buffer.ptr, copied) };
		}
		let status = if sent > buffer.len { Status::MessageTruncated } else { Status::Ok };
		let info = TagRecvInfo {
			sender_tag: message.tag,
			length: sent,
		};
		if let Some(callback) = callback {
			callback(&mut record.slot, status, &info);
		}
		record.op = RecordOp::Completed;
	}
}

pub(crate) struct LoopbackWorker {
	id: u64,
	fabric: Arc<FabricInner>,
	shared: Arc<WorkerShared>,
	request_init: Option<RequestInit>,
}

impl LoopbackWorker {
	pub(crate) fn new(fabric: Arc<FabricInner>, id: u64, params: WorkerParams) -> Self {
		Self {
			id,
			fabric,
			shared: Arc::new(WorkerShared {
				inbox: Mutex::new(VecDeque::new()),
				state: Mutex::new(WorkerState::new()),
			}),
			request_init: params.request_init,
		}
	}

	pub(crate) fn shared(&self) -> &Arc<WorkerShared> {
		&self.shared
	}

	fn alloc(&self, state: &mut WorkerState, op: RecordOp) -> Result<RecordHandle, Status> {
		state.alloc(self.fabric.config.max_records, self.request_init, op)
	}
}

impl Drop for LoopbackWorker {
	fn drop(&mut self) {
		self.fabric.deregister(self.id);
		let state = self.shared.state.lock();
		tracing::debug!(
			worker_id = self.id,
			live_records = state.live_records(),
			endpoints = state.endpoint_count(),
			unexpected = state.unexpected.len(),
			"loopback.worker.destroy"
		);
	}
}

impl TransportWorker for LoopbackWorker {
	fn address(&self) -> Address {
		WorkerAddress {
			fabric_id: self.fabric.id,
			worker_id: self.id,
		}
		.encode()
	}

	fn ep_create(&self, address: &[u8]) -> Result<EndpointHandle, Status> {
		let addr = WorkerAddress::decode(address)?;
		if addr.fabric_id != self.fabric.id {
			return Err(Status::Unreachable);
		}
		let peer = self.fabric.lookup(addr.worker_id).ok_or(Status::Unreachable)?;

		let mut state = self.shared.state.lock();
		let generation = state.bump_generation();
		let index = state.endpoints.insert(EndpointEntry {
			generation,
			peer_id: addr.worker_id,
			peer: Arc::downgrade(&peer),
		});
		tracing::trace!(worker_id = self.id, peer_id = addr.worker_id, index, "loopback.ep.create");
		Ok(EndpointHandle::new(index, generation))
	}

	fn ep_close(&self, ep: EndpointHandle) {
		let mut state = self.shared.state.lock();
		let Some(peer_id) = state.endpoint(ep).map(|entry| entry.peer_id) else {
			tracing::warn!(worker_id = self.id, index = ep.index(), "loopback.ep.close on stale handle");
			return;
		};
		state.endpoints.remove(ep.index());
		tracing::trace!(worker_id = self.id, peer_id, "loopback.ep.close");
	}

	fn progress(&self) -> u32 {
		let mut state = self.shared.state.lock();
		let mut events = 0u32;

		while let Some(handle) = state.send_completions.pop_front() {
			state.complete_send(handle);
			events += 1;
		}

		events += state.match_unexpected();

		let arrivals = std::mem::take(&mut *self.shared.inbox.lock());
		for message in arrivals {
			match state.take_posted(message.tag) {
				Some(handle) => {
					state.deliver(handle, message);
					events += 1;
				}
				None => state.unexpected.push_back(message),
			}
		}

		if events > 0 {
			tracing::trace!(worker_id = self.id, events, "loopback.progress");
		}
		events
	}

	unsafe fn tag_send(&self, ep: EndpointHandle, buffer: *const u8, length: usize, tag: Tag, param: &RequestParam) -> StatusPtr {
		if !param.memory_type.is_host_accessible() {
			tracing::trace!(worker_id = self.id, memory_type = param.memory_type.as_str(), "loopback.send unsupported memory");
			return StatusPtr::Status(Status::Unsupported);
		}

		let mut state = self.shared.state.lock();
		let peer = match state.endpoint(ep).map(|entry| entry.peer.upgrade()) {
			None => return StatusPtr::Status(Status::NotConnected),
			Some(None) => return StatusPtr::Status(Status::ConnectionReset),
			Some(Some(peer)) => peer,
		};

		let payload = if length == 0 {
			Bytes::new()
		} else {
			// SAFETY: the caller guarantees `buffer` is readable for `length` bytes.
			Bytes::copy_from_slice(unsafe { std::slice::from_raw_parts(buffer, length) })
		};

		let token = if length <= self.fabric.config.eager_threshold {
			StatusPtr::Status(Status::Ok)
		} else {
			let op = RecordOp::Send {
				callback: param.send_cb,
				peer: Arc::downgrade(&peer),
				released: false,
			};
			match self.alloc(&mut state, op) {
				Ok(handle) => {
					state.send_completions.push_back(handle);
					StatusPtr::Request(handle)
				}
				Err(status) => return StatusPtr::Status(status),
			}
		};

		peer.inbox.lock().push_back(Message { tag, payload });
		tracing::trace!(worker_id = self.id, tag, length, inline = matches!(token, StatusPtr::Status(_)), "loopback.send");
		token
	}

	unsafe fn tag_recv(&self, buffer: *mut u8, length: usize, tag: Tag, mask: TagMask, param: &RequestParam) -> StatusPtr {
		if !param.memory_type.is_host_accessible() {
			tracing::trace!(worker_id = self.id, memory_type = param.memory_type.as_str(), "loopback.recv unsupported memory");
			return StatusPtr::Status(Status::Unsupported);
		}

		let mut state = self.shared.state.lock();
		let op = RecordOp::Recv {
			buffer: RecvBuffer { ptr: buffer, len: length },
			tag,
			mask,
			callback: param.recv_cb,
		};
		match self.alloc(&mut state, op) {
			Ok(handle) => {
				state.posted.push_back(handle);
				tracing::trace!(worker_id = self.id, tag, mask, length, "loopback.recv posted");
				StatusPtr::Request(handle)
			}
			Err(status) => StatusPtr::Status(status),
		}
	}

	fn request_slot(&self, request: RecordHandle) -> Option<RequestSlot> {
		let state = self.shared.state.lock();
		let record = state.record(request)?;
		match record.op {
			RecordOp::Send { released: true, .. } => None,
			_ => Some(record.slot),
		}
	}

	fn update_request_slot(&self, request: RecordHandle, update: fn(&mut RequestSlot)) -> bool {
		let mut state = self.shared.state.lock();
		match state.record_mut(request) {
			Some(record) if !matches!(record.op, RecordOp::Send { released: true, .. }) => {
				update(&mut record.slot);
				true
			}
			_ => false,
		}
	}

	fn request_free(&self, request: RecordHandle) {
		let mut state = self.shared.state.lock();
		let Some(record) = state.record_mut(request) else {
			tracing::warn!(worker_id = self.id, index = request.index(), "loopback.request_free on stale record");
			return;
		};
		match &mut record.op {
			RecordOp::Send { released: true, .. } => {
				tracing::warn!(worker_id = self.id, index = request.index(), "loopback.request_free on released record");
			}
			RecordOp::Send { released, .. } => {
				*released = true;
				tracing::trace!(worker_id = self.id, index = request.index(), "loopback.request_free deferred until send completes");
			}
			RecordOp::Recv { .. } => {
				state.posted.retain(|&handle| handle != request);
				state.reclaim(request);
				tracing::trace!(worker_id = self.id, index = request.index(), "loopback.request_free withdrew pending recv");
			}
			RecordOp::Completed => {
				state.reclaim(request);
				tracing::trace!(worker_id = self.id, index = request.index(), "loopback.request_free");
			}
		}
	}
}
