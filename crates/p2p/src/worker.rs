use std::sync::Arc;

use tagmesh_fabric::{Address, RequestParam, StatusPtr, Tag, TagMask, Transport, TransportWorker, WorkerParams};

use crate::device::DeviceType;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::request::{self, Request};

/// Owner of one transport execution context.
///
/// Always handled through `Arc`: every [`Endpoint`] and [`Request`] it
/// originates holds a reference, so the context is destroyed only after the
/// last of them is gone. Submission and progress on one worker must come from
/// one thread at a time.
pub struct Worker {
	transport: Box<dyn TransportWorker>,
}

impl std::fmt::Debug for Worker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Worker").finish_non_exhaustive()
	}
}

impl Worker {
	/// Creates a worker on `context`, installing the tracking-record init hook.
	pub fn new(context: &dyn Transport) -> Result<Arc<Self>> {
		let params = WorkerParams {
			request_init: Some(request::reset_slot),
		};
		let transport = context.create_worker(params).map_err(|status| {
			tracing::debug!(code = status.code(), %status, "p2p.worker.create failed");
			Error::Transport {
				op: "worker creation",
				status,
			}
		})?;
		tracing::debug!("p2p.worker.create");
		Ok(Arc::new(Self { transport }))
	}

	pub(crate) fn transport(&self) -> &dyn TransportWorker {
		&*self.transport
	}

	/// Returns the address a remote worker passes to [`Worker::connect`].
	pub fn address(&self) -> Address {
		self.transport.address()
	}

	/// Connects to the worker at `address`.
	pub fn connect(self: &Arc<Self>, address: &[u8]) -> Result<Endpoint> {
		Endpoint::connect(Arc::clone(self), address)
	}

	/// Runs one non-blocking progress step, returning the number of events
	/// the transport handled.
	pub fn progress(&self) -> u32 {
		self.transport.progress()
	}

	/// Calls [`Worker::progress`] until `done` returns `true` or `max_steps`
	/// steps have run. Returns the final value of `done`.
	pub fn progress_until(&self, mut done: impl FnMut() -> bool, max_steps: usize) -> bool {
		for _ in 0..max_steps {
			if done() {
				return true;
			}
			self.progress();
		}
		done()
	}

	/// Submits one operation through `work`, which issues the transport call
	/// with the parameter block prepared for `device` and returns its raw
	/// completion token.
	pub fn submit_p2p_request<F>(self: &Arc<Self>, device: DeviceType, work: F) -> Result<Request>
	where
		F: FnOnce(&dyn TransportWorker, &RequestParam) -> StatusPtr,
	{
		self.submit("p2p request", device, work)
	}

	pub(crate) fn submit<F>(self: &Arc<Self>, op: &'static str, device: DeviceType, work: F) -> Result<Request>
	where
		F: FnOnce(&dyn TransportWorker, &RequestParam) -> StatusPtr,
	{
		let param = RequestParam {
			send_cb: Some(request::on_send_complete),
			recv_cb: Some(request::on_recv_complete),
			..RequestParam::new(device.memory_type())
		};
		match work(self.transport(), &param) {
			StatusPtr::Request(record) => {
				tracing::trace!(op, index = record.index(), "p2p.submit in progress");
				Ok(Request::new(Arc::clone(self), Some(record)))
			}
			StatusPtr::Status(status) if status.is_ok() => {
				tracing::trace!(op, "p2p.submit completed inline");
				Ok(Request::new(Arc::clone(self), None))
			}
			StatusPtr::Status(status) => {
				tracing::debug!(op, code = status.code(), %status, "p2p.submit failed");
				Err(Error::Transport { op, status })
			}
		}
	}

	/// Posts a receive for any message whose tag equals `tag` under `mask`.
	///
	/// A zero mask accepts every tag.
	///
	/// # Safety
	///
	/// `buffer` must be valid for writes of `size` bytes on `device` and must
	/// not be accessed elsewhere until the returned request completes or is
	/// dropped.
	pub unsafe fn recv_with_tag_and_mask(
		self: &Arc<Self>,
		buffer: *mut u8,
		size: usize,
		tag: Tag,
		mask: TagMask,
		device: DeviceType,
	) -> Result<Request> {
		self.submit("tag recv", device, |transport, param| {
			// SAFETY: forwarded from this function's contract.
			unsafe { transport.tag_recv(buffer, size, tag, mask, param) }
		})
	}
}

impl Drop for Worker {
	fn drop(&mut self) {
		tracing::debug!("p2p.worker.destroy");
	}
}
