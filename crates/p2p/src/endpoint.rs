use std::sync::Arc;

use tagmesh_fabric::{EndpointHandle, TAG_MASK_FULL, Tag};

use crate::device::DeviceType;
use crate::error::{Error, Result};
use crate::request::Request;
use crate::worker::Worker;

/// One outbound connection to a remote worker.
///
/// Built only by [`Worker::connect`]. Dropping the endpoint closes the
/// connection; requests already submitted on it stay valid and keep their
/// worker alive.
pub struct Endpoint {
	handle: EndpointHandle,
	worker: Arc<Worker>,
}

impl std::fmt::Debug for Endpoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Endpoint").field("handle", &self.handle).finish_non_exhaustive()
	}
}

impl Endpoint {
	pub(crate) fn connect(worker: Arc<Worker>, address: &[u8]) -> Result<Self> {
		let handle = worker.transport().ep_create(address).map_err(|status| {
			tracing::debug!(code = status.code(), %status, address_len = address.len(), "p2p.connect failed");
			Error::Connect { status }
		})?;
		tracing::debug!(index = handle.index(), "p2p.connect");
		Ok(Self { handle, worker })
	}

	/// Sends `size` bytes tagged with `tag`.
	///
	/// # Safety
	///
	/// `buffer` must be valid for reads of `size` bytes on `device` until the
	/// returned request completes or is dropped.
	pub unsafe fn send_with_tag(&self, buffer: *const u8, size: usize, tag: Tag, device: DeviceType) -> Result<Request> {
		let handle = self.handle;
		self.worker.submit("tag send", device, |transport, param| {
			// SAFETY: forwarded from this function's contract.
			unsafe { transport.tag_send(handle, buffer, size, tag, param) }
		})
	}

	/// Posts a receive matching exactly `tag`.
	///
	/// Tag matching is connection-agnostic, so senders are told apart by the
	/// bits they encode into `tag`.
	///
	/// # Safety
	///
	/// Same contract as [`Worker::recv_with_tag_and_mask`].
	pub unsafe fn recv_with_tag(&self, buffer: *mut u8, size: usize, tag: Tag, device: DeviceType) -> Result<Request> {
		// SAFETY: forwarded from this function's contract.
		unsafe { self.worker.recv_with_tag_and_mask(buffer, size, tag, TAG_MASK_FULL, device) }
	}

	/// Returns the worker this endpoint belongs to.
	pub fn worker(&self) -> &Arc<Worker> {
		&self.worker
	}
}

impl Drop for Endpoint {
	fn drop(&mut self) {
		self.worker.transport().ep_close(self.handle);
		tracing::debug!(index = self.handle.index(), "p2p.endpoint.close");
	}
}
