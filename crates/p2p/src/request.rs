use std::sync::Arc;

use tagmesh_fabric::{RecordHandle, RequestSlot, Status, TagRecvInfo};

use crate::error::{Error, Result};
use crate::worker::Worker;

/// Puts a tracking record into the "pending" state.
///
/// Installed as the transport's init hook when a [`Worker`] is created, and
/// applied again before a record goes back to the pool.
pub(crate) fn reset_slot(slot: &mut RequestSlot) {
	slot.status = Status::InProgress;
	slot.info = TagRecvInfo::default();
}

pub(crate) fn on_send_complete(slot: &mut RequestSlot, status: Status) {
	slot.status = status;
}

pub(crate) fn on_recv_complete(slot: &mut RequestSlot, status: Status, info: &TagRecvInfo) {
	slot.status = status;
	slot.info = *info;
}

/// Handle over one submitted operation.
///
/// Operations that finished at submission carry no tracking record and read
/// as [`Status::Ok`] immediately. Otherwise the request owns the transport's
/// record and hands it back exactly once when dropped. Requests are created
/// only by [`Worker`] and [`crate::Endpoint`] and cannot be cloned.
#[must_use = "dropping a request releases its tracking record"]
pub struct Request {
	record: Option<RecordHandle>,
	worker: Arc<Worker>,
}

impl std::fmt::Debug for Request {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Request").field("record", &self.record).field("status", &self.status()).finish()
	}
}

impl Request {
	pub(crate) fn new(worker: Arc<Worker>, record: Option<RecordHandle>) -> Self {
		Self { record, worker }
	}

	/// Returns the current completion status.
	///
	/// Never advances completion; call [`Worker::progress`] between checks.
	pub fn status(&self) -> Status {
		let Some(record) = self.record else {
			return Status::Ok;
		};
		self.worker
			.transport()
			.request_slot(record)
			.map_or(Status::NoElem, |slot| slot.status)
	}

	/// Returns `true` once the status is no longer [`Status::InProgress`].
	pub fn is_completed(&self) -> bool {
		!self.status().is_pending()
	}

	/// Returns `true` when a transport tracking record is attached.
	pub fn is_tracked(&self) -> bool {
		self.record.is_some()
	}

	/// Returns the metadata of the matched message.
	///
	/// Fails with [`Error::Internal`] for requests that completed at
	/// submission, since the transport produced no metadata for them.
	pub fn info(&self) -> Result<TagRecvInfo> {
		let record = self
			.record
			.ok_or(Error::Internal("receive metadata requested from a request completed at submission"))?;
		self.worker
			.transport()
			.request_slot(record)
			.map(|slot| slot.info)
			.ok_or(Error::Internal("tracking record is no longer live"))
	}

	/// Returns the worker this request keeps alive.
	pub fn worker(&self) -> &Arc<Worker> {
		&self.worker
	}
}

impl Drop for Request {
	fn drop(&mut self) {
		let Some(record) = self.record.take() else {
			return;
		};
		let transport = self.worker.transport();
		transport.update_request_slot(record, reset_slot);
		transport.request_free(record);
		tracing::trace!(index = record.index(), "p2p.request.release");
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn reset_marks_slot_pending() {
		let mut slot = RequestSlot {
			status: Status::Ok,
			info: TagRecvInfo {
				sender_tag: 3,
				length: 9,
			},
		};
		reset_slot(&mut slot);
		assert_eq!(slot, RequestSlot {
			status: Status::InProgress,
			info: TagRecvInfo::default(),
		});
	}

	#[test]
	fn recv_callback_records_status_and_info() {
		let mut slot = RequestSlot {
			status: Status::InProgress,
			info: TagRecvInfo::default(),
		};
		let info = TagRecvInfo {
			sender_tag: 0x1,
			length: 64,
		};
		on_recv_complete(&mut slot, Status::MessageTruncated, &info);
		assert_eq!(slot.status, Status::MessageTruncated);
		assert_eq!(slot.info, info);

		on_send_complete(&mut slot, Status::Ok);
		assert_eq!(slot.status, Status::Ok);
	}
}
