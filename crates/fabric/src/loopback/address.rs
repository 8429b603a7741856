//! Loopback worker address encoding.
//!
//! Layout (little-endian): magic `b"TMLB"`, version byte, fabric id `u64`,
//! worker id `u64`.

use bytes::{Buf, BufMut};

use crate::status::Status;
use crate::transport::Address;

const MAGIC: &[u8; 4] = b"TMLB";
const VERSION: u8 = 1;
pub(crate) const ENCODED_LEN: usize = MAGIC.len() + 1 + 8 + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WorkerAddress {
	pub fabric_id: u64,
	pub worker_id: u64,
}

impl WorkerAddress {
	pub fn encode(self) -> Address {
		let mut out = Vec::with_capacity(ENCODED_LEN);
		out.put_slice(MAGIC);
		out.put_u8(VERSION);
		out.put_u64_le(self.fabric_id);
		out.put_u64_le(self.worker_id);
		out
	}

	pub fn decode(mut bytes: &[u8]) -> Result<Self, Status> {
		if bytes.len() != ENCODED_LEN || &bytes[..MAGIC.len()] != MAGIC {
			return Err(Status::InvalidAddr);
		}
		bytes.advance(MAGIC.len());
		if bytes.get_u8() != VERSION {
			return Err(Status::InvalidAddr);
		}
		Ok(Self {
			fabric_id: bytes.get_u64_le(),
			worker_id: bytes.get_u64_le(),
		})
	}
}
