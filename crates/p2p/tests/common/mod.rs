//! Shared helpers for messaging integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tagmesh_fabric::{LoopbackConfig, LoopbackFabric};
use tagmesh_p2p::{DeviceType, Endpoint, Request, Result, Tag, TagMask, Worker};

/// Upper bound on progress steps before a test gives up.
pub const MAX_STEPS: usize = 64;

/// A connected pair: `receiver` listens, `sender` holds an endpoint to it.
pub struct Pair {
	pub fabric: LoopbackFabric,
	pub receiver: Arc<Worker>,
	pub sender: Arc<Worker>,
	pub endpoint: Endpoint,
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn fabric(eager_threshold: usize) -> LoopbackFabric {
	init_tracing();
	LoopbackFabric::new(LoopbackConfig {
		eager_threshold,
		..LoopbackConfig::default()
	})
}

pub fn pair_on(fabric: LoopbackFabric) -> Pair {
	let receiver = Worker::new(&fabric).expect("receiver worker");
	let sender = Worker::new(&fabric).expect("sender worker");
	let endpoint = sender.connect(&receiver.address()).expect("connect");
	Pair {
		fabric,
		receiver,
		sender,
		endpoint,
	}
}

pub fn pair() -> Pair {
	pair_on(fabric(LoopbackConfig::default().eager_threshold))
}

impl Pair {
	/// Progresses both workers until `done` holds.
	pub fn progress_until(&self, mut done: impl FnMut() -> bool) -> bool {
		for _ in 0..MAX_STEPS {
			if done() {
				return true;
			}
			self.sender.progress();
			self.receiver.progress();
		}
		done()
	}
}

pub fn send(endpoint: &Endpoint, data: &[u8], tag: Tag) -> Result<Request> {
	unsafe { endpoint.send_with_tag(data.as_ptr(), data.len(), tag, DeviceType::Cpu) }
}

pub fn recv(worker: &Arc<Worker>, buf: &mut [u8], tag: Tag, mask: TagMask) -> Result<Request> {
	unsafe { worker.recv_with_tag_and_mask(buf.as_mut_ptr(), buf.len(), tag, mask, DeviceType::Cpu) }
}
