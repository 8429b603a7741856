//! In-process loopback fabric.
//!
//! Workers created from one [`LoopbackFabric`] can connect to each other and
//! exchange tagged messages. Nothing moves on its own: sends are copied into
//! the destination's inbox at submission, and every completion is delivered
//! from inside a worker's `progress()`.

mod address;
mod config;
mod worker;


use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

pub use self::config::{ConfigError, LoopbackConfig};
use self::worker::{LoopbackWorker, WorkerShared};
use crate::status::Status;
use crate::transport::{Transport, TransportWorker, WorkerParams};

static NEXT_FABRIC_ID: AtomicU64 = AtomicU64::new(1);

/// Snapshot of live loopback resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FabricStats {
	/// Live workers.
	pub workers: usize,
	/// Open connections across all workers.
	pub endpoints: usize,
	/// Tracking records not yet returned to a pool.
	pub live_records: usize,
}

pub(crate) struct FabricInner {
	id: u64,
	config: LoopbackConfig,
	next_worker: AtomicU64,
	directory: RwLock<HashMap<u64, Weak<WorkerShared>>>,
}

impl FabricInner {
	pub(crate) fn lookup(&self, worker_id: u64) -> Option<Arc<WorkerShared>> {
		self.directory.read().get(&worker_id).and_then(Weak::upgrade)
	}

	pub(crate) fn deregister(&self, worker_id: u64) {
		self.directory.write().remove(&worker_id);
	}
}

/// Handle to one in-process fabric.
#[derive(Clone)]
pub struct LoopbackFabric {
	inner: Arc<FabricInner>,
}

impl std::fmt::Debug for LoopbackFabric {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoopbackFabric")
			.field("id", &self.inner.id)
			.field("config", &self.inner.config)
			.finish_non_exhaustive()
	}
}

impl Default for LoopbackFabric {
	fn default() -> Self {
		Self::new(LoopbackConfig::default())
	}
}

impl LoopbackFabric {
	/// Creates a fabric with its own worker directory.
	pub fn new(config: LoopbackConfig) -> Self {
		let id = NEXT_FABRIC_ID.fetch_add(1, Ordering::Relaxed);
		tracing::debug!(fabric_id = id, eager_threshold = config.eager_threshold, max_records = config.max_records, "loopback.fabric.new");
		Self {
			inner: Arc::new(FabricInner {
				id,
				config,
				next_worker: AtomicU64::new(1),
				directory: RwLock::new(HashMap::new()),
			}),
		}
	}

	/// Returns the process-unique fabric id embedded in worker addresses.
	pub fn id(&self) -> u64 {
		self.inner.id
	}

	/// Returns the fabric configuration.
	pub fn config(&self) -> &LoopbackConfig {
		&self.inner.config
	}

	/// Returns a snapshot of live resources across all workers.
	pub fn stats(&self) -> FabricStats {
		let workers: Vec<_> = self.inner.directory.read().values().filter_map(Weak::upgrade).collect();
		let mut stats = FabricStats {
			workers: workers.len(),
			..FabricStats::default()
		};
		for shared in workers {
			let state = shared.state.lock();
			stats.endpoints += state.endpoint_count();
			stats.live_records += state.live_records();
		}
		stats
	}
}

impl Transport for LoopbackFabric {
	fn create_worker(&self, params: WorkerParams) -> Result<Box<dyn TransportWorker>, Status> {
		let worker_id = self.inner.next_worker.fetch_add(1, Ordering::Relaxed);
		let worker = LoopbackWorker::new(Arc::clone(&self.inner), worker_id, params);
		self.inner.directory.write().insert(worker_id, Arc::downgrade(worker.shared()));
		tracing::debug!(fabric_id = self.inner.id, worker_id, "loopback.worker.create");
		Ok(Box::new(worker))
	}
}
