#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Transport boundary for tag-matched point-to-point messaging.
//!
//! This crate describes the surface a tag-matching fabric exposes to the
//! messaging core and ships one implementation of it:
//! * [`Status`]: the transport's numeric status space
//! * [`Transport`] / [`TransportWorker`]: context and execution-context traits
//! * [`RequestParam`] / [`RequestSlot`]: per-operation parameters and the
//!   caller-visible area of transport-owned tracking records
//! * [`loopback`]: an in-process fabric driven entirely by `progress()`

#![warn(missing_docs)]

pub mod loopback;
pub mod memory;
pub mod status;
pub mod tag;
pub mod transport;

pub use loopback::{ConfigError, FabricStats, LoopbackConfig, LoopbackFabric};
pub use memory::MemoryType;
pub use status::Status;
pub use tag::{TAG_MASK_ANY, TAG_MASK_FULL, Tag, TagMask, TagRecvInfo, tag_matches};
pub use transport::{
	Address, EndpointHandle, RecordHandle, RecvCallback, RequestInit, RequestParam, RequestSlot, SendCallback, StatusPtr, Transport,
	TransportWorker, WorkerParams,
};
