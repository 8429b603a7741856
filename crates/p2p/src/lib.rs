#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Poll-driven point-to-point messaging over a tag-matched transport.
//!
//! * [`Worker`]: owns one transport execution context, originates connections
//!   and wildcard receives, and drives completion through [`Worker::progress`]
//! * [`Endpoint`]: one outbound connection, created only by [`Worker::connect`]
//! * [`Request`]: handle over one submitted operation that releases the
//!   transport's tracking record exactly once
//!
//! Nothing completes on its own. Callers poll [`Worker::progress`] until the
//! requests they care about stop reporting [`Status::InProgress`].

#![warn(missing_docs)]

mod device;
mod endpoint;
mod error;
mod request;
mod worker;

pub use device::DeviceType;
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use request::Request;
pub use tagmesh_fabric::{Address, MemoryType, Status, TAG_MASK_ANY, TAG_MASK_FULL, Tag, TagMask, TagRecvInfo};
pub use worker::Worker;
