//! Buffer memory types.

/// Residency of a buffer handed to the transport.
///
/// The transport picks its registration and zero-copy strategy from this
/// value, so it must describe the buffer truthfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryType {
	/// Pageable or pinned host memory.
	Host,
	/// CUDA device memory.
	Cuda,
	/// CUDA managed (unified) memory.
	CudaManaged,
	/// ROCm device memory.
	Rocm,
	/// ROCm managed memory.
	RocmManaged,
	/// Level Zero host memory.
	ZeHost,
	/// Level Zero device memory.
	ZeDevice,
	/// Residency unknown; the transport detects it.
	Unknown,
}

impl MemoryType {
	/// Returns `true` when the host CPU can address the buffer directly.
	pub const fn is_host_accessible(self) -> bool {
		matches!(self, Self::Host | Self::ZeHost)
	}

	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Host => "host",
			Self::Cuda => "cuda",
			Self::CudaManaged => "cuda_managed",
			Self::Rocm => "rocm",
			Self::RocmManaged => "rocm_managed",
			Self::ZeHost => "ze_host",
			Self::ZeDevice => "ze_device",
			Self::Unknown => "unknown",
		}
	}
}
