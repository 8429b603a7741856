use tagmesh_fabric::MemoryType;

/// Kind of device a buffer lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
	/// Host memory.
	Cpu,
	/// NVIDIA accelerator memory.
	Cuda,
	/// AMD accelerator memory.
	Hip,
	/// Intel accelerator memory.
	Xpu,
	/// Shape-only tensors without storage.
	Meta,
}

impl DeviceType {
	/// Returns the transport memory type used to register buffers on this device.
	pub const fn memory_type(self) -> MemoryType {
		match self {
			Self::Cpu => MemoryType::Host,
			Self::Cuda => MemoryType::Cuda,
			Self::Hip => MemoryType::Rocm,
			Self::Xpu => MemoryType::ZeDevice,
			Self::Meta => MemoryType::Unknown,
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(DeviceType::Cpu, MemoryType::Host)]
	#[case(DeviceType::Cuda, MemoryType::Cuda)]
	#[case(DeviceType::Hip, MemoryType::Rocm)]
	#[case(DeviceType::Xpu, MemoryType::ZeDevice)]
	#[case(DeviceType::Meta, MemoryType::Unknown)]
	fn maps_to_registration_memory_type(#[case] device: DeviceType, #[case] expected: MemoryType) {
		assert_eq!(device.memory_type(), expected);
	}
}
