//! Tag matching.

/// Application-chosen message tag.
pub type Tag = u64;

/// Bitmask applied to both expected and actual tags before comparison.
pub type TagMask = u64;

/// Mask that requires every tag bit to match.
pub const TAG_MASK_FULL: TagMask = u64::MAX;

/// Mask that accepts any tag.
pub const TAG_MASK_ANY: TagMask = 0;

/// Metadata reported for a completed tagged receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagRecvInfo {
	/// Tag the sender attached to the matched message.
	pub sender_tag: Tag,
	/// Length in bytes of the matched message as sent.
	pub length: usize,
}

/// Returns `true` when `actual` matches `expected` under `mask`.
#[inline]
pub const fn tag_matches(expected: Tag, mask: TagMask, actual: Tag) -> bool {
	(expected ^ actual) & mask == 0
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn exact_and_wildcard_masks() {
		assert!(tag_matches(0x1, TAG_MASK_FULL, 0x1));
		assert!(!tag_matches(0x1, TAG_MASK_FULL, 0x2));
		assert!(tag_matches(0x0, TAG_MASK_ANY, 0xdead_beef));
	}

	#[test]
	fn partial_mask_ignores_masked_out_bits() {
		// High 32 bits carry the source, low 32 bits the user tag.
		let mask = 0x0000_0000_ffff_ffff;
		assert!(tag_matches(0x0000_0007_0000_0042, mask, 0x0000_0003_0000_0042));
		assert!(!tag_matches(0x0000_0007_0000_0042, mask, 0x0000_0007_0000_0043));
	}

	proptest! {
		/// A tag always matches itself, whatever the mask.
		#[test]
		fn prop_reflexive(tag in any::<u64>(), mask in any::<u64>()) {
			prop_assert!(tag_matches(tag, mask, tag));
		}

		/// Matching is symmetric in expected and actual tags.
		#[test]
		fn prop_symmetric(a in any::<u64>(), b in any::<u64>(), mask in any::<u64>()) {
			prop_assert_eq!(tag_matches(a, mask, b), tag_matches(b, mask, a));
		}

		/// Matching agrees with comparing both tags after masking.
		#[test]
		fn prop_masked_equality(a in any::<u64>(), b in any::<u64>(), mask in any::<u64>()) {
			prop_assert_eq!(tag_matches(a, mask, b), a & mask == b & mask);
		}
	}
}
