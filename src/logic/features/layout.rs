//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the column contract with the classifier**
//!
//! The classifier consumes features positionally, in the exact column order
//! it was trained with. Reordering is a correctness bug.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    "Fwd IAT Std",   // 0: population std of forward IATs
    "Bwd IAT Std",   // 1: population std of backward IATs
    "Flow IAT Std",  // 2: population std of all IATs
    "Fwd IAT Max",   // 3
    "Flow IAT Mean", // 4
    "Flow IAT Max",  // 5
    "Fwd IAT Mean",  // 6
    "Fwd IAT Total", // 7: sum of forward IATs
    "Flow Duration", // 8: last - first timestamp
    "Bwd IAT Max",   // 9
    "Idle Max",      // 10: max IAT above the idle threshold
    "Idle Mean",     // 11
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 12;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + ordered feature names.
/// Lets operators spot a model exported against a different column order.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Layout information for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 12);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_matches_training_columns() {
        let expected = [
            "Fwd IAT Std", "Bwd IAT Std", "Flow IAT Std",
            "Fwd IAT Max", "Flow IAT Mean", "Flow IAT Max",
            "Fwd IAT Mean", "Fwd IAT Total", "Flow Duration",
            "Bwd IAT Max", "Idle Max", "Idle Mean",
        ];
        assert_eq!(FEATURE_LAYOUT, &expected[..]);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("Fwd IAT Std"), Some(0));
        assert_eq!(feature_index("Flow Duration"), Some(8));
        assert_eq!(feature_index("Idle Mean"), Some(11));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.hash, layout_hash());
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
