//! Canonical serialization for deterministic hashing.
//!
//! Used for reference-table fingerprints, policy parameter hashes and report
//! fingerprints.
//!
//! ## Determinism Guarantees
//!
//! - Struct fields serialize in declaration order
//! - Maps in hashed data are `BTreeMap`, never `HashMap`
//! - Floats are quantized to integers before they reach a hash

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Quantization factor for float normalization (1e6, micro-degrees).
pub const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Quantize a float to an i64 for deterministic hashing.
pub fn quantize(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
