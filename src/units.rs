//! Size conversions
//!
//! Pool sizes and volume quotas travel over the wire in bytes but are
//! configured and reported in TiB.

/// Bytes in one TiB
pub const TIB: u64 = 1024 * 1024 * 1024 * 1024;

/// Bytes in one GiB
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Convert whole TiB to bytes
pub fn bytes_from_tib(tib: u64) -> u64 {
    tib * TIB
}

/// Convert bytes to TiB, rounded to one decimal place
pub fn tib_from_bytes(bytes: u64) -> f64 {
    let tib = bytes as f64 / TIB as f64;
    (tib * 10.0).round() / 10.0
}
