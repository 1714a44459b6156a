//! Random test payloads
//!
//! Both sides move base64 encoded random bytes: the endpoint for downloads,
//! the driver for uploads. Random data keeps compression on the path from
//! flattering the measurement.

use crate::{
    error::{AppError, Result},
    stats::BYTES_PER_KB,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Generate `size_kb` kilobytes of OS-sourced random bytes
pub fn random_bytes(size_kb: u64) -> Result<Vec<u8>> {
    let len = size_kb
        .checked_mul(BYTES_PER_KB)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| AppError::generation(format!("Payload of {} KB is too large", size_kb)))?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| AppError::generation(format!("Cannot allocate {} bytes: {}", len, e)))?;
    buf.resize(len, 0);

    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| AppError::generation(format!("Random source failed: {}", e)))?;

    Ok(buf)
}

/// Generate `size_kb` kilobytes of random bytes, base64 encoded
pub fn random_base64(size_kb: u64) -> Result<String> {
    random_bytes(size_kb).map(|bytes| STANDARD.encode(bytes))
}

/// Length of the base64 text for `size_kb` kilobytes of raw data
pub fn encoded_len(size_kb: u64) -> u64 {
    size_kb.saturating_mul(BYTES_PER_KB).div_ceil(3).saturating_mul(4)
}
