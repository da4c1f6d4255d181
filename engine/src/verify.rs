//! Verification of a file against a stored checksum artifact.

use crate::digest::{compute_digest, ChecksumAlgorithm};
use crate::error::EngineError;
use crate::store;
use std::path::Path;

/// Check `file_path` against the digest stored in `artifact_path`.
///
/// Returns `Ok(true)` only if the freshly computed digest and the stored text
/// are exactly equal. The comparison is case-sensitive and does not trim, so
/// an artifact with stray whitespace never verifies.
pub fn verify(
    file_path: &Path,
    artifact_path: &Path,
    algorithm: ChecksumAlgorithm,
) -> Result<bool, EngineError> {
    let actual = compute_digest(file_path, algorithm)?;
    let stored = store::read(artifact_path)?;
    Ok(stored == actual)
}
