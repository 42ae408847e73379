//! Byte-format round-trip for the mapping state.
//!
//! The format is a JSON record carrying, per anonymizable category, the
//! forward map, the reverse map, and the counter. `load(save(state))` equals
//! `state` for every state including the empty one. Where those bytes live —
//! a file, a pipe, a test buffer — is the caller's concern.

use crate::anonymizer::MappingState;
use crate::error::{Error, Result};

/// Serialize the state for persistence.
pub fn save_mappings(state: &MappingState) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(state).map_err(Error::serialize_mappings)
}

/// Hydrate a state from persisted bytes.
///
/// The structural invariants (counter matches entry count, reverse map is
/// the exact inverse, placeholders are well-formed) are re-checked, so a
/// corrupt or hand-edited file is reported instead of producing a quietly
/// wrong store.
pub fn load_mappings(bytes: &[u8]) -> Result<MappingState> {
    let state: MappingState =
        serde_json::from_slice(bytes).map_err(|err| Error::corrupt_mappings(err.to_string()))?;
    state.validate().map_err(Error::corrupt_mappings)?;
    tracing::debug!(entries = state.total_entries(), "loaded mapping state");
    Ok(state)
}
