use lend_store::WorldState;
use lend_types::{codec, Entity};

use crate::error::{LedgerError, LedgerResult};

/// Read and decode the entity at `key`.
pub(crate) fn load<E: Entity>(state: &dyn WorldState, key: &str) -> LedgerResult<E> {
    let bytes = state
        .get_state(key)?
        .ok_or_else(|| LedgerError::not_found(E::KIND, key))?;
    codec::decode(&bytes).map_err(|e| LedgerError::decode(key, e))
}

/// Encode `entity` and write it under its own key.
pub(crate) fn store<E: Entity>(state: &dyn WorldState, entity: &E) -> LedgerResult<()> {
    let bytes = codec::encode(entity)
        .map_err(|e| LedgerError::encode(format!("{} {}", E::KIND, entity.key()), e))?;
    state.put_state(entity.key(), bytes)?;
    Ok(())
}
