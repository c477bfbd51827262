//! Invocation runner standing in for the host ledger runtime.
//!
//! The host gives each operation its own [`Transaction`]. When the operation
//! returns `Ok`, the buffered write set is committed as one batch; when it
//! returns `Err`, the write set is dropped and committed state is unchanged.

use tracing::debug;

use crate::batch::WriteBatch;
use crate::error::StoreError;
use crate::traits::WorldState;
use crate::transaction::{CommitReceipt, Transaction};

/// Result of a committed invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationOutcome<T> {
    pub output: T,
    pub receipt: CommitReceipt,
}

/// Run `operation` in a fresh transaction over `state` and commit on success.
pub fn invoke<T, E, F>(state: &dyn WorldState, operation: F) -> Result<InvocationOutcome<T>, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StoreError>,
{
    let tx = Transaction::begin(state);
    let output = match operation(&tx) {
        Ok(output) => output,
        Err(err) => {
            debug!("invocation failed; write set discarded");
            return Err(err);
        }
    };
    let receipt = tx.commit()?;
    Ok(InvocationOutcome { output, receipt })
}

/// Run `operation` without committing, returning its output and write set.
///
/// Independent executions of the same operation against equal states must
/// return equal write sets; compare their digests to check.
pub fn simulate<T, E, F>(state: &dyn WorldState, operation: F) -> Result<(T, WriteBatch), E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StoreError>,
{
    let tx = Transaction::begin(state);
    let output = operation(&tx)?;
    let writes = tx.into_write_set()?;
    Ok((output, writes))
}
