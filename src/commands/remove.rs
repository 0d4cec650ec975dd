use crate::cli::RemoveArgs;
use crate::exec::{build_command, ExecutionStore};
use crate::utils::Result;

/// Administrative removal of a record. Idempotent: removing an absent key
/// only logs.
pub fn remove(args: RemoveArgs) -> Result<()> {
    let store = ExecutionStore::load(&args.store)?;
    let key = match &args.key {
        Some(key) => key.clone(),
        // Clap guarantees bam and tred are present when key is absent.
        None => build_command(
            args.bam.as_deref().unwrap_or_default(),
            args.tred.as_deref().unwrap_or_default(),
            &args.genome_build,
        ),
    };

    if store.exists(&key) {
        store.remove(&key);
        log::info!("Removed record for: {}", key);
    } else {
        log::info!("No record to remove for: {}", key);
    }
    store.save(&args.store)
}
