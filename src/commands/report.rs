use crate::cli::ReportArgs;
use crate::commands::{load_repo, print_record};
use crate::exec::{build_command, ExecutionStore};
use crate::utils::Result;

/// Re-renders a stored record without touching the executor.
pub fn report(args: ReportArgs) -> Result<()> {
    let repo = load_repo(&args.treds)?;
    let store = ExecutionStore::load(&args.store)?;

    let key = match &args.key {
        Some(key) => key.clone(),
        // Clap guarantees bam is present when key is absent.
        None => build_command(
            args.bam.as_deref().unwrap_or_default(),
            &args.tred,
            &args.genome_build,
        ),
    };

    let record = store
        .find(&key)
        .ok_or_else(|| format!("No stored record for: {}", key))?;
    print_record(&record, &args.tred, &repo, args.raw)
}
