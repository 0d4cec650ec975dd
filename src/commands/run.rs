use crate::cli::RunArgs;
use crate::commands::{load_repo, print_record};
use crate::exec::{build_command, ExecConfig, ExecutionStore, Executor};
use crate::utils::Result;
use std::{sync::Arc, time::Duration};

/// The form-submission flow of the demo: build the command key, fire the
/// executor (a no-op when the key was already run), then watch the store
/// until the record shows up and render it.
pub fn run(args: RunArgs) -> Result<()> {
    let repo = load_repo(&args.treds)?;
    if repo.get(&args.tred).is_none() {
        // Not fatal on purpose: the command builder does not validate the
        // locus, and rendering will surface the problem as an error model.
        log::warn!("Locus {} is not in the reference table", args.tred);
    }

    let store = Arc::new(ExecutionStore::load(&args.store)?);
    let key = build_command(&args.bam, &args.tred, &args.genome_build);
    log::info!("Command key: {}", key);

    let receiver = store.subscribe(&key);
    let executor = Executor::new(
        Arc::clone(&store),
        ExecConfig::new(args.env, !args.no_docker),
    );
    executor.run(&key);

    let record = if args.timeout_secs == 0 {
        receiver
            .recv()
            .map_err(|_| "Executor finished without publishing a record".to_string())?
    } else {
        receiver
            .recv_timeout(Duration::from_secs(args.timeout_secs))
            .map_err(|_| {
                format!(
                    "Timed out after {}s waiting for: {}",
                    args.timeout_secs, key
                )
            })?
    };

    store.save(&args.store)?;
    print_record(&record, &args.tred, &repo, args.raw)
}
