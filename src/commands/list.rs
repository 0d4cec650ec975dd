use crate::cli::ListArgs;
use crate::exec::ExecutionStore;
use crate::utils::Result;

pub fn list(args: ListArgs) -> Result<()> {
    let store = ExecutionStore::load(&args.store)?;
    let keys = store.keys();
    if keys.is_empty() {
        println!("Store {} is empty", args.store.display());
        return Ok(());
    }
    for key in keys {
        if let Some(record) = store.find(&key) {
            println!(
                "{}\t{} bytes\t{}",
                record.created_at.format("%Y-%m-%d %H:%M:%S"),
                record.stdout.len(),
                key
            );
        }
    }
    Ok(())
}
