pub mod list;
pub mod loci;
pub mod remove;
pub mod report;
pub mod run;

use crate::exec::ExecutionRecord;
use crate::report::render;
use crate::utils::{Result, TredRepo};
use std::path::PathBuf;

/// Built-in table unless the user pointed at a file.
pub(crate) fn load_repo(treds: &Option<PathBuf>) -> Result<TredRepo> {
    match treds {
        Some(path) => TredRepo::from_path(path),
        None => Ok(TredRepo::builtin().clone()),
    }
}

/// Prints a record the way the caller asked for it: the captured streams
/// verbatim, or the rendered display model as JSON.
pub(crate) fn print_record(
    record: &ExecutionRecord,
    tred: &str,
    repo: &TredRepo,
    raw: bool,
) -> Result<()> {
    if raw {
        println!("{}", record.stdout);
        if !record.stderr.is_empty() {
            eprintln!("{}", record.stderr);
        }
        return Ok(());
    }
    let model = render(record, tred, repo);
    let text = serde_json::to_string_pretty(&model)
        .map_err(|e| format!("Failed to serialize display model: {}", e))?;
    println!("{}", text);
    Ok(())
}
