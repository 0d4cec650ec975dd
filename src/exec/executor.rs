use crate::exec::{ExecConfig, ExecutionRecord, ExecutionStore};
use std::{
    io::Read,
    process::{Command, Stdio},
    sync::Arc,
    thread,
};

/// Capture limit per stream, matching the 1 Mb buffer the demo server used.
/// Output beyond the limit is dropped, never an error for the caller.
pub const MAX_CAPTURE_BYTES: usize = 1024 * 1000;

/// Runs genotyper commands as detached child processes and publishes their
/// captured output into the store. Completion is observed through the
/// store, never through a return value: all failure becomes data.
pub struct Executor {
    store: Arc<ExecutionStore>,
    config: ExecConfig,
}

impl Executor {
    pub fn new(store: Arc<ExecutionStore>, config: ExecConfig) -> Self {
        Self { store, config }
    }

    /// Fire-and-forget execution of a command key. If the key already has a
    /// record or an execution in flight this is a no-op, so at most one
    /// process is ever launched per distinct key.
    pub fn run(&self, key: &str) {
        if !self.store.try_reserve(key) {
            log::debug!("Command already run or in flight, skipping: {}", key);
            return;
        }

        let store = Arc::clone(&self.store);
        let config = self.config;
        let key = key.to_string();
        thread::spawn(move || {
            let record = execute(&key, &config);
            store.upsert(record);
        });
    }
}

fn execute(key: &str, config: &ExecConfig) -> ExecutionRecord {
    let shell_command = config.shell_command(key);
    log::info!("Executing: {}", shell_command);

    let (stdout, stderr, failure) = match capture_output(&shell_command) {
        Ok((stdout, stderr, status_failure)) => (stdout, stderr, status_failure),
        Err(e) => {
            let detail = format!("exec error: {}", e);
            (String::new(), String::new(), Some(detail))
        }
    };

    if let Some(detail) = &failure {
        log::error!("{}", detail);
    }

    // An empty stdout always yields a synthetic JSON error payload, so the
    // renderer sees an `error` field instead of an unparseable blank.
    let stdout_text = if stdout.is_empty() {
        let detail = failure.unwrap_or_else(|| "exec error: empty output".to_string());
        serde_json::json!({ "error": config.env.failure_message(&detail) }).to_string()
    } else {
        stdout
    };

    ExecutionRecord::new(key, stdout_text, stderr)
}

/// Runs a shell command with both streams captured up to the byte limit.
/// Returns (stdout, stderr, failure detail for a non-zero exit).
fn capture_output(shell_command: &str) -> std::io::Result<(String, String, Option<String>)> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(shell_command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Both pipes are drained concurrently so a chatty stderr cannot
    // deadlock a full stdout pipe.
    let stderr_pipe = child.stderr.take().expect("stderr was piped");
    let stderr_thread = thread::spawn(move || read_bounded(stderr_pipe));
    let stdout = read_bounded(child.stdout.take().expect("stdout was piped"));
    let stderr = stderr_thread.join().unwrap_or_default();

    let status = child.wait()?;
    let failure = if status.success() {
        None
    } else {
        Some(format!("exec error: command exited with {}", status))
    };
    Ok((stdout, stderr, failure))
}

fn read_bounded<R: Read>(reader: R) -> String {
    let mut buf = Vec::with_capacity(8192);
    let mut limited = reader.take(MAX_CAPTURE_BYTES as u64);
    if let Err(e) = limited.read_to_end(&mut buf) {
        log::error!("Error reading child output: {}", e);
    }
    // Drain the rest so the child is not killed by a broken pipe; the
    // excess is discarded.
    let mut reader = limited.into_inner();
    let mut sink = [0u8; 8192];
    loop {
        match reader.read(&mut sink) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
