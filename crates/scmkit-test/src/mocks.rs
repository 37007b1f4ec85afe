//! Mock collaborators.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scmkit_core::{Cmd, ExecError, ExecOutput, Executor, TempDirProvider};
use tempfile::TempDir;

/// Side effect run when a scripted command succeeds, e.g. writing the files
/// a real clone would produce.
pub type Materializer = Arc<dyn Fn(&Cmd) -> io::Result<()> + Send + Sync>;

#[derive(Debug)]
enum Scripted {
    Output(ExecOutput),
    SpawnError(String),
}

/// Executor that records every command and replays scripted outcomes.
///
/// Outcomes are consumed in order; once the queue is empty every command
/// succeeds. A materializer, if set, runs for each successful command.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<Cmd>>>,
    outcomes: Arc<Mutex<VecDeque<Scripted>>>,
    materializer: Option<Materializer>,
}

impl std::fmt::Debug for RecordingExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingExecutor")
            .field("calls", &self.calls)
            .field("outcomes", &self.outcomes)
            .field("materializer", &self.materializer.is_some())
            .finish()
    }
}

impl RecordingExecutor {
    /// Executor where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, outcome: Scripted) -> Self {
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push_back(outcome);
        }
        self
    }

    /// Queue a successful exit.
    #[must_use]
    pub fn with_success(self) -> Self {
        self.push(Scripted::Output(ExecOutput::success()))
    }

    /// Queue a non-zero exit with captured stderr.
    #[must_use]
    pub fn with_failure(self, code: i32, stderr: &str) -> Self {
        self.push(Scripted::Output(ExecOutput::failure(code, stderr)))
    }

    /// Queue a failure to start the process.
    #[must_use]
    pub fn with_spawn_error(self, message: &str) -> Self {
        self.push(Scripted::SpawnError(message.to_owned()))
    }

    /// Run `f` for each command that succeeds.
    #[must_use]
    pub fn with_materializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Cmd) -> io::Result<()> + Send + Sync + 'static,
    {
        self.materializer = Some(Arc::new(f));
        self
    }

    /// Every command executed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Cmd> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of commands executed so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|g| g.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(&self, cmd: &Cmd) -> Result<ExecOutput, ExecError> {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(cmd.clone());
        }
        let next = self.outcomes.lock().ok().and_then(|mut g| g.pop_front());
        let output = match next {
            Some(Scripted::SpawnError(message)) => {
                return Err(ExecError::Spawn {
                    program: cmd.program().unwrap_or_default().to_owned(),
                    source: io::Error::new(io::ErrorKind::NotFound, message),
                });
            },
            Some(Scripted::Output(output)) => output,
            None => ExecOutput::success(),
        };
        if output.is_success()
            && let Some(materialize) = &self.materializer
        {
            materialize(cmd).map_err(|source| ExecError::Spawn {
                program: cmd.program().unwrap_or_default().to_owned(),
                source,
            })?;
        }
        Ok(output)
    }
}

/// Temp dir provider that records what it allocated.
///
/// Directories live under a private root removed when the provider drops.
/// Allocation can be made to fail to exercise resource-error paths.
#[derive(Debug, Clone)]
pub struct CountingTempDirProvider {
    root: Arc<TempDir>,
    allocated: Arc<Mutex<Vec<PathBuf>>>,
    fail_after: Option<usize>,
}

impl CountingTempDirProvider {
    /// Provider with a fresh private root.
    ///
    /// # Panics
    ///
    /// Panics if the root temp dir cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Arc::new(tempfile::tempdir().expect("create temp root")),
            allocated: Arc::new(Mutex::new(Vec::new())),
            fail_after: None,
        }
    }

    /// Fail every allocation after the first `n`.
    #[must_use]
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Paths handed out so far.
    #[must_use]
    pub fn allocated(&self) -> Vec<PathBuf> {
        self.allocated.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of successful allocations.
    #[must_use]
    pub fn allocation_count(&self) -> usize {
        self.allocated.lock().map(|g| g.len()).unwrap_or_default()
    }
}

impl Default for CountingTempDirProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TempDirProvider for CountingTempDirProvider {
    fn new_scoped_temp_dir(&self) -> io::Result<TempDir> {
        let mut guard = self
            .allocated
            .lock()
            .map_err(|_| io::Error::other("allocation log poisoned"))?;
        if self.fail_after.is_some_and(|n| guard.len() >= n) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "temp dir allocation refused",
            ));
        }
        let dir = tempfile::tempdir_in(self.root.path())?;
        guard.push(dir.path().to_path_buf());
        Ok(dir)
    }
}
