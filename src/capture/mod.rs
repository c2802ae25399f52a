//! Per-thread output capture
//!
//! During a run, each worker thread's stdout/stderr writes are redirected
//! into a private buffer keyed by the worker's thread id. The coordinating
//! thread is exempt and keeps writing to the real process streams, as does
//! everyone before the run starts.
//!
//! Locking discipline: the thread-to-buffer map is guarded by a reader/writer
//! lock. Lookups take the read lock (hot path) and clone out an `Arc`, so a
//! handle stays valid across later insertions; the first write from a thread
//! takes the write lock to insert. No buffer is ever removed mid-run.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use std::thread::{self, ThreadId};

/// Which process stream a write targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Buffered output of one worker thread.
///
/// The inner mutexes are uncontended in practice: only the owning worker
/// writes, and the coordinator reads only after that worker has joined.
#[derive(Debug, Default)]
struct ThreadBuffers {
    stdout: Mutex<String>,
    stderr: Mutex<String>,
}

/// Captured text of one worker, harvested after it finished.
///
/// A stream the worker never wrote to is `None`.
#[derive(Clone, Debug, Default)]
pub struct CapturedOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// Run-scoped capture state
///
/// Constructed by the runner and shared with every worker; there is no
/// process-wide singleton. The lifecycle is one-way: `NotStarted` until
/// [`OutputCapture::start`] records the coordinator thread, `Started` from
/// then on.
#[derive(Debug, Default)]
pub struct OutputCapture {
    coordinator: OnceLock<ThreadId>,
    buffers: RwLock<HashMap<ThreadId, Arc<ThreadBuffers>>>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition to the started state, recording `coordinator` as the thread
    /// exempt from capture. The transition is one-way; later calls are no-ops.
    pub fn start(&self, coordinator: ThreadId) {
        let _ = self.coordinator.set(coordinator);
    }

    pub fn started(&self) -> bool {
        self.coordinator.get().is_some()
    }

    /// Whether a write from `id` is redirected into a private buffer
    fn is_redirected(&self, id: ThreadId) -> bool {
        match self.coordinator.get() {
            Some(coordinator) => *coordinator != id,
            None => false,
        }
    }

    /// Get the buffer set for `id`, creating it on first use
    fn buffers_for(&self, id: ThreadId) -> Arc<ThreadBuffers> {
        {
            let map = self.buffers.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = map.get(&id) {
                return Arc::clone(existing);
            }
        }

        let mut map = self
            .buffers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(id).or_default())
    }

    /// Route a write from thread `id`: to the real stream when capture has
    /// not started or `id` is the coordinator, otherwise to the thread's
    /// private buffer.
    pub fn write(&self, id: ThreadId, kind: StreamKind, text: &str) {
        if self.is_redirected(id) {
            let buffers = self.buffers_for(id);
            let mut buffer = match kind {
                StreamKind::Stdout => buffers.stdout.lock(),
                StreamKind::Stderr => buffers.stderr.lock(),
            }
            .unwrap_or_else(PoisonError::into_inner);
            buffer.push_str(text);
        } else {
            match kind {
                StreamKind::Stdout => {
                    print!("{text}");
                    let _ = io::stdout().flush();
                }
                StreamKind::Stderr => eprint!("{text}"),
            }
        }
    }

    /// Retrieve the captured output of thread `id`.
    ///
    /// Safe to call only after the owning worker can no longer write, i.e.
    /// post-join, or from the worker itself once its test body returned.
    pub fn captured(&self, id: ThreadId) -> CapturedOutput {
        let map = self.buffers.read().unwrap_or_else(PoisonError::into_inner);
        let Some(buffers) = map.get(&id) else {
            return CapturedOutput::default();
        };

        let take = |stream: &Mutex<String>| {
            let text = stream.lock().unwrap_or_else(PoisonError::into_inner);
            if text.is_empty() {
                None
            } else {
                Some(text.clone())
            }
        };

        CapturedOutput {
            stdout: take(&buffers.stdout),
            stderr: take(&buffers.stderr),
        }
    }
}

/// Output handle injected into each test body.
///
/// Test code writes through this handle instead of the global print macros,
/// so its output lands in the calling thread's private buffer during a run.
#[derive(Clone, Debug)]
pub struct TestIo {
    capture: Arc<OutputCapture>,
}

impl TestIo {
    pub(crate) fn new(capture: Arc<OutputCapture>) -> Self {
        Self { capture }
    }

    /// A `Write` adapter targeting the test's stdout
    pub fn stdout(&self) -> StreamWriter<'_> {
        StreamWriter {
            capture: &self.capture,
            kind: StreamKind::Stdout,
        }
    }

    /// A `Write` adapter targeting the test's stderr
    pub fn stderr(&self) -> StreamWriter<'_> {
        StreamWriter {
            capture: &self.capture,
            kind: StreamKind::Stderr,
        }
    }

    pub fn print(&self, text: &str) {
        self.capture
            .write(thread::current().id(), StreamKind::Stdout, text);
    }

    pub fn println(&self, text: &str) {
        self.print(text);
        self.print("\n");
    }

    pub fn eprint(&self, text: &str) {
        self.capture
            .write(thread::current().id(), StreamKind::Stderr, text);
    }

    pub fn eprintln(&self, text: &str) {
        self.eprint(text);
        self.eprint("\n");
    }
}

/// `io::Write` adapter over one capture stream
pub struct StreamWriter<'a> {
    capture: &'a OutputCapture,
    kind: StreamKind,
}

impl Write for StreamWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.capture
            .write(thread::current().id(), self.kind, &text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
