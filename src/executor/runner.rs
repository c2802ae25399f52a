//! Parallel test execution
//!
//! Spawns one worker thread per registered test, contains any fault at the
//! worker boundary, harvests each worker's captured output and prints its
//! report block as soon as it finishes. Result lines appear in finish order;
//! the aggregate summary is deterministic regardless of finish order.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::capture::{OutputCapture, TestIo};
use crate::models::{ExecutionResult, RunSummary, TestStatus};
use crate::output;
use crate::registry::TestSet;

/// Banner delimiting captured stdout/stderr in a report block
pub const OUTPUT_BANNER: &str = "----------";

/// Parallel test runner
///
/// Owns the run-scoped capture state and the report sink. The sink mutex is
/// the single critical section through which every per-test block is printed,
/// so blocks from concurrent workers never interleave mid-line.
pub struct Runner {
    capture: Arc<OutputCapture>,
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Runner {
    /// Runner reporting to the real stdout
    pub fn new() -> Self {
        Self::with_sink(Box::new(io::stdout()))
    }

    /// Runner reporting to an arbitrary sink
    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        Self {
            capture: Arc::new(OutputCapture::new()),
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Execute every registered test on its own thread and report results.
    ///
    /// Any fault escaping a test body is contained at that worker's boundary
    /// and recorded as a failure; it never aborts the run or another worker.
    pub fn run(&self, tests: TestSet) -> Result<RunSummary> {
        let total = tests.len();

        {
            let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(sink, "Executing {total} tests:").context("failed to write run header")?;
        }

        self.capture.start(thread::current().id());
        debug!("spawning {total} test workers");

        let failed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::with_capacity(total);
        for test in tests {
            let capture = Arc::clone(&self.capture);
            let sink = Arc::clone(&self.sink);
            let failed = Arc::clone(&failed);

            handles.push(thread::spawn(move || {
                let (name, run) = test.into_parts();
                let io = TestIo::new(Arc::clone(&capture));

                let status = match panic::catch_unwind(AssertUnwindSafe(|| run(&io))) {
                    Ok(Ok(())) => TestStatus::Passed,
                    Ok(Err(failure)) => TestStatus::Failed(failure.message().to_string()),
                    Err(payload) => TestStatus::Failed(fault_message(payload.as_ref())),
                };

                let captured = capture.captured(thread::current().id());
                let result = ExecutionResult {
                    name,
                    status,
                    stdout: captured.stdout,
                    stderr: captured.stderr,
                };

                if !result.status.is_success() {
                    failed
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(result.name.clone());
                }

                let block = format_block(&result);
                let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(err) = sink.write_all(block.as_bytes()) {
                    warn!("failed to write report block for {}: {err}", result.name);
                }
                if let Err(err) = sink.flush() {
                    warn!("failed to flush report block for {}: {err}", result.name);
                }
            }));
        }

        // Join barrier: no further reporting until every worker finished.
        for handle in handles {
            if handle.join().is_err() {
                warn!("a test worker panicked outside its test body");
            }
        }
        debug!("all {total} workers joined");

        let failed_names = failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let summary = RunSummary::new(total, failed_names);

        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(sink).context("failed to write summary")?;
        writeln!(sink, "{}", summary_line(&summary)).context("failed to write summary")?;
        if !summary.is_all_passed() {
            writeln!(sink, "The following tests failed:")
                .context("failed to write failed test names")?;
            for name in &summary.failed {
                writeln!(sink, "    {name}").context("failed to write failed test names")?;
            }
        }
        sink.flush().context("failed to flush report sink")?;

        Ok(summary)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Colorized summary headline: green when everything passed, yellow on a
/// partial pass, red when nothing passed.
fn summary_line(summary: &RunSummary) -> String {
    let headline = summary.headline();
    if summary.is_all_passed() {
        output::bold_green(&headline)
    } else if summary.passed() > 0 {
        output::bold_yellow(&headline)
    } else {
        output::bold_red(&headline)
    }
}

/// Render one test's report block: status line, failure detail if any, then
/// banner-wrapped captured stdout/stderr.
fn format_block(result: &ExecutionResult) -> String {
    let mut block = String::new();

    match &result.status {
        TestStatus::Passed => {
            block.push_str(&output::green(&format!("{}...OK", result.name)));
            block.push('\n');
        }
        TestStatus::Failed(reason) => {
            block.push_str(&output::red(&format!("{}...", result.name)));
            block.push('\n');
            for line in reason.lines() {
                block.push_str("    ");
                block.push_str(line);
                block.push('\n');
            }
        }
    }

    for text in [&result.stdout, &result.stderr].into_iter().flatten() {
        block.push_str(OUTPUT_BANNER);
        block.push('\n');
        block.push_str(text);
        if !text.ends_with('\n') {
            block.push('\n');
        }
        block.push_str(OUTPUT_BANNER);
        block.push('\n');
    }

    block
}

/// Describe a panic payload that escaped a test body
fn fault_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("test raised an unexpected fault: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("test raised an unexpected fault: {text}")
    } else {
        "test raised an unexpected fault".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{bold_yellow, green, red};
    use crate::registry::{ensure, Registry, TestFailure};
    use crate::verify::verify;

    /// In-memory report sink shared with the runner
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_with_sink(registry: Registry) -> (RunSummary, String) {
        let sink = SharedSink::default();
        let runner = Runner::with_sink(Box::new(sink.clone()));
        let summary = runner.run(registry.finalize()).unwrap();
        (summary, sink.text())
    }

    #[test]
    fn test_passing_body_reports_ok() {
        let mut registry = Registry::new();
        registry.register("quiet", |_io| Ok(())).unwrap();

        let (summary, transcript) = run_with_sink(registry);
        assert!(summary.is_all_passed());
        assert!(transcript.contains(&green("quiet...OK")));
        assert!(transcript.contains("All 1 tests passed!"));
    }

    #[test]
    fn test_failing_body_reports_detail_and_run_completes() {
        let mut registry = Registry::new();
        registry
            .register("bad", |_io| Err(TestFailure::new("values differ")))
            .unwrap();
        registry.register("good", |_io| Ok(())).unwrap();

        let (summary, transcript) = run_with_sink(registry);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed, vec!["bad"]);
        assert!(transcript.contains(&red("bad...")));
        assert!(transcript.contains("    values differ\n"));
        assert!(transcript.contains(&green("good...OK")));
    }

    #[test]
    fn test_panicking_body_is_contained() {
        let mut registry = Registry::new();
        registry
            .register("explodes", |_io| panic!("wires crossed"))
            .unwrap();
        registry.register("survives", |_io| Ok(())).unwrap();

        let (summary, transcript) = run_with_sink(registry);
        assert_eq!(summary.failed, vec!["explodes"]);
        assert!(transcript.contains("    test raised an unexpected fault: wires crossed\n"));
        assert!(transcript.contains(&green("survives...OK")));
    }

    #[test]
    fn test_output_isolation_across_workers() {
        let mut registry = Registry::new();
        for i in 0..6 {
            let token = format!("token-{i}");
            registry
                .register(format!("writer-{i}"), move |io| {
                    io.println(&token);
                    Ok(())
                })
                .unwrap();
        }

        let (summary, transcript) = run_with_sink(registry);
        assert!(summary.is_all_passed());

        // Each block contains exactly its own token, wrapped in banners.
        for i in 0..6 {
            let wrapped = format!("{OUTPUT_BANNER}\ntoken-{i}\n{OUTPUT_BANNER}\n");
            assert!(transcript.contains(&wrapped), "missing block for {i}");
            assert_eq!(transcript.matches(&format!("token-{i}")).count(), 1);
        }
    }

    #[test]
    fn test_failed_names_are_sorted_in_summary() {
        let mut registry = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(name, |_io| ensure(false, "nope"))
                .unwrap();
        }

        let (summary, transcript) = run_with_sink(registry);
        assert_eq!(summary.failed, vec!["alpha", "mid", "zeta"]);
        assert!(transcript.contains("The following tests failed:\n    alpha\n    mid\n    zeta\n"));
        assert!(transcript.contains(&output::bold_red("0 of 3 tests passed.")));
    }

    /// Sink that rejects any write mentioning `reject`
    struct RefusingSink {
        inner: SharedSink,
        reject: &'static str,
    }

    impl Write for RefusingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if String::from_utf8_lossy(buf).contains(self.reject) {
                return Err(io::Error::new(io::ErrorKind::Other, "sink refused write"));
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_block_write_does_not_abort_run() {
        let shared = SharedSink::default();
        let runner = Runner::with_sink(Box::new(RefusingSink {
            inner: shared.clone(),
            reject: "solo",
        }));

        let mut registry = Registry::new();
        registry.register("solo", |_io| Ok(())).unwrap();
        registry.register("other", |_io| Ok(())).unwrap();

        // The dropped block loses only its own report; the run still joins
        // every worker and prints the full summary.
        let summary = runner.run(registry.finalize()).unwrap();
        assert!(summary.is_all_passed());

        let transcript = shared.text();
        assert!(transcript.contains("Executing 2 tests:"));
        assert!(transcript.contains(&green("other...OK")));
        assert!(!transcript.contains("solo"));
        assert!(transcript.contains("All 2 tests passed!"));
    }

    #[test]
    fn test_end_to_end_transcript_verifies() {
        let mut registry = Registry::new();
        registry.register("A", |_io| Ok(())).unwrap();
        registry.register("B", |_io| ensure(false, "x")).unwrap();
        registry
            .register("C", |io| {
                io.println("hello");
                Ok(())
            })
            .unwrap();

        let (summary, transcript) = run_with_sink(registry);
        assert_eq!(summary.headline(), "2 of 3 tests passed.");
        assert!(transcript.contains(&bold_yellow("2 of 3 tests passed.")));

        let expected = "Executing 3 tests:\n\
                        A...OK%GREEN%\n\
                        B...%RED%\n    x\n\
                        C...OK%GREEN%\n----------\nhello\n----------\n\
                        \n\
                        2 of 3 tests passed.%BOLD_YELLOW%\n\
                        The following tests failed:\n    B\n";
        verify(expected, &transcript).unwrap();
    }
}
