use crate::error::{DetectorError, Result};
use gardener_solver::Solver;
use regex::Regex;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Trailing marker joining a physical line with the next one
const CONTINUATION: char = '\\';

/// Pool of worker threads that scan files for statements and hand every
/// match to the solver.
///
/// Files are queued with [`submit`](Self::submit); [`await_completion`](Self::await_completion)
/// drains the queue, stops the workers and joins them.
pub struct StatementDetector {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

struct JobQueue {
    jobs: VecDeque<PathBuf>,
    shutdown: bool,
}

struct Shared {
    queue: Mutex<JobQueue>,
    /// Signalled on submit and on shutdown
    job_ready: Condvar,
    /// Signalled whenever a worker takes the last queued job
    queue_drained: Condvar,
    patterns: Vec<Regex>,
    solver: Arc<dyn Solver>,
    panicked: AtomicUsize,
}

impl StatementDetector {
    /// Compile the solver's statement patterns and start `workers` threads
    pub fn new(solver: Arc<dyn Solver>, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(DetectorError::InvalidWorkerCount(workers));
        }

        let patterns = solver
            .statement_patterns()
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                Regex::new(pattern).map_err(|source| DetectorError::InvalidPattern { index, source })
            })
            .collect::<Result<Vec<_>>>()?;

        let shared = Arc::new(Shared {
            queue: Mutex::new(JobQueue {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            job_ready: Condvar::new(),
            queue_drained: Condvar::new(),
            patterns,
            solver,
            panicked: AtomicUsize::new(0),
        });

        let mut detector = Self {
            shared,
            workers: Vec::with_capacity(workers),
        };
        for id in 0..workers {
            let shared = Arc::clone(&detector.shared);
            let handle = thread::Builder::new()
                .name(format!("gardener-worker-{id}"))
                .spawn(move || run_worker(&shared, id))?;
            detector.workers.push(handle);
        }
        log::debug!("Statement detector started with {workers} worker(s)");
        Ok(detector)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue a file for scanning
    pub fn submit(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        log::trace!("Queueing {}", path.display());
        self.shared.lock_queue().jobs.push_back(path);
        self.shared.job_ready.notify_one();
    }

    /// First matching pattern for a logical line: `(statement, pattern index)`
    pub fn detect(&self, line: &str) -> Option<(String, usize)> {
        self.shared.detect(line)
    }

    /// Scan a stream on the calling thread, resolving matches as lines of `path`.
    ///
    /// Returns the number of statements handed to the solver.
    pub fn process_stream<R: BufRead>(&self, reader: R, path: &Path) -> io::Result<usize> {
        self.shared.process_stream(reader, path)
    }

    /// Block until every queued file has been scanned, then stop the workers.
    ///
    /// The queue is drained first, then the shutdown flag is raised and all
    /// workers are joined, so no job submitted before this call is lost.
    pub fn await_completion(mut self) -> Result<()> {
        {
            let mut queue = self.shared.lock_queue();
            while !queue.jobs.is_empty() {
                queue = self
                    .shared
                    .queue_drained
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            log::debug!("Job queue drained, signalling shutdown");
            queue.shutdown = true;
        }
        self.shared.job_ready.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                self.shared.panicked.fetch_add(1, Ordering::Relaxed);
            }
        }
        log::debug!("All workers joined");

        match self.shared.panicked.load(Ordering::Relaxed) {
            0 => Ok(()),
            n => Err(DetectorError::WorkerPanicked(n)),
        }
    }
}

impl Drop for StatementDetector {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shared.lock_queue().shutdown = true;
        self.shared.job_ready.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run_worker(shared: &Shared, id: usize) {
    log::debug!("Worker {id} started");
    while let Some(path) = shared.next_job() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| shared.process_file(&path)));
        if outcome.is_err() {
            shared.panicked.fetch_add(1, Ordering::Relaxed);
            log::error!("Worker {id} panicked while processing {}", path.display());
        }
    }
    log::debug!("Worker {id} exiting");
}

impl Shared {
    fn lock_queue(&self) -> MutexGuard<'_, JobQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next queued path; `None` once shut down with an empty queue
    fn next_job(&self) -> Option<PathBuf> {
        let mut queue = self.lock_queue();
        loop {
            if let Some(path) = queue.jobs.pop_front() {
                if queue.jobs.is_empty() {
                    self.queue_drained.notify_all();
                }
                return Some(path);
            }
            if queue.shutdown {
                return None;
            }
            queue = self
                .job_ready
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn process_file(&self, path: &Path) {
        log::debug!("Processing {}", path.display());
        let result = File::open(path).and_then(|file| self.process_stream(BufReader::new(file), path));
        match result {
            Ok(found) => log::trace!("{}: {found} statement(s)", path.display()),
            Err(err) => log::warn!("Skipping unreadable file {}: {err}", path.display()),
        }
    }

    fn detect(&self, line: &str) -> Option<(String, usize)> {
        let (idx, caps) = self
            .patterns
            .iter()
            .enumerate()
            .find_map(|(idx, re)| re.captures(line).map(|caps| (idx, caps)))?;
        // the first matching pattern decides; an empty capture is ignored
        let statement = caps.iter().skip(1).flatten().last()?.as_str();
        (!statement.is_empty()).then(|| (statement.to_string(), idx))
    }

    fn process_stream<R: BufRead>(&self, mut reader: R, path: &Path) -> io::Result<usize> {
        let mut raw = Vec::new();
        let mut logical = String::new();
        let mut pending = false;
        let mut line_no = 0;
        let mut found = 0;

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            line_no += 1;

            let text = String::from_utf8_lossy(&raw);
            let text = text.strip_suffix('\n').unwrap_or(&*text);
            let text = text.strip_suffix('\r').unwrap_or(text);

            if let Some(head) = text.strip_suffix(CONTINUATION) {
                logical.push_str(head);
                pending = true;
                continue;
            }
            logical.push_str(text);
            pending = false;
            found += self.evaluate(&logical, path, line_no);
            logical.clear();
        }

        if pending {
            log::warn!(
                "Missing line after continuation at the end of {} (line {line_no})",
                path.display()
            );
            found += self.evaluate(&logical, path, line_no);
        }
        Ok(found)
    }

    fn evaluate(&self, line: &str, path: &Path, line_no: usize) -> usize {
        let Some((statement, idx)) = self.detect(line) else {
            return 0;
        };
        log::trace!(
            "{}:{line_no}: statement '{statement}' (pattern {idx})",
            path.display()
        );
        self.solver.resolve(path, &statement, idx, line_no);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gardener_solver::{solver_for, SolverOptions};
    use std::io::Cursor;

    fn detector(language: &str) -> StatementDetector {
        let solver = solver_for(language, SolverOptions::default()).unwrap();
        StatementDetector::new(solver, 1).unwrap()
    }

    #[test]
    fn detect_reports_first_matching_pattern() {
        let d = detector("c");
        assert_eq!(d.detect(r#"#include "a.h""#), Some(("a.h".to_string(), 0)));
        assert_eq!(d.detect("#include <a.h>"), Some(("a.h".to_string(), 1)));
        assert_eq!(d.detect("int main() {}"), None);
    }

    #[test]
    fn detect_python_patterns_by_index() {
        let d = detector("python");
        assert_eq!(d.detect("import xyz"), Some(("xyz".to_string(), 0)));
        assert_eq!(d.detect("from abc import xxx"), Some(("abc import xxx".to_string(), 1)));
        assert_eq!(d.detect("__all__ = ['a']"), Some(("'a'".to_string(), 2)));
        assert_eq!(d.detect("iomport xxx"), None);
    }

    #[test]
    fn zero_workers_rejected() {
        let solver = solver_for("c", SolverOptions::default()).unwrap();
        assert!(matches!(
            StatementDetector::new(solver, 0),
            Err(DetectorError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn continuation_lines_are_joined() {
        let d = detector("python");
        let source = "import os\nfrom yyy\\\n   import xxx\nx = 1\n";
        let found = d
            .process_stream(Cursor::new(source), Path::new("/virtual/m.py"))
            .unwrap();
        assert_eq!(found, 2);

        let graph = d.shared.solver.take_graph();
        let mut lines: Vec<(String, usize)> = graph
            .edges()
            .map(|(_, dst, e)| (dst.name.clone(), e.line))
            .collect();
        lines.sort();
        assert_eq!(lines, vec![("os".to_string(), 1), ("yyy".to_string(), 3)]);
    }

    #[test]
    fn long_continuation_keeps_last_line_number() {
        let d = detector("c");
        let source = "int a;\n#include \\\n  \\\n  \\\n\"deep.h\"\nint b;\n";
        let found = d
            .process_stream(Cursor::new(source), Path::new("/virtual/a.c"))
            .unwrap();
        assert_eq!(found, 1);

        let graph = d.shared.solver.take_graph();
        let (_, dst, edge) = graph.edges().next().unwrap();
        assert_eq!(dst.name, "deep.h");
        assert_eq!(edge.line, 5);
    }

    #[test]
    fn dangling_continuation_is_still_evaluated() {
        let d = detector("c");
        let found = d
            .process_stream(Cursor::new("#include \\\n<stdio.h>\\"), Path::new("/virtual/a.c"))
            .unwrap();
        assert_eq!(found, 1);
        let graph = d.shared.solver.take_graph();
        let (_, dst, edge) = graph.edges().next().unwrap();
        assert_eq!(dst.name, "stdio.h");
        assert_eq!(edge.line, 2);
    }

    #[test]
    fn crlf_and_invalid_utf8_are_tolerated() {
        let d = detector("c");
        let mut bytes = b"// \xff\xfe\r\n".to_vec();
        bytes.extend_from_slice(b"#include \"b.h\"\r\n");
        let found = d
            .process_stream(Cursor::new(bytes), Path::new("/virtual/a.c"))
            .unwrap();
        assert_eq!(found, 1);
        let graph = d.shared.solver.take_graph();
        let (_, dst, edge) = graph.edges().next().unwrap();
        assert_eq!(dst.name, "b.h");
        assert_eq!(edge.line, 2);
    }
}
