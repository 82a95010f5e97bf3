//! End-to-end detection: file supplier -> worker pool -> solver

use gardener_detector::{DetectorError, FileDetector, StatementDetector};
use gardener_solver::{solver_for, Language, Solver, SolverCore, SolverOptions};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

/// Records every resolve call instead of touching the graph
struct RecordingSolver {
    core: SolverCore,
    patterns: &'static [&'static str],
    calls: AtomicUsize,
    seen: Mutex<HashMap<PathBuf, Vec<usize>>>,
}

impl RecordingSolver {
    fn new(patterns: &'static [&'static str]) -> Self {
        Self {
            core: SolverCore::new(),
            patterns,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(HashMap::new()),
        }
    }
}

impl Solver for RecordingSolver {
    fn language(&self) -> Language {
        Language::C
    }

    fn statement_patterns(&self) -> &'static [&'static str] {
        self.patterns
    }

    fn file_pattern(&self) -> &'static str {
        r"\.txt$"
    }

    fn core(&self) -> &SolverCore {
        &self.core
    }

    fn resolve(&self, src_path: &Path, _statement: &str, _pattern_idx: usize, line_no: usize) {
        std::thread::sleep(Duration::from_millis(1));
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .entry(src_path.to_path_buf())
            .or_default()
            .push(line_no);
    }
}

fn sorted_edges(solver: &dyn Solver) -> Vec<(String, String, usize)> {
    let graph = solver.take_graph();
    let mut edges: Vec<_> = graph
        .edges()
        .map(|(s, d, e)| (s.name.clone(), d.name.clone(), e.line))
        .collect();
    edges.sort();
    edges
}

#[test]
fn single_worker_scans_every_file_before_completion() {
    let temp = tempdir().unwrap();
    let solver = Arc::new(RecordingSolver::new(&[r"^use (\w+)$"]));

    let detector = StatementDetector::new(solver.clone(), 1).unwrap();
    let mut paths = Vec::new();
    for i in 0..10 {
        let path = temp.path().join(format!("f{i}.txt"));
        fs::write(&path, "use a\nnothing\nuse b\nuse c\n").unwrap();
        detector.submit(&path);
        paths.push(path);
    }
    detector.await_completion().unwrap();

    assert_eq!(solver.calls.load(Ordering::SeqCst), 30);
    let seen = solver.seen.lock().unwrap();
    assert_eq!(seen.len(), 10);
    for path in &paths {
        assert_eq!(seen[path], vec![1, 3, 4]);
    }
}

#[test]
fn completion_with_no_jobs_returns() {
    let solver = Arc::new(RecordingSolver::new(&[r"^use (\w+)$"]));
    let detector = StatementDetector::new(solver.clone(), 4).unwrap();
    assert_eq!(detector.worker_count(), 4);
    detector.await_completion().unwrap();
    assert_eq!(solver.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_statement_pattern_is_reported() {
    let solver = Arc::new(RecordingSolver::new(&[r"^use (\w+)$", r"^bad ("]));
    let err = StatementDetector::new(solver, 2).err().unwrap();
    assert!(matches!(err, DetectorError::InvalidPattern { index: 1, .. }));
}

#[test]
fn empty_capture_does_not_fall_through_to_later_patterns() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("empty.txt");
    fs::write(&path, "use\nuse a\n").unwrap();

    let solver = Arc::new(RecordingSolver::new(&[r"^use\s*(\w*)$", r"^(use)$"]));
    let detector = StatementDetector::new(solver.clone(), 1).unwrap();
    detector.submit(&path);
    detector.await_completion().unwrap();

    assert_eq!(solver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(solver.seen.lock().unwrap()[&path], vec![2]);
}

#[test]
fn unreadable_file_is_skipped() {
    let temp = tempdir().unwrap();
    let good = temp.path().join("good.txt");
    fs::write(&good, "use a\n").unwrap();

    let solver = Arc::new(RecordingSolver::new(&[r"^use (\w+)$"]));
    let detector = StatementDetector::new(solver.clone(), 2).unwrap();
    detector.submit(temp.path().join("vanished.txt"));
    detector.submit(&good);
    detector.await_completion().unwrap();

    assert_eq!(solver.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn quoted_include_resolves_next_to_source() {
    let temp = tempdir().unwrap();
    let root = temp.path().canonicalize().unwrap();
    fs::write(root.join("a.c"), "int x;\n#include \"b.h\"\n#include \"missing.h\"\n").unwrap();
    fs::write(root.join("b.h"), "").unwrap();

    let solver = solver_for("c", SolverOptions::default()).unwrap();
    let files = FileDetector::new(solver.file_pattern(), &[] as &[&str])
        .unwrap()
        .with_process_paths([root.clone()])
        .collect(solver.as_ref());
    assert_eq!(files.len(), 2);

    let detector = StatementDetector::new(solver.clone(), 1).unwrap();
    for file in files {
        detector.submit(file);
    }
    detector.await_completion().unwrap();

    let graph = solver.take_graph();
    let a = root.join("a.c");
    let b = root.join("b.h");
    assert!(graph.has_edge(&a.to_string_lossy(), &b.to_string_lossy()));
    assert!(graph.has_edge(&a.to_string_lossy(), "missing.h"));
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.dummies().len(), 1);
}

#[test]
fn worker_count_does_not_change_the_graph() {
    let temp = tempdir().unwrap();
    let root = temp.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("include")).unwrap();
    fs::write(root.join("include/common.h"), "#include <stdint.h>\n").unwrap();
    for i in 0..20 {
        fs::write(
            root.join(format!("unit{i:02}.c")),
            format!("#include <common.h>\n#include \"unit{i:02}.h\"\n#include <stdio.h>\n"),
        )
        .unwrap();
        fs::write(root.join(format!("unit{i:02}.h")), "").unwrap();
    }

    let run = |workers: usize| {
        let options = SolverOptions::default().with_include_paths([root.join("include")]);
        let solver = solver_for("c", options).unwrap();
        let files = FileDetector::new(solver.file_pattern(), &[] as &[&str])
            .unwrap()
            .with_process_paths([root.clone()])
            .collect(solver.as_ref());
        let detector = StatementDetector::new(solver.clone(), workers).unwrap();
        for file in files {
            detector.submit(file);
        }
        detector.await_completion().unwrap();
        sorted_edges(solver.as_ref())
    };

    let sequential = run(1);
    assert_eq!(sequential.len(), 61);
    assert_eq!(run(4), sequential);
    assert_eq!(run(8), sequential);
}

#[test]
fn python_tree_with_packages() {
    let temp = tempdir().unwrap();
    let root = temp.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("pkg/sub")).unwrap();
    fs::write(root.join("main.py"), "import pkg\nfrom pkg.sub import worker\nimport os, sys\n").unwrap();
    fs::write(root.join("pkg/__init__.py"), "__all__ = ['helper']\n").unwrap();
    fs::write(root.join("pkg/helper.py"), "from . import \\\n    sub\n").unwrap();
    fs::write(root.join("pkg/sub/__init__.py"), "").unwrap();
    fs::write(root.join("pkg/sub/worker.py"), "from ..helper import run\nfrom .. import helper\n").unwrap();

    let options = SolverOptions::default().with_process_paths([root.clone()]);
    let solver = solver_for("python", options).unwrap();
    let files = FileDetector::new(solver.file_pattern(), &[] as &[&str])
        .unwrap()
        .with_process_paths([root.clone()])
        .collect(solver.as_ref());
    assert_eq!(files.len(), 5);

    let detector = StatementDetector::new(solver.clone(), 3).unwrap();
    for file in files {
        detector.submit(file);
    }
    detector.await_completion().unwrap();

    // sources carry the supplier's relative names; `from .. import helper`
    // repeats an existing edge and is dropped
    assert_eq!(
        sorted_edges(solver.as_ref()),
        vec![
            ("main.py".into(), "os".into(), 3),
            ("main.py".into(), "pkg/__init__.py".into(), 1),
            ("main.py".into(), "pkg/sub/worker.py".into(), 2),
            ("main.py".into(), "sys".into(), 3),
            ("pkg/__init__.py".into(), "pkg/helper.py".into(), 1),
            ("pkg/helper.py".into(), "pkg/sub/__init__.py".into(), 2),
            ("pkg/sub/worker.py".into(), "pkg/helper.py".into(), 1),
        ]
    );
}
