//! Decomposition of a matched Python import into single imports.
//!
//! ```text
//! "a.b as x, c"             (Import)    -> [a.b] [c]
//! "..pkg import (x, y as z)" (FromImport) -> [..pkg import x] [..pkg import y]
//! "'m1', \"m2\""             (AllList)   -> [.m1] [.m2]
//! ```

use std::path::PathBuf;

/// Which statement pattern produced the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import a, b.c`
    Import,
    /// `from pkg import name` / `from pkg import *`
    FromImport,
    /// `__all__ = ['a', 'b']` inside a package marker
    AllList,
}

impl ImportKind {
    pub fn from_pattern_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(ImportKind::Import),
            1 => Some(ImportKind::FromImport),
            2 => Some(ImportKind::AllList),
            _ => None,
        }
    }
}

/// One import after alias removal and comma splitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyImport {
    /// Normalised statement text (`pkg.mod` or `..pkg import name`)
    pub text: String,
    /// Number of leading dots of the module part
    pub dots: usize,
    /// Dotted module path without the leading dots; may be empty
    pub module: String,
    /// Imported name of a `from` import; `None` for plain and star imports
    pub name: Option<String>,
    pub star: bool,
}

impl PyImport {
    fn plain(part: &str) -> Option<Self> {
        let token = first_token(part)?;
        let module = token.trim_start_matches('.');
        if module.is_empty() {
            return None;
        }
        Some(Self {
            text: token.to_string(),
            dots: token.len() - module.len(),
            module: module.to_string(),
            name: None,
            star: false,
        })
    }

    fn from_import(module_token: &str, part: &str) -> Option<Self> {
        let name = first_token(part)?;
        let module = module_token.trim_start_matches('.');
        let star = name == "*";
        Some(Self {
            text: format!("{module_token} import {name}"),
            dots: module_token.len() - module.len(),
            module: module.to_string(),
            name: (!star).then(|| name.to_string()),
            star,
        })
    }

    pub fn is_relative(&self) -> bool {
        self.dots > 0
    }

    /// Directories to climb from the importing file's directory
    pub fn levels_up(&self) -> usize {
        self.dots.saturating_sub(1)
    }

    /// The module part as a relative path (`a.b` -> `a/b`)
    pub fn module_path(&self) -> PathBuf {
        dotted_to_path(&self.module)
    }

    /// Path probed first: the module, or `module/name` for a `from` import
    pub fn target_path(&self) -> PathBuf {
        match &self.name {
            Some(name) => self.module_path().join(dotted_to_path(name)),
            None => self.module_path(),
        }
    }

    /// Vertex name used when nothing could be located
    pub fn dummy_name(&self) -> String {
        match self.text.split_once(' ') {
            Some((head, _)) => head.to_string(),
            None => self.text.clone(),
        }
    }
}

/// Split a captured statement into single imports, dropping aliases.
pub fn split_statement(captured: &str, kind: ImportKind) -> Vec<PyImport> {
    let text = captured.replace(['(', ')'], " ");
    match kind {
        ImportKind::Import => text.split(',').filter_map(PyImport::plain).collect(),
        ImportKind::FromImport => {
            let mut tokens = text.split_whitespace();
            let (Some(module), Some("import")) = (tokens.next(), tokens.next()) else {
                return Vec::new();
            };
            if module == "import" {
                return Vec::new();
            }
            let names = tokens.collect::<Vec<_>>().join(" ");
            names
                .split(',')
                .filter_map(|part| PyImport::from_import(module, part))
                .collect()
        }
        ImportKind::AllList => text
            .split(',')
            .map(|entry| entry.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| PyImport::plain(&format!(".{entry}")))
            .collect(),
    }
}

/// First whitespace token of `part`, ignoring an `as alias` tail
fn first_token(part: &str) -> Option<&str> {
    part.split_whitespace().next().filter(|token| *token != "as")
}

fn dotted_to_path(dotted: &str) -> PathBuf {
    dotted.split('.').filter(|seg| !seg.is_empty()).collect()
}
