//! Caches injected into renderers: display paths and source lines.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Formats source paths for display, memoised per input path.
///
/// The display form is the shorter of the absolute path and the path relative
/// to the working directory captured at construction.
#[derive(Debug, Default)]
pub struct PathFormatter {
    cwd: Option<PathBuf>,
    cache: RefCell<HashMap<String, String>>,
}

impl PathFormatter {
    /// Formatter relative to the current working directory.
    pub fn new() -> Self {
        Self::relative_to(std::env::current_dir().ok())
    }

    pub fn relative_to(cwd: Option<PathBuf>) -> Self {
        Self {
            cwd,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Formatter that returns paths unchanged.
    pub fn verbatim() -> Self {
        Self::relative_to(None)
    }

    pub fn format(&self, path: &str) -> String {
        if let Some(hit) = self.cache.borrow().get(path) {
            return hit.clone();
        }
        let formatted = self.compute(path);
        self.cache
            .borrow_mut()
            .insert(path.to_string(), formatted.clone());
        formatted
    }

    fn compute(&self, path: &str) -> String {
        let Some(cwd) = self.cwd.as_deref() else {
            return path.to_string();
        };
        let absolute = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            cwd.join(path)
        };
        let absolute_text = absolute.to_string_lossy().into_owned();
        match pathdiff::diff_paths(&absolute, cwd) {
            Some(relative) => {
                let relative_text = relative.to_string_lossy().into_owned();
                if relative_text.len() < absolute_text.len() {
                    relative_text
                } else {
                    absolute_text
                }
            }
            None => absolute_text,
        }
    }
}

/// Source files read at most once each. Unreadable files are remembered as
/// missing so the warning is logged once.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: RefCell<HashMap<String, Option<Vec<String>>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line `line` (1-based) of `path`, without its line terminator.
    pub fn line(&self, path: &str, line: u32) -> Option<String> {
        if line == 0 {
            return None;
        }
        let mut files = self.files.borrow_mut();
        let lines = files
            .entry(path.to_string())
            .or_insert_with(|| load_lines(path));
        lines
            .as_ref()?
            .get(line as usize - 1)
            .map(|l| l.trim_end().to_string())
    }
}

fn load_lines(path: &str) -> Option<Vec<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect(),
        ),
        Err(err) => {
            warn!(path, error = %err, "could not open source file");
            None
        }
    }
}
