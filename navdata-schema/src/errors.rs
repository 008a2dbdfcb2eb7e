use serde::Serialize;

use crate::SceneryArea;

/// A single problem found while reading one file of a scenery area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub filepath: String,
    pub message: String,
    /// Line number for text formats, `None` for binary files.
    pub line: Option<usize>,
}

impl FileError {
    pub fn new(filepath: impl Into<String>, message: impl Into<String>) -> Self {
        Self { filepath: filepath.into(), message: message.into(), line: None }
    }

    pub fn at_line(filepath: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        Self { filepath: filepath.into(), message: message.into(), line: Some(line) }
    }
}

/// Errors collected for one scenery area.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneryErrors {
    pub scenery: SceneryArea,
    pub file_errors: Vec<FileError>,
    pub messages: Vec<String>,
}

impl SceneryErrors {
    pub fn for_area(scenery: &SceneryArea) -> Self {
        Self { scenery: scenery.clone(), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.file_errors.is_empty() && self.messages.is_empty()
    }
}

/// Externally owned error sink filled during a compile run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NavDatabaseErrors {
    pub scenery_errors: Vec<SceneryErrors>,
}

impl NavDatabaseErrors {
    pub fn total_errors(&self) -> usize {
        self.scenery_errors
            .iter()
            .map(|e| e.file_errors.len() + e.messages.len())
            .sum()
    }

    /// Append the errors of an area, dropping it when nothing was recorded.
    pub fn push_if_any(&mut self, errors: SceneryErrors) {
        if !errors.is_empty() {
            self.scenery_errors.push(errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_area_errors_are_dropped() {
        let mut all = NavDatabaseErrors::default();
        all.push_if_any(SceneryErrors::default());
        assert!(all.scenery_errors.is_empty());

        let mut err = SceneryErrors::default();
        err.file_errors.push(FileError::new("a.bgl", "Duplicate airport ident KSEA"));
        err.messages.push("scenery path missing".to_string());
        all.push_if_any(err);
        assert_eq!(all.total_errors(), 2);
    }
}
