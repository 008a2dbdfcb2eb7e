//! Progress reporting with cooperative cancellation.

use navdata_schema::SceneryArea;
use serde::Serialize;

/// Result of a compile run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The progress callback asked to stop. Uncommitted work is rolled back.
    Aborted,
}

/// Objects written so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub files: usize,
    pub airports: usize,
    pub vors: usize,
    pub ils: usize,
    pub ndbs: usize,
    pub markers: usize,
    pub waypoints: usize,
    pub boundaries: usize,
    pub procedures: usize,
    pub errors: usize,
}

/// What is currently being worked on.
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    SceneryArea(&'a SceneryArea),
    File(&'a str),
    Other(&'a str),
    Finished,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressReport<'a> {
    pub step: Step<'a>,
    pub current: usize,
    pub total: usize,
    pub counters: &'a Counters,
}

/// Returns `true` to abort the compile run.
pub type ProgressCallback<'a> = Box<dyn FnMut(&ProgressReport) -> bool + 'a>;

#[derive(Default)]
pub struct ProgressHandler<'a> {
    callback: Option<ProgressCallback<'a>>,
    current: usize,
    total: usize,
    aborted: bool,
    pub counters: Counters,
}

impl<'a> ProgressHandler<'a> {
    pub fn new(callback: impl FnMut(&ProgressReport) -> bool + 'a) -> Self {
        Self { callback: Some(Box::new(callback)), ..Self::default() }
    }

    /// Handler without callback that never aborts.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn add_total(&mut self, steps: usize) {
        self.total += steps;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    fn report(&mut self, step: Step) -> bool {
        self.current += 1;
        if self.current > self.total {
            self.total = self.current;
        }
        if let Some(callback) = self.callback.as_mut() {
            let report = ProgressReport { step, current: self.current, total: self.total, counters: &self.counters };
            if callback(&report) {
                self.aborted = true;
            }
        }
        self.aborted
    }

    pub fn report_scenery_area(&mut self, area: &SceneryArea) -> bool {
        tracing::info!("Scenery area {}", area.describe());
        self.report(Step::SceneryArea(area))
    }

    pub fn report_file(&mut self, filepath: &str) -> bool {
        self.counters.files += 1;
        tracing::debug!("Reading {filepath}");
        self.report(Step::File(filepath))
    }

    pub fn report_other(&mut self, message: &str) -> bool {
        tracing::info!("{message}");
        self.report(Step::Other(message))
    }

    pub fn report_finish(&mut self) -> bool {
        self.current = self.total.saturating_sub(1);
        self.report(Step::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_abort_is_sticky() {
        let mut seen = Vec::new();
        {
            let mut progress = ProgressHandler::new(|r: &ProgressReport| {
                if let Step::Other(msg) = r.step {
                    seen.push(msg.to_string());
                }
                r.current >= 2
            });
            progress.set_total(5);
            assert!(!progress.report_other("one"));
            assert!(progress.report_other("two"));
            assert!(progress.is_aborted());
        }
        assert_eq!(seen, vec!["one", "two"]);
    }

    #[test]
    fn silent_never_aborts_and_grows_total() {
        let mut progress = ProgressHandler::silent();
        progress.set_total(1);
        assert!(!progress.report_file("a.bgl"));
        assert!(!progress.report_file("b.bgl"));
        assert_eq!(progress.current(), 2);
        assert_eq!(progress.counters.files, 2);
    }
}
