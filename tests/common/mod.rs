//! Common test fixtures: an in-memory editor host and a scripted progress
//! monitor.

#![allow(dead_code)]

use text_compare::{
    ByteRange, CompareConfig, CompareMode, CompareOutcome, EditorError, EditorSession, MarkerMask,
    MarkerScheme, NoProgress, ProgressMonitor, Section, ViewId, compare_views,
};

#[derive(Debug, Default)]
struct Doc {
    lines: Vec<Vec<u8>>,
    modified: bool,
    save_points: usize,
    write_enabled: bool,
}

impl Doc {
    fn from_lines(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.as_bytes().to_vec()).collect(),
            ..Self::default()
        }
    }

    fn flat(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                bytes.push(b'\n');
            }
            bytes.extend_from_slice(line);
        }
        bytes
    }
}

/// In-memory stand-in for the host editor: two documents plus a record of
/// every side effect the engine performs.
#[derive(Debug, Default)]
pub struct MemoryEditor {
    main: Doc,
    sub: Doc,
    pub line_markers: Vec<(ViewId, usize, MarkerMask)>,
    pub changed_ranges: Vec<(ViewId, usize, usize)>,
    pub write_toggles: Vec<(ViewId, bool)>,
    pub reported_errors: Vec<String>,
    /// When set, every marker paint fails; used to exercise the error path.
    pub fail_markers: bool,
}

impl MemoryEditor {
    pub fn new(main: &[&str], sub: &[&str]) -> Self {
        Self {
            main: Doc::from_lines(main),
            sub: Doc::from_lines(sub),
            ..Self::default()
        }
    }

    pub fn with_modified(mut self, view: ViewId, modified: bool) -> Self {
        self.doc_mut(view).modified = modified;
        self
    }

    fn doc(&self, view: ViewId) -> &Doc {
        match view {
            ViewId::Main => &self.main,
            ViewId::Sub => &self.sub,
        }
    }

    fn doc_mut(&mut self, view: ViewId) -> &mut Doc {
        match view {
            ViewId::Main => &mut self.main,
            ViewId::Sub => &mut self.sub,
        }
    }

    pub fn lines_of(&self, view: ViewId) -> Vec<String> {
        self.doc(view)
            .lines
            .iter()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect()
    }

    pub fn save_points(&self, view: ViewId) -> usize {
        self.doc(view).save_points
    }

    pub fn write_enabled(&self, view: ViewId) -> bool {
        self.doc(view).write_enabled
    }

    /// Lines painted with exactly this mask, ascending and deduplicated.
    pub fn lines_with(&self, view: ViewId, mask: MarkerMask) -> Vec<usize> {
        let mut lines: Vec<usize> = self
            .line_markers
            .iter()
            .filter(|&&(v, _, m)| v == view && m == mask)
            .map(|&(_, line, _)| line)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

impl EditorSession for MemoryEditor {
    fn line_count(&self, view: ViewId) -> Result<usize, EditorError> {
        Ok(self.doc(view).lines.len())
    }

    fn line_range(&self, view: ViewId, line: usize) -> Result<ByteRange, EditorError> {
        let doc = self.doc(view);
        if line >= doc.lines.len() {
            return Err(EditorError::new(format!("line {line} out of range")));
        }
        let start: usize = doc.lines[..line].iter().map(|l| l.len() + 1).sum();
        Ok(ByteRange {
            start,
            end: start + doc.lines[line].len(),
        })
    }

    fn text(&self, view: ViewId, range: ByteRange) -> Result<Vec<u8>, EditorError> {
        let flat = self.doc(view).flat();
        if range.start > range.end || range.end > flat.len() {
            return Err(EditorError::new(format!(
                "byte range {}..{} out of range",
                range.start, range.end
            )));
        }
        Ok(flat[range.start..range.end].to_vec())
    }

    fn add_line_marker(
        &mut self,
        view: ViewId,
        line: usize,
        mask: MarkerMask,
    ) -> Result<(), EditorError> {
        if self.fail_markers {
            return Err(EditorError::new("marker service unavailable"));
        }
        self.line_markers.push((view, line, mask));
        Ok(())
    }

    fn mark_changed_text(
        &mut self,
        view: ViewId,
        offset: usize,
        length: usize,
    ) -> Result<(), EditorError> {
        self.changed_ranges.push((view, offset, length));
        Ok(())
    }

    fn insert_at_origin(&mut self, view: ViewId, text: &str) -> Result<(), EditorError> {
        let doc = self.doc_mut(view);
        if !doc.write_enabled {
            return Err(EditorError::new("document is read-only"));
        }
        if text != "\n" {
            return Err(EditorError::new("only a newline insert is supported"));
        }
        doc.lines.insert(0, Vec::new());
        doc.modified = true;
        Ok(())
    }

    fn set_save_point(&mut self, view: ViewId) -> Result<(), EditorError> {
        let doc = self.doc_mut(view);
        doc.save_points += 1;
        doc.modified = false;
        Ok(())
    }

    fn is_modified(&self, view: ViewId) -> Result<bool, EditorError> {
        Ok(self.doc(view).modified)
    }

    fn set_write_enabled(&mut self, view: ViewId, enabled: bool) {
        self.write_toggles.push((view, enabled));
        self.doc_mut(view).write_enabled = enabled;
    }

    fn report_error(&mut self, message: &str) {
        self.reported_errors.push(message.to_string());
    }
}

/// Progress monitor scripted to cancel after a given number of polls.
#[derive(Debug, Default)]
pub struct ScriptedProgress {
    pub advances: usize,
    pub phases: usize,
    pub max_counts: Vec<usize>,
    pub opened: Vec<String>,
    pub closed: usize,
    pub cancel_after_advances: Option<usize>,
    pub cancel_after_phases: Option<usize>,
}

impl ProgressMonitor for ScriptedProgress {
    fn set_max_count(&mut self, count: usize) {
        self.max_counts.push(count);
    }

    fn advance(&mut self) -> bool {
        self.advances += 1;
        self.cancel_after_advances
            .is_none_or(|limit| self.advances <= limit)
    }

    fn next_phase(&mut self) -> bool {
        self.phases += 1;
        self.cancel_after_phases
            .is_none_or(|limit| self.phases <= limit)
    }

    fn open(&mut self, title: &str) {
        self.opened.push(title.to_string());
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

pub fn scheme() -> MarkerScheme {
    MarkerScheme::default()
}

/// Run a whole-document full compare with default sections and no progress.
pub fn compare_docs(
    main: &[&str],
    sub: &[&str],
    config: &CompareConfig,
) -> (MemoryEditor, CompareOutcome) {
    compare_docs_mode(main, sub, config, CompareMode::Full)
}

pub fn compare_docs_mode(
    main: &[&str],
    sub: &[&str],
    config: &CompareConfig,
    mode: CompareMode,
) -> (MemoryEditor, CompareOutcome) {
    let mut editor = MemoryEditor::new(main, sub);
    let outcome = compare_views(
        &mut editor,
        &mut NoProgress,
        config,
        &scheme(),
        Section::default(),
        Section::default(),
        mode,
        None,
    );
    (editor, outcome)
}
