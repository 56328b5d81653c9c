//
// state.rs
//
// Open documents and the per-document bookkeeping shared between LSP
// handlers.
//

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use ropey::Rope;
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::config::IndentSettings;
use crate::perf::TimingGuard;
use crate::syntax::{ParseOptions, SyntaxTree};
use crate::utf16::utf16_offset_to_char_offset;

/// A parsed document
pub struct Document {
    pub contents: Rope,
    /// Shared so formatting can run off the async runtime while edits land.
    pub tree: Arc<SyntaxTree>,
    pub version: Option<i32>,
    pub revision: u64,
}

impl Document {
    pub fn new(text: &str, version: Option<i32>, options: &ParseOptions) -> Self {
        Self {
            contents: Rope::from_str(text),
            tree: Arc::new(SyntaxTree::parse_with(text, options)),
            version,
            revision: 0,
        }
    }

    /// Applies one incremental (or full) change and reparses.
    pub fn apply_change(&mut self, change: TextDocumentContentChangeEvent, options: &ParseOptions) {
        if let Some(range) = change.range {
            let start_idx = self.char_index(range.start);
            let end_idx = self.char_index(range.end).max(start_idx);
            self.contents.remove(start_idx..end_idx);
            self.contents.insert(start_idx, &change.text);
        } else {
            // Full document sync
            self.contents = Rope::from_str(&change.text);
        }
        self.reparse(options);
    }

    pub fn reparse(&mut self, options: &ParseOptions) {
        let _guard = TimingGuard::with_threshold("reparse", 50);
        self.revision += 1;
        self.tree = Arc::new(SyntaxTree::parse_with(&self.text(), options));
    }

    pub fn text(&self) -> String {
        self.contents.to_string()
    }

    /// Rope char index of an LSP position. Positions past the last line or
    /// past a line's end clamp to the nearest valid index.
    fn char_index(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.contents.len_lines() {
            return self.contents.len_chars();
        }
        let line_text = self.contents.line(line).to_string();
        let content = line_text.trim_end_matches(&['\n', '\r'][..]);
        let offset = utf16_offset_to_char_offset(content, position.character as usize);
        self.contents.line_to_char(line) + offset
    }
}

/// Everything the server knows about the workspace.
#[derive(Default)]
pub struct WorldState {
    pub documents: HashMap<Url, Document>,
    pub settings: IndentSettings,
}

impl WorldState {
    pub fn new(settings: IndentSettings) -> Self {
        Self {
            documents: HashMap::new(),
            settings,
        }
    }

    pub fn open_document(&mut self, uri: Url, text: &str, version: Option<i32>) {
        let document = Document::new(text, version, &self.settings.parse_options());
        self.documents.insert(uri, document);
    }

    pub fn apply_change(&mut self, uri: &Url, change: TextDocumentContentChangeEvent) {
        let options = self.settings.parse_options();
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.apply_change(change, &options);
        } else {
            log::debug!("Change for unknown document {}", uri);
        }
    }

    pub fn close_document(&mut self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Reparses every open document, after the preprocessor symbols change.
    pub fn reparse_all(&mut self) {
        let options = self.settings.parse_options();
        log::info!("Reparsing {} open documents", self.documents.len());
        for doc in self.documents.values_mut() {
            doc.reparse(&options);
        }
    }

    pub fn tree(&self, uri: &Url) -> Option<Arc<SyntaxTree>> {
        self.documents.get(uri).map(|doc| Arc::clone(&doc.tree))
    }
}

/// Tracks the in-flight formatting request per document so a newer request
/// supersedes an older one.
#[derive(Default)]
pub struct RequestTracker {
    next_id: AtomicU64,
    active: Mutex<HashMap<Url, (u64, CancellationToken)>>,
}

/// Handle for one registered request.
#[derive(Debug, Clone)]
pub struct ActiveRequest {
    pub id: u64,
    pub token: CancellationToken,
}

impl RequestTracker {
    /// Registers a new request for `uri`, cancelling any older one.
    pub fn begin(&self, uri: &Url) -> ActiveRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, previous)) = active.insert(uri.clone(), (id, token.clone())) {
            log::debug!("Superseding formatting request for {}", uri);
            previous.cancel();
        }
        ActiveRequest { id, token }
    }

    /// Forgets `request` if it is still the latest one for `uri`.
    pub fn finish(&self, uri: &Url, request: &ActiveRequest) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.get(uri).is_some_and(|(id, _)| *id == request.id) {
            active.remove(uri);
        }
    }

    /// Cancels whatever is running for `uri`.
    pub fn cancel(&self, uri: &Url) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, token)) = active.remove(uri) {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Range;

    fn edit(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position { line: start.0, character: start.1 },
                end: Position { line: end.0, character: end.1 },
            }),
            range_length: None,
            text: text.to_string(),
        }
    }

    fn doc(text: &str) -> Document {
        Document::new(text, None, &ParseOptions::default())
    }

    #[test]
    fn test_document_apply_change_ascii() {
        let mut doc = doc("var x = 1;");
        doc.apply_change(edit((0, 8), (0, 9), "42"), &ParseOptions::default());
        assert_eq!(doc.text(), "var x = 42;");
        assert_eq!(doc.tree.text(), "var x = 42;");
        assert_eq!(doc.revision, 1);
    }

    #[test]
    fn test_document_apply_change_utf16_emoji() {
        // U+1F389 is 2 UTF-16 code units
        let mut doc = doc("s = \"a\u{1F389}b\";");
        doc.apply_change(edit((0, 8), (0, 8), "x"), &ParseOptions::default());
        assert_eq!(doc.text(), "s = \"a\u{1F389}xb\";");
    }

    #[test]
    fn test_document_apply_change_utf16_delete_emoji() {
        let mut doc = doc("a\u{1F389}b");
        doc.apply_change(edit((0, 1), (0, 3), ""), &ParseOptions::default());
        assert_eq!(doc.text(), "ab");
    }

    #[test]
    fn test_document_lines_break_only_at_cr_and_lf() {
        // Form feed, NEL and LINE SEPARATOR are not line breaks to the client
        let mut doc = doc("a\u{0C}b\u{85}c\u{2028}d\ne\rf");
        doc.apply_change(edit((1, 0), (1, 0), "x"), &ParseOptions::default());
        assert_eq!(doc.text(), "a\u{0C}b\u{85}c\u{2028}d\nxe\rf");
        doc.apply_change(edit((2, 1), (2, 1), "y"), &ParseOptions::default());
        assert_eq!(doc.text(), "a\u{0C}b\u{85}c\u{2028}d\nxe\rfy");
        assert_eq!(doc.tree.line_count(), 3);
    }

    #[test]
    fn test_document_apply_change_multiline() {
        let mut doc = doc("if (a)\n{\n}\n");
        doc.apply_change(edit((1, 1), (1, 1), "\n    "), &ParseOptions::default());
        assert_eq!(doc.text(), "if (a)\n{\n    \n}\n");
        assert_eq!(doc.tree.line_count(), 5);
    }

    #[test]
    fn test_document_apply_change_clamps_positions() {
        let mut doc = doc("a\r\nb");
        // Past the end of line 0 stays before the line break
        doc.apply_change(edit((0, 10), (0, 10), "x"), &ParseOptions::default());
        assert_eq!(doc.text(), "ax\r\nb");
        // Past the last line appends
        doc.apply_change(edit((9, 0), (9, 0), ";"), &ParseOptions::default());
        assert_eq!(doc.text(), "ax\r\nb;");
    }

    #[test]
    fn test_full_sync_replaces_text() {
        let mut doc = doc("old");
        doc.apply_change(
            TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "class C { }".to_string(),
            },
            &ParseOptions::default(),
        );
        assert_eq!(doc.text(), "class C { }");
    }

    #[test]
    fn test_reparse_all_uses_new_symbols() {
        let uri = Url::parse("file:///Program.cs").unwrap();
        let mut state = WorldState::default();
        state.open_document(uri.clone(), "#if DEBUG\nx();\n#endif\n", Some(1));
        let before = state.tree(&uri).unwrap();

        state.settings.preprocessor_symbols = vec!["DEBUG".into()];
        state.reparse_all();
        let after = state.tree(&uri).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(state.documents[&uri].revision, 1);
    }

    #[test]
    fn test_request_tracker_supersedes() {
        let uri = Url::parse("file:///Program.cs").unwrap();
        let tracker = RequestTracker::default();
        let first = tracker.begin(&uri);
        let second = tracker.begin(&uri);
        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());

        // A stale finish leaves the newer request registered
        tracker.finish(&uri, &first);
        tracker.cancel(&uri);
        assert!(second.token.is_cancelled());

        let third = tracker.begin(&uri);
        tracker.finish(&uri, &third);
        tracker.cancel(&uri);
        assert!(!third.token.is_cancelled());
    }
}
