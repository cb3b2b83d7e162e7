//! In-memory editor session: dispatches editor events to the two engines.
//!
//! The session owns the policy the engines leave to their caller: which event
//! rebuilds what, the trailing-edge debounce in front of the rewriter, and the
//! rule that a rewrite computed from an outdated snapshot is thrown away.

use std::ops::Range;
use std::time::{Duration, Instant};

use crate::concealer::{self, Refresh};
use crate::index::LinkResolver;
use crate::rewriter;
use crate::types::{ConcealRange, RewriteOutcome, VisibleWindow, floor_char_boundary};

/// Work an event calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Schedule a rewrite and rebuild concealment.
    RebuildBoth,
    /// Rebuild concealment only.
    RebuildConcealment,
}

impl Action {
    /// The event-to-action table.
    pub fn for_event(event: &EditorEvent) -> Self {
        return match *event {
            EditorEvent::ConfigChanged(_) | EditorEvent::ViewportChanged(_) => Self::RebuildConcealment,
            EditorEvent::TextChanged { .. } => Self::RebuildBoth,
        };
    }
}

/// Trailing-edge debounce holding at most one pending deadline.
/// Each trigger replaces the pending deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// When the pending invocation becomes due.
    deadline: Option<Instant>,
    /// Quiet interval after the last trigger.
    delay: Duration,
}

impl Debouncer {
    /// Drop the pending invocation, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True while an invocation is waiting.
    pub const fn is_pending(&self) -> bool {
        return self.deadline.is_some();
    }

    /// A debouncer firing `delay` after the last trigger.
    pub const fn new(delay: Duration) -> Self {
        return Self { deadline: None, delay };
    }

    /// Fire if the pending deadline has passed. Clears it when firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.deadline.is_some_and(|deadline| return now >= deadline);
        if due {
            self.deadline = None;
        }
        return due;
    }

    /// Time left before the pending invocation is due, `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        return self.deadline.map(|deadline| return deadline.saturating_duration_since(now));
    }

    /// Schedule (or reschedule) the invocation `delay` after `now`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = now.checked_add(self.delay).or(Some(now));
    }
}

/// A discrete event delivered by the host editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The concealment flag was set.
    ConfigChanged(bool),
    /// The document text changed; carries the new text and cursor.
    TextChanged {
        /// Cursor offset in the new text.
        cursor: usize,
        /// The full new text.
        text: String,
    },
    /// The rendered byte ranges changed (scrolling, resizing).
    ViewportChanged(Vec<Range<usize>>),
}

/// Document state plus the decorations derived from it.
#[derive(Debug)]
pub struct EditorSession {
    /// Whether concealment is enabled now.
    conceal_enabled: bool,
    /// Vault-relative path of the document, passed to the resolver.
    context_path: String,
    /// Cursor offset into `text`.
    cursor: usize,
    /// Current concealment ranges.
    decorations: Vec<ConcealRange>,
    /// Flag value the current decorations were built with.
    decorations_config: Option<bool>,
    /// Debounce in front of the rewriter.
    pending_rewrite: Debouncer,
    /// Bumped on every text change; identifies snapshots.
    revision: u64,
    /// Stored document text.
    text: String,
    /// Rendered byte ranges, ordered and disjoint. `None` until the host
    /// reports one, meaning the whole document.
    viewport: Option<Vec<Range<usize>>>,
}

/// The text a rewrite was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Cursor at snapshot time.
    pub cursor: usize,
    /// Session revision at snapshot time.
    pub revision: u64,
    /// Text at snapshot time.
    pub text: String,
}

impl EditorSession {
    /// Apply a rewrite result if `snapshot` is still current.
    /// Returns false, discarding the outcome, when the text moved on since.
    pub fn apply_rewrite(&mut self, snapshot: &Snapshot, outcome: RewriteOutcome) -> bool {
        if snapshot.revision != self.revision {
            log::debug!(
                "discarding rewrite of revision {} (now {})",
                snapshot.revision,
                self.revision
            );
            return false;
        }
        if !outcome.changed {
            return false;
        }
        self.text = outcome.text;
        self.cursor = outcome.cursor;
        self.revision = self.revision.wrapping_add(1);
        self.refresh_decorations(true);
        return true;
    }

    /// Current cursor offset.
    pub const fn cursor(&self) -> usize {
        return self.cursor;
    }

    /// Current concealment ranges.
    pub fn decorations(&self) -> &[ConcealRange] {
        return &self.decorations;
    }

    /// The text as displayed, with concealed ranges removed.
    pub fn displayed_text(&self) -> String {
        return concealer::display_text(&self.text, &self.decorations);
    }

    /// Apply one event and run the work the event-to-action table assigns it.
    pub fn handle(&mut self, event: EditorEvent, now: Instant) {
        let action = Action::for_event(&event);
        let content_changed = match event {
            EditorEvent::ConfigChanged(enabled) => {
                self.conceal_enabled = enabled;
                false
            },
            EditorEvent::TextChanged { cursor, text } => {
                self.cursor = floor_char_boundary(&text, cursor);
                self.text = text;
                self.revision = self.revision.wrapping_add(1);
                true
            },
            EditorEvent::ViewportChanged(viewport) => {
                self.viewport = Some(viewport);
                true
            },
        };

        self.refresh_decorations(content_changed);
        if action == Action::RebuildBoth {
            self.pending_rewrite.trigger(now);
        }
    }

    /// Open a document. Concealment is built immediately; no rewrite is scheduled.
    pub fn new(text: &str, context_path: &str, conceal_enabled: bool, debounce: Duration) -> Self {
        let mut session = Self {
            conceal_enabled,
            context_path: context_path.to_string(),
            cursor: 0,
            decorations: Vec::new(),
            decorations_config: None,
            pending_rewrite: Debouncer::new(debounce),
            revision: 0,
            text: text.to_string(),
            viewport: None,
        };
        session.refresh_decorations(true);
        return session;
    }

    /// Time until the pending rewrite is due, `None` when nothing is pending.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        return self.pending_rewrite.remaining(now);
    }

    /// Rebuild decorations when needed; a failed rebuild keeps the old ones.
    fn refresh_decorations(&mut self, content_changed: bool) {
        let windows = self.visible_windows();
        let (refresh, used) = concealer::refresh_concealment(
            &windows,
            content_changed,
            self.decorations_config,
            self.conceal_enabled,
        );
        if let Refresh::Replace(ranges) = refresh {
            self.decorations = ranges;
        }
        self.decorations_config = used;
    }

    /// Current revision number.
    pub const fn revision(&self) -> u64 {
        return self.revision;
    }

    /// Capture the current text for an out-of-band rewrite.
    pub fn snapshot(&self) -> Snapshot {
        return Snapshot {
            cursor: self.cursor,
            revision: self.revision,
            text: self.text.clone(),
        };
    }

    /// Stored document text.
    pub fn text(&self) -> &str {
        return &self.text;
    }

    /// Run the debounced rewrite if it is due. Returns true when the text changed.
    pub fn tick<R>(&mut self, now: Instant, resolver: &R) -> bool
    where
        R: LinkResolver + ?Sized,
    {
        if !self.pending_rewrite.poll(now) {
            return false;
        }
        let snapshot = self.snapshot();
        let outcome = rewriter::rewrite(&snapshot.text, snapshot.cursor, &self.context_path, resolver);
        return self.apply_rewrite(&snapshot, outcome);
    }

    /// Slice the viewport's byte ranges out of the current text.
    /// Without a host viewport the whole text is one window.
    fn visible_windows(&self) -> Vec<VisibleWindow<'_>> {
        let Some(viewport) = &self.viewport else {
            return vec![VisibleWindow::whole(&self.text)];
        };
        return viewport
            .iter()
            .map(|range| return VisibleWindow::slice(&self.text, range.start, range.end))
            .filter(|window| return !window.text.is_empty())
            .collect();
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::types::CanonicalPath;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn resolver(name: &str, _context: &str) -> Option<CanonicalPath> {
        return (name == "Project").then(|| return CanonicalPath::from_vault_path("areas/work/Project"));
    }

    #[test]
    fn event_table() {
        assert_eq!(
            Action::for_event(&EditorEvent::TextChanged { cursor: 0, text: String::new() }),
            Action::RebuildBoth
        );
        assert_eq!(
            Action::for_event(&EditorEvent::ViewportChanged(Vec::new())),
            Action::RebuildConcealment
        );
        assert_eq!(Action::for_event(&EditorEvent::ConfigChanged(true)), Action::RebuildConcealment);
    }

    #[test]
    fn debouncer_collapses_bursts_into_one_trailing_fire() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEBOUNCE);
        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(200));

        assert!(!debouncer.poll(start + Duration::from_millis(400)));
        assert!(debouncer.poll(start + Duration::from_millis(500)));
        assert!(!debouncer.poll(start + Duration::from_millis(900)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEBOUNCE);
        debouncer.trigger(start);
        assert_eq!(debouncer.remaining(start), Some(DEBOUNCE));
        debouncer.cancel();
        assert_eq!(debouncer.remaining(start), None);
        assert!(!debouncer.poll(start + DEBOUNCE));
    }

    #[test]
    fn opening_builds_decorations_without_rewriting() {
        let start = Instant::now();
        let mut session = EditorSession::new("[[a/b]] [[Project]]", "today.md", true, DEBOUNCE);
        assert_eq!(session.displayed_text(), "[[b]] [[Project]]");
        assert!(session.next_deadline(start).is_none());
        assert!(!session.tick(start + DEBOUNCE, &resolver));
    }

    #[test]
    fn typing_schedules_a_debounced_rewrite() {
        let start = Instant::now();
        let mut session = EditorSession::new("", "today.md", true, DEBOUNCE);
        session.handle(
            EditorEvent::TextChanged { cursor: 11, text: "[[Project]] ok".to_string() },
            start,
        );

        assert!(!session.tick(start + Duration::from_millis(100), &resolver));
        assert_eq!(session.text(), "[[Project]] ok");

        assert!(session.tick(start + DEBOUNCE, &resolver));
        assert_eq!(session.text(), "[[areas/work/Project]] ok");
        assert_eq!(session.cursor(), 22);
        assert_eq!(session.displayed_text(), "[[Project]] ok");
    }

    #[test]
    fn rewritten_link_is_concealed_without_a_host_viewport() {
        let start = Instant::now();
        let mut session = EditorSession::new("x", "today.md", true, DEBOUNCE);
        session.handle(EditorEvent::TextChanged { cursor: 11, text: "[[Project]]".to_string() }, start);
        assert_eq!(session.displayed_text(), "[[Project]]");

        assert!(session.tick(start + DEBOUNCE, &resolver));
        assert_eq!(session.text(), "[[areas/work/Project]]");
        assert_eq!(session.decorations(), [ConcealRange { end: 13, start: 2 }]);
        assert_eq!(session.displayed_text(), "[[Project]]");
    }

    #[test]
    fn host_viewport_is_kept_across_rewrites() {
        let start = Instant::now();
        let mut session = EditorSession::new("", "today.md", true, DEBOUNCE);
        session.handle(EditorEvent::ViewportChanged(vec![0..4]), start);
        session.handle(EditorEvent::TextChanged { cursor: 0, text: "[[Project]]".to_string() }, start);

        assert!(session.tick(start + DEBOUNCE, &resolver));
        assert!(session.decorations().is_empty());
        assert_eq!(session.displayed_text(), "[[areas/work/Project]]");
    }

    #[test]
    fn stale_snapshot_is_discarded() {
        let start = Instant::now();
        let mut session = EditorSession::new("[[Project]]", "today.md", true, DEBOUNCE);
        let snapshot = session.snapshot();
        let outcome = rewriter::rewrite(&snapshot.text, snapshot.cursor, "today.md", &resolver);

        session.handle(
            EditorEvent::TextChanged { cursor: 0, text: "[[Project]] edited".to_string() },
            start,
        );

        assert!(!session.apply_rewrite(&snapshot, outcome));
        assert_eq!(session.text(), "[[Project]] edited");
    }

    #[test]
    fn toggling_rebuilds_without_text_change() {
        let start = Instant::now();
        let mut session = EditorSession::new("see [[x/y/Note]]", "today.md", true, DEBOUNCE);
        assert_eq!(session.decorations().len(), 1);

        session.handle(EditorEvent::ConfigChanged(false), start);
        assert!(session.decorations().is_empty());
        assert_eq!(session.displayed_text(), "see [[x/y/Note]]");

        session.handle(EditorEvent::ConfigChanged(true), start);
        assert_eq!(session.displayed_text(), "see [[Note]]");
        assert!(session.next_deadline(start).is_none());
    }

    #[test]
    fn scrolling_limits_decorations_to_visible_windows() {
        let start = Instant::now();
        let text = "[[a/one]] middle [[b/two]]";
        let mut session = EditorSession::new(text, "today.md", true, DEBOUNCE);
        assert_eq!(session.decorations().len(), 2);

        session.handle(EditorEvent::ViewportChanged(vec![17..text.len()]), start);
        assert_eq!(session.decorations(), [ConcealRange { end: 21, start: 19 }]);
    }

    #[test]
    fn revision_advances_on_text_change_and_rewrite() {
        let start = Instant::now();
        let mut session = EditorSession::new("", "today.md", true, DEBOUNCE);
        session.handle(EditorEvent::TextChanged { cursor: 0, text: "[[Project]]".to_string() }, start);
        assert_eq!(session.revision(), 1);
        assert!(session.tick(start + DEBOUNCE, &resolver));
        assert_eq!(session.revision(), 2);
    }
}
