//! Computes which parts of full-path wikilinks are hidden from display.
//!
//! Concealment is purely visual: the ranges index the stored text, which is
//! never modified here. A host draws each range as a zero-width, pointer-inert
//! placeholder so only the terminal name stays visible and clickable.

use crate::error::Error;
use crate::index::terminal_segment;
use crate::scanner;
use crate::types::{ConcealRange, Occurrence, SEPARATOR, VisibleWindow};

/// What the caller should do with its current decorations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// Keep the current decorations as they are.
    Keep,
    /// Replace the current decorations with these ranges.
    Replace(Vec<ConcealRange>),
}

/// Build concealment ranges for every full-path link in the visible windows.
///
/// Windows must be ordered and disjoint. Ranges come out in window order, then
/// scan order, so they are sorted by start and never overlap. When `enabled`
/// is false the result is empty.
///
/// # Errors
///
/// Returns `Error::OffsetOutOfBounds` if a window's text does not fit its
/// declared `[from, to)` span.
pub fn build_concealment(
    windows: &[VisibleWindow<'_>],
    enabled: bool,
) -> Result<Vec<ConcealRange>, Error> {
    if !enabled {
        return Ok(Vec::new());
    }

    let mut ranges = Vec::new();
    for window in windows {
        let span = window.to.saturating_sub(window.from);
        if window.text.len() != span || window.to < window.from {
            return Err(Error::OffsetOutOfBounds { len: span, offset: window.from });
        }
        for occurrence in scanner::find_occurrences(window.text) {
            if let Some(range) = conceal_occurrence(&occurrence, window.from) {
                ranges.push(range);
            }
        }
    }
    return Ok(ranges);
}

/// Range hiding `occurrence`'s path prefix, shifted by `base`.
/// `None` when the path has no separator and there is nothing to hide.
fn conceal_occurrence(occurrence: &Occurrence, base: usize) -> Option<ConcealRange> {
    let last_separator = occurrence.path_part().rfind(SEPARATOR)?;
    let start = base.checked_add(occurrence.inner_start())?;
    let end = start.checked_add(last_separator)?.checked_add(SEPARATOR.len_utf8())?;
    return Some(ConcealRange { end, start });
}

/// Render the displayed form of `text`: every concealed range removed.
/// Ranges must be sorted and non-overlapping, as [`build_concealment`] emits them.
pub fn display_text(text: &str, ranges: &[ConcealRange]) -> String {
    let mut shown = String::with_capacity(text.len());
    let mut cursor = 0_usize;
    for range in ranges {
        if range.start < cursor {
            continue;
        }
        shown.push_str(text.get(cursor..range.start).unwrap_or(""));
        cursor = range.end.min(text.len());
    }
    shown.push_str(text.get(cursor..).unwrap_or(""));
    return shown;
}

/// Decide whether concealment needs rebuilding and rebuild it if so.
///
/// `previous_config` is the flag used to build the current decorations
/// (`None` before the first build). The second element of the result is the
/// flag to remember for the next call. A rebuild happens when the content or
/// viewport changed, or when the flag toggled since the last build. A failed
/// rebuild is logged and keeps the current decorations.
pub fn refresh_concealment(
    windows: &[VisibleWindow<'_>],
    content_changed: bool,
    previous_config: Option<bool>,
    current_config: bool,
) -> (Refresh, Option<bool>) {
    let toggled = previous_config != Some(current_config);
    if !content_changed && !toggled {
        return (Refresh::Keep, previous_config);
    }

    return match build_concealment(windows, current_config) {
        Err(e) => {
            log::warn!("concealment rebuild skipped: {e}");
            (Refresh::Keep, previous_config)
        },
        Ok(ranges) => (Refresh::Replace(ranges), Some(current_config)),
    };
}

/// Label a rendered link shows for a stored full path: its last segment.
pub fn terminal_name(path: &str) -> &str {
    return terminal_segment(path.trim_end_matches(SEPARATOR));
}
