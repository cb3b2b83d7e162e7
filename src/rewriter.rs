//! Rewrites short wikilinks into full-path wikilinks, tracking the cursor.

use crate::error::Error;
use crate::index::LinkResolver;
use crate::scanner;
use crate::types::{CLOSE, OPEN, Replacement, RewriteOutcome, floor_char_boundary};

/// Splice replacements into `text`, rightmost first, so earlier offsets stay valid.
///
/// # Errors
///
/// Returns `Error::OffsetOutOfBounds` if a replacement does not fit the text,
/// or `Error::OverlappingReplacements` if two replacements share bytes.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> Result<String, Error> {
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by(|a, b| return b.start.cmp(&a.start));

    let mut output = text.to_string();
    let mut floor = text.len();
    for op in ordered {
        if op.end > text.len() {
            return Err(Error::OffsetOutOfBounds { len: text.len(), offset: op.end });
        }
        if op.end > floor {
            return Err(Error::OverlappingReplacements { end: op.end, start: op.start });
        }
        if op.start > op.end || !output.is_char_boundary(op.start) || !output.is_char_boundary(op.end) {
            return Err(Error::OffsetOutOfBounds { len: text.len(), offset: op.start });
        }
        output.replace_range(op.start..op.end, &op.text);
        floor = op.start;
    }
    return Ok(output);
}

/// Find every short link that resolves to a different canonical path and plan its replacement.
/// Links that already contain a separator, carry an alias or anchor, or fail to
/// resolve produce nothing.
pub fn plan_replacements<R>(text: &str, context_path: &str, resolver: &R) -> Vec<Replacement>
where
    R: LinkResolver + ?Sized,
{
    let mut planned = Vec::new();
    for occurrence in scanner::find_occurrences(text) {
        if occurrence.is_full_path() || occurrence.has_suffix() {
            continue;
        }
        let Some(canonical) = resolver.resolve(&occurrence.inner, context_path) else {
            continue;
        };
        if canonical.as_str() == occurrence.inner {
            continue;
        }
        planned.push(Replacement {
            end: occurrence.end,
            start: occurrence.start,
            text: format!("{OPEN}{canonical}{CLOSE}"),
        });
    }
    return planned;
}

/// Map an offset in the original text to the same logical point in the rewritten text.
///
/// Every replacement starting strictly before `offset` shifts it by its length
/// delta. The result is clamped to `[0, new_len]` and to a character boundary of
/// `new_text`, so a mapping that would fall outside the document ends up at
/// its end instead of failing.
pub fn remap_offset(replacements: &[Replacement], offset: usize, new_text: &str) -> usize {
    let mut grown = 0_usize;
    let mut shrunk = 0_usize;
    for op in replacements.iter().filter(|op| return op.start < offset) {
        grown = grown.saturating_add(op.text.len());
        shrunk = shrunk.saturating_add(op.end.saturating_sub(op.start));
    }
    let mapped = offset.saturating_add(grown).saturating_sub(shrunk);
    return floor_char_boundary(new_text, mapped.min(new_text.len()));
}

/// Rewrite every resolvable short link in `text` to its full path.
///
/// All-or-nothing: if applying the planned replacements fails, the fault is
/// logged and the input comes back untouched with `changed == false`.
pub fn rewrite<R>(text: &str, cursor: usize, context_path: &str, resolver: &R) -> RewriteOutcome
where
    R: LinkResolver + ?Sized,
{
    let replacements = plan_replacements(text, context_path, resolver);
    return rewrite_planned(text, cursor, context_path, &replacements);
}

/// Apply an already planned set of replacements and remap the cursor.
/// A plan that cannot be applied is logged and leaves `text` untouched.
pub fn rewrite_planned(
    text: &str,
    cursor: usize,
    context_path: &str,
    replacements: &[Replacement],
) -> RewriteOutcome {
    return match try_rewrite_planned(text, cursor, replacements) {
        Err(e) => {
            log::warn!("rewrite of {context_path} skipped: {e}");
            RewriteOutcome::unchanged(text, cursor)
        },
        Ok(outcome) => {
            if outcome.changed {
                log::debug!("rewrote {} links in {context_path}", replacements.len());
            }
            outcome
        },
    };
}

/// Apply and remap. Errors bubble up to [`rewrite_planned`].
///
/// # Errors
///
/// Returns errors from [`apply_replacements`].
fn try_rewrite_planned(text: &str, cursor: usize, replacements: &[Replacement]) -> Result<RewriteOutcome, Error> {
    if replacements.is_empty() {
        return Ok(RewriteOutcome::unchanged(text, cursor));
    }

    let new_text = apply_replacements(text, replacements)?;
    let new_cursor = remap_offset(replacements, cursor, &new_text);
    return Ok(RewriteOutcome {
        changed: true,
        cursor: new_cursor,
        text: new_text,
    });
}
