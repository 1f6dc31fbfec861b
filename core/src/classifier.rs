//! Edit classification.
//!
//! A pure function from (confirmed text, revealed text, accepted raw text,
//! cursor) to a plan. The engine applies the plan; nothing here mutates
//! state.

use crate::graphemes;

/// Shape of an accepted edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// New text after the confirmed text
    Append,
    /// Text got shorter
    Delete,
    /// Text got longer somewhere other than the end
    Insert,
    /// Anything else (same length, different content)
    Replace,
}

/// What the engine should do with an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Accepted text equals confirmed text (e.g. a cursor move)
    Unchanged,
    /// Apply without animation and settle right away
    Immediate(EditKind),
    /// Roll the field back to revealed text and type `chars` in
    Reveal {
        kind: EditKind,
        chars: String,
        insertion_index: usize,
        target_cursor: usize,
    },
}

/// Classify `accepted` against `confirmed`.
///
/// `cursor` is the grapheme offset reported by the host, already clamped to
/// the accepted text. Append is checked first: it is the common case and the
/// insert heuristic would place its characters differently.
pub fn classify(confirmed: &str, revealed: &str, accepted: &str, cursor: usize) -> Plan {
    if accepted == confirmed {
        return Plan::Unchanged;
    }

    let confirmed_len = graphemes::len(confirmed);
    let accepted_len = graphemes::len(accepted);

    if accepted_len < confirmed_len {
        return Plan::Immediate(EditKind::Delete);
    }
    if accepted_len == confirmed_len {
        return Plan::Immediate(EditKind::Replace);
    }

    // Prefix must end on a cluster boundary of the new text, otherwise a
    // combining mark typed after the last char would be split off.
    if graphemes::prefix(accepted, confirmed_len) == confirmed {
        return Plan::Reveal {
            kind: EditKind::Append,
            chars: accepted[confirmed.len()..].to_string(),
            insertion_index: graphemes::len(revealed),
            target_cursor: accepted_len,
        };
    }

    let added = accepted_len - confirmed_len;
    let insert_offset = cursor.saturating_sub(added);
    let chars = graphemes::slice(accepted, insert_offset, insert_offset + added).to_string();
    let insertion_index = insert_offset.min(graphemes::len(revealed));

    // The offset heuristic is an approximation (paste with a jumped caret,
    // multi-caret edits). Only animate when the splice lands on the text the
    // user actually has.
    let mut spliced = revealed.to_string();
    graphemes::insert(&mut spliced, insertion_index, &chars);
    if spliced != accepted {
        return Plan::Immediate(EditKind::Replace);
    }

    Plan::Reveal {
        kind: EditKind::Insert,
        chars,
        insertion_index,
        target_cursor: cursor,
    }
}
