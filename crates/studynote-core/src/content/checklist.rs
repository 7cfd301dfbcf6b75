//! Checklist lines of To-Do List notes.
//!
//! A checklist line is a list item that is a direct child of a top-level
//! list (a list not nested inside another list item). Lines are numbered in
//! document order. A line is either pending (no completion styling) or done
//! (strikethrough plus muted color). Styling that the done state overrides is
//! stashed in `data-prev-*` attributes and restored on the way back, so a
//! double toggle reproduces the original tree exactly. A line that arrives
//! done with styling `mark_done` would not reproduce (another declaration
//! order, another color, extra decorations) keeps that styling in
//! `data-done-style` while pending.

use super::tree::{Element, ElementKind, Node, RichText, StyleSet};
use crate::error::{NoteError, Result};
use serde::{Deserialize, Serialize};

/// Text color applied to completed lines.
pub const DONE_COLOR: &str = "#9ca3af";

const DONE_STYLE: [(&str, &str); 2] = [
    ("text-decoration", "line-through"),
    ("color", DONE_COLOR),
];

const STASH_PREFIX: &str = "data-prev-";

const DONE_SNAPSHOT_ATTR: &str = "data-done-style";

/// Completion state of one checklist line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineState {
    Pending,
    Done,
}

impl LineState {
    fn of(item: &Element) -> Self {
        match item.style.get("text-decoration") {
            Some(value) if value.contains("line-through") => Self::Done,
            _ => Self::Pending,
        }
    }
}

fn collect_lines<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.kind.is_list() {
                out.extend(
                    element
                        .children
                        .iter()
                        .filter_map(Node::as_element)
                        .filter(|child| child.kind == ElementKind::ListItem),
                );
            } else {
                collect_lines(&element.children, out);
            }
        }
    }
}

fn collect_lines_mut<'a>(nodes: &'a mut [Node], out: &mut Vec<&'a mut Element>) {
    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            if element.kind.is_list() {
                for child in element.children.iter_mut() {
                    if let Node::Element(item) = child
                        && item.kind == ElementKind::ListItem
                    {
                        out.push(item);
                    }
                }
            } else {
                collect_lines_mut(&mut element.children, out);
            }
        }
    }
}

/// Returns the states of all checklist lines in order.
pub fn line_states(content: &RichText) -> Vec<LineState> {
    let mut lines = Vec::new();
    collect_lines(&content.nodes, &mut lines);
    lines.into_iter().map(LineState::of).collect()
}

/// Number of checklist lines.
pub fn line_count(content: &RichText) -> usize {
    line_states(content).len()
}

fn mark_done(item: &mut Element) {
    let snapshot = item.remove_attr(DONE_SNAPSHOT_ATTR);
    for (property, value) in DONE_STYLE {
        if let Some(previous) = item.style.get(property).map(str::to_string) {
            item.attrs
                .push((format!("{}{}", STASH_PREFIX, property), previous));
        }
        item.style.set(property, value);
    }
    if let Some(style) = snapshot {
        item.style = StyleSet::parse(&style);
    }
}

fn mark_pending(item: &mut Element) {
    let done_style = item.style.clone();
    for (property, _) in DONE_STYLE {
        match item.remove_attr(&format!("{}{}", STASH_PREFIX, property)) {
            Some(previous) => item.style.set(property, previous),
            None => {
                item.style.remove(property);
            }
        }
    }

    let mut redone = item.clone();
    mark_done(&mut redone);
    if redone.style != done_style {
        item.attrs.push((DONE_SNAPSHOT_ATTR.to_string(), done_style.render()));
    }
}

/// Flips one checklist line and returns the updated content.
///
/// Sibling lines and everything outside the line's own style are left
/// untouched. Fails with `NotFound` when `line_index` is out of range.
pub fn toggle_line(content: &RichText, line_index: usize) -> Result<(RichText, LineState)> {
    let mut updated = content.clone();
    let mut lines = Vec::new();
    collect_lines_mut(&mut updated.nodes, &mut lines);
    let total = lines.len();

    let item = lines
        .into_iter()
        .nth(line_index)
        .ok_or_else(|| NoteError::not_found("ChecklistLine", format!("{} of {}", line_index, total)))?;

    let new_state = match LineState::of(item) {
        LineState::Pending => {
            mark_done(item);
            LineState::Done
        }
        LineState::Done => {
            mark_pending(item);
            LineState::Pending
        }
    };

    Ok((updated, new_state))
}
