use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::doc::{
    block_text, clamp_to_char_boundary, element_at_mut, map_runs, replace_runs, sibling_list_mut,
    slice_runs, Document, Node, Path, Selection, TextNode, TextPos,
};
use crate::schema::{add_to_set, remove_from_set, Mark, Schema};

/// One primitive document edit. Applying a step returns its inverse, so a
/// transaction's inverse list replayed in reverse order restores the prior
/// document exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    ReplaceInline {
        #[serde(default)]
        block: Path,
        range: Range<usize>,
        #[serde(default)]
        content: Vec<TextNode>,
    },
    AddMark {
        #[serde(default)]
        block: Path,
        range: Range<usize>,
        mark: Mark,
    },
    RemoveMark {
        #[serde(default)]
        block: Path,
        range: Range<usize>,
        mark: String,
    },
    InsertNode {
        #[serde(default)]
        path: Path,
        node: Node,
    },
    RemoveNode {
        #[serde(default)]
        path: Path,
    },
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("selection does not address inline text")]
    NotTextSelection,
}

fn content_len(content: &[TextNode]) -> usize {
    content.iter().map(|run| run.text.len()).sum()
}

pub(crate) fn apply_step(
    doc: &mut Document,
    schema: &Schema,
    step: &Step,
) -> Result<Step, ApplyError> {
    match step {
        Step::ReplaceInline {
            block,
            range,
            content,
        } => {
            let text = block_text(doc, block);
            let start = clamp_to_char_boundary(&text, range.start);
            let end = clamp_to_char_boundary(&text, range.end).max(start);
            let el = element_at_mut(doc, block)
                .ok_or_else(|| ApplyError::InvalidPath(format!("replacing in {block:?}")))?;
            let removed = slice_runs(&el.children, start..end);
            el.children = replace_runs(&el.children, start..end, content);
            Ok(Step::ReplaceInline {
                block: block.clone(),
                range: start..start + content_len(content),
                content: removed,
            })
        }
        Step::AddMark { block, range, mark } => {
            let text = block_text(doc, block);
            let start = clamp_to_char_boundary(&text, range.start);
            let end = clamp_to_char_boundary(&text, range.end).max(start);
            let el = element_at_mut(doc, block)
                .ok_or_else(|| ApplyError::InvalidPath(format!("marking in {block:?}")))?;
            let before = slice_runs(&el.children, start..end);
            el.children = map_runs(&el.children, start..end, |marks| {
                add_to_set(schema, mark.clone(), marks)
            });
            Ok(Step::ReplaceInline {
                block: block.clone(),
                range: start..end,
                content: before,
            })
        }
        Step::RemoveMark { block, range, mark } => {
            let text = block_text(doc, block);
            let start = clamp_to_char_boundary(&text, range.start);
            let end = clamp_to_char_boundary(&text, range.end).max(start);
            let el = element_at_mut(doc, block)
                .ok_or_else(|| ApplyError::InvalidPath(format!("unmarking in {block:?}")))?;
            let before = slice_runs(&el.children, start..end);
            el.children = map_runs(&el.children, start..end, |marks| {
                remove_from_set(marks, mark)
            });
            Ok(Step::ReplaceInline {
                block: block.clone(),
                range: start..end,
                content: before,
            })
        }
        Step::InsertNode { path, node } => {
            let (ix, parent) = path
                .split_last()
                .ok_or_else(|| ApplyError::InvalidPath("inserting at root".to_string()))?;
            let siblings = sibling_list_mut(doc, parent)
                .ok_or_else(|| ApplyError::InvalidPath(format!("inserting at {path:?}")))?;
            if *ix > siblings.len() {
                return Err(ApplyError::InvalidPath(format!("inserting at {path:?}")));
            }
            siblings.insert(*ix, node.clone());
            Ok(Step::RemoveNode { path: path.clone() })
        }
        Step::RemoveNode { path } => {
            let (ix, parent) = path
                .split_last()
                .ok_or_else(|| ApplyError::InvalidPath("removing root".to_string()))?;
            let siblings = sibling_list_mut(doc, parent)
                .ok_or_else(|| ApplyError::InvalidPath(format!("removing {path:?}")))?;
            if *ix >= siblings.len() {
                return Err(ApplyError::InvalidPath(format!("removing {path:?}")));
            }
            let node = siblings.remove(*ix);
            Ok(Step::InsertNode {
                path: path.clone(),
                node,
            })
        }
    }
}

fn map_offset(range: &Range<usize>, inserted: usize, offset: usize) -> usize {
    if offset <= range.start {
        offset
    } else if offset >= range.end {
        offset - (range.end - range.start) + inserted
    } else {
        range.start + inserted
    }
}

fn map_path_insert(at: &[usize], path: &[usize]) -> Path {
    let mut out = path.to_vec();
    let Some(depth) = at.len().checked_sub(1) else {
        return out;
    };
    if path.len() > depth && path[..depth] == at[..depth] && path[depth] >= at[depth] {
        out[depth] += 1;
    }
    out
}

enum PathMap {
    Mapped(Path),
    Deleted(Path),
}

fn map_path_remove(at: &[usize], path: &[usize]) -> PathMap {
    let Some(depth) = at.len().checked_sub(1) else {
        return PathMap::Mapped(path.to_vec());
    };
    let mut out = path.to_vec();
    if path.len() > depth && path[..depth] == at[..depth] {
        if path.len() >= at.len() && path[..at.len()] == at[..] {
            // the addressed subtree is gone; settle on the left neighbor
            out.truncate(at.len());
            out[depth] = at[depth].saturating_sub(1);
            return PathMap::Deleted(out);
        }
        if path[depth] > at[depth] {
            out[depth] -= 1;
        }
    }
    PathMap::Mapped(out)
}

pub(crate) fn map_text_pos(step: &Step, pos: &TextPos) -> TextPos {
    match step {
        Step::ReplaceInline {
            block,
            range,
            content,
        } => {
            if &pos.block != block {
                return pos.clone();
            }
            TextPos::new(
                pos.block.clone(),
                map_offset(range, content_len(content), pos.offset),
            )
        }
        Step::AddMark { .. } | Step::RemoveMark { .. } => pos.clone(),
        Step::InsertNode { path, .. } => {
            TextPos::new(map_path_insert(path, &pos.block), pos.offset)
        }
        Step::RemoveNode { path } => match map_path_remove(path, &pos.block) {
            PathMap::Mapped(block) => TextPos::new(block, pos.offset),
            PathMap::Deleted(block) => TextPos::new(block, 0),
        },
    }
}

pub(crate) fn map_selection(step: &Step, sel: &Selection) -> Selection {
    match sel {
        Selection::Text { anchor, head } => Selection::Text {
            anchor: map_text_pos(step, anchor),
            head: map_text_pos(step, head),
        },
        Selection::Node { path } => match step {
            Step::InsertNode { path: at, .. } => Selection::Node {
                path: map_path_insert(at, path),
            },
            Step::RemoveNode { path: at } => match map_path_remove(at, path) {
                PathMap::Mapped(path) | PathMap::Deleted(path) => Selection::Node { path },
            },
            _ => sel.clone(),
        },
    }
}
