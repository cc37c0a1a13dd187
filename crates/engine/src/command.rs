use std::sync::Arc;

use crate::doc::{
    block_text, blocks_between, inline_children, inline_len, marks_at, node_at, range_has_mark,
    slice_runs, ElementNode, Node, Selection, TextPos,
};
use crate::keymap::keymap;
use crate::plugin::Plugin;
use crate::schema::{is_in_set, MarkType};
use crate::state::{EditorState, Transaction};

/// An editing action split into an applicability query and the edit itself.
/// Menus call `can_apply` to decide visibility; dispatch calls `apply` and a
/// `None` means the command declined.
pub trait Command: Send + Sync {
    fn can_apply(&self, state: &EditorState) -> bool;
    fn apply(&self, state: &EditorState) -> Option<Transaction>;
}

/// Adapter building a command out of two closures.
pub struct CommandFn {
    can_apply: Box<dyn Fn(&EditorState) -> bool + Send + Sync>,
    apply: Box<dyn Fn(&EditorState) -> Option<Transaction> + Send + Sync>,
}

impl CommandFn {
    pub fn new(
        can_apply: impl Fn(&EditorState) -> bool + Send + Sync + 'static,
        apply: impl Fn(&EditorState) -> Option<Transaction> + Send + Sync + 'static,
    ) -> Arc<dyn Command> {
        Arc::new(CommandFn {
            can_apply: Box::new(can_apply),
            apply: Box::new(apply),
        })
    }
}

impl Command for CommandFn {
    fn can_apply(&self, state: &EditorState) -> bool {
        (self.can_apply)(state)
    }

    fn apply(&self, state: &EditorState) -> Option<Transaction> {
        (self.apply)(state)
    }
}

struct ToggleMark {
    mark: MarkType,
}

/// Toggles a mark: on a caret this flips the stored marks for the next
/// insertion, on a range it adds the mark everywhere unless any covered run
/// already carries it, in which case it removes it everywhere.
pub fn toggle_mark(mark: MarkType) -> Arc<dyn Command> {
    Arc::new(ToggleMark { mark })
}

impl Command for ToggleMark {
    fn can_apply(&self, state: &EditorState) -> bool {
        let Selection::Text { head, .. } = state.selection() else {
            return false;
        };
        let Some(Node::Element(el)) = node_at(state.doc(), &head.block) else {
            return false;
        };
        let Some(ty) = state.schema().node(&el.kind) else {
            return false;
        };
        ty.inline_content() && ty.allows_mark(&self.mark)
    }

    fn apply(&self, state: &EditorState) -> Option<Transaction> {
        if !self.can_apply(state) {
            return None;
        }
        let Selection::Text { anchor, head } = state.selection() else {
            return None;
        };
        let mut tr = state.tr();
        if anchor == head {
            let active = match state.stored_marks() {
                Some(stored) => is_in_set(stored, self.mark.name()),
                None => inline_children(state.doc(), &head.block)
                    .map(|children| is_in_set(&marks_at(children, head.offset), self.mark.name()))
                    .unwrap_or(false),
            };
            if active {
                tr.remove_stored_mark(self.mark.name());
            } else {
                tr.add_stored_mark(self.mark.create(None));
            }
            return Some(tr.source("command:toggle_mark"));
        }
        let spans = blocks_between(state.doc(), anchor, head);
        let active = spans.iter().any(|(path, range)| {
            inline_children(state.doc(), path)
                .map(|children| range_has_mark(children, range.clone(), self.mark.name()))
                .unwrap_or(false)
        });
        for (path, range) in spans {
            if range.is_empty() {
                continue;
            }
            if active {
                tr.remove_mark(&path, range, self.mark.name()).ok()?;
            } else {
                tr.add_mark(&path, range, self.mark.create(None)).ok()?;
            }
        }
        Some(tr.source("command:toggle_mark"))
    }
}

/// Deletes the selected range, keeping the first block's prefix and pulling
/// in the last block's suffix. Only ranges across sibling blocks join.
fn delete_range(
    tr: &mut Transaction,
    state: &EditorState,
    a: &TextPos,
    b: &TextPos,
) -> Option<()> {
    let spans = blocks_between(state.doc(), a, b);
    if spans.len() == 1 {
        let (path, range) = spans.into_iter().next()?;
        tr.replace_with_text(&path, range, vec![]).ok()?;
        return Some(());
    }
    let (first_path, first_range) = spans.first()?.clone();
    let (last_path, last_range) = spans.last()?.clone();
    let (first_ix, first_parent) = first_path.split_last()?;
    let (last_ix, last_parent) = last_path.split_last()?;
    if first_parent != last_parent {
        return None;
    }
    let last_children = inline_children(state.doc(), &last_path)?;
    let suffix = slice_runs(last_children, last_range.end..inline_len(last_children));
    tr.replace_with_text(&first_path, first_range.clone(), suffix)
        .ok()?;
    for ix in (first_ix + 1..=*last_ix).rev() {
        let mut path = first_parent.to_vec();
        path.push(ix);
        tr.remove_node(&path).ok()?;
    }
    tr.set_selection(Selection::caret(TextPos::new(
        first_path.clone(),
        first_range.start,
    )));
    Some(())
}

fn prev_boundary(text: &str, offset: usize) -> usize {
    let mut ix = offset.saturating_sub(1);
    while ix > 0 && !text.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn next_boundary(text: &str, offset: usize) -> usize {
    let mut ix = (offset + 1).min(text.len());
    while ix < text.len() && !text.is_char_boundary(ix) {
        ix += 1;
    }
    ix
}

struct DeleteBackward;

pub fn delete_backward() -> Arc<dyn Command> {
    Arc::new(DeleteBackward)
}

impl Command for DeleteBackward {
    fn can_apply(&self, state: &EditorState) -> bool {
        match state.selection() {
            Selection::Node { .. } => true,
            Selection::Text { anchor, head } => {
                anchor != head
                    || head.offset > 0
                    || head.block.last().map(|ix| *ix > 0).unwrap_or(false)
            }
        }
    }

    fn apply(&self, state: &EditorState) -> Option<Transaction> {
        let mut tr = state.tr();
        match state.selection() {
            Selection::Node { path } => {
                tr.remove_node(path).ok()?;
            }
            Selection::Text { anchor, head } if anchor != head => {
                delete_range(&mut tr, state, anchor, head)?;
            }
            Selection::Text { head, .. } => {
                if head.offset > 0 {
                    let text = block_text(state.doc(), &head.block);
                    let prev = prev_boundary(&text, head.offset);
                    tr.replace_with_text(&head.block, prev..head.offset, vec![])
                        .ok()?;
                } else {
                    // block start: join into the previous sibling
                    let (ix, parent) = head.block.split_last()?;
                    if *ix == 0 {
                        return None;
                    }
                    let mut prev_path = parent.to_vec();
                    prev_path.push(ix - 1);
                    let prev_children = inline_children(state.doc(), &prev_path)?;
                    if !prev_children.iter().all(|c| matches!(c, Node::Text(_))) {
                        return None;
                    }
                    let prev_len = inline_len(prev_children);
                    let children = inline_children(state.doc(), &head.block)?;
                    let moved = slice_runs(children, 0..inline_len(children));
                    tr.replace_with_text(&prev_path, prev_len..prev_len, moved)
                        .ok()?;
                    tr.remove_node(&head.block).ok()?;
                    tr.set_selection(Selection::caret(TextPos::new(prev_path, prev_len)));
                }
            }
        }
        Some(tr.source("command:delete"))
    }
}

struct DeleteForward;

pub fn delete_forward() -> Arc<dyn Command> {
    Arc::new(DeleteForward)
}

impl Command for DeleteForward {
    fn can_apply(&self, state: &EditorState) -> bool {
        match state.selection() {
            Selection::Node { .. } => true,
            Selection::Text { anchor, head } => {
                if anchor != head {
                    return true;
                }
                let len = block_text(state.doc(), &head.block).len();
                if head.offset < len {
                    return true;
                }
                let Some((ix, parent)) = head.block.split_last() else {
                    return false;
                };
                let mut next_path = parent.to_vec();
                next_path.push(ix + 1);
                node_at(state.doc(), &next_path).is_some()
            }
        }
    }

    fn apply(&self, state: &EditorState) -> Option<Transaction> {
        let mut tr = state.tr();
        match state.selection() {
            Selection::Node { path } => {
                tr.remove_node(path).ok()?;
            }
            Selection::Text { anchor, head } if anchor != head => {
                delete_range(&mut tr, state, anchor, head)?;
            }
            Selection::Text { head, .. } => {
                let text = block_text(state.doc(), &head.block);
                if head.offset < text.len() {
                    let next = next_boundary(&text, head.offset);
                    tr.replace_with_text(&head.block, head.offset..next, vec![])
                        .ok()?;
                } else {
                    // block end: pull the next sibling in
                    let (ix, parent) = head.block.split_last()?;
                    let mut next_path = parent.to_vec();
                    next_path.push(ix + 1);
                    let next_children = inline_children(state.doc(), &next_path)?;
                    if !next_children.iter().all(|c| matches!(c, Node::Text(_))) {
                        return None;
                    }
                    let moved = slice_runs(next_children, 0..inline_len(next_children));
                    tr.replace_with_text(&head.block, head.offset..head.offset, moved)
                        .ok()?;
                    tr.remove_node(&next_path).ok()?;
                    tr.set_selection(Selection::caret(head.clone()));
                }
            }
        }
        Some(tr.source("command:delete"))
    }
}

struct SplitBlock;

/// Splits the current block at the caret, carrying the tail runs into a new
/// sibling of the same kind. A range selection is deleted first.
pub fn split_block() -> Arc<dyn Command> {
    Arc::new(SplitBlock)
}

impl Command for SplitBlock {
    fn can_apply(&self, state: &EditorState) -> bool {
        let Selection::Text { head, .. } = state.selection() else {
            return false;
        };
        let Some(Node::Element(el)) = node_at(state.doc(), &head.block) else {
            return false;
        };
        state
            .schema()
            .node(&el.kind)
            .map(|ty| ty.inline_content())
            .unwrap_or(false)
    }

    fn apply(&self, state: &EditorState) -> Option<Transaction> {
        if !self.can_apply(state) {
            return None;
        }
        let Selection::Text { anchor, head } = state.selection() else {
            return None;
        };
        let mut tr = state.tr();
        if anchor != head {
            delete_range(&mut tr, state, anchor, head)?;
        }
        let head = match tr.selection() {
            Selection::Text { head, .. } => head.clone(),
            Selection::Node { .. } => return None,
        };
        let (len, tail, kind, attrs) = {
            let children = inline_children(tr.doc(), &head.block)?;
            let len = inline_len(children);
            let tail = slice_runs(children, head.offset..len);
            let Some(Node::Element(el)) = node_at(tr.doc(), &head.block) else {
                return None;
            };
            (len, tail, el.kind.clone(), el.attrs.clone())
        };
        tr.replace_with_text(&head.block, head.offset..len, vec![])
            .ok()?;
        let (ix, parent) = head.block.split_last()?;
        let mut new_path = parent.to_vec();
        new_path.push(ix + 1);
        let children = if tail.is_empty() {
            vec![Node::text("")]
        } else {
            tail.into_iter().map(Node::Text).collect()
        };
        tr.insert_node(
            &new_path,
            Node::Element(ElementNode {
                kind,
                attrs,
                children,
            }),
        )
        .ok()?;
        tr.set_selection(Selection::caret(TextPos::new(new_path, 0)));
        Some(tr.source("command:split_block"))
    }
}

/// Editing behavior every editor carries: backspace, forward delete, and
/// block splitting on enter.
pub fn base_keymap() -> Plugin {
    keymap(
        "keymap:base",
        vec![
            ("Backspace".to_string(), delete_backward()),
            ("Delete".to_string(), delete_forward()),
            ("Enter".to_string(), split_block()),
        ],
    )
}
