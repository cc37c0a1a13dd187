use std::sync::Arc;

use regex::Regex;

use prose_engine::{
    blocks_between, inline_children, is_in_set, marks_at, node_at, range_has_mark, Attrs,
    Document, EditorState, InputRule, MarkType, Node, RuleMatch, Schema, Selection, TextNode,
    TextPos,
};

/// Whether the mark is present at the selection: for a caret the stored
/// marks, falling back to the marks under the caret; for a range, any
/// covered run carrying it.
pub fn mark_active(state: &EditorState, mark: &MarkType) -> bool {
    match state.selection() {
        Selection::Text { anchor, head } if anchor == head => {
            if let Some(stored) = state.stored_marks() {
                return is_in_set(stored, mark.name());
            }
            inline_children(state.doc(), &head.block)
                .map(|children| is_in_set(&marks_at(children, head.offset), mark.name()))
                .unwrap_or(false)
        }
        Selection::Text { anchor, head } => blocks_between(state.doc(), anchor, head)
            .iter()
            .any(|(path, range)| {
                inline_children(state.doc(), path)
                    .map(|children| range_has_mark(children, range.clone(), mark.name()))
                    .unwrap_or(false)
            }),
        Selection::Node { .. } => false,
    }
}

/// Whether the mark may be applied anywhere in the given ranges: some
/// traversed block must host inline content and admit the mark. An empty
/// block path asks the top node directly.
pub fn mark_applies(
    doc: &Document,
    schema: &Schema,
    ranges: &[(TextPos, TextPos)],
    mark: &MarkType,
) -> bool {
    for (from, to) in ranges {
        if from.block.is_empty() {
            if let Some(top) = schema.top_node() {
                if top.allows_mark(mark) {
                    return true;
                }
            }
            continue;
        }
        for (path, _) in blocks_between(doc, from, to) {
            let Some(Node::Element(el)) = node_at(doc, &path) else {
                continue;
            };
            let Some(ty) = schema.node(&el.kind) else {
                continue;
            };
            if ty.inline_content() && ty.allows_mark(mark) {
                return true;
            }
        }
    }
    false
}

/// The standard mark-wrapping input rule. When `pattern` completes before
/// the caret, the matched text is replaced by the first capture with the
/// mark applied, the mark is dropped from the stored marks so typing
/// continues unmarked, and the second capture (the trailing character the
/// pattern consumed) is inserted plain. The rule declines in blocks whose
/// node type does not admit the mark, letting the text through untouched.
pub fn mark_input_rule(
    pattern: Regex,
    mark: MarkType,
    get_attrs: Option<Arc<dyn Fn(&RuleMatch) -> Attrs + Send + Sync>>,
) -> InputRule {
    InputRule::new(pattern, move |state, m| {
        let Selection::Text { .. } = state.selection() else {
            return None;
        };
        let from = TextPos::new(m.block.clone(), m.start);
        let to = TextPos::new(m.block.clone(), m.end);
        if !mark_applies(state.doc(), state.schema(), &[(from, to)], &mark) {
            return None;
        }
        let inner = m.capture(1).unwrap_or_default().to_string();
        let trailing = m.capture(2).unwrap_or_default().to_string();
        let mut tr = state.tr();
        tr.replace_with_text(&m.block, m.start..m.end, vec![TextNode::plain(inner)])
            .ok()?;
        let start = tr.map_offset(&m.block, m.start);
        let end = tr.map_offset(&m.block, m.end);
        let attrs = get_attrs.as_ref().map(|f| (**f)(m));
        tr.add_mark(&m.block, start..end, mark.create(attrs)).ok()?;
        tr.remove_stored_mark(mark.name());
        tr.insert_text(&trailing).ok()?;
        Some(tr.source("input_rule:mark"))
    })
}
