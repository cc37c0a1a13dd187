use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::schema::{Attrs, Mark};

pub type Path = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Document tree. Blocks with inline content hold `Text` runs only; the
/// editing steps keep that invariant by always splicing runs back in
/// normalized form (adjacent runs with equal mark sets merged, at least one
/// run per inline block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

impl Node {
    pub fn element(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            attrs: Attrs::default(),
            children,
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element("paragraph", vec![Node::text(text)])
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode::plain(text))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: String,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl TextNode {
    pub fn plain(text: impl Into<String>) -> Self {
        TextNode {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        TextNode {
            text: text.into(),
            marks,
        }
    }
}

/// A position inside a block's concatenated inline text. `offset` is a byte
/// offset; steps clamp it to char boundaries before slicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPos {
    #[serde(default)]
    pub block: Path,
    pub offset: usize,
}

impl TextPos {
    pub fn new(block: Path, offset: usize) -> Self {
        TextPos { block, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "selection", rename_all = "snake_case")]
pub enum Selection {
    Text { anchor: TextPos, head: TextPos },
    Node { path: Path },
}

impl Selection {
    pub fn caret(pos: TextPos) -> Selection {
        Selection::Text {
            anchor: pos.clone(),
            head: pos,
        }
    }

    pub fn is_caret(&self) -> bool {
        match self {
            Selection::Text { anchor, head } => anchor == head,
            Selection::Node { .. } => false,
        }
    }

    pub fn head(&self) -> Option<&TextPos> {
        match self {
            Selection::Text { head, .. } => Some(head),
            Selection::Node { .. } => None,
        }
    }
}

pub fn node_at<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = doc.children.get(*first)?;
    for ix in rest {
        let Node::Element(el) = node else {
            return None;
        };
        node = el.children.get(*ix)?;
    }
    Some(node)
}

pub(crate) fn node_at_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut node = doc.children.get_mut(*first)?;
    for ix in rest {
        let Node::Element(el) = node else {
            return None;
        };
        node = el.children.get_mut(*ix)?;
    }
    Some(node)
}

pub(crate) fn element_at_mut<'a>(
    doc: &'a mut Document,
    path: &[usize],
) -> Option<&'a mut ElementNode> {
    match node_at_mut(doc, path)? {
        Node::Element(el) => Some(el),
        Node::Text(_) => None,
    }
}

/// The sibling list holding children of `parent`; the empty path addresses
/// the document root.
pub(crate) fn sibling_list_mut<'a>(
    doc: &'a mut Document,
    parent: &[usize],
) -> Option<&'a mut Vec<Node>> {
    if parent.is_empty() {
        return Some(&mut doc.children);
    }
    element_at_mut(doc, parent).map(|el| &mut el.children)
}

pub fn inline_children<'a>(doc: &'a Document, block: &[usize]) -> Option<&'a [Node]> {
    match node_at(doc, block)? {
        Node::Element(el) => Some(&el.children),
        Node::Text(_) => None,
    }
}

pub fn block_text(doc: &Document, block: &[usize]) -> String {
    let Some(children) = inline_children(doc, block) else {
        return String::new();
    };
    children
        .iter()
        .filter_map(|node| match node {
            Node::Text(run) => Some(run.text.as_str()),
            Node::Element(_) => None,
        })
        .collect()
}

pub fn inline_len(children: &[Node]) -> usize {
    children
        .iter()
        .map(|node| match node {
            Node::Text(run) => run.text.len(),
            Node::Element(_) => 0,
        })
        .sum()
}

pub(crate) fn clamp_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut ix = offset.min(text.len());
    while ix > 0 && !text.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

/// Extracts the runs covering `range` as owned text nodes, split at the
/// range boundaries. Zero-width ranges yield nothing.
pub(crate) fn slice_runs(children: &[Node], range: Range<usize>) -> Vec<TextNode> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for node in children {
        let Node::Text(run) = node else {
            continue;
        };
        let start = cursor;
        let end = cursor + run.text.len();
        cursor = end;
        if end <= range.start || start >= range.end {
            continue;
        }
        let from = range.start.max(start) - start;
        let to = range.end.min(end) - start;
        if from >= to {
            continue;
        }
        out.push(TextNode {
            text: run.text[from..to].to_string(),
            marks: run.marks.clone(),
        });
    }
    out
}

fn merge_runs(runs: impl Iterator<Item = TextNode>) -> Vec<Node> {
    let mut merged: Vec<TextNode> = Vec::new();
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        if let Some(last) = merged.last_mut() {
            if last.marks == run.marks {
                last.text.push_str(&run.text);
                continue;
            }
        }
        merged.push(run);
    }
    if merged.is_empty() {
        merged.push(TextNode::plain(""));
    }
    merged.into_iter().map(Node::Text).collect()
}

/// Rebuilds a block's children with `range` replaced by `content`,
/// re-merging adjacent equal-mark runs.
pub(crate) fn replace_runs(
    children: &[Node],
    range: Range<usize>,
    content: &[TextNode],
) -> Vec<Node> {
    let total = inline_len(children);
    let prefix = slice_runs(children, 0..range.start);
    let suffix = slice_runs(children, range.end..total);
    merge_runs(
        prefix
            .into_iter()
            .chain(content.iter().cloned())
            .chain(suffix),
    )
}

/// Rewrites the mark set of every run slice inside `range`.
pub(crate) fn map_runs(
    children: &[Node],
    range: Range<usize>,
    f: impl Fn(&[Mark]) -> Vec<Mark>,
) -> Vec<Node> {
    let total = inline_len(children);
    let prefix = slice_runs(children, 0..range.start);
    let mut middle = slice_runs(children, range.start..range.end);
    for run in &mut middle {
        run.marks = f(&run.marks);
    }
    let suffix = slice_runs(children, range.end..total);
    merge_runs(prefix.into_iter().chain(middle).chain(suffix))
}

/// Marks inherited by text typed at `offset`: the marks of the run ending
/// there, or of the first run when the caret sits at the block start.
pub fn marks_at(children: &[Node], offset: usize) -> Vec<Mark> {
    let mut cursor = 0usize;
    let mut first: Option<&TextNode> = None;
    for node in children {
        let Node::Text(run) = node else {
            continue;
        };
        if first.is_none() {
            first = Some(run);
        }
        let start = cursor;
        let end = cursor + run.text.len();
        cursor = end;
        if offset > start && offset <= end {
            return run.marks.clone();
        }
    }
    first.map(|run| run.marks.clone()).unwrap_or_default()
}

pub fn range_has_mark(children: &[Node], range: Range<usize>, name: &str) -> bool {
    slice_runs(children, range)
        .iter()
        .any(|run| run.marks.iter().any(|m| m.name == name))
}

/// Inline spans covered by a text selection, in document order. Endpoints in
/// different blocks expand to whole-block spans for the siblings between
/// them; endpoints under different parents degrade to the two endpoint
/// spans.
pub fn blocks_between(doc: &Document, from: &TextPos, to: &TextPos) -> Vec<(Path, Range<usize>)> {
    let (a, b) = if (&from.block, from.offset) <= (&to.block, to.offset) {
        (from, to)
    } else {
        (to, from)
    };
    if a.block == b.block {
        return vec![(a.block.clone(), a.offset..b.offset)];
    }
    let len_of = |path: &[usize]| inline_children(doc, path).map(inline_len).unwrap_or(0);
    let (Some((a_ix, a_parent)), Some((b_ix, b_parent))) =
        (a.block.split_last(), b.block.split_last())
    else {
        return vec![(a.block.clone(), a.offset..len_of(&a.block))];
    };
    let mut out = vec![(a.block.clone(), a.offset..len_of(&a.block))];
    if a_parent == b_parent {
        for ix in a_ix + 1..*b_ix {
            let mut path = a_parent.to_vec();
            path.push(ix);
            let len = len_of(&path);
            out.push((path, 0..len));
        }
    }
    out.push((b.block.clone(), 0..b.offset));
    out
}

/// Plain text of the document, one line per block.
pub fn text_content(doc: &Document) -> String {
    fn walk(nodes: &[Node], parts: &mut Vec<String>) {
        for node in nodes {
            match node {
                Node::Element(el) => {
                    if el.children.iter().any(|c| matches!(c, Node::Text(_))) {
                        let text: String = el
                            .children
                            .iter()
                            .filter_map(|c| match c {
                                Node::Text(run) => Some(run.text.as_str()),
                                Node::Element(_) => None,
                            })
                            .collect();
                        parts.push(text);
                    } else {
                        walk(&el.children, parts);
                    }
                }
                Node::Text(run) => parts.push(run.text.clone()),
            }
        }
    }
    let mut parts = Vec::new();
    walk(&doc.children, &mut parts);
    parts.join("\n")
}

/// The caret position at the start of the first block holding inline text.
pub fn first_text_pos(doc: &Document) -> Option<TextPos> {
    fn walk(nodes: &[Node], path: &mut Vec<usize>) -> Option<TextPos> {
        for (ix, node) in nodes.iter().enumerate() {
            let Node::Element(el) = node else {
                continue;
            };
            path.push(ix);
            if el.children.iter().any(|c| matches!(c, Node::Text(_))) {
                return Some(TextPos::new(path.clone(), 0));
            }
            if let Some(found) = walk(&el.children, path) {
                return Some(found);
            }
            path.pop();
        }
        None
    }
    let mut path = Vec::new();
    walk(&doc.children, &mut path)
}
