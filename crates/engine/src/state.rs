use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::doc::{
    first_text_pos, inline_children, marks_at, Document, Node, Selection, TextNode, TextPos,
};
use crate::plugin::Plugin;
use crate::schema::{add_to_set, remove_from_set, Mark, Schema};
use crate::steps::{apply_step, map_selection, map_text_pos, ApplyError, Step};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default = "default_add_to_history")]
    pub add_to_history: bool,
}

fn default_add_to_history() -> bool {
    true
}

impl Default for TransactionMeta {
    fn default() -> Self {
        TransactionMeta {
            source: None,
            add_to_history: true,
        }
    }
}

pub struct StateConfig {
    pub schema: Schema,
    pub doc: Option<Document>,
    pub selection: Option<Selection>,
    pub plugins: Vec<Plugin>,
}

/// Immutable editor state. `apply` never mutates; it builds the next state
/// and hands the transaction to every plugin observer.
#[derive(Clone)]
pub struct EditorState {
    schema: Schema,
    doc: Document,
    selection: Selection,
    stored_marks: Option<Vec<Mark>>,
    plugins: Arc<Vec<Plugin>>,
}

impl EditorState {
    pub fn create(config: StateConfig) -> EditorState {
        let doc = config.doc.unwrap_or_else(|| seed_doc(&config.schema));
        let selection = config.selection.unwrap_or_else(|| {
            first_text_pos(&doc)
                .map(Selection::caret)
                .unwrap_or_else(|| Selection::caret(TextPos::new(vec![0], 0)))
        });
        EditorState {
            schema: config.schema,
            doc,
            selection,
            stored_marks: None,
            plugins: Arc::new(config.plugins),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Marks applied to the next insertion instead of the ones under the
    /// caret. `None` means "derive from the document".
    pub fn stored_marks(&self) -> Option<&[Mark]> {
        self.stored_marks.as_deref()
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn tr(&self) -> Transaction {
        Transaction::new(self)
    }

    pub fn apply(&self, tr: Transaction) -> EditorState {
        let stored_marks = if tr.stored_marks_set {
            tr.stored_marks.clone()
        } else if tr.doc_changed() {
            None
        } else {
            self.stored_marks.clone()
        };
        let next = EditorState {
            schema: self.schema.clone(),
            doc: tr.doc.clone(),
            selection: tr.selection.clone(),
            stored_marks,
            plugins: Arc::clone(&self.plugins),
        };
        for plugin in self.plugins.iter() {
            if let Some(observer) = plugin.observer() {
                (**observer)(&tr, self, &next);
            }
        }
        next
    }
}

fn seed_doc(schema: &Schema) -> Document {
    let kind = schema
        .default_block()
        .map(|t| t.name().to_string())
        .unwrap_or_else(|| "paragraph".to_string());
    Document {
        children: vec![Node::element(kind, vec![Node::text("")])],
    }
}

/// An edit in progress. Holds a working copy of the document; every mutator
/// applies its steps immediately, records the inverses, and maps the
/// selection, so later mutators see the intermediate document.
pub struct Transaction {
    schema: Schema,
    doc: Document,
    selection: Selection,
    stored_marks: Option<Vec<Mark>>,
    stored_marks_set: bool,
    steps: Vec<Step>,
    inverses: Vec<Step>,
    meta: TransactionMeta,
}

impl Transaction {
    fn new(state: &EditorState) -> Transaction {
        Transaction {
            schema: state.schema.clone(),
            doc: state.doc.clone(),
            selection: state.selection.clone(),
            stored_marks: state.stored_marks.clone(),
            stored_marks_set: false,
            steps: Vec::new(),
            inverses: Vec::new(),
            meta: TransactionMeta::default(),
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn stored_marks(&self) -> Option<&[Mark]> {
        self.stored_marks.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn inverses(&self) -> &[Step] {
        &self.inverses
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn meta(&self) -> &TransactionMeta {
        &self.meta
    }

    pub fn source(mut self, source: impl Into<String>) -> Transaction {
        self.meta.source = Some(source.into());
        self
    }

    pub fn skip_history(mut self) -> Transaction {
        self.meta.add_to_history = false;
        self
    }

    pub(crate) fn step(&mut self, step: Step) -> Result<(), ApplyError> {
        let inverse = apply_step(&mut self.doc, &self.schema, &step)?;
        self.selection = map_selection(&step, &self.selection);
        self.steps.push(step);
        self.inverses.push(inverse);
        Ok(())
    }

    pub fn replace_with_text(
        &mut self,
        block: &[usize],
        range: Range<usize>,
        content: Vec<TextNode>,
    ) -> Result<(), ApplyError> {
        self.step(Step::ReplaceInline {
            block: block.to_vec(),
            range,
            content,
        })
    }

    /// Inserts at the selection head, carrying the stored marks when set and
    /// the marks under the caret otherwise. Leaves the caret after the
    /// inserted text.
    pub fn insert_text(&mut self, text: &str) -> Result<(), ApplyError> {
        if text.is_empty() {
            return Ok(());
        }
        let Selection::Text { head, .. } = &self.selection else {
            return Err(ApplyError::NotTextSelection);
        };
        let block = head.block.clone();
        let at = head.offset;
        let marks = match &self.stored_marks {
            Some(stored) => stored.clone(),
            None => inline_children(&self.doc, &block)
                .map(|children| marks_at(children, at))
                .unwrap_or_default(),
        };
        self.replace_with_text(&block, at..at, vec![TextNode::marked(text, marks)])?;
        self.set_selection(Selection::caret(TextPos::new(block, at + text.len())));
        Ok(())
    }

    pub fn add_mark(
        &mut self,
        block: &[usize],
        range: Range<usize>,
        mark: Mark,
    ) -> Result<(), ApplyError> {
        self.step(Step::AddMark {
            block: block.to_vec(),
            range,
            mark,
        })
    }

    pub fn remove_mark(
        &mut self,
        block: &[usize],
        range: Range<usize>,
        mark: impl Into<String>,
    ) -> Result<(), ApplyError> {
        self.step(Step::RemoveMark {
            block: block.to_vec(),
            range,
            mark: mark.into(),
        })
    }

    pub fn add_stored_mark(&mut self, mark: Mark) {
        let current = self.effective_stored_marks();
        self.stored_marks = Some(add_to_set(&self.schema, mark, &current));
        self.stored_marks_set = true;
    }

    pub fn remove_stored_mark(&mut self, name: &str) {
        let current = self.effective_stored_marks();
        self.stored_marks = Some(remove_from_set(&current, name));
        self.stored_marks_set = true;
    }

    fn effective_stored_marks(&self) -> Vec<Mark> {
        if let Some(stored) = &self.stored_marks {
            return stored.clone();
        }
        let Some(head) = self.selection.head() else {
            return Vec::new();
        };
        inline_children(&self.doc, &head.block)
            .map(|children| marks_at(children, head.offset))
            .unwrap_or_default()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn insert_node(&mut self, path: &[usize], node: Node) -> Result<(), ApplyError> {
        self.step(Step::InsertNode {
            path: path.to_vec(),
            node,
        })
    }

    pub fn remove_node(&mut self, path: &[usize]) -> Result<(), ApplyError> {
        self.step(Step::RemoveNode {
            path: path.to_vec(),
        })
    }

    /// Maps a position in the transaction's base document through every step
    /// applied so far.
    pub fn map_offset(&self, block: &[usize], offset: usize) -> usize {
        let mut pos = TextPos::new(block.to_vec(), offset);
        for step in &self.steps {
            pos = map_text_pos(step, &pos);
        }
        pos.offset
    }
}
