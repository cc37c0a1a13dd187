use once_cell::sync::OnceCell;
use thiserror::Error;

use prose_engine::{InputRule, KeyBindings, MarkSpec, MarkType, NodeSpec, NodeType, Schema};

use crate::menu::MenuEntry;

/// The capabilities an extension may declare. Closed on purpose: the schema
/// assembler keys its behavior off this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    Mark,
    Node,
}

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("extension {0:?} was used before its schema was bound")]
    UnboundSchema(String),
    #[error("schema has no mark type named {0:?}")]
    UnknownMarkType(String),
    #[error("schema has no node type named {0:?}")]
    UnknownNodeType(String),
}

/// Write-once slot for the back-reference from an extension to the schema
/// it was assembled into.
#[derive(Default)]
pub struct SchemaSlot {
    cell: OnceCell<Schema>,
}

impl SchemaSlot {
    pub fn new() -> SchemaSlot {
        SchemaSlot::default()
    }

    /// Returns false when the slot already holds a schema.
    pub(crate) fn bind(&self, schema: Schema) -> bool {
        self.cell.set(schema).is_ok()
    }

    pub fn get(&self) -> Option<&Schema> {
        self.cell.get()
    }

    pub fn is_bound(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// A self-describing editor feature. Extensions declare their schema types
/// up front and contribute key bindings, input rules, and menu entries once
/// the assembled schema has been bound into their slot.
///
/// `name` doubles as the schema type name for whichever capabilities the
/// extension declares.
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    fn types(&self) -> Vec<ExtensionType>;

    fn schema_slot(&self) -> &SchemaSlot;

    fn mark_spec(&self) -> Option<MarkSpec> {
        None
    }

    fn node_spec(&self) -> Option<NodeSpec> {
        None
    }

    fn keymap(&self) -> Result<KeyBindings, ExtensionError> {
        Ok(Vec::new())
    }

    fn input_rules(&self) -> Result<Vec<InputRule>, ExtensionError> {
        Ok(Vec::new())
    }

    fn menu(&self) -> Result<Vec<MenuEntry>, ExtensionError> {
        Ok(Vec::new())
    }

    fn schema(&self) -> Result<&Schema, ExtensionError> {
        self.schema_slot()
            .get()
            .ok_or_else(|| ExtensionError::UnboundSchema(self.name().to_string()))
    }

    fn mark_type(&self) -> Result<MarkType, ExtensionError> {
        self.schema()?
            .mark(self.name())
            .ok_or_else(|| ExtensionError::UnknownMarkType(self.name().to_string()))
    }

    fn node_type(&self) -> Result<NodeType, ExtensionError> {
        self.schema()?
            .node(self.name())
            .ok_or_else(|| ExtensionError::UnknownNodeType(self.name().to_string()))
    }
}
