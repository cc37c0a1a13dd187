use once_cell::sync::Lazy;
use regex::Regex;

use prose_engine::{toggle_mark, InputRule, KeyBindings, MarkSpec};

use crate::extension::{Extension, ExtensionError, ExtensionType, SchemaSlot};
use crate::menu::{MenuEntry, MenuIcon};
use crate::rules::mark_input_rule;

static STRONG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*(.)$").expect("strong pattern is valid"));

/// Bold text: `<strong>` markup, `**` markdown, Mod-b, and the `**text**`
/// input rule.
#[derive(Default)]
pub struct StrongExtension {
    slot: SchemaSlot,
}

impl StrongExtension {
    pub fn new() -> StrongExtension {
        StrongExtension::default()
    }
}

impl Extension for StrongExtension {
    fn name(&self) -> &str {
        "Strong"
    }

    fn types(&self) -> Vec<ExtensionType> {
        vec![ExtensionType::Mark]
    }

    fn schema_slot(&self) -> &SchemaSlot {
        &self.slot
    }

    fn mark_spec(&self) -> Option<MarkSpec> {
        Some(MarkSpec {
            tag: "strong".to_string(),
            markdown: Some("**".to_string()),
        })
    }

    fn keymap(&self) -> Result<KeyBindings, ExtensionError> {
        let mark = self.mark_type()?;
        Ok(vec![
            ("Mod-b".to_string(), toggle_mark(mark.clone())),
            ("Mod-B".to_string(), toggle_mark(mark)),
        ])
    }

    fn input_rules(&self) -> Result<Vec<InputRule>, ExtensionError> {
        let mark = self.mark_type()?;
        Ok(vec![mark_input_rule(STRONG_PATTERN.clone(), mark, None)])
    }

    fn menu(&self) -> Result<Vec<MenuEntry>, ExtensionError> {
        let mark = self.mark_type()?;
        Ok(vec![MenuEntry {
            command: toggle_mark(mark),
            icon: MenuIcon {
                material: Some("format_bold".to_string()),
                ..MenuIcon::default()
            },
            label: self.name().to_string(),
        }])
    }
}
