use once_cell::sync::Lazy;
use regex::Regex;

use prose_engine::{toggle_mark, InputRule, KeyBindings, MarkSpec};

use crate::extension::{Extension, ExtensionError, ExtensionType, SchemaSlot};
use crate::menu::{MenuEntry, MenuIcon};
use crate::rules::mark_input_rule;

// the trailing [^*] keeps a `**` run from being claimed as emphasis
static EMPHASIS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*]+)\*([^*])$").expect("emphasis pattern is valid"));

/// Italic text: `<em>` markup, `*` markdown, Mod-i, and the `*text*` input
/// rule.
#[derive(Default)]
pub struct EmphasisExtension {
    slot: SchemaSlot,
}

impl EmphasisExtension {
    pub fn new() -> EmphasisExtension {
        EmphasisExtension::default()
    }
}

impl Extension for EmphasisExtension {
    fn name(&self) -> &str {
        "Emphasis"
    }

    fn types(&self) -> Vec<ExtensionType> {
        vec![ExtensionType::Mark]
    }

    fn schema_slot(&self) -> &SchemaSlot {
        &self.slot
    }

    fn mark_spec(&self) -> Option<MarkSpec> {
        Some(MarkSpec {
            tag: "em".to_string(),
            markdown: Some("*".to_string()),
        })
    }

    fn keymap(&self) -> Result<KeyBindings, ExtensionError> {
        let mark = self.mark_type()?;
        Ok(vec![("Mod-i".to_string(), toggle_mark(mark))])
    }

    fn input_rules(&self) -> Result<Vec<InputRule>, ExtensionError> {
        let mark = self.mark_type()?;
        Ok(vec![mark_input_rule(EMPHASIS_PATTERN.clone(), mark, None)])
    }

    fn menu(&self) -> Result<Vec<MenuEntry>, ExtensionError> {
        let mark = self.mark_type()?;
        Ok(vec![MenuEntry {
            command: toggle_mark(mark),
            icon: MenuIcon {
                material: Some("format_italic".to_string()),
                ..MenuIcon::default()
            },
            label: self.name().to_string(),
        }])
    }
}
