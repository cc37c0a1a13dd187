use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::doc::{block_text, clamp_to_char_boundary, Path, Selection};
use crate::plugin::Plugin;
use crate::state::{EditorState, Transaction};

/// Longest stretch of text before the caret a rule pattern gets to see.
pub const MAX_MATCH: usize = 500;

/// Rewrites freshly typed text when a pattern completes under the caret.
/// The pattern is run against the text before the caret plus the text just
/// typed, and should anchor to the end with `$`.
#[derive(Clone)]
pub struct InputRule {
    pattern: Regex,
    handler: Arc<dyn Fn(&EditorState, &RuleMatch) -> Option<Transaction> + Send + Sync>,
}

impl InputRule {
    pub fn new(
        pattern: Regex,
        handler: impl Fn(&EditorState, &RuleMatch) -> Option<Transaction> + Send + Sync + 'static,
    ) -> InputRule {
        InputRule {
            pattern,
            handler: Arc::new(handler),
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl fmt::Debug for InputRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRule")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Where a rule matched. `start..end` are byte offsets into the block's
/// inline text of the document the handler's transaction starts from; the
/// typed text itself is not in that document yet, so `end` is the caret.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub block: Path,
    pub start: usize,
    pub end: usize,
    captures: Vec<Option<String>>,
}

impl RuleMatch {
    pub fn capture(&self, ix: usize) -> Option<&str> {
        self.captures.get(ix).and_then(|c| c.as_deref())
    }
}

pub fn input_rules(rules: Vec<InputRule>) -> Plugin {
    Plugin::new("input_rules").with_input_rules(rules)
}

/// Offers freshly typed text to every registered input rule, in plugin
/// order. The first rule whose handler produces a transaction wins; a match
/// only counts when it ends exactly at the caret.
pub fn run_input_rules(state: &EditorState, typed: &str) -> Option<Transaction> {
    if typed.is_empty() {
        return None;
    }
    let Selection::Text { anchor, head } = state.selection() else {
        return None;
    };
    if anchor != head {
        return None;
    }
    let text = block_text(state.doc(), &head.block);
    let caret = clamp_to_char_boundary(&text, head.offset);
    let mut window_start = caret.saturating_sub(MAX_MATCH);
    while window_start < caret && !text.is_char_boundary(window_start) {
        window_start += 1;
    }
    let mut window = text[window_start..caret].to_string();
    window.push_str(typed);
    for plugin in state.plugins() {
        let Some(rules) = plugin.input_rules() else {
            continue;
        };
        for rule in rules {
            let Some(caps) = rule.pattern.captures(&window) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.end() != window.len() {
                continue;
            }
            let rule_match = RuleMatch {
                block: head.block.clone(),
                start: (window_start + whole.start()).min(caret),
                end: caret,
                captures: caps
                    .iter()
                    .map(|c| c.map(|m| m.as_str().to_string()))
                    .collect(),
            };
            if let Some(tr) = (*rule.handler)(state, &rule_match) {
                log::debug!(
                    "input rule {:?} fired in {:?} at {}..{}",
                    rule.pattern.as_str(),
                    plugin.name(),
                    rule_match.start,
                    rule_match.end
                );
                return Some(tr);
            }
        }
    }
    None
}
