use crate::doc::{Document, Node, TextNode};
use crate::schema::{ChildConstraint, Schema};

/// Renders a document to markup using the schema's node tags, nesting mark
/// tags in rank order around each run.
pub struct HtmlSerializer {
    schema: Schema,
}

impl HtmlSerializer {
    pub fn from_schema(schema: &Schema) -> HtmlSerializer {
        HtmlSerializer {
            schema: schema.clone(),
        }
    }

    pub fn serialize_fragment(&self, doc: &Document) -> String {
        let mut out = String::new();
        self.serialize_nodes(&doc.children, &mut out);
        out
    }

    fn serialize_nodes(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Element(el) => {
                    let ty = self.schema.node(&el.kind);
                    let tag = ty.as_ref().and_then(|t| t.spec().tag.clone());
                    match tag {
                        Some(tag) => {
                            let childless = ty
                                .map(|t| t.spec().children == ChildConstraint::None)
                                .unwrap_or(false);
                            out.push_str(&format!("<{tag}>"));
                            if !childless {
                                self.serialize_nodes(&el.children, out);
                                out.push_str(&format!("</{tag}>"));
                            }
                        }
                        // untagged nodes render their content bare
                        None => self.serialize_nodes(&el.children, out),
                    }
                }
                Node::Text(run) => self.serialize_run(run, out),
            }
        }
    }

    fn serialize_run(&self, run: &TextNode, out: &mut String) {
        let tags: Vec<String> = run
            .marks
            .iter()
            .filter_map(|mark| self.schema.mark(&mark.name).map(|t| t.spec().tag.clone()))
            .collect();
        for tag in &tags {
            out.push_str(&format!("<{tag}>"));
        }
        out.push_str(&escape_html(&run.text));
        for tag in tags.iter().rev() {
            out.push_str(&format!("</{tag}>"));
        }
    }
}

/// Renders blocks as markdown paragraphs, wrapping runs in each mark's
/// symmetric delimiter. Marks without a delimiter render plain.
pub struct MarkdownSerializer {
    schema: Schema,
}

impl MarkdownSerializer {
    pub fn from_schema(schema: &Schema) -> MarkdownSerializer {
        MarkdownSerializer {
            schema: schema.clone(),
        }
    }

    pub fn serialize(&self, doc: &Document) -> String {
        let mut blocks = Vec::new();
        self.collect_blocks(&doc.children, &mut blocks);
        blocks.join("\n\n")
    }

    fn collect_blocks(&self, nodes: &[Node], blocks: &mut Vec<String>) {
        for node in nodes {
            match node {
                Node::Element(el) => {
                    if el.children.iter().any(|c| matches!(c, Node::Text(_))) {
                        let mut line = String::new();
                        for child in &el.children {
                            if let Node::Text(run) = child {
                                line.push_str(&self.inline_markdown(run));
                            }
                        }
                        blocks.push(line);
                    } else {
                        self.collect_blocks(&el.children, blocks);
                    }
                }
                Node::Text(run) => blocks.push(self.inline_markdown(run)),
            }
        }
    }

    fn inline_markdown(&self, run: &TextNode) -> String {
        let mut text = run.text.clone();
        // rank order outermost first, so fold the delimiters inside out
        for mark in run.marks.iter().rev() {
            let Some(delim) = self
                .schema
                .mark(&mark.name)
                .and_then(|t| t.spec().markdown.clone())
            else {
                continue;
            };
            text = format!("{delim}{text}{delim}");
        }
        text
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
