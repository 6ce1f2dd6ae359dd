//! Format-preserving substitution of placeholder node templates.
//!
//! A template may declare one abstract node flagged with a `substitute`
//! directive. Splicing removes that node and inserts, at the same ordinal
//! position, every node template from a capacity-definitions document. The
//! edit is line-based: everything outside the replaced block (comments,
//! quoting, ordering) is written back byte for byte.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use toscaforge_common::error::{Result, ToscaforgeError};
use toscaforge_model::template::NodeView;

/// Splices the capacity document's node templates over the placeholder in
/// `template_path`, rewriting the file in place.
///
/// Returns the number of node templates inserted.
///
/// # Errors
///
/// Returns an error when either file cannot be read or parsed, the template
/// has no `node_templates` section, or no placeholder node carries a
/// `substitute` directive.
pub fn splice_capacity(template_path: &Path, capacity_path: &Path) -> Result<usize> {
    let template_text = std::fs::read_to_string(template_path)
        .map_err(|source| ToscaforgeError::io(template_path, source))?;
    let capacity_text = std::fs::read_to_string(capacity_path)
        .map_err(|source| ToscaforgeError::io(capacity_path, source))?;

    let capacity: Value = serde_yaml::from_str(&capacity_text)?;
    let replacements = capacity_nodes(&capacity)?;

    // The directive check runs on the parsed document; the line ranges are
    // only used to carry out the rewrite once the node is known.
    let template: Value = serde_yaml::from_str(&template_text)?;
    let target = placeholder_name(&template)?;

    let lines: Vec<&str> = template_text.lines().collect();
    let section = find_section(&lines, "node_templates")?;
    let blocks = node_blocks(&lines, &section);

    let placeholder = blocks
        .iter()
        .find(|block| block_name(lines[block.start]) == target)
        .ok_or_else(|| ToscaforgeError::Document {
            message: format!("placeholder node '{target}' not found under node_templates"),
        })?;

    tracing::info!(
        template = %template_path.display(),
        nodes = replacements.len(),
        "splicing concrete node templates over placeholder"
    );

    let rendered = render_nodes(replacements, placeholder.indent)?;

    let mut out = String::new();
    for line in &lines[..placeholder.start] {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&rendered);
    for line in &lines[placeholder.end..] {
        out.push_str(line);
        out.push('\n');
    }
    if !template_text.ends_with('\n') {
        let _ = out.pop();
    }

    std::fs::write(template_path, out)
        .map_err(|source| ToscaforgeError::io(template_path, source))?;
    Ok(replacements.len())
}

/// Whether the template declares a node with a `substitute` directive.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn has_placeholder(template_path: &Path) -> Result<bool> {
    let text = std::fs::read_to_string(template_path)
        .map_err(|source| ToscaforgeError::io(template_path, source))?;
    let template: Value = serde_yaml::from_str(&text)?;
    Ok(placeholder_name(&template).is_ok())
}

/// The name of the node carrying a `substitute` directive.
fn placeholder_name(template: &Value) -> Result<&str> {
    let nodes = template
        .get("service_template")
        .and_then(|st| st.get("node_templates"))
        .or_else(|| template.get("node_templates"))
        .and_then(Value::as_mapping)
        .ok_or_else(|| ToscaforgeError::Document {
            message: "template has no node_templates".into(),
        })?;
    nodes
        .iter()
        .filter_map(|(name, data)| name.as_str().map(|n| NodeView::new(n, data)))
        .find(|node| node.has_directive("substitute"))
        .map(|node| node.name())
        .ok_or_else(|| ToscaforgeError::Document {
            message: "no placeholder node with a 'substitute' directive found".into(),
        })
}

/// The node templates of a capacity document, from
/// `service_template.node_templates` or a top-level `node_templates`.
fn capacity_nodes(capacity: &Value) -> Result<&Mapping> {
    capacity
        .get("service_template")
        .and_then(|st| st.get("node_templates"))
        .or_else(|| capacity.get("node_templates"))
        .and_then(Value::as_mapping)
        .ok_or_else(|| ToscaforgeError::Document {
            message: "capacity document has no node_templates".into(),
        })
}

struct Section {
    /// Line index of the `node_templates:` key.
    line: usize,
    /// Indent of the section key.
    indent: usize,
}

#[derive(Debug)]
struct Block {
    start: usize,
    end: usize,
    indent: usize,
}

fn find_section(lines: &[&str], key: &str) -> Result<Section> {
    lines
        .iter()
        .enumerate()
        .find_map(|(line, text)| {
            let trimmed = text.trim_start();
            (trimmed == format!("{key}:")).then(|| Section {
                line,
                indent: text.len() - trimmed.len(),
            })
        })
        .ok_or_else(|| ToscaforgeError::Document {
            message: format!("no '{key}' section found"),
        })
}

/// Splits the section body into per-node line ranges.
///
/// A node starts at the first-seen child indent level; its block runs until
/// the next node or the end of the section. Blank and comment lines between
/// blocks attach to the preceding block.
fn node_blocks(lines: &[&str], section: &Section) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut node_indent: Option<usize> = None;

    for (offset, text) in lines.iter().enumerate().skip(section.line + 1) {
        let trimmed = text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = text.len() - trimmed.len();
        if indent <= section.indent {
            // Left the node_templates section.
            if let Some(last) = blocks.last_mut() {
                last.end = last.end.min(offset);
            }
            break;
        }
        let node_indent = *node_indent.get_or_insert(indent);
        if indent == node_indent {
            if let Some(last) = blocks.last_mut() {
                last.end = offset;
            }
            blocks.push(Block {
                start: offset,
                end: lines.len(),
                indent: node_indent,
            });
        }
    }

    blocks
}

/// The node name on a block's opening line, with surrounding quotes dropped.
fn block_name(line: &str) -> &str {
    let trimmed = line.trim_start();
    let key = trimmed.split_once(':').map_or(trimmed, |(key, _)| key);
    key.trim_end().trim_matches(|c| c == '"' || c == '\'')
}

fn render_nodes(nodes: &Mapping, indent: usize) -> Result<String> {
    let pad = " ".repeat(indent);
    let mut rendered = String::new();
    for (name, definition) in nodes {
        let mut entry = Mapping::new();
        let _ = entry.insert(name.clone(), definition.clone());
        let text = serde_yaml::to_string(&entry)?;
        for line in text.lines() {
            rendered.push_str(&pad);
            rendered.push_str(line);
            rendered.push('\n');
        }
    }
    Ok(rendered)
}
