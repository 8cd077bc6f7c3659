use super::ConfigLoadError;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

/// Matches a `key = value` line. The value may be empty and may itself contain `=`.
static VALUE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^=\s{}][^={}]*?)\s*=\s*(.*)$").unwrap());

/// Matches a node header, optionally followed by its opening brace on the same line.
static NODE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][\w.\-]*)\s*(\{)?$").unwrap());

/// A nested key/value document in the host's configuration node text format.
///
/// Values and sub-nodes keep their insertion order, keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    values: Vec<(String, String)>,
    nodes: Vec<(String, ConfigNode)>,
}

impl ConfigNode {
    pub fn new() -> Self { Self::default() }

    pub fn add_value(&mut self, key: &str, value: impl Display) {
        self.values.push((key.to_string(), value.to_string()));
    }

    pub fn has_value(&self, key: &str) -> bool { self.values.iter().any(|(k, _)| k == key) }

    /// Returns the first value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Appends an empty sub-node and returns it for filling.
    pub fn add_node(&mut self, name: &str) -> &mut ConfigNode {
        self.nodes.push((name.to_string(), ConfigNode::new()));
        let last = self.nodes.len() - 1;
        &mut self.nodes[last].1
    }

    pub fn has_node(&self, name: &str) -> bool { self.nodes.iter().any(|(n, _)| n == name) }

    pub fn nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |(n, _)| n == name).map(|(_, node)| node)
    }

    /// Parses a whole document. The returned node is the implicit root.
    ///
    /// # Errors
    /// [`ConfigLoadError::Malformed`] naming the first offending line.
    pub fn parse(text: &str) -> Result<Self, ConfigLoadError> {
        let malformed = |line: usize, reason: &str| ConfigLoadError::Malformed {
            line,
            reason: reason.to_string(),
        };
        let mut stack: Vec<(String, ConfigNode)> = vec![(String::new(), ConfigNode::new())];
        let mut pending: Option<(usize, String)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split("//").next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            if line == "{" {
                let Some((_, name)) = pending.take() else {
                    return Err(malformed(line_no, "'{' without a node name"));
                };
                stack.push((name, ConfigNode::new()));
                continue;
            }
            if let Some((header_line, _)) = &pending {
                return Err(malformed(*header_line, "node name not followed by '{'"));
            }
            if line == "}" {
                if stack.len() < 2 {
                    return Err(malformed(line_no, "unbalanced '}'"));
                }
                if let Some((name, node)) = stack.pop() {
                    if let Some((_, parent)) = stack.last_mut() {
                        parent.nodes.push((name, node));
                    }
                }
                continue;
            }
            if let Some(caps) = VALUE_LINE.captures(line) {
                if let Some((_, current)) = stack.last_mut() {
                    current.add_value(caps[1].trim(), caps[2].trim());
                }
                continue;
            }
            match NODE_HEADER.captures(line) {
                Some(caps) if caps.get(2).is_some() => {
                    stack.push((caps[1].to_string(), ConfigNode::new()));
                }
                Some(caps) => pending = Some((line_no, caps[1].to_string())),
                None => return Err(malformed(line_no, "expected 'key = value' or a node")),
            }
        }

        if let Some((header_line, _)) = pending {
            return Err(malformed(header_line, "node name not followed by '{'"));
        }
        if stack.len() != 1 {
            return Err(malformed(text.lines().count(), "unclosed node"));
        }
        Ok(stack.pop().map(|(_, root)| root).unwrap_or_default())
    }

    fn write_body(&self, f: &mut Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = "\t".repeat(depth);
        for (key, value) in &self.values {
            writeln!(f, "{indent}{key} = {value}")?;
        }
        for (name, node) in &self.nodes {
            writeln!(f, "{indent}{name}")?;
            writeln!(f, "{indent}{{")?;
            node.write_body(f, depth + 1)?;
            writeln!(f, "{indent}}}")?;
        }
        Ok(())
    }
}

impl Display for ConfigNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { self.write_body(f, 0) }
}
