//! TOML front-matter rendering.
//!
//! Every generated document opens with a `+++`-delimited metadata block that
//! the downstream site compiler parses as TOML. The block is rendered by
//! hand rather than through a serializer: field order is part of the output
//! contract (insertion order, never sorted), and the quoting rules below are
//! exactly what the compiler expects.
//!
//! This renderer is for the metadata header only. It escapes quotes and
//! backslashes but not newlines, so free-form body text must never be routed
//! through it.

use std::fmt::Write;

/// A front-matter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Rendered double-quoted with `"` and `\` escaped.
    Str(String),
    /// Rendered as lowercase `true`/`false`.
    Bool(bool),
    /// Rendered in plain decimal, unquoted.
    Int(i64),
    /// Rendered in plain decimal, unquoted.
    Float(f64),
    /// Rendered as a JSON-style array of quoted strings.
    Seq(Vec<String>),
}

/// An insertion-ordered front-matter block with an optional `[extra]` table.
///
/// Keys are never sorted or de-duplicated: what goes in is what comes out,
/// in that order.
#[derive(Debug, Default)]
pub struct FrontMatter {
    fields: Vec<(String, Value)>,
    extra: Vec<(String, Value)>,
}

impl FrontMatter {
    pub fn new() -> FrontMatter {
        FrontMatter::default()
    }

    /// Append a top-level field.
    pub fn push(&mut self, key: &str, value: Value) {
        self.fields.push((key.to_string(), value));
    }

    /// Append a field to the `[extra]` table.
    pub fn push_extra(&mut self, key: &str, value: Value) {
        self.extra.push((key.to_string(), value));
    }

    /// Render the complete delimited block, trailing newline included.
    pub fn render(&self) -> String {
        let mut out = String::from("+++\n");
        for (key, value) in &self.fields {
            render_field(&mut out, key, value);
        }
        if !self.extra.is_empty() {
            out.push_str("\n[extra]\n");
            for (key, value) in &self.extra {
                render_field(&mut out, key, value);
            }
        }
        out.push_str("+++\n");
        out
    }
}

fn render_field(out: &mut String, key: &str, value: &Value) {
    match value {
        Value::Str(s) => {
            let _ = writeln!(out, "{} = {}", key, quote(s));
        }
        Value::Bool(b) => {
            let _ = writeln!(out, "{} = {}", key, b);
        }
        Value::Int(n) => {
            let _ = writeln!(out, "{} = {}", key, n);
        }
        Value::Float(n) => {
            let _ = writeln!(out, "{} = {}", key, n);
        }
        Value::Seq(items) => {
            let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
            let _ = writeln!(out, "{} = [{}]", key, quoted.join(", "));
        }
    }
}

/// Double-quote a string, escaping backslashes and embedded quotes.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
