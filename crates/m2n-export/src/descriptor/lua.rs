//! Lua table text
//!
//! Tables are laid out one entry per line with tab indentation. A nested
//! table is rendered first and re-indented as it is placed in its parent:
//!
//! ```text
//! {
//! 	'model:assets/models/Ship.model',
//! 	ty = 2,
//! 	['Turret'] = {
//! 		'model:assets/models/Turret.model',
//! 		tx = 1
//! 	}
//! }
//! ```

/// Quote a string as a single-quoted Lua literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\{:03}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Format a number in the shortest form that reads back as the same `f32`
///
/// Negative zero is written as `0`.
pub fn number(value: f32) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.is_nan() {
        "(0/0)".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "math.huge" } else { "-math.huge" }.to_string()
    } else {
        value.to_string()
    }
}

/// Bracketed string key: `['name']`
pub fn key(name: &str) -> String {
    format!("[{}]", quote(name))
}

/// An ordered Lua table under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    entries: Vec<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value, already rendered
    pub fn push(&mut self, value: impl Into<String>) -> &mut Self {
        self.entries.push(value.into());
        self
    }

    /// Append `ident = value`
    pub fn field(&mut self, ident: &str, value: impl AsRef<str>) -> &mut Self {
        self.entries.push(format!("{} = {}", ident, value.as_ref()));
        self
    }

    /// Append `ident = <number>`
    pub fn number(&mut self, ident: &str, value: f32) -> &mut Self {
        self.field(ident, number(value))
    }

    /// Append `['name'] = value`
    pub fn keyed(&mut self, name: &str, value: impl AsRef<str>) -> &mut Self {
        self.entries.push(format!("{} = {}", key(name), value.as_ref()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as table text, without a trailing newline
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "{\n}".to_string();
        }

        let body: Vec<String> = self
            .entries
            .iter()
            .map(|entry| entry.replace('\n', "\n\t"))
            .collect();
        format!("{{\n\t{}\n}}", body.join(",\n\t"))
    }

    /// Render as a descriptor file body: `return { ... }`
    pub fn document(&self) -> String {
        format!("return {}", self.render())
    }
}
