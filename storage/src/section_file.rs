//! Reader and writer for the section-based connections file.
//!
//! ```text
//! [connection_1]
//! type = postgresql
//! host = db.example.com
//! ```
//!
//! Keys are case-insensitive and stored lowercase, values are trimmed, and
//! whole-line comments start with `#` or `;`. Section and key order is kept.

use std::fmt;

use indexmap::IndexMap;

pub type Entries = IndexMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

impl SyntaxError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionFile {
    sections: IndexMap<String, Entries>,
}

impl SectionFile {
    pub fn parse(contents: &str) -> Result<Self, SyntaxError> {
        let mut sections: IndexMap<String, Entries> = IndexMap::new();
        let mut current: Option<String> = None;

        for (idx, raw) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let Some(name) = header.strip_suffix(']') else {
                    return Err(SyntaxError::new(line_no, "section header is missing ']'"));
                };
                let name = name.trim();
                if name.is_empty() {
                    return Err(SyntaxError::new(line_no, "empty section name"));
                }
                if sections.contains_key(name) {
                    return Err(SyntaxError::new(
                        line_no,
                        format!("section '{name}' appears more than once"),
                    ));
                }
                sections.insert(name.to_string(), Entries::new());
                current = Some(name.to_string());
                continue;
            }

            let Some(section) = current.as_ref() else {
                return Err(SyntaxError::new(line_no, "key outside of any section"));
            };
            let Some(split) = line.find(['=', ':']) else {
                return Err(SyntaxError::new(
                    line_no,
                    "expected 'key = value' or a section header",
                ));
            };
            let key = line[..split].trim().to_lowercase();
            let value = line[split + 1..].trim();
            if key.is_empty() {
                return Err(SyntaxError::new(line_no, "empty key"));
            }

            let entries = sections
                .get_mut(section)
                .ok_or_else(|| SyntaxError::new(line_no, "key outside of any section"))?;
            if entries.contains_key(&key) {
                return Err(SyntaxError::new(
                    line_no,
                    format!("key '{key}' appears more than once in section '{section}'"),
                ));
            }
            entries.insert(key, value.to_string());
        }

        Ok(Self { sections })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn section(&self, name: &str) -> Option<&Entries> {
        self.sections.get(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Entries)> {
        self.sections
            .iter()
            .map(|(name, entries)| (name.as_str(), entries))
    }

    /// Replaces the entries of `name`, keeping its position if it exists and
    /// appending it otherwise.
    pub fn set_section(&mut self, name: impl Into<String>, entries: Entries) {
        self.sections.insert(name.into(), entries);
    }

    pub fn remove_section(&mut self, name: &str) -> bool {
        self.sections.shift_remove(name).is_some()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, entries) in &self.sections {
            out.push('[');
            out.push_str(name);
            out.push_str("]\n");
            for (key, value) in entries {
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(value);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}
