use std::str::FromStr;
use thiserror::Error;

/// A named fixed-width column range of a text record (0-based, end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Required field '{field}' in columns {columns} is empty")]
    Missing { field: &'static str, columns: String },
    #[error("Invalid value for '{field}' in columns {columns} (value: '{value}')")]
    Invalid {
        field: &'static str,
        columns: String,
        value: String,
    },
}

impl Field {
    pub const fn new(name: &'static str, start: usize, end: usize) -> Self {
        Self { name, start, end }
    }

    /// Human-readable 1-based column range, as written in format documentation.
    pub fn columns(&self) -> String {
        format!("{}-{}", self.start + 1, self.end)
    }

    /// Raw text of the field. Lines that end inside the field yield the part present.
    pub fn raw<'a>(&self, line: &'a str) -> &'a str {
        let end = self.end.min(line.len());
        if self.start >= end {
            return "";
        }
        line.get(self.start..end).unwrap_or("")
    }

    pub fn trimmed<'a>(&self, line: &'a str) -> &'a str {
        self.raw(line).trim()
    }

    pub fn parse<T: FromStr>(&self, line: &str) -> Result<T, FieldError> {
        let value = self.trimmed(line);
        if value.is_empty() {
            return Err(FieldError::Missing {
                field: self.name,
                columns: self.columns(),
            });
        }
        value.parse().map_err(|_| FieldError::Invalid {
            field: self.name,
            columns: self.columns(),
            value: value.to_string(),
        })
    }

    /// First non-blank character of the field, if any.
    pub fn char(&self, line: &str) -> Option<char> {
        self.trimmed(line).chars().next()
    }
}
