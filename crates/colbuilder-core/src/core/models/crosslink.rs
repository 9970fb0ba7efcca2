use super::marker::LinkArity;
use std::fmt;
use std::str::FromStr;

/// Telopeptide end a cross-link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    N,
    C,
}

impl FromStr for Terminal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" | "n" => Ok(Terminal::N),
            "C" | "c" => Ok(Terminal::C),
            other => Err(format!("expected 'N' or 'C', found '{}'", other)),
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::N => write!(f, "N"),
            Terminal::C => write!(f, "C"),
        }
    }
}

/// One atom taking part in a cross-link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrosslinkPosition {
    pub residue_number: isize,
    pub chain_id: char,
    pub residue_type: String,
    pub atom_name: String,
}

impl fmt::Display for CrosslinkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}:{}",
            self.residue_type, self.residue_number, self.chain_id, self.atom_name
        )
    }
}

/// The two or three atoms joined by one cross-link.
#[derive(Debug, Clone, PartialEq)]
pub struct CrosslinkPair {
    pub position1: CrosslinkPosition,
    pub position2: CrosslinkPosition,
    pub position3: Option<CrosslinkPosition>,
    pub terminal: Terminal,
}

impl CrosslinkPair {
    pub fn arity(&self) -> LinkArity {
        if self.position3.is_some() {
            LinkArity::Trivalent
        } else {
            LinkArity::Divalent
        }
    }

    /// All participating positions in table order.
    pub fn positions(&self) -> impl Iterator<Item = &CrosslinkPosition> {
        [Some(&self.position1), Some(&self.position2), self.position3.as_ref()]
            .into_iter()
            .flatten()
    }
}
