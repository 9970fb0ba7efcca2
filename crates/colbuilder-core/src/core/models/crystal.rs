use std::fmt;

/// Unit-cell parameters of the crystal: edge lengths in Angstroms and angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl UnitCell {
    pub const fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }

    pub fn lengths(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    pub fn angles(&self) -> [f64; 3] {
        [self.alpha, self.beta, self.gamma]
    }
}

/// Space group of the crystal, identified by its International Tables number.
///
/// Symbols read from a coordinate file (`P 1`, `P1`) and plain numbers are both
/// accepted when parsing. Only `P 1` is understood by the geometry engine.
/// Space group of a crystal, by number when the symbol is known and verbatim otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpaceGroup {
    Number(u16),
    Symbol(String),
}

impl SpaceGroup {
    pub const P1: SpaceGroup = SpaceGroup::Number(1);

    /// Interprets a CRYST1 space-group field. Unknown symbols are kept as written.
    pub fn from_symbol(symbol: &str) -> Self {
        let trimmed = symbol.trim();
        if let Ok(number) = trimmed.parse::<u16>() {
            return SpaceGroup::Number(number);
        }
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_ascii_uppercase().as_str() {
            "" | "P1" => SpaceGroup::P1,
            "P-1" => SpaceGroup::Number(2),
            "P21" => SpaceGroup::Number(4),
            "P212121" => SpaceGroup::Number(19),
            _ => SpaceGroup::Symbol(trimmed.to_string()),
        }
    }

    pub fn number(&self) -> Option<u16> {
        match self {
            SpaceGroup::Number(n) => Some(*n),
            SpaceGroup::Symbol(_) => None,
        }
    }
}

impl fmt::Display for SpaceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceGroup::Number(1) => write!(f, "P 1"),
            SpaceGroup::Number(n) => write!(f, "#{}", n),
            SpaceGroup::Symbol(s) => write!(f, "'{}'", s),
        }
    }
}
