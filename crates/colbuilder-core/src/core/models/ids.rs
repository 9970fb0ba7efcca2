use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Identifier of one placed copy of the asymmetric unit.
///
/// Copy identifiers come from the contacts file as numeric tokens (`0.0`, `12.0`)
/// and are not required to be integers. The wrapper gives them a total order and a
/// stable hash so they can key ordered maps and sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyId(f64);

impl CopyId {
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Integer label used for file names (`3.pdb`, `col_3.itp`).
    pub fn as_index(self) -> i64 {
        self.0 as i64
    }
}

impl From<f64> for CopyId {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i32> for CopyId {
    fn from(value: i32) -> Self {
        Self(value as f64)
    }
}

impl PartialEq for CopyId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CopyId {}

impl PartialOrd for CopyId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CopyId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for CopyId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for CopyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.is_finite() {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for CopyId {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<f64>().map(Self)
    }
}
