use crate::core::models::crosslink::{CrosslinkPair, CrosslinkPosition, Terminal};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const NONE_POSITION: &str = "NONE";

#[derive(Debug, Error)]
pub enum CrosslinkTableError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error(
        "Invalid cross-link position '{value}' on row {row}: expected '<residue number>.<chain>' or NONE"
    )]
    InvalidPosition { row: usize, value: String },
    #[error("Invalid terminal '{value}' on row {row}: expected N or C")]
    InvalidTerminal { row: usize, value: String },
}

/// One row of the cross-link table as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct CrosslinkRow {
    pub terminal: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub combination: String,
    #[serde(rename = "P1")]
    pub p1: String,
    #[serde(rename = "R1")]
    pub r1: String,
    #[serde(rename = "A1")]
    pub a1: String,
    #[serde(rename = "P2")]
    pub p2: String,
    #[serde(rename = "R2")]
    pub r2: String,
    #[serde(rename = "A2")]
    pub a2: String,
    #[serde(rename = "P3", default)]
    pub p3: Option<String>,
    #[serde(rename = "R3", default)]
    pub r3: Option<String>,
    #[serde(rename = "A31", default)]
    pub a31: Option<String>,
}

/// Parses `"<residue number>.<chain>"`; `NONE` yields `Ok(None)`.
pub fn parse_position(
    value: &str,
    residue_type: &str,
    atom_name: &str,
) -> Result<Option<CrosslinkPosition>, String> {
    let value = value.trim();
    if value.is_empty() || value == NONE_POSITION {
        return Ok(None);
    }
    let (number, chain) = value
        .split_once('.')
        .ok_or_else(|| value.to_string())?;
    let residue_number = number.trim().parse::<isize>().map_err(|_| value.to_string())?;
    let mut chars = chain.trim().chars();
    let chain_id = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => return Err(value.to_string()),
    };
    Ok(Some(CrosslinkPosition {
        residue_number,
        chain_id,
        residue_type: residue_type.trim().to_string(),
        atom_name: atom_name.trim().to_string(),
    }))
}

/// The cross-link definitions available for every terminal, type and combination.
#[derive(Debug, Clone, Default)]
pub struct CrosslinkTable {
    rows: Vec<CrosslinkRow>,
}

impl CrosslinkTable {
    pub fn from_rows(rows: Vec<CrosslinkRow>) -> Self {
        Self { rows }
    }

    pub fn load(path: &Path) -> Result<Self, CrosslinkTableError> {
        let to_error = |source| CrosslinkTableError::Csv {
            path: path.to_string_lossy().to_string(),
            source,
        };
        let reader = csv::Reader::from_path(path).map_err(to_error)?;
        Self::from_csv(reader).map_err(to_error)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, CrosslinkTableError> {
        Self::from_csv(csv::Reader::from_reader(reader)).map_err(|source| CrosslinkTableError::Csv {
            path: "<reader>".into(),
            source,
        })
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let rows = reader
            .deserialize::<CrosslinkRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cross-link pairs of the rows matching `terminal`, `link_type` and `combination`.
    ///
    /// Rows whose first or second position is `NONE` are skipped; a `NONE` third
    /// position makes the pair divalent.
    pub fn select(
        &self,
        terminal: Terminal,
        link_type: &str,
        combination: &str,
    ) -> Result<Vec<CrosslinkPair>, CrosslinkTableError> {
        let mut pairs = Vec::new();
        // Header is row 1 in spreadsheet terms.
        for (idx, row) in self.rows.iter().enumerate() {
            let row_num = idx + 2;
            let row_terminal: Terminal =
                row.terminal
                    .parse()
                    .map_err(|_| CrosslinkTableError::InvalidTerminal {
                        row: row_num,
                        value: row.terminal.clone(),
                    })?;
            if row_terminal != terminal
                || row.link_type.trim() != link_type
                || row.combination.trim() != combination
            {
                continue;
            }

            let invalid = |value: String| CrosslinkTableError::InvalidPosition { row: row_num, value };
            let position1 = parse_position(&row.p1, &row.r1, &row.a1).map_err(invalid)?;
            let position2 = parse_position(&row.p2, &row.r2, &row.a2).map_err(invalid)?;
            let (Some(position1), Some(position2)) = (position1, position2) else {
                debug!(row = row_num, "Skipping cross-link row without two positions.");
                continue;
            };
            let position3 = match &row.p3 {
                Some(p3) => parse_position(
                    p3,
                    row.r3.as_deref().unwrap_or_default(),
                    row.a31.as_deref().unwrap_or_default(),
                )
                .map_err(invalid)?,
                None => None,
            };

            pairs.push(CrosslinkPair {
                position1,
                position2,
                position3,
                terminal,
            });
        }
        Ok(pairs)
    }
}
