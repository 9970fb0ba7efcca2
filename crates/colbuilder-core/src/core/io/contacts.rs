use crate::core::geometry::crystal::TranslationMatrix;
use crate::core::models::ids::CopyId;
use nalgebra::Vector3;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message} (found '{fragment}')")]
    Parse {
        line: usize,
        message: String,
        fragment: String,
    },
    #[error("Contacts block starting on line {line} ends after {found} of 3 component lines")]
    TruncatedBlock { line: usize, found: usize },
    #[error("Copy {0} is not listed in the contacts file")]
    NotFound(CopyId),
}

fn parse_header(line: &str, line_num: usize) -> Result<CopyId, ContactsError> {
    let token = line.split_whitespace().nth(1).ok_or_else(|| ContactsError::Parse {
        line: line_num,
        message: "header needs a copy id as its second token".into(),
        fragment: line.to_string(),
    })?;
    token.parse().map_err(|_| ContactsError::Parse {
        line: line_num,
        message: "copy id is not a number".into(),
        fragment: token.to_string(),
    })
}

fn parse_component(line: &str, line_num: usize) -> Result<f64, ContactsError> {
    let token = line.split_whitespace().last().unwrap_or("");
    token.parse().map_err(|_| ContactsError::Parse {
        line: line_num,
        message: "expected a translation component at the end of the line".into(),
        fragment: line.trim().to_string(),
    })
}

/// Reads the translation matrix `T` from a contacts file.
///
/// Each copy occupies one block: a header whose second token is the copy id, then
/// three lines ending with the x, y and z components. Blank lines between blocks
/// are ignored. A repeated copy id keeps the later block.
pub fn read_contacts(reader: &mut impl BufRead) -> Result<TranslationMatrix, ContactsError> {
    let mut matrix = TranslationMatrix::new();
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(idx, line)| line.map(|l| (idx + 1, l)))
        .filter(|res| !matches!(res, Ok((_, l)) if l.trim().is_empty()));

    while let Some(header) = lines.next() {
        let (header_line, header) = header?;
        let id = parse_header(&header, header_line)?;

        let mut vector = Vector3::zeros();
        for axis in 0..3 {
            let (line_num, line) = lines.next().transpose()?.ok_or(ContactsError::TruncatedBlock {
                line: header_line,
                found: axis,
            })?;
            vector[axis] = parse_component(&line, line_num)?;
        }
        matrix.insert(id, vector);
    }
    Ok(matrix)
}

pub fn read_contacts_from_path<P: AsRef<Path>>(path: P) -> Result<TranslationMatrix, ContactsError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_contacts(&mut reader)
}

/// Writes `T` in the contacts format, rounding components to three decimals.
pub fn write_contacts(matrix: &TranslationMatrix, writer: &mut impl Write) -> Result<(), ContactsError> {
    for (id, t) in matrix.iter() {
        writeln!(writer, "Model {}", id)?;
        writeln!(writer, "         1 0 0 {:.3}", t.x)?;
        writeln!(writer, "         0 1 0 {:.3}", t.y)?;
        writeln!(writer, "         0 0 1 {:.3}", t.z)?;
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_contacts_to_path<P: AsRef<Path>>(
    matrix: &TranslationMatrix,
    path: P,
) -> Result<(), ContactsError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_contacts(matrix, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Looks up the translation of one copy in a contacts file.
pub fn find_contact<P: AsRef<Path>>(path: P, id: CopyId) -> Result<Vector3<f64>, ContactsError> {
    let matrix = read_contacts_from_path(path)?;
    matrix.get(id).copied().ok_or(ContactsError::NotFound(id))
}
