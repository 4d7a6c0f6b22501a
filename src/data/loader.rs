use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DataError;
use super::geo::{self, BoundaryDocument};
use super::model::{ExamTable, ParticipantRow, Presence, Subject};

/// The closed set of exam years the dashboard knows about.
pub const EXAM_YEARS: [u16; 5] = [2020, 2021, 2022, 2023, 2024];

// ---------------------------------------------------------------------------
// DatasetCache – explicit keyed memoization
// ---------------------------------------------------------------------------

/// Process-lifetime cache of loaded inputs, keyed by year (tables) and path
/// (boundary documents). The backing files are static while the process
/// runs, so entries are never invalidated.
pub struct DatasetCache {
    tables: HashMap<u16, Arc<ExamTable>>,
    boundaries: HashMap<PathBuf, Arc<BoundaryDocument>>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            boundaries: HashMap::new(),
        }
    }

    /// The yearly table, reading `enem_<year>.csv` (or the `.zip` wrapping
    /// it) from `data_dir` on first request.
    pub fn table(&mut self, data_dir: &Path, year: u16) -> Result<Arc<ExamTable>, DataError> {
        if !EXAM_YEARS.contains(&year) {
            return Err(DataError::UnknownYear(year));
        }
        if let Some(table) = self.tables.get(&year) {
            log::debug!("serving year {year} from cache ({} rows)", table.len());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_table(data_dir, year)?);
        log::info!("loaded {} participant rows for {year}", table.len());
        self.tables.insert(year, Arc::clone(&table));
        Ok(table)
    }

    /// The municipality boundary document, read once per path.
    pub fn boundaries(&mut self, path: &Path) -> Result<Arc<BoundaryDocument>, DataError> {
        if let Some(doc) = self.boundaries.get(path) {
            return Ok(Arc::clone(doc));
        }
        let doc = Arc::new(geo::load_boundaries(path)?);
        log::info!(
            "loaded {} municipality boundaries from {}",
            doc.len(),
            path.display()
        );
        self.boundaries.insert(path.to_path_buf(), Arc::clone(&doc));
        Ok(doc)
    }
}

// ---------------------------------------------------------------------------
// File-level loading
// ---------------------------------------------------------------------------

/// Locate and parse the extract for one year. The plain `.csv` wins over the
/// `.zip` archive when both exist.
fn load_table(data_dir: &Path, year: u16) -> Result<ExamTable, DataError> {
    let csv_path = data_dir.join(format!("enem_{year}.csv"));
    if csv_path.is_file() {
        let file = File::open(&csv_path).map_err(|e| malformed(&csv_path, e))?;
        return parse_table(BufReader::new(file), &csv_path, year);
    }

    let zip_path = data_dir.join(format!("enem_{year}.zip"));
    if zip_path.is_file() {
        let file = File::open(&zip_path).map_err(|e| malformed(&zip_path, e))?;
        return read_zip_archive(file, &zip_path, year);
    }

    Err(DataError::NotFound {
        kind: "dataset",
        path: csv_path,
    })
}

fn malformed(path: &Path, error: impl std::fmt::Display) -> DataError {
    DataError::MalformedTable {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Parse the first `.csv` entry of a single-file archive.
fn read_zip_archive<R: Read + Seek>(
    reader: R,
    path: &Path,
    year: u16,
) -> Result<ExamTable, DataError> {
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| malformed(path, format_args!("unreadable zip archive: {e}")))?;

    let csv_index = (0..archive.len()).find(|&i| {
        archive
            .by_index(i)
            .map(|entry| entry.name().to_ascii_lowercase().ends_with(".csv"))
            .unwrap_or(false)
    });
    let Some(index) = csv_index else {
        return Err(malformed(path, "archive contains no .csv entry"));
    };

    let entry = archive
        .by_index(index)
        .map_err(|e| malformed(path, format_args!("unreadable zip entry: {e}")))?;
    parse_table(BufReader::new(entry), path, year)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Resolved positions of the required columns in the header row.
struct Columns {
    scores: [usize; 5],
    presence: [usize; 4],
    income: usize,
    completion: usize,
    race: usize,
    age: usize,
    municipality: usize,
}

fn resolve_columns(headers: &csv::StringRecord, path: &Path) -> Result<Columns, DataError> {
    let find = |name: &'static str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DataError::MalformedTable {
                path: path.to_path_buf(),
                message: format!("missing required column {name}"),
            })
    };

    let mut scores = [0usize; 5];
    for (i, subject) in Subject::ALL.iter().enumerate() {
        scores[i] = find(subject.score_column())?;
    }
    let mut presence = [0usize; 4];
    for (i, subject) in Subject::PROCTORED.iter().enumerate() {
        if let Some(column) = subject.presence_column() {
            presence[i] = find(column)?;
        }
    }

    Ok(Columns {
        scores,
        presence,
        income: find("Q006")?,
        completion: find("TP_ANO_CONCLUIU")?,
        race: find("TP_COR_RACA")?,
        age: find("TP_FAIXA_ETARIA")?,
        municipality: find("CO_MUNICIPIO_PROVA")?,
    })
}

/// Parse a semicolon-delimited extract into an [`ExamTable`].
///
/// Cell typing is deterministic and lenient: scores that fail to parse as
/// numbers become null instead of raising, matching the behavior the charts
/// depend on.
fn parse_table(reader: impl Read, path: &Path, year: u16) -> Result<ExamTable, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| malformed(path, format_args!("unreadable header row: {e}")))?
        .clone();
    let columns = resolve_columns(&headers, path)?;

    let mut rows = Vec::new();
    for (line, result) in csv_reader.records().enumerate() {
        let record =
            result.map_err(|e| malformed(path, format_args!("record {line}: {e}")))?;
        rows.push(row_from_record(&record, &columns));
    }

    Ok(ExamTable { year, rows })
}

fn row_from_record(record: &csv::StringRecord, columns: &Columns) -> ParticipantRow {
    let mut scores = [None; 5];
    for (i, &index) in columns.scores.iter().enumerate() {
        scores[i] = parse_f64(record.get(index));
    }
    let mut presence = [Presence::Unknown; 4];
    for (i, &index) in columns.presence.iter().enumerate() {
        presence[i] = Presence::from_code(parse_u8(record.get(index)));
    }

    ParticipantRow {
        scores,
        presence,
        income: parse_letter(record.get(columns.income)),
        completion_year: parse_u8(record.get(columns.completion)),
        race: parse_u8(record.get(columns.race)),
        age_bracket: parse_u8(record.get(columns.age)),
        municipality: parse_i64(record.get(columns.municipality)),
    }
}

fn parse_f64(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse().ok())
}

fn parse_u8(cell: Option<&str>) -> Option<u8> {
    cell.and_then(|s| s.trim().parse().ok())
}

fn parse_i64(cell: Option<&str>) -> Option<i64> {
    cell.and_then(|s| s.trim().parse().ok())
}

fn parse_letter(cell: Option<&str>) -> Option<char> {
    let s = cell?.trim();
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}
