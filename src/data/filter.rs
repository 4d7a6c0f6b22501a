use std::fmt;

use super::categories::{self, Dimension, RawCodes};
use super::error::DataError;
use super::model::{ExamTable, ParticipantRow};

// ---------------------------------------------------------------------------
// FilterChoice – the user's (dimension, label) selection
// ---------------------------------------------------------------------------

/// The demographic filter applied to a run, resolved from the UI controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChoice {
    /// No filter selected; applying it is the identity.
    None,
    Value { dimension: Dimension, label: String },
}

impl fmt::Display for FilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChoice::None => f.write_str("todos os participantes"),
            FilterChoice::Value { dimension, label } => {
                write!(f, "{dimension}: {label}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Derive the subset of rows matching the choice. The base table is never
/// mutated; the result is a fresh table.
///
/// A row matches when its raw categorical value for the chosen dimension is
/// a member of the label's code set (membership, not equality — income
/// brackets span several letter codes). Zero matches yield an empty table,
/// not an error.
pub fn apply(table: &ExamTable, choice: &FilterChoice) -> Result<ExamTable, DataError> {
    match choice {
        FilterChoice::None => Ok(table.clone()),
        FilterChoice::Value { dimension, label } => {
            let codes = categories::raw_codes_for(*dimension, label)?;
            let rows = table
                .rows
                .iter()
                .filter(|row| row_matches(row, *dimension, codes))
                .cloned()
                .collect();
            Ok(ExamTable {
                year: table.year,
                rows,
            })
        }
    }
}

fn row_matches(row: &ParticipantRow, dimension: Dimension, codes: RawCodes) -> bool {
    match (dimension, codes) {
        (Dimension::Income, RawCodes::Letters(set)) => {
            row.income.is_some_and(|code| set.contains(&code))
        }
        (Dimension::CompletionYear, RawCodes::Codes(set)) => {
            row.completion_year.is_some_and(|code| set.contains(&code))
        }
        (Dimension::Race, RawCodes::Codes(set)) => {
            row.race.is_some_and(|code| set.contains(&code))
        }
        // The static tables never pair a dimension with the wrong code kind.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Presence;

    fn row(income: char, completion: u8, race: u8) -> ParticipantRow {
        ParticipantRow {
            scores: [Some(500.0); 5],
            presence: [Presence::Present; 4],
            income: Some(income),
            completion_year: Some(completion),
            race: Some(race),
            age_bracket: Some(3),
            municipality: Some(1100015),
        }
    }

    fn table() -> ExamTable {
        ExamTable {
            year: 2023,
            rows: vec![row('A', 1, 1), row('C', 3, 2), row('D', 7, 3), row('Q', 0, 3)],
        }
    }

    #[test]
    fn no_filter_is_the_identity() {
        let base = table();
        let out = apply(&base, &FilterChoice::None).unwrap();
        assert_eq!(out.len(), base.len());
        for (a, b) in base.rows.iter().zip(&out.rows) {
            assert_eq!(a.income, b.income);
            assert_eq!(a.completion_year, b.completion_year);
            assert_eq!(a.race, b.race);
        }
    }

    #[test]
    fn membership_filtering_is_sound_and_complete() {
        // "De 1 a 3 salários mínimos" covers C..=F: rows 'C' and 'D' match.
        let out = apply(
            &table(),
            &FilterChoice::Value {
                dimension: Dimension::Income,
                label: "De 1 a 3 salários mínimos".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out.len(), 2);
        for row in &out.rows {
            assert!(matches!(row.income, Some('C') | Some('D')));
        }
    }

    #[test]
    fn completion_cohort_filters_by_code_range() {
        let out = apply(
            &table(),
            &FilterChoice::Value {
                dimension: Dimension::CompletionYear,
                label: "Concluído há 6 a 10 anos".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows[0].completion_year, Some(7));
    }

    #[test]
    fn zero_matches_is_an_empty_table_not_an_error() {
        let out = apply(
            &table(),
            &FilterChoice::Value {
                dimension: Dimension::Income,
                label: "Até 1 salário mínimo".to_string(),
            },
        )
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(out.year, 2023);
    }

    #[test]
    fn unknown_label_fails_loudly() {
        let err = apply(
            &table(),
            &FilterChoice::Value {
                dimension: Dimension::Race,
                label: "Classe média".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DataError::UnknownLabel { .. }));
    }

    #[test]
    fn rows_without_the_attribute_never_match() {
        let mut base = table();
        base.rows[0].income = None;
        let out = apply(
            &base,
            &FilterChoice::Value {
                dimension: Dimension::Income,
                label: "Nenhuma renda".to_string(),
            },
        )
        .unwrap();
        assert!(out.is_empty());
    }
}
