use std::fmt;

use super::error::DataError;

// ---------------------------------------------------------------------------
// Dimension – the user-selectable filter axes
// ---------------------------------------------------------------------------

/// A demographic dimension the dashboard can filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Income,
    CompletionYear,
    Race,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Income,
        Dimension::CompletionYear,
        Dimension::Race,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Income => "Renda",
            Dimension::CompletionYear => "Ano de conclusão",
            Dimension::Race => "Raça",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Static mapping tables: raw code ↔ display label
// ---------------------------------------------------------------------------

/// Fallback label for raw codes outside the known set.
pub const UNSPECIFIED: &str = "Não informado";

/// A label backed by a set of raw letter codes (income question).
pub struct LetterBand {
    pub label: &'static str,
    pub codes: &'static [char],
}

/// A label backed by a set of raw integer codes.
pub struct CodeBand {
    pub label: &'static str,
    pub codes: &'static [u8],
}

/// Income brackets over questionnaire codes `A..=Q`, using the
/// minimum-salary-multiples scheme. Many-to-one: several letter codes
/// collapse into one bracket.
pub const INCOME_BRACKETS: &[LetterBand] = &[
    LetterBand { label: "Nenhuma renda", codes: &['A'] },
    LetterBand { label: "Até 1 salário mínimo", codes: &['B'] },
    LetterBand { label: "De 1 a 3 salários mínimos", codes: &['C', 'D', 'E', 'F'] },
    LetterBand { label: "De 3 a 6 salários mínimos", codes: &['G', 'H', 'I', 'J'] },
    LetterBand { label: "De 6 a 12 salários mínimos", codes: &['K', 'L', 'M', 'N'] },
    LetterBand { label: "De 12 a 20 salários mínimos", codes: &['O', 'P'] },
    LetterBand { label: "Mais de 20 salários mínimos", codes: &['Q'] },
];

/// Completion-year cohorts over the years-since-completion code
/// (0 = not informed, 1..=16 = years since finishing high school).
pub const COMPLETION_COHORTS: &[CodeBand] = &[
    CodeBand { label: "Não informado", codes: &[0] },
    CodeBand { label: "Concluído há até 2 anos", codes: &[1, 2] },
    CodeBand { label: "Concluído há 3 a 5 anos", codes: &[3, 4, 5] },
    CodeBand { label: "Concluído há 6 a 10 anos", codes: &[6, 7, 8, 9, 10] },
    CodeBand { label: "Concluído há mais de 10 anos", codes: &[11, 12, 13, 14, 15, 16] },
];

/// Race/ethnicity groups; the one dimension whose mapping is one-to-one.
pub const RACE_GROUPS: &[CodeBand] = &[
    CodeBand { label: "Não declarado", codes: &[0] },
    CodeBand { label: "Branca", codes: &[1] },
    CodeBand { label: "Preta", codes: &[2] },
    CodeBand { label: "Parda", codes: &[3] },
    CodeBand { label: "Amarela", codes: &[4] },
    CodeBand { label: "Indígena", codes: &[5] },
];

/// Age groups over the age-bracket code (1..=20). Not a filter dimension;
/// used by the grouped-mean aggregation.
pub const AGE_GROUPS: &[CodeBand] = &[
    CodeBand { label: "Até 17 anos", codes: &[1, 2] },
    CodeBand { label: "18 a 20 anos", codes: &[3, 4, 5] },
    CodeBand { label: "21 a 25 anos", codes: &[6, 7, 8, 9, 10] },
    CodeBand { label: "26 a 35 anos", codes: &[11, 12] },
    CodeBand { label: "36 a 50 anos", codes: &[13, 14, 15] },
    CodeBand { label: "51 anos ou mais", codes: &[16, 17, 18, 19, 20] },
];

// ---------------------------------------------------------------------------
// Label lookup (total: unknown codes fall back to UNSPECIFIED)
// ---------------------------------------------------------------------------

fn band_label(bands: &'static [CodeBand], code: Option<u8>) -> &'static str {
    let Some(code) = code else {
        return UNSPECIFIED;
    };
    bands
        .iter()
        .find(|band| band.codes.contains(&code))
        .map(|band| band.label)
        .unwrap_or(UNSPECIFIED)
}

/// Bracket label for an income letter code.
pub fn income_label(code: Option<char>) -> &'static str {
    let Some(code) = code else {
        return UNSPECIFIED;
    };
    INCOME_BRACKETS
        .iter()
        .find(|band| band.codes.contains(&code))
        .map(|band| band.label)
        .unwrap_or(UNSPECIFIED)
}

/// Cohort label for a years-since-completion code.
pub fn completion_label(code: Option<u8>) -> &'static str {
    band_label(COMPLETION_COHORTS, code)
}

/// Race/ethnicity label for a raw code.
pub fn race_label(code: Option<u8>) -> &'static str {
    band_label(RACE_GROUPS, code)
}

/// Age-group label for an age-bracket code.
pub fn age_group_label(code: Option<u8>) -> &'static str {
    band_label(AGE_GROUPS, code)
}

// ---------------------------------------------------------------------------
// Inverse lookup: label → raw code set (used by the Filter Engine)
// ---------------------------------------------------------------------------

/// The raw code set behind one filter label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCodes {
    Letters(&'static [char]),
    Codes(&'static [u8]),
}

/// The fixed label vocabulary for a dimension, in display order.
pub fn labels(dimension: Dimension) -> Vec<&'static str> {
    match dimension {
        Dimension::Income => INCOME_BRACKETS.iter().map(|b| b.label).collect(),
        Dimension::CompletionYear => COMPLETION_COHORTS.iter().map(|b| b.label).collect(),
        Dimension::Race => RACE_GROUPS.iter().map(|b| b.label).collect(),
    }
}

/// Resolve a display label back to its raw code set.
/// Labels outside the dimension's fixed vocabulary are a configuration error.
pub fn raw_codes_for(dimension: Dimension, label: &str) -> Result<RawCodes, DataError> {
    let found = match dimension {
        Dimension::Income => INCOME_BRACKETS
            .iter()
            .find(|band| band.label == label)
            .map(|band| RawCodes::Letters(band.codes)),
        Dimension::CompletionYear => COMPLETION_COHORTS
            .iter()
            .find(|band| band.label == label)
            .map(|band| RawCodes::Codes(band.codes)),
        Dimension::Race => RACE_GROUPS
            .iter()
            .find(|band| band.label == label)
            .map(|band| RawCodes::Codes(band.codes)),
    };
    found.ok_or_else(|| DataError::UnknownLabel {
        dimension,
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_mapping_is_many_to_one() {
        assert_eq!(income_label(Some('C')), "De 1 a 3 salários mínimos");
        assert_eq!(income_label(Some('F')), "De 1 a 3 salários mínimos");
        assert_eq!(income_label(Some('Q')), "Mais de 20 salários mínimos");
    }

    #[test]
    fn unknown_codes_fall_back_to_unspecified() {
        assert_eq!(income_label(Some('Z')), UNSPECIFIED);
        assert_eq!(income_label(None), UNSPECIFIED);
        assert_eq!(race_label(Some(42)), UNSPECIFIED);
        assert_eq!(completion_label(Some(200)), UNSPECIFIED);
        assert_eq!(age_group_label(None), UNSPECIFIED);
    }

    #[test]
    fn income_codes_cover_a_through_q() {
        for code in 'A'..='Q' {
            assert_ne!(income_label(Some(code)), UNSPECIFIED, "code {code} unmapped");
        }
    }

    #[test]
    fn age_groups_cover_all_twenty_codes() {
        for code in 1..=20u8 {
            assert_ne!(age_group_label(Some(code)), UNSPECIFIED, "code {code} unmapped");
        }
    }

    #[test]
    fn every_visible_label_resolves_to_codes() {
        // A selectable label missing from the code tables was a recurring bug
        // in earlier drafts of this dashboard; the vocabulary and the code
        // sets now come from the same tables, and this guards the invariant.
        for dimension in Dimension::ALL {
            for label in labels(dimension) {
                assert!(
                    raw_codes_for(dimension, label).is_ok(),
                    "label {label:?} of {dimension} has no raw codes"
                );
            }
        }
    }

    #[test]
    fn unknown_label_is_a_configuration_error() {
        let err = raw_codes_for(Dimension::Race, "Renda alta").unwrap_err();
        assert!(matches!(err, DataError::UnknownLabel { .. }));
    }

    #[test]
    fn label_round_trip_through_raw_codes() {
        let RawCodes::Letters(codes) =
            raw_codes_for(Dimension::Income, "De 3 a 6 salários mínimos").unwrap()
        else {
            panic!("income codes must be letters");
        };
        for &code in codes {
            assert_eq!(income_label(Some(code)), "De 3 a 6 salários mínimos");
        }
    }
}
