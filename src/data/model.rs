use std::fmt;

// ---------------------------------------------------------------------------
// Subject – the five ENEM exam areas
// ---------------------------------------------------------------------------

/// One of the five ENEM subject areas, in the canonical display order used by
/// every table and chart.
///
/// The first four are proctored tests with their own attendance column;
/// Writing (Redação) is sat on the Languages exam day and shares its
/// attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Humanities,
    NaturalSciences,
    Mathematics,
    Languages,
    Writing,
}

impl Subject {
    /// All five subjects, canonical order.
    pub const ALL: [Subject; 5] = [
        Subject::Humanities,
        Subject::NaturalSciences,
        Subject::Mathematics,
        Subject::Languages,
        Subject::Writing,
    ];

    /// The four subjects with their own presence status column.
    pub const PROCTORED: [Subject; 4] = [
        Subject::Humanities,
        Subject::NaturalSciences,
        Subject::Mathematics,
        Subject::Languages,
    ];

    /// Display name as shown in the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Subject::Humanities => "Ciências Humanas",
            Subject::NaturalSciences => "Ciências da Natureza",
            Subject::Mathematics => "Matemática",
            Subject::Languages => "Linguagens e Códigos",
            Subject::Writing => "Redação",
        }
    }

    /// Score column name in the microdata extract.
    pub fn score_column(self) -> &'static str {
        match self {
            Subject::Humanities => "NU_NOTA_CH",
            Subject::NaturalSciences => "NU_NOTA_CN",
            Subject::Mathematics => "NU_NOTA_MT",
            Subject::Languages => "NU_NOTA_LC",
            Subject::Writing => "NU_NOTA_REDACAO",
        }
    }

    /// Presence column name; `None` for Writing, which has no column of its
    /// own.
    pub fn presence_column(self) -> Option<&'static str> {
        match self {
            Subject::Humanities => Some("TP_PRESENCA_CH"),
            Subject::NaturalSciences => Some("TP_PRESENCA_CN"),
            Subject::Mathematics => Some("TP_PRESENCA_MT"),
            Subject::Languages => Some("TP_PRESENCA_LC"),
            Subject::Writing => None,
        }
    }

    /// The subject whose presence status governs this subject's score.
    /// Writing is tied to the Languages exam day.
    pub fn status_source(self) -> Subject {
        match self {
            Subject::Writing => Subject::Languages,
            other => other,
        }
    }

    /// Position in [`Subject::ALL`]; index into [`ParticipantRow::scores`].
    pub fn index(self) -> usize {
        match self {
            Subject::Humanities => 0,
            Subject::NaturalSciences => 1,
            Subject::Mathematics => 2,
            Subject::Languages => 3,
            Subject::Writing => 4,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Presence – per-subject attendance status
// ---------------------------------------------------------------------------

/// Attendance status of a participant for one proctored subject.
/// A score is meaningful only when the status is `Present`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Absent,
    Present,
    Eliminated,
    /// Missing or out-of-domain status code.
    Unknown,
}

impl Presence {
    pub fn from_code(code: Option<u8>) -> Self {
        match code {
            Some(0) => Presence::Absent,
            Some(1) => Presence::Present,
            Some(2) => Presence::Eliminated,
            _ => Presence::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// ParticipantRow – one exam-taker
// ---------------------------------------------------------------------------

/// A single participant record (one row of the yearly extract).
#[derive(Debug, Clone)]
pub struct ParticipantRow {
    /// Subject scores in canonical order; `None` for empty or non-numeric
    /// cells.
    pub scores: [Option<f64>; 5],
    /// Presence status for the four proctored subjects, in
    /// [`Subject::PROCTORED`] order.
    pub presence: [Presence; 4],
    /// Income-bracket raw code (questionnaire letter `A..=Q`).
    pub income: Option<char>,
    /// Years-since-completion raw code (0 = not informed).
    pub completion_year: Option<u8>,
    /// Race/ethnicity raw code (0..=5).
    pub race: Option<u8>,
    /// Age-bracket raw code (1..=20).
    pub age_bracket: Option<u8>,
    /// Municipality identifier of the exam site.
    pub municipality: Option<i64>,
}

impl ParticipantRow {
    pub fn score(&self, subject: Subject) -> Option<f64> {
        self.scores[subject.index()]
    }

    /// Presence status governing the given subject's score.
    pub fn status(&self, subject: Subject) -> Presence {
        self.presence[subject.status_source().index()]
    }
}

// ---------------------------------------------------------------------------
// ExamTable – the loaded yearly dataset
// ---------------------------------------------------------------------------

/// The full yearly table. Immutable after load; filtering always derives a
/// fresh table.
#[derive(Debug, Clone)]
pub struct ExamTable {
    pub year: u16,
    pub rows: Vec<ParticipantRow>,
}

impl ExamTable {
    /// Number of participant rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_status_follows_languages() {
        let mut row = ParticipantRow {
            scores: [Some(500.0); 5],
            presence: [Presence::Present; 4],
            income: None,
            completion_year: None,
            race: None,
            age_bracket: None,
            municipality: None,
        };
        row.presence[Subject::Languages.index()] = Presence::Absent;
        assert_eq!(row.status(Subject::Writing), Presence::Absent);
        assert_eq!(row.status(Subject::Mathematics), Presence::Present);
    }

    #[test]
    fn presence_from_code_maps_unknown() {
        assert_eq!(Presence::from_code(Some(0)), Presence::Absent);
        assert_eq!(Presence::from_code(Some(1)), Presence::Present);
        assert_eq!(Presence::from_code(Some(2)), Presence::Eliminated);
        assert_eq!(Presence::from_code(Some(9)), Presence::Unknown);
        assert_eq!(Presence::from_code(None), Presence::Unknown);
    }
}
