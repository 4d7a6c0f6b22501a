use std::collections::BTreeMap;
use std::path::Path;

use crate::data::aggregate::{
    self, AgeGroupMean, GroupMean, PresenceCount, SubjectMean,
};
use crate::data::error::DataError;
use crate::data::filter::{self, FilterChoice};
use crate::data::loader::DatasetCache;

// ---------------------------------------------------------------------------
// Request / outcome types
// ---------------------------------------------------------------------------

/// One user-triggered analysis run, resolved from the UI controls into an
/// immutable value before the pipeline starts.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub year: u16,
    pub filter: FilterChoice,
}

/// Aggregates derived from the rows with a complete score set. Absent from
/// the report when the all-subjects-required exclusion leaves nothing.
#[derive(Debug, Clone)]
pub struct OverallStats {
    /// Per-row overall scores (distribution for the box plot).
    pub scores: Vec<f64>,
    pub by_municipality: BTreeMap<String, GroupMean>,
    pub by_age_group: Vec<AgeGroupMean>,
}

/// Everything the presentation layer renders for one run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub year: u16,
    pub filter: FilterChoice,
    /// Rows remaining after the filter.
    pub total_rows: usize,
    pub presence: Vec<PresenceCount>,
    pub subject_means: Vec<SubjectMean>,
    pub overall: Option<OverallStats>,
}

/// Result of a run. The empty case is data, not an error: the UI shows a
/// "no data" state and no aggregation runs on zero rows.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Report(AnalysisReport),
    NoMatchingRows { year: u16, filter: FilterChoice },
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run Loader → Filter → Aggregation for one request.
///
/// Loader and mapper errors abort before any aggregation executes; an empty
/// filter result short-circuits into [`AnalysisOutcome::NoMatchingRows`].
pub fn run(
    cache: &mut DatasetCache,
    data_dir: &Path,
    request: &AnalysisRequest,
) -> Result<AnalysisOutcome, DataError> {
    let table = cache.table(data_dir, request.year)?;
    let filtered = filter::apply(&table, &request.filter)?;
    log::info!(
        "analysis {}: {} of {} rows match ({})",
        request.year,
        filtered.len(),
        table.len(),
        request.filter
    );

    if filtered.is_empty() {
        return Ok(AnalysisOutcome::NoMatchingRows {
            year: request.year,
            filter: request.filter.clone(),
        });
    }

    let presence = aggregate::presence_scoreboard(&filtered);
    let subject_means = aggregate::subject_means(&filtered);

    let overall_rows = aggregate::overall_scores(&filtered);
    let overall = if overall_rows.is_empty() {
        log::info!("analysis {}: no rows with a complete score set", request.year);
        None
    } else {
        let by_municipality = aggregate::mean_by_municipality(&overall_rows);
        let by_age_group = aggregate::mean_by_age_group(&overall_rows);
        Some(OverallStats {
            scores: overall_rows.iter().map(|r| r.score).collect(),
            by_municipality,
            by_age_group,
        })
    };

    Ok(AnalysisOutcome::Report(AnalysisReport {
        year: request.year,
        filter: request.filter.clone(),
        total_rows: filtered.len(),
        presence,
        subject_means,
        overall,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::categories::Dimension;
    use crate::data::model::{ExamTable, ParticipantRow, Presence, Subject};
    use crate::data::loader::EXAM_YEARS;

    fn participant(income: char, municipality: Option<i64>) -> ParticipantRow {
        ParticipantRow {
            scores: [Some(500.0); 5],
            presence: [Presence::Present; 4],
            income: Some(income),
            completion_year: Some(1),
            race: Some(3),
            age_bracket: Some(4),
            municipality,
        }
    }

    /// The four-row scenario: A matches income code 'A', B is incomplete,
    /// C shares A's municipality, D sits elsewhere.
    fn scenario() -> ExamTable {
        let row_a = participant('A', Some(1100015));
        let mut row_b = participant('C', Some(1100015));
        row_b.scores[Subject::Mathematics.index()] = None;
        let mut row_c = participant('C', Some(1100015));
        row_c.scores = [Some(600.0); 5];
        let row_d = participant('H', Some(1100023));
        ExamTable {
            year: 2023,
            rows: vec![row_a, row_b, row_c, row_d],
        }
    }

    fn write_scenario(dir: &Path) {
        let header = "NU_NOTA_CH;NU_NOTA_CN;NU_NOTA_MT;NU_NOTA_LC;NU_NOTA_REDACAO;\
TP_PRESENCA_CH;TP_PRESENCA_CN;TP_PRESENCA_MT;TP_PRESENCA_LC;\
Q006;TP_ANO_CONCLUIU;TP_COR_RACA;TP_FAIXA_ETARIA;CO_MUNICIPIO_PROVA";
        let body = "\
500;500;500;500;500;1;1;1;1;A;1;3;4;1100015
500;500;;500;500;1;1;1;1;C;1;3;4;1100015
600;600;600;600;600;1;1;1;1;C;1;3;4;1100015
500;500;500;500;500;1;1;1;1;H;1;3;4;1100023";
        std::fs::write(dir.join("enem_2023.csv"), format!("{header}\n{body}\n")).unwrap();
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir =
            std::env::temp_dir().join(format!("enem-dash-analysis-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn filter_with_no_match_yields_no_matching_rows() {
        let dir = temp_dir("empty");
        write_scenario(&dir);
        let mut cache = DatasetCache::new();

        // "Até 1 salário mínimo" maps to {'B'}: no row carries 'B'.
        let outcome = run(
            &mut cache,
            &dir,
            &AnalysisRequest {
                year: 2023,
                filter: FilterChoice::Value {
                    dimension: Dimension::Income,
                    label: "Até 1 salário mínimo".to_string(),
                },
            },
        )
        .unwrap();
        assert!(matches!(outcome, AnalysisOutcome::NoMatchingRows { year: 2023, .. }));
    }

    #[test]
    fn income_filter_selects_exactly_the_matching_row() {
        let dir = temp_dir("match");
        write_scenario(&dir);
        let mut cache = DatasetCache::new();

        let outcome = run(
            &mut cache,
            &dir,
            &AnalysisRequest {
                year: 2023,
                filter: FilterChoice::Value {
                    dimension: Dimension::Income,
                    label: "Nenhuma renda".to_string(),
                },
            },
        )
        .unwrap();
        let AnalysisOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.total_rows, 1);
        let stats = report.overall.unwrap();
        assert_eq!(stats.scores, vec![500.0]);
    }

    #[test]
    fn unfiltered_run_groups_municipalities_over_complete_rows_only() {
        let dir = temp_dir("grouped");
        write_scenario(&dir);
        let mut cache = DatasetCache::new();

        let outcome = run(
            &mut cache,
            &dir,
            &AnalysisRequest {
                year: 2023,
                filter: FilterChoice::None,
            },
        )
        .unwrap();
        let AnalysisOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.total_rows, 4);

        // Row B lacks one score: municipality 1100015 averages rows A and C.
        let stats = report.overall.unwrap();
        assert_eq!(stats.scores.len(), 3);
        let group = stats.by_municipality.get("1100015").unwrap();
        assert_eq!(group.count, 2);
        assert_eq!(group.mean, 550.0);
        assert_eq!(stats.by_municipality.get("1100023").unwrap().mean, 500.0);
    }

    #[test]
    fn report_without_complete_rows_has_no_overall_section() {
        // All rows missing a score: presence and subject means still render.
        let mut table = scenario();
        for row in &mut table.rows {
            row.scores[Subject::Writing.index()] = None;
        }
        let presence = crate::data::aggregate::presence_scoreboard(&table);
        assert_eq!(presence[0].present, 4);
        let overall = crate::data::aggregate::overall_scores(&table);
        assert!(overall.is_empty());
    }

    #[test]
    fn loader_errors_abort_the_run() {
        let dir = temp_dir("no-file");
        let mut cache = DatasetCache::new();
        let err = run(
            &mut cache,
            &dir,
            &AnalysisRequest {
                year: 2020,
                filter: FilterChoice::None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
        assert!(EXAM_YEARS.contains(&2020));
    }
}
