use std::collections::BTreeMap;

use super::categories::{self, UNSPECIFIED};
use super::geo::municipality_key;
use super::model::{ExamTable, Presence, Subject};

// ---------------------------------------------------------------------------
// 1. Presence scoreboard
// ---------------------------------------------------------------------------

/// Attendance counts for one proctored subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceCount {
    pub subject: Subject,
    pub present: usize,
    pub absent: usize,
    pub eliminated: usize,
    pub unknown: usize,
}

impl PresenceCount {
    /// Total rows accounted for; always equals the input row count.
    pub fn total(&self) -> usize {
        self.present + self.absent + self.eliminated + self.unknown
    }
}

/// Count rows by attendance status for each proctored subject, in canonical
/// subject order.
pub fn presence_scoreboard(table: &ExamTable) -> Vec<PresenceCount> {
    Subject::PROCTORED
        .iter()
        .map(|&subject| {
            let mut count = PresenceCount {
                subject,
                present: 0,
                absent: 0,
                eliminated: 0,
                unknown: 0,
            };
            for row in &table.rows {
                match row.status(subject) {
                    Presence::Present => count.present += 1,
                    Presence::Absent => count.absent += 1,
                    Presence::Eliminated => count.eliminated += 1,
                    Presence::Unknown => count.unknown += 1,
                }
            }
            count
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 2. Per-subject mean score
// ---------------------------------------------------------------------------

/// Mean score of one subject over its present test-takers.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectMean {
    pub subject: Subject,
    /// `None` when no row was present for the subject ("no data", not an
    /// error).
    pub mean: Option<f64>,
    /// Rows that contributed to the mean.
    pub takers: usize,
}

/// Mean score per subject, restricted to rows whose governing presence
/// status is `Present`, in canonical subject order.
pub fn subject_means(table: &ExamTable) -> Vec<SubjectMean> {
    Subject::ALL
        .iter()
        .map(|&subject| {
            let mut sum = 0.0;
            let mut takers = 0usize;
            for row in &table.rows {
                if row.status(subject) != Presence::Present {
                    continue;
                }
                if let Some(score) = row.score(subject) {
                    sum += score;
                    takers += 1;
                }
            }
            SubjectMean {
                subject,
                mean: (takers > 0).then(|| sum / takers as f64),
                takers,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 3. Overall mean score per row
// ---------------------------------------------------------------------------

/// A participant's overall score with the grouping attributes carried along.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallScore {
    pub score: f64,
    pub municipality: Option<i64>,
    pub age_bracket: Option<u8>,
}

/// Arithmetic mean across all five subject scores, one entry per row.
///
/// Rows missing any subject score are excluded entirely. This is the strict
/// all-subjects-required policy: a participant without a complete score set
/// contributes to no geographic or demographic aggregate.
pub fn overall_scores(table: &ExamTable) -> Vec<OverallScore> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let mut sum = 0.0;
            for subject in Subject::ALL {
                sum += row.score(subject)?;
            }
            Some(OverallScore {
                score: sum / Subject::ALL.len() as f64,
                municipality: row.municipality,
                age_bracket: row.age_bracket,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 4. Grouped means
// ---------------------------------------------------------------------------

/// Mean and contributing row count for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub mean: f64,
    pub count: usize,
}

/// Mean overall score per municipality, keyed by the normalized zero-padded
/// identifier shared with the boundary document. Rows without a municipality
/// are skipped.
pub fn mean_by_municipality(rows: &[OverallScore]) -> BTreeMap<String, GroupMean> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let Some(code) = row.municipality else {
            continue;
        };
        let entry = sums.entry(municipality_key(code)).or_insert((0.0, 0));
        entry.0 += row.score;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| {
            (
                key,
                GroupMean {
                    mean: sum / count as f64,
                    count,
                },
            )
        })
        .collect()
}

/// Mean overall score for one age group.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeGroupMean {
    pub label: &'static str,
    pub mean: f64,
    pub count: usize,
}

/// Mean overall score per age group, in the canonical group order (the
/// unspecified group last). Empty groups are omitted.
pub fn mean_by_age_group(rows: &[OverallScore]) -> Vec<AgeGroupMean> {
    let mut sums: BTreeMap<&'static str, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let label = categories::age_group_label(row.age_bracket);
        let entry = sums.entry(label).or_insert((0.0, 0));
        entry.0 += row.score;
        entry.1 += 1;
    }

    categories::AGE_GROUPS
        .iter()
        .map(|band| band.label)
        .chain(std::iter::once(UNSPECIFIED))
        .filter_map(|label| {
            sums.get(label).map(|&(sum, count)| AgeGroupMean {
                label,
                mean: sum / count as f64,
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ParticipantRow;

    fn row() -> ParticipantRow {
        ParticipantRow {
            scores: [Some(500.0); 5],
            presence: [Presence::Present; 4],
            income: Some('B'),
            completion_year: Some(1),
            race: Some(1),
            age_bracket: Some(3),
            municipality: Some(1100015),
        }
    }

    fn table(rows: Vec<ParticipantRow>) -> ExamTable {
        ExamTable { year: 2023, rows }
    }

    #[test]
    fn scoreboard_counts_sum_to_row_count() {
        let mut rows = vec![row(); 5];
        rows[0].presence = [Presence::Absent; 4];
        rows[1].presence = [Presence::Eliminated; 4];
        rows[2].presence[Subject::Mathematics.index()] = Presence::Unknown;
        let t = table(rows);

        for count in presence_scoreboard(&t) {
            assert_eq!(count.total(), t.len(), "subject {}", count.subject);
        }
    }

    #[test]
    fn scoreboard_keeps_canonical_subject_order() {
        let board = presence_scoreboard(&table(vec![row()]));
        let subjects: Vec<Subject> = board.iter().map(|c| c.subject).collect();
        assert_eq!(subjects, Subject::PROCTORED.to_vec());
    }

    #[test]
    fn subject_mean_ignores_non_present_rows() {
        let mut absent = row();
        absent.presence = [Presence::Absent; 4];
        // An absurd score on an absent row must not leak into the mean.
        absent.scores = [Some(9999.0); 5];

        let mut present = row();
        present.scores = [Some(600.0); 5];

        let means = subject_means(&table(vec![absent, present]));
        for subject_mean in &means {
            assert_eq!(subject_mean.mean, Some(600.0));
            assert_eq!(subject_mean.takers, 1);
        }
    }

    #[test]
    fn subject_mean_with_zero_takers_is_none() {
        let mut r = row();
        r.presence = [Presence::Absent; 4];
        let means = subject_means(&table(vec![r]));
        for subject_mean in means {
            assert_eq!(subject_mean.mean, None);
            assert_eq!(subject_mean.takers, 0);
        }
    }

    #[test]
    fn writing_mean_gated_by_languages_presence() {
        let mut r = row();
        r.presence[Subject::Languages.index()] = Presence::Absent;
        r.scores[Subject::Writing.index()] = Some(900.0);
        let means = subject_means(&table(vec![r]));
        let writing = means
            .iter()
            .find(|m| m.subject == Subject::Writing)
            .unwrap();
        assert_eq!(writing.mean, None);
    }

    #[test]
    fn overall_excludes_rows_missing_any_score() {
        let complete = row();
        let mut incomplete = row();
        incomplete.scores[Subject::Writing.index()] = None;

        let overall = overall_scores(&table(vec![complete, incomplete]));
        assert_eq!(overall.len(), 1);
        assert_eq!(overall[0].score, 500.0);
    }

    #[test]
    fn grouped_mean_by_municipality() {
        let mut a = row();
        a.scores = [Some(500.0); 5];
        let mut b = row();
        b.scores = [Some(600.0); 5];
        let overall = overall_scores(&table(vec![a, b]));

        let grouped = mean_by_municipality(&overall);
        let group = grouped.get("1100015").unwrap();
        assert_eq!(group.mean, 550.0);
        assert_eq!(group.count, 2);
    }

    #[test]
    fn municipality_keys_are_zero_padded_to_seven_digits() {
        // A short raw code must land in the same group as its padded form,
        // otherwise the boundary join silently produces zero matches.
        let mut short = row();
        short.municipality = Some(15);
        let overall = overall_scores(&table(vec![short]));

        let grouped = mean_by_municipality(&overall);
        assert!(grouped.contains_key("0000015"));
        assert!(!grouped.contains_key("15"));
    }

    #[test]
    fn rows_without_municipality_are_skipped_in_geo_grouping() {
        let mut r = row();
        r.municipality = None;
        let overall = overall_scores(&table(vec![r]));
        assert!(mean_by_municipality(&overall).is_empty());
    }

    #[test]
    fn grouped_mean_by_age_keeps_canonical_order() {
        let mut young = row();
        young.age_bracket = Some(1); // Até 17 anos
        let mut adult = row();
        adult.age_bracket = Some(12); // 26 a 35 anos
        adult.scores = [Some(700.0); 5];
        let mut unknown = row();
        unknown.age_bracket = None;

        let overall = overall_scores(&table(vec![adult, unknown, young]));
        let grouped = mean_by_age_group(&overall);

        let labels: Vec<&str> = grouped.iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["Até 17 anos", "26 a 35 anos", UNSPECIFIED]);
        assert_eq!(grouped[1].mean, 700.0);
    }
}
