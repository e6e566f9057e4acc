use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use storage::models::{Contest, JournalEntry, Problem, ProblemDetail, ProblemId, Uid, User};

use crate::error::Result;
use crate::first_blood::FirstBlood;
use crate::format::{alphabetic_id, format_seconds};
use crate::rule::{RankedContest, RankedStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreboardConfig {
    /// Plain values for spreadsheets instead of compact cells
    pub is_export: bool,
    /// Adds identity columns to exports
    pub show_display_name: bool,
    /// Set when the viewer only gets the frozen board
    pub lock_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Rank,
    User,
    Email,
    String,
    TotalScore,
    Solved,
    Time,
    Problem,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    FirstBlood,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub kind: CellKind,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

impl Cell {
    pub fn new(kind: CellKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            hover: None,
            raw: None,
            score: None,
            highlight: None,
        }
    }

    fn with_hover(mut self, hover: impl Into<String>) -> Self {
        self.hover = Some(hover.into());
        self
    }

    fn with_raw(mut self, raw: impl ToString) -> Self {
        self.raw = Some(raw.to_string());
        self
    }
}

pub type Row = Vec<Cell>;

/// Submission counters shown in the problem header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProblemStat {
    pub n_submit: u32,
    pub n_accept: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoreboard {
    pub header: Row,
    pub rows: Vec<Row>,
    pub problem_stats: BTreeMap<ProblemId, ProblemStat>,
}

impl Scoreboard {
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in std::iter::once(&self.header).chain(self.rows.iter()) {
            csv.write_record(row.iter().map(|cell| cell.value.as_str()))?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// Projects a ranked contest into header and rows.
pub struct ScoreboardRenderer<'a> {
    pub config: ScoreboardConfig,
    pub contest: &'a Contest,
    pub users: &'a HashMap<Uid, User>,
    pub problems: &'a HashMap<ProblemId, Problem>,
}

impl ScoreboardRenderer<'_> {
    pub fn render(&self, ranked: &RankedContest) -> Scoreboard {
        let mut problem_stats: BTreeMap<ProblemId, ProblemStat> =
            self.contest.pids.iter().map(|pid| (*pid, ProblemStat::default())).collect();

        let header = self.header();
        let rows = ranked
            .entries
            .iter()
            .map(|entry| {
                self.count_submissions(&entry.status.journal, &mut problem_stats);
                self.row(entry, &ranked.first_blood)
            })
            .collect();

        Scoreboard {
            header,
            rows,
            problem_stats,
        }
    }

    fn header(&self) -> Row {
        let mut columns = vec![Cell::new(CellKind::Rank, "#"), Cell::new(CellKind::User, "User")];
        if self.config.is_export && self.config.show_display_name {
            columns.push(Cell::new(CellKind::Email, "Email"));
            columns.push(Cell::new(CellKind::String, "School"));
            columns.push(Cell::new(CellKind::String, "Name"));
            columns.push(Cell::new(CellKind::String, "Student ID"));
        }
        columns.push(Cell::new(CellKind::TotalScore, "Total Score"));
        columns.push(Cell::new(CellKind::Solved, "Accept\nTotal Time"));

        for (i, pid) in self.contest.pids.iter().enumerate() {
            if self.config.is_export {
                let title = self.problems.get(pid).map(|p| p.title.as_str()).unwrap_or("");
                columns.push(Cell::new(CellKind::String, format!("#{} {}", i + 1, title)));
                columns.push(Cell::new(CellKind::Time, format!("#{} Penalty (Minutes)", i + 1)));
            } else {
                columns.push(Cell::new(CellKind::Problem, alphabetic_id(i)).with_raw(pid));
            }
        }
        columns
    }

    fn row(&self, entry: &RankedStatus, first_blood: &FirstBlood) -> Row {
        let uid = entry.status.uid;
        let user = self.users.get(&uid);
        let uname = user.map(|u| u.uname.clone()).unwrap_or_else(|| format!("#{}", uid));

        let mut row = vec![
            Cell::new(CellKind::Rank, entry.rank.to_string()),
            Cell::new(CellKind::User, uname).with_raw(uid),
        ];
        if self.config.is_export && self.config.show_display_name {
            let text = |value: Option<&String>| value.cloned().unwrap_or_default();
            row.push(Cell::new(CellKind::Email, user.map(|u| u.mail.clone()).unwrap_or_default()));
            row.push(Cell::new(CellKind::String, text(user.and_then(|u| u.school.as_ref()))));
            row.push(Cell::new(CellKind::String, text(user.and_then(|u| u.display_name.as_ref()))));
            row.push(Cell::new(CellKind::String, text(user.and_then(|u| u.student_id.as_ref()))));
        }

        let standing = &entry.standing;
        row.push(Cell::new(CellKind::TotalScore, standing.score_sum.normalize().to_string()));
        row.push(
            Cell::new(
                CellKind::Time,
                format!("{}\n{}", standing.accept_count, format_seconds(standing.time, false)),
            )
            .with_hover(format_seconds(standing.time, true)),
        );

        for pid in &self.contest.pids {
            let (detail, pending) = if self.config.lock_at.is_some() {
                entry
                    .stat
                    .display
                    .get(pid)
                    .map(|e| (e.detail.as_ref(), e.pending))
                    .unwrap_or((None, 0))
            } else {
                (entry.stat.detail.get(pid), 0)
            };

            if self.config.is_export {
                row.extend(export_cells(detail));
            } else {
                row.push(record_cell(detail, pending, first_blood));
            }
        }
        row
    }

    fn count_submissions(&self, journal: &[JournalEntry], stats: &mut BTreeMap<ProblemId, ProblemStat>) {
        let mut accepted = HashSet::new();
        for entry in journal {
            let Some(stat) = stats.get_mut(&entry.pid) else {
                continue;
            };
            if self.config.lock_at.is_some_and(|lock_at| entry.submitted_at() > lock_at) {
                continue;
            }
            stat.n_submit += 1;
            if entry.status.is_accepted() && accepted.insert(entry.pid) {
                stat.n_accept += 1;
            }
        }
    }
}

fn export_cells(detail: Option<&ProblemDetail>) -> [Cell; 2] {
    let time = detail
        .filter(|d| d.is_accepted())
        .map(|d| format_seconds(d.time, false))
        .unwrap_or_default();
    let penalty = detail
        .map(|d| (d.time + 59).div_euclid(60).to_string())
        .unwrap_or_default();
    [Cell::new(CellKind::String, time), Cell::new(CellKind::String, penalty)]
}

fn record_cell(detail: Option<&ProblemDetail>, pending: u32, first_blood: &FirstBlood) -> Cell {
    let accepted = detail.is_some_and(ProblemDetail::is_accepted);

    let mut value = detail.map(|d| format!("-{}", d.wrong_attempts)).unwrap_or_default();
    let mut highlight = None;
    if let Some(d) = detail.filter(|d| d.is_accepted()) {
        let attempts = if d.wrong_attempts > 0 {
            format!("+{}", d.wrong_attempts)
        } else {
            "\u{2713}".to_string()
        };
        value = format!("{}\n{}", attempts, d.score.normalize());
        if first_blood.is_first(d) {
            highlight = Some(Highlight::FirstBlood);
        }
    } else if pending > 0 {
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(&format!("+{}", pending));
        highlight = Some(Highlight::Pending);
    }

    Cell {
        kind: CellKind::Record,
        value,
        hover: detail
            .filter(|d| d.is_accepted())
            .map(|d| format_seconds(d.time, true)),
        raw: detail.map(|d| d.rid.to_string()),
        score: Some(if accepted { 100 } else { 0 }),
        highlight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::tests::{contest_with, event};
    use crate::rule::CodelinkRule;
    use storage::models::{ContestStatus, PRIV_USER_PROFILE, Verdict};

    fn user(uid: Uid, uname: &str) -> User {
        User {
            uid,
            uname: uname.to_string(),
            mail: format!("{}@example.com", uname),
            school: Some("Tech".to_string()),
            display_name: Some(uname.to_uppercase()),
            student_id: None,
            privilege: PRIV_USER_PROFILE,
        }
    }

    fn fixture(lock_after: Option<i64>) -> (Contest, Vec<ContestStatus>, HashMap<Uid, User>, HashMap<ProblemId, Problem>) {
        let contest = contest_with(vec![1, 2], lock_after);
        let alice = vec![
            event(&contest, 1, 5 * 60, Verdict::Accepted),
            event(&contest, 2, 20 * 60, Verdict::WrongAnswer),
            event(&contest, 2, 70 * 60, Verdict::Accepted),
        ];
        let bob = vec![
            event(&contest, 1, 10 * 60, Verdict::WrongAnswer),
            event(&contest, 1, 12 * 60, Verdict::Accepted),
        ];
        let statuses = vec![
            ContestStatus::new("system", contest.contest_id, 10, bob),
            ContestStatus::new("system", contest.contest_id, 11, alice),
        ];
        let users = HashMap::from([(10, user(10, "bob")), (11, user(11, "alice"))]);
        let problems = HashMap::from([
            (1, Problem { domain_id: "system".to_string(), pid: 1, title: "Sum".to_string() }),
            (2, Problem { domain_id: "system".to_string(), pid: 2, title: "Paths".to_string() }),
        ]);
        (contest, statuses, users, problems)
    }

    fn render(config: ScoreboardConfig, lock_after: Option<i64>) -> Scoreboard {
        let (contest, statuses, users, problems) = fixture(lock_after);
        let now = contest.end_at;
        let ranked = CodelinkRule::default().ranked(&contest, statuses, now);
        ScoreboardRenderer {
            config,
            contest: &contest,
            users: &users,
            problems: &problems,
        }
        .render(&ranked)
    }

    fn values(row: &Row) -> Vec<&str> {
        row.iter().map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn test_interactive_header_uses_problem_labels() {
        let board = render(ScoreboardConfig::default(), None);
        assert_eq!(
            values(&board.header),
            vec!["#", "User", "Total Score", "Accept\nTotal Time", "A", "B"]
        );
        assert_eq!(board.header[4].raw.as_deref(), Some("1"));
    }

    #[test]
    fn test_export_header_has_identity_and_penalty_columns() {
        let config = ScoreboardConfig {
            is_export: true,
            show_display_name: true,
            lock_at: None,
        };
        let board = render(config, None);
        assert_eq!(
            values(&board.header),
            vec![
                "#",
                "User",
                "Email",
                "School",
                "Name",
                "Student ID",
                "Total Score",
                "Accept\nTotal Time",
                "#1 Sum",
                "#1 Penalty (Minutes)",
                "#2 Paths",
                "#2 Penalty (Minutes)",
            ]
        );
        let alice = &board.rows[0];
        assert_eq!(values(alice)[..7], ["1", "alice", "alice@example.com", "Tech", "ALICE", "", "2260"]);
        assert_eq!(values(alice)[8..], ["0:05", "5", "1:10", "70"]);
    }

    #[test]
    fn test_first_blood_cell_is_highlighted() {
        let board = render(ScoreboardConfig::default(), None);
        let alice = &board.rows[0];
        assert_eq!(alice[1].value, "alice");
        assert_eq!(alice[4].value, "\u{2713}\n1080");
        assert_eq!(alice[4].highlight, Some(Highlight::FirstBlood));
        assert_eq!(alice[5].value, "+1\n1180");

        let bob = &board.rows[1];
        assert_eq!(bob[4].value, "+1\n902");
        assert_eq!(bob[4].highlight, None);
        assert_eq!(bob[5].value, "");
    }

    #[test]
    fn test_frozen_board_shows_pending() {
        let (contest, ..) = fixture(Some(60));
        let config = ScoreboardConfig {
            lock_at: contest.lock_at,
            ..Default::default()
        };
        let board = render(config, Some(60));
        let alice = board.rows.iter().find(|r| r[1].value == "alice").unwrap();
        assert_eq!(alice[5].value, "-1 +1");
        assert_eq!(alice[5].highlight, Some(Highlight::Pending));
        assert_eq!(alice[3].value, "1\n0:05");

        assert_eq!(board.problem_stats[&2], ProblemStat { n_submit: 1, n_accept: 0 });
        assert_eq!(board.problem_stats[&1], ProblemStat { n_submit: 3, n_accept: 2 });
    }

    #[test]
    fn test_csv_export() {
        let config = ScoreboardConfig {
            is_export: true,
            ..Default::default()
        };
        let board = render(config, None);
        let mut out = Vec::new();
        board.write_csv(&mut out).unwrap();

        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(out.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[0][3], "Accept\nTotal Time");
        assert_eq!(&records[1][1], "alice");
        assert_eq!(&records[1][2], "2260");
        assert_eq!(&records[1][3], "2\n1:15");
        assert_eq!(&records[2][4], "0:12");
        assert_eq!(&records[2][5], "12");
    }
}
