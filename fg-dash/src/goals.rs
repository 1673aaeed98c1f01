//! Monthly sales goals workbook
//!
//! Optional local `.xlsx` with year / month / target columns on the first
//! sheet. A missing or unreadable file just means the monthly view renders
//! without a goals series.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::warn;

/// One row of the goals workbook
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyGoal {
    pub year: i32,
    pub month: u32,
    pub target: f64,
}

/// Read the goals workbook, or nothing if it is absent or unreadable
pub fn load_goals(path: &Path) -> Vec<MonthlyGoal> {
    if !path.exists() {
        return Vec::new();
    }

    let mut workbook = match open_workbook_auto(path) {
        Ok(wb) => wb,
        Err(e) => {
            warn!("Goals workbook {} unreadable: {}", path.display(), e);
            return Vec::new();
        }
    };

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            warn!("Goals sheet unreadable in {}: {}", path.display(), e);
            return Vec::new();
        }
        None => return Vec::new(),
    };

    // First row is the header
    range
        .rows()
        .skip(1)
        .filter_map(parse_goal_row)
        .collect()
}

fn parse_goal_row(row: &[Data]) -> Option<MonthlyGoal> {
    let year = cell_number(row.first()?)? as i32;
    let month = cell_number(row.get(1)?)? as u32;
    let target = cell_number(row.get(2)?)?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(MonthlyGoal {
        year,
        month,
        target,
    })
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Target for a specific year+month, if the workbook has one
pub fn goal_for(goals: &[MonthlyGoal], year: i32, month: u32) -> Option<f64> {
    goals
        .iter()
        .find(|g| g.year == year && g.month == month)
        .map(|g| g.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_no_goals() {
        let goals = load_goals(&PathBuf::from("/nonexistent/metas.xlsx"));
        assert!(goals.is_empty());
    }

    #[test]
    fn rows_with_bad_cells_are_skipped() {
        let good = vec![
            Data::Int(2024),
            Data::Int(3),
            Data::Float(125000.0),
        ];
        let bad_month = vec![Data::Int(2024), Data::Int(13), Data::Float(1.0)];
        let text_cells = vec![
            Data::String("2024".to_string()),
            Data::String("4".to_string()),
            Data::String("98000".to_string()),
        ];
        let junk = vec![Data::String("total".to_string()), Data::Empty, Data::Empty];

        assert_eq!(
            parse_goal_row(&good),
            Some(MonthlyGoal {
                year: 2024,
                month: 3,
                target: 125000.0
            })
        );
        assert_eq!(parse_goal_row(&bad_month), None);
        assert_eq!(
            parse_goal_row(&text_cells),
            Some(MonthlyGoal {
                year: 2024,
                month: 4,
                target: 98000.0
            })
        );
        assert_eq!(parse_goal_row(&junk), None);
    }

    #[test]
    fn goal_lookup_matches_year_and_month() {
        let goals = vec![
            MonthlyGoal {
                year: 2024,
                month: 1,
                target: 100.0,
            },
            MonthlyGoal {
                year: 2024,
                month: 2,
                target: 200.0,
            },
        ];
        assert_eq!(goal_for(&goals, 2024, 2), Some(200.0));
        assert_eq!(goal_for(&goals, 2023, 2), None);
        assert_eq!(goal_for(&goals, 2024, 3), None);
    }
}
