//! Flat tabular view of a trajectory.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const REWARD_COLUMN: &str = "reward";
pub const DONE_COLUMN: &str = "done";

/// One timestep of a [`DataFrame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Flattened fluent elements, aligned with the fluent columns.
    pub values: Vec<f32>,
    pub reward: f32,
    pub done: bool,
}

/// Table with one row per step and one column per fluent element, followed
/// by `reward` and `done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    fluent_columns: Vec<String>,
    rows: Vec<Row>,
}

impl DataFrame {
    pub(crate) fn new(fluent_columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            fluent_columns,
            rows,
        }
    }

    /// All column names, `reward` and `done` last.
    pub fn columns(&self) -> Vec<&str> {
        self.fluent_columns
            .iter()
            .map(String::as_str)
            .chain([REWARD_COLUMN, DONE_COLUMN])
            .collect()
    }

    pub fn n_columns(&self) -> usize {
        self.fluent_columns.len() + 2
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Values of one column in step order; `done` reads as `0.0` / `1.0`.
    pub fn column(&self, name: &str) -> Option<Vec<f32>> {
        match name {
            REWARD_COLUMN => Some(self.rows.iter().map(|r| r.reward).collect()),
            DONE_COLUMN => Some(
                self.rows
                    .iter()
                    .map(|r| if r.done { 1.0 } else { 0.0 })
                    .collect(),
            ),
            _ => {
                let idx = self.fluent_columns.iter().position(|c| c == name)?;
                Some(self.rows.iter().map(|r| r.values[idx]).collect())
            }
        }
    }

    /// Writes the table as CSV with a header line.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        let header: Vec<String> = self.columns().into_iter().map(quote).collect();
        writeln!(writer, "{}", header.join(","))?;
        for row in &self.rows {
            let mut fields: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
            fields.push(row.reward.to_string());
            fields.push(row.done.to_string());
            writeln!(writer, "{}", fields.join(","))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn quote(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(
            vec!["x".into(), "dist(l1,l2)".into()],
            vec![
                Row {
                    values: vec![1.0, 0.5],
                    reward: -1.0,
                    done: false,
                },
                Row {
                    values: vec![2.0, 0.25],
                    reward: 3.5,
                    done: true,
                },
            ],
        )
    }

    #[test]
    fn columns_end_with_reward_and_done() {
        let df = frame();
        assert_eq!(df.columns(), vec!["x", "dist(l1,l2)", "reward", "done"]);
        assert_eq!(df.n_columns(), 4);
        assert_eq!(df.n_rows(), 2);
    }

    #[test]
    fn column_lookup() {
        let df = frame();
        assert_eq!(df.column("x"), Some(vec![1.0, 2.0]));
        assert_eq!(df.column("reward"), Some(vec![-1.0, 3.5]));
        assert_eq!(df.column("done"), Some(vec![0.0, 1.0]));
        assert_eq!(df.column("missing"), None);
    }

    #[test]
    fn csv_quotes_names_with_commas() {
        let csv = frame().to_csv_string().unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "x,\"dist(l1,l2)\",reward,done");
        assert_eq!(lines[1], "1,0.5,-1,false");
        assert_eq!(lines[2], "2,0.25,3.5,true");
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(frame()).unwrap();
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    }
}
