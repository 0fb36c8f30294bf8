use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::models::{Record, Variable};

/// Running co-moments for one pair of columns (Welford update)
#[derive(Debug, Clone, Copy, Default)]
pub struct PairAccumulator {
    count: usize,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    co_moment: f64,
}

impl PairAccumulator {
    pub fn push(&mut self, x: f64, y: f64) {
        self.count += 1;
        let n = self.count as f64;
        let dx = x - self.mean_x;
        self.mean_x += dx / n;
        let dy = y - self.mean_y;
        self.mean_y += dy / n;
        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.co_moment += dx * (y - self.mean_y);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Pearson r, or `None` when either side has zero variance
    pub fn pearson(&self) -> Option<f64> {
        if self.count < 2 || self.m2_x <= 0.0 || self.m2_y <= 0.0 {
            return None;
        }
        let r = self.co_moment / (self.m2_x.sqrt() * self.m2_y.sqrt());
        Some(r.clamp(-1.0, 1.0))
    }
}

/// Symmetric pairwise-complete Pearson correlation matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<Variable>,
    /// `None` off the diagonal when a column is constant over the paired rows
    pub values: Vec<Vec<Option<f64>>>,
    pub pair_counts: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub fn compute<'a, I>(records: I, variables: &[Variable]) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        if variables.is_empty() {
            return Err(AnalysisError::InvalidSelection(
                "correlation needs at least one column".to_string(),
            ));
        }
        for (i, v) in variables.iter().enumerate() {
            if variables[..i].contains(v) {
                return Err(AnalysisError::InvalidSelection(format!(
                    "column {} requested twice",
                    v
                )));
            }
        }

        let n = variables.len();
        let mut accumulators = vec![vec![PairAccumulator::default(); n]; n];

        for record in records {
            let row: Vec<Option<f64>> = variables.iter().map(|v| v.value(record)).collect();
            for i in 0..n {
                let Some(x) = row[i] else { continue };
                for j in i..n {
                    if let Some(y) = row[j] {
                        accumulators[i][j].push(x, y);
                    }
                }
            }
        }

        let mut values = vec![vec![None; n]; n];
        let mut pair_counts = vec![vec![0; n]; n];

        for i in 0..n {
            for j in i..n {
                let acc = &accumulators[i][j];
                if acc.count() < 2 {
                    return Err(AnalysisError::InsufficientData(format!(
                        "{} paired observations of {} and {}",
                        acc.count(),
                        variables[i],
                        variables[j]
                    )));
                }

                let r = if i == j { Some(1.0) } else { acc.pearson() };
                values[i][j] = r;
                values[j][i] = r;
                pair_counts[i][j] = acc.count();
                pair_counts[j][i] = acc.count();
            }
        }

        Ok(Self {
            variables: variables.to_vec(),
            values,
            pair_counts,
        })
    }

    fn index_of(&self, variable: Variable) -> Option<usize> {
        self.variables.iter().position(|v| *v == variable)
    }

    pub fn get(&self, a: Variable, b: Variable) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.values[i][j]
    }

    pub fn pair_count(&self, a: Variable, b: Variable) -> Option<usize> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.pair_counts[i][j])
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.variables.len();
        (0..n).all(|i| (0..n).all(|j| self.values[i][j] == self.values[j][i]))
    }
}
