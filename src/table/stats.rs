//! Per-column descriptive statistics.
//!
//! A column is numeric when every non-empty cell parses as a number; blank
//! cells are treated as missing values. Quantiles use linear interpolation
//! between closest ranks and the standard deviation is the sample one.

use std::collections::HashMap;
use std::fmt;

/// Statistics of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Number of non-empty cells.
    pub count: usize,
    /// Kind-specific figures.
    pub kind: ColumnKind,
}

/// Figures depending on the column type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// Every non-empty cell is a number.
    Numeric {
        /// Arithmetic mean.
        mean: f64,
        /// Sample standard deviation, absent with fewer than two values.
        std: Option<f64>,
        /// Smallest value.
        min: f64,
        /// First quartile.
        q1: f64,
        /// Median.
        median: f64,
        /// Third quartile.
        q3: f64,
        /// Largest value.
        max: f64,
    },
    /// Free text (or an entirely empty column).
    Categorical {
        /// Number of distinct values.
        unique: usize,
        /// Most frequent value; ties go to the value seen first.
        top: Option<String>,
        /// Frequency of `top`.
        freq: usize,
    },
}

impl ColumnStats {
    /// Compute statistics over the cells of one column.
    #[must_use]
    pub fn compute<'a, I>(name: &str, cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values: Vec<&str> = cells.into_iter().filter(|c| !c.is_empty()).collect();
        let count = values.len();

        let numbers: Option<Vec<f64>> = if values.is_empty() {
            None
        } else {
            values
                .iter()
                .map(|v| v.parse::<f64>().ok().filter(|n| n.is_finite()))
                .collect()
        };

        let kind = match numbers {
            Some(mut numbers) => numeric(&mut numbers),
            None => categorical(&values),
        };

        Self {
            name: name.to_string(),
            count,
            kind,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn numeric(values: &mut [f64]) -> ColumnKind {
    values.sort_by(f64::total_cmp);
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.len() > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    });

    ColumnKind::Numeric {
        mean,
        std,
        min: values[0],
        q1: quantile(values, 0.25),
        median: quantile(values, 0.5),
        q3: quantile(values, 0.75),
        max: values[values.len() - 1],
    }
}

/// Quantile of sorted, non-empty data with linear interpolation.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - position.floor();
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

fn categorical(values: &[&str]) -> ColumnKind {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for &value in values {
        let entry = counts.entry(value).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }

    let mut top: Option<(&str, usize)> = None;
    for &value in &order {
        let freq = counts.get(value).copied().unwrap_or(0);
        if top.is_none_or(|(_, best)| freq > best) {
            top = Some((value, freq));
        }
    }

    ColumnKind::Categorical {
        unique: order.len(),
        top: top.map(|(value, _)| value.to_string()),
        freq: top.map_or(0, |(_, freq)| freq),
    }
}

/// Format a number compactly: integers without decimals, others with up to
/// four decimals.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let fixed = format!("{value:.4}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl fmt::Display for ColumnStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: count={}", self.name, self.count)?;
        match &self.kind {
            ColumnKind::Numeric {
                mean,
                std,
                min,
                q1,
                median,
                q3,
                max,
            } => {
                write!(f, ", mean={}", format_number(*mean))?;
                match std {
                    Some(std) => write!(f, ", std={}", format_number(*std))?,
                    None => write!(f, ", std=n/a")?,
                }
                write!(
                    f,
                    ", min={}, 25%={}, 50%={}, 75%={}, max={}",
                    format_number(*min),
                    format_number(*q1),
                    format_number(*median),
                    format_number(*q3),
                    format_number(*max)
                )
            }
            ColumnKind::Categorical { unique, top, freq } => {
                write!(f, ", unique={unique}")?;
                if let Some(top) = top {
                    write!(f, ", top={top}, freq={freq}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_numeric_statistics() {
        let stats = ColumnStats::compute("x", ["1", "2", "3", "4"]);
        assert_eq!(stats.count, 4);
        assert!(matches!(stats.kind, ColumnKind::Numeric { .. }));
        if let ColumnKind::Numeric {
            mean,
            std,
            min,
            q1,
            median,
            q3,
            max,
        } = stats.kind
        {
            assert!(approx(mean, 2.5));
            assert!(approx(std.unwrap_or_default(), 1.290_994_448_735_805_6));
            assert!(approx(min, 1.0));
            assert!(approx(q1, 1.75));
            assert!(approx(median, 2.5));
            assert!(approx(q3, 3.25));
            assert!(approx(max, 4.0));
        }
    }

    #[test]
    fn test_blank_cells_are_missing() {
        let stats = ColumnStats::compute("x", ["10", "", "30"]);
        assert_eq!(stats.count, 2);
        assert!(matches!(stats.kind, ColumnKind::Numeric { mean, .. } if approx(mean, 20.0)));
    }

    #[test]
    fn test_single_value_has_no_std() {
        let stats = ColumnStats::compute("x", ["7"]);
        assert!(matches!(stats.kind, ColumnKind::Numeric { std: None, .. }));
    }

    #[test]
    fn test_mixed_column_is_categorical() {
        let stats = ColumnStats::compute("city", ["Paris", "Lyon", "Paris", "3"]);
        assert_eq!(
            stats.kind,
            ColumnKind::Categorical {
                unique: 3,
                top: Some("Paris".to_string()),
                freq: 2,
            }
        );
    }

    #[test]
    fn test_top_tie_keeps_first_seen() {
        let stats = ColumnStats::compute("c", ["b", "a", "a", "b"]);
        assert!(matches!(stats.kind, ColumnKind::Categorical { top: Some(ref t), freq: 2, .. } if t == "b"));
    }

    #[test]
    fn test_empty_column() {
        let stats = ColumnStats::compute("c", ["", ""]);
        assert_eq!(stats.count, 0);
        assert_eq!(
            stats.kind,
            ColumnKind::Categorical {
                unique: 0,
                top: None,
                freq: 0,
            }
        );
        assert_eq!(stats.to_string(), "c: count=0, unique=0");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.290_994_448), "1.291");
        assert_eq!(format_number(-0.125), "-0.125");
    }

    #[test]
    fn test_display_numeric() {
        let stats = ColumnStats::compute("age", ["30", "25", "35"]);
        assert_eq!(
            stats.to_string(),
            "age: count=3, mean=30, std=5, min=25, 25%=27.5, 50%=30, 75%=32.5, max=35"
        );
    }
}
