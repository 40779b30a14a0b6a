//! Half-open binning of numeric columns into state labels.

use super::table::Dataset;
use anyhow::{Context, Result, anyhow, bail};
use log::debug;

/// Upper edge of the last bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpperEdge {
    Fixed(f64),
    /// The column's maximum plus this margin, computed from the data.
    DataMaxPlus(f64),
}

/// Bins `[lower_edges[i], lower_edges[i + 1])`, the last one closed by `upper`
/// (exclusive), each named by the matching entry of `labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSpec {
    pub column: String,
    pub output: String,
    pub lower_edges: Vec<f64>,
    pub upper: UpperEdge,
    pub labels: Vec<String>,
}

impl BinSpec {
    pub fn new(
        column: &str,
        output: &str,
        lower_edges: &[f64],
        upper: UpperEdge,
        labels: &[&str],
    ) -> Result<Self> {
        if lower_edges.is_empty() || lower_edges.len() != labels.len() {
            bail!(
                "{}: {} edges for {} labels",
                column,
                lower_edges.len(),
                labels.len()
            );
        }
        if lower_edges.windows(2).any(|w| w[0] >= w[1]) {
            bail!("{}: bin edges must be strictly increasing", column);
        }
        Ok(BinSpec {
            column: column.to_string(),
            output: output.to_string(),
            lower_edges: lower_edges.to_vec(),
            upper,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        })
    }

    /// All edges including the resolved upper one.
    fn resolve_edges(&self, observed: &[f64]) -> Result<Vec<f64>> {
        let upper = match self.upper {
            UpperEdge::Fixed(edge) => edge,
            UpperEdge::DataMaxPlus(margin) => {
                let max = observed
                    .iter()
                    .copied()
                    .reduce(f64::max)
                    .ok_or_else(|| anyhow!("{}: no values to take a maximum of", self.column))?;
                max + margin
            }
        };
        let mut edges = self.lower_edges.clone();
        if edges.last().is_some_and(|&last| last >= upper) {
            bail!("{}: upper edge {} is not above the last bin", self.column, upper);
        }
        edges.push(upper);
        Ok(edges)
    }

    fn label_for(&self, value: f64, edges: &[f64]) -> Option<&str> {
        edges
            .windows(2)
            .position(|w| w[0] <= value && value < w[1])
            .map(|i| self.labels[i].as_str())
    }
}

/// Copy `categorical` columns through and add one labelled column per bin
/// spec, in that order. Blank numeric cells stay blank.
pub fn discretize(data: &Dataset, categorical: &[String], bins: &[BinSpec]) -> Result<Dataset> {
    let mut columns: Vec<String> = Vec::with_capacity(categorical.len() + bins.len());
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(columns.capacity());

    for name in categorical {
        let values = data
            .column(name)
            .ok_or_else(|| anyhow!("column '{}' not found", name))?
            .map(String::from)
            .collect();
        columns.push(name.clone());
        cells.push(values);
    }

    for spec in bins {
        let raw: Vec<&str> = data
            .column(&spec.column)
            .ok_or_else(|| anyhow!("column '{}' not found", spec.column))?
            .collect();
        let parsed = raw
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                if cell.is_empty() {
                    return Ok(None);
                }
                cell.parse::<f64>().map(Some).with_context(|| {
                    format!("{} row {}: '{}' is not a number", spec.column, row + 1, cell)
                })
            })
            .collect::<Result<Vec<Option<f64>>>>()?;
        let observed: Vec<f64> = parsed.iter().flatten().copied().collect();
        let edges = spec.resolve_edges(&observed)?;
        debug!("{} -> {} with edges {:?}", spec.column, spec.output, edges);

        let labels = parsed
            .iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(String::new()),
                Some(v) => spec.label_for(*v, &edges).map(String::from).ok_or_else(|| {
                    anyhow!(
                        "{} row {}: {} falls outside every bin {:?}",
                        spec.column,
                        row + 1,
                        v,
                        edges
                    )
                }),
            })
            .collect::<Result<Vec<String>>>()?;
        columns.push(spec.output.clone());
        cells.push(labels);
    }

    let rows = (0..data.len())
        .map(|r| cells.iter().map(|column| column[r].clone()).collect())
        .collect();
    Dataset::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_bins() -> BinSpec {
        BinSpec::new(
            "age",
            "age_binned",
            &[28.0, 50.0, 65.0],
            UpperEdge::DataMaxPlus(1.0),
            &["Young", "Middle", "Old"],
        )
        .unwrap()
    }

    #[test]
    fn test_half_open_bins() {
        let data = Dataset::from_records(
            &["age", "sex"],
            &[&["28", "1"], &["49.9", "0"], &["50", "1"], &["77", "0"], &["", "1"]],
        )
        .unwrap();
        let out = discretize(&data, &["sex".to_string()], &[age_bins()]).unwrap();
        assert_eq!(out.columns(), &["sex", "age_binned"]);
        let labels: Vec<&str> = out.column("age_binned").unwrap().collect();
        assert_eq!(labels, vec!["Young", "Young", "Middle", "Old", ""]);
    }

    #[test]
    fn test_out_of_range_and_bad_numbers() {
        let low = Dataset::from_records(&["age"], &[&["20"]]).unwrap();
        let err = discretize(&low, &[], &[age_bins()]).unwrap_err();
        assert!(err.to_string().contains("outside every bin"));

        let text = Dataset::from_records(&["age"], &[&["old"]]).unwrap();
        assert!(discretize(&text, &[], &[age_bins()]).is_err());
    }

    #[test]
    fn test_fixed_upper_edge() {
        let spec = BinSpec::new("x", "x_b", &[0.0, 1.0], UpperEdge::Fixed(2.0), &["lo", "hi"])
            .unwrap();
        let data = Dataset::from_records(&["x"], &[&["1.5"], &["2.0"]]).unwrap();
        assert!(discretize(&data, &[], &[spec.clone()]).is_err());
        let ok = Dataset::from_records(&["x"], &[&["0.2"], &["1.99"]]).unwrap();
        let out = discretize(&ok, &[], &[spec]).unwrap();
        assert_eq!(out.column("x_b").unwrap().collect::<Vec<_>>(), vec!["lo", "hi"]);
    }

    #[test]
    fn test_spec_validation() {
        assert!(BinSpec::new("x", "y", &[1.0, 0.0], UpperEdge::Fixed(2.0), &["a", "b"]).is_err());
        assert!(BinSpec::new("x", "y", &[0.0], UpperEdge::Fixed(2.0), &["a", "b"]).is_err());
    }
}
