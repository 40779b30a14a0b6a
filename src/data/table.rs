use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A rectangular table of string cells with named columns.
///
/// Blank cells are kept as empty strings and mean "not observed".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                bail!("column '{}' appears twice", name);
            }
        }
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            bail!(
                "row {} has {} cells, expected {}",
                index + 1,
                row.len(),
                columns.len()
            );
        }
        Ok(Dataset { columns, rows })
    }

    /// Build from string literals; handy for small hand-written tables.
    pub fn from_records(columns: &[&str], rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let data = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse {}", path.display()))?;
        debug!(
            "read {} rows x {} columns from {}",
            data.len(),
            data.columns.len(),
            path.display()
        );
        Ok(data)
    }

    /// Header line followed by comma-separated rows. Cells are trimmed and a
    /// pair of surrounding double quotes is dropped. Blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(anyhow!("missing header line")),
            }
        };
        let columns = split_line(&header);

        let mut rows = Vec::new();
        for (number, line) in lines.enumerate() {
            let line = line.with_context(|| format!("line {}", number + 2))?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(split_line(&line));
        }
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    /// Project onto `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Dataset> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| anyhow!("column '{}' not found", name))
            })
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Dataset::new(names.iter().map(|n| n.to_string()).collect(), rows)
    }

    /// Append a column; `values` needs one cell per row.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if self.column_index(name).is_some() {
            bail!("column '{}' already exists", name);
        }
        if values.len() != self.rows.len() {
            bail!(
                "column '{}' has {} cells for {} rows",
                name,
                values.len(),
                self.rows.len()
            );
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn split_line(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| {
            let cell = cell.trim();
            cell.strip_prefix('"')
                .and_then(|c| c.strip_suffix('"'))
                .unwrap_or(cell)
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let text = "age, sex ,\"target\"\n63,1,0\n\n41, 0 ,\"1\"\n";
        let data = Dataset::from_reader(text.as_bytes()).unwrap();
        assert_eq!(data.columns(), &["age", "sex", "target"]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows()[1], vec!["41", "0", "1"]);
        assert_eq!(data.column("sex").unwrap().collect::<Vec<_>>(), vec!["1", "0"]);
        assert!(data.column("chol").is_none());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let text = "a,b\n1,2\n3\n";
        let err = Dataset::from_reader(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
        assert!(Dataset::from_reader("".as_bytes()).is_err());
    }

    #[test]
    fn test_select_and_push_column() {
        let mut data = Dataset::from_records(&["a", "b", "c"], &[&["1", "2", "3"]]).unwrap();
        let projected = data.select(&["c", "a"]).unwrap();
        assert_eq!(projected.rows()[0], vec!["3", "1"]);
        assert!(data.select(&["z"]).is_err());

        data.push_column("d", vec!["4".to_string()]).unwrap();
        assert_eq!(data.rows()[0].len(), 4);
        assert!(data.push_column("d", vec!["5".to_string()]).is_err());
        assert!(data.push_column("e", vec![]).is_err());
    }
}
