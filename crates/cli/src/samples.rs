//! Tabular sample output (CSV, or Parquet by extension).

use anyhow::{Context, Result};
use opgen::api::{PartialAssignment, Task};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

/// One column per variable, named after it; unassigned entries are null.
pub fn samples_frame(task: &Task, samples: &[PartialAssignment]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(task.num_variables() + 1);
    let index: Vec<u32> = (0..samples.len() as u32).collect();
    columns.push(Series::new("sample".into(), index));
    for (var, variable) in task.variables().iter().enumerate() {
        let values: Vec<Option<u32>> = samples.iter().map(|s| s.get(var)).collect();
        columns.push(Series::new(variable.name.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

pub fn write_samples(path: &Path, task: &Task, samples: &[PartialAssignment]) -> Result<()> {
    let mut df = samples_frame(task, samples)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "parquet") {
        ParquetWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("writing {}", path.display()))?;
    } else {
        CsvWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    tracing::info!(rows = df.height(), cols = df.width(), path = %path.display(), "samples written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opgen::api::{MutexTable, Operator, OperatorId, Variable};
    use tempfile::tempdir;

    fn two_var_task() -> Task {
        let variables = vec![
            Variable {
                name: "x".to_string(),
                domain_size: 3,
            },
            Variable {
                name: "y".to_string(),
                domain_size: 2,
            },
        ];
        let op = Operator {
            id: OperatorId(0),
            name: "noop".to_string(),
            cost: 1,
            preconditions: vec![],
            effects: vec![],
        };
        Task::new(variables, vec![op], vec![2, 1], vec![], MutexTable::new()).unwrap()
    }

    #[test]
    fn frame_has_null_for_unassigned() {
        let task = two_var_task();
        let full = task.initial_state().as_partial().clone();
        let partial = full.with_value(1, None);
        let df = samples_frame(&task, &[full, partial]).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("y").unwrap().null_count(), 1);
        assert_eq!(df.column("x").unwrap().null_count(), 0);
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/samples.csv");
        let task = two_var_task();
        let s = task.initial_state().as_partial().clone();
        write_samples(&path, &task, &[s.clone(), s]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "sample,x,y");
        assert_eq!(lines[1], "0,2,1");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn parquet_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("samples.parquet");
        let task = two_var_task();
        let s = task.initial_state().as_partial().clone();
        write_samples(&path, &task, &[s]).unwrap();
        let df = LazyFrame::scan_parquet(&path, ScanArgsParquet::default())
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(df.shape(), (1, 3));
    }
}
