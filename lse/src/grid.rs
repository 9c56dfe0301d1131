//! Reading candidate grids from and writing arrays to comma separated files.
//!
//! A grid file stores `depth` blocks of `height` lines, each line holding `width`
//! comma separated target values. The value at column `i` of line `j + k * height`
//! is the target of the point `(i, j[, k])` stored at linear index
//! `j + i * height + k * width * height` in the candidate pool.
use crate::errors::{LseError, Result};
use crate::pool::CandidatePool;

use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Shape of a grid file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of values per line
    pub width: usize,
    /// Number of lines per depth block
    pub height: usize,
    /// Number of depth blocks
    pub depth: usize,
    /// Whether the depth coordinate is part of the inputs
    pub store_depth: bool,
}

impl GridSpec {
    /// A single block grid of `width` x `height` points in 2D
    pub fn new(width: usize, height: usize) -> Self {
        GridSpec {
            width,
            height,
            depth: 1,
            store_depth: false,
        }
    }

    /// Sets the number of depth blocks
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Sets whether the depth coordinate is used as third input component
    pub fn store_depth(mut self, store_depth: bool) -> Self {
        self.store_depth = store_depth;
        self
    }

    /// Number of grid points
    pub fn n_points(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Input space dimension, 2 or 3
    pub fn input_dim(&self) -> usize {
        if self.store_depth {
            3
        } else {
            2
        }
    }

    /// Linear index of grid point `(i, j, k)`
    pub fn linear_index(&self, i: usize, j: usize, k: usize) -> usize {
        j + i * self.height + k * self.width * self.height
    }

    fn check(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(LseError::InvalidValue(format!(
                "Grid dimensions should be at least 1, got {}x{}x{}",
                self.width, self.height, self.depth
            )));
        }
        Ok(())
    }
}

/// Read a candidate pool from grid data
pub fn read_grid<R: Read>(reader: R, grid: &GridSpec) -> Result<CandidatePool> {
    grid.check()?;
    let n_points = grid.n_points();
    let mut inputs = Array2::zeros((n_points, grid.input_dim()));
    let mut targets = Array1::zeros(n_points);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let n_lines = grid.height * grid.depth;
    let mut line = 0;
    for record in rdr.records() {
        if line >= n_lines {
            break;
        }
        let record = record?;
        let (j, k) = (line % grid.height, line / grid.height);
        if record.len() < grid.width {
            return Err(LseError::InvalidValue(format!(
                "Grid line {} has {} values, {} expected",
                line + 1,
                record.len(),
                grid.width
            )));
        }
        for (i, field) in record.iter().take(grid.width).enumerate() {
            let value = field.parse::<f64>().map_err(|e| {
                LseError::InvalidValue(format!(
                    "Bad value '{}' at line {}, column {}: {}",
                    field,
                    line + 1,
                    i + 1,
                    e
                ))
            })?;
            let index = grid.linear_index(i, j, k);
            inputs[[index, 0]] = i as f64;
            inputs[[index, 1]] = j as f64;
            if grid.store_depth {
                inputs[[index, 2]] = k as f64;
            }
            targets[index] = value;
        }
        line += 1;
    }
    if line < n_lines {
        return Err(LseError::InvalidValue(format!(
            "Grid has {} lines, {} expected ({} blocks of {} lines)",
            line, n_lines, grid.depth, grid.height
        )));
    }
    CandidatePool::new(&inputs, &targets)
}

/// Read a candidate pool from a grid csv file
pub fn read_grid_csv<P: AsRef<Path>>(path: P, grid: &GridSpec) -> Result<CandidatePool> {
    let file = File::open(path)?;
    read_grid(file, grid)
}

/// Write `data` one row per line, values comma separated
pub fn write_csv_to<W: Write>(
    writer: W,
    data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for row in data.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `data` in a csv file, one row per line
pub fn write_csv<P: AsRef<Path>>(
    path: P,
    data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Result<()> {
    let file = File::create(path)?;
    write_csv_to(file, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_linear_index_is_a_bijection() {
        let grid = GridSpec::new(3, 2).depth(2);
        let mut seen = vec![false; grid.n_points()];
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..3 {
                    let idx = grid.linear_index(i, j, k);
                    assert!(!seen[idx]);
                    seen[idx] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_read_2d_grid() {
        let data = "1, 2, 3\n4, 5, 6\n";
        let pool = read_grid(data.as_bytes(), &GridSpec::new(3, 2)).unwrap();
        assert_eq!(pool.n_points(), 6);
        assert_eq!(pool.dim(), 2);
        // line j = 1, column i = 2
        let idx = GridSpec::new(3, 2).linear_index(2, 1, 0);
        assert_eq!(idx, 5);
        assert_abs_diff_eq!(pool.input(idx), array![2., 1.]);
        assert_abs_diff_eq!(pool.target(idx), 6.);
        assert_abs_diff_eq!(pool.targets(), array![1., 4., 2., 5., 3., 6.]);
    }

    #[test]
    fn test_read_3d_grid() {
        let data = "1,2\n3,4\n5,6\n7,8\n";
        let grid = GridSpec::new(2, 2).depth(2).store_depth(true);
        let pool = read_grid(data.as_bytes(), &grid).unwrap();
        assert_eq!(pool.dim(), 3);
        let idx = grid.linear_index(1, 0, 1);
        assert_abs_diff_eq!(pool.input(idx), array![1., 0., 1.]);
        assert_abs_diff_eq!(pool.target(idx), 6.);
    }

    #[test]
    fn test_depth_without_store_depth() {
        let data = "1,2\n3,4\n5,6\n7,8\n";
        let grid = GridSpec::new(2, 2).depth(2);
        let pool = read_grid(data.as_bytes(), &grid).unwrap();
        assert_eq!(pool.dim(), 2);
        assert_eq!(pool.n_points(), 8);
    }

    #[test]
    fn test_extra_lines_are_ignored() {
        let data = "1,2\n3,4\n9,9\n";
        let pool = read_grid(data.as_bytes(), &GridSpec::new(2, 2)).unwrap();
        assert_eq!(pool.n_points(), 4);
    }

    #[test]
    fn test_bad_grids() {
        let short_row = "1,2\n3\n";
        assert!(matches!(
            read_grid(short_row.as_bytes(), &GridSpec::new(2, 2)),
            Err(LseError::InvalidValue(_))
        ));
        let missing_line = "1,2\n";
        assert!(matches!(
            read_grid(missing_line.as_bytes(), &GridSpec::new(2, 2)),
            Err(LseError::InvalidValue(_))
        ));
        let bad_value = "1,a\n3,4\n";
        assert!(matches!(
            read_grid(bad_value.as_bytes(), &GridSpec::new(2, 2)),
            Err(LseError::InvalidValue(_))
        ));
        assert!(read_grid("".as_bytes(), &GridSpec::new(0, 2)).is_err());
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &array![[0., 1.5], [2., -3.]]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0,1.5\n2,-3\n");
    }

    #[test]
    fn test_write_then_read_file() {
        let _ = std::fs::create_dir_all("target/tests");
        let path = "target/tests/grid_2x3.csv";
        let values = array![[1., 2.], [3., 4.], [5., 6.]];
        write_csv(path, &values).unwrap();
        let pool = read_grid_csv(path, &GridSpec::new(2, 3)).unwrap();
        let grid = GridSpec::new(2, 3);
        for j in 0..3 {
            for i in 0..2 {
                assert_abs_diff_eq!(pool.target(grid.linear_index(i, j, 0)), values[[j, i]]);
            }
        }
    }
}
