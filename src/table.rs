//! Read-only, column-partitioned table the clustering engine consumes.
//!
//! A table is an ordered set of `d` numeric columns. Every column is split into the same
//! contiguous, disjoint row ranges (partitions). Partition tasks only ever borrow a single
//! partition, so tables can be backed by anything that can hand out per-partition row access.
use crate::{memory::Primitive, Error, Result};

/// One contiguous row range across all columns of a [`PartitionedTable`].
pub trait Partition<T: Primitive>: Sync {
    /// Amount of rows in this partition.
    fn row_count(&self) -> usize;
    /// Amount of columns (feature dimensions) in this partition.
    fn column_count(&self) -> usize;
    /// Value of **column** at the partition-local **row**.
    fn value(&self, column: usize, row: usize) -> T;

    /// Copy the partition-local **row** into **buf** (`buf.len() == column_count()`).
    fn read_row(&self, row: usize, buf: &mut [T]) {
        buf.iter_mut().enumerate().for_each(|(column, v)| *v = self.value(column, row));
    }
}

/// Horizontally partitioned dataset.
pub trait PartitionedTable<T: Primitive>: Sync {
    type Part: Partition<T>;

    /// Amount of columns (feature dimensions) of every row.
    fn column_count(&self) -> usize;
    /// All partitions, in row order.
    fn partitions(&self) -> &[Self::Part];

    /// Total amount of rows over all partitions.
    fn row_count(&self) -> usize {
        self.partitions().iter().map(|p| p.row_count()).sum()
    }

    /// Map a table-wide row index onto `(partition, local_row)`.
    fn locate(&self, row: usize) -> Result<(usize, usize)> {
        let mut offset = 0;
        for (pidx, p) in self.partitions().iter().enumerate() {
            if row < offset + p.row_count() {
                return Ok((pidx, row - offset));
            }
            offset += p.row_count();
        }
        Err(Error::RowOutOfRange { row, row_count: offset })
    }

    /// Check every partition for the expected column count and equal column lengths.
    fn validate(&self) -> Result<()>;
}


/// Column chunk storage for one partition of a [`ColumnTable`].
#[derive(Clone, Debug)]
pub struct ColumnChunks<T: Primitive> {
    columns: Vec<Vec<T>>
}
impl<T: Primitive> ColumnChunks<T> {
    pub fn new(columns: Vec<Vec<T>>) -> Self { Self { columns } }

    /// Columns of this partition, each holding the partition's rows.
    pub fn columns(&self) -> &[Vec<T>] { &self.columns }
}
impl<T: Primitive> Partition<T> for ColumnChunks<T> {
    fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }
    fn column_count(&self) -> usize { self.columns.len() }
    #[inline(always)]
    fn value(&self, column: usize, row: usize) -> T {
        self.columns[column][row]
    }
}


/// In-memory column-partitioned table.
///
/// ## Example
/// ```rust
/// use kmeans_mr::*;
///
/// let rows = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 11.0];
/// let table = ColumnTable::from_rows(&rows, 2, 3).unwrap();
/// assert_eq!(table.partitions().len(), 2);
/// assert_eq!(table.row_count(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct ColumnTable<T: Primitive> {
    dims: usize,
    partitions: Vec<ColumnChunks<T>>
}
impl<T: Primitive> ColumnTable<T> {
    /// Build a table from whole columns, splitting each into chunks of **partition_len** rows
    /// (the last partition may be shorter).
    pub fn from_columns(columns: Vec<Vec<T>>, partition_len: usize) -> Result<Self> {
        if partition_len == 0 {
            return Err(Error::InvalidParameter("partition_len must be > 0".into()));
        }
        let dims = columns.len();
        let row_count = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some((column, c)) = columns.iter().enumerate().find(|(_, c)| c.len() != row_count) {
            return Err(Error::RaggedPartition { partition: 0, column, expected: row_count, found: c.len() });
        }
        let partitions = (0..row_count).step_by(partition_len)
            .map(|start| {
                let end = (start + partition_len).min(row_count);
                ColumnChunks::new(columns.iter().map(|c| c[start..end].to_vec()).collect())
            })
            .collect();
        Ok(Self { dims, partitions })
    }

    /// Build a table from row-major samples [<row0>,<row1>,...] with **dims** values per row.
    pub fn from_rows(rows: &[T], dims: usize, partition_len: usize) -> Result<Self> {
        if dims == 0 || rows.len() % dims != 0 {
            return Err(Error::DimensionMismatch { expected: dims, found: rows.len() });
        }
        let columns = (0..dims)
            .map(|d| rows.iter().skip(d).step_by(dims).cloned().collect())
            .collect();
        Self::from_columns(columns, partition_len)
    }

    /// Build a table from caller-chosen partitions: `partitions[p][column][row]`.
    /// The result is validated, so ragged input is rejected.
    pub fn from_partitions(partitions: Vec<Vec<Vec<T>>>, dims: usize) -> Result<Self> {
        let table = Self {
            dims,
            partitions: partitions.into_iter().map(ColumnChunks::new).collect()
        };
        table.validate()?;
        Ok(table)
    }

    /// Drop the column at **idx** from every partition.
    pub fn without_column(mut self, idx: usize) -> Result<Self> {
        if idx >= self.dims {
            return Err(Error::DimensionMismatch { expected: self.dims, found: idx + 1 });
        }
        self.partitions.iter_mut().for_each(|p| { p.columns.remove(idx); });
        self.dims -= 1;
        Ok(self)
    }
}
impl<T: Primitive> PartitionedTable<T> for ColumnTable<T> {
    type Part = ColumnChunks<T>;

    fn column_count(&self) -> usize { self.dims }
    fn partitions(&self) -> &[ColumnChunks<T>] { &self.partitions }

    fn validate(&self) -> Result<()> {
        for (partition, p) in self.partitions.iter().enumerate() {
            if p.column_count() != self.dims {
                return Err(Error::DimensionMismatch { expected: self.dims, found: p.column_count() });
            }
            let expected = p.row_count();
            if let Some((column, c)) = p.columns.iter().enumerate().find(|(_, c)| c.len() != expected) {
                return Err(Error::RaggedPartition { partition, column, expected, found: c.len() });
            }
        }
        Ok(())
    }
}
