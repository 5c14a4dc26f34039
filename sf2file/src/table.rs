//! Driver tables: definitions and layout-independent access.
//!
//! A table is a 2-D matrix of bytes stored somewhere in the driver image. Drivers store some tables row by row and
//! others column by column (which lets the player index a column with a single register). [`extract_table`] and
//! [`inject_table`] hide that difference: the [`Matrix`] they work with is always indexed `[row][column]`.

use std::ops::{Index, IndexMut};

use num_derive::FromPrimitive;

use crate::FormatError;

/// Size of one table definition record in the driver tables block.
pub const TABLE_DEFINITION_SIZE: usize = 6;

/// Physical storage order of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum TableLayout {
	/// Rows are contiguous: byte `r * columns + c` holds cell `(r, c)`.
	RowMajor    = 0,
	/// Columns are contiguous: byte `c * rows + r` holds cell `(r, c)`.
	ColumnMajor = 1,
}

impl TableLayout {
	/// Offset of the cell `(row, column)` from the start of a table with the given shape.
	#[must_use]
	pub const fn physical_index(self, row: usize, column: usize, rows: usize, columns: usize) -> usize {
		match self {
			Self::RowMajor => row * columns + column,
			Self::ColumnMajor => column * rows + row,
		}
	}
}

/// Describes where a table lives and how it is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableDefinition {
	/// Driver-specific table kind (instruments, commands, wave, pulse, filter, ...).
	pub kind_tag: u8,
	/// Physical storage order.
	pub layout:   TableLayout,
	/// C64 address of the first byte.
	pub address:  u16,
	/// Number of columns.
	pub columns:  u8,
	/// Number of rows.
	pub rows:     u8,
}

impl TableDefinition {
	/// Number of bytes the table occupies.
	#[must_use]
	pub fn byte_len(&self) -> usize {
		usize::from(self.rows) * usize::from(self.columns)
	}

	/// Address of the last byte of the table, or `None` for an empty table. May exceed `0xFFFF` for a table that does
	/// not fit the address space.
	#[must_use]
	pub fn last_address(&self) -> Option<u32> {
		let length = u32::try_from(self.byte_len()).ok()?;
		(length > 0).then(|| u32::from(self.address) + length - 1)
	}

	/// Serializes the definition into its 6-byte record.
	#[must_use]
	pub fn to_record(&self) -> [u8; TABLE_DEFINITION_SIZE] {
		let [low, high] = self.address.to_le_bytes();
		[self.kind_tag, self.layout as u8, low, high, self.columns, self.rows]
	}

	/// Byte range of the table inside a buffer that starts at address `base`.
	fn byte_range(&self, base: u16, buffer_length: usize) -> Result<std::ops::Range<usize>, FormatError> {
		let out_of_bounds = || FormatError::TableOutOfBounds {
			address:      self.address,
			length:       self.byte_len(),
			base,
			image_length: buffer_length,
		};
		let Some(start) = self.address.checked_sub(base).map(usize::from) else {
			return Err(out_of_bounds());
		};
		let end = start + self.byte_len();
		if end > buffer_length {
			return Err(out_of_bounds());
		}
		Ok(start .. end)
	}
}

/// A rectangular grid of values, indexed `(row, column)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Matrix<T> {
	rows:    usize,
	columns: usize,
	cells:   Vec<T>,
}

impl<T: Copy + Default> Matrix<T> {
	/// Creates a matrix filled with the default value.
	#[must_use]
	pub fn new(rows: usize, columns: usize) -> Self {
		Self { rows, columns, cells: vec![T::default(); rows * columns] }
	}

	/// Creates a matrix from a list of rows.
	///
	/// # Errors
	/// If the rows are not all of the same length; the error contains the offending row index.
	pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, usize> {
		let columns = rows.first().map_or(0, Vec::len);
		if let Some(ragged) = rows.iter().position(|row| row.len() != columns) {
			return Err(ragged);
		}
		Ok(Self { rows: rows.len(), columns, cells: rows.concat() })
	}

	/// The cell at `(row, column)`, if it exists.
	#[must_use]
	pub fn get(&self, row: usize, column: usize) -> Option<T> {
		(row < self.rows && column < self.columns).then(|| self.cells[row * self.columns + column])
	}

	/// Returns the transposed matrix.
	#[must_use]
	pub fn transposed(&self) -> Self {
		let mut transposed = Self::new(self.columns, self.rows);
		for row in 0 .. self.rows {
			for column in 0 .. self.columns {
				transposed[(column, row)] = self[(row, column)];
			}
		}
		transposed
	}
}

impl<T> Matrix<T> {
	/// Number of rows.
	#[must_use]
	pub const fn rows(&self) -> usize {
		self.rows
	}

	/// Number of columns.
	#[must_use]
	pub const fn columns(&self) -> usize {
		self.columns
	}

	/// One row's cells.
	///
	/// # Panics
	/// If the row does not exist.
	#[must_use]
	pub fn row(&self, row: usize) -> &[T] {
		assert!(row < self.rows, "row {row} out of range for a matrix with {} rows", self.rows);
		&self.cells[row * self.columns .. (row + 1) * self.columns]
	}

	/// Iterates over the rows.
	pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
		// chunks_exact panics on a zero chunk size; a matrix without columns has no cells anyways.
		self.cells.chunks_exact(self.columns.max(1))
	}
}

impl<T> Index<(usize, usize)> for Matrix<T> {
	type Output = T;

	fn index(&self, (row, column): (usize, usize)) -> &Self::Output {
		assert!(row < self.rows && column < self.columns, "cell ({row}, {column}) out of range");
		&self.cells[row * self.columns + column]
	}
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
	fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut Self::Output {
		assert!(row < self.rows && column < self.columns, "cell ({row}, {column}) out of range");
		&mut self.cells[row * self.columns + column]
	}
}

/// Reads the table described by `definition` out of `buffer`, which holds memory starting at address `base`. The
/// result is the same logical matrix no matter which layout the table is stored in.
///
/// # Errors
/// If the table does not lie completely inside the buffer.
pub fn extract_table(buffer: &[u8], base: u16, definition: &TableDefinition) -> Result<Matrix<u8>, FormatError> {
	let range = definition.byte_range(base, buffer.len())?;
	let table = &buffer[range];
	let (rows, columns) = (usize::from(definition.rows), usize::from(definition.columns));
	let mut matrix = Matrix::new(rows, columns);
	for row in 0 .. rows {
		for column in 0 .. columns {
			matrix[(row, column)] = table[definition.layout.physical_index(row, column, rows, columns)];
		}
	}
	Ok(matrix)
}

/// Writes `matrix` into the table described by `definition`, in the definition's layout. This is the exact inverse of
/// [`extract_table`]; bytes outside the table are not touched.
///
/// # Errors
/// If the table does not lie completely inside the buffer, or the matrix shape does not match the definition.
pub fn inject_table(
	buffer: &mut [u8],
	base: u16,
	definition: &TableDefinition,
	matrix: &Matrix<u8>,
) -> Result<(), FormatError> {
	let (rows, columns) = (usize::from(definition.rows), usize::from(definition.columns));
	if matrix.rows() != rows || matrix.columns() != columns {
		return Err(FormatError::MatrixShapeMismatch {
			rows:             matrix.rows(),
			columns:          matrix.columns(),
			expected_rows:    rows,
			expected_columns: columns,
		});
	}
	let range = definition.byte_range(base, buffer.len())?;
	let table = &mut buffer[range];
	for row in 0 .. rows {
		for column in 0 .. columns {
			table[definition.layout.physical_index(row, column, rows, columns)] = matrix[(row, column)];
		}
	}
	Ok(())
}
