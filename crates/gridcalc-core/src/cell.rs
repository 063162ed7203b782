//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
///
/// Cell addresses use a combination of column letters (A-XFD) and row numbers
/// (1-1048576). The optional `$` prefix marks a reference absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create a new cell address with specified absolute/relative flags
    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    /// assert!(addr.row_absolute);
    /// assert!(addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!("no column letters in '{s}'")));
        }
        let col = parse_column_letters(&s[col_start..pos])?;

        let row_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row_str = &s[pos..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!("invalid row in '{s}'")));
        }
        let row_1based: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row in '{s}'")))?;
        if row_1based == 0 || row_1based > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row_1based, MAX_ROWS));
        }

        Ok(Self {
            row: row_1based - 1,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Format the column as letters (A, B, ..., AA, ...)
    pub fn column_letters(&self) -> String {
        column_to_letters(self.col)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col_absolute {
            write!(f, "$")?;
        }
        write!(f, "{}", column_to_letters(self.col))?;
        if self.row_absolute {
            write!(f, "$")?;
        }
        write!(f, "{}", self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse column letters (A=0, B=1, ..., Z=25, AA=26, ...)
pub fn parse_column_letters(s: &str) -> Result<u16> {
    let mut col: u32 = 0;
    for c in s.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return Err(Error::InvalidAddress(format!("invalid column letter: {c}")));
        }
        col = col * 26 + (c as u32 - 'A' as u32 + 1);
        if col > MAX_COLS as u32 {
            return Err(Error::ColumnOutOfBounds(MAX_COLS, MAX_COLS));
        }
    }
    Ok((col - 1) as u16)
}

/// Format a 0-based column index as letters
pub fn column_to_letters(col: u16) -> String {
    let mut n = col as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A rectangular range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left cell
    pub start: CellAddress,
    /// Bottom-right cell
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new range, normalizing so start is the top-left corner
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        let start = CellAddress::with_absolute(
            a.row.min(b.row),
            a.col.min(b.col),
            a.row_absolute,
            a.col_absolute,
        );
        let end = CellAddress::with_absolute(
            a.row.max(b.row),
            a.col.max(b.col),
            b.row_absolute,
            b.col_absolute,
        );
        Self { start, end }
    }

    /// Parse a range from "A1:B10" notation; a single address parses as a
    /// one-cell range
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((a, b)) => Ok(Self::new(CellAddress::parse(a)?, CellAddress::parse(b)?)),
            None => {
                let addr = CellAddress::parse(s)?;
                Ok(Self::new(addr, addr))
            }
        }
    }

    /// Number of rows spanned
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns spanned
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Total number of cells
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Whether the range covers a single cell
    pub fn is_single_cell(&self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }

    /// Whether the given address lies inside the range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_simple_address() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr.row, 0);
        assert_eq!(addr.col, 0);
        assert!(!addr.row_absolute);
        assert!(!addr.col_absolute);
    }

    #[test]
    fn parse_absolute_address() {
        let addr = CellAddress::parse("$C$10").unwrap();
        assert_eq!(addr.row, 9);
        assert_eq!(addr.col, 2);
        assert!(addr.row_absolute);
        assert!(addr.col_absolute);
    }

    #[test]
    fn parse_multi_letter_column() {
        assert_eq!(CellAddress::parse("Z1").unwrap().col, 25);
        assert_eq!(CellAddress::parse("AA1").unwrap().col, 26);
        assert_eq!(CellAddress::parse("XFD1").unwrap().col, 16383);
    }

    #[test]
    fn display_round_trip() {
        for s in ["A1", "$B$2", "AA100", "XFD1048576"] {
            assert_eq!(CellAddress::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn invalid_addresses_rejected() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("123").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1B").is_err());
    }

    #[test]
    fn parse_range() {
        let range = CellRange::parse("A1:B10").unwrap();
        assert_eq!(range.start.row, 0);
        assert_eq!(range.end.row, 9);
        assert_eq!(range.row_count(), 10);
        assert_eq!(range.col_count(), 2);
        assert_eq!(range.cell_count(), 20);
    }

    #[test]
    fn range_normalizes_corners() {
        let range = CellRange::parse("B10:A1").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 0));
        assert_eq!(range.end, CellAddress::new(9, 1));
    }

    #[test]
    fn range_contains() {
        let range = CellRange::parse("B2:D4").unwrap();
        assert!(range.contains(&CellAddress::new(2, 2)));
        assert!(!range.contains(&CellAddress::new(0, 0)));
    }
}
