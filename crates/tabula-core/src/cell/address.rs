//! A1-style cell addresses

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Zero-based position of a cell, written `B3` in A1 notation
///
/// In text the row is 1-based and the column is bijective base-26 letters
/// (`A`..`Z`, `AA`..`ZZ`, `AAA`, ...). There is no zero digit, so every index has
/// exactly one spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Column index, `A` = 0
    pub col: u32,
    /// Row index, text row 1 = 0
    pub row: u32,
}

impl CellAddress {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Parse `B3`-style text (case-insensitive)
    ///
    /// Letters must be followed by digits and nothing else. Absolute markers (`$B$3`)
    /// and row `0` are rejected.
    ///
    /// # Examples
    /// ```
    /// use tabula_core::CellAddress;
    ///
    /// assert_eq!(CellAddress::parse("B3").unwrap(), CellAddress::new(1, 2));
    /// assert_eq!(CellAddress::parse("aa10").unwrap(), CellAddress::new(26, 9));
    /// assert!(CellAddress::parse("B0").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let split = s
            .bytes()
            .position(|b| !b.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() || digits.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "'{}' is not letters followed by a row number",
                s
            )));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "unexpected characters after row number in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(letters)?;
        let row = match digits.parse::<u64>() {
            Ok(0) => {
                return Err(Error::InvalidAddress(format!("row 0 in '{}'", s)));
            }
            Ok(n) if n <= u64::from(u32::MAX) + 1 => (n - 1) as u32,
            _ => return Err(Error::OutOfBounds(format!("row of '{}'", s))),
        };

        Ok(Self { col, row })
    }

    /// Column letters for a 0-based index: 0 → `A`, 25 → `Z`, 26 → `AA`
    pub fn column_to_letters(col: u32) -> String {
        let mut letters = Vec::with_capacity(7);
        let mut n = u64::from(col) + 1;
        while n > 0 {
            let digit = (n - 1) % 26;
            letters.push(b'A' + digit as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        letters.into_iter().map(char::from).collect()
    }

    /// 0-based index of column letters (case-insensitive): `A` → 0, `AA` → 26
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("no column letters".into()));
        }

        let number = letters.bytes().try_fold(0u64, |acc, b| {
            if !b.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "'{}' is not a column letter",
                    b as char
                )));
            }
            let next = acc * 26 + u64::from(b.to_ascii_uppercase() - b'A') + 1;
            if next > u64::from(u32::MAX) + 1 {
                return Err(Error::OutOfBounds(format!("column {}", letters)));
            }
            Ok(next)
        })?;

        Ok((number - 1) as u32)
    }

    /// A1 text, e.g. `AA10`
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}",
            Self::column_to_letters(self.col),
            u64::from(self.row) + 1
        )
    }

    /// Range spanning this cell and `other`
    pub fn to(&self, other: CellAddress) -> super::CellRange {
        super::CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        let cases = [
            (0, "A"),
            (1, "B"),
            (25, "Z"),
            (26, "AA"),
            (51, "AZ"),
            (52, "BA"),
            (701, "ZZ"),
            (702, "AAA"),
            (16383, "XFD"),
        ];
        for (index, letters) in cases {
            assert_eq!(CellAddress::column_to_letters(index), letters);
            assert_eq!(CellAddress::letters_to_column(letters).unwrap(), index);
        }
        assert_eq!(CellAddress::letters_to_column("xfd").unwrap(), 16383);
        assert_eq!(CellAddress::column_to_letters(u32::MAX).len(), 7);
    }

    #[test]
    fn test_bad_column_letters() {
        assert!(CellAddress::letters_to_column("").is_err());
        assert!(CellAddress::letters_to_column("B2").is_err());
        assert!(matches!(
            CellAddress::letters_to_column("ZZZZZZZZ"),
            Err(Error::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!("c7".parse::<CellAddress>().unwrap(), CellAddress::new(2, 6));
        // Leading zeros spell the same row
        assert_eq!(CellAddress::parse("C007").unwrap(), CellAddress::new(2, 6));
    }

    #[test]
    fn test_parse_rejects() {
        for text in ["", "A", "7", "A0", "A000", "$A$1", "A1B", "A-1", "Ä1"] {
            assert!(CellAddress::parse(text).is_err(), "{:?}", text);
        }
        assert!(matches!(
            CellAddress::parse("A99999999999"),
            Err(Error::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellAddress::new(2, 99).to_string(), "C100");
        assert_eq!(CellAddress::new(27, 0).to_string(), "AB1");
        assert_eq!(CellAddress::new(0, u32::MAX).to_a1_string(), "A4294967296");
    }

    #[test]
    fn test_largest_address_round_trips() {
        let last = CellAddress::new(u32::MAX, u32::MAX);
        assert_eq!(CellAddress::parse(&last.to_a1_string()).unwrap(), last);
        assert!(matches!(
            CellAddress::parse("A4294967297"),
            Err(Error::OutOfBounds(_))
        ));
    }
}
