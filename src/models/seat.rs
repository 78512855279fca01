use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auditorium rows, stage-front first.
pub const ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Seats per row.
pub const SEATS_PER_ROW: u8 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid seat label: {0}")]
pub struct InvalidSeatCode(pub String);

/// A single auditorium seat, e.g. `A1` or `H10`.
///
/// The label grammar is one row letter `A`-`H` followed by a seat number
/// `1`-`10` with no leading zeros. Parsing trims whitespace and accepts
/// lowercase rows; `Display` always renders the canonical uppercase form.
/// Ordering is row-major, so `A9 < A10 < B1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatCode {
    row: char,
    number: u8,
}

impl SeatCode {
    pub fn new(row: char, number: u8) -> Result<Self, InvalidSeatCode> {
        let row = row.to_ascii_uppercase();
        if !ROWS.contains(&row) || number < 1 || number > SEATS_PER_ROW {
            return Err(InvalidSeatCode(format!("{row}{number}")));
        }
        Ok(SeatCode { row, number })
    }

    pub fn row(&self) -> char {
        self.row
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn tier(&self) -> SeatTier {
        match self.row {
            'A' | 'B' => SeatTier::Premium,
            'C' | 'D' | 'E' => SeatTier::Gold,
            _ => SeatTier::Silver,
        }
    }

    /// Every seat in the auditorium, row by row.
    pub fn all() -> impl Iterator<Item = SeatCode> {
        ROWS.iter()
            .flat_map(|&row| (1..=SEATS_PER_ROW).map(move |number| SeatCode { row, number }))
    }
}

impl FromStr for SeatCode {
    type Err = InvalidSeatCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let reject = || InvalidSeatCode(label.to_uppercase());
        let mut chars = label.chars();
        let row = chars.next().ok_or_else(reject)?;
        let digits = chars.as_str();
        let number: u8 = digits.parse().map_err(|_| reject())?;
        // "A01" and "A+1" parse as numbers but are not canonical labels.
        if digits != number.to_string() {
            return Err(reject());
        }
        SeatCode::new(row, number).map_err(|_| reject())
    }
}

impl TryFrom<String> for SeatCode {
    type Error = InvalidSeatCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatCode> for String {
    fn from(seat: SeatCode) -> Self {
        seat.to_string()
    }
}

impl fmt::Display for SeatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.number)
    }
}

/// Pricing tier a row belongs to. Presentational only: every seat in a show
/// sells at the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatTier {
    Premium,
    Gold,
    Silver,
}

impl SeatTier {
    pub fn label(&self) -> &'static str {
        match self {
            SeatTier::Premium => "Premium",
            SeatTier::Gold => "Gold",
            SeatTier::Silver => "Silver",
        }
    }
}

impl fmt::Display for SeatTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
