// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `YYYY-MM` accounting periods.
//!
//! Every lookup and aggregation key in the ledger is a [`Period`]. The string
//! form is zero-padded, so lexicographic order of the stored TEXT column is the
//! same as chronological order.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(0[1-9]|1[0-2])$").expect("period pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(LedgerError::InvalidPeriod(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The period `n` months after `self`.
    pub fn plus_months(&self, n: u32) -> Self {
        let idx = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(n);
        Self {
            year: (idx / 12) as i32,
            month: (idx % 12) as u32 + 1,
        }
    }

    /// The `n` periods ending at the current month, oldest first.
    pub fn last_n(n: usize) -> Vec<Self> {
        Self::current().window(n)
    }

    /// The `n` periods ending at (and including) `self`, oldest first.
    pub fn window(&self, n: usize) -> Vec<Self> {
        let mut out = Vec::with_capacity(n);
        let mut cursor = *self;
        for _ in 0..n {
            out.push(cursor);
            cursor = cursor.previous();
        }
        out.reverse();
        out
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction, day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Human label such as "January 2025".
    pub fn display(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// Compact chart label such as "Jan 25".
    pub fn short_label(&self) -> String {
        self.first_day().format("%b %y").to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = PERIOD_RE
            .captures(trimmed)
            .ok_or_else(|| LedgerError::InvalidPeriod(s.to_string()))?;
        let year = caps[1]
            .parse::<i32>()
            .map_err(|_| LedgerError::InvalidPeriod(s.to_string()))?;
        let month = caps[2]
            .parse::<u32>()
            .map_err(|_| LedgerError::InvalidPeriod(s.to_string()))?;
        Self::new(year, month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for Period {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Period {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        raw.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
