// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error taxonomy for ledger operations.
//!
//! Precondition errors are user-correctable; `Storage` wraps anything the
//! database reports that is not a recognised constraint violation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Records already exist for {period} ({existing} found); update them instead")]
    AlreadyExistsForPeriod { period: String, existing: i64 },

    #[error("No users found. Add at least one user profile first")]
    NoUsersFound,

    #[error("No recurring categories found. Add categories first")]
    NoCategoriesFound,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid period '{0}', expected YYYY-MM")]
    InvalidPeriod(String),

    #[error("Category '{name}' of type '{kind}' already exists")]
    DuplicateCategory { name: String, kind: String },

    #[error("The Household account cannot be modified or removed")]
    SystemAccount,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn debt_not_found(id: i64) -> Self {
        Self::not_found("Debt", id)
    }

    pub fn payment_not_found(id: i64) -> Self {
        Self::not_found("Payment", id)
    }

    pub fn asset_not_found(id: i64) -> Self {
        Self::not_found("Asset", id)
    }

    /// True for errors a caller can fix by changing its input (4xx-style).
    pub fn is_precondition(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Whether a rusqlite error is a UNIQUE / constraint violation.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
