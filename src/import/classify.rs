//! Transaction type classification.
//!
//! Maps a free-text type label to a direction and the implied account types
//! for both sides of the transaction:
//!
//! | type text                          | direction  | source  | destination |
//! |------------------------------------|------------|---------|-------------|
//! | `withdrawal`, `expense`, anything else | withdrawal | asset   | expense     |
//! | `deposit`, `income`                | deposit    | revenue | asset       |
//! | `transfer`                         | transfer   | asset   | asset       |

use crate::models::{AccountType, Direction};

/// The resolved classification of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub direction: Direction,
    pub source_type: AccountType,
    pub destination_type: AccountType,
}

impl Classification {
    /// Account types are fully determined by the direction.
    pub fn of(direction: Direction) -> Self {
        let (source_type, destination_type) = match direction {
            Direction::Withdrawal => (AccountType::Asset, AccountType::Expense),
            Direction::Deposit => (AccountType::Revenue, AccountType::Asset),
            Direction::Transfer => (AccountType::Asset, AccountType::Asset),
        };
        Self {
            direction,
            source_type,
            destination_type,
        }
    }
}

/// Classify a free-text type label, case-insensitively.
///
/// Unrecognized or absent labels fall back to withdrawal.
pub fn classify(type_text: Option<&str>) -> Classification {
    Classification::of(Direction::from_text(type_text))
}
