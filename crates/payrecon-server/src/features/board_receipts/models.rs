//! Board receipt entity

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditedOperation;
use crate::features::shared::{validate_text, TextViolation};

pub const BOARD_RECEIPT_RESOURCE: &str = "BOARD_RECEIPT";

pub const UPDATE_BOARD_RECEIPT: AuditedOperation =
    AuditedOperation::new("UPDATE_BOARD_RECEIPT", BOARD_RECEIPT_RESOURCE);

pub const DELETE_BOARD_RECEIPT: AuditedOperation =
    AuditedOperation::new("DELETE_BOARD_RECEIPT", BOARD_RECEIPT_RESOURCE);

pub const PROCESS_BOARD_RECEIPT: AuditedOperation =
    AuditedOperation::new("PROCESS_BOARD_RECEIPT", BOARD_RECEIPT_RESOURCE);

pub const MAX_REF_LEN: usize = 64;
pub const MAX_UTR_LEN: usize = 48;
pub const MAX_USER_LEN: usize = 64;

/// `amount` is stored as `NUMERIC(15,2)`
pub const AMOUNT_MAX_SCALE: i64 = 2;
pub const AMOUNT_MAX_INTEGER_DIGITS: i64 = 13;

/// Shared column list for board receipt SELECT/RETURNING clauses
pub(crate) const BOARD_RECEIPT_COLUMNS: &str = "id, board_ref, employer_ref, amount, utr_number, \
     status, maker, checker, receipt_date, created_at, updated_at";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardReceiptStatus {
    #[default]
    Pending,
    Verified,
}

impl BoardReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
        }
    }
}

impl std::fmt::Display for BoardReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown board receipt status '{0}'")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for BoardReceiptStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "VERIFIED" => Ok(Self::Verified),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for BoardReceiptStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A receipt the welfare board issued against an employer payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardReceipt {
    pub id: i64,
    pub board_ref: String,
    pub employer_ref: String,
    pub amount: BigDecimal,
    pub utr_number: String,
    #[sqlx(try_from = "String")]
    pub status: BoardReceiptStatus,
    pub maker: String,
    pub checker: Option<String>,
    pub receipt_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-level validation failure shared by the receipt commands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required and cannot be empty")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("amount must be greater than zero")]
    AmountNotPositive,
    #[error("amount must have at most {max} decimal places")]
    AmountTooPrecise { max: i64 },
    #[error("amount must have at most {max} digits before the decimal point")]
    AmountTooLarge { max: i64 },
}

pub(crate) fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), FieldError> {
    validate_text(value, max).map_err(|violation| match violation {
        TextViolation::Empty => FieldError::Required(field),
        TextViolation::TooLong { max } => FieldError::TooLong { field, max },
    })
}

pub(crate) fn check_amount(amount: &BigDecimal) -> Result<(), FieldError> {
    if *amount <= BigDecimal::from(0_i64) {
        return Err(FieldError::AmountNotPositive);
    }

    // Trailing zeros don't count: 10.500 fits, 10.005 doesn't
    let normalized = amount.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale > AMOUNT_MAX_SCALE {
        return Err(FieldError::AmountTooPrecise {
            max: AMOUNT_MAX_SCALE,
        });
    }

    let integer_digits = i64::try_from(normalized.digits()).unwrap_or(i64::MAX) - scale;
    if integer_digits > AMOUNT_MAX_INTEGER_DIGITS {
        return Err(FieldError::AmountTooLarge {
            max: AMOUNT_MAX_INTEGER_DIGITS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_parsing() {
        assert_eq!("verified".parse::<BoardReceiptStatus>().unwrap(), BoardReceiptStatus::Verified);
        assert_eq!(BoardReceiptStatus::default(), BoardReceiptStatus::Pending);
        assert!("SETTLED".parse::<BoardReceiptStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&BoardReceiptStatus::Verified).unwrap(),
            r#""VERIFIED""#
        );
    }

    #[test]
    fn test_check_amount() {
        assert!(check_amount(&BigDecimal::from_str("0.01").unwrap()).is_ok());
        assert_eq!(
            check_amount(&BigDecimal::from(0_i64)),
            Err(FieldError::AmountNotPositive)
        );
        assert!(check_amount(&BigDecimal::from_str("-5.00").unwrap()).is_err());
    }

    #[test]
    fn test_check_amount_fits_numeric_15_2() {
        let amount = |s: &str| BigDecimal::from_str(s).unwrap();

        assert!(check_amount(&amount("9999999999999.99")).is_ok());
        assert!(check_amount(&amount("10.500")).is_ok());
        assert!(check_amount(&amount("1.2e3")).is_ok());

        assert_eq!(
            check_amount(&amount("10.005")),
            Err(FieldError::AmountTooPrecise { max: 2 })
        );
        assert_eq!(
            check_amount(&amount("10000000000000")),
            Err(FieldError::AmountTooLarge { max: 13 })
        );
        assert_eq!(
            check_amount(&amount("1e14")),
            Err(FieldError::AmountTooLarge { max: 13 })
        );
    }

    #[test]
    fn test_check_text_names_the_field() {
        let err = check_text("board_ref", "", MAX_REF_LEN).unwrap_err();
        assert_eq!(err.to_string(), "board_ref is required and cannot be empty");

        let err = check_text("utr_number", &"9".repeat(49), MAX_UTR_LEN).unwrap_err();
        assert_eq!(err, FieldError::TooLong { field: "utr_number", max: 48 });
    }
}
