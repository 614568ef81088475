//! Finance ledger: fees owed, amount paid, and the derived balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use twoem_core::{AppError, AppResult};

/// A student's fee position.
///
/// After every [`FinanceRecord::apply`]:
/// `balance == total_fees - paid_amount` and `is_cleared == (balance <= 0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FinanceRecord {
    /// Total fees owed for the course.
    pub total_fees: f64,
    /// Total amount paid so far.
    pub paid_amount: f64,
    /// Outstanding balance; negative when overpaid.
    pub balance: f64,
    /// Whether the balance has been settled.
    pub is_cleared: bool,
    /// Reference of the latest payment (receipt or transaction number).
    pub payment_reference: Option<String>,
    /// When `paid_amount` was last supplied.
    pub last_payment_date: Option<DateTime<Utc>>,
    /// When the ledger was last recomputed.
    #[sqlx(rename = "finance_updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl FinanceRecord {
    /// A fresh ledger. It is not cleared until first reconciled.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            total_fees: 0.0,
            paid_amount: 0.0,
            balance: 0.0,
            is_cleared: false,
            payment_reference: None,
            last_payment_date: None,
            updated_at: now,
        }
    }

    /// Apply a patch of absolute values and recompute derived fields.
    ///
    /// Fields absent from the patch keep their current value. Fails without
    /// producing a record when the patch is empty or an amount is negative
    /// or not finite.
    pub fn apply(&self, patch: &FinancePatch, now: DateTime<Utc>) -> AppResult<Self> {
        patch.validate()?;

        let total_fees = patch.total_fees.unwrap_or(self.total_fees);
        let paid_amount = patch.paid_amount.unwrap_or(self.paid_amount);
        let balance = total_fees - paid_amount;

        Ok(Self {
            total_fees,
            paid_amount,
            balance,
            is_cleared: balance <= 0.0,
            payment_reference: patch
                .payment_reference
                .clone()
                .or_else(|| self.payment_reference.clone()),
            last_payment_date: if patch.paid_amount.is_some() {
                Some(now)
            } else {
                self.last_payment_date
            },
            updated_at: now,
        })
    }
}

/// Partial update of a finance record. Amounts are absolute, not deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancePatch {
    /// New total fees.
    #[serde(default)]
    pub total_fees: Option<f64>,
    /// New total paid.
    #[serde(default)]
    pub paid_amount: Option<f64>,
    /// New payment reference.
    #[serde(default)]
    pub payment_reference: Option<String>,
}

impl FinancePatch {
    /// Check that something is supplied and every amount is finite and non-negative.
    pub fn validate(&self) -> AppResult<()> {
        if self.total_fees.is_none()
            && self.paid_amount.is_none()
            && self.payment_reference.is_none()
        {
            return Err(AppError::missing_field(
                "finance",
                "At least one of total_fees, paid_amount or payment_reference must be supplied",
            ));
        }
        for (field, value) in [
            ("total_fees", self.total_fees),
            ("paid_amount", self.paid_amount),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(AppError::out_of_range(
                        field,
                        format!("{field} must be a finite amount >= 0"),
                    ));
                }
            }
        }
        Ok(())
    }
}
