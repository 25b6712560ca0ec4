//! Invoice settlement on post and unpost.
//!
//! A line with `ref_id`/`ref_type` settles an outstanding AP or AR invoice by
//! its base-currency amount. Posting reduces the outstanding balance; unposting
//! restores it. Both run in the same database transaction as the status change.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::LedgerError;
use super::types::{RefType, ResolvedLine};
use arus_shared::types::InvoiceId;

/// Direction of a settlement adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementDirection {
    /// Post: reduce outstanding.
    Apply,
    /// Unpost: restore outstanding.
    Reverse,
}

/// Current balance of an invoice, as locked by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceBalance {
    /// Invoice ID.
    pub id: InvoiceId,
    /// AP or AR.
    pub kind: RefType,
    /// Invoice total in base currency.
    pub total_amount: Decimal,
    /// Unsettled part of the total.
    pub outstanding: Decimal,
}

/// Aggregated adjustment for one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementDelta {
    /// Invoice ID.
    pub invoice_id: InvoiceId,
    /// Kind the lines refer to.
    pub ref_type: RefType,
    /// Sum of line amounts.
    pub amount: Decimal,
}

/// Stateless settlement rules.
pub struct SettlementService;

impl SettlementService {
    /// Aggregates settlement lines per invoice, ordered by invoice ID so that
    /// row locks are always taken in the same order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLine` if two lines give different kinds for one invoice.
    pub fn plan(lines: &[ResolvedLine]) -> Result<Vec<SettlementDelta>, LedgerError> {
        let mut by_invoice: BTreeMap<InvoiceId, SettlementDelta> = BTreeMap::new();

        for line in lines {
            let (Some(invoice_id), Some(ref_type)) = (line.ref_id, line.ref_type) else {
                continue;
            };
            let entry = by_invoice.entry(invoice_id).or_insert(SettlementDelta {
                invoice_id,
                ref_type,
                amount: Decimal::ZERO,
            });
            if entry.ref_type != ref_type {
                return Err(LedgerError::InvalidLine {
                    line_no: usize::try_from(line.line_no).unwrap_or_default(),
                    reason: format!("invoice {invoice_id} referenced as both AP and AR"),
                });
            }
            entry.amount += line.amount();
        }

        Ok(by_invoice.into_values().collect())
    }

    /// Computes the invoice's new outstanding balance.
    ///
    /// # Errors
    ///
    /// Returns `RefTypeMismatch`, `Overpayment` (apply) or `OverRestore`
    /// (reverse).
    pub fn adjust(
        invoice: &InvoiceBalance,
        delta: &SettlementDelta,
        direction: SettlementDirection,
    ) -> Result<Decimal, LedgerError> {
        if invoice.kind != delta.ref_type {
            return Err(LedgerError::RefTypeMismatch {
                invoice_id: invoice.id,
                expected: delta.ref_type,
                actual: invoice.kind,
            });
        }

        match direction {
            SettlementDirection::Apply => {
                if delta.amount > invoice.outstanding {
                    return Err(LedgerError::Overpayment {
                        invoice_id: invoice.id,
                        outstanding: invoice.outstanding,
                        amount: delta.amount,
                    });
                }
                Ok(invoice.outstanding - delta.amount)
            }
            SettlementDirection::Reverse => {
                let restored = invoice.outstanding + delta.amount;
                if restored > invoice.total_amount {
                    return Err(LedgerError::OverRestore {
                        invoice_id: invoice.id,
                        total: invoice.total_amount,
                        amount: delta.amount,
                    });
                }
                Ok(restored)
            }
        }
    }
}
