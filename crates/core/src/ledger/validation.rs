//! Business rule validation for journal input.
//!
//! Everything here runs before any storage access, so a rejected journal never
//! leaves a partial write behind.

use rust_decimal::Decimal;

use super::error::LedgerError;
use crate::currency::CurrencyInfo;
use super::types::{
    DocNumberRequest, JournalHeaderInput, JournalLineInput, MAX_DOC_NUMBER_LEN, SourceType,
};

/// Minimum number of lines in a journal.
pub const MIN_LINES: usize = 2;

/// Decimal places stored for an exchange rate.
pub const RATE_SCALE: u32 = 10;

/// Validates the header and interprets the requested document number.
///
/// # Errors
///
/// Returns `Validation` describing the first invalid field.
pub fn validate_header(header: &JournalHeaderInput) -> Result<DocNumberRequest, LedgerError> {
    if header.transcode_code.trim().is_empty() {
        return Err(LedgerError::Validation("transcode_code is required".to_string()));
    }

    let doc_number = DocNumberRequest::from_input(&header.doc_number);
    if let DocNumberRequest::Manual(number) = &doc_number {
        if number.is_empty() {
            return Err(LedgerError::Validation(
                "doc_number is required (use AUTO to allocate)".to_string(),
            ));
        }
        if number.len() > MAX_DOC_NUMBER_LEN {
            return Err(LedgerError::Validation(format!(
                "doc_number exceeds {MAX_DOC_NUMBER_LEN} characters"
            )));
        }
    }

    if header.source_type == SourceType::System && header.ref_id.is_none() {
        return Err(LedgerError::Validation(
            "system journals must reference their source document".to_string(),
        ));
    }

    let giro = &header.giro;
    if giro.is_giro
        && giro
            .giro_number
            .as_deref()
            .is_none_or(|n| n.trim().is_empty())
    {
        return Err(LedgerError::Validation(
            "giro_number is required for giro journals".to_string(),
        ));
    }

    Ok(doc_number)
}

/// Validates line amounts and references.
///
/// # Errors
///
/// Returns `InsufficientLines` or `InvalidLine` for the first offending line.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<(), LedgerError> {
    if lines.len() < MIN_LINES {
        return Err(LedgerError::InsufficientLines(lines.len()));
    }

    for (index, line) in lines.iter().enumerate() {
        validate_line(line).map_err(|reason| LedgerError::InvalidLine {
            line_no: index + 1,
            reason: reason.to_string(),
        })?;
    }

    Ok(())
}

fn validate_line(line: &JournalLineInput) -> Result<(), &'static str> {
    if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
        return Err("amounts must not be negative");
    }
    if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
        return Err("debit and credit cannot both be positive");
    }
    if line.ref_id.is_some() != line.ref_type.is_some() {
        return Err("ref_id and ref_type must be given together");
    }
    if line.ref_id.is_some() && line.debit.is_zero() && line.credit.is_zero() {
        return Err("settlement line needs an amount");
    }
    if line.exchange_rate.is_some_and(|rate| rate <= Decimal::ZERO) {
        return Err("exchange rate must be positive");
    }
    if line
        .exchange_rate
        .is_some_and(|rate| !fits_scale(rate, RATE_SCALE))
    {
        return Err("exchange rate has more than 10 decimal places");
    }
    Ok(())
}

/// Returns true if `amount` needs no more than `decimal_places` decimals.
///
/// Trailing zeros do not count, so `100.00` fits a 0-decimal currency.
#[must_use]
pub fn fits_scale(amount: Decimal, decimal_places: u32) -> bool {
    amount.normalize().scale() <= decimal_places
}

/// Checks a line's entered amounts against its currency's decimal places.
///
/// # Errors
///
/// Returns `ExcessPrecision` for the first amount with too many decimals.
pub fn validate_precision(
    line_no: usize,
    line: &JournalLineInput,
    currency: &CurrencyInfo,
) -> Result<(), LedgerError> {
    for amount in [line.debit, line.credit] {
        if !fits_scale(amount, currency.decimal_places) {
            return Err(LedgerError::ExcessPrecision {
                line_no,
                amount,
                currency: currency.code.clone(),
                decimal_places: currency.decimal_places,
            });
        }
    }
    Ok(())
}
