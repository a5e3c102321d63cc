//! Row Validation
//!
//! Coerces raw CSV fields into typed claim rows and drops rows that
//! cannot support the downstream ratios. Coercion is forgiving (a bad
//! numeric field becomes zero), validation is strict (zeroed counts or
//! payments disqualify the row). Dropped rows are counted, never logged
//! individually.

use csv::StringRecord;

use super::columns::ColumnMap;
use crate::types::ClaimRow;

/// One chunk's worth of validated rows plus the number dropped.
#[derive(Debug, Default)]
pub struct ValidatedChunk {
    pub rows: Vec<ClaimRow>,
    pub dropped: usize,
}

/// Validate every record in a chunk against a resolved column map.
pub fn validate_chunk(records: &[StringRecord], map: &ColumnMap) -> ValidatedChunk {
    let mut chunk = ValidatedChunk {
        rows: Vec::with_capacity(records.len()),
        dropped: 0,
    };

    for record in records {
        match validate_record(record, map) {
            Some(row) => chunk.rows.push(row),
            None => chunk.dropped += 1,
        }
    }

    chunk
}

/// Coerce and validate a single record.
///
/// Returns `None` when the billing NPI is empty or when any of the
/// beneficiary count, claim count or paid amount fails to land strictly
/// positive after coercion. The two derived ratios are computed here so
/// every `ClaimRow` carries finite values by construction.
fn validate_record(record: &StringRecord, map: &ColumnMap) -> Option<ClaimRow> {
    let billing_npi = field(record, map.billing_npi);
    if billing_npi.is_empty() {
        return None;
    }

    let beneficiaries = parse_count(field(record, map.beneficiaries));
    let claims = parse_count(field(record, map.claims));
    let paid = parse_amount(field(record, map.paid));

    if beneficiaries <= 0 || claims <= 0 || paid <= 0.0 {
        return None;
    }

    Some(ClaimRow {
        billing_npi: billing_npi.to_string(),
        servicing_npi: field(record, map.servicing_npi).to_string(),
        procedure_code: field(record, map.procedure_code).to_string(),
        claim_month: field(record, map.claim_month).to_string(),
        beneficiaries,
        claims,
        paid,
        cost_per_claim: paid / claims as f64,
        claims_per_beneficiary: claims as f64 / beneficiaries as f64,
    })
}

/// Fetch a field by index, treating short records as empty fields.
fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map_or("", str::trim)
}

/// Coerce a count field. Decimal strings truncate toward zero, anything
/// unparseable or non-finite becomes 0.
fn parse_count(raw: &str) -> i64 {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

/// Coerce a money field. Unparseable or non-finite values become 0.0.
fn parse_amount(raw: &str) -> f64 {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// ============================================================================
// Tests
// ============================================================================
