//! Header Resolution
//!
//! Medicaid extracts arrive with several naming conventions for the same
//! columns. Each canonical field carries an alias list in priority order,
//! matched case-insensitively against the header row. A chunk is only
//! usable when every canonical field resolves.

use csv::StringRecord;

// ============================================================================
// Canonical Fields and Aliases
// ============================================================================

/// Aliases for the billing provider NPI, in priority order.
const BILLING_NPI_ALIASES: &[&str] = &["BILLING_PROVIDER_NPI_NUM", "BILLING_NPI", "NPI"];
/// Aliases for the servicing provider NPI.
const SERVICING_NPI_ALIASES: &[&str] = &["SERVICING_PROVIDER_NPI_NUM", "SERVICING_NPI"];
/// Aliases for the procedure code.
const PROCEDURE_CODE_ALIASES: &[&str] = &["HCPCS_CODE", "PROCEDURE_CODE", "CODE"];
/// Aliases for the claim month.
const CLAIM_MONTH_ALIASES: &[&str] = &["CLAIM_FROM_MONTH", "CLAIM_MONTH", "MONTH"];
/// Aliases for the beneficiary count.
const BENEFICIARIES_ALIASES: &[&str] = &["TOTAL_UNIQUE_BENEFICIARIES", "BENEFICIARIES", "BENE_COUNT"];
/// Aliases for the claim count.
const CLAIMS_ALIASES: &[&str] = &["TOTAL_CLAIMS", "CLAIMS", "CLAIM_COUNT"];
/// Aliases for the paid amount.
const PAID_ALIASES: &[&str] = &["TOTAL_PAID", "PAID", "AMOUNT"];

// ============================================================================
// Column Map
// ============================================================================

/// Resolved column indices for one chunk's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub billing_npi: usize,
    pub servicing_npi: usize,
    pub procedure_code: usize,
    pub claim_month: usize,
    pub beneficiaries: usize,
    pub claims: usize,
    pub paid: usize,
}

/// Header row failed to resolve one or more canonical fields.
#[derive(Debug, Clone)]
pub struct SchemaMismatch {
    /// Canonical field names that found no alias in the header.
    pub missing: Vec<&'static str>,
    /// The header names actually present, as read.
    pub found: Vec<String>,
}

impl std::fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "missing required columns [{}], found [{}]",
            self.missing.join(", "),
            self.found.join(", ")
        )
    }
}

impl ColumnMap {
    /// Resolve every canonical field against a header row.
    ///
    /// Matching is case-insensitive and whitespace-tolerant. Alias lists
    /// are walked in priority order, so an extract carrying both
    /// `BILLING_PROVIDER_NPI_NUM` and `NPI` binds to the former.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, SchemaMismatch> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_uppercase())
            .collect();

        let mut missing = Vec::new();
        let mut resolve = |canonical: &'static str, aliases: &[&str]| -> Option<usize> {
            for alias in aliases {
                if let Some(idx) = normalized.iter().position(|h| h == alias) {
                    return Some(idx);
                }
            }
            missing.push(canonical);
            None
        };

        let billing_npi = resolve("billing_npi", BILLING_NPI_ALIASES);
        let servicing_npi = resolve("servicing_npi", SERVICING_NPI_ALIASES);
        let procedure_code = resolve("procedure_code", PROCEDURE_CODE_ALIASES);
        let claim_month = resolve("claim_month", CLAIM_MONTH_ALIASES);
        let beneficiaries = resolve("beneficiaries", BENEFICIARIES_ALIASES);
        let claims = resolve("claims", CLAIMS_ALIASES);
        let paid = resolve("paid", PAID_ALIASES);

        match (
            billing_npi,
            servicing_npi,
            procedure_code,
            claim_month,
            beneficiaries,
            claims,
            paid,
        ) {
            (
                Some(billing_npi),
                Some(servicing_npi),
                Some(procedure_code),
                Some(claim_month),
                Some(beneficiaries),
                Some(claims),
                Some(paid),
            ) => Ok(Self {
                billing_npi,
                servicing_npi,
                procedure_code,
                claim_month,
                beneficiaries,
                claims,
                paid,
            }),
            _ => Err(SchemaMismatch {
                missing,
                found: headers.iter().map(str::to_string).collect(),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> StringRecord {
        StringRecord::from(cols.to_vec())
    }

    #[test]
    fn test_primary_aliases_resolve() {
        let map = ColumnMap::from_headers(&header(&[
            "BILLING_PROVIDER_NPI_NUM",
            "SERVICING_PROVIDER_NPI_NUM",
            "HCPCS_CODE",
            "CLAIM_FROM_MONTH",
            "TOTAL_UNIQUE_BENEFICIARIES",
            "TOTAL_CLAIMS",
            "TOTAL_PAID",
        ]))
        .unwrap();

        assert_eq!(map.billing_npi, 0);
        assert_eq!(map.servicing_npi, 1);
        assert_eq!(map.procedure_code, 2);
        assert_eq!(map.claim_month, 3);
        assert_eq!(map.beneficiaries, 4);
        assert_eq!(map.claims, 5);
        assert_eq!(map.paid, 6);
    }

    #[test]
    fn test_fallback_aliases_resolve() {
        let map = ColumnMap::from_headers(&header(&[
            "NPI",
            "SERVICING_NPI",
            "CODE",
            "MONTH",
            "BENE_COUNT",
            "CLAIM_COUNT",
            "AMOUNT",
        ]))
        .unwrap();

        assert_eq!(map.billing_npi, 0);
        assert_eq!(map.paid, 6);
    }

    #[test]
    fn test_priority_order_wins_over_position() {
        // NPI appears first, but the higher-priority alias binds.
        let map = ColumnMap::from_headers(&header(&[
            "NPI",
            "BILLING_PROVIDER_NPI_NUM",
            "SERVICING_NPI",
            "CODE",
            "MONTH",
            "BENE_COUNT",
            "CLAIM_COUNT",
            "AMOUNT",
        ]))
        .unwrap();

        assert_eq!(map.billing_npi, 1);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_trimmed() {
        let map = ColumnMap::from_headers(&header(&[
            " billing_npi ",
            "servicing_npi",
            "hcpcs_code",
            "claim_month",
            "beneficiaries",
            "claims",
            "paid",
        ]))
        .unwrap();

        assert_eq!(map.billing_npi, 0);
        assert_eq!(map.claims, 5);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let err = ColumnMap::from_headers(&header(&["NPI", "CODE", "MONTH"])).unwrap_err();

        assert_eq!(
            err.missing,
            vec!["servicing_npi", "beneficiaries", "claims", "paid"]
        );
        assert_eq!(err.found, vec!["NPI", "CODE", "MONTH"]);
        let msg = err.to_string();
        assert!(msg.contains("servicing_npi"), "message: {msg}");
        assert!(msg.contains("found [NPI, CODE, MONTH]"), "message: {msg}");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let map = ColumnMap::from_headers(&header(&[
            "ROW_ID",
            "NPI",
            "SERVICING_NPI",
            "CODE",
            "MONTH",
            "BENE_COUNT",
            "CLAIM_COUNT",
            "AMOUNT",
            "AUDIT_FLAG",
        ]))
        .unwrap();

        assert_eq!(map.billing_npi, 1);
        assert_eq!(map.paid, 7);
    }
}
