//! Agreement resolution (pipeline stage 1).
//!
//! Fetches the raw agreement list for a receiving institution and
//! resolves, per entry, the partner's catalog id (best-effort substring
//! match) and the academic year to query. Entries missing either are
//! retained but inert; the aggregator skips them.

use tracing::debug;

use crate::api::{ApiError, ArticulationClient};
use crate::cancel::CancelToken;
use crate::catalog::InstitutionCatalog;
use crate::models::PartnerAgreement;

/// Resolve the partner agreements for `receiving_institution_id`.
///
/// Cancellation is silent: it logs at debug and returns an empty list.
/// Any other fetch error propagates, halting the pipeline for this
/// request.
pub async fn resolve_agreements(
    client: &ArticulationClient,
    receiving_institution_id: i64,
    catalog: &InstitutionCatalog,
    cancel: &CancelToken,
) -> Result<Vec<PartnerAgreement>, ApiError> {
    let raw = match client.agreements(receiving_institution_id, cancel).await {
        Ok(raw) => raw,
        Err(e) if e.is_cancelled() => {
            debug!(
                receiving = receiving_institution_id,
                "agreement resolution cancelled"
            );
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let agreements: Vec<PartnerAgreement> = raw
        .iter()
        .map(|entry| {
            let source_institution_id = entry
                .institution_name
                .as_deref()
                .and_then(|name| catalog.match_partner(name))
                .map(|inst| inst.id);
            PartnerAgreement::from_raw(entry, source_institution_id)
        })
        .collect();

    debug!(
        receiving = receiving_institution_id,
        total = agreements.len(),
        viable = agreements.iter().filter(|a| a.is_viable()).count(),
        "agreements resolved"
    );

    Ok(agreements)
}
