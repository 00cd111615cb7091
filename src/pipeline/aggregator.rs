//! Major aggregation (pipeline stage 2).
//!
//! Fans out one fetch per viable partner agreement, joins all of them
//! regardless of individual outcome, and merges the successes into one
//! deduplicated, sorted major catalog. A failed partner fetch degrades
//! to an empty contribution; it never aborts siblings or the
//! aggregation as a whole.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::api::{ApiError, ArticulationClient};
use crate::cancel::CancelToken;
use crate::models::{MajorCatalog, PartnerAgreement};
use crate::pipeline::normalize::normalize;

/// Aggregate the major lists of every viable partner agreement.
///
/// Agreements missing a partner id or academic year contribute nothing
/// and cost no network call. `join_all` preserves input-order
/// correspondence between agreements and results, so the "first-seen"
/// casing kept by deduplication follows source agreement order, not
/// network completion order.
///
/// Returns `ApiError::Cancelled` when the signal fired during the
/// fan-out, so the caller can discard the stale result without touching
/// any displayed state.
pub async fn aggregate_majors(
    client: &ArticulationClient,
    receiving_institution_id: i64,
    agreements: &[PartnerAgreement],
    cancel: &CancelToken,
) -> Result<MajorCatalog, ApiError> {
    let fetches = agreements.iter().map(|agreement| {
        let client = client.clone();
        let cancel = cancel.clone();
        let sending = agreement.source_institution_id;
        let year = agreement.academic_year_id;

        async move {
            let (Some(sending), Some(year)) = (sending, year) else {
                return Vec::new();
            };

            match client
                .major_reports(receiving_institution_id, sending, year, &cancel)
                .await
            {
                Ok(response) => response.labels(),
                Err(e) if e.is_cancelled() => {
                    debug!(partner = sending, "major fetch cancelled");
                    Vec::new()
                }
                Err(e) => {
                    warn!(partner = sending, error = %e, "major fetch failed, partner contributes no majors");
                    Vec::new()
                }
            }
        }
    });

    let per_partner: Vec<Vec<String>> = join_all(fetches).await;

    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    Ok(MajorCatalog::new(merge_labels(per_partner)))
}

/// Normalize and deduplicate per-partner label lists, flattened in
/// input order.
///
/// Dedup identity is the lower-cased normalized label; the first-seen
/// normalized casing is kept as the canonical display form. Labels that
/// trim to empty still participate.
pub fn merge_labels(per_partner: Vec<Vec<String>>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for labels in per_partner {
        for raw in labels {
            let normalized = normalize(&raw);
            if seen.insert(normalized.to_lowercase()) {
                merged.push(normalized);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn viable(sending: i64, year: i64) -> PartnerAgreement {
        PartnerAgreement {
            source_institution_id: Some(sending),
            is_community_college: true,
            academic_year_id: Some(year),
        }
    }

    fn inert() -> PartnerAgreement {
        PartnerAgreement {
            source_institution_id: None,
            is_community_college: true,
            academic_year_id: None,
        }
    }

    fn reports_body(labels: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "reports": labels
                .iter()
                .map(|l| serde_json::json!({"label": l, "key": "k"}))
                .collect::<Vec<_>>()
        })
    }

    async fn mount_reports(server: &MockServer, sending: i64, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/api/agreements"))
            .and(query_param("sendingInstitutionId", sending.to_string()))
            .and(query_param("categoryCode", "major"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn test_merge_dedups_case_insensitively_keeping_first_seen() {
        let merged = merge_labels(vec![vec![
            "Computer Science".to_string(),
            "computer science".to_string(),
            "COMPUTER SCIENCE".to_string(),
        ]]);
        assert_eq!(merged, vec!["Computer Science"]);
    }

    #[test]
    fn test_merge_follows_source_agreement_order() {
        let merged = merge_labels(vec![
            vec!["history".to_string()],
            vec!["History".to_string(), "Music".to_string()],
        ]);
        // First partner's casing wins even though the second also has it.
        assert_eq!(merged, vec!["History", "Music"]);
    }

    #[test]
    fn test_merge_keeps_empty_labels() {
        let merged = merge_labels(vec![vec!["  ".to_string(), "Art".to_string()]]);
        assert_eq!(merged, vec!["", "Art"]);
    }

    #[tokio::test]
    async fn test_aggregates_and_sorts_across_partners() {
        let server = MockServer::start().await;
        mount_reports(
            &server,
            10,
            ResponseTemplate::new(200).set_body_json(reports_body(&["zoology", "biology"])),
        )
        .await;
        mount_reports(
            &server,
            11,
            ResponseTemplate::new(200).set_body_json(reports_body(&["art", "Biology"])),
        )
        .await;

        let client = ArticulationClient::new(&server.uri(), 10, 0).unwrap();
        let (_handle, token) = cancel_pair();
        let catalog = aggregate_majors(&client, 1, &[viable(10, 72), viable(11, 72)], &token)
            .await
            .unwrap();

        assert_eq!(catalog.majors, vec!["Art", "Biology", "Zoology"]);
        assert_eq!(catalog.default_major.as_deref(), Some("Art"));
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let server = MockServer::start().await;
        mount_reports(&server, 10, ResponseTemplate::new(500)).await;
        mount_reports(&server, 11, ResponseTemplate::new(500)).await;
        mount_reports(
            &server,
            12,
            ResponseTemplate::new(200).set_body_json(reports_body(&["physics"])),
        )
        .await;

        let client = ArticulationClient::new(&server.uri(), 10, 0).unwrap();
        let (_handle, token) = cancel_pair();
        let catalog = aggregate_majors(
            &client,
            1,
            &[viable(10, 72), viable(11, 72), viable(12, 72)],
            &token,
        )
        .await
        .unwrap();

        assert_eq!(catalog.majors, vec!["Physics"]);
    }

    #[tokio::test]
    async fn test_inert_agreements_cost_no_network_calls() {
        let server = MockServer::start().await;

        let client = ArticulationClient::new(&server.uri(), 10, 0).unwrap();
        let (_handle, token) = cancel_pair();
        let catalog = aggregate_majors(&client, 1, &[inert(), inert()], &token)
            .await
            .unwrap();

        assert!(catalog.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_reports_field_is_empty() {
        let server = MockServer::start().await;
        mount_reports(
            &server,
            10,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({})),
        )
        .await;

        let client = ArticulationClient::new(&server.uri(), 10, 0).unwrap();
        let (_handle, token) = cancel_pair();
        let catalog = aggregate_majors(&client, 1, &[viable(10, 72)], &token)
            .await
            .unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_mid_flight_discards_result() {
        let server = MockServer::start().await;
        mount_reports(
            &server,
            10,
            ResponseTemplate::new(200)
                .set_body_json(reports_body(&["physics"]))
                .set_delay(Duration::from_secs(5)),
        )
        .await;

        let client = ArticulationClient::new(&server.uri(), 30, 0).unwrap();
        let (handle, token) = cancel_pair();

        let agreements = vec![viable(10, 72)];
        let aggregation = aggregate_majors(&client, 1, &agreements, &token);
        tokio::pin!(aggregation);

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(50)) => handle.cancel(),
            _ = &mut aggregation => panic!("aggregation finished before cancel"),
        }

        let err = aggregation.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
