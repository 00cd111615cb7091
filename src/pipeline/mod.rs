//! The two-stage agreement-aggregation pipeline.
//!
//! Stage 1 (resolver) turns a receiving-institution id into partner
//! agreements; stage 2 (aggregator) turns those into the final major
//! catalog. One explicit invocation per receiving-institution
//! selection, with a fresh cancellation token each time; the caller
//! discards the result when the token fired.

pub mod aggregator;
pub mod normalize;
pub mod resolver;

pub use aggregator::aggregate_majors;
pub use normalize::normalize;
pub use resolver::resolve_agreements;

use crate::api::{ApiError, ArticulationClient};
use crate::cancel::CancelToken;
use crate::catalog::InstitutionCatalog;
use crate::models::MajorCatalog;

/// Run the full pipeline for one receiving-institution selection.
pub async fn run(
    client: &ArticulationClient,
    receiving_institution_id: i64,
    catalog: &InstitutionCatalog,
    cancel: &CancelToken,
) -> Result<MajorCatalog, ApiError> {
    let agreements =
        resolve_agreements(client, receiving_institution_id, catalog, cancel).await?;
    aggregate_majors(client, receiving_institution_id, &agreements, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use crate::models::{Institution, InstitutionName};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog() -> InstitutionCatalog {
        let institution = |id: i64, name: &str| Institution {
            id,
            code: None,
            is_community_college: true,
            names: vec![InstitutionName {
                name: name.to_string(),
                has_departments: false,
                hide_in_list: false,
            }],
        };
        InstitutionCatalog::new(vec![
            institution(10, "Foothill College"),
            institution(11, "De Anza College"),
        ])
    }

    #[tokio::test]
    async fn test_end_to_end_two_stage_pipeline() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/institutions/1/agreements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "institutionName": "Foothill College",
                    "isCommunityCollege": true,
                    "sendingYearIds": [72, 73]
                },
                {
                    "institutionName": "De Anza College",
                    "isCommunityCollege": true,
                    "receivingYearIds": [73]
                },
                {
                    "institutionName": "Nowhere College",
                    "isCommunityCollege": true,
                    "sendingYearIds": [73]
                }
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/agreements"))
            .and(query_param("receivingInstitutionId", "1"))
            .and(query_param("sendingInstitutionId", "10"))
            .and(query_param("academicYearId", "73"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reports": [
                    {"label": "computer science", "key": "a"},
                    {"label": "b.s. in nursing", "key": "b"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/agreements"))
            .and(query_param("sendingInstitutionId", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reports": [
                    {"label": "COMPUTER SCIENCE", "key": "c"},
                    {"label": "art history", "key": "d"}
                ]
            })))
            .mount(&server)
            .await;

        let client = ArticulationClient::new(&server.uri(), 10, 0).unwrap();
        let (_handle, token) = cancel_pair();
        let result = run(&client, 1, &catalog(), &token).await.unwrap();

        // Dedup kept the first partner's casing, sorted lexicographically,
        // unmatched third partner contributed nothing.
        assert_eq!(
            result.majors,
            vec!["Art History", "B.S. In Nursing", "Computer Science"]
        );
        assert_eq!(result.default_major.as_deref(), Some("Art History"));
    }

    #[tokio::test]
    async fn test_agreement_list_failure_halts_pipeline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/institutions/1/agreements"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ArticulationClient::new(&server.uri(), 10, 0).unwrap();
        let (_handle, token) = cancel_pair();
        let err = run(&client, 1, &catalog(), &token).await.unwrap_err();
        assert!(!err.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_yields_cancelled() {
        let client = ArticulationClient::new("http://127.0.0.1:1", 10, 0).unwrap();
        let (handle, token) = cancel_pair();
        handle.cancel();

        // Resolver swallows the cancellation into an empty agreement
        // list; the aggregator then reports cancellation so no state is
        // updated from this superseded selection.
        let err = run(&client, 1, &catalog(), &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
