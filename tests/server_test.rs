mod common;

use assert2::{check, let_assert};
use common::{StubService, dead_port, notes_service};
use omnisearch_inject::render::{NO_RESULTS_FRAGMENT, TRANSPORT_ERROR_FRAGMENT};
use omnisearch_inject::server::{OmnisearchServer, SearchNotesRequest, handle_search_notes};
use omnisearch_inject::{MemoryRegion, OmnisearchClient, ProcessOptions, SearchSession};
use rstest::rstest;
use std::sync::Arc;

fn request(query: &str, limit: Option<usize>) -> SearchNotesRequest {
    SearchNotesRequest {
        query: query.to_string(),
        limit,
    }
}

#[rstest]
#[tokio::test]
async fn search_notes_uses_configured_limit(#[future] notes_service: StubService) {
    let service = notes_service.await;
    let session = service.session(ProcessOptions::default());

    let_assert!(Ok(fragment) = handle_search_notes(&session, request("cat", None)).await);
    check!(fragment.matches("<div class=\"omni-result\">").count() == 2);
}

#[rstest]
#[case(Some(1), 1)]
#[case(Some(10), 2)]
#[tokio::test]
async fn search_notes_limit_overrides_config(
    #[future] notes_service: StubService,
    #[case] limit: Option<usize>,
    #[case] expected_cards: usize,
) {
    let service = notes_service.await;
    let session = service.session(ProcessOptions::default());

    let_assert!(Ok(fragment) = handle_search_notes(&session, request("cat", limit)).await);
    check!(fragment.matches("<div class=\"omni-result\">").count() == expected_cards);
    // The session's own options are untouched by a per-call limit.
    check!(session.options().nb_results == 3);
}

#[rstest]
#[tokio::test]
async fn search_notes_zero_limit_renders_no_results(#[future] notes_service: StubService) {
    let service = notes_service.await;
    let session = service.session(ProcessOptions::default());

    let_assert!(Ok(fragment) = handle_search_notes(&session, request("cat", Some(0))).await);
    check!(fragment == NO_RESULTS_FRAGMENT);
}

#[rstest]
#[tokio::test]
async fn search_notes_rejects_blank_query(#[future] notes_service: StubService) {
    let service = notes_service.await;
    let session = service.session(ProcessOptions::default());

    let_assert!(Err(message) = handle_search_notes(&session, request("   ", None)).await);
    check!(message.contains("empty"));
    check!(service.request_count() == 0);
}

#[rstest]
#[tokio::test]
async fn search_notes_reports_unreachable_service(#[future] dead_port: u16) {
    let client = OmnisearchClient::new(dead_port.await).unwrap();
    let session = SearchSession::new(client, ProcessOptions::default(), MemoryRegion::new());

    let_assert!(Err(message) = handle_search_notes(&session, request("cat", None)).await);
    check!(message == TRANSPORT_ERROR_FRAGMENT);
}

#[rstest]
#[tokio::test]
async fn server_shares_one_session(#[future] notes_service: StubService) {
    let service = notes_service.await;
    let session = Arc::new(service.session(ProcessOptions::default()));
    let server = OmnisearchServer::new(session.clone());

    let_assert!(Ok(_) = handle_search_notes(server.session(), request("cat", None)).await);
    check!(session.latest_token().map(|t| t.get()) == Some(1));
    check!(session.region().contents().contains("omnisearch-excerpt-container"));
}
