// ABOUTME: Tests for type system import sessions.
// ABOUTME: Checks the request shape and how the tracker verdict is applied.

mod support;

use dngcm::oslc::vocab::{auto, header, prop};
use dngcm::resources::{Configuration, ServiceProviderLookup, fetch_configuration};
use dngcm::tracker::{TrackerError, VerdictPolicy};
use dngcm::transport::Method;
use dngcm::type_import::{TypeImportError, perform_type_import};
use dngcm::types::ConfigurationUri;
use support::fixtures::*;
use support::scripted::ScriptedTransport;

async fn configurations(server: &ScriptedTransport) -> (Configuration, Configuration) {
    script_resources(server);
    let source = fetch_configuration(server, &ConfigurationUri::new(SOURCE))
        .await
        .unwrap()
        .unwrap();
    let target = fetch_configuration(server, &ConfigurationUri::new(TARGET))
        .await
        .unwrap()
        .unwrap();
    (source, target)
}

async fn import(
    server: &ScriptedTransport,
    policy: VerdictPolicy,
) -> Result<dngcm::tracker::Completion, TypeImportError> {
    let (source, target) = configurations(server).await;
    let lookup = ServiceProviderLookup::new(server);
    perform_type_import(server, &lookup, &source, &target, &wait(), policy).await
}

#[tokio::test]
async fn import_is_posted_in_target_context_and_tracked() {
    support::init_tracing();
    let server = ScriptedTransport::default();
    script_type_import(&server, auto::PASSED);

    let completion = import(&server, VerdictPolicy::RejectErrors).await.unwrap();

    assert_eq!(completion.verdict, dngcm::tracker::Verdict::Passed);
    assert_eq!(server.sent(Method::Get, IMPORT_TRACKER), 2);

    let post = server.single(Method::Post, TYPE_IMPORT_FACTORY);
    assert_eq!(post.header_value(header::CONFIGURATION_CONTEXT), Some(TARGET));
    assert!(post.header_value(header::OSLC_CORE_VERSION).is_none());

    let body = String::from_utf8(post.body.unwrap().to_vec()).unwrap();
    let graph = dngcm::oslc::Graph::from_rdf_xml(&body).unwrap();
    let session = graph.resources().next().unwrap();
    assert_eq!(session.first_uri(prop::TYPES_SOURCE), Some(SOURCE));
    assert_eq!(session.first_uri(prop::TYPES_TARGET), Some(TARGET));
    assert_eq!(session.first_uri(prop::OSLC_SERVICE_PROVIDER), Some(PROVIDER));
}

#[tokio::test]
async fn failed_verdict_is_tolerated_when_only_errors_are_rejected() {
    let server = ScriptedTransport::default();
    script_type_import(&server, auto::FAILED);

    assert!(import(&server, VerdictPolicy::RejectErrors).await.is_ok());
}

#[tokio::test]
async fn error_verdict_is_rejected() {
    let server = ScriptedTransport::default();
    script_type_import(&server, auto::ERROR);

    let err = import(&server, VerdictPolicy::RejectErrors).await.unwrap_err();

    assert!(matches!(
        err,
        TypeImportError::Tracker(TrackerError::Rejected { .. })
    ));
}

#[tokio::test]
async fn non_accepted_answer_fails_without_tracking() {
    let server = ScriptedTransport::default();
    server.on(Method::Post, TYPE_IMPORT_FACTORY, status(201));

    let err = import(&server, VerdictPolicy::RejectErrors).await.unwrap_err();

    assert!(matches!(err, TypeImportError::UnexpectedStatus { status: 201, .. }));
    assert_eq!(server.sent_containing(Method::Get, "/tracker/"), 0);
}

#[tokio::test]
async fn accepted_answer_without_location_fails() {
    let server = ScriptedTransport::default();
    server.on(Method::Post, TYPE_IMPORT_FACTORY, status(202));

    let err = import(&server, VerdictPolicy::RejectErrors).await.unwrap_err();

    assert!(matches!(err, TypeImportError::MissingLocation { .. }));
}

#[tokio::test]
async fn target_without_service_provider_is_refused() {
    let server = ScriptedTransport::default();
    let (source, _) = configurations(&server).await;
    let target = Configuration::new(ConfigurationUri::new(TARGET));
    let lookup = ServiceProviderLookup::new(&server);

    let err = perform_type_import(
        &server,
        &lookup,
        &source,
        &target,
        &wait(),
        VerdictPolicy::RejectErrors,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TypeImportError::NoServiceProvider(_)));
    assert_eq!(server.sent_containing(Method::Post, ""), 0);
}
