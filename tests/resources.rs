// ABOUTME: Tests for reading configurations, components and creation factories.
// ABOUTME: Serves both RDF/XML and RDF/JSON documents through the scripted transport.

mod support;

use dngcm::oslc::vocab::{header, media, prop};
use dngcm::oslc::{Graph, Term};
use dngcm::resources::{
    FactoryLookup, ResourceError, ServiceProviderLookup, component_configurations,
    fetch_component, fetch_configuration,
};
use dngcm::transport::{Method, Response};
use dngcm::types::{ComponentUri, ConfigurationKind, ConfigurationUri, ServiceProviderUri};
use support::fixtures::*;
use support::scripted::ScriptedTransport;

const CONTAINER: &str = "https://clm.example.com/rm/cm/component/_comp/configurations";
const BASELINE: &str = "https://clm.example.com/rm/cm/baseline/_b1";

const BASELINE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF
    xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    xmlns:dcterms="http://purl.org/dc/terms/"
    xmlns:oslc_config="http://open-services.net/ns/config#"
    xmlns:prov="http://www.w3.org/ns/prov#">
  <oslc_config:Baseline rdf:about="https://clm.example.com/rm/cm/baseline/_b1">
    <dcterms:title>Release 1 &amp; fixes</dcterms:title>
    <oslc_config:component rdf:resource="https://clm.example.com/rm/cm/component/_comp"/>
    <prov:wasDerivedFrom rdf:resource="https://clm.example.com/rm/cm/stream/_src"/>
  </oslc_config:Baseline>
</rdf:RDF>"#;

fn rdf_xml(body: &'static str) -> Response {
    Response::new(200)
        .with_header("Content-Type", media::RDF_XML)
        .with_body(body)
}

fn component() -> Response {
    let mut graph = Graph::new();
    graph.insert(COMPONENT, prop::DC_TITLE, Term::literal("Types"));
    graph.insert(COMPONENT, prop::CONFIG_CONFIGURATIONS, Term::uri(CONTAINER));
    rdf_json(&graph)
}

fn container(members: &[&str]) -> Response {
    let mut graph = Graph::new();
    for member in members {
        graph.insert(CONTAINER, prop::RDFS_MEMBER, Term::uri(*member));
    }
    rdf_json(&graph)
}

#[tokio::test]
async fn rdf_xml_configuration_is_read() {
    support::init_tracing();
    let server = ScriptedTransport::default();
    server.on(Method::Get, BASELINE, rdf_xml(BASELINE_XML));

    let baseline = fetch_configuration(&server, &ConfigurationUri::new(BASELINE))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(baseline.kind, ConfigurationKind::Baseline);
    assert_eq!(baseline.title.as_deref(), Some("Release 1 & fixes"));
    assert_eq!(baseline.component, Some(ComponentUri::new(COMPONENT)));
    assert_eq!(baseline.was_derived_from, Some(ConfigurationUri::new(SOURCE)));

    let read = server.single(Method::Get, BASELINE);
    assert_eq!(read.header_value(header::ACCEPT), Some(media::RDF_XML));
    assert_eq!(
        read.header_value(header::OSLC_CORE_VERSION),
        Some(header::OSLC_CORE_VERSION_2)
    );
}

const TAGGED_STREAM_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF
    xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    xmlns:dcterms="http://purl.org/dc/terms/"
    xmlns:oslc_config="http://open-services.net/ns/config#">
  <oslc_config:Stream rdf:about="https://clm.example.com/rm/cm/stream/_src">
    <dcterms:title>Types master</dcterms:title>
    <dcterms:description rdf:parseType="Literal"><div xmlns="http://www.w3.org/1999/xhtml"><p>[SOURCE] shared type system</p></div></dcterms:description>
  </oslc_config:Stream>
</rdf:RDF>"#;

#[tokio::test]
async fn xhtml_description_is_read_as_text() {
    let server = ScriptedTransport::default();
    server.on(Method::Get, SOURCE, rdf_xml(TAGGED_STREAM_XML));

    let stream = fetch_configuration(&server, &ConfigurationUri::new(SOURCE))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stream.kind, ConfigurationKind::Stream);
    assert_eq!(
        stream.description.as_deref(),
        Some("[SOURCE] shared type system")
    );

    // The source tag is found, so only the missing targets are reported.
    let err = dngcm::worklist::tagged_transfers(&[stream], "[SOURCE]", "[TARGET]").unwrap_err();
    assert!(matches!(err, dngcm::error::Error::NoTargets(_)));
}

#[tokio::test]
async fn gone_configuration_is_none() {
    let server = ScriptedTransport::default();
    server.on(Method::Get, BASELINE, status(410));

    let found = fetch_configuration(&server, &ConfigurationUri::new(BASELINE))
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn forbidden_configuration_is_an_error() {
    let server = ScriptedTransport::default();
    server.on(Method::Get, BASELINE, status(403));

    let err = fetch_configuration(&server, &ConfigurationUri::new(BASELINE))
        .await
        .unwrap_err();

    assert!(matches!(err, ResourceError::UnexpectedStatus { status: 403, .. }));
}

#[tokio::test]
async fn malformed_document_is_an_rdf_error() {
    let server = ScriptedTransport::default();
    server.on(Method::Get, BASELINE, rdf_xml("<rdf:RDF><oops"));

    let err = fetch_configuration(&server, &ConfigurationUri::new(BASELINE))
        .await
        .unwrap_err();

    assert!(matches!(err, ResourceError::Rdf { .. }));
}

#[tokio::test]
async fn component_lists_members_and_skips_gone_ones() {
    let server = ScriptedTransport::default();
    script_resources(&server);
    server
        .on(Method::Get, COMPONENT, component())
        .on(Method::Get, CONTAINER, container(&[SOURCE, TARGET, BASELINE]))
        .on(Method::Get, BASELINE, status(404));

    let component = fetch_component(&server, &ComponentUri::new(COMPONENT))
        .await
        .unwrap()
        .unwrap();
    let configurations = component_configurations(&server, &component).await.unwrap();

    assert_eq!(component.label(), "Types");
    let titles: Vec<&str> = configurations.iter().map(|c| c.label()).collect();
    assert_eq!(titles, ["Types master", "Project stream"]);
}

#[tokio::test]
async fn factory_is_found_by_resource_type() {
    let server = ScriptedTransport::default();
    server.on(Method::Get, PROVIDER, service_provider());
    let lookup = ServiceProviderLookup::new(&server);

    let factory = lookup
        .creation_factory(
            &ServiceProviderUri::new(PROVIDER),
            prop::TYPES_TYPE_IMPORT_SESSION,
        )
        .await
        .unwrap();

    assert_eq!(factory.as_str(), TYPE_IMPORT_FACTORY);
}

#[tokio::test]
async fn missing_factory_is_reported() {
    let server = ScriptedTransport::default();
    server.on(Method::Get, PROVIDER, service_provider());
    let lookup = ServiceProviderLookup::new(&server);

    let err = lookup
        .creation_factory(&ServiceProviderUri::new(PROVIDER), prop::CONFIG_CHANGESET)
        .await
        .unwrap_err();

    assert!(matches!(err, ResourceError::NoCreationFactory { .. }));
}
