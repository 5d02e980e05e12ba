// ABOUTME: RDF/JSON response builders for trackers, sessions, configurations and providers.
// ABOUTME: URLs are fixed so scripted routes and assertions line up.

use dngcm::oslc::vocab::{auto, prop};
use dngcm::oslc::{Graph, Term};
use dngcm::transport::{Method, Response};
use std::time::Duration;

use super::scripted::{BASE, ScriptedTransport};

pub const SOURCE: &str = "https://clm.example.com/rm/cm/stream/_src";
pub const TARGET: &str = "https://clm.example.com/rm/cm/stream/_tgt";
pub const CHANGESET: &str = "https://clm.example.com/rm/cm/changeset/_cs";
pub const COMPONENT: &str = "https://clm.example.com/rm/cm/component/_comp";
pub const PROVIDER: &str = "https://clm.example.com/rm/oslc_rm/_pa/services.xml";
pub const CHANGESET_FACTORY: &str = "https://clm.example.com/rm/cm/changesets/_tgt";
pub const DELIVERY_FACTORY: &str = "https://clm.example.com/rm/delivery-session-factory";
pub const TYPE_IMPORT_FACTORY: &str = "https://clm.example.com/rm/type-import-factory";
pub const SESSION: &str = "https://clm.example.com/rm/cm/deliverysession/_ds";
pub const CHANGESET_TRACKER: &str = "https://clm.example.com/rm/tracker/changeset";
pub const IMPORT_TRACKER: &str = "https://clm.example.com/rm/tracker/import";
pub const DELIVERY_TRACKER: &str = "https://clm.example.com/rm/tracker/delivery";

pub fn discard_url() -> String {
    format!("{BASE}/localVersioning/configurations/changesets/discard")
}

/// Polling settings fast enough for tests.
pub fn fast_poll() -> dngcm::tracker::PollPolicy {
    dngcm::tracker::PollPolicy {
        interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        backoff: 2.0,
        timeout: Duration::from_secs(5),
    }
}

pub fn wait() -> dngcm::tracker::WaitOptions {
    dngcm::tracker::WaitOptions::new(fast_poll(), Default::default())
}

pub fn rdf_json(graph: &Graph) -> Response {
    Response::new(200)
        .with_header("Content-Type", "application/rdf+json")
        .with_body(serde_json::to_vec(graph).unwrap())
}

pub fn created(location: &str) -> Response {
    Response::new(201).with_header("Location", location)
}

pub fn accepted(location: &str) -> Response {
    Response::new(202).with_header("Location", location)
}

pub fn status(code: u16) -> Response {
    Response::new(code)
}

pub fn tracker_in_progress(uri: &str) -> Response {
    let mut graph = Graph::new();
    graph.insert(uri, prop::AUTO_STATE, Term::uri(auto::IN_PROGRESS));
    rdf_json(&graph)
}

pub fn tracker_complete(uri: &str, verdict: &str, reference: Option<&str>) -> Response {
    let mut graph = Graph::new();
    graph.insert(uri, prop::AUTO_STATE, Term::uri(auto::COMPLETE));
    graph.insert(uri, prop::AUTO_VERDICT, Term::uri(verdict));
    graph.insert(uri, prop::DC_TITLE, Term::literal("Tracked operation"));
    if let Some(reference) = reference {
        graph.insert(uri, prop::DC_REFERENCES, Term::uri(reference));
    }
    rdf_json(&graph)
}

pub fn tracker_passed(uri: &str) -> Response {
    tracker_complete(uri, auto::PASSED, None)
}

pub fn session(uri: &str, state: &str) -> Response {
    let mut graph = Graph::new();
    graph.insert(uri, prop::RDF_TYPE, Term::uri(prop::DNG_DELIVERY_SESSION));
    graph.insert(uri, prop::DNG_DELIVERY_SESSION_STATE, Term::uri(state));
    rdf_json(&graph)
}

pub fn stream(uri: &str, title: &str) -> Response {
    let mut graph = Graph::new();
    graph.insert(uri, prop::DC_TITLE, Term::literal(title));
    graph.insert(uri, prop::CONFIG_COMPONENT, Term::uri(COMPONENT));
    graph.insert(uri, prop::OSLC_SERVICE_PROVIDER, Term::uri(PROVIDER));
    graph.insert(uri, prop::DNG_CHANGESETS, Term::uri(CHANGESET_FACTORY));
    rdf_json(&graph)
}

pub fn changeset(uri: &str, overrides: &str) -> Response {
    let mut graph = Graph::new();
    graph.insert(uri, prop::DC_TITLE, Term::literal("Import-Type-System-CS"));
    graph.insert(uri, prop::CONFIG_COMPONENT, Term::uri(COMPONENT));
    graph.insert(uri, prop::OSLC_SERVICE_PROVIDER, Term::uri(PROVIDER));
    graph.insert(uri, prop::CONFIG_OVERRIDES, Term::uri(overrides));
    rdf_json(&graph)
}

pub fn service_provider() -> Response {
    let mut graph = Graph::new();
    for (node, resource_type, creation) in [
        ("_:delivery", prop::DNG_DELIVERY_SESSION, DELIVERY_FACTORY),
        ("_:import", prop::TYPES_TYPE_IMPORT_SESSION, TYPE_IMPORT_FACTORY),
    ] {
        graph.insert(node, prop::RDF_TYPE, Term::uri(prop::OSLC_CREATION_FACTORY));
        graph.insert(node, prop::OSLC_RESOURCE_TYPE, Term::uri(resource_type));
        graph.insert(node, prop::OSLC_CREATION, Term::uri(creation));
    }
    rdf_json(&graph)
}

/// Source, target and service provider documents.
pub fn script_resources(server: &ScriptedTransport) {
    server
        .on(Method::Get, SOURCE, stream(SOURCE, "Types master"))
        .on(Method::Get, TARGET, stream(TARGET, "Project stream"))
        .on(Method::Get, PROVIDER, service_provider());
}

/// A delivery session that is created, read as initialised, and committed synchronously.
pub fn script_sync_delivery(server: &ScriptedTransport) {
    use dngcm::oslc::vocab::delivery_state;
    server
        .on(Method::Post, DELIVERY_FACTORY, created(SESSION))
        .on(Method::Get, SESSION, session(SESSION, delivery_state::INITIALISED))
        .on(Method::Put, SESSION, session(SESSION, delivery_state::DELIVERED));
}

/// Changeset creation through its tracker, then the changeset document.
pub fn script_changeset(server: &ScriptedTransport) {
    server
        .on(Method::Post, CHANGESET_FACTORY, accepted(CHANGESET_TRACKER))
        .on(
            Method::Get,
            CHANGESET_TRACKER,
            tracker_complete(CHANGESET_TRACKER, auto::PASSED, Some(CHANGESET)),
        )
        .on(Method::Get, CHANGESET, changeset(CHANGESET, TARGET));
}

pub fn script_type_import(server: &ScriptedTransport, verdict: &str) {
    server
        .on(Method::Post, TYPE_IMPORT_FACTORY, accepted(IMPORT_TRACKER))
        .on(Method::Get, IMPORT_TRACKER, tracker_in_progress(IMPORT_TRACKER))
        .on(Method::Get, IMPORT_TRACKER, tracker_complete(IMPORT_TRACKER, verdict, None));
}

pub fn script_discard(server: &ScriptedTransport, ok: bool) {
    let response = if ok {
        Response::new(200).with_body("Discarded. OK")
    } else {
        Response::new(500)
    };
    server.on(Method::Post, &discard_url(), response);
}
