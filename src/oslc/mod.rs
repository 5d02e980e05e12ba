// ABOUTME: OSLC plumbing: vocabulary constants and the RDF documents exchanged with the server.
// ABOUTME: Reads RDF/JSON and RDF/XML into one graph model and writes RDF/XML payloads.

mod graph;
pub mod rdfxml;
pub mod vocab;

pub use graph::{Graph, GraphError, Resource, Term};
pub use rdfxml::Description;
