// ABOUTME: In-memory RDF graph read from RDF/JSON or RDF/XML response bodies.
// ABOUTME: Offers subject/property lookups used by trackers, sessions and configurations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rdfxml;
use super::vocab::prop;

/// Errors reading an RDF document.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("malformed RDF/JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed RDF/XML: {0}")]
    Xml(String),
}

/// One object value in RDF/JSON form: `{"type": "uri", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            datatype: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            datatype: None,
        }
    }

    pub fn bnode(id: impl Into<String>) -> Self {
        Self {
            kind: "bnode".to_string(),
            value: id.into(),
            datatype: None,
        }
    }

    /// Literal holding an XML fragment, as read from `rdf:parseType="Literal"`.
    pub fn xml_literal(xml: impl Into<String>) -> Self {
        Self {
            datatype: Some(prop::RDF_XML_LITERAL.to_string()),
            ..Self::literal(xml)
        }
    }

    /// Readable text of the value; markup of XML literals is dropped.
    pub fn text(&self) -> String {
        match self.datatype.as_deref() {
            Some(prop::RDF_XML_LITERAL) => rdfxml::plain_text(&self.value),
            _ => self.value.clone(),
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == "uri"
    }

    pub fn is_node(&self) -> bool {
        self.kind == "uri" || self.kind == "bnode"
    }
}

type Properties = BTreeMap<String, Vec<Term>>;

/// Subjects mapped to their properties, in RDF/JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    subjects: BTreeMap<String, Properties>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rdf_json(body: &[u8]) -> Result<Self, GraphError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn from_rdf_xml(body: &str) -> Result<Self, GraphError> {
        rdfxml::parse(body)
    }

    /// Parse a response body, choosing the syntax from the content type.
    ///
    /// Without a content type the first non-blank byte decides: `{` is RDF/JSON.
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Self, GraphError> {
        let json = match content_type {
            Some(ct) if ct.contains("json") => true,
            Some(ct) if ct.contains("xml") => false,
            _ => body
                .iter()
                .find(|b| !b.is_ascii_whitespace())
                .is_some_and(|b| *b == b'{'),
        };
        if json {
            Self::from_rdf_json(body)
        } else {
            Self::from_rdf_xml(&String::from_utf8_lossy(body))
        }
    }

    pub fn insert(&mut self, subject: impl Into<String>, predicate: impl Into<String>, term: Term) {
        self.subjects
            .entry(subject.into())
            .or_default()
            .entry(predicate.into())
            .or_default()
            .push(term);
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn subject(&self, uri: &str) -> Option<Resource<'_>> {
        self.subjects
            .get_key_value(uri)
            .map(|(uri, properties)| Resource { uri, properties })
    }

    /// Look up `uri`, falling back to the only subject in a single-subject graph.
    ///
    /// The server sometimes keys a document by a canonical URI that differs
    /// from the one requested (for example a tracker reached via redirect).
    pub fn subject_or_only(&self, uri: &str) -> Option<Resource<'_>> {
        self.subject(uri).or_else(|| {
            if self.subjects.len() == 1 {
                self.resources().next()
            } else {
                None
            }
        })
    }

    pub fn resources(&self) -> impl Iterator<Item = Resource<'_>> {
        self.subjects
            .iter()
            .map(|(uri, properties)| Resource { uri, properties })
    }

    pub fn resources_of_type<'a>(
        &'a self,
        class: &'a str,
    ) -> impl Iterator<Item = Resource<'a>> + 'a {
        self.resources().filter(move |r| r.has_type(class))
    }
}

/// Borrowed view of one subject and its properties.
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    pub uri: &'a str,
    properties: &'a Properties,
}

impl<'a> Resource<'a> {
    pub fn values(&self, predicate: &str) -> &'a [Term] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, predicate: &str) -> Option<&'a Term> {
        self.values(predicate).first()
    }

    pub fn first_value(&self, predicate: &str) -> Option<&'a str> {
        self.first(predicate).map(|t| t.value.as_str())
    }

    /// Readable text of the first object of `predicate`.
    pub fn first_text(&self, predicate: &str) -> Option<String> {
        self.first(predicate).map(Term::text)
    }

    /// First object of `predicate` whose term type is `uri`.
    pub fn first_uri(&self, predicate: &str) -> Option<&'a str> {
        self.values(predicate)
            .iter()
            .find(|t| t.is_uri())
            .map(|t| t.value.as_str())
    }

    pub fn uris(&self, predicate: &str) -> Vec<&'a str> {
        self.values(predicate)
            .iter()
            .filter(|t| t.is_uri())
            .map(|t| t.value.as_str())
            .collect()
    }

    pub fn has_type(&self, class: &str) -> bool {
        self.values(prop::RDF_TYPE).iter().any(|t| t.value == class)
    }

    pub fn predicates(&self) -> Vec<&'a str> {
        self.properties.keys().map(String::as_str).collect()
    }
}
