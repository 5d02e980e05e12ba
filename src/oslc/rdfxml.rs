// ABOUTME: Minimal RDF/XML support: a striped-syntax reader and a payload writer.
// ABOUTME: Covers the documents the RM server returns and the resources this client posts.

use std::collections::HashMap;

use super::graph::{Graph, GraphError, Term};
use super::vocab::{ns, prop};

// =============================================================================
// Writer
// =============================================================================

/// Prefixes declared on every payload this client sends.
const PREFIXES: &[(&str, &str)] = &[
    ("rdf", ns::RDF),
    ("dcterms", ns::DCTERMS),
    ("oslc", ns::OSLC),
    ("oslc_config", ns::OSLC_CONFIG),
    ("dng_config", ns::DNG_CONFIG),
    ("types", ns::RM_TYPES),
];

/// Object of one property element.
#[derive(Debug, Clone, Copy)]
pub enum Object<'a> {
    Resource(&'a str),
    Literal(&'a str),
}

/// A single typed node with its properties, serialized as one RDF/XML document.
///
/// Names are `prefix:local` qualified names using the prefixes in [`PREFIXES`].
#[derive(Debug, Clone)]
pub struct Description<'a> {
    class: &'a str,
    about: Option<&'a str>,
    properties: Vec<(&'a str, Object<'a>)>,
}

impl<'a> Description<'a> {
    pub fn new(class: &'a str) -> Self {
        Self {
            class,
            about: None,
            properties: Vec::new(),
        }
    }

    pub fn about(mut self, about: &'a str) -> Self {
        self.about = Some(about);
        self
    }

    pub fn resource(mut self, property: &'a str, uri: &'a str) -> Self {
        self.properties.push((property, Object::Resource(uri)));
        self
    }

    pub fn literal(mut self, property: &'a str, value: &'a str) -> Self {
        self.properties.push((property, Object::Literal(value)));
        self
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rdf:RDF");
        for (prefix, namespace) in PREFIXES {
            out.push_str(&format!("\n    xmlns:{prefix}=\"{namespace}\""));
        }
        out.push_str(">\n");

        match self.about {
            Some(about) => out.push_str(&format!(
                "  <{} rdf:about=\"{}\">\n",
                self.class,
                escape(about)
            )),
            None => out.push_str(&format!("  <{}>\n", self.class)),
        }
        for (property, object) in &self.properties {
            match object {
                Object::Resource(uri) => out.push_str(&format!(
                    "    <{property} rdf:resource=\"{}\"/>\n",
                    escape(uri)
                )),
                Object::Literal(value) => out.push_str(&format!(
                    "    <{property}>{}</{property}>\n",
                    escape(value)
                )),
            }
        }
        out.push_str(&format!("  </{}>\n</rdf:RDF>\n", self.class));
        out
    }
}

/// Escape text for use in XML content and attribute values.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find(';') else {
            out.push_str(after);
            return out;
        };
        let entity = &after[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&after[..=end]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Character content of an XML fragment with markup removed.
pub fn plain_text(xml: &str) -> String {
    let mut tokens = Tokenizer::new(xml);
    let mut out = String::new();
    while let Ok(Some(event)) = tokens.next_event() {
        if let Event::Text(text) = event {
            out.push_str(&text);
        }
    }
    out.trim().to_string()
}

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug)]
enum Event<'a> {
    Start {
        name: &'a str,
        attrs: Vec<(&'a str, String)>,
        empty: bool,
    },
    End,
    Text(String),
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn skip_past(&mut self, terminator: &str) -> Result<(), GraphError> {
        match self.src[self.pos..].find(terminator) {
            Some(i) => {
                self.pos += i + terminator.len();
                Ok(())
            }
            None => Err(GraphError::Xml(format!(
                "missing '{terminator}' after byte {}",
                self.pos
            ))),
        }
    }

    /// Byte offset of the `>` closing the tag at `self.pos`, honoring quoted values.
    fn tag_end(&self) -> Result<usize, GraphError> {
        let mut quote = None;
        for (i, c) in self.src[self.pos..].char_indices() {
            match (quote, c) {
                (None, '"' | '\'') => quote = Some(c),
                (Some(q), c) if c == q => quote = None,
                (None, '>') => return Ok(self.pos + i),
                _ => {}
            }
        }
        Err(GraphError::Xml(format!(
            "unterminated tag at byte {}",
            self.pos
        )))
    }

    /// Skip to the end tag closing the element just opened and return the
    /// markup between the two tags unchanged.
    fn raw_content(&mut self) -> Result<&'a str, GraphError> {
        let src = self.src;
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let before = self.pos;
            match self.next_event()? {
                Some(Event::Start { empty: false, .. }) => depth += 1,
                Some(Event::End) if depth == 0 => return Ok(&src[start..before]),
                Some(Event::End) => depth -= 1,
                Some(_) => {}
                None => {
                    return Err(GraphError::Xml(format!(
                        "unterminated literal starting at byte {start}"
                    )));
                }
            }
        }
    }

    fn next_event(&mut self) -> Result<Option<Event<'a>>, GraphError> {
        let src = self.src;
        loop {
            if self.pos >= src.len() {
                return Ok(None);
            }
            let rest = &src[self.pos..];
            if !rest.starts_with('<') {
                let len = rest.find('<').unwrap_or(rest.len());
                self.pos += len;
                return Ok(Some(Event::Text(unescape(&rest[..len]))));
            }
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if let Some(cdata) = rest.strip_prefix("<![CDATA[") {
                let len = cdata.find("]]>").ok_or_else(|| {
                    GraphError::Xml(format!("unterminated CDATA at byte {}", self.pos))
                })?;
                let text = cdata[..len].to_string();
                self.pos += "<![CDATA[".len() + len + "]]>".len();
                return Ok(Some(Event::Text(text)));
            } else if rest.starts_with("<!") {
                self.skip_past(">")?;
            } else if rest.starts_with("</") {
                self.skip_past(">")?;
                return Ok(Some(Event::End));
            } else {
                let end = self.tag_end()?;
                let inner = &src[self.pos + 1..end];
                self.pos = end + 1;
                let (inner, empty) = match inner.strip_suffix('/') {
                    Some(stripped) => (stripped, true),
                    None => (inner, false),
                };
                let name_len = inner
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(inner.len());
                let name = &inner[..name_len];
                let attrs = parse_attributes(&inner[name_len..])?;
                return Ok(Some(Event::Start { name, attrs, empty }));
            }
        }
    }
}

fn parse_attributes(mut s: &str) -> Result<Vec<(&str, String)>, GraphError> {
    let mut attrs = Vec::new();
    loop {
        s = s.trim_start();
        if s.is_empty() {
            return Ok(attrs);
        }
        let eq = s
            .find('=')
            .ok_or_else(|| GraphError::Xml(format!("attribute without value near '{s}'")))?;
        let name = s[..eq].trim();
        let value_part = s[eq + 1..].trim_start();
        let quote = value_part
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| GraphError::Xml(format!("unquoted attribute '{name}'")))?;
        let body = &value_part[1..];
        let close = body
            .find(quote)
            .ok_or_else(|| GraphError::Xml(format!("unterminated attribute '{name}'")))?;
        attrs.push((name, unescape(&body[..close])));
        s = &body[close + 1..];
    }
}

// =============================================================================
// Reader
// =============================================================================

const RDF_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#RDF";
const RDF_DESCRIPTION: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Description";
const RDF_ABOUT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#about";
const RDF_RESOURCE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#resource";
const RDF_NODE_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nodeID";
const RDF_PARSE_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#parseType";
const RDF_DATATYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#datatype";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug)]
enum Frame {
    Root,
    Node {
        subject: String,
    },
    Property {
        subject: String,
        predicate: String,
        datatype: Option<String>,
        text: String,
        object_seen: bool,
    },
    /// Property element whose object was given by attribute; content is ignored.
    Closed,
}

struct Reader {
    graph: Graph,
    namespaces: Vec<HashMap<String, String>>,
    blank: usize,
}

impl Reader {
    fn expand(&self, qname: &str) -> String {
        let (prefix, local) = match qname.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", qname),
        };
        if prefix == "xml" {
            return format!("{XML_NS}{local}");
        }
        self.namespaces
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .map(|namespace| format!("{namespace}{local}"))
            .unwrap_or_else(|| qname.to_string())
    }

    fn fresh_blank(&mut self) -> String {
        self.blank += 1;
        format!("_:b{}", self.blank)
    }

    /// Push namespace declarations and return the remaining attributes expanded.
    fn scope(&mut self, attrs: Vec<(&str, String)>) -> Vec<(String, String)> {
        let mut declared = HashMap::new();
        let mut rest = Vec::new();
        for (name, value) in attrs {
            if name == "xmlns" {
                declared.insert(String::new(), value);
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                declared.insert(prefix.to_string(), value);
            } else {
                rest.push((name, value));
            }
        }
        self.namespaces.push(declared);
        rest.into_iter()
            .map(|(name, value)| (self.expand(name), value))
            .collect()
    }

    fn node_element(
        &mut self,
        name: &str,
        attrs: &[(String, String)],
        parent: Option<(&str, &str)>,
    ) -> String {
        let subject = match attr(attrs, RDF_ABOUT) {
            Some(about) => about.to_string(),
            None => match attr(attrs, RDF_NODE_ID) {
                Some(id) => format!("_:{id}"),
                None => self.fresh_blank(),
            },
        };
        let class = self.expand(name);
        if class != RDF_DESCRIPTION {
            self.graph
                .insert(subject.as_str(), prop::RDF_TYPE, Term::uri(class));
        }
        for (key, value) in attrs {
            if key == RDF_ABOUT || key == RDF_NODE_ID || key.starts_with(XML_NS) {
                continue;
            }
            self.graph
                .insert(subject.as_str(), key.as_str(), Term::literal(value.as_str()));
        }
        if let Some((parent_subject, predicate)) = parent {
            self.graph
                .insert(parent_subject, predicate, node_term(&subject));
        }
        subject
    }
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn node_term(subject: &str) -> Term {
    match subject.strip_prefix("_:") {
        Some(id) => Term::bnode(id),
        None => Term::uri(subject),
    }
}

/// Parse an RDF/XML document into a [`Graph`].
///
/// Handles the striped syntax produced by the RM server: typed node elements,
/// `rdf:about`/`rdf:nodeID`, `rdf:resource` objects, literal content, nested
/// node elements, `rdf:parseType="Resource"` and `rdf:parseType="Literal"`
/// (kept verbatim as an `rdf:XMLLiteral`).
pub fn parse(text: &str) -> Result<Graph, GraphError> {
    let mut reader = Reader {
        graph: Graph::new(),
        namespaces: Vec::new(),
        blank: 0,
    };
    let mut tokens = Tokenizer::new(text);
    let mut stack: Vec<Frame> = Vec::new();

    while let Some(event) = tokens.next_event()? {
        match event {
            Event::Start { name, attrs, empty } => {
                let attrs = reader.scope(attrs);
                let expanded = reader.expand(name);
                let mut consumed = empty;
                let frame = match stack.last_mut() {
                    None if expanded == RDF_RDF => Frame::Root,
                    None | Some(Frame::Root) => Frame::Node {
                        subject: reader.node_element(name, &attrs, None),
                    },
                    Some(Frame::Property {
                        subject,
                        predicate,
                        object_seen,
                        ..
                    }) => {
                        *object_seen = true;
                        let (subject, predicate) = (subject.clone(), predicate.clone());
                        Frame::Node {
                            subject: reader.node_element(name, &attrs, Some((&subject, &predicate))),
                        }
                    }
                    Some(Frame::Node { subject }) => {
                        let subject = subject.clone();
                        if let Some(resource) = attr(&attrs, RDF_RESOURCE) {
                            reader
                                .graph
                                .insert(subject.as_str(), expanded, Term::uri(resource));
                            Frame::Closed
                        } else if let Some(id) = attr(&attrs, RDF_NODE_ID) {
                            reader
                                .graph
                                .insert(subject.as_str(), expanded, Term::bnode(id));
                            Frame::Closed
                        } else if attr(&attrs, RDF_PARSE_TYPE) == Some("Literal") {
                            let xml = if empty { "" } else { tokens.raw_content()? };
                            consumed = true;
                            reader
                                .graph
                                .insert(subject.as_str(), expanded, Term::xml_literal(xml.trim()));
                            Frame::Closed
                        } else if attr(&attrs, RDF_PARSE_TYPE) == Some("Resource") {
                            let blank = reader.fresh_blank();
                            reader
                                .graph
                                .insert(subject.as_str(), expanded, node_term(&blank));
                            Frame::Node { subject: blank }
                        } else {
                            Frame::Property {
                                subject,
                                predicate: expanded,
                                datatype: attr(&attrs, RDF_DATATYPE).map(str::to_string),
                                text: String::new(),
                                object_seen: false,
                            }
                        }
                    }
                    Some(Frame::Closed) => Frame::Closed,
                };
                if consumed {
                    close(&mut reader, frame);
                } else {
                    stack.push(frame);
                }
            }
            Event::Text(content) => {
                if let Some(Frame::Property { text, .. }) = stack.last_mut() {
                    text.push_str(&content);
                }
            }
            Event::End => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| GraphError::Xml("unbalanced closing tag".to_string()))?;
                close(&mut reader, frame);
            }
        }
    }

    if !stack.is_empty() {
        return Err(GraphError::Xml("document ended inside an element".to_string()));
    }
    Ok(reader.graph)
}

fn close(reader: &mut Reader, frame: Frame) {
    reader.namespaces.pop();
    if let Frame::Property {
        subject,
        predicate,
        datatype,
        text,
        object_seen: false,
    } = frame
    {
        let mut term = Term::literal(text);
        term.datatype = datatype;
        reader.graph.insert(subject, predicate, term);
    }
}
