//! OSM element model and XML rendering.
//!
//! Encoders push [`Node`]s, [`Way`]s and [`Relation`]s into an [`OsmSink`]
//! in document order. [`OsmXmlWriter`] streams them as OSM 0.6 XML; a
//! `Vec<OsmElement>` collects them in memory instead.

use std::fmt;
use std::io::{self, Write};

use super::ids::OsmId;
use crate::geo::LatLon;

const GENERATOR: &str = concat!("nuscenes-osm ", env!("CARGO_PKG_VERSION"));

/// A `k`/`v` tag pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A positioned OSM node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: OsmId,
    pub position: LatLon,
    pub tags: Vec<Tag>,
}

/// An ordered path of node references.
#[derive(Clone, Debug, PartialEq)]
pub struct Way {
    pub id: OsmId,
    pub refs: Vec<OsmId>,
    pub tags: Vec<Tag>,
}

impl Way {
    /// True when the path ends on the node it starts from.
    pub fn is_closed(&self) -> bool {
        self.refs.len() > 1 && self.refs.first() == self.refs.last()
    }
}

/// Role of a way inside a multipolygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Outer,
    Inner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Outer => f.write_str("outer"),
            Role::Inner => f.write_str("inner"),
        }
    }
}

/// A way membership inside a relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Member {
    pub way: OsmId,
    pub role: Role,
}

/// An aggregate of ways, used here for multipolygons.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    pub members: Vec<Member>,
    pub tags: Vec<Tag>,
}

/// Any OSM element, as collected by the in-memory sink.
#[derive(Clone, Debug, PartialEq)]
pub enum OsmElement {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

/// Append-only destination for OSM elements.
pub trait OsmSink {
    fn node(&mut self, node: &Node) -> io::Result<()>;
    fn way(&mut self, way: &Way) -> io::Result<()>;
    fn relation(&mut self, relation: &Relation) -> io::Result<()>;
}

impl OsmSink for Vec<OsmElement> {
    fn node(&mut self, node: &Node) -> io::Result<()> {
        self.push(OsmElement::Node(node.clone()));
        Ok(())
    }

    fn way(&mut self, way: &Way) -> io::Result<()> {
        self.push(OsmElement::Way(way.clone()));
        Ok(())
    }

    fn relation(&mut self, relation: &Relation) -> io::Result<()> {
        self.push(OsmElement::Relation(relation.clone()));
        Ok(())
    }
}

/// Number of elements written to an OSM document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OsmCounts {
    pub nodes: usize,
    pub ways: usize,
    pub relations: usize,
}

/// Streams elements as an OSM XML document.
///
/// [`OsmXmlWriter::begin`] writes the header and [`OsmXmlWriter::finish`]
/// the footer; a writer dropped in between leaves an unterminated document.
pub struct OsmXmlWriter<W: Write> {
    out: W,
    counts: OsmCounts,
}

impl<W: Write> OsmXmlWriter<W> {
    /// Writes the XML declaration and opens the `<osm>` root.
    pub fn begin(mut out: W) -> io::Result<Self> {
        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(out, "<osm version=\"0.6\" generator=\"{GENERATOR}\">")?;
        Ok(Self {
            out,
            counts: OsmCounts::default(),
        })
    }

    /// Closes the root element and returns the output with the counts.
    pub fn finish(mut self) -> io::Result<(W, OsmCounts)> {
        writeln!(self.out, "</osm>")?;
        self.out.flush()?;
        Ok((self.out, self.counts))
    }

    fn tags(&mut self, tags: &[Tag]) -> io::Result<()> {
        for tag in tags {
            writeln!(
                self.out,
                "    <tag k=\"{}\" v=\"{}\"/>",
                xml_escape(&tag.key),
                xml_escape(&tag.value)
            )?;
        }
        Ok(())
    }
}

impl<W: Write> OsmSink for OsmXmlWriter<W> {
    fn node(&mut self, node: &Node) -> io::Result<()> {
        self.counts.nodes += 1;
        let open = format!(
            "  <node id=\"{}\" lat=\"{:.7}\" lon=\"{:.7}\" visible=\"true\" version=\"1\"",
            node.id, node.position.lat, node.position.lon
        );
        if node.tags.is_empty() {
            return writeln!(self.out, "{open}/>");
        }
        writeln!(self.out, "{open}>")?;
        self.tags(&node.tags)?;
        writeln!(self.out, "  </node>")
    }

    fn way(&mut self, way: &Way) -> io::Result<()> {
        self.counts.ways += 1;
        writeln!(
            self.out,
            "  <way id=\"{}\" visible=\"true\" version=\"1\">",
            way.id
        )?;
        for node_ref in &way.refs {
            writeln!(self.out, "    <nd ref=\"{node_ref}\"/>")?;
        }
        self.tags(&way.tags)?;
        writeln!(self.out, "  </way>")
    }

    fn relation(&mut self, relation: &Relation) -> io::Result<()> {
        self.counts.relations += 1;
        writeln!(
            self.out,
            "  <relation id=\"{}\" visible=\"true\" version=\"1\">",
            relation.id
        )?;
        for member in &relation.members {
            writeln!(
                self.out,
                "    <member type=\"way\" ref=\"{}\" role=\"{}\"/>",
                member.way, member.role
            )?;
        }
        self.tags(&relation.tags)?;
        writeln!(self.out, "  </relation>")
    }
}

pub(crate) fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
