//! SUMO `.net.xml` parser
//!
//! Reads `<edge>` elements with their lane shapes into [`Edge`]
//! polylines and recovers the geographic offset from the
//! `<location>` element. Internal (junction) edges are skipped; only
//! drivable edges take part in snapping.

use std::path::Path;

use geo::{Coord, LineString};
use log::info;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::Error;
use crate::model::{Edge, NetOffsetProjection, RoadNetwork};

/// A parsed network plus the projection recovered from its
/// `<location>` element.
#[derive(Debug, Clone)]
pub struct LoadedNetwork {
    pub network: RoadNetwork,
    pub projection: NetOffsetProjection,
}

/// Reads a SUMO network file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::Load`] / [`Error::Xml`] on malformed content.
pub fn load_network(path: &Path) -> Result<LoadedNetwork, Error> {
    info!("Loading SUMO network from {}", path.display());
    let xml = std::fs::read_to_string(path)?;
    parse_network(&xml)
}

/// Parses a SUMO network from an XML string.
pub fn parse_network(xml: &str) -> Result<LoadedNetwork, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();
    let mut projection = NetOffsetProjection::default();
    let mut edges: Vec<Edge> = Vec::new();
    let mut skipped_internal = 0usize;
    let mut current: Option<PendingEdge> = None;

    loop {
        match reader.read_event_into(&mut buffer)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"location" => projection = parse_location(e)?,
                b"edge" => current = Some(PendingEdge::from_attrs(e)?),
                b"lane" => {
                    if let Some(edge) = current.as_mut() {
                        edge.apply_lane(e)?;
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"location" => projection = parse_location(e)?,
                b"edge" => {
                    PendingEdge::from_attrs(e)?.finish(&mut edges, &mut skipped_internal)?;
                }
                b"lane" => {
                    if let Some(edge) = current.as_mut() {
                        edge.apply_lane(e)?;
                    }
                }
                _ => {}
            },
            Event::End(ref e) => {
                if e.name().as_ref() == b"edge" {
                    if let Some(edge) = current.take() {
                        edge.finish(&mut edges, &mut skipped_internal)?;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buffer.clear();
    }

    let network = RoadNetwork::new(edges)?;
    info!(
        "Loaded {} drivable edges, skipped {} internal edges",
        network.edge_count(),
        skipped_internal
    );

    Ok(LoadedNetwork {
        network,
        projection,
    })
}

/// Edge under construction while its lanes are being read
struct PendingEdge {
    id: String,
    internal: bool,
    shape: Option<LineString<f64>>,
    /// Shape came from the edge element itself, lanes never override it
    from_edge_attr: bool,
}

impl PendingEdge {
    fn from_attrs(e: &BytesStart) -> Result<Self, Error> {
        let id = attr_value(e, b"id")?.ok_or_else(|| Error::Load("edge without id".into()))?;
        let internal = attr_value(e, b"function")?.as_deref() == Some("internal");
        let shape = attr_value(e, b"shape")?
            .map(|raw| parse_shape(&raw))
            .transpose()?;
        Ok(Self {
            id,
            internal,
            from_edge_attr: shape.is_some(),
            shape,
        })
    }

    /// Takes the lane-0 geometry as the edge shape. When no lane
    /// carries `index="0"` the first lane wins.
    fn apply_lane(&mut self, e: &BytesStart) -> Result<(), Error> {
        if self.internal || self.from_edge_attr {
            return Ok(());
        }
        let Some(raw) = attr_value(e, b"shape")? else {
            return Ok(());
        };
        let is_lane0 = attr_value(e, b"index")?.as_deref() == Some("0");
        if is_lane0 || self.shape.is_none() {
            self.shape = Some(parse_shape(&raw)?);
        }
        Ok(())
    }

    fn finish(self, edges: &mut Vec<Edge>, skipped_internal: &mut usize) -> Result<(), Error> {
        if self.internal {
            *skipped_internal += 1;
            return Ok(());
        }
        let shape = self
            .shape
            .ok_or_else(|| Error::Load(format!("edge {} has no shape", self.id)))?;
        edges.push(Edge::new(self.id, shape));
        Ok(())
    }
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| Error::Load(format!("bad attribute: {err}")))?;
        if attr.key.as_ref() == name {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

fn parse_location(e: &BytesStart) -> Result<NetOffsetProjection, Error> {
    let Some(raw) = attr_value(e, b"netOffset")? else {
        return Ok(NetOffsetProjection::default());
    };
    let mut parts = raw.split(',');
    match (parts.next(), parts.next()) {
        (Some(dx), Some(dy)) => Ok(NetOffsetProjection::new(parse_f64(dx)?, parse_f64(dy)?)),
        _ => Err(Error::Load(format!("malformed netOffset: {raw}"))),
    }
}

/// Parses a SUMO shape attribute, `"x0,y0 x1,y1 ..."`. A third
/// component per point (elevation) is accepted and ignored.
fn parse_shape(raw: &str) -> Result<LineString<f64>, Error> {
    let mut coords = Vec::new();
    for token in raw.split_whitespace() {
        let mut parts = token.split(',');
        let (Some(x), Some(y)) = (parts.next(), parts.next()) else {
            return Err(Error::Load(format!("malformed shape point: {token}")));
        };
        coords.push(Coord {
            x: parse_f64(x)?,
            y: parse_f64(y)?,
        });
    }
    Ok(LineString::new(coords))
}

fn parse_f64(raw: &str) -> Result<f64, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Load(format!("invalid coordinate: {raw}")))
}
