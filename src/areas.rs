//! Named search areas loaded from KML, with point-in-polygon checks.

use crate::geo::Coordinates;
use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tracing::info;

/// A named polygon. Vertices are in KML order (longitude, latitude).
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub name: String,
    pub outer: Vec<Coordinates>,
    pub holes: Vec<Vec<Coordinates>>,
}

impl Area {
    /// Inside the outer ring and outside every hole
    pub fn contains(&self, point: &Coordinates) -> bool {
        ring_contains(&self.outer, point)
            && !self.holes.iter().any(|hole| ring_contains(hole, point))
    }
}

/// Even-odd ray casting test
fn ring_contains(ring: &[Coordinates], point: &Coordinates) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].longitude, ring[i].latitude);
        let (xj, yj) = (ring[j].longitude, ring[j].latitude);

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[derive(Default)]
struct PolygonRings {
    outer: Vec<Coordinates>,
    holes: Vec<Vec<Coordinates>>,
}

/// Read every placemark polygon from a KML file
pub async fn load_areas(path: impl AsRef<Path>) -> Result<Vec<Area>> {
    let path = path.as_ref();
    let kml = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read area file {}", path.display()))?;

    let areas = parse_kml(&kml).with_context(|| format!("Invalid area file {}", path.display()))?;
    if areas.is_empty() {
        bail!("No polygons found in {}", path.display());
    }

    info!("Loaded {} areas from {}", areas.len(), path.display());
    Ok(areas)
}

/// Parse each `<Placemark>` polygon (outer boundary plus holes).
/// Placemarks with several polygons yield one area per polygon.
pub fn parse_kml(kml: &str) -> Result<Vec<Area>> {
    let mut reader = Reader::from_str(kml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut areas = Vec::new();
    let mut in_placemark = false;
    let mut boundary: Option<&'static str> = None;
    let mut current_tag = String::new();
    let mut name = String::new();
    let mut polygon: Option<PolygonRings> = None;
    let mut polygons: Vec<PolygonRings> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match tag.as_str() {
                    "Placemark" => {
                        in_placemark = true;
                        name.clear();
                        polygons.clear();
                    }
                    "Polygon" if in_placemark => polygon = Some(PolygonRings::default()),
                    "outerBoundaryIs" => boundary = Some("outer"),
                    "innerBoundaryIs" => boundary = Some("inner"),
                    _ => {}
                }
                current_tag = tag;
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match tag.as_str() {
                    "Placemark" if in_placemark => {
                        let label = if name.is_empty() {
                            format!("area {}", areas.len() + 1)
                        } else {
                            name.clone()
                        };
                        for rings in polygons.drain(..) {
                            areas.push(Area {
                                name: label.clone(),
                                outer: rings.outer,
                                holes: rings.holes,
                            });
                        }
                        in_placemark = false;
                    }
                    "Polygon" => {
                        if let Some(rings) = polygon.take().filter(|r| !r.outer.is_empty()) {
                            polygons.push(rings);
                        }
                    }
                    "outerBoundaryIs" | "innerBoundaryIs" => boundary = None,
                    _ => {}
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if in_placemark && current_tag == "name" {
                    name = text.trim().to_string();
                } else if current_tag == "coordinates" {
                    if let Some(rings) = polygon.as_mut() {
                        match boundary {
                            Some("outer") => rings.outer = parse_coordinates(&text)?,
                            Some("inner") => rings.holes.push(parse_coordinates(&text)?),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("KML parse error: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(areas)
}

/// Parse a KML coordinate list: whitespace separated `lon,lat[,alt]` tuples
fn parse_coordinates(text: &str) -> Result<Vec<Coordinates>> {
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            let lon = parts.next().and_then(|v| v.parse::<f64>().ok());
            let lat = parts.next().and_then(|v| v.parse::<f64>().ok());
            match (lon, lat) {
                (Some(lon), Some(lat)) => Ok(Coordinates::new(lon, lat)),
                _ => Err(anyhow!("Malformed coordinate tuple {:?}", tuple)),
            }
        })
        .collect()
}
