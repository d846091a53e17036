//! Corridor around the river centerline and conservation-status bucketing
//! of the occurrence records inside it.
//!
//! Each end circle of a segment is drawn in an equirectangular frame centred
//! on its own vertex, so the radius holds in km at every latitude along the
//! river. The circles are then carried into one shared frame about the
//! centerline's mean position, which is affine in lon/lat, for the hulls,
//! the union and containment. Area is geodesic.

use crate::round::round2;
use geo::{
    BooleanOps, BoundingRect, ConvexHull, Coord, GeodesicArea, Intersects, MapCoords,
    MultiPoint, MultiPolygon, Point, Polygon,
};
use log::{debug, info, warn};
use rbw_catalog::occurrence::{BoundingBox, OccurrenceRecord};
use rbw_utils::error::ValidationError;
use rbw_utils::location::Location;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::{Arc, PoisonError, RwLock};

const KM_PER_DEG_LAT: f64 = 110.574;
const KM_PER_DEG_LON_AT_EQUATOR: f64 = 111.320;
const CIRCLE_VERTICES: usize = 32;

/// Names that make a record "major" regardless of group size.
pub const MAJOR_SPECIES_WATCHLIST: [&str; 6] =
    ["dolphin", "gharial", "tiger", "elephant", "crocodile", "turtle"];

/// Groups larger than this are major whatever the species.
pub const MAJOR_GROUP_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBucket {
    Red,
    Blue,
    Yellow,
    Green,
}

/// Canonical form of a conservation code: trimmed, upper case, with spaces
/// and hyphens as underscores.
pub fn normalize_status(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusClassification {
    pub bucket: RiskBucket,
    /// False when the code was missing or unknown and defaulted to GREEN
    pub recognized: bool,
}

/// IUCN bucket for a raw status code. Unknown or missing codes are GREEN.
pub fn classify_status(raw: Option<&str>) -> StatusClassification {
    let normalized = raw.map(normalize_status).unwrap_or_default();
    let bucket = match normalized.as_str() {
        "CR" | "CRITICALLY_ENDANGERED" | "EX" | "EXTINCT" | "EW" | "EXTINCT_IN_WILD"
        | "EXTINCT_IN_THE_WILD" => Some(RiskBucket::Red),
        "EN" | "ENDANGERED" => Some(RiskBucket::Blue),
        "VU" | "VULNERABLE" | "NT" | "NEAR_THREATENED" => Some(RiskBucket::Yellow),
        "LC" | "LEAST_CONCERN" | "DD" | "DATA_DEFICIENT" => Some(RiskBucket::Green),
        _ => None,
    };
    match bucket {
        Some(bucket) => StatusClassification {
            bucket,
            recognized: true,
        },
        None => StatusClassification {
            bucket: RiskBucket::Green,
            recognized: false,
        },
    }
}

/// Watch-list match on either name, or a large group.
pub fn is_major_species(record: &OccurrenceRecord) -> bool {
    let names = [record.common_name.as_deref(), record.scientific_name.as_deref()];
    let on_watchlist = names.iter().flatten().any(|name| {
        let name = name.to_lowercase();
        MAJOR_SPECIES_WATCHLIST.iter().any(|w| name.contains(w))
    });
    on_watchlist || record.individuals() > MAJOR_GROUP_SIZE
}

/// Equirectangular projection to km about a fixed origin.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LocalProjection {
    origin: Location,
    km_per_deg_lon: f64,
}

impl LocalProjection {
    fn at(origin: Location) -> LocalProjection {
        LocalProjection {
            origin,
            km_per_deg_lon: (KM_PER_DEG_LON_AT_EQUATOR * origin.lat.to_radians().cos()).max(1e-6),
        }
    }

    fn around(vertices: &[Location]) -> LocalProjection {
        let n = vertices.len() as f64;
        let lat = vertices.iter().map(|v| v.lat).sum::<f64>() / n;
        let lon = vertices.iter().map(|v| v.lon).sum::<f64>() / n;
        LocalProjection::at(Location { lat, lon })
    }

    fn project(&self, location: &Location) -> Coord<f64> {
        self.forward(Coord {
            x: location.lon,
            y: location.lat,
        })
    }

    /// Lon/lat to km.
    fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.lon) * self.km_per_deg_lon,
            y: (c.y - self.origin.lat) * KM_PER_DEG_LAT,
        }
    }

    fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.origin.lon + c.x / self.km_per_deg_lon,
            y: self.origin.lat + c.y / KM_PER_DEG_LAT,
        }
    }
}

/// A circle of `radius` km about `center`, drawn in the centre's own frame and
/// expressed in `frame`. Vertices are phased on the heading to `toward`.
fn circle_points(
    frame: LocalProjection,
    center: Location,
    toward: Location,
    radius: f64,
) -> impl Iterator<Item = Point<f64>> {
    let local = LocalProjection::at(center);
    let heading = local.project(&toward);
    let phase = heading.y.atan2(heading.x);
    (0..CIRCLE_VERTICES).map(move |k| {
        let angle = phase + TAU * k as f64 / CIRCLE_VERTICES as f64;
        let lonlat = local.inverse(Coord {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        });
        Point::from(frame.forward(lonlat))
    })
}

/// Convex hull of the two end circles of segment `a`-`b`.
fn capsule(frame: LocalProjection, a: Location, b: Location, radius: f64) -> Polygon<f64> {
    let points: Vec<Point<f64>> = circle_points(frame, a, b, radius)
        .chain(circle_points(frame, b, a, radius))
        .collect();
    MultiPoint::from(points).convex_hull()
}

/// A buffer polygon around the centerline.
#[derive(Debug, Clone)]
pub struct BufferZone {
    pub radius_km: f64,
    pub area_km2: f64,
    projection: LocalProjection,
    planar: MultiPolygon<f64>,
}

impl BufferZone {
    pub fn build(centerline: &[Location], radius_km: f64) -> Result<BufferZone, ValidationError> {
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(ValidationError::Radius(radius_km));
        }
        if centerline.is_empty() {
            return Err(ValidationError::EmptyCenterline);
        }

        let projection = LocalProjection::around(centerline);
        let mut pieces = centerline
            .windows(2)
            .map(|w| capsule(projection, w[0], w[1], radius_km));
        let first = pieces
            .next()
            .unwrap_or_else(|| capsule(projection, centerline[0], centerline[0], radius_km));
        let planar = pieces.fold(MultiPolygon::new(vec![first]), |acc, piece| {
            acc.union(&MultiPolygon::new(vec![piece]))
        });
        let area_km2 = planar
            .map_coords(|c| projection.inverse(c))
            .geodesic_area_unsigned()
            / 1e6;
        debug!(
            "Built {} km buffer from {} vertices: {} polygon(s), {:.0} km2",
            radius_km,
            centerline.len(),
            planar.0.len(),
            area_km2
        );

        Ok(BufferZone {
            radius_km,
            area_km2,
            projection,
            planar,
        })
    }

    /// Point-in-polygon test; points on the boundary are inside.
    pub fn contains(&self, location: &Location) -> bool {
        self.covers(self.projection.project(location))
    }

    fn covers(&self, c: Coord<f64>) -> bool {
        self.planar.intersects(&Point::from(c))
    }

    /// The buffer in lon/lat.
    pub fn polygon(&self) -> MultiPolygon<f64> {
        self.planar.map_coords(|c| self.projection.inverse(c))
    }

    /// Lon/lat envelope, for bounding-box occurrence searches.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.polygon().bounding_rect().map(|rect| BoundingBox {
            min_lat: rect.min().y,
            min_lon: rect.min().x,
            max_lat: rect.max().y,
            max_lon: rect.max().x,
        })
    }

    pub fn to_geojson(&self) -> Value {
        let polygons: Vec<Value> = self.polygon().0.iter().map(polygon_rings).collect();
        json!({
            "type": "Feature",
            "properties": { "radiusKm": self.radius_km, "areaKm2": round2(self.area_km2) },
            "geometry": { "type": "MultiPolygon", "coordinates": polygons },
        })
    }
}

fn polygon_rings(polygon: &Polygon<f64>) -> Value {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>())
        .collect::<Vec<_>>()
        .into()
}

/// Buffers keyed by radius. Building is pure, so a racing duplicate build
/// yields an identical zone and whichever lands first is kept.
#[derive(Debug)]
pub struct BufferCache {
    centerline: Vec<Location>,
    zones: RwLock<HashMap<u64, Arc<BufferZone>>>,
}

impl BufferCache {
    pub fn new(centerline: Vec<Location>) -> Self {
        BufferCache {
            centerline,
            zones: RwLock::new(HashMap::new()),
        }
    }

    pub fn zone(&self, radius_km: f64) -> Result<Arc<BufferZone>, ValidationError> {
        let key = radius_km.to_bits();
        if let Some(zone) = self
            .zones
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(zone));
        }

        let zone = Arc::new(BufferZone::build(&self.centerline, radius_km)?);
        let mut zones = self.zones.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(zones.entry(key).or_insert(zone)))
    }

    pub fn cached_radii(&self) -> usize {
        self.zones
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub red: usize,
    pub blue: usize,
    pub yellow: usize,
    pub green: usize,
}

impl Breakdown {
    fn add(&mut self, bucket: RiskBucket) {
        match bucket {
            RiskBucket::Red => self.red += 1,
            RiskBucket::Blue => self.blue += 1,
            RiskBucket::Yellow => self.yellow += 1,
            RiskBucket::Green => self.green += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: OccurrenceRecord,
    pub location: Location,
    #[serde(flatten)]
    pub status: StatusClassification,
}

impl ClassifiedRecord {
    fn to_feature(&self) -> Value {
        let r = &self.record;
        json!({
            "type": "Feature",
            "properties": {
                "id": r.gbif_id,
                "scientificName": r.scientific_name,
                "commonName": r.display_name(),
                "iucnStatus": r.iucn_status.as_deref().unwrap_or("UNKNOWN"),
                "riskLevel": self.status.bucket,
                "color": self.status.bucket,
                "individualCount": r.individuals(),
                "basisOfRecord": r.basis_of_record,
            },
            "geometry": {
                "type": "Point",
                "coordinates": [self.location.lon, self.location.lat],
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferSummary {
    pub radius_km: f64,
    pub area_km2: f64,
    pub geojson: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferAnalysis {
    pub buffer: BufferSummary,
    pub total: usize,
    pub breakdown: Breakdown,
    /// Records counted GREEN only because their status was missing or unknown
    pub unrecognized_status: usize,
    /// Records dropped for missing coordinates or lying outside the buffer
    pub excluded: usize,
    pub species: Vec<ClassifiedRecord>,
    pub geojson: Value,
}

/// Bucket every record inside `zone`, optionally keeping only major species.
pub fn analyze_buffer(
    zone: &BufferZone,
    records: &[OccurrenceRecord],
    major_species_only: bool,
) -> BufferAnalysis {
    let mut breakdown = Breakdown::default();
    let mut unrecognized_status = 0;
    let mut excluded = 0;
    let mut species = Vec::new();

    for record in records {
        let location = match record.location() {
            Some(location) if zone.contains(&location) => location,
            _ => {
                excluded += 1;
                continue;
            }
        };
        if major_species_only && !is_major_species(record) {
            continue;
        }
        let status = classify_status(record.iucn_status.as_deref());
        if !status.recognized {
            unrecognized_status += 1;
        }
        breakdown.add(status.bucket);
        species.push(ClassifiedRecord {
            record: record.clone(),
            location,
            status,
        });
    }

    if unrecognized_status > 0 {
        warn!(
            "{} record(s) had a missing or unknown conservation status and were counted as GREEN",
            unrecognized_status
        );
    }
    info!(
        "{} km buffer: {} of {} records kept ({:?})",
        zone.radius_km,
        species.len(),
        records.len(),
        breakdown
    );

    let features: Vec<Value> = species.iter().map(ClassifiedRecord::to_feature).collect();
    BufferAnalysis {
        buffer: BufferSummary {
            radius_km: zone.radius_km,
            area_km2: round2(zone.area_km2),
            geojson: zone.to_geojson(),
        },
        total: species.len(),
        breakdown,
        unrecognized_status,
        excluded,
        species,
        geojson: json!({ "type": "FeatureCollection", "features": features }),
    }
}
