use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataError;

// ---------------------------------------------------------------------------
// Municipality identifier normalization
// ---------------------------------------------------------------------------

/// Normalize a raw municipality code into the zero-padded 7-digit string
/// used both as grouping key and as join key against boundary features.
/// Width or type mismatches between the two sides make every join silently
/// miss, so all code paths go through this one function.
pub fn municipality_key(code: i64) -> String {
    format!("{code:07}")
}

// ---------------------------------------------------------------------------
// Boundary document model
// ---------------------------------------------------------------------------

/// One municipality's drawable outline.
#[derive(Debug, Clone)]
pub struct MunicipalShape {
    /// Normalized 7-digit identifier.
    pub code: String,
    pub name: Option<String>,
    /// Outer rings as (lon, lat) points; one per polygon part. Holes are
    /// not drawn and are dropped at parse time.
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// The parsed boundary file: a static polygon collection shared by all
/// exam years.
#[derive(Debug, Clone)]
pub struct BoundaryDocument {
    pub shapes: Vec<MunicipalShape>,
}

impl BoundaryDocument {
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shape(&self, code: &str) -> Option<&MunicipalShape> {
        self.shapes.iter().find(|s| s.code == code)
    }
}

// ---------------------------------------------------------------------------
// GeoJSON parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: serde_json::Map<String, JsonValue>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Property keys that carry the municipality identifier, by export vintage.
const CODE_KEYS: [&str; 3] = ["codarea", "id", "CD_MUN"];
const NAME_KEYS: [&str; 3] = ["name", "NM_MUN", "nome"];

/// Read and parse the boundary document from disk.
pub fn load_boundaries(path: &Path) -> Result<BoundaryDocument, DataError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DataError::NotFound {
                kind: "boundary",
                path: path.to_path_buf(),
            }
        } else {
            DataError::MalformedBoundaries {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;
    parse_boundaries(&text, path)
}

/// Parse GeoJSON text into a [`BoundaryDocument`].
///
/// Features without a recognizable identifier or with unsupported geometry
/// are skipped; a document without the top-level `features` key is
/// malformed.
pub fn parse_boundaries(text: &str, path: &Path) -> Result<BoundaryDocument, DataError> {
    let malformed = |message: String| DataError::MalformedBoundaries {
        path: path.to_path_buf(),
        message,
    };

    let root: JsonValue =
        serde_json::from_str(text).map_err(|e| malformed(format!("invalid JSON: {e}")))?;
    if root.get("features").is_none() {
        return Err(malformed("missing top-level \"features\" key".to_string()));
    }
    let collection: RawCollection =
        serde_json::from_value(root).map_err(|e| malformed(format!("invalid GeoJSON: {e}")))?;

    let mut shapes = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(code) = feature_code(&feature.properties) else {
            log::warn!("skipping boundary feature without municipality code");
            continue;
        };
        let rings = match feature.geometry {
            Some(RawGeometry::Polygon { coordinates }) => outer_ring(coordinates),
            Some(RawGeometry::MultiPolygon { coordinates }) => coordinates
                .into_iter()
                .flat_map(outer_ring)
                .collect(),
            Some(RawGeometry::Unsupported) | None => {
                log::warn!("skipping boundary feature {code} with unsupported geometry");
                continue;
            }
        };
        if rings.is_empty() {
            continue;
        }
        shapes.push(MunicipalShape {
            code,
            name: feature_name(&feature.properties),
            rings,
        });
    }

    Ok(BoundaryDocument { shapes })
}

/// Keep only the outer ring of each polygon, dropping coordinates beyond
/// (lon, lat).
fn outer_ring(polygon: Vec<Vec<Vec<f64>>>) -> Vec<Vec<[f64; 2]>> {
    polygon
        .into_iter()
        .take(1)
        .map(|ring| {
            ring.iter()
                .filter_map(|point| match point.as_slice() {
                    [lon, lat, ..] => Some([*lon, *lat]),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

fn feature_code(properties: &serde_json::Map<String, JsonValue>) -> Option<String> {
    for key in CODE_KEYS {
        let Some(value) = properties.get(key) else {
            continue;
        };
        let code = match value {
            JsonValue::String(s) => s.trim().parse::<i64>().ok(),
            JsonValue::Number(n) => n.as_i64(),
            _ => None,
        };
        if let Some(code) = code {
            return Some(municipality_key(code));
        }
    }
    None
}

fn feature_name(properties: &serde_json::Map<String, JsonValue>) -> Option<String> {
    NAME_KEYS
        .iter()
        .find_map(|key| properties.get(*key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "codarea": "1100015", "name": "Alta Floresta D'Oeste" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[-62.0, -12.0], [-61.9, -12.0], [-61.9, -11.9], [-62.0, -12.0]],
                        [[-61.98, -11.99], [-61.95, -11.99], [-61.95, -11.96], [-61.98, -11.99]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "id": 1100023 },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-63.0, -9.9], [-62.9, -9.9], [-62.9, -9.8], [-63.0, -9.9]]],
                        [[[-63.1, -9.7], [-63.0, -9.7], [-63.0, -9.6], [-63.1, -9.7]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "descricao": "sem código" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn municipality_key_zero_pads_to_seven_digits() {
        assert_eq!(municipality_key(1100015), "1100015");
        assert_eq!(municipality_key(15), "0000015");
    }

    #[test]
    fn parses_polygon_and_multipolygon_features() {
        let doc = parse_boundaries(SAMPLE, Path::new("municipios.geojson")).unwrap();
        assert_eq!(doc.len(), 2);

        let first = doc.shape("1100015").unwrap();
        assert_eq!(first.name.as_deref(), Some("Alta Floresta D'Oeste"));
        // Only the outer ring survives; the hole is dropped.
        assert_eq!(first.rings.len(), 1);
        assert_eq!(first.rings[0].len(), 4);

        // Numeric identifier normalizes exactly like the string form.
        let second = doc.shape("1100023").unwrap();
        assert_eq!(second.rings.len(), 2);
    }

    #[test]
    fn features_without_code_are_skipped() {
        let doc = parse_boundaries(SAMPLE, Path::new("municipios.geojson")).unwrap();
        assert!(doc.shapes.iter().all(|s| !s.code.is_empty()));
    }

    #[test]
    fn missing_features_key_is_a_parse_error() {
        let err = parse_boundaries(r#"{"type": "x"}"#, Path::new("m.json")).unwrap_err();
        match err {
            DataError::MalformedBoundaries { message, .. } => {
                assert!(message.contains("features"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_boundaries("{ nope", Path::new("m.json")).unwrap_err();
        assert!(matches!(err, DataError::MalformedBoundaries { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_boundaries(Path::new("/nonexistent/municipios.geojson")).unwrap_err();
        assert!(matches!(err, DataError::NotFound { kind: "boundary", .. }));
    }
}
