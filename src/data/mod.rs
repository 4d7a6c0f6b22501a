/// Data layer: core types, category mappings, loading, filtering, and
/// aggregation.
///
/// Architecture:
/// ```text
///  enem_<year>.csv / .zip        municipios.geojson
///        │                             │
///        ▼                             ▼
///   ┌──────────┐                  ┌──────────┐
///   │  loader   │  DatasetCache   │   geo     │  BoundaryDocument
///   └──────────┘                  └──────────┘
///        │
///        ▼
///   ┌──────────┐    categories    ┌──────────┐
///   │ ExamTable │ ───────────────▶│  filter   │  label → raw-code subset
///   └──────────┘                  └──────────┘
///                                      │
///                                      ▼
///                                 ┌───────────┐
///                                 │ aggregate  │  scoreboard / means /
///                                 └───────────┘  grouped means
/// ```

pub mod aggregate;
pub mod categories;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod model;
