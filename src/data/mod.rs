/// Data layer: the dataset a subset describes, and its collaborators.
///
/// Architecture:
/// ```text
///  .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse description → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────────────────────────┐
///   │ Dataset  shape, tree, coordinates, hub   │
///   └─────────────────────────────────────────┘
///        ▲                        ▲
///        │ index map / transform  │ region.contains
///   ┌──────────┐            ┌──────────┐
///   │  subset   │ ─────────▶ │  region   │
///   └──────────┘            └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  mask → .parquet
///   └──────────┘
/// ```

pub mod coordinates;
pub mod dataset;
pub mod export;
pub mod loader;
pub mod region;
