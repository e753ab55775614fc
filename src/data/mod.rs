/// Data layer: core types, loading, and gene search.
///
/// Architecture:
/// ```text
///  <gene>.csv  (one file per gene)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  six count columns → RawGene (+ malformed cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    model      │  SampleStat / GeneRecord / Category
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  gene-name query → matched points
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
