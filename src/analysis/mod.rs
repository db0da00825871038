/// Derived views over the filtered table. Every function here is stateless:
/// it takes the immutable table plus the filtered row indices and computes
/// the view from scratch, so a filter change only needs a re-render pass.

pub mod corr;
pub mod crosstab;
pub mod pivot;
pub mod stats;
