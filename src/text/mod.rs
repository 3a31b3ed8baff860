//! Native text processing: normalization, field extraction, extractability
//! triage and output naming.

mod classify;
pub mod fields;
mod naming;
mod normalize;
pub mod rules;

pub use classify::ExtractabilityClassifier;
pub use fields::{merge_missing, FieldExtractor, FieldRule};
pub use naming::structured_name;
pub use normalize::{split_title_body, NormalizeOptions, TextNormalizer};
pub use rules::{KeywordSet, RuleSet, RuleSpec};
