//! Scoring analyzers
//!
//! One module per sub-score dimension, plus the shared lexical feature
//! extractor they build on and the quality gates applied after aggregation.
//! Analyzers are pure functions of the submission,
//! the configuration, and any collaborator results handed to them; none of
//! them performs I/O except `structure` and `content`, which consult the
//! similarity provider through the timeout wrapper.

pub mod communication;
pub mod confidence;
pub mod content;
pub mod delivery;
pub mod lexical;
pub mod quality;
pub mod structure;
pub mod voice;

pub use lexical::LexicalFeatures;
