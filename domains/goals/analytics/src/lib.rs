//! Post-fetch stages of the customer-goals view: merge the three tier
//! fragments, derive gap and achievement fields, classify, rank and total.
//!
//! Every stage works on owned copies; nothing here holds on to cached
//! fragments.

pub mod aggregations;
pub mod derived;
pub mod merger;
pub mod ranking;

pub use aggregations::aggregate;
pub use derived::{DerivedFieldCalculator, achievement_percent};
pub use merger::merge;
pub use ranking::{RankingClassifier, classify, rank};
