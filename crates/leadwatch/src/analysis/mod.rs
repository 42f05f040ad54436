//! Lead classification.
//!
//! Matches post text against configurable keyword groups.

mod keywords;

pub use keywords::{default_groups, KeywordGroup, KeywordMatcher, LeadMatcher};
