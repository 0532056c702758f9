//! "Needs attention" ranking for supervisors and HR.

pub mod ranker;

pub use ranker::{AttentionItem, AttentionKind, AttentionRanker, AttentionReport, AttentionSubject};
