//! Heuristic explanations: fixed narratives per prediction and data-driven guard chains that
//! build the at-risk and underperformer watchlists for each view.

mod narrative;
mod rules;
mod watchlist;

pub use narrative::{
    attrition_narrative, explain, performance_narrative, retention_narrative, AttritionVerdict,
    Explanations, Narrative, PerformanceVerdict, RetentionVerdict,
};
pub use rules::{
    Condition, Finding, GuardChain, GuardRule, Recommendation, RuleBook, RuleBookError,
    RuleSubject, ViewContext, WatchlistRules,
};
pub use watchlist::{bulk_watchlists, history_watchlists, WatchlistEntry, Watchlists};
