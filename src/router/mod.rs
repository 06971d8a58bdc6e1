// Router module
// Public interface for keyword-based intent routing

mod decision;
mod table;

pub use decision::{extract_domain, ActionTag, RouteDecision, Router};
pub use table::{default_keywords, DEFAULT_KEYWORDS};
