//! Filter resolution: broadcast filters to registry queries.
//!
//! Two sentinels lift a constraint entirely:
//! - area `"All"` matches every area
//! - category `"Any"` matches every category
//!
//! Any other value is an exact-match predicate. Unknown values are not an
//! error; they simply match nothing.

use crate::registry::RecipientQuery;

/// Area sentinel meaning "no area restriction".
pub const ALL_AREAS: &str = "All";

/// Category sentinel meaning "no category restriction".
pub const ANY_CATEGORY: &str = "Any";

/// Whether an area filter is the all-areas wildcard.
pub fn is_all_areas(area: &str) -> bool {
    area == ALL_AREAS
}

/// Resolve a broadcast's area and category filters into a registry query.
pub fn resolve(area: &str, category: &str) -> RecipientQuery {
    RecipientQuery {
        area: (!is_all_areas(area)).then(|| area.to_string()),
        category: (category != ANY_CATEGORY).then(|| category.to_string()),
    }
}

/// Resolve optional listing filters, where a missing or blank value is
/// treated the same as the wildcard.
pub fn resolve_optional(area: Option<&str>, category: Option<&str>) -> RecipientQuery {
    let area = area.map(str::trim).filter(|a| !a.is_empty()).unwrap_or(ALL_AREAS);
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(ANY_CATEGORY);
    resolve(area, category)
}
