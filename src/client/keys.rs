//! Cache keys for every read.
//!
//! Lists and single items of a resource share their first segment so that one
//! prefix invalidates both.

use super::cache::QueryKey;
use super::filters::{BestPracticeFilters, CommandFilters, ResearchFilters};

pub fn health() -> QueryKey {
    QueryKey::new(["health"])
}

pub fn stats() -> QueryKey {
    QueryKey::new(["stats"])
}

/// Prefix covering results and status.
pub fn research() -> QueryKey {
    QueryKey::new(["research"])
}

pub fn research_results(filters: &ResearchFilters) -> QueryKey {
    research().push("results").with_params(filters)
}

pub fn research_status() -> QueryKey {
    research().push("status")
}

/// Prefix covering every commands list and every single command.
pub fn commands() -> QueryKey {
    QueryKey::new(["commands"])
}

pub fn command_list(filters: &CommandFilters) -> QueryKey {
    commands().with_params(filters)
}

pub fn command(id: &str) -> QueryKey {
    commands().push(id)
}

pub fn best_practices() -> QueryKey {
    QueryKey::new(["best-practices"])
}

pub fn best_practice_list(filters: &BestPracticeFilters) -> QueryKey {
    best_practices().with_params(filters)
}

pub fn best_practice(id: &str) -> QueryKey {
    best_practices().push(id)
}

pub fn operations() -> QueryKey {
    QueryKey::new(["operations"])
}

pub fn operation(id: &str) -> QueryKey {
    operations().push(id)
}

pub fn repository(id: &str) -> QueryKey {
    QueryKey::new(["repositories", id])
}

pub fn repository_analysis(id: &str) -> QueryKey {
    repository(id).push("analysis")
}
