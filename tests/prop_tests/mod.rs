// Property-based suites.
#[path = "query/prop_filter.rs"]
mod prop_filter;
#[path = "query/prop_sort.rs"]
mod prop_sort;
