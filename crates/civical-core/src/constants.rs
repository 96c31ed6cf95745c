/// Field limits shared across crates
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_LOCATION_LEN: usize = 500;

/// Hard ceiling on occurrences generated for one recurring series.
///
/// Bounds expansion cost for any window; a rule's occurrence cap may not
/// exceed it either.
pub const MAX_OCCURRENCES: usize = 365;
