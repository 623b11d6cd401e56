// Valuation core: pure table math from projected stats to auction dollars.
// No I/O in this tree; tables come in, derived columns come out.

pub mod auction;
pub mod points;
pub mod replacement;
pub mod scoring;
