// Fantasy-baseball auction valuations from projection CSVs: score projected
// stats under league rules, baseline them against replacement level, and
// spread the league's budget over the surplus.

pub mod cli;
pub mod config;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod projections;
pub mod valuation;
