// Valuation engine: flex usage sampling, replacement levels, VOR.

pub mod flex;
pub mod vor;
