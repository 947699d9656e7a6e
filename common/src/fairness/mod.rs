// Fairness engine
//
// Every function in this module is pure: the same public inputs always give
// the same outputs, so anyone holding a round record can re-run it.
//
// Flow for a round:
// seed + block hash -> random values -> distribution -> verification

mod distribution;
mod error;
mod proof;
mod random;
mod verification;

pub use distribution::*;
pub use error::*;
pub use proof::*;
pub use random::*;
pub use verification::*;
