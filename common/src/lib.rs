// Allow some clippy lints shared with the daemon crate
#![allow(clippy::module_inception)]

pub mod config;
pub mod crypto;
pub mod fairness;
pub mod round;
pub mod stats;
pub mod time;
pub mod utils;

// Compile-time assertion, evaluated in a const context
#[macro_export]
macro_rules! static_assert {
    ($cond:expr, $msg:expr $(,)?) => {
        const _: () = assert!($cond, $msg);
    };
}
