//! Binary support code

pub mod logging;
