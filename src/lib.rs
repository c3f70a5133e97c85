pub mod cli;
pub mod convert;
pub mod detect;
pub mod error;
pub mod lcov;
pub mod model;
pub mod parsers;
pub mod resolve;
