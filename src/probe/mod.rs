//! Probe pipeline: run the external check, parse its output, classify the
//! result, and build the event record.

mod event;
mod outcome;
mod parser;
mod runner;

pub use event::*;
pub use outcome::*;
pub use parser::*;
pub use runner::*;
