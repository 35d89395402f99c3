//! Line-oriented front-end stages that run before any lexer instance exists:
//! include expansion with origin tracking (§4.2), and the statement
//! accumulator that groups expanded text into logical statements (§4.3).

pub mod accumulate;
pub mod include;

pub use accumulate::{accumulate, Statement};
pub use include::{expand_includes, OriginMap};
