//! TypeScript front end for transpiled zenoscript.
//!
//! Runs the zenoscript pipeline and feeds its output to the standard SWC
//! parser. Nothing here changes the transpiled text; SWC only confirms
//! that it is syntactically valid TypeScript and produces an AST for
//! tooling.

pub mod parse;

pub use parse::{parse_typescript, parse_zenoscript, ParseResult};
