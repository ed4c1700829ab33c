//! Staged rewriter that desugars zenoscript into standard TypeScript.
//!
//! Stages, in order:
//! - `struct Name { … }` → `type Name = { … };`
//! - `trait Name {` → `interface Name {`
//! - `impl T for U {…}` → `const UT = {…};`, `impl U {…}` → `class UImpl {…}`
//! - `let x = v` → `const x = v;`
//! - `v |> f |> g` → nested calls
//! - `match v { :tag => a  _ => b }` → immediately invoked if/else chain
//! - `:name` → `Symbol.for("name")`
//! - `if cond {` → `if (cond) {`
//! - `f arg` → `f(arg)`
//! - implicit `return` of a function body's tail expression
//!
//! Every stage re-tokenizes its input and edits whole tokens only, so
//! string literals, templates, regexes and comments pass through untouched.

pub mod atom;
pub mod error;
pub mod impls;
pub mod let_binding;
pub mod match_expr;
pub mod optional_parens;
pub mod optional_return;
pub mod pipeline;
mod rewrite;
pub mod simplified_if;
pub mod stage;
pub mod structs;
pub mod traits;
mod transpile;

pub use error::{SyntaxError, TranspileError};
pub use stage::Stage;
pub use transpile::transpile;
