//! Shared data model for the zenoscript transpiler.
//!
//! Every rewrite stage works on a transient parse of a substring; the types
//! here are the pieces those parses are made of:
//! - `Span` / `Position`: byte ranges and human-readable locations
//! - `MatchArm` / `Pattern`: one `pattern => action` pair of a `match`
//! - `PipeSegment` / `Application`: one function applied in a `|>` chain
//! - `ZsSyntax` / `TranspileOptions`: stage toggles and caller options

pub mod keywords;

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into the text a stage received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        Self { start, end }
    }

    /// An empty span at `offset`, used for pure insertions.
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A resolved source location. Line and column are 1-based; column counts
/// characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Resolve a byte offset in `source` to a line/column position.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Build the target-language literal for the atom `:name`.
///
/// `Symbol.for` interns by key, so two atoms with the same name compare
/// equal under `===` even across separately compiled modules.
pub fn atom_literal(name: &str) -> String {
    format!("Symbol.for(\"{name}\")")
}

/// The left-hand side of a match arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    /// `_`: matches unconditionally.
    Wildcard,
    /// `:tag`: matches when the scrutinee is the atom `tag`.
    Tag(String),
}

impl Pattern {
    /// The condition tested against `__match_value`, or `None` for a wildcard.
    pub fn condition(&self, scrutinee: &str) -> Option<String> {
        match self {
            Pattern::Wildcard => None,
            Pattern::Tag(name) => Some(format!("{scrutinee} === {}", atom_literal(name))),
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Wildcard => write!(f, "_"),
            Pattern::Tag(name) => write!(f, ":{name}"),
        }
    }
}

/// One `pattern => action` arm. Arms keep source order; the first arm whose
/// pattern matches wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchArm {
    pub pattern: Pattern,
    /// Action expression, already rewritten (nested matches resolved).
    pub action: String,
    /// Span of the pattern in the stage input.
    pub span: Span,
    /// Comments found before this arm, emitted verbatim above it.
    pub comments: Vec<String>,
}

/// How a pipe segment is applied to the accumulated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Application {
    /// `(acc).f()`: a bare name is called as a method.
    Method,
    /// `(acc).f(args)`: a bare call keeps its own argument list.
    MethodWithArgs,
    /// `f(acc)`: a member path or parenthesized function receives the value.
    Function,
}

/// A function applied in a `|>` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeSegment {
    pub text: String,
    pub application: Application,
}

impl PipeSegment {
    pub fn new(text: impl Into<String>, application: Application) -> Self {
        Self {
            text: text.into(),
            application,
        }
    }

    /// Wrap the accumulated expression in this segment's call.
    pub fn apply(&self, acc: &str) -> String {
        match self.application {
            Application::Method => format!("({acc}).{}()", self.text),
            Application::MethodWithArgs => format!("({acc}).{}", self.text),
            Application::Function => format!("{}({acc})", self.text),
        }
    }
}

/// Toggles for each rewrite stage. Disabling a stage skips it; stage order
/// is fixed regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZsSyntax {
    pub structs: bool,
    pub traits: bool,
    pub impls: bool,
    pub let_bindings: bool,
    pub pipes: bool,
    pub matches: bool,
    pub atoms: bool,
    pub simplified_if: bool,
    pub optional_parens: bool,
    pub optional_return: bool,
}

impl Default for ZsSyntax {
    fn default() -> Self {
        Self {
            structs: true,
            traits: true,
            impls: true,
            let_bindings: true,
            pipes: true,
            matches: true,
            atoms: true,
            simplified_if: true,
            optional_parens: true,
            optional_return: true,
        }
    }
}

impl ZsSyntax {
    /// Every stage disabled: `transpile` becomes a lex-checked identity.
    pub fn none() -> Self {
        Self {
            structs: false,
            traits: false,
            impls: false,
            let_bindings: false,
            pipes: false,
            matches: false,
            atoms: false,
            simplified_if: false,
            optional_parens: false,
            optional_return: false,
        }
    }
}

/// Options a caller passes to `transpile`. Neither flag changes the output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    /// Log a completion notice.
    pub verbose: bool,
    /// Log the text before and after the pipeline.
    pub debug: bool,
    pub syntax: ZsSyntax,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_counts_lines_and_chars() {
        let src = "ab\ncdé\nx";
        assert_eq!(Position::locate(src, 0).to_string(), "1:1");
        assert_eq!(Position::locate(src, 3).to_string(), "2:1");
        // `é` is two bytes but one column.
        let x = src.find('x').unwrap();
        assert_eq!(Position::locate(src, x).to_string(), "3:1");
        assert_eq!(Position::locate(src, x - 1).column, 4);
    }

    #[test]
    fn pipe_segment_forms() {
        assert_eq!(
            PipeSegment::new("trim", Application::Method).apply("\"x\""),
            "(\"x\").trim()"
        );
        assert_eq!(
            PipeSegment::new("map(f)", Application::MethodWithArgs).apply("xs"),
            "(xs).map(f)"
        );
        assert_eq!(
            PipeSegment::new("console.log", Application::Function).apply("x"),
            "console.log(x)"
        );
    }

    #[test]
    fn tag_condition_uses_atom_literal() {
        let p = Pattern::Tag("ok".into());
        assert_eq!(
            p.condition("__match_value").as_deref(),
            Some("__match_value === Symbol.for(\"ok\")")
        );
        assert_eq!(Pattern::Wildcard.condition("v"), None);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: TranspileOptions = toml::from_str("verbose = true\n[syntax]\natoms = false\n").unwrap();
        assert!(opts.verbose);
        assert!(!opts.debug);
        assert!(!opts.syntax.atoms);
        assert!(opts.syntax.pipes);
    }
}
