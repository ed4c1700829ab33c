use tracing::{debug, info, trace};
use zs_ast::TranspileOptions;
use zs_lexer::tokenize;

use crate::error::{Result, TranspileError};
use crate::rewrite::{origin_offset, splice, Edit};
use crate::stage::Stage;

/// Rewrite zenoscript `source` into TypeScript.
///
/// The source is tokenized once up front so an unterminated literal fails
/// before any stage runs. Enabled stages then run in [`Stage::ORDER`], each
/// over the previous stage's output. On error nothing is returned, and the
/// error position is mapped back into `source`.
pub fn transpile(source: &str, options: &TranspileOptions) -> Result<String> {
    if options.debug {
        debug!(source, "zenoscript source");
    }
    tokenize(source)?;

    let mut text = source.to_string();
    let mut history: Vec<Vec<Edit>> = Vec::new();
    for stage in Stage::ORDER {
        if !stage.is_enabled(&options.syntax) {
            trace!(%stage, "stage disabled");
            continue;
        }
        let edits = match stage.collect_edits(&text) {
            Ok(edits) => edits,
            Err(err) => return Err(relocate(err, source, &history)),
        };
        let (next, applied) = splice(&text, edits);
        trace!(%stage, edits = applied.len(), bytes_in = text.len(), bytes_out = next.len(), "stage finished");
        text = next;
        history.push(applied);
    }

    if options.debug {
        debug!(output = %text, "generated typescript");
    }
    if options.verbose {
        info!(bytes = text.len(), "transpilation completed successfully");
    }
    Ok(text)
}

/// Point a stage error at the original source, undoing the earlier stages.
fn relocate(err: TranspileError, source: &str, history: &[Vec<Edit>]) -> TranspileError {
    let offset = history
        .iter()
        .rev()
        .fold(err.position().offset, |offset, applied| origin_offset(applied, offset));
    match err {
        TranspileError::Syntax(e) => TranspileError::Syntax(e.relocate(source, offset)),
        TranspileError::Lex(e) => TranspileError::Lex(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranspileError;
    use zs_ast::ZsSyntax;

    fn zs(src: &str) -> String {
        transpile(src, &TranspileOptions::default()).unwrap()
    }

    #[test]
    fn plain_typescript_passes_through() {
        let src = r#"import { readFile } from "fs";

export function total(items: number[]): number {
  return items.reduce((a, b) => a + b, 0);
}

const names = ["a", "b"].map((n) => n.toUpperCase());
"#;
        assert_eq!(zs(src), src);
    }

    #[test]
    fn struct_fields_keep_order() {
        assert!(zs("struct User { name: string; age: number; }")
            .contains("type User = { name: string; age: number; };"));
        assert_eq!(
            zs("struct Container<T> { value: T; }"),
            "type Container<T> = { value: T; };"
        );
    }

    #[test]
    fn impl_blocks_with_implicit_returns() {
        assert_eq!(
            zs("impl Show for User {\n  show() {\n    obj.name\n  }\n}"),
            "const UserShow = {\n  show: (obj: User) => {\n    return obj.name\n  }\n};"
        );
        assert_eq!(
            zs("impl Point {\n  norm() { this.x }\n}"),
            "class PointImpl {\n  norm() { return this.x }\n}"
        );
    }

    #[test]
    fn let_binding() {
        assert_eq!(
            zs("let message = \"Hello World\""),
            "const message = \"Hello World\";"
        );
    }

    #[test]
    fn pipe_chain_mixed_convention() {
        assert_eq!(
            zs("\"  hello  \" |> trim |> toUpperCase |> console.log"),
            "console.log(((\"  hello  \").trim()).toUpperCase())"
        );
    }

    #[test]
    fn match_arms_keep_source_order() {
        let out = zs("match status { :ok => \"Success\" :error => \"Failed\" _ => \"Unknown\" }");
        assert_eq!(
            out,
            "(() => {\n  const __match_value = status;\n  if (__match_value === Symbol.for(\"ok\")) {\n    return \"Success\";\n  } else if (__match_value === Symbol.for(\"error\")) {\n    return \"Failed\";\n  } else {\n    return \"Unknown\";\n  }\n})()"
        );
        let ok = out.find("\"Success\"").unwrap();
        let err = out.find("\"Failed\"").unwrap();
        let other = out.find("\"Unknown\"").unwrap();
        assert!(ok < err && err < other);
    }

    #[test]
    fn atoms_are_equal_across_units() {
        let a = zs(":ok");
        let b = zs("const b = :ok");
        assert_eq!(a, "Symbol.for(\"ok\")");
        assert!(b.ends_with(&a));
    }

    #[test]
    fn comments_survive_next_to_rewrites() {
        assert_eq!(
            zs("// greet\nlet x = 1 /* one */\nconsole.log x"),
            "// greet\nconst x = 1; /* one */\nconsole.log(x)"
        );
    }

    #[test]
    fn strings_are_opaque_to_every_stage() {
        let src = "const s = \"a |> b :ok let x = 1\"";
        assert_eq!(zs(src), src);
    }

    #[test]
    fn no_bare_tags_left_after_match() {
        let out = zs("const r = match v {\n  :a => match w { :b => 1 _ => 2 }\n  _ => 3\n}");
        assert!(!out.contains(":a"));
        assert!(!out.contains(":b"));
        assert!(!out.contains("Symbol.for(\"Symbol"));
    }

    #[test]
    fn pipe_into_match_into_pipe() {
        let out = zs("let label = code |> (c => match c { :ok => c |> describe _ => \"other\" })");
        assert_eq!(
            out,
            "const label = (c => (() => {\n  const __match_value = c;\n  if (__match_value === Symbol.for(\"ok\")) {\n    return (c).describe();\n  } else {\n    return \"other\";\n  }\n})())(code);"
        );
    }

    #[test]
    fn ergonomic_omissions_together() {
        let src = "function greet(name) {\n  if name == \"\" {\n    return \"nobody\"\n  }\n  \"hi \" + name\n}";
        assert_eq!(
            zs(src),
            "function greet(name) {\n  if (name == \"\") {\n    return \"nobody\"\n  }\n  return \"hi \" + name\n}"
        );
    }

    #[test]
    fn pipe_in_if_condition() {
        assert_eq!(
            zs("if x |> isValid {\n  go()\n}"),
            "if ((x).isValid()) {\n  go()\n}"
        );
    }

    #[test]
    fn dangling_pipe_reports_its_position() {
        let err = transpile("\"x\" |>", &TranspileOptions::default()).unwrap_err();
        match err {
            TranspileError::Syntax(e) => {
                assert_eq!(e.stage, "pipe");
                assert_eq!(e.position.offset, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_positions_point_into_the_source() {
        let err = transpile("let x = \"a\" |>", &TranspileOptions::default()).unwrap_err();
        assert_eq!(err.position().column, 13);
        assert_eq!(err.position().offset, 12);

        let err = transpile("let veryLongName = v |> ", &TranspileOptions::default()).unwrap_err();
        assert_eq!(err.position().column, 22);

        let src = "struct P { x: number; }\nlet label = match v {\n  :a => 1\n  b\n}";
        let err = transpile(src, &TranspileOptions::default()).unwrap_err();
        assert_eq!(err.position().line, 4);
        assert_eq!(err.position().column, 3);
        assert!(err.to_string().ends_with("at 4:3"));
    }

    #[test]
    fn lex_errors_abort_before_any_stage() {
        let err = transpile("let s = \"open", &TranspileOptions::default()).unwrap_err();
        assert!(matches!(err, TranspileError::Lex(_)));
    }

    #[test]
    fn logging_flags_do_not_change_output() {
        let src = "let x = [1, 2] |> reverse";
        let loud = TranspileOptions {
            verbose: true,
            debug: true,
            ..TranspileOptions::default()
        };
        assert_eq!(transpile(src, &loud).unwrap(), zs(src));
    }

    #[test]
    fn disabled_stages_are_skipped() {
        let src = "let s = :ok |> describe";
        let options = TranspileOptions {
            syntax: ZsSyntax::none(),
            ..TranspileOptions::default()
        };
        assert_eq!(transpile(src, &options).unwrap(), src);

        let options = TranspileOptions {
            syntax: ZsSyntax {
                atoms: false,
                ..ZsSyntax::default()
            },
            ..TranspileOptions::default()
        };
        assert_eq!(transpile(src, &options).unwrap(), "const s = (:ok).describe();");
    }
}
