use anyhow::Result;
use swc_common::{
    comments::SingleThreadedComments, errors::Handler, sync::Lrc, FileName, SourceMap, Spanned,
};
use swc_ecma_ast::EsVersion;
use swc_ecma_parser::{Syntax, TsSyntax};
use zs_ast::TranspileOptions;

/// Result of parsing transpiled output.
pub struct ParseResult {
    pub module: swc_ecma_ast::Module,
    pub comments: SingleThreadedComments,
    pub source_map: Lrc<SourceMap>,
    /// The TypeScript text that was parsed.
    pub typescript: String,
}

/// Transpile a zenoscript source string and parse the output.
///
/// 1. Transpile: run the staged rewriter over `source`.
/// 2. Parse: feed the generated TypeScript to the standard SWC parser.
pub fn parse_zenoscript(
    source: &str,
    filename: &str,
    options: &TranspileOptions,
) -> Result<ParseResult> {
    let typescript = zs_desugar::transpile(source, options)?;
    parse_typescript(&typescript, filename)
}

/// Parse TypeScript text. A `.tsx` filename enables JSX.
pub fn parse_typescript(source: &str, filename: &str) -> Result<ParseResult> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let comments = SingleThreadedComments::default();

    let handler = Handler::with_emitter_writer(Box::new(std::io::stderr()), Some(source_map.clone()));

    let is_tsx = filename.ends_with(".tsx");
    let ts_syntax = Syntax::Typescript(TsSyntax {
        tsx: is_tsx,
        decorators: true,
        ..Default::default()
    });

    let module = swc_ecma_parser::parse_file_as_module(
        &source_file,
        ts_syntax,
        EsVersion::latest(),
        Some(&comments),
        &mut vec![],
    )
    .map_err(|e| {
        let loc = source_map.lookup_char_pos(e.span().lo);
        let message = e.kind().msg().to_string();
        e.into_diagnostic(&handler).emit();
        anyhow::anyhow!(
            "failed to parse {filename}:{}:{}: {message}",
            loc.line,
            loc.col_display + 1
        )
    })?;

    Ok(ParseResult {
        module,
        comments,
        source_map,
        typescript: source.to_string(),
    })
}
