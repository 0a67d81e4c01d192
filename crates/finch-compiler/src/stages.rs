//! The gated per-program pipeline.
//!
//! [`Compilation`] drives lex → parse → analyze → generate for one program,
//! accumulating the diagnostic stream (DEBUG traces, per-stage completion
//! lines, errors and warnings) in discovery order. Errors in a stage skip
//! every later stage for that program; an INFO line records each skip.

use finch_image::Image;

use crate::analyze::{Ast, SymbolTable, analyze};
use crate::codegen;
use crate::diagnostics::{Diagnostics, Severity, Stage};
use crate::parser::{self, Parser, SyntaxNode, Token, lex, token_text};

/// One program about to be compiled.
pub struct Compilation<'s> {
    source: &'s str,
    number: usize,
}

/// Everything the pipeline produced for one program. Stages cancelled by
/// earlier errors leave `None` in their fields.
#[derive(Debug)]
pub struct Compiled {
    pub number: usize,
    pub tokens: Vec<Token>,
    pub root: Option<SyntaxNode>,
    pub ast: Option<Ast>,
    pub symbols: Option<SymbolTable>,
    pub image: Option<Image>,
    pub diagnostics: Diagnostics,
}

impl Compiled {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

impl<'s> Compilation<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source, number: 1 }
    }

    /// Program number used in headers (1-based within the input file).
    pub fn numbered(source: &'s str, number: usize) -> Self {
        Self { source, number }
    }

    pub fn run(self) -> Compiled {
        let number = self.number;
        let mut diag = Diagnostics::new();
        diag.info(Stage::Compiler, format!("Compiling Program #{}", number));

        // Lex
        let lexed = lex(self.source);
        for token in lexed.tokens.iter().filter(|t| !t.kind.is_trivia()) {
            diag.report(
                Stage::Lexer,
                Severity::Debug,
                format!(
                    "{:?} [ {} ] found",
                    token.kind,
                    token_text(self.source, token)
                ),
            )
            .at(token.pos())
            .emit();
        }
        let lex_errors = lexed.diagnostics.error_count();
        let lex_warnings = lexed.diagnostics.warning_count();
        diag.extend(lexed.diagnostics);
        diag.info(
            Stage::Lexer,
            format!(
                "Lexing completed with {} error(s) and {} warning(s)",
                lex_errors, lex_warnings
            ),
        );

        let tokens = lexed.tokens;
        if lex_errors > 0 {
            diag.info(Stage::Parser, "Parsing skipped due to Lexer error(s)");
            diag.info(
                Stage::Analyzer,
                "Semantic Analysis skipped due to Lexer error(s)",
            );
            diag.info(
                Stage::CodeGen,
                "Code Generation skipped due to Lexer error(s)",
            );
            return Compiled {
                number,
                tokens,
                root: None,
                ast: None,
                symbols: None,
                image: None,
                diagnostics: diag,
            };
        }

        // Parse
        let parsed = Parser::new(self.source, tokens.clone(), lexed.end).parse();
        let parse_errors = parsed.diagnostics.error_count();
        diag.extend(parsed.diagnostics);
        for line in parser::printer::dump(&parsed.root).lines() {
            diag.debug(Stage::Parser, format!("CST: {}", line));
        }
        diag.info(
            Stage::Parser,
            format!("Parsing completed with {} error(s)", parse_errors),
        );

        if parse_errors > 0 {
            diag.info(
                Stage::Analyzer,
                "Semantic Analysis skipped due to Parser error(s)",
            );
            diag.info(
                Stage::CodeGen,
                "Code Generation skipped due to Parser error(s)",
            );
            return Compiled {
                number,
                tokens,
                root: Some(parsed.root),
                ast: None,
                symbols: None,
                image: None,
                diagnostics: diag,
            };
        }

        // Analyze
        let analysis = analyze(&parsed.root, &tokens);
        let analysis_errors = analysis.diagnostics.error_count();
        let analysis_warnings = analysis.diagnostics.warning_count();
        diag.extend(analysis.diagnostics);
        for line in analysis.ast.dump().lines() {
            diag.debug(Stage::Analyzer, format!("AST: {}", line));
        }
        for line in analysis.symbols.dump().lines() {
            diag.debug(Stage::Analyzer, format!("Symbol Table: {}", line));
        }
        diag.info(
            Stage::Analyzer,
            format!(
                "Semantic Analysis completed with {} error(s) and {} warning(s)",
                analysis_errors, analysis_warnings
            ),
        );

        let mut symbols = analysis.symbols;
        let ast = analysis.ast;
        if analysis_errors > 0 {
            diag.info(
                Stage::CodeGen,
                "Code Generation skipped due to Analyzer error(s)",
            );
            return Compiled {
                number,
                tokens,
                root: Some(parsed.root),
                ast: Some(ast),
                symbols: Some(symbols),
                image: None,
                diagnostics: diag,
            };
        }

        // Generate
        let image = match codegen::generate(&ast, &mut symbols, &mut diag) {
            Ok(image) => {
                diag.info(Stage::CodeGen, "Code Generation completed with 0 error(s)");
                // The header goes last so the hex dump prints right under it.
                diag.info(
                    Stage::CodeGen,
                    format!("Code Generation for Program #{}", number),
                );
                Some(image)
            }
            Err(err) => {
                diag.error(Stage::CodeGen, err.to_string()).emit();
                diag.info(Stage::CodeGen, "Code Generation completed with 1 error(s)");
                None
            }
        };

        Compiled {
            number,
            tokens,
            root: Some(parsed.root),
            ast: Some(ast),
            symbols: Some(symbols),
            image,
            diagnostics: diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_program_reaches_code_generation() {
        let compiled = Compilation::new("{print(3)}$").run();

        assert!(!compiled.has_errors());
        assert!(compiled.root.is_some());
        assert!(compiled.ast.is_some());
        assert!(compiled.image.is_some());
    }

    #[test]
    fn lexer_errors_cancel_every_later_stage() {
        let compiled = Compilation::new("{~}$").run();

        assert!(compiled.has_errors());
        assert!(compiled.root.is_none());
        assert!(compiled.ast.is_none());
        assert!(compiled.image.is_none());

        let rendered = compiled.diagnostics.printer().render();
        assert!(rendered.contains("INFO    Parser - Parsing skipped due to Lexer error(s)"));
        assert!(rendered.contains("Code Generation skipped due to Lexer error(s)"));
    }

    #[test]
    fn parser_errors_cancel_analysis_and_generation() {
        let compiled = Compilation::new("{print(3}$").run();

        assert!(compiled.root.is_some());
        assert!(compiled.ast.is_none());
        assert!(compiled.image.is_none());
        let rendered = compiled.diagnostics.printer().render();
        assert!(rendered.contains("Semantic Analysis skipped due to Parser error(s)"));
    }

    #[test]
    fn analyzer_errors_cancel_generation_only() {
        let compiled = Compilation::new("{int a string b a=b}$").run();

        assert!(compiled.ast.is_some());
        assert!(compiled.symbols.is_some());
        assert!(compiled.image.is_none());
        let rendered = compiled.diagnostics.printer().render();
        assert!(rendered.contains("Code Generation skipped due to Analyzer error(s)"));
    }

    #[test]
    fn warnings_do_not_cancel_stages() {
        let compiled = Compilation::new("{int a print(a)}$").run();

        assert_eq!(compiled.diagnostics.error_count(), 0);
        assert_eq!(compiled.diagnostics.warning_count(), 1);
        assert!(compiled.image.is_some());
    }

    #[test]
    fn quiet_stream_for_a_clean_program() {
        let compiled = Compilation::numbered("{}$", 2).run();

        insta::assert_snapshot!(compiled.diagnostics.printer().render(), @r"
        INFO    Compiler - Compiling Program #2
        INFO    Lexer - Lexing completed with 0 error(s) and 0 warning(s)
        INFO    Parser - Parsing completed with 0 error(s)
        INFO    Analyzer - Semantic Analysis completed with 0 error(s) and 0 warning(s)
        INFO    Code Gen - Code Generation completed with 0 error(s)
        INFO    Code Gen - Code Generation for Program #2
        ");
    }

    #[test]
    fn verbose_stream_includes_token_and_tree_dumps() {
        let compiled = Compilation::new("{}$").run();
        let rendered = compiled.diagnostics.printer().verbose(true).render();

        assert!(rendered.contains("DEBUG   Lexer - BraceOpen [ { ] found at (1:1)"));
        assert!(rendered.contains("DEBUG   Parser - CST: Program"));
        assert!(rendered.contains("DEBUG   Analyzer - AST: Block"));
        assert!(rendered.contains("DEBUG   Analyzer - Symbol Table: Scope 0"));
        assert!(rendered.contains("DEBUG   Analyzer - Entering scope 0"));
    }

    #[test]
    fn oversized_program_reports_a_code_gen_error() {
        let source = format!("{{print(\"{}\")}}$", "a".repeat(250));
        let compiled = Compilation::new(&source).run();

        assert!(compiled.image.is_none());
        let rendered = compiled.diagnostics.printer().render();
        assert!(rendered.contains("ERROR   Code Gen - Program exceeds 256 bytes"));
        assert!(rendered.contains("Code Generation completed with 1 error(s)"));
    }

    #[test]
    fn images_are_byte_identical_across_runs() {
        let first = Compilation::new("{int a a=9 print(a)}$").run();
        let second = Compilation::new("{int a a=9 print(a)}$").run();
        assert_eq!(first.image.unwrap(), second.image.unwrap());
    }
}
