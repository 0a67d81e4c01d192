//! The compile driver: split the input on `$`, run the pipeline per
//! program, print the diagnostic stream and the image dumps.

use std::fmt::Write as _;
use std::fs;

use finch_compiler::{Compilation, Compiled, split_programs};

use crate::cli::CompileParams;

pub fn run(params: CompileParams) -> i32 {
    let source = match fs::read_to_string(&params.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot open {}: {}", params.input.display(), err);
            return 1;
        }
    };

    print!("{}", compile_source(&source, &params));

    // Compilation errors are reported on the stream, not the exit status.
    0
}

/// Compiles every program in `source` and renders the full output.
pub fn compile_source(source: &str, params: &CompileParams) -> String {
    let programs = split_programs(source);
    let mut out = String::new();

    if programs.is_empty() {
        let _ = writeln!(out, "{:<8}{} - Nothing to compile", "INFO", "Compiler");
        return out;
    }

    for (index, program) in programs.iter().enumerate() {
        if index > 0 {
            let _ = writeln!(out);
        }
        let compiled = Compilation::numbered(program, index + 1).run();
        render_program(&mut out, program, &compiled, params);
    }

    out
}

fn render_program(out: &mut String, source: &str, compiled: &Compiled, params: &CompileParams) {
    let printer = compiled.diagnostics.printer().verbose(params.verbose);
    out.push_str(&printer.render());

    if params.pretty && (compiled.diagnostics.has_errors() || compiled.diagnostics.has_warnings())
    {
        out.push_str(
            &compiled
                .diagnostics
                .printer()
                .source(source)
                .render_snippets(),
        );
    }

    if let Some(image) = &compiled.image {
        let _ = writeln!(out, "{}", image);

        if params.run {
            let _ = writeln!(out);
            let _ = writeln!(out, "Execution of Program #{}", compiled.number);
            match finch_vm::execute(image) {
                Ok(output) => {
                    let _ = writeln!(out, "{}", output);
                }
                Err(err) => {
                    let _ = writeln!(out, "runtime error: {}", err);
                }
            }
        }
    }
}
