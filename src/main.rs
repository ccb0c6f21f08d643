use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pl0c::interp::Interpreter;
use pl0c::lexer::Lexer;
use pl0c::source::SourceFile;
use pl0c::token::TokenKind;
use pl0c::{compile, diagnostics::Reporter};

/// PL/0 compiler and P-code interpreter.
///
/// Compiles FILE and, when the compile is clean, executes it. The dump
/// flags stop after the corresponding stage instead.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Print the generated P-code listing instead of executing
    #[arg(long)]
    show_pcode: bool,

    /// Print the token stream and stop
    #[arg(long)]
    dump_tokens: bool,

    /// Print the symbol table after parsing and stop
    #[arg(long)]
    dump_symbols: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("pl0c: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let src = SourceFile::load(&cli.input)?;
    let color = !cli.no_color && io::stdout().is_terminal();

    if cli.dump_tokens {
        dump_tokens(&src, color)?;
        return Ok(ExitCode::SUCCESS);
    }

    let result = compile(&src);
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        result.diagnostics.render(&src, color, &mut out)?;
        result.diagnostics.render_summary(color, &mut out)?;

        if cli.dump_symbols {
            result.symbols.dump(&mut out)?;
            out.flush()?;
            return Ok(exit_for(&result.diagnostics));
        }
        if !result.is_clean() {
            out.flush()?;
            return Ok(ExitCode::FAILURE);
        }
        if cli.show_pcode {
            result.code.write_listing(&mut out)?;
            out.flush()?;
            return Ok(ExitCode::SUCCESS);
        }
        out.flush()?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut vm = Interpreter::new(stdin.lock(), stdout.lock());
    vm.run(result.code.code())?;
    Ok(ExitCode::SUCCESS)
}

fn exit_for(diags: &Reporter) -> ExitCode {
    if diags.error_count() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Lexer test mode: one line per token, plus whatever the lexer reported.
fn dump_tokens(src: &SourceFile, color: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut diags = Reporter::new();
    let mut lexer = Lexer::new(src);
    loop {
        lexer.get_word(&mut diags);
        if lexer.kind() == TokenKind::Eof {
            break;
        }
        writeln!(
            out,
            "{:>4}:{:<4} {:<12} '{}'",
            lexer.row(),
            lexer.col(),
            format!("{:?}", lexer.kind()),
            lexer.lexeme()
        )?;
    }
    diags.render(src, color, &mut out)?;
    diags.render_summary(color, &mut out)?;
    out.flush()
}
