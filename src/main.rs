use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use clap::Parser as ClapParser;

use log::info;

use treelox::interpreter::Interpreter;
use treelox::parser::Parser;
use treelox::reporter::Reporter;
use treelox::resolver::Resolver;
use treelox::scanner::Scanner;
use treelox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Script to execute; starts an interactive prompt when omitted.
    scripts: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    let mut app: App = App::new();

    match args.scripts.as_slice() {
        [] => app.run_prompt()?,

        [script] => app.run_file(script)?,

        _ => {
            eprintln!("Usage: treelox [script]");
            std::process::exit(64);
        }
    }

    Ok(())
}

/// The driver: owns the diagnostic sink, the interpreter (and with it every
/// global and closure a session accumulates), and the node-identity counter
/// threaded through each parse so REPL lines never reuse ids.
struct App {
    reporter: Reporter,
    interpreter: Interpreter<io::Stdout>,
    next_expr_id: usize,
}

impl App {
    fn new() -> Self {
        App {
            reporter: Reporter::new(),
            interpreter: Interpreter::new(io::stdout()),
            next_expr_id: 0,
        }
    }

    fn run_file(&mut self, path: &Path) -> anyhow::Result<()> {
        info!("Executing script {}", path.display());

        let mut buf: Vec<u8> = Vec::new();
        let mut reader: BufReader<File> = BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        );
        reader.read_to_end(&mut buf)?;

        self.run(&buf);

        if self.reporter.had_error() {
            std::process::exit(65);
        }

        if self.reporter.had_runtime_error() {
            std::process::exit(70);
        }

        Ok(())
    }

    fn run_prompt(&mut self) -> anyhow::Result<()> {
        let stdin: io::Stdin = io::stdin();
        let mut line: String = String::new();

        loop {
            print!("> ");
            io::stdout().flush()?;

            line.clear();
            let nbytes: usize = stdin.lock().read_line(&mut line)?;
            if nbytes == 0 {
                // End of input (Ctrl-D).
                break;
            }

            let trimmed: &str = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            if trimmed == "exit" {
                break;
            }

            self.run(trimmed.as_bytes());

            // A bad line must not poison the session.
            self.reporter.reset();
        }

        Ok(())
    }

    /// One source unit through the whole pipeline.  Interpretation is
    /// skipped as soon as any static stage has reported.
    fn run(&mut self, source: &[u8]) {
        let scanner: Scanner = Scanner::new(source);

        let mut tokens: Vec<Token> = Vec::new();
        for result in scanner {
            match result {
                Ok(token) => tokens.push(token),

                Err(e) => self.reporter.error(&e),
            }
        }

        let mut parser: Parser = Parser::new(tokens, &self.reporter, self.next_expr_id);
        let program = parser.parse();
        self.next_expr_id = parser.next_expr_id();

        if self.reporter.had_error() {
            return;
        }

        let mut resolver = Resolver::new(&self.reporter, &mut self.interpreter);
        resolver.resolve(&program);

        if self.reporter.had_error() {
            return;
        }

        if let Err(e) = self.interpreter.interpret(&program) {
            self.reporter.runtime_error(&e);
        }
    }
}
