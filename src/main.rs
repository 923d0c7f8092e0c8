use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::diagnostics::StderrReporter;
use rox::lox::{Lox, Options, Status};
use rox::parser::Parser;
use rox::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program; without a file, starts a prompt
    Run {
        filename: Option<PathBuf>,

        /// Keep executing the statements that parsed after a syntax error
        #[arg(long)]
        recover: bool,
    },
}

/// Reads a whole source file as UTF-8 text.
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn no_input() -> ! {
    println!("No input filepath was provided. Exiting...");
    std::process::exit(64);
}

fn exit_with(status: Status) {
    if status != Status::Ok {
        debug!("Exiting with status {:?}", status);
        std::process::exit(status.exit_code());
    }
}

/// Interactive prompt. Globals persist between lines; errors only abandon
/// the line they occur on.
fn repl(options: Options) -> Result<()> {
    info!("Starting REPL");

    let mut lox = Lox::new(options);
    let mut reporter = StderrReporter;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if read == 0 {
            println!();
            break;
        }

        let status = lox.run(&line, &mut reporter);
        debug!("REPL line finished with {:?}", status);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let source = read_file(filename.unwrap_or_else(|| no_input()))?;
            let (tokens, errors) = Scanner::new(&source).scan_all();

            for e in &errors {
                eprintln!("{}", e);
            }

            if json {
                let rendered =
                    serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
                println!("{}", rendered);
            } else {
                for token in &tokens {
                    println!("{}", token);
                }
            }

            if !errors.is_empty() {
                debug!("Tokenization failed, exiting with code 65");
                exit_with(Status::StaticError);
            }
        }

        Commands::Parse { filename } => {
            let source = read_file(filename.unwrap_or_else(|| no_input()))?;
            let (tokens, errors) = Scanner::new(&source).scan_all();

            if let Some(e) = errors.first() {
                eprintln!("{}", e);
                exit_with(Status::StaticError);
            }

            match Parser::new(tokens).parse_expression() {
                Ok(expr) => println!("{}", AstPrinter::print(&expr)),
                Err(e) => {
                    eprintln!("{}", e);
                    exit_with(Status::StaticError);
                }
            }
        }

        Commands::Evaluate { filename } => {
            let source = read_file(filename.unwrap_or_else(|| no_input()))?;
            let mut lox = Lox::default();

            match lox.evaluate(&source, &mut StderrReporter) {
                Ok(value) => println!("{}", value),
                Err(status) => exit_with(status),
            }
        }

        Commands::Run { filename, recover } => {
            let options = Options { recover };

            match filename {
                Some(filename) => {
                    let source = read_file(filename)?;
                    let mut lox = Lox::new(options);

                    let status = lox.run(&source, &mut StderrReporter);
                    info!("Run finished with {:?}", status);
                    exit_with(status);
                }

                None => repl(options)?,
            }
        }
    }

    Ok(())
}
