// labrun: line-by-line practice program runner with memory visualization

use std::fs::{self, File};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

use labrun::console::EventKind;
use labrun::interpreter::engine::{EngineConfig, Interpreter, Status};
use labrun::parser::ast::{Dialect, Program};
use labrun::parser::validate::{validate, SyntaxError};
use labrun::ui::App;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Lang {
    C,
    Python,
    #[value(alias = "js")]
    Javascript,
}

impl From<Lang> for Dialect {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::C => Dialect::C,
            Lang::Python => Dialect::Python,
            Lang::Javascript => Dialect::JavaScript,
        }
    }
}

#[derive(Parser)]
#[command(name = "labrun")]
#[command(about = "Run a small C, Python or JavaScript program one line at a time")]
struct Cli {
    /// Program to run
    file: PathBuf,

    /// Dialect (guessed from the file extension when omitted)
    #[arg(short, long, value_enum)]
    lang: Option<Lang>,

    /// Run without the TUI, reading input from stdin
    #[arg(long)]
    plain: bool,

    /// Only check the program and report the first syntax error
    #[arg(long, conflicts_with = "plain")]
    check: bool,

    /// Seed for synthetic variable addresses
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (the TUI owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let filename = cli.file.display().to_string();
    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", filename, e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let dialect = cli
        .lang
        .map(Dialect::from)
        .unwrap_or_else(|| dialect_for(&cli.file));
    info!("{}: {} dialect", filename, dialect);

    if cli.check {
        return check(&filename, &source, dialect);
    }

    let mut config = EngineConfig::new(dialect);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let interpreter = Interpreter::new(config);

    if cli.plain {
        return run_plain(interpreter, &source);
    }

    run_tui(interpreter, source)?;
    Ok(ExitCode::SUCCESS)
}

fn dialect_for(path: &Path) -> Dialect {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(Dialect::from_extension)
        .unwrap_or_default()
}

/// Logs go to stderr in plain mode. The TUI only logs when given a file.
fn init_logging(cli: &Cli) -> io::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if cli.plain || cli.check => {}
        None => return Ok(()),
    }
    builder.init();
    Ok(())
}

fn check(filename: &str, source: &str, dialect: Dialect) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let program = Program::new(source, dialect);
    match validate(&program) {
        Ok(()) => {
            println!("{}: ok ({} lines)", filename, program.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_syntax_error(filename, source, &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_syntax_error(filename: &str, source: &str, err: &SyntaxError) -> io::Result<()> {
    let span = line_span(source, err.location().line);
    Report::build(ReportKind::Error, filename, span.start)
        .with_message(err.to_string())
        .with_label(
            Label::new((filename, span))
                .with_message(err.label())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)))
}

/// Byte range of a 1-indexed line without its leading indentation
fn line_span(source: &str, line: usize) -> std::ops::Range<usize> {
    let mut offset = 0;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            let body = text.trim_end_matches(&['\r', '\n'][..]);
            let indent = body.len() - body.trim_start().len();
            return offset + indent..offset + body.len().max(indent + 1);
        }
        offset += text.len();
    }
    offset..offset
}

fn run_plain(mut interpreter: Interpreter, source: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut printed = 0;

    let mut status = interpreter.run(source);
    loop {
        for event in &interpreter.console().events()[printed..] {
            match event.kind {
                EventKind::Result => println!("{}", event.message),
                EventKind::Error => eprintln!("{}", event.message),
                EventKind::Input => {}
                EventKind::System | EventKind::Success => println!("[{}] {}", event.kind, event.message),
            }
        }
        printed = interpreter.console().len();

        if status != Status::WaitingForInput {
            break;
        }
        if let Some(prompt) = interpreter.prompt() {
            eprintln!("({})", prompt);
        }
        let Some(line) = lines.next() else {
            eprintln!("Error: input ended while the program was waiting for input");
            return Ok(ExitCode::FAILURE);
        };
        status = interpreter.submit_input(&line?)?;
        if status == Status::Running {
            status = interpreter.run_to_pause();
        }
    }

    Ok(if status == Status::Failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_tui(interpreter: Interpreter, source: String) -> io::Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(interpreter, source);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
