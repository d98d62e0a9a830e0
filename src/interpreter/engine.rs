//! Line interpreter
//!
//! Executes a [`Program`] one classified line at a time. All run state lives in
//! an [`ExecutionState`] owned by the [`Interpreter`]; it is rebuilt from
//! scratch whenever a run starts.
//!
//! # State machine
//!
//! ```text
//! Idle -> Running -> Completed
//!            |  \---> Failed
//!            v
//!     WaitingForInput --(submit_input)--> Running
//! ```
//!
//! `Completed` and `Failed` are terminal until the next [`Interpreter::start`].
//!
//! # Conditionals
//!
//! A bare `if` header records its result and skips exactly one following line
//! when false; a bare `else` skips one line when the nearest preceding `if`
//! was taken. Branch bodies written on the header line run in place.
//!
//! # Input
//!
//! An input statement emits its prompt, records the targets and the line after
//! the statement, and suspends. [`Interpreter::submit_input`] fills targets from
//! the submitted text and continues from the recorded line.

use super::constants::{EXIT_MESSAGE, NO_OUTPUT_MESSAGE};
use super::errors::{InputError, RuntimeError};
use super::expressions::evaluate;
use super::format::{format_printf, render_print, render_template, unescape};
use crate::console::{Console, EventKind};
use crate::memory::value::Value;
use crate::memory::variables::Memory;
use crate::parser::ast::{
    Declarator, Dialect, InputRequest, InputStyle, InputTarget, OutputRequest, Program,
    SourceLocation, Statement, TemplatePart,
};
use crate::parser::classify::classify_line;
use crate::parser::validate::{validate, SyntaxError};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::fmt;

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Running,
    WaitingForInput,
    Completed,
    Failed,
}

impl Status {
    /// Completed or Failed: nothing happens until the next run starts
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::WaitingForInput => "waiting for input",
            Status::Completed => "completed",
            Status::Failed => "failed",
        };
        write!(f, "{}", text)
    }
}

/// Engine settings that stay fixed across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub dialect: Dialect,
    /// Seed for synthetic addresses; `None` draws from OS entropy
    pub address_seed: Option<u64>,
}

impl EngineConfig {
    pub fn new(dialect: Dialect) -> Self {
        EngineConfig {
            dialect,
            address_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.address_seed = Some(seed);
        self
    }
}

/// Everything a run mutates
#[derive(Debug, Clone)]
pub struct ExecutionState {
    /// 0-indexed line about to execute
    pub program_counter: usize,
    pub memory: Memory,
    /// Result of the nearest preceding `if`
    pub last_condition_taken: bool,
    pub status: Status,
}

impl ExecutionState {
    pub fn new(config: &EngineConfig) -> Self {
        let memory = match config.address_seed {
            Some(seed) => Memory::with_seed(seed),
            None => Memory::new(),
        };
        ExecutionState {
            program_counter: 0,
            memory,
            last_condition_taken: false,
            status: Status::Idle,
        }
    }
}

/// What to do after a line executes
enum Flow {
    Advance(usize),
    Suspend,
}

/// Targets still to be filled by submitted input
#[derive(Debug, Clone)]
struct PendingInput {
    targets: VecDeque<InputTarget>,
    style: InputStyle,
    may_declare: bool,
    resume_at: usize,
    prompt: String,
    location: SourceLocation,
}

/// Runs programs line by line, one session at a time
pub struct Interpreter {
    config: EngineConfig,
    program: Program,
    statements: Vec<Statement>,
    state: ExecutionState,
    console: Console,
    pending: Option<PendingInput>,
    /// Result events emitted by the current run
    results_emitted: usize,
    /// Line of the error that failed the run
    failed_at: Option<usize>,
}

impl Interpreter {
    pub fn new(config: EngineConfig) -> Self {
        Interpreter {
            config,
            program: Program::new("", config.dialect),
            statements: Vec::new(),
            state: ExecutionState::new(&config),
            console: Console::new(),
            pending: None,
            results_emitted: 0,
            failed_at: None,
        }
    }

    /// Validate `source` and arm a fresh run at line 1.
    ///
    /// Any suspended run is discarded and the console starts over with this
    /// run's events. On a syntax error the run never starts:
    /// one Error event is emitted and the status becomes `Failed`.
    pub fn start(&mut self, source: &str) -> Result<(), SyntaxError> {
        if self.pending.take().is_some() {
            debug!("discarding suspended run");
        }

        let dialect = self.config.dialect;
        self.program = Program::new(source, dialect);
        self.statements = self
            .program
            .lines
            .iter()
            .map(|line| classify_line(line, dialect))
            .collect();
        self.state = ExecutionState::new(&self.config);
        self.console.clear();
        self.results_emitted = 0;
        self.failed_at = None;

        info!("starting {} run ({} lines)", dialect, self.program.len());
        self.console.push(
            EventKind::System,
            format!("> Initializing {} environment...", dialect),
        );

        if let Err(err) = validate(&self.program) {
            info!("syntax check failed: {}", err);
            self.console.push(EventKind::Error, err.to_string());
            self.state.status = Status::Failed;
            self.failed_at = Some(err.location().line);
            return Err(err);
        }

        self.state.status = Status::Running;
        Ok(())
    }

    /// Start a run and execute until it finishes or waits for input
    pub fn run(&mut self, source: &str) -> Status {
        if self.start(source).is_err() {
            return self.state.status;
        }
        self.run_to_pause()
    }

    /// Execute lines while the status stays `Running`
    pub fn run_to_pause(&mut self) -> Status {
        while self.state.status == Status::Running {
            self.step();
        }
        self.state.status
    }

    /// Execute the line at the program counter. A no-op unless `Running`.
    pub fn step(&mut self) -> Status {
        if self.state.status != Status::Running {
            return self.state.status;
        }

        let pc = self.state.program_counter;
        let Some(stmt) = self.statements.get(pc).cloned() else {
            self.finish();
            return self.state.status;
        };

        let location = SourceLocation::line(pc + 1);
        match self.execute(&stmt, location) {
            Ok(Flow::Advance(n)) => {
                self.state.program_counter = pc + n;
                if self.state.program_counter >= self.statements.len() {
                    self.finish();
                }
            }
            Ok(Flow::Suspend) => {
                debug!("line {}: suspended for input", location.line);
                self.state.status = Status::WaitingForInput;
            }
            Err(err) => self.fail(err),
        }
        self.state.status
    }

    /// Resume a suspended run with the text the user entered.
    ///
    /// Returns [`InputError::NotWaiting`] without touching the console or
    /// memory when no input is expected.
    pub fn submit_input(&mut self, raw: &str) -> Result<Status, InputError> {
        if self.state.status != Status::WaitingForInput {
            return Err(InputError::NotWaiting {
                status: self.state.status,
            });
        }
        let Some(mut pending) = self.pending.take() else {
            return Err(InputError::NotWaiting {
                status: self.state.status,
            });
        };

        let raw = raw.trim_end_matches(&['\r', '\n'][..]);
        self.console.push(EventKind::Input, raw);

        let words: Vec<&str> = match pending.style {
            // A prompt reads the whole line
            InputStyle::Prompt => vec![raw.trim()],
            InputStyle::Scanf => raw.split_whitespace().collect(),
        };

        for word in words {
            let Some(target) = pending.targets.pop_front() else {
                break;
            };
            let stored = Value::parse_input(word, target.coercion)
                .map_err(|message| RuntimeError::InvalidInput {
                    message,
                    location: pending.location,
                })
                .and_then(|value| {
                    self.store(&target.name, value, pending.may_declare, pending.location)
                });
            if let Err(err) = stored {
                self.fail(err);
                return Ok(self.state.status);
            }
        }

        if !pending.targets.is_empty() {
            pending.prompt = waiting_prompt(&pending.targets);
            self.console.push(EventKind::System, pending.prompt.clone());
            self.pending = Some(pending);
            return Ok(self.state.status);
        }

        debug!("resuming at line {}", pending.resume_at + 1);
        self.state.program_counter = pending.resume_at;
        self.state.status = Status::Running;
        Ok(self.run_to_pause())
    }

    fn execute(&mut self, stmt: &Statement, location: SourceLocation) -> Result<Flow, RuntimeError> {
        match stmt {
            Statement::Skip => Ok(Flow::Advance(1)),
            Statement::Unknown => {
                warn!(
                    "line {}: unrecognized statement skipped: {}",
                    location.line,
                    self.program
                        .line(location.line - 1)
                        .unwrap_or_default()
                        .trim()
                );
                Ok(Flow::Advance(1))
            }
            Statement::Malformed(message) => Err(RuntimeError::MalformedStatement {
                message: message.clone(),
                location,
            }),
            Statement::Declare(declarators) => {
                for declarator in declarators {
                    self.declare(declarator, location)?;
                }
                Ok(Flow::Advance(1))
            }
            Statement::Assign { name, expr } => {
                let value = evaluate(expr, &self.state.memory, location)?;
                let may_declare = self.config.dialect.implicit_declarations();
                self.store(name, value, may_declare, location)?;
                Ok(Flow::Advance(1))
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let taken = evaluate(condition, &self.state.memory, location)?.is_truthy();
                self.state.last_condition_taken = taken;
                debug!("line {}: condition '{}' is {}", location.line, condition, taken);

                if then_branch.is_none() && else_branch.is_none() {
                    return Ok(Flow::Advance(if taken { 1 } else { 2 }));
                }
                let flow = match if taken { then_branch } else { else_branch } {
                    Some(branch) => self.execute(branch, location)?,
                    None => Flow::Advance(1),
                };
                if !(taken && has_trailing_else(stmt)) {
                    return Ok(flow);
                }
                // The else body on the next line is skipped
                Ok(match flow {
                    Flow::Advance(n) => Flow::Advance(n + 1),
                    Flow::Suspend => {
                        if let Some(pending) = self.pending.as_mut() {
                            pending.resume_at += 1;
                        }
                        Flow::Suspend
                    }
                })
            }
            Statement::Else(branch) => {
                let taken = self.state.last_condition_taken;
                match branch {
                    None => Ok(Flow::Advance(if taken { 2 } else { 1 })),
                    Some(inner) if taken => Ok(Flow::Advance(if is_bare_header(inner) {
                        2
                    } else {
                        1
                    })),
                    Some(inner) => self.execute(inner, location),
                }
            }
            Statement::InputRequest(request) => self.request_input(request, location),
            Statement::OutputRequest(request) => {
                let message = self.render_output(request, location)?;
                self.emit_result(message);
                Ok(Flow::Advance(1))
            }
        }
    }

    fn declare(&mut self, declarator: &Declarator, location: SourceLocation) -> Result<(), RuntimeError> {
        let value = match &declarator.init {
            Some(init) => {
                evaluate(init, &self.state.memory, location)?.coerce_to(declarator.type_hint)
            }
            None => Value::default_for(declarator.type_hint),
        };
        let var = self.state.memory.declare(&declarator.name, value);
        debug!(
            "line {}: declared {} = {} at {}",
            location.line,
            var.name,
            var.value,
            var.display_address()
        );
        Ok(())
    }

    /// Assign to an existing slot, or create one when `may_declare`
    fn store(
        &mut self,
        name: &str,
        value: Value,
        may_declare: bool,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let unbound = || RuntimeError::UnboundVariable {
            name: name.to_string(),
            location,
        };

        if self.state.memory.contains(name) {
            self.state.memory.assign(name, value).map_err(|_| unbound())
        } else if may_declare {
            self.state.memory.declare(name, value);
            Ok(())
        } else {
            Err(unbound())
        }
    }

    fn request_input(
        &mut self,
        request: &InputRequest,
        location: SourceLocation,
    ) -> Result<Flow, RuntimeError> {
        if request.style == InputStyle::Scanf {
            if let Some(target) = request.targets.iter().find(|t| !t.by_address) {
                return Err(RuntimeError::MalformedStatement {
                    message: format!("missing address-of operator '&' before '{}'", target.name),
                    location,
                });
            }
        }

        let may_declare = request.declares || self.config.dialect.implicit_declarations();
        if !may_declare {
            if let Some(target) = request
                .targets
                .iter()
                .find(|t| !self.state.memory.contains(&t.name))
            {
                return Err(RuntimeError::UnboundVariable {
                    name: target.name.clone(),
                    location,
                });
            }
        }

        let targets: VecDeque<InputTarget> = request.targets.iter().cloned().collect();
        let prompt = match request.prompt.as_deref() {
            Some(text) if !text.is_empty() => unescape(text),
            _ => waiting_prompt(&targets),
        };
        self.console.push(EventKind::System, prompt.clone());

        self.pending = Some(PendingInput {
            targets,
            style: request.style,
            may_declare,
            resume_at: self.state.program_counter + 1,
            prompt,
            location,
        });
        Ok(Flow::Suspend)
    }

    fn render_output(
        &self,
        request: &OutputRequest,
        location: SourceLocation,
    ) -> Result<String, RuntimeError> {
        let dialect = self.config.dialect;
        match request {
            OutputRequest::Printf { format, args } => {
                let values = self.resolve_args(args.iter().map(String::as_str), location)?;
                Ok(format_printf(format, &values))
            }
            OutputRequest::Print { args } => {
                let values = self.resolve_args(args.iter().map(String::as_str), location)?;
                Ok(render_print(&values, dialect))
            }
            OutputRequest::Template { parts } => {
                let exprs = parts.iter().filter_map(|part| match part {
                    TemplatePart::Expr(expr) => Some(expr.as_str()),
                    TemplatePart::Text(_) => None,
                });
                let values = self.resolve_args(exprs, location)?;
                Ok(render_template(parts, &values, dialect))
            }
        }
    }

    /// Evaluate output arguments; unbound names become `None` (printed as NULL)
    fn resolve_args<'a>(
        &self,
        args: impl Iterator<Item = &'a str>,
        location: SourceLocation,
    ) -> Result<Vec<Option<Value>>, RuntimeError> {
        args.map(|arg| match evaluate(arg, &self.state.memory, location) {
            Ok(value) => Ok(Some(value)),
            Err(RuntimeError::UnboundVariable { .. }) => Ok(None),
            Err(err) => Err(err),
        })
        .collect()
    }

    fn emit_result(&mut self, message: String) {
        let message = match message.strip_suffix('\n') {
            Some(trimmed) => trimmed.to_string(),
            None => message,
        };
        self.console.push(EventKind::Result, message);
        self.results_emitted += 1;
    }

    fn finish(&mut self) {
        if self.results_emitted == 0 {
            self.console.push(EventKind::System, NO_OUTPUT_MESSAGE);
        }
        self.console.push(EventKind::Success, EXIT_MESSAGE);
        self.state.status = Status::Completed;
        info!(
            "run completed: {} result(s), {} variable(s)",
            self.results_emitted,
            self.state.memory.len()
        );
    }

    fn fail(&mut self, err: RuntimeError) {
        info!("run failed: {}", err);
        self.console.push(EventKind::Error, err.to_string());
        self.state.status = Status::Failed;
        self.failed_at = Some(err.location().line);
        self.pending = None;
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.state.status == Status::WaitingForInput
    }

    /// Prompt to show while waiting for input
    pub fn prompt(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.prompt.as_str())
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn clear_console(&mut self) {
        self.console.clear();
    }

    pub fn memory(&self) -> &Memory {
        &self.state.memory
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 1-indexed line of the error that failed the run
    pub fn failed_line(&self) -> Option<usize> {
        self.failed_at
    }

    /// 1-indexed line the run is at, while it is running or suspended
    pub fn current_line(&self) -> Option<usize> {
        matches!(
            self.state.status,
            Status::Running | Status::WaitingForInput
        )
        .then_some(self.state.program_counter + 1)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// An `if` line whose branch continues on the next line
fn is_bare_header(stmt: &Statement) -> bool {
    matches!(
        stmt,
        Statement::If {
            then_branch: None,
            else_branch: None,
            ..
        }
    ) || has_trailing_else(stmt)
}

/// `if (c) a; else` with the else body on the following line
fn has_trailing_else(stmt: &Statement) -> bool {
    matches!(
        stmt,
        Statement::If {
            else_branch: Some(branch),
            ..
        } if matches!(**branch, Statement::Else(None))
    )
}

fn waiting_prompt(targets: &VecDeque<InputTarget>) -> String {
    let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
    format!("waiting for input: {}", names.join(", "))
}
