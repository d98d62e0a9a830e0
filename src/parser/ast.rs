// Statement vocabulary for the line interpreter

use std::fmt;

/// Source location information for error reporting (both 1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location of a whole line, pointing at its first column
    pub fn line(line: usize) -> Self {
        Self { line, column: 1 }
    }
}

/// Surface syntax accepted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    C,
    Python,
    JavaScript,
}

impl Dialect {
    /// Guess the dialect from a file extension, falling back to C
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Dialect::Python,
            "js" | "mjs" => Dialect::JavaScript,
            _ => Dialect::C,
        }
    }

    /// Whether every plain statement must end with `;`
    pub fn requires_terminator(self) -> bool {
        matches!(self, Dialect::C)
    }

    /// Whether assigning to an unknown name declares it
    pub fn implicit_declarations(self) -> bool {
        matches!(self, Dialect::Python)
    }

    /// Whether a line starting with `#` is a comment or directive
    pub fn hash_is_comment(self) -> bool {
        matches!(self, Dialect::C | Dialect::Python)
    }

    /// Whether `//` starts a comment
    pub fn slash_is_comment(self) -> bool {
        matches!(self, Dialect::C | Dialect::JavaScript)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::C => write!(f, "C"),
            Dialect::Python => write!(f, "PYTHON"),
            Dialect::JavaScript => write!(f, "JAVASCRIPT"),
        }
    }
}

/// Declared type of a variable, used for defaults and initializer coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Integer,
    Float,
    Character,
    Boolean,
    Text,
    /// `let`/`var`/`const`, or no declaration at all
    Dynamic,
}

impl TypeHint {
    /// Map a C type keyword to a hint
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" | "long" | "short" | "unsigned" | "signed" => Some(TypeHint::Integer),
            "float" | "double" => Some(TypeHint::Float),
            "char" => Some(TypeHint::Character),
            "bool" | "_Bool" => Some(TypeHint::Boolean),
            "string" => Some(TypeHint::Text),
            _ => None,
        }
    }
}

/// One `name [= initializer]` item of a declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub type_hint: TypeHint,
    pub init: Option<String>,
}

/// How a submitted input string is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Numeric if the text parses as a number, text otherwise
    Auto,
    Integer,
    Float,
    Character,
    Text,
}

impl Coercion {
    /// Coercion implied by a `scanf` conversion character
    pub fn from_specifier(spec: char) -> Self {
        match spec {
            'c' => Coercion::Character,
            's' => Coercion::Text,
            _ => Coercion::Auto,
        }
    }
}

/// A variable that receives part of the submitted input
#[derive(Debug, Clone, PartialEq)]
pub struct InputTarget {
    pub name: String,
    /// Written as `&name`; required by `scanf`
    pub by_address: bool,
    pub coercion: Coercion,
}

/// Surface form of an input statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStyle {
    /// `scanf("%d", &x);`
    Scanf,
    /// `x = input("...")` / `let x = prompt("...")`
    Prompt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputRequest {
    pub style: InputStyle,
    pub targets: Vec<InputTarget>,
    pub prompt: Option<String>,
    /// The statement also declares its target (`let x = prompt()`)
    pub declares: bool,
}

/// Output statement forms
#[derive(Debug, Clone, PartialEq)]
pub enum OutputRequest {
    /// `printf("fmt", a, b)`: placeholders consumed positionally
    Printf { format: String, args: Vec<String> },
    /// `print(a, b)` / `console.log(a, b)`: space-joined
    Print { args: Vec<String> },
    /// `print(f"..{x}..")` / ``console.log(`..${x}..`)``
    Template { parts: Vec<TemplatePart> },
}

/// Piece of an interpolated template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Text(String),
    Expr(String),
}

/// A classified source line
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Blank, comment, brace, directive, `main` signature or `return`
    Skip,
    Declare(Vec<Declarator>),
    Assign {
        name: String,
        expr: String,
    },
    /// A bare header (`if (c)`, `if (c) {`, `if c:`) has no inline branches
    If {
        condition: String,
        then_branch: Option<Box<Statement>>,
        else_branch: Option<Box<Statement>>,
    },
    Else(Option<Box<Statement>>),
    InputRequest(InputRequest),
    OutputRequest(OutputRequest),
    /// Recognised as an input/output statement but not well formed
    Malformed(String),
    Unknown,
}

impl Statement {
    /// Conditional lines are exempt from the terminator rule
    pub fn is_conditional(&self) -> bool {
        matches!(self, Statement::If { .. } | Statement::Else(_))
    }
}

/// An immutable program: source lines plus the dialect they are written in
#[derive(Debug, Clone)]
pub struct Program {
    pub lines: Vec<String>,
    pub dialect: Dialect,
}

impl Program {
    pub fn new(source: &str, dialect: Dialect) -> Self {
        Program {
            lines: source.lines().map(str::to_string).collect(),
            dialect,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at a 0-indexed program counter
    pub fn line(&self, pc: usize) -> Option<&str> {
        self.lines.get(pc).map(String::as_str)
    }
}
