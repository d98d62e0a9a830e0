//! Syntax validator
//!
//! A single forward pass over the whole program, run before execution starts.
//! It enforces two rules and stops at the first violation:
//!
//! 1. Plain statements end with `;` (C only). Skipped lines, conditional lines
//!    and lines opening a block are exempt.
//! 2. Every bare identifier is declared on an earlier line, or earlier on the
//!    same line. Declarations are registered before the line's uses are
//!    checked, so `int x = x + 1;` passes.

use super::ast::{
    Dialect, OutputRequest, Program, SourceLocation, Statement, TemplatePart,
};
use super::classify::classify_line;
use super::lexer::{identifiers, starts_with_word, strip_comment};
use rustc_hash::FxHashSet;
use std::fmt;

/// Names that never count as variables: keywords, type names and built-ins
/// of the three dialects.
pub const RESERVED_WORDS: &[&str] = &[
    // C
    "int", "long", "short", "unsigned", "signed", "float", "double", "char", "bool", "_Bool",
    "void", "const", "static", "string", "if", "else", "return", "main", "printf", "scanf",
    "puts", "sizeof", "include", "define", "true", "false", "NULL", "while", "for", "do",
    "break", "continue", "switch", "case", "default",
    // Python
    "elif", "True", "False", "None", "and", "or", "not", "print", "input", "str", "def", "pass",
    "abs", "in", "range",
    // JavaScript
    "let", "var", "function", "console", "prompt", "Number", "parseInt", "parseFloat", "String",
    "null", "undefined",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// The first rule violation found in a program
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    MissingTerminator { location: SourceLocation },
    UndeclaredVariable { name: String, location: SourceLocation },
}

impl SyntaxError {
    pub fn location(&self) -> SourceLocation {
        match self {
            SyntaxError::MissingTerminator { location }
            | SyntaxError::UndeclaredVariable { location, .. } => *location,
        }
    }

    /// Short hint shown next to the offending span
    pub fn label(&self) -> String {
        match self {
            SyntaxError::MissingTerminator { .. } => "expected ';' here".to_string(),
            SyntaxError::UndeclaredVariable { name, .. } => {
                format!("'{}' is used before any declaration", name)
            }
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::MissingTerminator { location } => write!(
                f,
                "Syntax error: statement terminator ';' missing at line {}",
                location.line
            ),
            SyntaxError::UndeclaredVariable { name, location } => write!(
                f,
                "Syntax error: variable '{}' undeclared at line {}",
                name, location.line
            ),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Check a whole program, failing fast on the first violation
pub fn validate(program: &Program) -> Result<(), SyntaxError> {
    let dialect = program.dialect;
    let mut declared: FxHashSet<String> = FxHashSet::default();

    for (idx, raw) in program.lines.iter().enumerate() {
        let line_no = idx + 1;
        let code = strip_comment(raw, dialect);
        let indent = code.chars().take_while(|c| c.is_whitespace()).count();
        let text = code.trim();
        let stmt = classify_line(raw, dialect);

        if dialect.requires_terminator()
            && stmt != Statement::Skip
            && !stmt.is_conditional()
            && !opens_block(text)
            && !text.ends_with(';')
        {
            return Err(SyntaxError::MissingTerminator {
                location: SourceLocation::new(line_no, code.trim_end().chars().count() + 1),
            });
        }

        declare_names(&stmt, dialect, &mut declared);

        let uses = if stmt == Statement::Skip {
            // `return x;` still reads x
            if starts_with_word(text, "return") {
                identifiers(&text[6..])
                    .into_iter()
                    .map(|(name, col)| (name, col + 6))
                    .collect()
            } else {
                Vec::new()
            }
        } else {
            identifiers(text)
        };

        for (name, col) in uses {
            if !is_reserved(&name) && !declared.contains(&name) {
                return Err(SyntaxError::UndeclaredVariable {
                    name,
                    location: SourceLocation::new(line_no, indent + col),
                });
            }
        }

        // Names inside `{...}` of a template live in a string literal
        let mut templates = Vec::new();
        template_exprs(&stmt, &mut templates);
        for expr in templates {
            let offset = text.find(expr.as_str()).unwrap_or(0);
            for (name, col) in identifiers(&expr) {
                if !is_reserved(&name) && !declared.contains(&name) {
                    return Err(SyntaxError::UndeclaredVariable {
                        name,
                        location: SourceLocation::new(line_no, indent + offset + col),
                    });
                }
            }
        }
    }

    Ok(())
}

fn opens_block(text: &str) -> bool {
    text.ends_with('{') || text.ends_with(':')
}

/// Register every name a statement (or its inline branches) declares
fn declare_names(stmt: &Statement, dialect: Dialect, declared: &mut FxHashSet<String>) {
    match stmt {
        Statement::Declare(declarators) => {
            declared.extend(declarators.iter().map(|d| d.name.clone()));
        }
        Statement::Assign { name, .. } if dialect.implicit_declarations() => {
            declared.insert(name.clone());
        }
        Statement::InputRequest(req) if req.declares || dialect.implicit_declarations() => {
            declared.extend(req.targets.iter().map(|t| t.name.clone()));
        }
        Statement::If {
            then_branch,
            else_branch,
            ..
        } => {
            for branch in [then_branch, else_branch].into_iter().flatten() {
                declare_names(branch, dialect, declared);
            }
        }
        Statement::Else(Some(branch)) => declare_names(branch, dialect, declared),
        _ => {}
    }
}

fn template_exprs(stmt: &Statement, out: &mut Vec<String>) {
    match stmt {
        Statement::OutputRequest(OutputRequest::Template { parts }) => {
            out.extend(parts.iter().filter_map(|p| match p {
                TemplatePart::Expr(e) => Some(e.clone()),
                TemplatePart::Text(_) => None,
            }));
        }
        Statement::If {
            then_branch,
            else_branch,
            ..
        } => {
            for branch in [then_branch, else_branch].into_iter().flatten() {
                template_exprs(branch, out);
            }
        }
        Statement::Else(Some(branch)) => template_exprs(branch, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> Result<(), SyntaxError> {
        validate(&Program::new(source, Dialect::C))
    }

    #[test]
    fn test_valid_program() {
        let source = r#"
#include <stdio.h>

int main() {
    int x = 5; // five
    int y = x * 2;
    if (y > 5)
        printf("big %d\n", y);
    else
        printf("small\n");
    return 0;
}
"#;
        assert_eq!(check(source), Ok(()));
    }

    #[test]
    fn test_missing_terminator() {
        let source = "int main() {\n    int x = 5\n}";
        let err = check(source).unwrap_err();
        assert_eq!(
            err,
            SyntaxError::MissingTerminator {
                location: SourceLocation::new(2, 14)
            }
        );
        assert_eq!(
            err.to_string(),
            "Syntax error: statement terminator ';' missing at line 2"
        );
    }

    #[test]
    fn test_conditional_and_block_lines_need_no_terminator() {
        let source = "int x = 1;\nif (x > 0) {\n    x = 2;\n}\nelse\n    x = 3;";
        assert_eq!(check(source), Ok(()));
    }

    #[test]
    fn test_undeclared_variable() {
        let source = "int main() {\n  int x = 1;\n  x = y + 1;\n}";
        match check(source).unwrap_err() {
            SyntaxError::UndeclaredVariable { name, location } => {
                assert_eq!(name, "y");
                assert_eq!(location, SourceLocation::new(3, 7));
            }
            other => panic!("Expected undeclared variable, got {:?}", other),
        }
    }

    #[test]
    fn test_first_violation_wins() {
        let source = "int a = b;\nint c = 1";
        assert!(matches!(
            check(source),
            Err(SyntaxError::UndeclaredVariable { ref name, .. }) if name == "b"
        ));
    }

    #[test]
    fn test_self_reference_in_initializer() {
        assert_eq!(check("int x = x + 1;"), Ok(()));
    }

    #[test]
    fn test_use_before_declaration() {
        let source = "x = 1;\nint x;";
        assert!(matches!(
            check(source),
            Err(SyntaxError::UndeclaredVariable { location, .. }) if location.line == 1
        ));
    }

    #[test]
    fn test_return_expression_checked() {
        assert!(matches!(
            check("return z;"),
            Err(SyntaxError::UndeclaredVariable { ref name, .. }) if name == "z"
        ));
    }

    #[test]
    fn test_python_assignment_declares() {
        let source = "n = 3\nif n > 2:\n    print(f\"n is {n}\")\nprint(f\"{m}\")";
        let err = validate(&Program::new(source, Dialect::Python)).unwrap_err();
        assert!(matches!(err, SyntaxError::UndeclaredVariable { ref name, location } if name == "m" && location.line == 4));
    }

    #[test]
    fn test_javascript_terminator_optional() {
        let source = "let a = 2\nconsole.log(a)";
        assert_eq!(validate(&Program::new(source, Dialect::JavaScript)), Ok(()));
    }
}
