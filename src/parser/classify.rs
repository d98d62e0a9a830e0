//! Lexical line classifier
//!
//! Maps one raw source line to a [`Statement`] using pattern matching over the
//! line's text. Classification is purely syntactic: it never consults memory
//! and never fails; lines it cannot place come back as [`Statement::Unknown`],
//! and recognised but broken input/output statements as
//! [`Statement::Malformed`].
//!
//! Keywords are case-sensitive. A trailing comment is removed first and a
//! single trailing `;` is not part of any extracted expression.

use super::ast::{
    Coercion, Declarator, Dialect, InputRequest, InputStyle, InputTarget, OutputRequest,
    Statement, TemplatePart, TypeHint,
};
use super::lexer::{
    find_keyword, find_top_level, is_identifier, leading_identifier, literal_body,
    matching_paren, split_top_level, starts_with_word, strip_comment, template_parts,
};

/// C words that may start a declaration
const C_TYPE_WORDS: &[&str] = &[
    "const", "static", "unsigned", "signed", "long", "short", "int", "float", "double", "char",
    "bool", "_Bool", "string",
];

/// Classify one source line
pub fn classify_line(line: &str, dialect: Dialect) -> Statement {
    let text = strip_comment(line, dialect).trim();

    // `} else {` closes the previous block on the same line
    let text = match text.strip_prefix('}') {
        Some(rest) if !rest.trim().is_empty() && rest.trim() != ";" => rest.trim(),
        _ => text,
    };

    if is_structural(text, dialect) {
        return Statement::Skip;
    }
    if starts_with_word(text, "else") || starts_with_word(text, "elif") {
        return classify_else(text, dialect);
    }
    if starts_with_word(text, "if") {
        return classify_if(text, dialect);
    }

    classify_simple(text, dialect)
}

/// Blank lines, comments, braces, directives, the `main` signature and `return`
fn is_structural(text: &str, dialect: Dialect) -> bool {
    if text.is_empty() || text.chars().all(|c| matches!(c, '{' | '}' | ';')) {
        return true;
    }
    if text.starts_with('#') && dialect.hash_is_comment() {
        return true;
    }
    if text.starts_with("//") || text.starts_with("/*") || text.starts_with('*') {
        return true;
    }
    if starts_with_word(text, "return") || text == "pass" {
        return true;
    }
    is_main_signature(text)
}

fn is_main_signature(text: &str) -> bool {
    let rest = ["int", "void", "def", "function"]
        .iter()
        .find_map(|kw| {
            starts_with_word(text, kw).then(|| text[kw.len()..].trim_start())
        })
        .unwrap_or(text);

    starts_with_word(rest, "main") && rest[4..].trim_start().starts_with('(')
}

fn classify_if(text: &str, dialect: Dialect) -> Statement {
    let rest = text[2..].trim_start();

    let (condition, tail) = if dialect == Dialect::Python {
        match find_top_level(rest, ':') {
            Some(colon) => (rest[..colon].trim(), rest[colon + 1..].trim()),
            None => return Statement::Malformed("expected ':' after the if condition".to_string()),
        }
    } else {
        let close = rest
            .starts_with('(')
            .then(|| matching_paren(rest, 0))
            .flatten();
        match close {
            Some(close) => (rest[1..close].trim(), rest[close + 1..].trim()),
            None => {
                return Statement::Malformed(
                    "the if condition must be enclosed in parentheses".to_string(),
                )
            }
        }
    };

    if condition.is_empty() {
        return Statement::Malformed("empty if condition".to_string());
    }

    let (then_src, else_src) = match find_keyword(tail, "else") {
        Some(pos) => (&tail[..pos], Some(&tail[pos + 4..])),
        None => (tail, None),
    };

    // A trailing `else` with its body on the next line is kept as a bare `Else`
    let else_branch = else_src.map(|src| {
        let src = src.trim();
        let src = src.strip_prefix(':').unwrap_or(src);
        inline_body(src, dialect).unwrap_or_else(|| Box::new(Statement::Else(None)))
    });

    Statement::If {
        condition: condition.to_string(),
        then_branch: inline_body(then_src, dialect),
        else_branch,
    }
}

fn classify_else(text: &str, dialect: Dialect) -> Statement {
    // `elif c:` is `else if c:`
    if let Some(rest) = text.strip_prefix("elif") {
        return Statement::Else(Some(Box::new(classify_if(
            &format!("if{}", rest),
            dialect,
        ))));
    }

    let rest = text[4..].trim_start();
    let rest = rest.strip_prefix(':').unwrap_or(rest).trim();

    if starts_with_word(rest, "if") {
        return Statement::Else(Some(Box::new(classify_if(rest, dialect))));
    }
    Statement::Else(inline_body(rest, dialect))
}

/// A branch written on the same line as its `if`/`else`; `None` for bare headers
fn inline_body(src: &str, dialect: Dialect) -> Option<Box<Statement>> {
    let mut src = src.trim();
    if let Some(inner) = src.strip_prefix('{') {
        src = inner.trim();
        if let Some(inner) = src.strip_suffix('}') {
            src = inner.trim();
        }
    }
    if src.is_empty() || src == ";" {
        return None;
    }
    Some(Box::new(classify_simple(src, dialect)))
}

/// Everything that is not structural or conditional
fn classify_simple(text: &str, dialect: Dialect) -> Statement {
    let body = text.trim().trim_end_matches(';').trim();

    if let Some(stmt) = classify_input(body, dialect) {
        return stmt;
    }
    if let Some(stmt) = classify_output(body, dialect) {
        return stmt;
    }
    if let Some(stmt) = classify_declaration(body, dialect) {
        return stmt;
    }
    if let Some(stmt) = classify_assignment(body, dialect) {
        return stmt;
    }
    Statement::Unknown
}

/// Split `callee(args...)` when the call spans the whole text
fn call_parts(text: &str) -> Option<(&str, Vec<&str>)> {
    let open = find_top_level(text, '(')?;
    let callee = text[..open].trim();
    if callee.is_empty() || !callee.split('.').all(is_identifier) {
        return None;
    }
    let close = matching_paren(text, open)?;
    if !text[close + 1..].trim().is_empty() {
        return None;
    }
    Some((callee, split_top_level(&text[open + 1..close], ',')))
}

fn classify_input(body: &str, dialect: Dialect) -> Option<Statement> {
    if dialect != Dialect::C || !starts_with_word(body, "scanf") {
        return None;
    }

    let Some((_, args)) = call_parts(body) else {
        return Some(Statement::Malformed("malformed scanf call".to_string()));
    };
    // `scanf(&x)` names its targets without a format; values are coerced automatically
    let (specifiers, target_args) = match args.first().and_then(|f| literal_body(f)) {
        Some(format) => (conversion_specifiers(format), &args[1..]),
        None if args.first().is_some_and(|a| a.starts_with('&')) => (Vec::new(), &args[..]),
        None => {
            return Some(Statement::Malformed(
                "scanf format must be a string literal".to_string(),
            ))
        }
    };
    if target_args.is_empty() {
        return Some(Statement::Malformed(
            "scanf needs a target variable".to_string(),
        ));
    }

    let mut targets = Vec::new();
    for (k, arg) in target_args.iter().enumerate() {
        let by_address = arg.starts_with('&');
        let name = arg.trim_start_matches('&').trim();
        if !is_identifier(name) {
            return Some(Statement::Malformed(format!(
                "scanf target '{}' is not a variable",
                arg
            )));
        }
        targets.push(InputTarget {
            name: name.to_string(),
            by_address,
            coercion: specifiers
                .get(k)
                .map_or(Coercion::Auto, |&c| Coercion::from_specifier(c)),
        });
    }

    Some(Statement::InputRequest(InputRequest {
        style: InputStyle::Scanf,
        targets,
        prompt: None,
        declares: false,
    }))
}

/// Conversion characters of a `scanf`/`printf` format, in order (`%%` excluded)
pub fn conversion_specifiers(format: &str) -> Vec<char> {
    let mut specs = Vec::new();
    let mut chars = format.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '%' {
                break;
            }
            if c.is_ascii_alphabetic() && !matches!(c, 'l' | 'h') {
                specs.push(c);
                break;
            }
        }
    }
    specs
}

/// `input(...)` / `prompt(...)`, optionally wrapped in a numeric conversion
fn prompt_call(rhs: &str, dialect: Dialect) -> Option<(Option<String>, Coercion)> {
    let (reader, wrappers): (&str, &[(&str, Coercion)]) = match dialect {
        Dialect::Python => (
            "input",
            &[
                ("int", Coercion::Integer),
                ("float", Coercion::Float),
                ("str", Coercion::Text),
            ],
        ),
        Dialect::JavaScript => (
            "prompt",
            &[
                ("Number", Coercion::Auto),
                ("parseInt", Coercion::Integer),
                ("parseFloat", Coercion::Float),
                ("String", Coercion::Text),
            ],
        ),
        Dialect::C => return None,
    };

    let (callee, args) = call_parts(rhs)?;
    let (call, coercion) = match wrappers.iter().find(|(w, _)| *w == callee) {
        Some(&(_, coercion)) if args.len() == 1 => (call_parts(args[0])?, coercion),
        _ => ((callee, args), Coercion::Auto),
    };

    let (callee, args) = call;
    (callee == reader).then(|| {
        let prompt = args
            .first()
            .and_then(|p| literal_body(p))
            .map(str::to_string);
        (prompt, coercion)
    })
}

fn prompt_statement(name: &str, rhs: &str, dialect: Dialect, declares: bool) -> Option<Statement> {
    let (prompt, coercion) = prompt_call(rhs, dialect)?;
    Some(Statement::InputRequest(InputRequest {
        style: InputStyle::Prompt,
        targets: vec![InputTarget {
            name: name.to_string(),
            by_address: false,
            coercion,
        }],
        prompt,
        declares,
    }))
}

fn classify_output(body: &str, dialect: Dialect) -> Option<Statement> {
    let printer = match dialect {
        Dialect::C => ["printf", "puts"]
            .into_iter()
            .find(|p| starts_with_word(body, p)),
        Dialect::Python => starts_with_word(body, "print").then_some("print"),
        Dialect::JavaScript => body.starts_with("console.log").then_some("console.log"),
    }?;

    let Some((_, args)) = call_parts(body) else {
        return Some(Statement::Malformed(format!("malformed {} call", printer)));
    };

    if printer == "printf" {
        let Some(format) = args.first().and_then(|f| literal_body(f)) else {
            return Some(Statement::Malformed(
                "printf format must be a string literal".to_string(),
            ));
        };
        return Some(Statement::OutputRequest(OutputRequest::Printf {
            format: format.to_string(),
            args: args[1..].iter().map(|a| a.to_string()).collect(),
        }));
    }

    // Keyword arguments (`end=""`, `sep=" "`) do not print
    let args: Vec<&str> = args.into_iter().filter(|a| !is_keyword_arg(a)).collect();

    if let [only] = args.as_slice() {
        if let Some(parts) = template(only, dialect) {
            return Some(Statement::OutputRequest(OutputRequest::Template { parts }));
        }
    }

    Some(Statement::OutputRequest(OutputRequest::Print {
        args: args.iter().map(|a| a.to_string()).collect(),
    }))
}

fn is_keyword_arg(arg: &str) -> bool {
    leading_identifier(arg).is_some_and(|(_, rest)| {
        let rest = rest.trim_start();
        rest.starts_with('=') && !rest.starts_with("==")
    })
}

fn template(arg: &str, dialect: Dialect) -> Option<Vec<TemplatePart>> {
    match dialect {
        Dialect::Python => {
            let quoted = arg.strip_prefix('f').or_else(|| arg.strip_prefix('F'))?;
            literal_body(quoted).map(|body| template_parts(body, false))
        }
        Dialect::JavaScript if arg.starts_with('`') => {
            literal_body(arg).map(|body| template_parts(body, true))
        }
        _ => None,
    }
}

fn classify_declaration(body: &str, dialect: Dialect) -> Option<Statement> {
    let (type_hint, rest) = match dialect {
        Dialect::C => c_declaration_head(body)?,
        Dialect::JavaScript => {
            let word = ["let", "const", "var"]
                .into_iter()
                .find(|w| starts_with_word(body, w))?;
            (TypeHint::Dynamic, body[word.len()..].trim())
        }
        Dialect::Python => return None,
    };

    if rest.is_empty() || rest.starts_with('*') {
        return None;
    }

    let mut declarators = Vec::new();
    for item in split_top_level(rest, ',') {
        let (name, init) = match find_top_level(item, '=') {
            Some(eq) => {
                let init = item[eq + 1..].trim();
                if init.is_empty() || init.starts_with('=') {
                    return None;
                }
                (item[..eq].trim(), Some(init.to_string()))
            }
            None => (item, None),
        };
        if !is_identifier(name) {
            return None;
        }
        declarators.push(Declarator {
            name: name.to_string(),
            type_hint,
            init,
        });
    }

    if let [single] = declarators.as_slice() {
        if let Some(init) = &single.init {
            if let Some(stmt) = prompt_statement(&single.name, init, dialect, true) {
                return Some(stmt);
            }
        }
    }

    Some(Statement::Declare(declarators))
}

/// Leading C type words; the last one that names a type decides the hint
fn c_declaration_head(body: &str) -> Option<(TypeHint, &str)> {
    let mut rest = body;
    let mut hint = None;
    let mut saw_type_word = false;

    while let Some((word, after)) = leading_identifier(rest) {
        if !C_TYPE_WORDS.contains(&word) {
            break;
        }
        if word != "const" && word != "static" {
            saw_type_word = true;
            if let Some(h) = TypeHint::from_keyword(word) {
                // `long double` stays a float, `unsigned char` a char
                if hint.is_none() || word != "long" {
                    hint = Some(h);
                }
            }
        }
        rest = after.trim_start();
    }

    saw_type_word.then(|| (hint.unwrap_or(TypeHint::Integer), rest))
}

fn classify_assignment(body: &str, dialect: Dialect) -> Option<Statement> {
    // Prefix increment: `++x`
    for (op, sign) in [("++", '+'), ("--", '-')] {
        if let Some(rest) = body.strip_prefix(op) {
            let name = rest.trim();
            return is_identifier(name).then(|| Statement::Assign {
                name: name.to_string(),
                expr: format!("{} {} 1", name, sign),
            });
        }
    }

    let (name, rest) = leading_identifier(body)?;
    let rest = rest.trim_start();

    for (op, sign) in [("++", '+'), ("--", '-')] {
        if rest == op {
            return Some(Statement::Assign {
                name: name.to_string(),
                expr: format!("{} {} 1", name, sign),
            });
        }
    }

    for op in ["+=", "-=", "*=", "/=", "%="] {
        if let Some(rhs) = rest.strip_prefix(op) {
            let rhs = rhs.trim();
            if rhs.is_empty() {
                return None;
            }
            return Some(Statement::Assign {
                name: name.to_string(),
                expr: format!("{} {} ({})", name, &op[..1], rhs),
            });
        }
    }

    let rhs = rest.strip_prefix('=')?;
    if rhs.starts_with('=') {
        return None;
    }
    let rhs = rhs.trim();
    if rhs.is_empty() {
        return None;
    }

    if let Some(stmt) = prompt_statement(name, rhs, dialect, false) {
        return Some(stmt);
    }

    Some(Statement::Assign {
        name: name.to_string(),
        expr: rhs.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(line: &str) -> Statement {
        classify_line(line, Dialect::C)
    }

    #[test]
    fn test_structural_lines() {
        for line in [
            "",
            "   ",
            "#include <stdio.h>",
            "// comment",
            "{",
            "};",
            "int main() {",
            "int main(void)",
            "return 0;",
        ] {
            assert_eq!(c(line), Statement::Skip, "line {:?}", line);
        }
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            c("int x;"),
            Statement::Declare(vec![Declarator {
                name: "x".to_string(),
                type_hint: TypeHint::Integer,
                init: None,
            }])
        );

        match c("const double rate = 0.5, total = rate * 2;") {
            Statement::Declare(ds) => {
                assert_eq!(ds.len(), 2);
                assert_eq!(ds[0].type_hint, TypeHint::Float);
                assert_eq!(ds[1].init.as_deref(), Some("rate * 2"));
            }
            other => panic!("Expected declaration, got {:?}", other),
        }

        // `string` is accepted as a C type for text variables
        assert_eq!(
            c("string name = \"Ada\";"),
            Statement::Declare(vec![Declarator {
                name: "name".to_string(),
                type_hint: TypeHint::Text,
                init: Some("\"Ada\"".to_string()),
            }])
        );

        match classify_line("let count = 3", Dialect::JavaScript) {
            Statement::Declare(ds) => assert_eq!(ds[0].type_hint, TypeHint::Dynamic),
            other => panic!("Expected declaration, got {:?}", other),
        }

        // Arrays and pointers are outside the subset
        assert_eq!(c("int a[5];"), Statement::Unknown);
        assert_eq!(c("int *p;"), Statement::Unknown);
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            c("x = y + 1;"),
            Statement::Assign {
                name: "x".to_string(),
                expr: "y + 1".to_string()
            }
        );
        assert_eq!(
            c("total += 2 * n;"),
            Statement::Assign {
                name: "total".to_string(),
                expr: "total + (2 * n)".to_string()
            }
        );
        assert_eq!(
            c("i++;"),
            Statement::Assign {
                name: "i".to_string(),
                expr: "i + 1".to_string()
            }
        );
        assert_eq!(c("x == 3;"), Statement::Unknown);
    }

    #[test]
    fn test_bare_and_inline_conditionals() {
        assert_eq!(
            c("if (x > 0)"),
            Statement::If {
                condition: "x > 0".to_string(),
                then_branch: None,
                else_branch: None,
            }
        );
        assert_eq!(c("} else {"), Statement::Else(None));

        match c(r#"if (x > 0) printf("positive"); else printf("negative");"#) {
            Statement::If {
                condition,
                then_branch: Some(then_branch),
                else_branch: Some(else_branch),
            } => {
                assert_eq!(condition, "x > 0");
                assert!(matches!(*then_branch, Statement::OutputRequest(_)));
                assert!(matches!(*else_branch, Statement::OutputRequest(_)));
            }
            other => panic!("Expected inline if/else, got {:?}", other),
        }

        assert!(matches!(
            classify_line("elif n < 0:", Dialect::Python),
            Statement::Else(Some(_))
        ));
        assert!(matches!(c("if x > 0"), Statement::Malformed(_)));

        match c(r#"if (x > 0) printf("pos"); else"#) {
            Statement::If {
                then_branch: Some(_),
                else_branch: Some(else_branch),
                ..
            } => assert_eq!(*else_branch, Statement::Else(None)),
            other => panic!("Expected trailing bare else, got {:?}", other),
        }
    }

    #[test]
    fn test_scanf() {
        match c(r#"scanf("%d %c", &age, &grade);"#) {
            Statement::InputRequest(req) => {
                assert_eq!(req.style, InputStyle::Scanf);
                assert_eq!(req.targets.len(), 2);
                assert!(req.targets[0].by_address);
                assert_eq!(req.targets[0].coercion, Coercion::Auto);
                assert_eq!(req.targets[1].coercion, Coercion::Character);
            }
            other => panic!("Expected input request, got {:?}", other),
        }

        match c(r#"scanf("%d", age);"#) {
            Statement::InputRequest(req) => assert!(!req.targets[0].by_address),
            other => panic!("Expected input request, got {:?}", other),
        }

        match c("scanf(&age);") {
            Statement::InputRequest(req) => {
                assert_eq!(req.targets.len(), 1);
                assert_eq!(req.targets[0].name, "age");
                assert!(req.targets[0].by_address);
                assert_eq!(req.targets[0].coercion, Coercion::Auto);
            }
            other => panic!("Expected input request, got {:?}", other),
        }

        assert!(matches!(c("scanf(fmt, &x);"), Statement::Malformed(_)));
        assert!(matches!(c("scanf();"), Statement::Malformed(_)));
    }

    #[test]
    fn test_prompt_inputs() {
        match classify_line(r#"age = int(input("Age? "))"#, Dialect::Python) {
            Statement::InputRequest(req) => {
                assert_eq!(req.prompt.as_deref(), Some("Age? "));
                assert_eq!(req.targets[0].coercion, Coercion::Integer);
                assert!(!req.declares);
            }
            other => panic!("Expected input request, got {:?}", other),
        }

        match classify_line(r#"let name = prompt("Name?");"#, Dialect::JavaScript) {
            Statement::InputRequest(req) => assert!(req.declares),
            other => panic!("Expected input request, got {:?}", other),
        }
    }

    #[test]
    fn test_outputs() {
        assert_eq!(
            c(r#"printf("Age: %d\n", age);"#),
            Statement::OutputRequest(OutputRequest::Printf {
                format: r"Age: %d\n".to_string(),
                args: vec!["age".to_string()],
            })
        );
        assert!(matches!(c("printf(msg);"), Statement::Malformed(_)));

        assert_eq!(
            classify_line(r#"print("total", n, end="")"#, Dialect::Python),
            Statement::OutputRequest(OutputRequest::Print {
                args: vec![r#""total""#.to_string(), "n".to_string()],
            })
        );

        match classify_line("console.log(`n=${n}`);", Dialect::JavaScript) {
            Statement::OutputRequest(OutputRequest::Template { parts }) => {
                assert_eq!(parts[1], TemplatePart::Expr("n".to_string()));
            }
            other => panic!("Expected template output, got {:?}", other),
        }
    }

    #[test]
    fn test_conversion_specifiers() {
        assert_eq!(conversion_specifiers("%d%% %.2f %ld %c"), vec!['d', 'f', 'd', 'c']);
    }
}
