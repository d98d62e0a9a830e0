// Python and JavaScript programs through the same engine

use labrun::console::EventKind;
use labrun::interpreter::engine::{EngineConfig, Interpreter, Status};
use labrun::memory::Value;
use labrun::parser::ast::Dialect;

fn interpreter(dialect: Dialect) -> Interpreter {
    Interpreter::new(EngineConfig::new(dialect))
}

fn results(interp: &Interpreter) -> Vec<String> {
    interp.console().results().map(str::to_string).collect()
}

#[test]
fn test_initializing_message_names_dialect() {
    let mut interp = interpreter(Dialect::Python);
    interp.run("x = 1");
    let first = &interp.console().events()[0];
    assert_eq!(first.kind, EventKind::System);
    assert_eq!(first.message, "> Initializing PYTHON environment...");
}

#[test]
fn test_python_input_and_fstring() {
    let source = r#"name = input("Name: ")
print(f"Hello {name}")"#;
    let mut interp = interpreter(Dialect::Python);

    assert_eq!(interp.run(source), Status::WaitingForInput);
    assert_eq!(interp.prompt(), Some("Name: "));
    assert_eq!(interp.submit_input("Ada"), Ok(Status::Completed));
    assert_eq!(results(&interp), vec!["Hello Ada"]);
}

#[test]
fn test_python_typed_input() {
    let source = r#"age = int(input("Age? "))
print("Next year:", age + 1)"#;
    let mut interp = interpreter(Dialect::Python);

    interp.run(source);
    assert_eq!(interp.submit_input("21"), Ok(Status::Completed));
    assert_eq!(results(&interp), vec!["Next year: 22"]);
}

#[test]
fn test_python_invalid_typed_input_fails() {
    let source = "age = int(input(\"Age? \"))\nprint(age)";
    let mut interp = interpreter(Dialect::Python);

    interp.run(source);
    assert_eq!(interp.submit_input("abc"), Ok(Status::Failed));
    assert!(results(&interp).is_empty());
    assert_eq!(interp.console().last().map(|e| e.kind), Some(EventKind::Error));
}

#[test]
fn test_python_if_else_blocks() {
    let source = r#"x = 3
if x > 2:
    print("big")
else:
    print("small")
print(x * 2, x == 3)"#;
    let mut interp = interpreter(Dialect::Python);

    assert_eq!(interp.run(source), Status::Completed);
    assert_eq!(results(&interp), vec!["big", "6 True"]);
}

#[test]
fn test_python_elif_chain() {
    let source = r#"score = 75
if score >= 90:
    print("A")
elif score >= 70:
    print("B")
else:
    print("C")"#;
    let mut interp = interpreter(Dialect::Python);
    interp.run(source);
    assert_eq!(results(&interp), vec!["B"]);
}

#[test]
fn test_python_undeclared_name() {
    let mut interp = interpreter(Dialect::Python);
    assert_eq!(interp.run("x = 1\nprint(y)"), Status::Failed);
    let error = interp
        .console()
        .events()
        .iter()
        .find(|e| e.kind == EventKind::Error)
        .expect("error event");
    assert!(error.message.contains("'y'"));
    assert!(error.message.contains("line 2"));
}

#[test]
fn test_python_needs_no_terminator() {
    let mut interp = interpreter(Dialect::Python);
    assert_eq!(interp.run("a = 2\nb = a * 3\nprint(b)"), Status::Completed);
    assert_eq!(results(&interp), vec!["6"]);
}

#[test]
fn test_javascript_prompt_and_template() {
    let source = r#"let n = prompt("Number?");
console.log(`Double: ${n * 2}`);"#;
    let mut interp = interpreter(Dialect::JavaScript);

    assert_eq!(interp.run(source), Status::WaitingForInput);
    assert_eq!(interp.prompt(), Some("Number?"));
    assert_eq!(interp.submit_input("21"), Ok(Status::Completed));
    assert_eq!(results(&interp), vec!["Double: 42"]);
    assert_eq!(interp.memory().read("n"), Some(&Value::Int(21)));
}

#[test]
fn test_javascript_declarations_and_log() {
    let source = r#"let a = 1, b = 2
const label = "sum"
console.log(label, a + b)"#;
    let mut interp = interpreter(Dialect::JavaScript);

    assert_eq!(interp.run(source), Status::Completed);
    assert_eq!(results(&interp), vec!["sum 3"]);
}

#[test]
fn test_javascript_string_concatenation() {
    let source = "let name = \"Ada\";\nconsole.log(\"Hi \" + name);";
    let mut interp = interpreter(Dialect::JavaScript);
    interp.run(source);
    assert_eq!(results(&interp), vec!["Hi Ada"]);
}
