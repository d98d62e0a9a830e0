// Integration tests for the line interpreter (C programs)

use labrun::console::{EventKind, OutputEvent};
use labrun::interpreter::constants::{EXIT_MESSAGE, NO_OUTPUT_MESSAGE};
use labrun::interpreter::engine::{EngineConfig, Interpreter, Status};
use labrun::interpreter::errors::InputError;
use labrun::memory::{Value, Variable};
use labrun::parser::ast::Dialect;

fn c_interpreter() -> Interpreter {
    Interpreter::new(EngineConfig::new(Dialect::C))
}

fn results(interp: &Interpreter) -> Vec<String> {
    interp.console().results().map(str::to_string).collect()
}

fn errors(interp: &Interpreter) -> Vec<&OutputEvent> {
    interp
        .console()
        .events()
        .iter()
        .filter(|e| e.kind == EventKind::Error)
        .collect()
}

#[test]
fn test_same_program_same_events() {
    let source = r#"
#include <stdio.h>
int main() {
    int a = 7, b = 3;
    float ratio = a / 2.0;
    printf("%d %d\n", a + b, a % b);
    printf("%.2f\n", ratio);
    return 0;
}
"#;

    let run = || {
        let mut interp = c_interpreter();
        assert_eq!(interp.run(source), Status::Completed);
        interp
            .console()
            .events()
            .iter()
            .map(|e| (e.kind, e.message.clone()))
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(
        first.iter().filter(|(k, _)| *k == EventKind::Result).count(),
        2
    );
}

#[test]
fn test_arithmetic_output() {
    let source = r#"
int a = 7, b = 3;
float ratio = a / 2.0;
printf("%d %d\n", a + b, a % b);
printf("%.2f\n", ratio);
"#;
    let mut interp = c_interpreter();
    interp.run(source);
    assert_eq!(results(&interp), vec!["10 1", "3.50"]);
}

#[test]
fn test_missing_terminator_stops_before_running() {
    let source = "int x = 5;\nint y = x + 1\nprintf(\"%d\", y);";
    let mut interp = c_interpreter();

    assert!(interp.start(source).is_err());
    assert_eq!(interp.status(), Status::Failed);

    let errs = errors(&interp);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("line 2"), "{}", errs[0].message);
    assert!(results(&interp).is_empty());
    assert!(interp.memory().is_empty());
    assert_eq!(interp.failed_line(), Some(2));
}

#[test]
fn test_undeclared_variable() {
    let source = "int x = 1;\nprintf(\"%d\", y);";
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::Failed);
    let errs = errors(&interp);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("'y'"));
    assert!(errs[0].message.contains("line 2"));
    assert!(results(&interp).is_empty());
}

#[test]
fn test_declaration_defaults_to_zero() {
    let mut interp = c_interpreter();
    interp.run("int x;\nprintf(\"%d\", x);");
    assert_eq!(results(&interp), vec!["0"]);
    assert_eq!(interp.memory().read("x"), Some(&Value::Int(0)));
}

#[test]
fn test_scanf_suspends_and_resumes() {
    let source = r#"int age;
scanf("%d", &age);
printf("Age: %d\n", age);"#;
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::WaitingForInput);
    assert!(interp.is_waiting_for_input());
    assert_eq!(interp.current_line(), Some(2));
    assert!(results(&interp).is_empty());

    assert_eq!(interp.submit_input("21"), Ok(Status::Completed));

    let events = interp.console().events();
    let input_at = events
        .iter()
        .position(|e| e.kind == EventKind::Input)
        .expect("input echoed");
    assert_eq!(events[input_at].message, "21");
    assert!(events[..input_at].iter().all(|e| e.kind != EventKind::Result));
    assert_eq!(results(&interp), vec!["Age: 21"]);
    assert_eq!(
        interp.console().last(),
        Some(&OutputEvent::new(EventKind::Success, EXIT_MESSAGE))
    );
    assert_eq!(interp.memory().read("age"), Some(&Value::Int(21)));
}

#[test]
fn test_scanf_multiple_targets_across_submissions() {
    let source = r#"int a, b;
scanf("%d %d", &a, &b);
printf("%d", a + b);"#;
    let mut interp = c_interpreter();

    interp.run(source);
    assert_eq!(interp.submit_input("3"), Ok(Status::WaitingForInput));
    assert!(interp.prompt().is_some_and(|p| p.contains('b')));
    assert_eq!(interp.submit_input("4"), Ok(Status::Completed));
    assert_eq!(results(&interp), vec!["7"]);
}

#[test]
fn test_conditional_positive_branch() {
    let source = r#"int x = 5;
if (x > 0)
    printf("positive");
else
    printf("not positive");"#;
    let mut interp = c_interpreter();
    interp.run(source);
    assert_eq!(results(&interp), vec!["positive"]);
}

#[test]
fn test_conditional_negative_branch() {
    let source = r#"int x = -5;
if (x > 0)
    printf("positive");
else
    printf("not positive");"#;
    let mut interp = c_interpreter();
    interp.run(source);
    assert_eq!(results(&interp), vec!["not positive"]);
}

#[test]
fn test_compound_assignment() {
    let source = r#"int total = 1;
total += 4;
total *= 2;
total--;
printf("%d", total);"#;
    let mut interp = c_interpreter();
    interp.run(source);
    assert_eq!(results(&interp), vec!["9"]);
}

#[test]
fn test_division_by_zero_fails_run() {
    let mut interp = c_interpreter();
    assert_eq!(
        interp.run("int x = 0;\nprintf(\"%d\", 10 / x);"),
        Status::Failed
    );
    let errs = errors(&interp);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("by zero"));
    assert!(errs[0].message.contains("line 2"));
    assert!(results(&interp).is_empty());
}

#[test]
fn test_no_output_message() {
    let mut interp = c_interpreter();
    assert_eq!(interp.run("int x = 1;"), Status::Completed);

    let tail: Vec<(EventKind, &str)> = interp
        .console()
        .events()
        .iter()
        .rev()
        .take(2)
        .map(|e| (e.kind, e.message.as_str()))
        .collect();
    assert_eq!(
        tail,
        vec![
            (EventKind::Success, EXIT_MESSAGE),
            (EventKind::System, NO_OUTPUT_MESSAGE)
        ]
    );
}

#[test]
fn test_submit_input_when_not_waiting() {
    let mut interp = c_interpreter();
    assert_eq!(
        interp.submit_input("5"),
        Err(InputError::NotWaiting {
            status: Status::Idle
        })
    );
    assert!(interp.console().is_empty());

    interp.run("int x = 2;\nprintf(\"%d\", x);");
    let events_before = interp.console().len();
    let memory_before: Vec<Variable> = interp.memory().variables().cloned().collect();

    assert_eq!(
        interp.submit_input("5"),
        Err(InputError::NotWaiting {
            status: Status::Completed
        })
    );
    assert_eq!(interp.console().len(), events_before);
    assert_eq!(
        interp.memory().variables().cloned().collect::<Vec<_>>(),
        memory_before
    );
}

#[test]
fn test_step_by_step() {
    let source = "int x = 1;\nx = x + 1;\nprintf(\"%d\", x);";
    let mut interp = c_interpreter();

    interp.start(source).expect("valid program");
    assert_eq!(interp.current_line(), Some(1));
    assert_eq!(interp.step(), Status::Running);
    assert_eq!(interp.memory().read("x"), Some(&Value::Int(1)));
    assert_eq!(interp.step(), Status::Running);
    assert_eq!(interp.memory().read("x"), Some(&Value::Int(2)));
    assert!(results(&interp).is_empty());
    assert_eq!(interp.step(), Status::Completed);
    assert_eq!(results(&interp), vec!["2"]);

    // Finished runs ignore further steps
    assert_eq!(interp.step(), Status::Completed);
}

#[test]
fn test_restart_discards_suspended_run() {
    let source = "int n;\nscanf(\"%d\", &n);\nprintf(\"%d\", n);";
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::WaitingForInput);
    assert_eq!(interp.run(source), Status::WaitingForInput);
    assert_eq!(interp.submit_input("8"), Ok(Status::Completed));
    assert_eq!(results(&interp), vec!["8"]);
}

#[test]
fn test_each_run_owns_its_console() {
    let source = r#"int x = 1;
printf("%d", x);"#;
    let mut interp = c_interpreter();

    interp.run(source);
    let first: Vec<OutputEvent> = interp.console().events().to_vec();
    interp.run(source);

    assert_eq!(interp.console().events(), first.as_slice());
    assert_eq!(results(&interp), vec!["1"]);
}

#[test]
fn test_format_less_scanf() {
    let source = "int age;\nscanf(&age);\nprintf(\"Age: %d\", age);";
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::WaitingForInput);
    assert!(results(&interp).is_empty());
    assert_eq!(interp.submit_input("21"), Ok(Status::Completed));

    let kinds: Vec<EventKind> = interp.console().events().iter().map(|e| e.kind).collect();
    let input_at = kinds
        .iter()
        .position(|k| *k == EventKind::Input)
        .expect("input echoed");
    assert_eq!(
        &kinds[input_at..],
        &[EventKind::Input, EventKind::Result, EventKind::Success]
    );
    assert_eq!(results(&interp), vec!["Age: 21"]);
}

#[test]
fn test_accented_literal_in_inline_if() {
    let mut interp = c_interpreter();
    assert_eq!(
        interp.run("int x = 1;\nif (x > 0) printf(\"aé\");"),
        Status::Completed
    );
    assert_eq!(results(&interp), vec!["aé"]);
}

#[test]
fn test_else_body_on_next_line() {
    for (x, expected) in [("5", "pos"), ("-5", "neg")] {
        let source = format!(
            "int x = {};\nif (x > 0) printf(\"pos\"); else\nprintf(\"neg\");\nprintf(\"end\");",
            x
        );
        let mut interp = c_interpreter();
        assert_eq!(interp.run(&source), Status::Completed);
        assert_eq!(results(&interp), vec![expected, "end"]);
    }
}

#[test]
fn test_name_declared_in_skipped_branch_is_unbound() {
    let source = "int x = 1;\nif (x > 9) int y = 1;\ny = 2;\nprintf(\"%d\", y);";
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::Failed);
    let errs = errors(&interp);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("'y'"), "{}", errs[0].message);
    assert!(errs[0].message.contains("line 3"), "{}", errs[0].message);
    assert!(results(&interp).is_empty());
    assert_eq!(interp.failed_line(), Some(3));
}

#[test]
fn test_unbound_output_argument_prints_null() {
    let source = "int x = 1;\nif (x > 9) int y = 1;\nprintf(\"x=%d y=%d\", x, y);";
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::Completed);
    assert_eq!(results(&interp), vec!["x=1 y=NULL"]);
}

#[test]
fn test_seeded_addresses_repeat() {
    let source = "int a = 1;\nint b = 2;\nchar c = 'x';";
    let addresses = || {
        let mut interp = Interpreter::new(EngineConfig::new(Dialect::C).with_seed(42));
        interp.run(source);
        interp
            .memory()
            .variables()
            .map(|v| (v.name.clone(), v.display_address()))
            .collect::<Vec<_>>()
    };

    let first = addresses();
    assert_eq!(first.len(), 3);
    assert_eq!(first, addresses());
    assert!(first.iter().all(|(_, addr)| addr.starts_with("0x") && addr.len() == 14));
}

#[test]
fn test_one_line_if_else() {
    for (x, expected) in [("5", "positive"), ("-5", "negative")] {
        let source = format!(
            "int x = {};\nif (x > 0) printf(\"positive\"); else printf(\"negative\");",
            x
        );
        let mut interp = c_interpreter();
        assert_eq!(interp.run(&source), Status::Completed);
        assert_eq!(results(&interp), vec![expected]);
    }
}

#[test]
fn test_missing_terminator_inside_main() {
    let source = "int main() {\n    int x = 5\n}";
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::Failed);
    let errs = errors(&interp);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("line 2"));
    assert!(results(&interp).is_empty());
}

#[test]
fn test_string_declaration() {
    let source = "string name = \"Ada\";\nprintf(\"hi %s\", name);";
    let mut interp = c_interpreter();

    assert_eq!(interp.run(source), Status::Completed);
    assert_eq!(results(&interp), vec!["hi Ada"]);
    let var = interp.memory().get("name").expect("name declared");
    assert_eq!(var.value, Value::Str("Ada".to_string()));
}
