use std::collections::HashSet;

use jackc::{
    error::{CompileErrorKind, JackError},
    prelude::*,
};

const SEVEN: &str = include_str!("seven.jack");
const POINT: &str = include_str!("point.jack");

fn lines(source: &str) -> Vec<String> {
    match compile(source) {
        Ok(vm) => vm.lines().map(str::to_owned).collect(),
        Err(err) => panic!("{}", err),
    }
}

/// Wrap statements in a function with the given locals.
fn function_body(locals: &str, stmts: &str) -> String {
    format!("class Main {{ function void f() {{ {locals} {stmts} return; }} }}")
}

/// Instructions between the `function` line and the trailing return.
fn body_lines(locals: &str, stmts: &str) -> Vec<String> {
    let mut lines = lines(&function_body(locals, stmts));
    assert_eq!(lines.pop().as_deref(), Some("return"));
    assert_eq!(lines.pop().as_deref(), Some("push constant 0"));
    lines.remove(0);
    lines
}

#[test]
fn test_compile_seven() {
    assert_eq!(compile(SEVEN).unwrap(), include_str!("seven.vm"));
}

#[test]
fn test_compile_point() {
    assert_eq!(compile(POINT).unwrap(), include_str!("point.vm"));
}

#[test]
fn test_function_per_subroutine() {
    let class = jackc::parse_class(POINT).unwrap();
    let vm = lines(POINT);

    let functions: Vec<&String> = vm.iter().filter(|line| line.starts_with("function ")).collect();
    assert_eq!(functions.len(), class.subroutines.len());

    for (line, subroutine) in functions.iter().zip(&class.subroutines) {
        let expected = format!("function Point.{} {}", subroutine.name, subroutine.body.local_count());
        assert_eq!(**line, expected);
    }
}

#[test]
fn test_emitted_indices_per_kind() {
    let source = "
        class Counter {
            static int total;
            field int x, y;
            method int add(int a, int b) {
                var int c, d;
                let c = a;
                let d = b;
                let x = c;
                let y = d;
                let total = x + y;
                return total;
            }
        }";

    // `this` takes argument 0, so parameters start at 1.
    assert_eq!(
        lines(source),
        [
            "function Counter.add 2",
            "push argument 0",
            "pop pointer 0",
            "push argument 1",
            "pop local 0",
            "push argument 2",
            "pop local 1",
            "push local 0",
            "pop this 0",
            "push local 1",
            "pop this 1",
            "push this 0",
            "push this 1",
            "add",
            "pop static 0",
            "push static 0",
            "return",
        ]
    );
}

#[test]
fn test_let_sum() {
    assert_eq!(
        body_lines("var int x;", "let x = 1 + 2;"),
        ["push constant 1", "push constant 2", "add", "pop local 0"]
    );
}

#[test]
fn test_if_else() {
    assert_eq!(
        body_lines("var int x;", "if (x) { let x = 1; } else { let x = 2; }"),
        [
            "push local 0",
            "if-goto IF_TRUE0",
            "goto IF_FALSE0",
            "label IF_TRUE0",
            "push constant 1",
            "pop local 0",
            "goto IF_END0",
            "label IF_FALSE0",
            "push constant 2",
            "pop local 0",
            "label IF_END0",
        ]
    );
}

#[test]
fn test_sibling_ifs_get_distinct_labels() {
    let lines = body_lines("var int x;", "if (x) { let x = 1; } if (x) { let x = 2; }");
    let labels: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.strip_prefix("label "))
        .collect();
    assert_eq!(labels, ["IF_TRUE0", "IF_FALSE0", "IF_TRUE1", "IF_FALSE1"]);
}

#[test]
fn test_print_string() {
    assert_eq!(
        body_lines("", r#"do Output.printString("hi");"#),
        [
            "push constant 2",
            "call String.new 1",
            "push constant 104",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "call Output.printString 1",
            "pop temp 0",
        ]
    );
}

#[test]
fn test_string_constant() {
    assert_eq!(
        body_lines("var String s;", r#"let s = "AB";"#),
        [
            "push constant 2",
            "call String.new 1",
            "push constant 65",
            "call String.appendChar 2",
            "push constant 66",
            "call String.appendChar 2",
            "pop local 0",
        ]
    );
}

#[test]
fn test_empty_string() {
    assert_eq!(
        body_lines("var String s;", r#"let s = "";"#),
        ["push constant 0", "call String.new 1", "pop local 0"]
    );
}

#[test]
fn test_while_pairs_are_matched_and_unique() {
    const STMTS: &str = r#"
        while (i < 10) {
            while (j < 10) { let j = j + 1; }
            let i = i + 1;
        }
        while (i > 0) {
            if (i = 5) { while (false) { } }
            let i = i - 1;
        }
    "#;
    let lines = body_lines("var int i, j;", STMTS);

    let mut exp = HashSet::new();
    let mut end = HashSet::new();
    for line in &lines {
        if let Some(n) = line.strip_prefix("label WHILE_EXP") {
            assert!(exp.insert(n.to_owned()), "WHILE_EXP{n} reused");
        }
        if let Some(n) = line.strip_prefix("label WHILE_END") {
            assert!(end.insert(n.to_owned()), "WHILE_END{n} reused");
        }
    }

    assert_eq!(exp.len(), 4);
    assert_eq!(exp, end);
    for n in &exp {
        assert!(lines.contains(&format!("goto WHILE_EXP{n}")));
        assert!(lines.contains(&format!("if-goto WHILE_END{n}")));
    }
}

#[test]
fn test_class_receiver_is_not_pushed() {
    let lines = body_lines("", "do Screen.clearScreen();");
    assert_eq!(lines, ["call Screen.clearScreen 0", "pop temp 0"]);
}

#[test]
fn test_nested_if_labels_conf() {
    let source = function_body("var int x;", "if (x) { if (x) { } } if (x) { }");
    let conf = CompilerConf {
        if_labels: IfLabels::Nested,
        ..Default::default()
    };
    let vm = compile_with(&source, conf).unwrap();
    let labels: Vec<&str> = vm.lines().filter_map(|line| line.strip_prefix("label ")).collect();
    assert_eq!(
        labels,
        ["IF_TRUE0", "IF_TRUE1", "IF_FALSE1", "IF_FALSE0", "IF_TRUE0", "IF_FALSE0"]
    );
}

#[test]
fn test_left_to_right_conf() {
    let source = function_body("var int x;", "let x = 2 - 3 * 4;");
    let conf = CompilerConf {
        operator_order: OperatorOrder::LeftToRight,
        ..Default::default()
    };
    let vm = compile_with(&source, conf).unwrap();
    let lines: Vec<&str> = vm.lines().collect();
    assert_eq!(
        lines[1..7],
        ["push constant 2", "push constant 3", "sub", "push constant 4", "call Math.multiply 2", "pop local 0"]
    );
}

#[test]
fn test_compile_into_writer() {
    let mut buf = Vec::new();
    compile_into(SEVEN, CompilerConf::default(), &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), include_str!("seven.vm"));
}

#[test]
fn test_undefined_variable() {
    let source = function_body("", "let x = 1;");
    match compile(source) {
        Err(JackError::Compile(err)) => {
            assert_eq!(err.kind, CompileErrorKind::UndefinedSymbol("x".into()));
            assert!(err.to_string().contains("undefined variable 'x'"));
        }
        other => panic!("expected compile error, found {other:?}"),
    }
}

#[test]
fn test_syntax_errors() {
    let cases = [
        ("class Main { function void f() { let x = 1 } }", "expected ';'"),
        ("class Main { function void f() { return }", "expected term"),
        ("class Main { function void f() { return; }", "unexpected end-of-file"),
        ("class Main { field int 1x; }", "identifiers can't start with a digit"),
        ("class Main { function void f() { return 40000; } }", "out of range"),
        ("class Main { } class Other { }", "unexpected token 'class'"),
        ("class Main { function void f() { let x = #; } }", "unknown character"),
        ("class Main { /* never closed ", "unterminated block comment"),
    ];

    for (source, message) in cases {
        match compile(source) {
            Ok(vm) => panic!("expected error for {source:?}, compiled to:\n{vm}"),
            Err(err) => {
                let text = err.to_string();
                assert!(text.contains(message), "{source:?}: {text}");
            }
        }
    }
}

#[test]
fn test_error_location() {
    const SOURCE: &str = "class Main {\n  function void f() {\n    do f(;\n  }\n}\n";
    match compile(SOURCE) {
        Err(JackError::Syntax(err)) => {
            assert_eq!(err.location.line, 3);
            assert_eq!(err.location.column, 10);
            assert_eq!(err.location.text, "    do f(;");
        }
        other => panic!("expected syntax error, found {other:?}"),
    }
}
