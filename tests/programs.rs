//! End-to-end programs exercising several features at once.

use tlox::interpreter::parse_and_run;

#[test]
fn test_arithmetic_report() {
    assert_eq!(parse_and_run("print 1 + 2 * 3;").unwrap(), "7\n");
}

#[test]
fn test_two_variables_summed() {
    assert_eq!(
        parse_and_run("var a = 1; var b = 2; print a + b;").unwrap(),
        "3\n"
    );
}

#[test]
fn test_shadowing_round_trip() {
    let source = r#"var a = "hi"; { var a = "bye"; print a; } print a;"#;
    assert_eq!(parse_and_run(source).unwrap(), "bye\nhi\n");
}

#[test]
fn test_while_countdown() {
    let source = "var i = 0; while (i < 3) { print i; i = i + 1; }";
    assert_eq!(parse_and_run(source).unwrap(), "0\n1\n2\n");
}

#[test]
fn test_for_countdown() {
    let source = "for (var i = 0; i < 3; i = i + 1) print i;";
    assert_eq!(parse_and_run(source).unwrap(), "0\n1\n2\n");
}

#[test]
fn test_ternary_on_comparison() {
    assert_eq!(
        parse_and_run("print (1 == 1) ? \"yes\" : \"no\";").unwrap(),
        "yes\n"
    );
}

#[test]
fn test_string_number_concatenation() {
    assert_eq!(parse_and_run("print \"a\" + 1;").unwrap(), "a1\n");
}

#[test]
fn test_type_error_aborts() {
    assert_eq!(
        parse_and_run("true + 1;").unwrap_err(),
        "Operands must be two numbers or two strings."
    );
}

#[test]
fn test_undefined_variable_aborts() {
    assert_eq!(
        parse_and_run("print undefined_var;").unwrap_err(),
        "Undefined variable 'undefined_var'."
    );
}

#[test]
fn test_missing_semicolon_is_a_parse_error() {
    let err = parse_and_run("var a = 1 var b = 2;").unwrap_err();
    assert!(err.contains("Expect ';' after var declaration."));
}

#[test]
fn test_fibonacci() {
    let source = r#"
        var a = 0, b = 1;
        for (var i = 0; i < 8; i = i + 1) {
            print a;
            var next = a + b;
            a = b;
            b = next;
        }
    "#;
    assert_eq!(
        parse_and_run(source).unwrap(),
        "0\n1\n1\n2\n3\n5\n8\n13\n"
    );
}

#[test]
fn test_accumulator_with_comma_groups() {
    let source = r#"
        var total = 0, count = 0;
        for (var i = 1; i <= 4; i = i + 1) {
            total = total + i;
            count = count + 1;
        }
        print "sum " + total;
        print "count " + count;
        print count > 0 ? total / count : nil;
    "#;
    assert_eq!(parse_and_run(source).unwrap(), "sum 10\ncount 4\n2.5\n");
}

#[test]
fn test_nested_scopes_with_loops() {
    let source = r#"
        var label = "outer";
        var i = 0;
        while (i < 2) {
            var label = "inner " + i;
            print label;
            i = i + 1;
        }
        print label;
    "#;
    assert_eq!(parse_and_run(source).unwrap(), "inner 0\ninner 1\nouter\n");
}

#[test]
fn test_logical_defaults_chain() {
    let source = r#"
        var configured = nil;
        var fallback = "default";
        print configured or fallback;
        var flag = "" and "still truthy";
        print flag;
    "#;
    assert_eq!(parse_and_run(source).unwrap(), "default\nstill truthy\n");
}
