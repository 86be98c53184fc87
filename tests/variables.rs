use tlox::interpreter::parse_and_run;

#[test]
fn test_declaration_and_use() {
    assert_eq!(parse_and_run("var a = 1; var b = 2; print a + b;").unwrap(), "3\n");
}

#[test]
fn test_declaration_without_initializer_is_nil() {
    assert_eq!(parse_and_run("var a; print a;").unwrap(), "nil\n");
}

#[test]
fn test_declaration_group_shares_one_semicolon() {
    assert_eq!(
        parse_and_run("var a = 1, b = 2, c; print a + b; print c;").unwrap(),
        "3\nnil\n"
    );
}

#[test]
fn test_declaration_group_initializers_run_in_order() {
    // Later declarations in the group can read earlier ones.
    assert_eq!(parse_and_run("var a = 1, b = a + 1; print b;").unwrap(), "2\n");
}

#[test]
fn test_redeclaration_in_same_scope_is_legal() {
    assert_eq!(parse_and_run("var a = 1; var a = 2; print a;").unwrap(), "2\n");
}

#[test]
fn test_assignment_mutates() {
    assert_eq!(parse_and_run("var a = 1; a = 5; print a;").unwrap(), "5\n");
}

#[test]
fn test_assignment_is_an_expression() {
    assert_eq!(parse_and_run("var a = 1; print a = 2;").unwrap(), "2\n");
}

#[test]
fn test_chained_assignment() {
    assert_eq!(
        parse_and_run("var a; var b; a = b = 3; print a; print b;").unwrap(),
        "3\n3\n"
    );
}

#[test]
fn test_assignment_inside_larger_expression() {
    assert_eq!(parse_and_run("var a; print (a = 2) + 3; print a;").unwrap(), "5\n2\n");
}

#[test]
fn test_initializer_may_reference_earlier_variables() {
    assert_eq!(parse_and_run("var a = 2; var b = a * a; print b;").unwrap(), "4\n");
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_inner_block_shadows_until_exit() {
    let source = r#"var a = "hi"; { var a = "bye"; print a; } print a;"#;
    assert_eq!(parse_and_run(source).unwrap(), "bye\nhi\n");
}

#[test]
fn test_assignment_in_inner_block_mutates_outer_binding() {
    let source = "var a = 1; { a = 2; } print a;";
    assert_eq!(parse_and_run(source).unwrap(), "2\n");
}

#[test]
fn test_inner_declarations_do_not_leak() {
    let source = "{ var hidden = 1; } print hidden;";
    assert_eq!(
        parse_and_run(source).unwrap_err(),
        "Undefined variable 'hidden'."
    );
}

#[test]
fn test_nested_blocks_resolve_nearest_binding() {
    let source = r#"
        var a = 1;
        {
            var a = 2;
            {
                var a = 3;
                print a;
            }
            print a;
        }
        print a;
    "#;
    assert_eq!(parse_and_run(source).unwrap(), "3\n2\n1\n");
}

#[test]
fn test_outer_variable_readable_from_inner_block() {
    assert_eq!(parse_and_run("var a = 7; { print a; }").unwrap(), "7\n");
}
