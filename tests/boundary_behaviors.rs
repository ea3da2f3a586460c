//! Edge-of-input behaviors: an empty program, a minimal valid one, and a
//! class that inherits from itself.

#[test]
fn empty_program_is_rejected_for_missing_main() {
    coolc_test_utils::check_fails("", &["class Main is not defined"]).unwrap();
}

#[test]
fn trivial_main_returning_an_object_compiles() {
    let source = r#"
        class Main {
            main() : Object { 0 };
        };
    "#;

    coolc_test_utils::check_assembles(source, &["Main.main:", "Main_init:"]).unwrap();
}

#[test]
fn self_inheriting_class_is_rejected() {
    let source = r#"
        class A inherits A {
        };
        class Main {
            main() : Object { 0 };
        };
    "#;

    coolc_test_utils::check_fails(source, &["cyclic inheritance detected involving class"]).unwrap();
}

#[test]
fn inheriting_from_a_basic_class_is_allowed_but_redefining_one_is_not() {
    coolc_test_utils::check_fails(
        r#"
        class Int {
        };
        class Main {
            main() : Object { 0 };
        };
        "#,
        &["redefinition of basic class Int is not allowed"],
    )
    .unwrap();
}
