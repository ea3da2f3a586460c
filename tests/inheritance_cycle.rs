//! Cyclic inheritance must be caught before type checking ever runs.

#[test]
fn two_classes_inheriting_from_each_other_is_rejected() {
    let source = r#"
        class A inherits B {
        };
        class B inherits A {
        };
        class Main {
            main() : Object { 0 };
        };
    "#;

    coolc_test_utils::check_fails(source, &["cyclic inheritance detected involving class"]).unwrap();
}

#[test]
fn a_class_inheriting_from_itself_is_rejected() {
    let source = r#"
        class A inherits A {
        };
        class Main {
            main() : Object { 0 };
        };
    "#;

    coolc_test_utils::check_fails(source, &["cyclic inheritance detected involving class"]).unwrap();
}
