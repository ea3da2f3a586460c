//! Comparing a primitive against an unrelated type is a type error, even
//! though `=` itself never fails at runtime for reference types.

#[test]
fn comparing_an_int_to_a_string_is_rejected() {
    let source = r#"
        class Main {
            main() : Object {
                1 = "x"
            };
        };
    "#;

    coolc_test_utils::check_fails(
        source,
        &["illegal comparison of a primitive with a non-identical type"],
    )
    .unwrap();
}

#[test]
fn comparing_two_objects_of_unrelated_class_is_accepted() {
    let source = r#"
        class A {
        };
        class B {
        };
        class Main {
            main() : Object {
                new A = new B
            };
        };
    "#;

    coolc_test_utils::check_assembles(source, &["Main.main:"]).unwrap();
}
