//! Overriding a method with an incompatible signature is a type error, not a
//! silent shadow.

#[test]
fn overriding_with_a_different_formal_type_is_rejected() {
    let source = r#"
        class A {
            f(x : Int) : Int { x };
        };
        class B inherits A {
            f(x : String) : Int { 0 };
        };
        class Main {
            main() : Object { 0 };
        };
    "#;

    coolc_test_utils::check_fails(source, &["B.f does not match the signature of A.f"]).unwrap();
}

#[test]
fn overriding_with_the_same_signature_is_accepted() {
    let source = r#"
        class A {
            f(x : Int) : Int { x };
        };
        class B inherits A {
            f(x : Int) : Int { x + 1 };
        };
        class Main {
            main() : Object { 0 };
        };
    "#;

    coolc_test_utils::check_assembles(source, &["B.f:", "A.f:"]).unwrap();
}
