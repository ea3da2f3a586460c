//! An `if` over two sibling classes types to their common ancestor rather
//! than failing or defaulting to Object.

#[test]
fn if_branches_of_sibling_types_compile_to_their_common_parent() {
    let source = r#"
        class A {
        };
        class B inherits A {
        };
        class C inherits A {
        };
        class Main {
            main() : Object {
                if true then new B else new C fi
            };
        };
    "#;

    coolc_test_utils::check_assembles(source, &["Main.main:", "B_prototype", "C_prototype"]).unwrap();
}

#[test]
fn if_branches_of_unrelated_types_still_widen_to_object() {
    let source = r#"
        class A {
        };
        class Main {
            main() : Object {
                if true then 1 else new A fi
            };
        };
    "#;

    // Int and A have no common ancestor below Object, so the if-node's
    // least upper bound is Object; `main`'s declared Object return type
    // accepts that without complaint.
    coolc_test_utils::check_assembles(source, &["Main.main:"]).unwrap();
}
