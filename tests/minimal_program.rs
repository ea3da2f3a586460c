//! End-to-end: the smallest program that prints something and exits cleanly.

#[test]
fn hello_string_compiles_and_interns_the_literal_once() {
    let source = r#"
        class Main inherits IO {
            main() : Object {
                out_string("hi")
            };
        };
    "#;

    coolc_test_utils::check_assembles(
        source,
        &[
            "str_const1:\t.word 5 5 String_disptable 2 \"hi\"",
            "Main_init:",
            "Main.main:",
        ],
    )
    .unwrap();
}

#[test]
fn main_init_chains_to_its_parent_init() {
    let source = r#"
        class Main inherits IO {
            main() : Object {
                out_string("hi")
            };
        };
    "#;

    coolc_test_utils::check_assembles(source, &["Main_init:", "jal\tIO_init", "Main.main:"]).unwrap();
}
