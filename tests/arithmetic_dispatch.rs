//! `1 + 2 * 3` exercises integer interning, the `Object.copy` boxing
//! convention for arithmetic results, and the inherited-then-own layout of
//! a dispatch table.

#[test]
fn arithmetic_result_is_boxed_through_object_copy() {
    let source = r#"
        class Main inherits IO {
            main() : Object {
                out_int(1 + 2 * 3)
            };
        };
    "#;

    coolc_test_utils::check_assembles(
        source,
        &[
            "int_const1:\t.word 6 4 Int_disptable 1",
            "int_const2:\t.word 6 4 Int_disptable 2",
            "int_const3:\t.word 6 4 Int_disptable 3",
            "jal\tObject.copy",
            "Main.main:",
        ],
    )
    .unwrap();
}

#[test]
fn main_disptable_inherits_object_and_io_slots_before_its_own() {
    let source = r#"
        class Main inherits IO {
            main() : Object {
                out_int(1)
            };
        };
    "#;

    let assembly = coolc_test_utils::compile(source).unwrap();
    let line = assembly
        .lines()
        .find(|line| line.starts_with("Main_disptable:"))
        .expect("Main_disptable line is present");

    let abort = line.find("Object.abort").expect("Object.abort slot present");
    let out_int = line.find("IO.out_int").expect("IO.out_int slot present");
    let main = line.find("Main.main").expect("Main.main slot present");
    assert!(
        abort < out_int && out_int < main,
        "expected inherited slots before the class's own method, got: {line}"
    );
}
