use std::{
    error::Error,
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
    str,
};

const COOLC_PATH: &str = "./target/debug/coolc";

fn run_coolc(source: &str) -> Result<Output, Box<dyn Error>> {
    let mut child = Command::new(COOLC_PATH)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(source.as_bytes())?;

    Ok(child.wait_with_output()?)
}

fn run_coolc_on_file(src_path: &Path) -> Result<Output, Box<dyn Error>> {
    Ok(Command::new(COOLC_PATH).arg(src_path).output()?)
}

/// Compile `source` and assert it succeeds, returning the generated assembly
/// text for the caller to inspect further (e.g. for particular labels).
pub fn compile(source: &str) -> Result<String, Box<dyn Error>> {
    let output = run_coolc(source)?;
    let stderr = str::from_utf8(&output.stderr)?;
    assert!(
        output.status.success(),
        "coolc exited with status {:?}: {stderr}",
        output.status.code()
    );
    Ok(str::from_utf8(&output.stdout)?.to_string())
}

/// Compile `source` and assert that the emitted assembly contains every
/// string in `expected_fragments`, e.g. class labels or dispatch entries.
pub fn check_assembles(source: &str, expected_fragments: &[&str]) -> Result<(), Box<dyn Error>> {
    let assembly = compile(source)?;
    for fragment in expected_fragments {
        assert!(
            assembly.contains(fragment),
            "expected assembly to contain {fragment:?}, got:\n{assembly}"
        );
    }
    Ok(())
}

/// Compile `source` and assert that it fails, with every string in
/// `expected_fragments` appearing somewhere in the reported diagnostics.
pub fn check_fails(source: &str, expected_fragments: &[&str]) -> Result<(), Box<dyn Error>> {
    let output = run_coolc(source)?;
    let stderr = str::from_utf8(&output.stderr)?;
    assert!(
        !output.status.success(),
        "expected coolc to fail, but it exited successfully with stdout:\n{}",
        str::from_utf8(&output.stdout)?
    );
    for fragment in expected_fragments {
        assert!(
            stderr.contains(fragment),
            "expected diagnostics to contain {fragment:?}, got:\n{stderr}"
        );
    }
    Ok(())
}

/// Compile a source file on disk, asserting success.
pub fn check_assembles_file(src_path: &Path, expected_fragments: &[&str]) -> Result<(), Box<dyn Error>> {
    let output = run_coolc_on_file(src_path)?;
    let stderr = str::from_utf8(&output.stderr)?;
    assert!(
        output.status.success(),
        "coolc exited with status {:?}: {stderr}",
        output.status.code()
    );
    let assembly = str::from_utf8(&output.stdout)?;
    for fragment in expected_fragments {
        assert!(
            assembly.contains(fragment),
            "expected assembly to contain {fragment:?}, got:\n{assembly}"
        );
    }
    Ok(())
}
