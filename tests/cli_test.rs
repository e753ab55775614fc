use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const HEADER: &str = "f,p,M1,f,p,M2,f,p,M3,f,p,Y1,f,p,Y2,f,p,Y3";

fn replicate_cv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_replicate-cv"))
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .unwrap()
}

/// Gene whose M samples are noisy and Y samples have a high CV.
fn write_cotc(dir: &Path) {
    let mut body = format!("{HEADER}\n");
    for (m, y) in [("100", "1"), ("150", "5"), ("5000", "9")] {
        let cells: Vec<String> = [m, m, m, y, y, y]
            .iter()
            .map(|c| format!("cotC,0,{c}"))
            .collect();
        body.push_str(&cells.join(","));
        body.push('\n');
    }
    fs::write(dir.join("cotC.csv"), body).unwrap();
}

#[test]
fn search_uses_thresholds_from_the_command_line() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_cotc(input.path());
    let (input_arg, output_arg) = (
        input.path().to_str().unwrap(),
        output.path().to_str().unwrap(),
    );
    let strict = ["--cv-threshold", "5", "--range-threshold", "100000"];

    let mut args = vec!["run", "-i", input_arg, "-o", output_arg];
    args.extend(strict);
    let out = replicate_cv(&args);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let table = output.path().join("data").join("sporulation_CV_statistics.csv");
    let table = table.to_str().unwrap();
    let mut args = vec!["search", "--stats", table, "-q", "cot"];
    args.extend(strict);
    let out = replicate_cv(&args);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Found 1 unique genes (6 total points)"), "{stdout}");
    assert!(stdout.contains("cotC\tBelow Threshold\n"), "{stdout}");

    let out = replicate_cv(&["search", "--stats", table, "-q", "cot"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("cotC\tCommon Genes\n"));
}

#[test]
fn negative_search_threshold_fails() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("stats.csv");
    fs::write(&table, "Gene,Sample,Mean,SD,CV,Range\ncotC,M1,1,1,1,1\n").unwrap();
    let out = replicate_cv(&[
        "search",
        "--stats",
        table.to_str().unwrap(),
        "-q",
        "cot",
        "--range-threshold=-5",
    ]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}
