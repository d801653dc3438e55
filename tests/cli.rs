extern crate assert_cmd;
extern crate nix;
extern crate predicates;

use assert_cmd::prelude::*;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use predicates::prelude::*;
use std::io::Read;
use std::process::{Command, Output, Stdio};

const RESET: &str = "\x1b[0m";

fn mandelterm() -> Command {
    Command::cargo_bin("mandelterm").unwrap()
}

fn run(args: &[&str]) -> Output {
    mandelterm().args(args).output().unwrap()
}

fn assert_usage_error(args: &[&str], complaint: &str) {
    let output = run(args);
    assert_eq!(output.status.code(), Some(1), "{:?}", args);
    assert!(output.stdout.is_empty(), "{:?} wrote to stdout", args);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    assert!(
        predicate::str::contains(complaint).eval(stderr.as_str()),
        "{:?} complained {:?}",
        args,
        stderr
    );
}

#[test]
fn thread_count_is_required() {
    assert_usage_error(&[], "threads");
}

#[test]
fn thread_count_must_be_a_positive_number() {
    assert_usage_error(&["abc"], "not valid for `thread_count'");
    assert_usage_error(&["0"], "not valid for `thread_count'");
    assert_usage_error(&["3x"], "not valid for `thread_count'");
    assert_usage_error(&["2.5"], "not valid for `thread_count'");
    assert_usage_error(&[""], "thread");
}

#[test]
fn negative_thread_counts_are_refused() {
    let output = run(&["-2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn inverted_planes_are_refused_before_drawing() {
    assert_usage_error(
        &["2", "--leftlower", "1.0,1.0", "--rightupper", "-1.0,-1.0"],
        "left lower corner",
    );
}

#[test]
fn draws_every_row_then_resets() {
    let output = run(&["3", "--size", "30x10", "--iterations", "500"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches(RESET).count(), 1);
    assert!(stdout.ends_with(RESET));
    let lines: Vec<&str> = stdout[..stdout.len() - RESET.len()].lines().collect();
    assert_eq!(lines.len(), 10);
    for line in lines {
        assert_eq!(line.matches('@').count(), 30);
        assert_eq!(line.matches("\x1b[38;5;").count(), 30);
    }
}

#[test]
fn thread_count_does_not_change_the_picture() {
    let args = ["--size", "45x25", "--iterations", "800"];
    let single = run(&["1", args[0], args[1], args[2], args[3]]);
    let many = run(&["7", args[0], args[1], args[2], args[3]]);
    assert!(single.status.success() && many.status.success());
    assert_eq!(single.stdout, many.stdout);
}

#[test]
fn default_view_is_ninety_by_fifty() {
    let output = run(&["4", "--iterations", "200"]);
    output.clone().assert().success();
    let newlines = output.stdout.iter().filter(|&&b| b == b'\n').count();
    assert_eq!(newlines, 50);
}

/// Start a render that is still drawing when `signal` lands, and
/// collect its exit code and everything it wrote.
fn interrupt_with(signal: Signal) -> (Option<i32>, String) {
    let mut child = mandelterm()
        .args(&["1", "--size", "200x200", "--iterations", "2000000"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut stdout = child.stdout.take().unwrap();

    // Output has started, so the handler is in place.
    let mut first = [0u8; 1];
    stdout.read_exact(&mut first).unwrap();
    kill(Pid::from_raw(child.id() as i32), signal).unwrap();

    let mut rest = vec![];
    stdout.read_to_end(&mut rest).unwrap();
    let status = child.wait().unwrap();

    let mut output = first.to_vec();
    output.extend(rest);
    (status.code(), String::from_utf8(output).unwrap())
}

#[test]
fn interrupt_resets_the_terminal_and_fails() {
    let (code, output) = interrupt_with(Signal::SIGINT);
    assert_eq!(code, Some(130));
    assert_eq!(output.matches(RESET).count(), 1);
    assert!(output.ends_with(RESET));
    assert!(output.lines().count() < 200);
}

#[test]
fn terminate_exits_the_way_a_shell_expects() {
    let (code, output) = interrupt_with(Signal::SIGTERM);
    assert_eq!(code, Some(143));
    assert_eq!(output.matches(RESET).count(), 1);
    assert!(output.ends_with(RESET));
}
