//! End-to-end tests of the execute subcommand.

use std::sync::Arc;

use anyhow::Result;
use pretty_assertions::assert_eq;
use trellis_core::{
    ArgCount, Argument, BranchNode, Output, executable, executor, serial, serial_with, validate,
};
use trellis_cli::{Cli, GraphCli, run_with_args};

fn echo_cli() -> Box<dyn Cli> {
    let node = serial(vec![
        Arc::new(
            Argument::<String>::new("KEY", "the key")
                .validate(validate::matches_regex("^[a-zA-Z0-9_.-]+$")),
        ),
        executor(|output, data| {
            output.stdoutln(data.string("KEY").unwrap_or_default());
            Ok(())
        }),
    ]);
    Box::new(GraphCli::new("echo", node))
}

fn kv_cli() -> Box<dyn Cli> {
    let put = serial(vec![
        Arc::new(Argument::<String>::new("KEY", "the key")),
        Arc::new(Argument::<Vec<String>>::list(
            "DATA",
            "values to store",
            1,
            ArgCount::Unbounded,
        )),
        executor(|output, data| {
            let values = data.string_list("DATA").unwrap_or_default().join(" ");
            output.stdoutln(format!("{}={values}", data.string("KEY").unwrap_or_default()));
            Ok(())
        }),
    ]);
    let get = serial(vec![Arc::new(Argument::<String>::new("KEY", "the key"))]);
    let list = serial(vec![]);

    let node = serial_with(
        vec![],
        Arc::new(BranchNode::new(vec![("put", put), ("get", get), ("list", list)])),
    );
    Box::new(GraphCli::new("kv", node))
}

fn env_cli() -> Box<dyn Cli> {
    let node = serial(vec![
        executable(|_, _| Ok(vec!["export X=1".to_string()])),
        executable(|_, _| Ok(vec!["cd /tmp".to_string()])),
    ]);
    Box::new(GraphCli::new("env", node))
}

fn run_host(clis: &[Box<dyn Cli>], args: &[&str]) -> (u8, String, String) {
    let (mut output, captured) = Output::captured();
    let code = run_with_args(
        clis,
        args.iter().map(ToString::to_string).collect(),
        &mut output,
    );
    (code, captured.stdout(), captured.stderr())
}

#[test]
fn execute_echoes_validated_key() -> Result<()> {
    let clis = vec![echo_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    let (code, stdout, stderr) = run_host(
        &clis,
        &["execute", "echo", out_file.to_str().unwrap(), "abc"],
    );

    assert_eq!(code, 0);
    assert_eq!(stdout, "abc\n");
    assert_eq!(stderr, "");
    Ok(())
}

#[test]
fn execute_reports_validation_failure() -> Result<()> {
    let clis = vec![echo_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    let (code, stdout, stderr) = run_host(
        &clis,
        &["execute", "echo", out_file.to_str().unwrap(), "abc-$"],
    );

    assert_eq!(code, 6);
    assert_eq!(stdout, "");
    assert_eq!(
        stderr,
        "validation for \"KEY\" failed: [MatchesRegex] value \"abc-$\" doesn't match regex \"^[a-zA-Z0-9_.-]+$\"\n"
    );
    Ok(())
}

#[test]
fn execute_empty_branch_input_lists_choices() -> Result<()> {
    let clis = vec![kv_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    let (code, _, stderr) = run_host(&clis, &["execute", "kv", out_file.to_str().unwrap()]);

    assert_eq!(code, 5);
    assert_eq!(stderr, "Branching argument must be one of [get list put]\n");
    Ok(())
}

#[test]
fn execute_unbounded_list_consumes_everything() -> Result<()> {
    let clis = vec![kv_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    let (code, stdout, _) = run_host(
        &clis,
        &["execute", "kv", out_file.to_str().unwrap(), "put", "KEY", "a", "b", "c"],
    );

    assert_eq!(code, 0);
    assert_eq!(stdout, "KEY=a b c\n");
    Ok(())
}

#[test]
fn execute_writes_executable_lines_to_file() -> Result<()> {
    let clis = vec![env_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    let (code, _, _) = run_host(&clis, &["execute", "env", out_file.to_str().unwrap()]);

    assert_eq!(code, 0);
    assert_eq!(std::fs::read_to_string(&out_file)?, "export X=1\ncd /tmp\n");
    Ok(())
}

#[test]
fn execute_extra_args_prints_usage_banner() -> Result<()> {
    let clis = vec![echo_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    let (code, _, stderr) = run_host(
        &clis,
        &["execute", "echo", out_file.to_str().unwrap(), "abc", "surplus"],
    );

    assert_eq!(code, 3);
    assert!(stderr.starts_with("Unprocessed extra args: [surplus]\n"));
    assert!(stderr.contains("======= Command Usage =======\n"));
    assert!(stderr.contains("KEY: the key"));
    Ok(())
}

#[test]
fn execute_unknown_cli_fails() -> Result<()> {
    let clis = vec![echo_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    let (code, _, stderr) = run_host(
        &clis,
        &["execute", "missing", out_file.to_str().unwrap()],
    );

    assert_eq!(code, 1);
    assert_eq!(stderr, "unknown CLI \"missing\"\n");
    Ok(())
}

#[test]
fn execute_forwards_hyphenated_args() -> Result<()> {
    let clis = vec![echo_cli()];
    let dir = tempfile::tempdir()?;
    let out_file = dir.path().join("exec");

    // "-v" must reach the graph as data, not be eaten by the host grammar.
    let (code, stdout, stderr) = run_host(
        &clis,
        &["execute", "echo", out_file.to_str().unwrap(), "-v"],
    );

    assert_eq!(code, 0, "{stderr}");
    assert_eq!(stdout, "-v\n");
    Ok(())
}
