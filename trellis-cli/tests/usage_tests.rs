//! End-to-end tests of the usage subcommand.

use std::sync::Arc;

use anyhow::Result;
use pretty_assertions::assert_eq;
use trellis_core::{
    ArgCount, Argument, BoolFlag, BranchNode, Flag, FlagSet, Output, description, serial,
    serial_with,
};
use trellis_cli::{Cli, GraphCli, run_with_args};

fn kv_cli() -> Box<dyn Cli> {
    let put = serial(vec![
        Arc::new(Argument::<String>::new("KEY", "the key")),
        Arc::new(Argument::<Vec<String>>::list(
            "DATA",
            "values to store",
            1,
            ArgCount::Unbounded,
        )),
    ]);
    let get = serial(vec![Arc::new(Argument::<String>::new("KEY", "the key"))]);

    let node = serial_with(
        vec![
            description("Stores and retrieves key/value pairs."),
            Arc::new(FlagSet::new(vec![
                Arc::new(Flag::<String>::new("format", Some('f'), "output format")),
                Arc::new(BoolFlag::new("verbose", Some('v'), "enable verbose output")),
            ])),
        ],
        Arc::new(BranchNode::new(vec![("put", put), ("get", get)])),
    );
    Box::new(GraphCli::new("kv", node))
}

fn run_usage(clis: &[Box<dyn Cli>], args: &[&str]) -> (u8, String, String) {
    let (mut output, captured) = Output::captured();
    let code = run_with_args(
        clis,
        args.iter().map(ToString::to_string).collect(),
        &mut output,
    );
    (code, captured.stdout(), captured.stderr())
}

#[test]
fn usage_renders_all_blocks() -> Result<()> {
    let clis = vec![kv_cli()];
    let (code, stdout, _) = run_usage(&clis, &["usage", "kv"]);

    assert_eq!(code, 0);
    assert!(stdout.starts_with("Stores and retrieves key/value pairs.\n<\n"));
    assert!(stdout.contains("    get KEY\n"));
    assert!(stdout.contains("    put KEY DATA [ DATA ... ]\n"));
    assert!(stdout.contains("\nArguments:\n"));
    assert!(stdout.contains("  DATA: values to store\n"));
    assert!(stdout.contains("  KEY: the key\n"));
    assert!(stdout.contains("\nFlags:\n"));
    assert!(stdout.contains("  --format|-f FORMAT: output format\n"));
    assert!(stdout.contains("  --verbose|-v: enable verbose output\n"));
    assert!(stdout.contains("\nSymbols:\n  <: branch selection point\n"));
    Ok(())
}

#[test]
fn usage_arguments_block_is_sorted() -> Result<()> {
    let clis = vec![kv_cli()];
    let (_, stdout, _) = run_usage(&clis, &["usage", "kv"]);

    let args_block = stdout.split("Arguments:\n").nth(1).unwrap();
    assert!(args_block.find("DATA").unwrap() < args_block.find("KEY").unwrap());
    Ok(())
}

#[test]
fn usage_with_args_is_contextual() -> Result<()> {
    let clis = vec![kv_cli()];
    let (code, stdout, _) = run_usage(&clis, &["usage", "kv", "get"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("KEY: the key"));
    assert!(!stdout.contains("DATA"));
    Ok(())
}

#[test]
fn usage_unknown_cli_fails() -> Result<()> {
    let clis = vec![kv_cli()];
    let (code, _, stderr) = run_usage(&clis, &["usage", "nope"]);

    assert_eq!(code, 1);
    assert_eq!(stderr, "unknown CLI \"nope\"\n");
    Ok(())
}
