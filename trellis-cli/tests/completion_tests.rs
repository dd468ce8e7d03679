//! End-to-end tests of the autocomplete subcommand.

use std::sync::Arc;

use anyhow::Result;
use pretty_assertions::assert_eq;
use trellis_core::{
    ArgCount, Argument, BranchNode, FileCompleter, Flag, FlagSet, Output, serial, serial_with,
    validate,
};
use trellis_cli::{Cli, GraphCli, run_with_args};

fn kv_cli() -> Box<dyn Cli> {
    let put = serial(vec![Arc::new(
        Argument::<String>::new("KEY", "the key").complete_with_values(["existing", "extra"]),
    )]);
    let get = serial(vec![Arc::new(Argument::<String>::new("KEY", "the key"))]);
    let list = serial(vec![]);

    let node = serial_with(
        vec![],
        Arc::new(BranchNode::new(vec![("put", put), ("get", get), ("list", list)])),
    );
    Box::new(GraphCli::new("kv", node))
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

/// Completes the given line with the cursor at its end, the way the shell
/// wrapper invokes the binary on TAB.
fn complete(clis: &[Box<dyn Cli>], cli: &str, line: &str) -> (String, String) {
    let point = line.len().to_string();
    let (code, stdout, stderr) =
        run_host(clis, &["autocomplete", cli, "9", &point, line]);
    assert_eq!(code, 0);
    (stdout, stderr)
}

#[test]
fn complete_branch_names() -> Result<()> {
    let clis = vec![kv_cli()];

    let (stdout, _) = complete(&clis, "kv", "kv ");
    assert_eq!(stdout, "get\nlist\nput\n");

    let (stdout, _) = complete(&clis, "kv", "kv pu");
    assert_eq!(stdout, "put\n");
    Ok(())
}

#[test]
fn complete_after_branch_token() -> Result<()> {
    let clis = vec![kv_cli()];

    let (stdout, _) = complete(&clis, "kv", "kv put e");
    assert_eq!(stdout, "existing\nextra\n");
    Ok(())
}

#[test]
fn complete_is_idempotent_after_accepting_suggestion() -> Result<()> {
    let clis = vec![kv_cli()];

    // A completed branch token followed by a space completes the next
    // argument, not the branch again.
    let (stdout, _) = complete(&clis, "kv", "kv put ");
    assert_eq!(stdout, "existing\nextra\n");
    Ok(())
}

#[test]
fn complete_honours_cursor_position() -> Result<()> {
    let clis = vec![kv_cli()];

    // The cursor sits right after "pu"; the trailing text is ignored.
    let line = "kv pu ignored";
    let (code, stdout, _) = run_host(&clis, &["autocomplete", "kv", "9", "5", line]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "put\n");
    Ok(())
}

#[test]
fn complete_directories_with_sentinels() -> Result<()> {
    let dir = tempfile::tempdir()?;
    for sub in ["cache", "cmd", "color"] {
        std::fs::create_dir(dir.path().join(sub))?;
    }

    let node = serial(vec![Arc::new(
        Argument::<String>::new("PATH", "a path")
            .complete_files(FileCompleter::new().in_dir(dir.path())),
    )]);
    let clis: Vec<Box<dyn Cli>> = vec![Box::new(GraphCli::new("files", node))];

    // No single extension beyond "c": full listing plus the
    // don't-complete sentinel.
    let (stdout, _) = complete(&clis, "files", "files c");
    assert_eq!(stdout, "cache/\ncmd/\ncolor/\n \n");

    // "co" names exactly one directory: the auto-fill pair stops the
    // shell at the slash.
    let (stdout, _) = complete(&clis, "files", "files co");
    assert_eq!(stdout, "color/\ncolor/_\n");
    Ok(())
}

#[test]
fn complete_distinct_list_argument() -> Result<()> {
    let node = serial(vec![Arc::new(
        Argument::<Vec<String>>::list("ITEMS", "items", 1, ArgCount::Unbounded)
            .complete_with_values(["alpha", "beta", "gamma"])
            .distinct(),
    )]);
    let clis: Vec<Box<dyn Cli>> = vec![Box::new(GraphCli::new("pick", node))];

    let (stdout, _) = complete(&clis, "pick", "pick alpha ");
    assert_eq!(stdout, "beta\ngamma\n");
    Ok(())
}

#[test]
fn complete_flag_names_and_values() -> Result<()> {
    let node = serial(vec![
        Arc::new(FlagSet::new(vec![Arc::new(
            Flag::<String>::new("format", Some('f'), "output format")
                .complete_with_values(["json", "yaml"]),
        )])),
        Arc::new(Argument::<String>::optional("NAME", "")),
    ]);
    let clis: Vec<Box<dyn Cli>> = vec![Box::new(GraphCli::new("fmt", node))];

    let (stdout, _) = complete(&clis, "fmt", "fmt --f");
    assert_eq!(stdout, "--format\n");

    let (stdout, _) = complete(&clis, "fmt", "fmt --format ");
    assert_eq!(stdout, "json\nyaml\n");
    Ok(())
}

#[test]
fn complete_error_echo_on_question_mark_trigger() -> Result<()> {
    let node = serial(vec![
        Arc::new(Argument::<String>::new("KEY", "").validate(validate::min_length(5))),
        Arc::new(Argument::<String>::new("NEXT", "").complete_with_values(["never"])),
    ]);
    let clis: Vec<Box<dyn Cli>> = vec![Box::new(GraphCli::new("strict", node))];

    // The first argument fails validation while the cursor is on the
    // second; with COMP_TYPE=63 the error is echoed before the redraw
    // sentinels.
    let line = "strict ab x";
    let point = line.len().to_string();
    let (code, stdout, stderr) =
        run_host(&clis, &["autocomplete", "strict", "63", &point, line]);

    assert_eq!(code, 0);
    assert_eq!(stdout, "\t\n \n");
    assert!(stderr.starts_with("\nvalidation for \"KEY\" failed: [MinLength]"));
    Ok(())
}

#[test]
fn complete_error_is_silent_on_plain_tab() -> Result<()> {
    let node = serial(vec![
        Arc::new(Argument::<String>::new("KEY", "").validate(validate::min_length(5))),
        Arc::new(Argument::<String>::new("NEXT", "").complete_with_values(["never"])),
    ]);
    let clis: Vec<Box<dyn Cli>> = vec![Box::new(GraphCli::new("strict", node))];

    let line = "strict ab x";
    let point = line.len().to_string();
    let (code, stdout, stderr) =
        run_host(&clis, &["autocomplete", "strict", "9", &point, line]);

    assert_eq!(code, 0);
    assert_eq!(stdout, "\t\n \n");
    assert_eq!(stderr, "");
    Ok(())
}

#[test]
fn complete_with_passthrough_args() -> Result<()> {
    let clis = vec![kv_cli()];

    // An alias wrapper freezes "put" ahead of the typed arguments; the
    // graph sees it as if the user had typed it.
    let line = "kvput e";
    let point = line.len().to_string();
    let (code, stdout, _) = run_host(
        &clis,
        &["autocomplete", "kv", "9", &point, line, "put"],
    );

    assert_eq!(code, 0);
    assert_eq!(stdout, "existing\nextra\n");
    Ok(())
}

#[test]
fn complete_inside_quotes_wraps_suggestions() -> Result<()> {
    let node = serial(vec![Arc::new(
        Argument::<String>::new("NAME", "").complete_with_values(["first second", "firstmost"]),
    )]);
    let clis: Vec<Box<dyn Cli>> = vec![Box::new(GraphCli::new("q", node))];

    let (stdout, _) = complete(&clis, "q", "q \"first");
    assert_eq!(stdout, "\"first second\"\nfirstmost\n");
    Ok(())
}
