//! Dispatch from a host binary's subcommands into graph passes.

use std::sync::Arc;

use clap::Parser;
use trellis_core::error::ErrorKind;
use trellis_core::sys::CompType;
use trellis_core::{Data, Input, Node, Output, interp, sys};

use crate::args::{CommandLineArgs, HostCommand};

/// A command-line tool hosted by a binary: a name plus the graph expressing
/// its grammar, execution, and completion.
pub trait Cli {
    /// The name the tool is installed under.
    fn name(&self) -> &str;

    /// The root of the tool's command graph.
    fn node(&self) -> Arc<dyn Node>;
}

/// The simplest [`Cli`]: a name paired with a pre-built graph.
pub struct GraphCli {
    name: String,
    node: Arc<dyn Node>,
}

impl GraphCli {
    /// Returns a CLI hosting the given graph under the given name.
    pub fn new(name: impl Into<String>, node: Arc<dyn Node>) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

impl Cli for GraphCli {
    fn name(&self) -> &str {
        &self.name
    }

    fn node(&self) -> Arc<dyn Node> {
        self.node.clone()
    }
}

/// Runs the host binary against the process arguments and standard
/// streams, returning the process exit code.
pub fn run(clis: &[Box<dyn Cli>]) -> u8 {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut output = Output::stdio();
    run_with_args(clis, args, &mut output)
}

/// Runs the host binary against explicit subcommand arguments (without the
/// binary name) and the given output. Used directly by tests.
pub fn run_with_args(clis: &[Box<dyn Cli>], args: Vec<String>, output: &mut Output) -> u8 {
    let mut argv = vec!["trellis-host".to_string()];
    argv.extend(args);

    let parsed = match CommandLineArgs::try_parse_from(argv) {
        Ok(parsed) => parsed,
        Err(err) => {
            output.stderr(err.to_string());
            return 2;
        }
    };

    match parsed.command {
        HostCommand::Execute {
            cli,
            output_file,
            args,
        } => {
            let Some(cli) = find_cli(clis, &cli, output) else {
                return 1;
            };
            let node = cli.node();
            let mut input = Input::from_args(args);
            let mut data = Data::new();

            match interp::execute(&node, &mut input, output, &mut data) {
                Ok(exec_data) => {
                    let mut contents = exec_data.executable.join("\n");
                    if !contents.is_empty() {
                        contents.push('\n');
                    }
                    let perm = data.os().default_file_perm();
                    if let Err(err) = sys::write_file_with_perm(&output_file, &contents, perm) {
                        output.stderrln(err.to_string());
                        return err.exit_code();
                    }
                    0
                }
                Err(err) => {
                    // Extra-args failures already reported themselves (with
                    // the usage banner) inside the pass.
                    if !matches!(err.kind(), ErrorKind::ExtraArgs { .. }) {
                        output.stderrln(err.to_string());
                    }
                    err.exit_code()
                }
            }
        }

        HostCommand::Autocomplete {
            cli,
            comp_type,
            comp_point,
            comp_line,
            passthrough,
        } => {
            let Some(cli) = find_cli(clis, &cli, output) else {
                return 1;
            };
            let node = cli.node();
            let mut input = Input::from_comp_line(&comp_line, comp_point, &passthrough);
            let mut data = Data::new();
            let os = data.os();

            match interp::autocomplete(&node, &mut input, &mut data) {
                Ok(suggestions) => os.handle_autocomplete_success(output, &suggestions),
                Err(err) => {
                    tracing::debug!("completion failed: {err}");
                    os.handle_autocomplete_error(output, CompType::from_raw(comp_type), &err);
                }
            }
            0
        }

        HostCommand::Usage { cli, args } => {
            let Some(cli) = find_cli(clis, &cli, output) else {
                return 1;
            };
            let node = cli.node();
            let mut input = Input::from_args(args);
            let mut data = Data::new();

            match interp::usage(&node, &mut input, &mut data) {
                Ok(usage) => {
                    output.stdout(usage.to_string());
                    0
                }
                Err(err) => {
                    output.stderrln(err.to_string());
                    err.exit_code()
                }
            }
        }

        HostCommand::ListClis => {
            for name in sorted_names(clis) {
                output.stdoutln(name);
            }
            0
        }

        HostCommand::Source { suffix } => {
            let binary = match std::env::current_exe() {
                Ok(binary) => binary,
                Err(err) => {
                    output.stderrln(format!("cannot locate host binary: {err}"));
                    return 12;
                }
            };
            let names = sorted_names(clis);
            let script = sys::current_platform().source_script(&binary, &suffix, &names);
            output.stdout(script);
            0
        }
    }
}

fn sorted_names(clis: &[Box<dyn Cli>]) -> Vec<String> {
    let mut names: Vec<String> = clis.iter().map(|cli| cli.name().to_owned()).collect();
    names.sort();
    names
}

fn find_cli<'a>(clis: &'a [Box<dyn Cli>], name: &str, output: &mut Output) -> Option<&'a dyn Cli> {
    let found = clis.iter().find(|cli| cli.name() == name);
    if found.is_none() {
        output.stderrln(format!("unknown CLI {name:?}"));
    }
    found.map(|cli| cli.as_ref())
}

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("TRELLIS_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .init();
    });
}
