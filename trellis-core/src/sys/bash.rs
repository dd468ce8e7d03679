//! The bash shell adapter.

use std::fmt::Write;
use std::path::Path;

use super::{CompType, Os};
use crate::error::Error;
use crate::output::Output;

/// The adapter instance handed out by [`super::current_platform`] on
/// POSIX hosts.
pub static BASH: Bash = Bash;

/// Bash-dialect implementation of the OS adapter.
pub struct Bash;

impl Bash {
    fn runner_path(suffix: &str) -> String {
        format!("${{XDG_CACHE_HOME:-$HOME/.cache}}/trellis/bin/_{suffix}_runner")
    }

    fn quote(arg: &str) -> String {
        if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | '\\' | '$' | '`')) {
            format!("'{}'", arg.replace('\'', "'\\''"))
        } else {
            arg.to_owned()
        }
    }
}

impl Os for Bash {
    fn name(&self) -> &'static str {
        "bash"
    }

    fn set_env_var(&self, name: &str, value: &str) -> String {
        format!("export {name}={}", Self::quote(value))
    }

    fn unset_env_var(&self, name: &str) -> String {
        format!("unset {name}")
    }

    fn default_file_perm(&self) -> u32 {
        0o644
    }

    fn function_wrap(&self, name: &str, body: &str) -> String {
        format!("function {name} {{\n{body}\n}}\n")
    }

    fn handle_autocomplete_success(&self, output: &mut Output, suggestions: &[String]) {
        for suggestion in suggestions {
            output.stdoutln(suggestion);
        }
    }

    fn handle_autocomplete_error(&self, output: &mut Output, comp_type: Option<CompType>, err: &Error) {
        if comp_type == Some(CompType::List) {
            output.stderrln(format!("\n{err}"));
        }
        // Two distinct tokens with no common prefix: the shell finds nothing
        // to fill in and redraws the command line unchanged.
        output.stdoutln("\t");
        output.stdoutln(" ");
    }

    fn source_script(&self, binary: &Path, suffix: &str, cli_names: &[String]) -> String {
        let runner = Self::runner_path(suffix);
        let binary = binary.to_string_lossy();

        let mut script = String::from("#!/bin/bash\n");
        let _ = writeln!(
            script,
            "mkdir -p \"${{XDG_CACHE_HOME:-$HOME/.cache}}/trellis/bin\""
        );
        let _ = writeln!(script, "cp {} \"{runner}\"", Self::quote(&binary));
        let _ = writeln!(script, "chmod +x \"{runner}\"");
        script.push('\n');

        let execute_body = format!(
            r#"  local tmpFile="$(mktemp)"
  "{runner}" execute "$1" "$tmpFile" "${{@:2}}"
  local errorCode=$?
  if [ $errorCode -eq 0 ]; then
    source "$tmpFile"
    if [ -z "$TRELLIS_DEBUG" ]; then
      rm "$tmpFile"
    else
      echo "$tmpFile"
    fi
  fi
  return $errorCode"#
        );
        script.push_str(&self.function_wrap(&format!("_trellis_execute_{suffix}"), &execute_body));
        script.push('\n');

        let autocomplete_body = format!(
            r#"  local tFile="$(mktemp)"
  "{runner}" autocomplete "${{COMP_WORDS[0]}}" "$COMP_TYPE" "$COMP_POINT" "$COMP_LINE" > "$tFile"
  local IFS=$'\n'
  COMPREPLY=( $(cat "$tFile") )
  rm "$tFile""#
        );
        script.push_str(&self.function_wrap(
            &format!("_trellis_autocomplete_{suffix}"),
            &autocomplete_body,
        ));
        script.push('\n');

        for cli in cli_names {
            let _ = writeln!(script, "alias {cli}='_trellis_execute_{suffix} {cli}'");
            let _ = writeln!(
                script,
                "complete -F _trellis_autocomplete_{suffix} -o nosort {cli}"
            );
        }

        script
    }

    fn aliaser_script(
        &self,
        suffix: &str,
        alias: &str,
        target_cli: &str,
        fixed_args: &[String],
    ) -> String {
        let runner = Self::runner_path(suffix);
        let quoted_fixed: Vec<String> = fixed_args.iter().map(|arg| Self::quote(arg)).collect();
        let fixed = if quoted_fixed.is_empty() {
            String::new()
        } else {
            format!(" {}", quoted_fixed.join(" "))
        };

        let mut script = String::new();

        let execute_body =
            format!("  _trellis_execute_{suffix} {target_cli}{fixed} \"$@\"");
        script.push_str(&self.function_wrap(&format!("_trellis_alias_execute_{alias}"), &execute_body));
        script.push('\n');

        let autocomplete_body = format!(
            r#"  local tFile="$(mktemp)"
  "{runner}" autocomplete {target_cli} "$COMP_TYPE" "$COMP_POINT" "$COMP_LINE"{fixed} > "$tFile"
  local IFS=$'\n'
  COMPREPLY=( $(cat "$tFile") )
  rm "$tFile""#
        );
        script.push_str(&self.function_wrap(
            &format!("_trellis_alias_autocomplete_{alias}"),
            &autocomplete_body,
        ));
        script.push('\n');

        let _ = writeln!(script, "alias {alias}='_trellis_alias_execute_{alias}'");
        let _ = writeln!(
            script,
            "complete -F _trellis_alias_autocomplete_{alias} -o nosort {alias}"
        );

        script
    }
}
