//! The PowerShell adapter.

use std::fmt::Write;
use std::path::Path;

use super::{CompType, Os};
use crate::error::Error;
use crate::output::Output;

/// The adapter instance handed out by [`super::current_platform`] on
/// Windows hosts.
pub static POWERSHELL: PowerShell = PowerShell;

/// PowerShell-dialect implementation of the OS adapter.
pub struct PowerShell;

impl PowerShell {
    fn runner_path(suffix: &str) -> String {
        format!("$env:LOCALAPPDATA\\trellis\\bin\\_{suffix}_runner.exe")
    }

    fn quote(arg: &str) -> String {
        if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || matches!(c, '\'' | '"')) {
            format!("'{}'", arg.replace('\'', "''"))
        } else {
            arg.to_owned()
        }
    }
}

impl Os for PowerShell {
    fn name(&self) -> &'static str {
        "powershell"
    }

    fn set_env_var(&self, name: &str, value: &str) -> String {
        format!("$env:{name} = {}", Self::quote(value))
    }

    fn unset_env_var(&self, name: &str) -> String {
        format!("Remove-Item \"env:\\{name}\" -ErrorAction SilentlyContinue")
    }

    fn default_file_perm(&self) -> u32 {
        0
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
        // PowerShell's completer ignores empty results; no sentinels needed.
    }

    fn source_script(&self, binary: &Path, suffix: &str, cli_names: &[String]) -> String {
        let runner = Self::runner_path(suffix);
        let binary = binary.to_string_lossy();

        let mut script = String::new();
        let _ = writeln!(
            script,
            "$trellisRunnerDir = Join-Path $env:LOCALAPPDATA \"trellis\\bin\""
        );
        let _ = writeln!(
            script,
            "New-Item -ItemType Directory -Force -Path $trellisRunnerDir | Out-Null"
        );
        let _ = writeln!(script, "Copy-Item {} \"{runner}\"", Self::quote(&binary));
        script.push('\n');

        let execute_body = format!(
            r#"  $tmpFile = New-TemporaryFile
  & "{runner}" execute $args[0] $tmpFile.FullName @($args | Select-Object -Skip 1)
  $errorCode = $LASTEXITCODE
  if ($errorCode -eq 0) {{
    . $tmpFile.FullName
    if (-not $env:TRELLIS_DEBUG) {{
      Remove-Item $tmpFile.FullName
    }} else {{
      Write-Output $tmpFile.FullName
    }}
  }}
  $global:LASTEXITCODE = $errorCode"#
        );
        script.push_str(&self.function_wrap(&format!("_trellis_execute_{suffix}"), &execute_body));
        script.push('\n');

        let completer_body = format!(
            r#"  param($wordToComplete, $commandAst, $cursorPosition)
  $line = $commandAst.ToString()
  $cli = $commandAst.GetCommandName()
  & "{runner}" autocomplete $cli 9 $cursorPosition $line | ForEach-Object {{
    [System.Management.Automation.CompletionResult]::new($_, $_, 'ParameterValue', $_)
  }}"#
        );
        script.push_str(&self.function_wrap(
            &format!("_trellis_autocomplete_{suffix}"),
            &completer_body,
        ));
        script.push('\n');

        for cli in cli_names {
            let cli_body = format!("  _trellis_execute_{suffix} {cli} @args");
            script.push_str(&self.function_wrap(cli, &cli_body));
            let _ = writeln!(
                script,
                "Register-ArgumentCompleter -CommandName {cli} -Native -ScriptBlock ${{function:_trellis_autocomplete_{suffix}}}"
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

        let execute_body = format!("  _trellis_execute_{suffix} {target_cli}{fixed} @args");
        script.push_str(&self.function_wrap(alias, &execute_body));
        script.push('\n');

        let completer_body = format!(
            r#"  param($wordToComplete, $commandAst, $cursorPosition)
  $line = $commandAst.ToString()
  & "{runner}" autocomplete {target_cli} 9 $cursorPosition $line{fixed} | ForEach-Object {{
    [System.Management.Automation.CompletionResult]::new($_, $_, 'ParameterValue', $_)
  }}"#
        );
        script.push_str(&self.function_wrap(
            &format!("_trellis_alias_autocomplete_{alias}"),
            &completer_body,
        ));
        script.push('\n');

        let _ = writeln!(
            script,
            "Register-ArgumentCompleter -CommandName {alias} -Native -ScriptBlock ${{function:_trellis_alias_autocomplete_{alias}}}"
        );

        script
    }
}
