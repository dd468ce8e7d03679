//! Host-shell adapters and generated shell artefacts.

use std::path::Path;

use crate::error::Error;
use crate::output::Output;

pub mod bash;
pub mod powershell;

/// The completion invocation type forwarded by the shell's `COMP_TYPE`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::FromRepr)]
#[repr(i32)]
pub enum CompType {
    /// `TAB`: normal completion.
    Standard = 9,
    /// `?`: list completions after successive tabs.
    List = 63,
    /// `!`: list alternatives on partial word completion.
    Alternatives = 33,
    /// `%`: menu completion.
    Menu = 37,
}

impl CompType {
    /// Converts the raw `COMP_TYPE` integer, when it names a known type.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::from_repr(raw)
    }
}

/// The host-OS adapter surface consumed by the engine: the shell-dialect
/// text for environment mutation and wrapper functions, completion result
/// handling, and generation of the sourceable integration script.
pub trait Os {
    /// Returns the adapter's name.
    fn name(&self) -> &'static str;

    /// Returns the shell line exporting an environment variable.
    fn set_env_var(&self, name: &str, value: &str) -> String;

    /// Returns the shell line unsetting an environment variable.
    fn unset_env_var(&self, name: &str) -> String;

    /// Returns the default permission bits for files written on behalf of
    /// the shell.
    fn default_file_perm(&self) -> u32;

    /// Wraps a body of shell code into a named function definition.
    fn function_wrap(&self, name: &str, body: &str) -> String;

    /// Writes completion suggestions for the shell's completion hook.
    fn handle_autocomplete_success(&self, output: &mut Output, suggestions: &[String]);

    /// Reports a completion failure: the error text is echoed only for the
    /// `?` trigger, and sentinel suggestions make the shell redraw the
    /// command line.
    fn handle_autocomplete_error(&self, output: &mut Output, comp_type: Option<CompType>, err: &Error);

    /// Returns the sourceable script that installs every hosted CLI as an
    /// interactive command: runner capture, execute wrapper, autocomplete
    /// wrapper, and per-CLI alias plus completion registration.
    fn source_script(&self, binary: &Path, suffix: &str, cli_names: &[String]) -> String;

    /// Returns the script installing an alias of a hosted CLI with some
    /// leading arguments frozen; completion passes the frozen arguments
    /// through.
    fn aliaser_script(&self, suffix: &str, alias: &str, target_cli: &str, fixed_args: &[String])
    -> String;
}

/// Returns the adapter for the platform this binary was built for.
/// Resolved once at binary start and never changed.
pub fn current_platform() -> &'static dyn Os {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            &powershell::POWERSHELL
        } else {
            &bash::BASH
        }
    }
}

/// Writes a file with the adapter's default permission bits applied (where
/// the platform supports them).
pub fn write_file_with_perm(path: &Path, contents: &str, perm: u32) -> Result<(), Error> {
    std::fs::write(path, contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if perm != 0 {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(perm))?;
        }
    }
    #[cfg(not(unix))]
    let _ = perm;
    Ok(())
}
