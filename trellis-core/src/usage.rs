//! Accumulation and formatting of command usage documents.

use std::collections::BTreeSet;
use std::fmt::Write;

/// A documented argument entry in the `Arguments:` block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArgDoc {
    /// The argument's name.
    pub name: String,
    /// The argument's description.
    pub description: String,
}

/// A glyph used in the usage summary, explained in the `Symbols:` legend.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum UsageSymbol {
    /// `<`: the point at which a branch selects a subcommand.
    Branch,
    /// `*`: a section that can be captured behind an alias.
    Alias,
    /// `^`: a section whose results may be served from a cache.
    Cache,
}

impl UsageSymbol {
    /// Returns the glyph shown in the summary line.
    pub const fn glyph(self) -> char {
        match self {
            Self::Branch => '<',
            Self::Alias => '*',
            Self::Cache => '^',
        }
    }

    /// Returns the legend text for this glyph.
    pub const fn legend(self) -> &'static str {
        match self {
            Self::Branch => "branch selection point",
            Self::Alias => "aliasable section",
            Self::Cache => "cacheable section",
        }
    }
}

/// The usage document accumulated across a graph's usage pass.
#[derive(Default)]
pub struct Usage {
    /// One-paragraph description of the command.
    pub description: String,
    /// Tokens of the one-line summary, in graph order.
    pub usage: Vec<String>,
    /// Per-branch summary lines, rendered indented under the summary.
    pub branches: Vec<String>,
    /// Flag block lines.
    pub flags: Vec<String>,
    /// Argument block entries; rendered sorted by name.
    pub arguments: Vec<ArgDoc>,
    /// Symbols used in the summary.
    pub symbols: BTreeSet<UsageSymbol>,
}

impl Usage {
    /// Sets the command description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Appends a token to the summary line.
    pub fn push_usage(&mut self, token: impl Into<String>) {
        self.usage.push(token.into());
    }

    /// Appends a flag block line, ignoring duplicates.
    pub fn add_flag(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !self.flags.contains(&line) {
            self.flags.push(line);
        }
    }

    /// Appends an argument block entry, ignoring duplicate names.
    pub fn add_arg(&mut self, name: impl Into<String>, description: impl Into<String>) {
        let name = name.into();
        if self.arguments.iter().any(|doc| doc.name == name) {
            return;
        }
        self.arguments.push(ArgDoc {
            name,
            description: description.into(),
        });
    }

    /// Records a symbol as used in the summary.
    pub fn add_symbol(&mut self, symbol: UsageSymbol) {
        self.symbols.insert(symbol);
    }

    /// Folds a branch child's usage into this document: its summary becomes
    /// an indented branch line and its blocks are merged.
    pub(crate) fn absorb_branch(&mut self, name: &str, child: Self) {
        let summary = child.usage.join(" ");
        let line = if summary.is_empty() {
            name.to_owned()
        } else {
            format!("{name} {summary}")
        };
        self.branches.push(line);
        for nested in child.branches {
            self.branches.push(format!("    {nested}"));
        }

        for doc in child.arguments {
            self.add_arg(doc.name, doc.description);
        }
        for flag in child.flags {
            self.add_flag(flag);
        }
        self.symbols.extend(child.symbols);
    }
}

impl std::fmt::Display for Usage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();

        if !self.description.is_empty() {
            let _ = writeln!(out, "{}", self.description);
        }
        let _ = writeln!(out, "{}", self.usage.join(" "));
        for branch in &self.branches {
            let _ = writeln!(out, "    {branch}");
        }

        if !self.arguments.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Arguments:");
            let mut sorted = self.arguments.clone();
            sorted.sort_by(|a, b| a.name.cmp(&b.name));
            for doc in sorted {
                let _ = writeln!(out, "  {}: {}", doc.name, doc.description);
            }
        }

        if !self.flags.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Flags:");
            for flag in &self.flags {
                let _ = writeln!(out, "  {flag}");
            }
        }

        if !self.symbols.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Symbols:");
            for symbol in &self.symbols {
                let _ = writeln!(out, "  {}: {}", symbol.glyph(), symbol.legend());
            }
        }

        write!(f, "{out}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_blocks_in_fixed_order() {
        let mut usage = Usage::default();
        usage.set_description("Stores key/value pairs.");
        usage.push_usage("KEY");
        usage.push_usage("VALUE");
        usage.add_arg("VALUE", "the value");
        usage.add_arg("KEY", "the key");
        usage.add_flag("--verbose|-v: enable verbose output");
        usage.add_symbol(UsageSymbol::Branch);

        assert_eq!(
            usage.to_string(),
            "Stores key/value pairs.\n\
             KEY VALUE\n\
             \n\
             Arguments:\n\
             \x20 KEY: the key\n\
             \x20 VALUE: the value\n\
             \n\
             Flags:\n\
             \x20 --verbose|-v: enable verbose output\n\
             \n\
             Symbols:\n\
             \x20 <: branch selection point\n"
        );
    }

    #[test]
    fn test_arguments_sorted_but_summary_in_graph_order() {
        let mut usage = Usage::default();
        usage.push_usage("ZETA");
        usage.push_usage("ALPHA");
        usage.add_arg("ZETA", "z");
        usage.add_arg("ALPHA", "a");

        let text = usage.to_string();
        assert!(text.starts_with("ZETA ALPHA\n"));
        let args_block = text.split("Arguments:\n").nth(1).unwrap();
        assert!(args_block.find("ALPHA").unwrap() < args_block.find("ZETA").unwrap());
    }

    #[test]
    fn test_absorb_branch() {
        let mut usage = Usage::default();
        usage.push_usage("<");

        let mut child = Usage::default();
        child.push_usage("KEY");
        child.add_arg("KEY", "the key");

        usage.absorb_branch("get", child);

        let text = usage.to_string();
        assert!(text.contains("    get KEY\n"));
        assert!(text.contains("  KEY: the key"));
    }
}
