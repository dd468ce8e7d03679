//! Completion results and the suggestion-processing pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::data::Data;
use crate::error::Error;
use crate::processor::Node;
use crate::trace_categories;

/// Suffix appended to a lone candidate to keep the shell from adding a
/// trailing space after common-prefix auto-fill.
const SPACELESS_SENTINEL: char = '_';

/// A callback run after a deferred completion's sub-graph has executed; it
/// may rewrite the suggestions using the data the sub-graph gathered.
pub type Finalizer = Box<dyn Fn(Completion, &mut Data) -> Result<Completion, Error>>;

/// A completion whose content depends on running a sub-graph first. The
/// driver executes `graph` (with output black-holed) and then applies
/// `finalizer`.
pub struct DeferredCompletion {
    /// The sub-graph to execute before finalizing, if any.
    pub graph: Option<Arc<dyn Node>>,
    /// The finalizer to apply afterwards, if any.
    pub finalizer: Option<Finalizer>,
}

/// The result of completing a single token, plus metadata controlling how
/// the suggestions are filtered, sorted, and quoted.
#[derive(Default)]
pub struct Completion {
    /// The candidate suggestions.
    pub suggestions: Vec<String>,
    /// Skips prefix filtering (the suggestions are already filtered).
    pub ignore_filter: bool,
    /// Appends a space-only suggestion so the shell cannot collapse the
    /// candidates to a common prefix.
    pub dont_complete: bool,
    /// Filters prefix matches case-insensitively.
    pub case_insensitive: bool,
    /// Sorts suggestions case-insensitively.
    pub case_insensitive_sort: bool,
    /// When exactly one candidate survives, emits a sentinel second
    /// suggestion so the shell completes without appending a space.
    pub spaceless: bool,
    /// Deferred-completion instructions, if any.
    pub deferred: Option<DeferredCompletion>,
}

impl Completion {
    /// Returns a completion over the given suggestions.
    pub fn new<I, S>(suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suggestions: suggestions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns a deferred completion: `graph` is executed (output
    /// black-holed), then `finalizer` rewrites the suggestions.
    pub fn deferred(graph: Option<Arc<dyn Node>>, finalizer: Finalizer) -> Self {
        Self {
            deferred: Some(DeferredCompletion {
                graph,
                finalizer: Some(finalizer),
            }),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("suggestions", &self.suggestions)
            .field("ignore_filter", &self.ignore_filter)
            .field("dont_complete", &self.dont_complete)
            .field("deferred", &self.deferred.is_some())
            .finish()
    }
}

/// Runs the post-traversal suggestion pipeline: prefix filter, sort, space
/// escaping/quoting, then the spaceless and don't-complete sentinels.
pub(crate) fn process(completion: Completion, partial: &str, delimiter: Option<char>) -> Vec<String> {
    let mut suggestions = completion.suggestions;

    if !completion.ignore_filter {
        if completion.case_insensitive {
            let partial = partial.to_lowercase();
            suggestions.retain(|s| s.to_lowercase().starts_with(&partial));
        } else {
            suggestions.retain(|s| s.starts_with(partial));
        }
    }

    if completion.case_insensitive_sort {
        suggestions.sort_by_key(|s| s.to_lowercase());
    } else {
        suggestions.sort();
    }

    let mut suggestions: Vec<String> = suggestions
        .into_iter()
        .map(|s| escape_spaces(&s, delimiter))
        .collect();

    if completion.spaceless && suggestions.len() == 1 {
        let sentinel = format!("{}{SPACELESS_SENTINEL}", suggestions[0]);
        suggestions.push(sentinel);
    }

    if completion.dont_complete {
        suggestions.push(" ".to_string());
    }

    suggestions
}

/// Escapes or quotes a suggestion containing spaces. Inside a quoted region
/// the active delimiter wraps the suggestion; outside, spaces are
/// backslash-escaped.
fn escape_spaces(s: &str, delimiter: Option<char>) -> String {
    if !s.contains(' ') {
        return s.to_owned();
    }
    match delimiter {
        Some(d) => format!("{d}{s}{d}"),
        None => s.replace(' ', "\\ "),
    }
}

/// Completes file and directory names under a base directory.
///
/// Directories are suggested with a trailing `/`. When every match shares a
/// common prefix strictly extending the partial, only the auto-fill pair is
/// emitted so the shell extends the word in place; a lone directory match
/// gets the same treatment so the shell stops at the slash.
pub struct FileCompleter {
    directory: Option<PathBuf>,
    regex: Option<fancy_regex::Regex>,
    file_types: Vec<String>,
    dirs_only: bool,
    distinct: bool,
    exclude: Option<Box<dyn Fn(&str) -> bool>>,
}

impl FileCompleter {
    /// Returns a completer over the current working directory.
    pub fn new() -> Self {
        Self {
            directory: None,
            regex: None,
            file_types: Vec::new(),
            dirs_only: false,
            distinct: false,
            exclude: None,
        }
    }

    /// Completes relative to the given base directory instead of the
    /// working directory.
    pub fn in_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Keeps only entries whose name matches the pattern.
    pub fn matching(mut self, pattern: &str) -> Self {
        self.regex = Some(fancy_regex::Regex::new(pattern).expect("invalid file completion regex"));
        self
    }

    /// Keeps only files with one of the given extensions (directories are
    /// always kept).
    pub fn with_file_types<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_types = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Suggests directories only.
    pub fn dirs_only(mut self) -> Self {
        self.dirs_only = true;
        self
    }

    /// Subtracts values already provided to the owning argument.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Drops entries for which the predicate returns true.
    pub fn exclude(mut self, predicate: impl Fn(&str) -> bool + 'static) -> Self {
        self.exclude = Some(Box::new(predicate));
        self
    }

    /// Generates completions for the given partial path, subtracting any
    /// previously-provided values when this completer is distinct.
    pub fn complete(&self, partial: &str, prior: &[String]) -> Result<Completion, Error> {
        let (dir_part, base) = match partial.rfind('/') {
            Some(i) => partial.split_at(i + 1),
            None => ("", partial),
        };

        let mut search_dir = self.directory.clone().unwrap_or_else(|| PathBuf::from("."));
        if !dir_part.is_empty() {
            search_dir = search_dir.join(dir_part);
        }

        let Ok(entries) = std::fs::read_dir(&search_dir) else {
            tracing::debug!(
                target: trace_categories::COMPLETION,
                "cannot list {search_dir:?}; no file completions"
            );
            return Ok(Completion::default());
        };

        let base_lower = base.to_lowercase();
        let mut matches: Vec<String> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

            if name.starts_with('.') && !base.starts_with('.') {
                continue;
            }
            if !name.to_lowercase().starts_with(&base_lower) {
                continue;
            }
            if let Some(regex) = &self.regex {
                if !regex.is_match(&name).unwrap_or(false) {
                    continue;
                }
            }
            if self.dirs_only && !is_dir {
                continue;
            }
            if !is_dir && !self.file_types.is_empty() {
                let matched = self
                    .file_types
                    .iter()
                    .any(|ext| name.ends_with(&format!(".{ext}")));
                if !matched {
                    continue;
                }
            }
            if let Some(exclude) = &self.exclude {
                if exclude(&name) {
                    continue;
                }
            }

            let slash = if is_dir { "/" } else { "" };
            matches.push(format!("{dir_part}{name}{slash}"));
        }

        if self.distinct {
            matches.retain(|m| !prior.contains(m));
        }
        matches.sort_by_key(|m| m.to_lowercase());

        // One match: a directory needs the spaceless pair so the shell stops
        // at the slash; a file can take the usual trailing space.
        if matches.len() == 1 {
            let only = matches.remove(0);
            let mut completion = Completion::new([only.clone()]);
            completion.ignore_filter = true;
            if only.ends_with('/') {
                completion.suggestions.push(format!("{only}{SPACELESS_SENTINEL}"));
            }
            return Ok(completion);
        }

        // Several matches sharing a prefix beyond the partial: emit just the
        // auto-fill pair and let the shell extend the word in place.
        if let Some(prefix) = common_prefix(&matches) {
            if prefix.len() > partial.len() {
                let mut completion =
                    Completion::new([prefix.clone(), format!("{prefix}{SPACELESS_SENTINEL}")]);
                completion.ignore_filter = true;
                return Ok(completion);
            }
        }

        let mut completion = Completion::new(matches);
        completion.ignore_filter = true;
        completion.case_insensitive_sort = true;
        completion.dont_complete = !completion.suggestions.is_empty();
        Ok(completion)
    }
}

impl Default for FileCompleter {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the longest case-insensitive common prefix of the given strings,
/// realized with the casing of the first one. `None` for an empty input.
fn common_prefix(strings: &[String]) -> Option<String> {
    let first = strings.first()?;
    let mut len = first.len();
    for s in &strings[1..] {
        let mut shared = 0;
        for (a, b) in first.chars().zip(s.chars()) {
            if !a.eq_ignore_ascii_case(&b) {
                break;
            }
            shared += a.len_utf8();
        }
        len = len.min(shared);
    }
    Some(first[..len].to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn processed(completion: Completion, partial: &str) -> Vec<String> {
        process(completion, partial, None)
    }

    #[test]
    fn test_filter_and_sort() {
        let completion = Completion::new(["beta", "alpha", "alps", "gamma"]);
        assert_eq!(processed(completion, "al"), vec!["alpha", "alps"]);
    }

    #[test]
    fn test_case_insensitive_filter() {
        let mut completion = Completion::new(["Alpha", "beta"]);
        completion.case_insensitive = true;
        assert_eq!(processed(completion, "a"), vec!["Alpha"]);
    }

    #[test]
    fn test_ignore_filter() {
        let mut completion = Completion::new(["x", "y"]);
        completion.ignore_filter = true;
        assert_eq!(processed(completion, "zzz"), vec!["x", "y"]);
    }

    #[test]
    fn test_space_escaping() {
        let completion = Completion::new(["a b"]);
        assert_eq!(processed(completion, "a"), vec!["a\\ b"]);

        let completion = Completion::new(["a b"]);
        assert_eq!(process(completion, "a", Some('"')), vec!["\"a b\""]);
    }

    #[test]
    fn test_dont_complete_sentinel() {
        let mut completion = Completion::new(["one", "two"]);
        completion.dont_complete = true;
        assert_eq!(processed(completion, ""), vec!["one", "two", " "]);
    }

    #[test]
    fn test_spaceless_single_candidate() {
        let mut completion = Completion::new(["only"]);
        completion.spaceless = true;
        assert_eq!(processed(completion, "o"), vec!["only", "only_"]);
    }

    #[test]
    fn test_common_prefix() {
        let strings = vec!["color/".to_string(), "colors".to_string()];
        assert_eq!(common_prefix(&strings), Some("color".to_string()));

        let strings = vec!["cache/".to_string(), "cmd/".to_string()];
        assert_eq!(common_prefix(&strings), Some("c".to_string()));
    }

    mod file_completer {
        use pretty_assertions::assert_eq;

        use super::*;

        fn scratch_dir() -> tempfile::TempDir {
            let dir = tempfile::tempdir().unwrap();
            for sub in ["cache", "cmd", "color"] {
                std::fs::create_dir(dir.path().join(sub)).unwrap();
            }
            std::fs::write(dir.path().join("main.rs"), "").unwrap();
            std::fs::write(dir.path().join("notes.txt"), "").unwrap();
            dir
        }

        #[test]
        fn test_ambiguous_listing_has_dont_complete() {
            let dir = scratch_dir();
            let completer = FileCompleter::new().in_dir(dir.path()).dirs_only();
            let completion = completer.complete("c", &[]).unwrap();

            assert_eq!(
                process(completion, "c", None),
                vec!["cache/", "cmd/", "color/", " "]
            );
        }

        #[test]
        fn test_single_directory_gets_spaceless_pair() {
            let dir = scratch_dir();
            let completer = FileCompleter::new().in_dir(dir.path());
            let completion = completer.complete("co", &[]).unwrap();

            assert_eq!(process(completion, "co", None), vec!["color/", "color/_"]);
        }

        #[test]
        fn test_common_prefix_autofill() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("prefix_one"), "").unwrap();
            std::fs::write(dir.path().join("prefix_two"), "").unwrap();

            let completer = FileCompleter::new().in_dir(dir.path());
            let completion = completer.complete("pre", &[]).unwrap();

            assert_eq!(
                process(completion, "pre", None),
                vec!["prefix_", "prefix__"]
            );
        }

        #[test]
        fn test_single_file_completes_plainly() {
            let dir = scratch_dir();
            let completer = FileCompleter::new().in_dir(dir.path());
            let completion = completer.complete("ma", &[]).unwrap();

            assert_eq!(process(completion, "ma", None), vec!["main.rs"]);
        }

        #[test]
        fn test_file_type_filter() {
            let dir = scratch_dir();
            let completer = FileCompleter::new()
                .in_dir(dir.path())
                .with_file_types(["txt"]);
            let completion = completer.complete("n", &[]).unwrap();

            assert_eq!(process(completion, "n", None), vec!["notes.txt"]);
        }

        #[test]
        fn test_distinct_subtracts_prior() {
            let dir = scratch_dir();
            let completer = FileCompleter::new().in_dir(dir.path()).distinct();
            let prior = vec!["main.rs".to_string()];
            let fresh = completer.complete("ma", &[]).unwrap();
            let repeated = completer.complete("ma", &prior).unwrap();

            assert_eq!(fresh.suggestions, vec!["main.rs"]);
            assert!(repeated.suggestions.is_empty());
        }

        #[test]
        fn test_subdirectory_paths_keep_dir_part() {
            let dir = scratch_dir();
            std::fs::write(dir.path().join("cache").join("entry"), "").unwrap();

            let completer = FileCompleter::new().in_dir(dir.path());
            let completion = completer.complete("cache/e", &[]).unwrap();

            assert_eq!(process(completion, "cache/e", None), vec!["cache/entry"]);
        }
    }
}
