// ABOUTME: SSH config parser turning Host blocks, settings and Include directives into a host registry
// ABOUTME: Include targets are glob-expanded and parsed recursively on a best-effort basis

use super::registry::{ConfigEntry, HostRegistry};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Nested includes deeper than this are skipped.
const MAX_INCLUDE_DEPTH: usize = 16;

/// Pattern used for settings that appear before the first `Host` line.
const GLOBAL_PATTERN: &str = "*";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not open SSH config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing SSH config {}:{line}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// A single meaningful config line, classified once at parse time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Host { patterns: Vec<String> },
    KeyValue { key: String, value: String },
    Include { patterns: Vec<String> },
}

/// Classifies one line. Blank lines and comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Directive>, String> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return Ok(None);
    }

    let keyword_end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let keyword = &line[..keyword_end];
    let rest = line[keyword_end..].trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim();

    if rest.is_empty() {
        return Err(format!("missing value for '{keyword}'"));
    }

    match keyword.to_lowercase().as_str() {
        "host" => Ok(Some(Directive::Host {
            patterns: split_arguments(rest)?,
        })),
        "include" => Ok(Some(Directive::Include {
            patterns: split_arguments(rest)?,
        })),
        "match" => Err("Match directives are not supported".to_string()),
        _ => Ok(Some(Directive::KeyValue {
            key: keyword.to_string(),
            value: unquote(rest)?,
        })),
    }
}

/// Cuts the line at a `#` that begins a token outside quotes.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut token_start = true;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if token_start && !in_quotes => return &line[..i],
            _ => {}
        }
        token_start = !in_quotes && (c.is_whitespace() || c == '=');
    }
    line
}

fn unquote(value: &str) -> Result<String, String> {
    match value.strip_prefix('"') {
        Some(inner) => inner
            .strip_suffix('"')
            .map(str::to_string)
            .ok_or_else(|| format!("unterminated quote in '{value}'")),
        None => Ok(value.to_string()),
    }
}

/// Splits a whitespace-separated argument list, honouring double quotes.
fn split_arguments(input: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(format!("unterminated quote in '{input}'"));
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

/// Entries defined directly in one file plus the include patterns it names,
/// both in document order.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub entries: Vec<ConfigEntry>,
    pub includes: Vec<String>,
}

pub fn parse_config_content(content: &str, path: &Path) -> Result<ParsedFile, ConfigError> {
    let mut parsed = ParsedFile::default();
    let mut current: Option<ConfigEntry> = None;

    for (index, line) in content.lines().enumerate() {
        let directive = parse_line(line).map_err(|message| ConfigError::Syntax {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        })?;

        match directive {
            None => {}
            Some(Directive::Host { patterns }) => {
                if let Some(entry) = current.replace(ConfigEntry::new(patterns)) {
                    parsed.entries.push(entry);
                }
            }
            Some(Directive::KeyValue { key, value }) => current
                .get_or_insert_with(|| ConfigEntry::new(vec![GLOBAL_PATTERN.to_string()]))
                .insert(&key, &value),
            Some(Directive::Include { patterns }) => parsed.includes.extend(patterns),
        }
    }

    if let Some(entry) = current {
        parsed.entries.push(entry);
    }

    Ok(parsed)
}

/// Loads a root config file and everything it includes.
///
/// The root file must be readable and well formed. Included files are
/// best-effort: unmatched globs, unreadable or malformed files, files already
/// visited during this load, and includes nested too deeply are skipped.
/// Skips are only reported at debug level.
pub struct ConfigLoader {
    home: Option<PathBuf>,
    visited: HashSet<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::with_home(dirs::home_dir())
    }

    pub fn with_home(home: Option<PathBuf>) -> Self {
        Self {
            home,
            visited: HashSet::new(),
        }
    }

    pub fn load(mut self, path: &Path) -> Result<HostRegistry, ConfigError> {
        self.mark_visited(path);
        let entries = self.load_file(path, 0)?;
        tracing::debug!(
            "Loaded {} host entries from {}",
            entries.len(),
            path.display()
        );
        Ok(HostRegistry::new(entries))
    }

    fn load_file(&mut self, path: &Path, depth: usize) -> Result<Vec<ConfigEntry>, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = parse_config_content(&content, path)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut entries = parsed.entries;

        for pattern in &parsed.includes {
            for include in self.resolve_include(pattern, base_dir) {
                entries.extend(self.load_include(&include, depth + 1));
            }
        }

        Ok(entries)
    }

    fn load_include(&mut self, path: &Path, depth: usize) -> Vec<ConfigEntry> {
        if depth > MAX_INCLUDE_DEPTH {
            tracing::debug!(
                "Skipping include {}: nested deeper than {} levels",
                path.display(),
                MAX_INCLUDE_DEPTH
            );
            return Vec::new();
        }

        if !self.mark_visited(path) {
            tracing::debug!("Skipping include {}: already loaded", path.display());
            return Vec::new();
        }

        match self.load_file(path, depth) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping include: {e}");
                Vec::new()
            }
        }
    }

    /// Returns false if the file was already visited during this load.
    fn mark_visited(&mut self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.visited.insert(key)
    }

    fn resolve_include(&self, pattern: &str, base_dir: &Path) -> Vec<PathBuf> {
        let full_pattern = self.expand_include_path(pattern, base_dir);
        let Some(pattern_str) = full_pattern.to_str() else {
            tracing::debug!("Skipping include with non UTF-8 path: {:?}", full_pattern);
            return Vec::new();
        };

        let paths = match glob::glob(pattern_str) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::debug!("Skipping invalid include pattern '{pattern}': {e}");
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::debug!("Error reading include match for '{pattern}': {e}");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        if files.is_empty() {
            tracing::debug!("Include pattern '{pattern}' matched no files");
        }
        files
    }

    fn expand_include_path(&self, pattern: &str, base_dir: &Path) -> PathBuf {
        let expanded = match (pattern.strip_prefix('~'), &self.home) {
            (Some(rest), Some(home)) => home.join(rest.trim_start_matches('/')),
            _ => PathBuf::from(pattern),
        };

        if expanded.is_absolute() {
            expanded
        } else {
            base_dir.join(expanded)
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_ssh_config(path: &Path) -> Result<HostRegistry, ConfigError> {
    ConfigLoader::new().load(path)
}
