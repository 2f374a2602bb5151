// ABOUTME: In-memory registry of parsed SSH config Host blocks in document order
// ABOUTME: Provides first-match setting lookup by literal alias and listing of concrete aliases

use std::cell::OnceCell;
use std::fmt;

/// One `Host` block: its patterns and the settings that follow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigEntry {
    patterns: Vec<String>,
    settings: Vec<(String, String)>, // original key spelling, value
}

impl ConfigEntry {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            settings: Vec::new(),
        }
    }

    pub fn with_setting(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Records a setting unless the key was already set in this block.
    /// Keys compare case-insensitively and the first value wins.
    pub(crate) fn insert(&mut self, key: &str, value: &str) {
        if self.get(key).is_none() {
            self.settings.push((key.to_string(), value.to_string()));
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn settings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.settings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Literal match only; glob patterns are not expanded during lookup.
    pub fn matches_alias(&self, alias: &str) -> bool {
        self.patterns.iter().any(|p| p == alias)
    }
}

impl fmt::Display for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Host {}", self.patterns.join(" "))?;
        for (key, value) in self.settings() {
            let needs_quotes = value.is_empty()
                || value.starts_with('#')
                || value.contains(char::is_whitespace);
            if needs_quotes {
                writeln!(f, "    {key} \"{value}\"")?;
            } else {
                writeln!(f, "    {key} {value}")?;
            }
        }
        Ok(())
    }
}

fn is_concrete_alias(pattern: &str) -> bool {
    !pattern.contains(['*', '?']) && !pattern.starts_with('!')
}

#[derive(Clone, Debug, Default)]
pub struct HostRegistry {
    entries: Vec<ConfigEntry>,
    aliases: OnceCell<Vec<String>>,
}

impl HostRegistry {
    pub fn new(entries: Vec<ConfigEntry>) -> Self {
        Self {
            entries,
            aliases: OnceCell::new(),
        }
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Sorted, de-duplicated aliases that name a single host. Wildcard and
    /// negated patterns are templates and are left out.
    pub fn list_aliases(&self) -> &[String] {
        self.aliases.get_or_init(|| {
            let mut aliases: Vec<String> = self
                .entries
                .iter()
                .flat_map(|entry| entry.patterns.iter())
                .filter(|pattern| is_concrete_alias(pattern))
                .cloned()
                .collect();
            aliases.sort();
            aliases.dedup();
            aliases
        })
    }

    /// First value of `key` across every block naming `alias`, in document order.
    pub fn get(&self, alias: &str, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.matches_alias(alias))
            .find_map(|entry| entry.get(key))
    }

    /// Serializes the registry back into config syntax with includes flattened.
    pub fn to_config_string(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
