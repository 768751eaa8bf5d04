//! Git-style configuration files
//!
//! Reads and edits files in git's config syntax: `.git/config`, `.gitmodules`
//! and the config of a submodule's git directory.
//!
//! ```text
//! [core]
//!     sparseCheckout = true
//! [submodule "lib"]
//!     path = lib
//! ```
//!
//! Section and key names are case-insensitive, subsection names are not.
//! Edits keep every untouched line byte for byte.

use crate::artifacts::index::lockfile::Lockfile;
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `[section]`, `[section "subsection"]` or the legacy `[section.subsection]`
const SECTION_REGEX: &str = r#"^\s*\[\s*([A-Za-z0-9.-]+)(?:\s+"((?:[^"\\]|\\.)*)")?\s*\]"#;

/// `key = value` or a bare `key`
const VARIABLE_REGEX: &str = r"^\s*([A-Za-z][A-Za-z0-9-]*)\s*(?:=(.*))?$";

#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionKey {
    name: String,
    subsection: Option<String>,
}

impl SectionKey {
    fn new(name: &str, subsection: Option<&str>) -> Self {
        SectionKey {
            name: name.to_ascii_lowercase(),
            subsection: subsection.map(str::to_string),
        }
    }

    fn header(&self) -> String {
        match &self.subsection {
            Some(subsection) => format!("[{} \"{}\"]", self.name, escape(subsection)),
            None => format!("[{}]", self.name),
        }
    }
}

#[derive(Debug, Clone)]
struct Variable {
    key: String,
    /// `None` for a bare key, which reads as boolean true
    value: Option<String>,
}

#[derive(Debug, Clone)]
struct Line {
    raw: String,
    section: Option<SectionKey>,
    variable: Option<Variable>,
}

#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    exists: bool,
    lines: Vec<Line>,
}

impl ConfigFile {
    /// Load a config file; a missing file reads as empty
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("Unable to read config file {}", path.display())));
            }
        };

        let exists = content.is_some();
        let mut config = Self::parse(content.as_deref().unwrap_or_default())
            .with_context(|| format!("bad config file {}", path.display()))?;
        config.path = path.to_path_buf();
        config.exists = exists;

        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let section_regex = regex::Regex::new(SECTION_REGEX)?;
        let variable_regex = regex::Regex::new(VARIABLE_REGEX)?;

        let mut section = None;
        let mut lines = Vec::new();

        for raw in content.lines() {
            let mut variable = None;

            if let Some(captures) = section_regex.captures(raw) {
                let name = &captures[1];
                section = Some(match captures.get(2) {
                    Some(subsection) => SectionKey::new(name, Some(&unescape(subsection.as_str()))),
                    None => match name.split_once('.') {
                        Some((name, subsection)) => {
                            SectionKey::new(name, Some(&subsection.to_ascii_lowercase()))
                        }
                        None => SectionKey::new(name, None),
                    },
                });
            } else if let Some(captures) = variable_regex.captures(raw) {
                variable = Some(Variable {
                    key: captures[1].to_ascii_lowercase(),
                    value: captures.get(2).map(|value| parse_value(value.as_str())),
                });
            }

            lines.push(Line {
                raw: raw.to_string(),
                section: section.clone(),
                variable,
            });
        }

        Ok(ConfigFile {
            path: PathBuf::new(),
            exists: false,
            lines,
        })
    }

    /// Read `other` as if its lines followed this file's, so its values win
    ///
    /// The result is meant for lookups: saving it would write both files here.
    pub fn layered(mut self, other: ConfigFile) -> Self {
        self.exists |= other.exists;
        self.lines.extend(other.lines);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    fn variables<'a>(
        &'a self,
        section: &'a SectionKey,
        key: &'a str,
    ) -> impl Iterator<Item = &'a Variable> + 'a {
        let key = key.to_ascii_lowercase();

        self.lines
            .iter()
            .filter(move |line| line.section.as_ref() == Some(section))
            .filter_map(|line| line.variable.as_ref())
            .filter(move |variable| variable.key == key)
    }

    /// Last value of `section[.subsection].key`
    pub fn get(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<String> {
        let section = SectionKey::new(section, subsection);

        self.variables(&section, key)
            .last()
            .map(|variable| variable.value.clone().unwrap_or_else(|| String::from("true")))
    }

    pub fn get_bool(
        &self,
        section: &str,
        subsection: Option<&str>,
        key: &str,
    ) -> anyhow::Result<Option<bool>> {
        let section_key = SectionKey::new(section, subsection);

        match self.variables(&section_key, key).last() {
            None => Ok(None),
            Some(Variable { value: None, .. }) => Ok(Some(true)),
            Some(Variable {
                value: Some(value), ..
            }) => parse_bool(value)
                .map(Some)
                .with_context(|| format!("bad boolean config value '{value}' for '{section}.{key}'")),
        }
    }

    /// Subsection of the first `section` whose `key` equals `value`
    pub fn find_subsection(&self, section: &str, key: &str, value: &str) -> Option<String> {
        let section = section.to_ascii_lowercase();
        let key = key.to_ascii_lowercase();

        self.lines
            .iter()
            .filter(|line| {
                line.section
                    .as_ref()
                    .is_some_and(|current| current.name == section && current.subsection.is_some())
            })
            .find(|line| {
                line.variable.as_ref().is_some_and(|variable| {
                    variable.key == key && variable.value.as_deref() == Some(value)
                })
            })
            .and_then(|line| line.section.as_ref())
            .and_then(|section| section.subsection.clone())
    }

    /// Set `section[.subsection].key`, replacing its last occurrence
    ///
    /// A new variable goes at the end of its section; a missing section is
    /// appended to the file.
    pub fn set(&mut self, section: &str, subsection: Option<&str>, key: &str, value: &str) {
        let section = SectionKey::new(section, subsection);
        let lowercase_key = key.to_ascii_lowercase();
        let line = Line {
            raw: format!("\t{key} = {}", format_value(value)),
            section: Some(section.clone()),
            variable: Some(Variable {
                key: lowercase_key.clone(),
                value: Some(value.to_string()),
            }),
        };

        let existing = self.lines.iter().rposition(|line| {
            line.section.as_ref() == Some(&section)
                && line
                    .variable
                    .as_ref()
                    .is_some_and(|variable| variable.key == lowercase_key)
        });
        if let Some(position) = existing {
            self.lines[position] = line;
            return;
        }

        match self
            .lines
            .iter()
            .rposition(|line| line.section.as_ref() == Some(&section))
        {
            Some(position) => self.lines.insert(position + 1, line),
            None => {
                self.lines.push(Line {
                    raw: section.header(),
                    section: Some(section.clone()),
                    variable: None,
                });
                self.lines.push(line);
            }
        }
    }

    pub fn serialize(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}\n", line.raw))
            .collect()
    }

    /// Write the file back through `<file>.lock`
    pub fn save(&mut self) -> anyhow::Result<()> {
        let mut lock = Lockfile::hold_for_update(&self.path)?;
        lock.file_mut()?
            .write_all(self.serialize().as_bytes())
            .with_context(|| format!("Unable to write config file {}", self.path.display()))?;
        lock.commit()?;

        self.exists = true;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Strip comments and quotes and resolve escapes of a raw value
fn parse_value(raw: &str) -> String {
    let mut value = String::new();
    let mut pending_space = String::new();
    let mut quoted = false;
    let mut chars = raw.trim_start().chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => quoted = !quoted,
            '#' | ';' if !quoted => break,
            '\\' => {
                value.push_str(&pending_space);
                pending_space.clear();
                match chars.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('b') => {
                        value.pop();
                    }
                    Some(other) => value.push(other),
                    None => {}
                }
            }
            c if c.is_whitespace() && !quoted => pending_space.push(c),
            c => {
                value.push_str(&pending_space);
                pending_space.clear();
                value.push(c);
            }
        }
    }

    value
}

fn format_value(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\t', "\\t");

    let needs_quotes = value.contains(['#', ';'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);

    match needs_quotes {
        true => format!("\"{escaped}\""),
        false => escaped,
    }
}

fn escape(subsection: &str) -> String {
    subsection.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(subsection: &str) -> String {
    let mut unescaped = String::new();
    let mut chars = subsection.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            c => unescaped.push(c),
        }
    }

    unescaped
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" | "" => Ok(false),
        number => number
            .parse::<i64>()
            .map(|number| number != 0)
            .map_err(|_| anyhow::anyhow!("not a boolean: {value}")),
    }
}
