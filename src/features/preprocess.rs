//! Feature source preprocessing
//!
//! The hand-written feature file carries blocks that only apply to some
//! builds. A small C-style preprocessor selects them:
//!
//! ```text
//! #ifdef VARIANT
//! lookup digits { ... } digits;
//! #else
//! ...
//! #endif
//! ```
//!
//! Recognised directives are `#ifdef`, `#ifndef`, `#else`, `#endif`,
//! `#define`, `#undef` and `#include "file"`. Any other line starting with
//! `#` is an ordinary feature-file comment and passes through untouched.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::FeatureError;

/// Nested includes deeper than this are treated as a cycle
const MAX_INCLUDE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Conditional {
    /// Whether the enclosing block is emitting lines
    parent_active: bool,
    /// Whether the current branch condition holds
    taken: bool,
    seen_else: bool,
    line: usize,
}

impl Conditional {
    fn active(&self) -> bool {
        self.parent_active && self.taken
    }
}

/// Expands conditional blocks and includes in feature source text
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    defines: BTreeSet<String>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a macro for the following `#ifdef` checks
    pub fn define(&mut self, name: &str) -> &mut Self {
        self.defines.insert(name.to_string());
        self
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defines.contains(name)
    }

    /// Preprocess a feature file; includes resolve relative to its directory
    pub fn process_file(&mut self, path: &Path) -> Result<String, FeatureError> {
        self.process_file_at_depth(path, 0)
    }

    /// Preprocess feature text; includes resolve relative to `base_dir`
    pub fn process_str(&mut self, text: &str, base_dir: &Path) -> Result<String, FeatureError> {
        self.process(text, base_dir, "<input>", 0)
    }

    fn process_file_at_depth(&mut self, path: &Path, depth: usize) -> Result<String, FeatureError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(FeatureError::IncludeDepth(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| FeatureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.process(&text, &base_dir, &path.display().to_string(), depth)
    }

    fn process(
        &mut self,
        text: &str,
        base_dir: &Path,
        origin: &str,
        depth: usize,
    ) -> Result<String, FeatureError> {
        let mut output = String::with_capacity(text.len());
        let mut stack: Vec<Conditional> = Vec::new();
        let unexpected = |directive: &str, line: usize| FeatureError::UnexpectedDirective {
            directive: directive.to_string(),
            origin: origin.to_string(),
            line,
        };

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let active = stack.last().map_or(true, Conditional::active);

            let Some((directive, argument)) = parse_directive(raw_line) else {
                if active {
                    output.push_str(raw_line);
                    output.push('\n');
                }
                continue;
            };

            match directive {
                "ifdef" | "ifndef" => {
                    let name = require_name(argument, directive, origin, line_number)?;
                    let defined = self.is_defined(name);
                    stack.push(Conditional {
                        parent_active: active,
                        taken: if directive == "ifdef" { defined } else { !defined },
                        seen_else: false,
                        line: line_number,
                    });
                }
                "else" => {
                    let top = stack
                        .last_mut()
                        .ok_or_else(|| unexpected(directive, line_number))?;
                    if top.seen_else {
                        return Err(unexpected(directive, line_number));
                    }
                    top.taken = !top.taken;
                    top.seen_else = true;
                }
                "endif" => {
                    stack.pop().ok_or_else(|| unexpected(directive, line_number))?;
                }
                "define" if active => {
                    let name = require_name(argument, directive, origin, line_number)?;
                    self.defines.insert(name.to_string());
                }
                "undef" if active => {
                    let name = require_name(argument, directive, origin, line_number)?;
                    self.defines.remove(name);
                }
                "include" if active => {
                    let target = argument.trim_matches(|c| c == '"' || c == '<' || c == '>');
                    if target.is_empty() {
                        return Err(FeatureError::MissingArgument {
                            directive: directive.to_string(),
                            origin: origin.to_string(),
                            line: line_number,
                        });
                    }
                    let included = self.process_file_at_depth(&resolve(base_dir, target), depth + 1)?;
                    output.push_str(&included);
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FeatureError::Unterminated {
                origin: origin.to_string(),
                line: open.line,
            });
        }
        Ok(output)
    }
}

/// Split `#directive argument` lines; `None` for anything else.
///
/// A directive word followed by text that does not fit it (`#include kern
/// tweaks later`) is a comment. A directive with no argument at all stays a
/// directive so the missing argument is reported.
fn parse_directive(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix('#')?;
    let (word, argument) = match rest.find(char::is_whitespace) {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    };
    let argument = argument.trim();
    let well_formed = match word {
        "ifdef" | "ifndef" | "define" | "undef" => {
            argument.is_empty() || is_macro_name(argument)
        }
        "else" | "endif" => argument.is_empty(),
        "include" => argument.is_empty() || is_quoted_path(argument),
        _ => false,
    };
    well_formed.then_some((word, argument))
}

fn is_macro_name(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_quoted_path(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('<') && text.ends_with('>')))
}

fn require_name<'a>(
    argument: &'a str,
    directive: &str,
    origin: &str,
    line: usize,
) -> Result<&'a str, FeatureError> {
    argument
        .split_whitespace()
        .next()
        .ok_or_else(|| FeatureError::MissingArgument {
            directive: directive.to_string(),
            origin: origin.to_string(),
            line,
        })
}

fn resolve(base_dir: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base_dir.join(target)
    }
}
