use std::path::Path;

use log::{debug, error};
use regex_lite::Regex;

use crate::model::{GoVersion, ModuleName, PackageName, ParseError};

const TOKEN_PATTERN: &str = r#""(?:[^"\\]|\\.)*"|`[^`]*`|[()]|[^\s()"`]+"#;

/// Directives that are valid in a go.mod file but carry nothing we compare.
const IGNORED_DIRECTIVES: [&str; 6] = ["exclude", "retract", "toolchain", "godebug", "tool", "ignore"];

/// A module path with an optional version, as used on either side of a
/// `replace` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModVersion {
    pub path: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub path: PackageName,
    pub version: String,
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: ModVersion,
    pub new: ModVersion,
}

/// The parts of a go.mod file needed to compare modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFile {
    pub module: ModuleName,
    pub go: GoVersion,
    pub require: Vec<Require>,
    pub replace: Vec<Replace>,
}

impl ModFile {
    pub fn from_file(path: &Path) -> Result<ModFile, ParseError> {
        ModFileParser::new()?.parse_file(path)
    }

    pub fn from_str(data: &str) -> Result<ModFile, ParseError> {
        ModFileParser::new()?.parse_str(data)
    }
}

/// Parses go.mod files, reusing one compiled tokenizer for all of them.
pub struct ModFileParser {
    tokenizer: Regex,
}

impl ModFileParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(ModFileParser {
            tokenizer: Regex::new(TOKEN_PATTERN)?,
        })
    }

    pub fn parse_file(&self, path: &Path) -> Result<ModFile, ParseError> {
        debug!("Attempting to read go.mod file {}", path.display());
        let contents = std::fs::read_to_string(path)?;

        let mod_file = self.parse_str(&contents);
        if let Err(err) = &mod_file {
            error!("Could not parse {} due to err {err}", path.display())
        }
        mod_file
    }

    pub fn parse_str(&self, data: &str) -> Result<ModFile, ParseError> {
        let mut builder = ModFileBuilder::default();
        let mut block: Option<(String, usize)> = None;

        for (index, raw) in data.lines().enumerate() {
            let line = index + 1;
            let (code, comment) = split_comment(raw);
            let tokens = tokenize(&self.tokenizer, code, line)?;
            if tokens.is_empty() {
                continue;
            }

            if block.is_some() && tokens.len() == 1 && tokens[0] == ")" {
                block = None;
                continue;
            }

            if let Some((verb, _)) = &block {
                builder.directive(verb, &tokens, comment, line)?;
                continue;
            }

            let (verb, args) = (&tokens[0], &tokens[1..]);
            match args {
                [open] if open == "(" => block = Some((verb.clone(), line)),
                [open, close] if open == "(" && close == ")" => builder.empty_block(verb, line)?,
                _ => builder.directive(verb, args, comment, line)?,
            }
        }

        if let Some((verb, line)) = block {
            return Err(ParseError::Syntax {
                line,
                message: format!("unterminated {verb} block"),
            });
        }

        builder.build()
    }
}

#[derive(Default)]
struct ModFileBuilder {
    module: Option<ModuleName>,
    go: GoVersion,
    require: Vec<Require>,
    replace: Vec<Replace>,
}

impl ModFileBuilder {
    fn directive(
        &mut self,
        verb: &str,
        args: &[String],
        comment: &str,
        line: usize,
    ) -> Result<(), ParseError> {
        match verb {
            "module" => match args {
                [path] => {
                    self.module = Some(ModuleName::new(path.clone()));
                    Ok(())
                }
                _ => Err(usage(line, "module module/path")),
            },
            "go" => match args {
                [version] => {
                    self.go = GoVersion::new(version.clone());
                    Ok(())
                }
                _ => Err(usage(line, "go 1.23")),
            },
            "require" => match args {
                [path, version] => {
                    self.require.push(Require {
                        path: PackageName::new(path.clone()),
                        version: version.clone(),
                        indirect: is_indirect(comment),
                    });
                    Ok(())
                }
                _ => Err(usage(line, "require module/path v1.2.3")),
            },
            "replace" => {
                let arrow = args
                    .iter()
                    .position(|arg| arg == "=>")
                    .ok_or_else(|| usage(line, "replace module/path [v1.2.3] => other/module v1.4"))?;
                let old = parse_mod_version(&args[..arrow]);
                let new = parse_mod_version(&args[arrow + 1..]);
                match (old, new) {
                    (Some(old), Some(new)) => {
                        self.replace.push(Replace { old, new });
                        Ok(())
                    }
                    _ => Err(usage(line, "replace module/path [v1.2.3] => other/module v1.4")),
                }
            }
            other if IGNORED_DIRECTIVES.contains(&other) => {
                debug!("Ignoring {other} directive on line {line}");
                Ok(())
            }
            other => Err(ParseError::Syntax {
                line,
                message: format!("unknown directive: {other}"),
            }),
        }
    }

    /// `require ()` and friends: valid, declares nothing.
    fn empty_block(&self, verb: &str, line: usize) -> Result<(), ParseError> {
        match verb {
            "require" | "replace" => Ok(()),
            other if IGNORED_DIRECTIVES.contains(&other) => Ok(()),
            other => Err(ParseError::Syntax {
                line,
                message: format!("unexpected empty {other} block"),
            }),
        }
    }

    fn build(self) -> Result<ModFile, ParseError> {
        let module = self
            .module
            .ok_or_else(|| ParseError::MissingKey("module".to_string()))?;

        Ok(ModFile {
            module,
            go: self.go,
            require: self.require,
            replace: self.replace,
        })
    }
}

fn usage(line: usize, usage: &str) -> ParseError {
    ParseError::Syntax {
        line,
        message: format!("usage: {usage}"),
    }
}

fn parse_mod_version(args: &[String]) -> Option<ModVersion> {
    match args {
        [path] => Some(ModVersion {
            path: path.clone(),
            version: String::new(),
        }),
        [path, version] => Some(ModVersion {
            path: path.clone(),
            version: version.clone(),
        }),
        _ => None,
    }
}

/// Splits a line into code and the text of its trailing `//` comment.
fn split_comment(raw: &str) -> (&str, &str) {
    match raw.find("//") {
        Some(position) => (&raw[..position], &raw[position + 2..]),
        None => (raw, ""),
    }
}

/// The go tool writes `// indirect`, optionally followed by `; other comments`.
fn is_indirect(comment: &str) -> bool {
    let comment = comment.trim();
    comment == "indirect" || comment.starts_with("indirect;")
}

fn tokenize(tokenizer: &Regex, code: &str, line: usize) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for token in tokenizer.find_iter(code) {
        if !code[last..token.start()].trim().is_empty() {
            return Err(ParseError::Syntax {
                line,
                message: format!("unexpected input `{}`", code[last..token.start()].trim()),
            });
        }
        tokens.push(unquote(token.as_str()));
        last = token.end();
    }

    if !code[last..].trim().is_empty() {
        return Err(ParseError::Syntax {
            line,
            message: format!("unexpected input `{}`", code[last..].trim()),
        });
    }

    Ok(tokens)
}

fn unquote(token: &str) -> String {
    if token.len() >= 2 && token.starts_with('`') && token.ends_with('`') {
        token[1..token.len() - 1].to_string()
    } else if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        let mut result = String::with_capacity(token.len());
        let mut chars = token[1..token.len() - 1].chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        result.push(escaped);
                    }
                }
                c => result.push(c),
            }
        }
        result
    } else {
        token.to_string()
    }
}
