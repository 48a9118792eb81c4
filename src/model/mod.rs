use std::fmt::Display;

use thiserror::Error;

pub mod gomod;
pub mod license;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading go.mod file: {0}")]
    IO(#[from] std::io::Error),
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Missing directive `{0}` while parsing")]
    MissingKey(String),
    #[error("Invalid token pattern: {0}")]
    Pattern(#[from] regex_lite::Error),
}

/// Path of a Go module, as declared by the `module` directive of its go.mod file.
#[derive(Clone, Hash, Debug, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(s: String) -> Self {
        ModuleName(s)
    }
}

impl Display for ModuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ModuleName {
    fn from(s: String) -> Self {
        ModuleName(s)
    }
}

impl From<&str> for ModuleName {
    fn from(s: &str) -> Self {
        ModuleName(s.to_string())
    }
}

/// Path of a required package.
#[derive(Clone, Hash, Debug, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(s: String) -> Self {
        PackageName(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        PackageName(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        PackageName(s.to_string())
    }
}

/// Go toolchain version declared by the `go` directive. Empty when the
/// directive is missing.
#[derive(Clone, Hash, Debug, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct GoVersion(String);

impl GoVersion {
    pub fn new(s: String) -> Self {
        GoVersion(s)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for GoVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GoVersion {
    fn from(s: String) -> Self {
        GoVersion(s)
    }
}

impl From<&str> for GoVersion {
    fn from(s: &str) -> Self {
        GoVersion(s.to_string())
    }
}
