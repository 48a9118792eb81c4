use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::model::license::License;

const LICENSE_FILE_PREFIXES: [&str; 4] = ["LICENSE", "LICENCE", "COPYING", "UNLICENSE"];
const SPDX_TAG: &str = "spdx-license-identifier:";

/// Number of normalized characters holding a license title.
const TITLE_LENGTH: usize = 300;

/// Text fingerprints of commonly used licenses. `title` phrases must be
/// present near the start of the text, `body` phrases anywhere (lowercase,
/// whitespace collapsed). Titled licenses are checked first, in order.
struct Fingerprint {
    identifier: &'static str,
    title: &'static [&'static str],
    body: &'static [&'static str],
}

const FINGERPRINTS: [Fingerprint; 13] = [
    Fingerprint {
        identifier: "AGPL-3.0-only",
        title: &["gnu affero general public license version 3"],
        body: &[],
    },
    Fingerprint {
        identifier: "LGPL-3.0-only",
        title: &["gnu lesser general public license version 3"],
        body: &[],
    },
    Fingerprint {
        identifier: "LGPL-2.1-only",
        title: &["gnu lesser general public license version 2.1"],
        body: &[],
    },
    Fingerprint {
        identifier: "GPL-3.0-only",
        title: &["gnu general public license version 3"],
        body: &[],
    },
    Fingerprint {
        identifier: "GPL-2.0-only",
        title: &["gnu general public license version 2"],
        body: &[],
    },
    Fingerprint {
        identifier: "MPL-2.0",
        title: &["mozilla public license", "2.0"],
        body: &[],
    },
    Fingerprint {
        identifier: "EPL-2.0",
        title: &["eclipse public license", "2.0"],
        body: &[],
    },
    Fingerprint {
        identifier: "Apache-2.0",
        title: &["apache license", "version 2.0"],
        body: &[],
    },
    Fingerprint {
        identifier: "BSD-3-Clause",
        title: &[],
        body: &["redistribution and use in source and binary forms", "neither the name"],
    },
    Fingerprint {
        identifier: "BSD-2-Clause",
        title: &[],
        body: &["redistribution and use in source and binary forms"],
    },
    Fingerprint {
        identifier: "MIT",
        title: &[],
        body: &["permission is hereby granted, free of charge"],
    },
    Fingerprint {
        identifier: "ISC",
        title: &[],
        body: &["permission to use, copy, modify, and", "distribute this software for any purpose"],
    },
    Fingerprint {
        identifier: "Unlicense",
        title: &[],
        body: &["this is free and unencumbered software released into the public domain"],
    },
];

impl Fingerprint {
    fn matches(&self, title: &str, text: &str) -> bool {
        self.title.iter().all(|phrase| title.contains(phrase))
            && self.body.iter().all(|phrase| text.contains(phrase))
    }
}

/// Finds the license of the sources stored at a path.
///
/// Implementations never fail: anything that cannot be detected resolves to
/// `License::default()`.
pub trait LicenseResolver {
    fn resolve(&self, path: &Path) -> License;
}

/// Resolver used when licenses are not displayed, so no directory is scanned.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLicenseResolver;

impl LicenseResolver for NoLicenseResolver {
    fn resolve(&self, _path: &Path) -> License {
        License::default()
    }
}

/// Detects licenses by reading the license files at the top of a package
/// directory in the module cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryLicenseResolver;

impl LicenseResolver for DirectoryLicenseResolver {
    fn resolve(&self, path: &Path) -> License {
        let candidates = match license_files(path) {
            Ok(candidates) => candidates,
            Err(err) => {
                debug!("Could not list license files in {}: {err}", path.display());
                return License::default();
            }
        };

        for candidate in candidates {
            let text = match std::fs::read_to_string(&candidate) {
                Ok(text) => text,
                Err(err) => {
                    debug!("Could not read {}: {err}", candidate.display());
                    continue;
                }
            };

            let Some(identifier) = detect_identifier(&text) else {
                trace!("No known license text in {}", candidate.display());
                continue;
            };

            match License::from_spdx_identifier(&identifier) {
                Some(license) => {
                    debug!("Detected {} in {}", license.identifier, candidate.display());
                    return license;
                }
                None => debug!(
                    "Unknown license identifier {identifier} in {}",
                    candidate.display()
                ),
            }
        }

        License::default()
    }
}

fn license_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in path.read_dir()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_ascii_uppercase();
        if LICENSE_FILE_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
        {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn detect_identifier(text: &str) -> Option<String> {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if let Some(position) = normalized.find(SPDX_TAG) {
        let tagged = text
            .split_whitespace()
            .skip_while(|word| !word.eq_ignore_ascii_case("SPDX-License-Identifier:"))
            .nth(1);
        if let Some(identifier) = tagged {
            return Some(identifier.to_string());
        }
        trace!("Empty SPDX tag at offset {position}");
    }

    let title = match normalized.char_indices().nth(TITLE_LENGTH) {
        Some((end, _)) => &normalized[..end],
        None => normalized.as_str(),
    };

    FINGERPRINTS
        .iter()
        .find(|fingerprint| fingerprint.matches(title, &normalized))
        .map(|fingerprint| fingerprint.identifier.to_string())
}
