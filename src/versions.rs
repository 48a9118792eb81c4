use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

use crate::{
    license::LicenseResolver,
    model::{
        gomod::{ModFile, ModFileParser},
        license::License,
        GoVersion, ModuleName, PackageName, ParseError,
    },
};

#[derive(Error, Debug)]
pub enum VersionsError {
    #[error("Error parsing {}: {source}", .path.display())]
    ModFile { path: PathBuf, source: ParseError },
    #[error("Error preparing go.mod parser: {0}")]
    Parser(#[from] ParseError),
}

/// A package required by a module, after `replace` directives were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    pub name: PackageName,
    pub version: String,
    pub indirect: bool,
    pub replaced_path: String,
    pub replaced_version: String,
    pub license: License,
}

impl Package {
    /// Version in effect once the replacement, if any, is taken into account.
    pub fn effective_version(&self) -> &str {
        if self.replaced_version.is_empty() {
            &self.version
        } else {
            &self.replaced_version
        }
    }

    pub fn is_replaced(&self) -> bool {
        !self.replaced_path.is_empty() || !self.replaced_version.is_empty()
    }

    /// Location of the package sources inside the module cache.
    pub fn path(&self, mod_cache: &Path) -> PathBuf {
        let (path, version) = if self.replaced_path.is_empty() {
            (self.name.as_str(), self.version.as_str())
        } else {
            (self.replaced_path.as_str(), self.replaced_version.as_str())
        };

        if version.is_empty() {
            mod_cache.join(path)
        } else {
            mod_cache.join(format!("{path}@{version}"))
        }
    }

    /// Two modules require a package the same way when version, indirect
    /// marker and replacement all match.
    pub fn same_requirement(&self, other: &Package) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.indirect == other.indirect
            && self.replaced_path == other.replaced_path
            && self.replaced_version == other.replaced_version
    }
}

/// The contents of a go.mod file. Requirements keep the order of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub name: ModuleName,
    pub go_version: GoVersion,
    requirements: Vec<Package>,
    index: HashMap<PackageName, usize>,
}

impl Module {
    pub fn new(name: ModuleName, go_version: GoVersion) -> Self {
        Module {
            name,
            go_version,
            ..Default::default()
        }
    }

    pub fn from_mod_file(mod_file: ModFile) -> Module {
        let mut module = Module::new(mod_file.module, mod_file.go);

        for require in mod_file.require {
            module.require(Package {
                name: require.path,
                version: require.version,
                indirect: require.indirect,
                ..Default::default()
            });
        }

        for replace in mod_file.replace {
            match module.requirement_mut(&PackageName::from(replace.old.path.as_str())) {
                Some(package) => {
                    package.replaced_path = replace.new.path;
                    package.replaced_version = replace.new.version;
                }
                None => debug!(
                    "Skipping replace of {} in {}: not required",
                    replace.old.path, module.name
                ),
            }
        }

        module
    }

    /// Adds a requirement; requiring the same package again overwrites it in place.
    pub fn require(&mut self, package: Package) {
        match self.index.get(&package.name) {
            Some(&position) => self.requirements[position] = package,
            None => {
                self.index
                    .insert(package.name.clone(), self.requirements.len());
                self.requirements.push(package);
            }
        }
    }

    pub fn requirement(&self, name: &PackageName) -> Option<&Package> {
        self.index
            .get(name)
            .map(|&position| &self.requirements[position])
    }

    fn requirement_mut(&mut self, name: &PackageName) -> Option<&mut Package> {
        match self.index.get(name) {
            Some(&position) => self.requirements.get_mut(position),
            None => None,
        }
    }

    pub fn requirements(&self) -> &[Package] {
        &self.requirements
    }
}

/// Running agreement over a sequence of values: the first value is the
/// baseline and the first value that differs from it clears `same` for good.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Agreement<T> {
    baseline: T,
    same: bool,
}

impl<T> Agreement<T> {
    fn new(baseline: T) -> Self {
        Agreement {
            baseline,
            same: true,
        }
    }

    fn observe(&mut self, value: &T, equal: impl FnOnce(&T, &T) -> bool) {
        if self.same && !equal(&self.baseline, value) {
            self.same = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGoVersion {
    pub name: ModuleName,
    pub go_version: GoVersion,
}

/// Go versions used by the modules, in the order they were set.
#[derive(Debug, Clone, Default)]
pub struct GoVersions {
    order: Vec<ModuleName>,
    values: HashMap<ModuleName, GoVersion>,
    agreement: Option<Agreement<GoVersion>>,
}

impl GoVersions {
    /// Records the Go version of a module. Modules without a `go` directive
    /// do not take part in the agreement.
    pub fn set(&mut self, name: ModuleName, version: GoVersion) {
        if !version.is_empty() {
            match &mut self.agreement {
                Some(agreement) => agreement.observe(&version, |a, b| a == b),
                None => self.agreement = Some(Agreement::new(version.clone())),
            }
        }

        if !self.values.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.values.insert(name, version);
    }

    /// True when every module uses the same Go version.
    pub fn is_same(&self) -> bool {
        match &self.agreement {
            Some(agreement) => agreement.same,
            None => !self.order.is_empty(),
        }
    }

    pub fn values(&self) -> Vec<ModuleGoVersion> {
        self.order
            .iter()
            .map(|name| ModuleGoVersion {
                name: name.clone(),
                go_version: self.values.get(name).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct PackageEntry {
    agreement: Agreement<Package>,
    modules: Vec<(ModuleName, Package)>,
}

/// Packages required by all modules, keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct Packages {
    names: Vec<PackageName>,
    entries: HashMap<PackageName, PackageEntry>,
}

impl Packages {
    /// Records the package as required by the module.
    pub fn set(&mut self, module: ModuleName, package: Package) {
        match self.entries.get_mut(&package.name) {
            Some(entry) => {
                entry
                    .agreement
                    .observe(&package, |baseline, package| baseline.same_requirement(package));
                match entry.modules.iter_mut().find(|(name, _)| name == &module) {
                    Some((_, existing)) => *existing = package,
                    None => entry.modules.push((module, package)),
                }
            }
            None => {
                self.names.push(package.name.clone());
                self.entries.insert(
                    package.name.clone(),
                    PackageEntry {
                        agreement: Agreement::new(package.clone()),
                        modules: vec![(module, package)],
                    },
                );
            }
        }
    }

    /// True when every module requiring the package requires it the same way.
    pub fn is_same(&self, name: &PackageName) -> bool {
        self.entries
            .get(name)
            .map(|entry| entry.agreement.same)
            .unwrap_or(false)
    }

    /// Package names in the order they were first required.
    pub fn names(&self) -> &[PackageName] {
        &self.names
    }

    /// Modules requiring the package, in the order they were set.
    pub fn values(&self, name: &PackageName) -> &[(ModuleName, Package)] {
        self.entries
            .get(name)
            .map(|entry| entry.modules.as_slice())
            .unwrap_or_default()
    }
}

/// Modules, Go versions and packages of all parsed go.mod files.
#[derive(Debug, Clone, Default)]
pub struct Versions {
    modules: Vec<Module>,
    index: HashMap<ModuleName, usize>,
    pub go_versions: GoVersions,
    pub packages: Packages,
}

impl Versions {
    /// Parses the files and aggregates them in the given order.
    pub fn from_files<P, R>(
        files: &[P],
        mod_cache: &Path,
        resolver: &R,
    ) -> Result<Versions, VersionsError>
    where
        P: AsRef<Path>,
        R: LicenseResolver,
    {
        let mod_files = parse_mod_files(files)?;
        Ok(Versions::aggregate(mod_files, mod_cache, resolver))
    }

    pub fn aggregate<R: LicenseResolver>(
        mod_files: impl IntoIterator<Item = ModFile>,
        mod_cache: &Path,
        resolver: &R,
    ) -> Versions {
        let mut aggregator = Aggregator::new(mod_cache, resolver);
        for mod_file in mod_files {
            aggregator.push(mod_file);
        }
        aggregator.finish()
    }

    /// Modules in aggregation order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, name: &ModuleName) -> Option<&Module> {
        self.index.get(name).map(|&position| &self.modules[position])
    }

    fn insert_module(&mut self, module: Module) {
        match self.index.get(&module.name) {
            Some(&position) => self.modules[position] = module,
            None => {
                self.index.insert(module.name.clone(), self.modules.len());
                self.modules.push(module);
            }
        }
    }
}

/// Folds parsed go.mod files into `Versions`, one file at a time.
///
/// Licenses are resolved at most once per package location.
pub struct Aggregator<'a, R> {
    mod_cache: &'a Path,
    resolver: &'a R,
    licenses: HashMap<PathBuf, License>,
    versions: Versions,
}

impl<'a, R: LicenseResolver> Aggregator<'a, R> {
    pub fn new(mod_cache: &'a Path, resolver: &'a R) -> Self {
        Aggregator {
            mod_cache,
            resolver,
            licenses: HashMap::new(),
            versions: Versions::default(),
        }
    }

    pub fn push(&mut self, mod_file: ModFile) {
        let mut module = Module::from_mod_file(mod_file);
        debug!(
            "Aggregating {} (go {}) with {} requirements",
            module.name,
            module.go_version,
            module.requirements.len()
        );

        self.versions
            .go_versions
            .set(module.name.clone(), module.go_version.clone());

        for package in module.requirements.iter_mut() {
            package.license = self.license(package);
            self.versions
                .packages
                .set(module.name.clone(), package.clone());
        }

        self.versions.insert_module(module);
    }

    pub fn finish(self) -> Versions {
        info!(
            "Compared {} modules requiring {} packages",
            self.versions.modules.len(),
            self.versions.packages.names.len()
        );
        self.versions
    }

    fn license(&mut self, package: &Package) -> License {
        let path = package.path(self.mod_cache);
        let resolver = self.resolver;
        self.licenses
            .entry(path)
            .or_insert_with_key(|path| resolver.resolve(path))
            .clone()
    }
}

/// Parses all go.mod files in order. The first failure aborts.
pub fn parse_mod_files<P: AsRef<Path>>(files: &[P]) -> Result<Vec<ModFile>, VersionsError> {
    let parser = ModFileParser::new()?;
    files
        .iter()
        .map(|file| {
            let path = file.as_ref();
            parser
                .parse_file(path)
                .map_err(|source| VersionsError::ModFile {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    use crate::{
        license::NoLicenseResolver,
        model::{
            gomod::{ModVersion, Replace, Require},
            license::LicenseCategory,
        },
    };
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingResolver {
        calls: RefCell<Vec<PathBuf>>,
    }

    impl LicenseResolver for RecordingResolver {
        fn resolve(&self, path: &Path) -> License {
            self.calls.borrow_mut().push(path.to_path_buf());
            License {
                identifier: "MIT".to_string(),
                name: "MIT License".to_string(),
                short_name: "MIT".to_string(),
                category: Some(LicenseCategory::Permissive),
            }
        }
    }

    fn mod_file(module: &str, go: &str, require: &[(&str, &str)]) -> ModFile {
        ModFile {
            module: ModuleName::from(module),
            go: GoVersion::from(go),
            require: require
                .iter()
                .map(|(path, version)| Require {
                    path: PackageName::from(*path),
                    version: version.to_string(),
                    indirect: false,
                })
                .collect(),
            replace: vec![],
        }
    }

    fn package(name: &str, version: &str) -> Package {
        Package {
            name: PackageName::from(name),
            version: version.to_string(),
            ..Default::default()
        }
    }

    fn fixtures() -> Vec<PathBuf> {
        let root = project_root::get_project_root().unwrap();
        vec![
            root.join("resources/new_module_indirect.mod"),
            root.join("resources/new_module_replace.mod"),
            root.join("resources/new_module_simple.mod"),
        ]
    }

    #[test]
    fn go_versions_single() {
        let mut go_versions = GoVersions::default();
        go_versions.set(ModuleName::from("Name"), GoVersion::from("Version"));

        assert!(go_versions.is_same());
        assert_eq!(
            go_versions.values(),
            vec![ModuleGoVersion {
                name: ModuleName::from("Name"),
                go_version: GoVersion::from("Version"),
            }]
        );
    }

    #[test]
    fn go_versions_not_same() {
        let mut go_versions = GoVersions::default();
        go_versions.set(ModuleName::from("A"), GoVersion::from("1.13"));
        go_versions.set(ModuleName::from("B"), GoVersion::from("1.14"));
        go_versions.set(ModuleName::from("C"), GoVersion::from("1.13"));

        assert!(!go_versions.is_same());
        let names = go_versions
            .values()
            .into_iter()
            .map(|value| value.name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                ModuleName::from("A"),
                ModuleName::from("B"),
                ModuleName::from("C")
            ]
        );
    }

    #[test]
    fn go_versions_never_revert() {
        let mut go_versions = GoVersions::default();
        go_versions.set(ModuleName::from("A"), GoVersion::from("1.13"));
        go_versions.set(ModuleName::from("B"), GoVersion::from("1.14"));
        go_versions.set(ModuleName::from("C"), GoVersion::from("1.13"));
        go_versions.set(ModuleName::from("D"), GoVersion::from("1.13"));

        assert!(!go_versions.is_same());
    }

    #[test]
    fn go_versions_ignore_missing_directive() {
        let mut go_versions = GoVersions::default();
        assert!(!go_versions.is_same());

        go_versions.set(ModuleName::from("A"), GoVersion::default());
        assert!(go_versions.is_same());

        go_versions.set(ModuleName::from("B"), GoVersion::from("1.14"));
        go_versions.set(ModuleName::from("C"), GoVersion::default());
        go_versions.set(ModuleName::from("D"), GoVersion::from("1.14"));
        assert!(go_versions.is_same());
    }

    #[test]
    fn packages_all_the_same() {
        let mut packages = Packages::default();
        packages.set(ModuleName::from("Module1"), package("pkg", "v1"));
        packages.set(ModuleName::from("Module2"), package("pkg", "v1"));
        packages.set(ModuleName::from("Module3"), package("pkg", "v1"));

        assert!(packages.is_same(&PackageName::from("pkg")));
        assert_eq!(packages.values(&PackageName::from("pkg")).len(), 3);
    }

    #[test]
    fn packages_different_never_revert() {
        let mut packages = Packages::default();
        packages.set(ModuleName::from("Module1"), package("pkg", "v1"));
        packages.set(ModuleName::from("Module2"), package("pkg", "v2"));
        packages.set(ModuleName::from("Module3"), package("pkg", "v1"));

        assert!(!packages.is_same(&PackageName::from("pkg")));
    }

    #[test]
    fn packages_indirect_counts_as_different() {
        let mut packages = Packages::default();
        packages.set(ModuleName::from("Module1"), package("pkg", "v1"));
        packages.set(
            ModuleName::from("Module2"),
            Package {
                indirect: true,
                ..package("pkg", "v1")
            },
        );

        assert!(!packages.is_same(&PackageName::from("pkg")));
    }

    #[test]
    fn packages_unknown_name() {
        let packages = Packages::default();
        assert!(!packages.is_same(&PackageName::from("missing")));
        assert!(packages.values(&PackageName::from("missing")).is_empty());
        assert!(packages.names().is_empty());
    }

    #[test]
    fn packages_names_in_insertion_order() {
        let mut packages = Packages::default();
        packages.set(ModuleName::from("Module1"), package("zzz", "v1"));
        packages.set(ModuleName::from("Module1"), package("aaa", "v1"));
        packages.set(ModuleName::from("Module2"), package("mmm", "v1"));
        packages.set(ModuleName::from("Module2"), package("zzz", "v1"));

        assert_eq!(
            packages.names(),
            &[
                PackageName::from("zzz"),
                PackageName::from("aaa"),
                PackageName::from("mmm")
            ]
        );
    }

    #[test]
    fn package_path() {
        let cache = Path::new("/blah/pkg/mod");
        let cases = [
            (
                Package {
                    replaced_path: "NewPath".to_string(),
                    replaced_version: "NewVersion".to_string(),
                    ..package("Name", "Version")
                },
                "/blah/pkg/mod/NewPath@NewVersion",
            ),
            (
                Package {
                    replaced_path: "NewPath".to_string(),
                    ..package("Name", "Version")
                },
                "/blah/pkg/mod/NewPath",
            ),
            (
                Package {
                    replaced_version: "NewVersion".to_string(),
                    ..package("Name", "Version")
                },
                "/blah/pkg/mod/Name@Version",
            ),
            (
                Package {
                    replaced_path: "NewPath".to_string(),
                    replaced_version: "NewVersion".to_string(),
                    ..package("Name", "")
                },
                "/blah/pkg/mod/NewPath@NewVersion",
            ),
            (package("Name", "Version"), "/blah/pkg/mod/Name@Version"),
        ];

        for (package, expected) in cases {
            assert_eq!(package.path(cache), PathBuf::from(expected));
        }
    }

    #[test]
    fn effective_version() {
        let replaced = Package {
            replaced_path: "r".to_string(),
            replaced_version: "v9".to_string(),
            ..package("p", "v1")
        };
        assert_eq!(replaced.effective_version(), "v9");
        assert!(replaced.is_replaced());

        let path_only = Package {
            replaced_path: "../p".to_string(),
            ..package("p", "v1")
        };
        assert_eq!(path_only.effective_version(), "v1");
        assert!(path_only.is_replaced());

        assert!(!package("p", "v1").is_replaced());
    }

    #[test]
    fn module_applies_matching_replace() {
        let mut file = mod_file("A", "1.14", &[("p", "v1")]);
        file.replace.push(Replace {
            old: ModVersion {
                path: "p".to_string(),
                version: String::new(),
            },
            new: ModVersion {
                path: "r".to_string(),
                version: "v9".to_string(),
            },
        });

        let module = Module::from_mod_file(file);
        let package = module.requirement(&PackageName::from("p")).unwrap();
        assert_eq!(package.replaced_path, "r");
        assert_eq!(package.effective_version(), "v9");
    }

    #[test]
    fn module_skips_unmatched_replace() {
        let file = mod_file("A", "1.14", &[("p", "v1")]);
        let mut with_replace = file.clone();
        with_replace.replace.push(Replace {
            old: ModVersion {
                path: "missing".to_string(),
                version: String::new(),
            },
            new: ModVersion {
                path: "r".to_string(),
                version: "v9".to_string(),
            },
        });

        assert_eq!(Module::from_mod_file(with_replace), Module::from_mod_file(file));
    }

    #[test]
    fn aggregate_fixtures() {
        let resolver = NoLicenseResolver;
        let versions = Versions::from_files(&fixtures(), Path::new("/cache"), &resolver).unwrap();

        let go_versions = versions.go_versions.values();
        assert_eq!(
            go_versions,
            vec![
                ModuleGoVersion {
                    name: ModuleName::from("fixture.com/new_module_indirect"),
                    go_version: GoVersion::from("1.14"),
                },
                ModuleGoVersion {
                    name: ModuleName::from("fixture.com/new_module_replace"),
                    go_version: GoVersion::from("1.14"),
                },
                ModuleGoVersion {
                    name: ModuleName::from("fixture.com/new_module_simple"),
                    go_version: GoVersion::from("1.13"),
                },
            ]
        );
        assert!(!versions.go_versions.is_same());

        assert_eq!(
            versions.packages.names(),
            &[
                PackageName::from("github.com/MarioCarrion/indirect"),
                PackageName::from("github.com/MarioCarrion/nit"),
                PackageName::from("github.com/MarioCarrion/swagger-lint"),
            ]
        );

        let indirect = versions
            .module(&ModuleName::from("fixture.com/new_module_indirect"))
            .and_then(|module| module.requirement(&PackageName::from("github.com/MarioCarrion/indirect")))
            .unwrap();
        assert_eq!(
            indirect,
            &Package {
                indirect: true,
                ..package("github.com/MarioCarrion/indirect", "v0.0.1")
            }
        );

        let nit = PackageName::from("github.com/MarioCarrion/nit");
        assert!(!versions.packages.is_same(&nit));
        assert_eq!(
            versions.packages.values(&nit),
            &[
                (
                    ModuleName::from("fixture.com/new_module_replace"),
                    Package {
                        replaced_path: "replaced/MarioCarrion/nit".to_string(),
                        replaced_version: "v9.0.0".to_string(),
                        ..package("github.com/MarioCarrion/nit", "v1.23.3")
                    }
                ),
                (
                    ModuleName::from("fixture.com/new_module_simple"),
                    package("github.com/MarioCarrion/nit", "v1.23.1")
                ),
            ]
        );
        assert!(versions
            .packages
            .is_same(&PackageName::from("github.com/MarioCarrion/swagger-lint")));
    }

    #[test]
    fn aggregate_is_reproducible() {
        let resolver = NoLicenseResolver;
        let first = Versions::from_files(&fixtures(), Path::new("/cache"), &resolver).unwrap();
        let second = Versions::from_files(&fixtures(), Path::new("/cache"), &resolver).unwrap();

        assert_eq!(first.packages.names(), second.packages.names());
        assert_eq!(first.modules(), second.modules());
    }

    #[test]
    fn aggregate_missing_file() {
        let files = [PathBuf::from("resources/does_not_exist.mod")];
        let err = Versions::from_files(&files, Path::new("/cache"), &NoLicenseResolver).unwrap_err();
        assert!(err.to_string().contains("does_not_exist.mod"));
    }

    #[test]
    fn aggregate_resolves_each_path_once() {
        let resolver = RecordingResolver::default();
        let files = vec![
            mod_file("A", "1.14", &[("p", "v1"), ("q", "v1")]),
            mod_file("B", "1.14", &[("p", "v1")]),
            mod_file("C", "1.14", &[("p", "v2")]),
        ];

        let versions = Versions::aggregate(files, Path::new("/cache"), &resolver);

        assert_eq!(
            *resolver.calls.borrow(),
            vec![
                PathBuf::from("/cache/p@v1"),
                PathBuf::from("/cache/q@v1"),
                PathBuf::from("/cache/p@v2"),
            ]
        );
        let b = versions.module(&ModuleName::from("B")).unwrap();
        assert_eq!(
            b.requirement(&PackageName::from("p")).unwrap().license.identifier,
            "MIT"
        );
    }

    #[test]
    fn aggregate_single_requirement_is_same() {
        let files = vec![
            mod_file("A", "1.14", &[("p", "v1")]),
            mod_file("B", "1.14", &[("p", "v1")]),
            mod_file("C", "1.14", &[("p", "v1"), ("q", "v1")]),
        ];

        let versions = Versions::aggregate(files, Path::new("/cache"), &NoLicenseResolver);

        assert!(versions.go_versions.is_same());
        assert!(versions.packages.is_same(&PackageName::from("p")));
        assert!(versions.packages.is_same(&PackageName::from("q")));
        assert_eq!(versions.packages.values(&PackageName::from("q")).len(), 1);
    }
}
