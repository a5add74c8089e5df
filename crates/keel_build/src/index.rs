//! Project-wide declaration index for one build pass.

use std::collections::{BTreeMap, BTreeSet};

use keel_common::DeclarationKind;
use keel_source::{FileId, SourceDb};

use crate::closure::compute_closures;
use crate::error::BuildError;
use crate::extract::extract_declarations;

/// A declaration discovered in a project source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declared name, unique across the project.
    pub name: String,
    /// Declaration kind.
    pub kind: DeclarationKind,
    /// The file holding the declaration.
    pub file: FileId,
    /// Direct base names, in header order.
    pub bases: Vec<String>,
    /// 1-based line of the declaration header.
    pub line: u32,
    /// Every declaration reachable through base edges.
    pub dependencies: BTreeSet<String>,
}

/// All declarations of a project, with their transitive dependencies resolved.
#[derive(Debug, Default)]
pub struct ProjectIndex {
    declarations: BTreeMap<String, Declaration>,
    by_file: BTreeMap<FileId, Vec<String>>,
}

impl ProjectIndex {
    /// Extracts and resolves every declaration in `db`.
    ///
    /// Duplicate names, unknown bases and inheritance cycles are rejected
    /// here, before anything is compiled.
    pub fn build(db: &SourceDb) -> Result<Self, BuildError> {
        let mut declarations: BTreeMap<String, Declaration> = BTreeMap::new();
        let mut by_file: BTreeMap<FileId, Vec<String>> = BTreeMap::new();

        for file in db.files() {
            let names = by_file.entry(file.id).or_default();
            for extracted in extract_declarations(&file.content) {
                let line = file.line_of(extracted.offset);
                if let Some(first) = declarations.get(&extracted.name) {
                    let first_file = db.get_file(first.file);
                    return Err(BuildError::DuplicateDeclaration {
                        name: extracted.name,
                        first: format!("{}:{}", first_file.path.display(), first.line),
                        second: format!("{}:{}", file.path.display(), line),
                    });
                }
                names.push(extracted.name.clone());
                declarations.insert(
                    extracted.name.clone(),
                    Declaration {
                        name: extracted.name,
                        kind: extracted.kind,
                        file: file.id,
                        bases: extracted.bases,
                        line,
                        dependencies: BTreeSet::new(),
                    },
                );
            }
        }

        let bases: BTreeMap<String, Vec<String>> = declarations
            .iter()
            .map(|(name, decl)| (name.clone(), decl.bases.clone()))
            .collect();
        for (name, closure) in compute_closures(&bases)? {
            if let Some(decl) = declarations.get_mut(&name) {
                decl.dependencies = closure;
            }
        }

        Ok(Self {
            declarations,
            by_file,
        })
    }

    /// Looks up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    /// Iterates all declarations, sorted by name.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    /// Returns the declarations of one file, in source order.
    pub fn in_file(&self, file: FileId) -> impl Iterator<Item = &Declaration> {
        self.by_file
            .get(&file)
            .into_iter()
            .flatten()
            .filter_map(|name| self.declarations.get(name))
    }

    /// Number of declarations in the project.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the project declares nothing.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(files: &[(&str, &str)]) -> SourceDb {
        let mut db = SourceDb::new();
        for (path, content) in files {
            db.add_source(*path, content.to_string());
        }
        db
    }

    #[test]
    fn indexes_declarations_across_files() {
        let db = db(&[
            ("contracts/Base.sol", "contract Base {\n}\n"),
            ("contracts/Token.sol", "library Math {\n}\n\ncontract Token is Base {\n}\n"),
        ]);
        let index = ProjectIndex::build(&db).unwrap();
        assert_eq!(index.len(), 3);

        let token = index.get("Token").unwrap();
        assert_eq!(token.kind, DeclarationKind::Contract);
        assert_eq!(token.line, 4);
        assert_eq!(token.bases, vec!["Base"]);
        assert!(token.dependencies.contains("Base"));

        let second = FileId::from_raw(1);
        let names: Vec<_> = index.in_file(second).map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Math", "Token"]);
    }

    #[test]
    fn file_without_declarations_has_empty_listing() {
        let db = db(&[("contracts/Empty.sol", "pragma solidity ^0.4.24;\n")]);
        let index = ProjectIndex::build(&db).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.in_file(FileId::from_raw(0)).count(), 0);
    }

    #[test]
    fn duplicate_names_report_both_locations() {
        let db = db(&[
            ("contracts/A.sol", "contract Token {\n}\n"),
            ("contracts/B.sol", "\n\ncontract Token {\n}\n"),
        ]);
        let err = ProjectIndex::build(&db).unwrap_err();
        match err {
            BuildError::DuplicateDeclaration { name, first, second } => {
                assert_eq!(name, "Token");
                assert_eq!(first, "contracts/A.sol:1");
                assert_eq!(second, "contracts/B.sol:3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn transitive_dependencies_are_resolved() {
        let db = db(&[
            ("contracts/A.sol", "contract A {\n}\n"),
            ("contracts/B.sol", "contract B is A {\n}\n"),
            ("contracts/C.sol", "contract C is B {\n}\n"),
        ]);
        let index = ProjectIndex::build(&db).unwrap();
        let deps: Vec<_> = index.get("C").unwrap().dependencies.iter().cloned().collect();
        assert_eq!(deps, vec!["A", "B"]);
    }
}
