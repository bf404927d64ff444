use crate::syntax::visit::{Visit, walk_decl, walk_file};
use crate::syntax::{Decl, FuncDecl, ImportSpec, SourceFile};

/// Package whose `main` function is the program entry point.
pub const ENTRY_PACKAGE: &str = "main";
/// Name of the entry-point function.
pub const ENTRY_FUNC: &str = "main";

/// `func main()`: no receiver, no parameters, no results.
pub fn is_entry_func(func: &FuncDecl) -> bool {
    func.name == ENTRY_FUNC
        && func.receiver.is_none()
        && func.params.is_empty()
        && func.result.is_none()
}

/// Whether `file` belongs to package `main` and declares `func main()`.
pub fn has_entry_point(file: &SourceFile) -> bool {
    let mut finder = EntryFinder { found: false };
    finder.visit_file(file);
    finder.found
}

/// Whether any import spec in `file` has exactly the path literal `path`
/// (quotes included). Unlike [`has_entry_point`] this ignores the package name.
pub fn has_import(file: &SourceFile, path: &str) -> bool {
    let mut finder = ImportFinder { path, found: false };
    finder.visit_file(file);
    finder.found
}

struct EntryFinder {
    found: bool,
}

impl<'ast> Visit<'ast> for EntryFinder {
    fn visit_file(&mut self, file: &'ast SourceFile) {
        if file.package.name != ENTRY_PACKAGE {
            return;
        }
        walk_file(self, file);
    }

    fn visit_decl(&mut self, decl: &'ast Decl) {
        if !self.found {
            walk_decl(self, decl);
        }
    }

    fn visit_func_decl(&mut self, func: &'ast FuncDecl) {
        if is_entry_func(func) {
            self.found = true;
        }
    }
}

struct ImportFinder<'p> {
    path: &'p str,
    found: bool,
}

impl<'ast> Visit<'ast> for ImportFinder<'_> {
    fn visit_decl(&mut self, decl: &'ast Decl) {
        if !self.found {
            walk_decl(self, decl);
        }
    }

    fn visit_import_spec(&mut self, spec: &'ast ImportSpec) {
        if spec.path == self.path {
            self.found = true;
        }
    }

    // Imports cannot appear inside function bodies.
    fn visit_func_decl(&mut self, _func: &'ast FuncDecl) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preamble::PPROF_IMPORT;
    use crate::syntax::parse_file;

    struct Case {
        src: &'static str,
        has_main: bool,
        has_pprof_import: bool,
    }

    const CASES: &[Case] = &[
        Case {
            src: "package main\n\nfunc main() {}\n",
            has_main: true,
            has_pprof_import: false,
        },
        Case {
            src: "package moo\n\nimport \"runtime/pprof\"\n\nfunc main() {}\n",
            has_main: false,
            has_pprof_import: true,
        },
        Case {
            src: "package main\n\nimport (\n\t\"foo\"\n\t\"runtime/pprof\"\n\t\"baz\"\n)\n\nfunc main(args []string) {}\n",
            has_main: false,
            has_pprof_import: true,
        },
        Case {
            src: "package main\n\nimport \"pprof\"\n\nfunc main() int { return 0 }\n",
            has_main: false,
            has_pprof_import: false,
        },
        Case {
            src: "package main\n\nimport (\n\t\"foo\"\n\t\"baz\"\n\t\"bar\"\n)\nimport \"heh\"\nimport \"runtime/pprof\"\n\ntype Bar struct{}\n\nfunc (b Bar) main() {}\n",
            has_main: false,
            has_pprof_import: true,
        },
        Case {
            src: "package main\n\nimport pp \"runtime/pprof\"\n\nfunc helper() {}\n\nfunc main() {\n\tpp.StopCPUProfile()\n}\n",
            has_main: true,
            has_pprof_import: true,
        },
    ];

    #[test]
    fn detects_entry_point() {
        for case in CASES {
            let file = parse_file(case.src).unwrap();
            assert_eq!(
                has_entry_point(&file),
                case.has_main,
                "source:\n{}",
                case.src
            );
        }
    }

    #[test]
    fn detects_import() {
        for case in CASES {
            let file = parse_file(case.src).unwrap();
            assert_eq!(
                has_import(&file, PPROF_IMPORT),
                case.has_pprof_import,
                "source:\n{}",
                case.src
            );
        }
    }

    #[test]
    fn import_match_is_on_the_literal_text() {
        let file = parse_file("package main\n\nimport `runtime/pprof`\n").unwrap();
        assert!(!has_import(&file, PPROF_IMPORT));
        assert!(has_import(&file, "`runtime/pprof`"));
    }

    #[test]
    fn inspection_is_repeatable() {
        let file = parse_file(CASES[0].src).unwrap();
        assert_eq!(has_entry_point(&file), has_entry_point(&file));
        assert!(!has_import(&file, PPROF_IMPORT));
        assert!(!has_import(&file, PPROF_IMPORT));
    }
}
