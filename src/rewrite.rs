use tracing::warn;

use crate::inspect::{has_import, is_entry_func};
use crate::preamble::{OS_IMPORT, PPROF_IMPORT, build_import_decl, build_preamble};
use crate::syntax::visit::{VisitMut, walk_file_mut};
use crate::syntax::{Decl, FuncDecl, SourceFile};

/// What [`instrument`] changed in a file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Instrumentation {
    /// Import paths prepended to the file, in insertion order.
    pub imports_added: Vec<&'static str>,
    /// Number of entry functions that received the profiling block.
    pub preambles_inserted: usize,
    /// The file already imported `runtime/pprof` before instrumentation.
    pub profiler_already_imported: bool,
}

/// Add CPU profiling to `file`.
///
/// Imports for `os` and `runtime/pprof` are prepended when missing, and the
/// profiling block becomes the first statement of every `func main()`.
/// Running this again on its own output inserts a second block: a program
/// that was built with goprofile can itself be instrumented.
pub fn instrument(file: &mut SourceFile, profile_path: &str) -> Instrumentation {
    let mut instrumenter = Instrumenter {
        profile_path,
        report: Instrumentation::default(),
    };
    instrumenter.visit_file_mut(file);
    instrumenter.report
}

struct Instrumenter<'a> {
    profile_path: &'a str,
    report: Instrumentation,
}

impl VisitMut for Instrumenter<'_> {
    fn visit_file_mut(&mut self, file: &mut SourceFile) {
        let mut staged = Vec::new();
        if !has_import(file, OS_IMPORT) {
            staged.push(OS_IMPORT);
        }
        if !has_import(file, PPROF_IMPORT) {
            staged.push(PPROF_IMPORT);
        } else {
            warn!("runtime/pprof already imported. Maybe this program already supports profiling?");
            self.report.profiler_already_imported = true;
        }

        let mut decls: Vec<Decl> = staged.iter().map(|path| build_import_decl(path)).collect();
        decls.append(&mut file.decls);
        file.decls = decls;
        self.report.imports_added = staged;

        walk_file_mut(self, file);
    }

    fn visit_func_decl_mut(&mut self, func: &mut FuncDecl) {
        if !is_entry_func(func) {
            return;
        }
        if let Some(body) = &mut func.body {
            body.stmts.insert(0, build_preamble(self.profile_path));
            self.report.preambles_inserted += 1;
        }
    }
}
