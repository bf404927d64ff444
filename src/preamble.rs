use crate::syntax::{
    AssignStmt, AssignTok, BinaryOp, Block, CallExpr, Decl, Expr, IfStmt, ImportDecl, ImportSpec,
    Stmt,
};

/// Import path of the package providing `os.Create` and `os.Stderr`.
pub const OS_IMPORT: &str = r#""os""#;
/// Import path of the CPU profiler.
pub const PPROF_IMPORT: &str = r#""runtime/pprof""#;

/// Build the profiling block inserted at the top of `main`:
///
/// ```go
/// {
///     f, err := os.Create("<profile_path>")
///     if err != nil {
///         os.Stderr.WriteString("Couldn't open <profile_path>: " + err.Error() + "\n")
///         return
///     }
///     pprof.StartCPUProfile(f)
///     defer pprof.StopCPUProfile()
/// }
/// ```
///
/// Failing to open the profile returns from `main` instead of crashing, and
/// the profiler is stopped by a `defer` so every exit path flushes it.
pub fn build_preamble(profile_path: &str) -> Stmt {
    let open = Stmt::Assign(AssignStmt {
        lhs: vec![Expr::ident("f"), Expr::ident("err")],
        tok: AssignTok::Define,
        rhs: vec![Expr::call(
            Expr::selector(Expr::ident("os"), "Create"),
            vec![Expr::string(profile_path)],
        )],
    });

    let message = Expr::binary(
        Expr::binary(
            Expr::string(&format!("Couldn't open {profile_path}: ")),
            BinaryOp::Add,
            Expr::call(Expr::selector(Expr::ident("err"), "Error"), vec![]),
        ),
        BinaryOp::Add,
        Expr::string("\n"),
    );
    let guard = Stmt::If(IfStmt {
        cond: Expr::binary(Expr::ident("err"), BinaryOp::Neq, Expr::ident("nil")),
        body: Block::new(vec![
            Stmt::Expr(Expr::call(
                Expr::selector(Expr::selector(Expr::ident("os"), "Stderr"), "WriteString"),
                vec![message],
            )),
            Stmt::Return(vec![]),
        ]),
    });

    let start = Stmt::Expr(Expr::call(
        Expr::selector(Expr::ident("pprof"), "StartCPUProfile"),
        vec![Expr::ident("f")],
    ));
    let stop = Stmt::Defer(CallExpr::new(
        Expr::selector(Expr::ident("pprof"), "StopCPUProfile"),
        vec![],
    ));

    Stmt::Block(Block::new(vec![open, guard, start, stop]))
}

/// A single-spec import of `path`, which must already be a quoted literal.
pub fn build_import_decl(path: &str) -> Decl {
    Decl::Import(ImportDecl {
        specs: vec![ImportSpec {
            name: None,
            path: path.to_string(),
        }],
        span: None,
    })
}
