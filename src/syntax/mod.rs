//! A small Go syntax tree.
//!
//! The model carries just enough structure to find `func main`, merge import
//! declarations and splice statements into a function body. Every node that
//! came from the parser remembers the byte span it was read from, so printing
//! re-emits untouched code (comments and layout included) verbatim. Nodes
//! without a span were synthesized and are printed gofmt-style.

mod lit;
mod parse;
mod print;
pub mod visit;

pub use lit::quote;
#[cfg(test)]
pub(crate) use lit::unquote;
pub use parse::{SyntaxError, parse_file};

/// Byte range into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// One parsed compilation unit.
#[derive(Debug, Clone)]
pub struct SourceFile {
    source: String,
    pub package: PackageClause,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    pub(crate) fn new(source: String, package: PackageClause, decls: Vec<Decl>) -> Self {
        Self {
            source,
            package,
            decls,
        }
    }

    /// The text this file was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Print the (possibly mutated) tree back to Go source.
    pub fn to_source(&self) -> String {
        print::print_file(self)
    }
}

#[derive(Debug, Clone)]
pub struct PackageClause {
    pub name: String,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Import(ImportDecl),
    Func(FuncDecl),
    /// `type`, `var` and `const` declarations; never looked into.
    Other(Span),
}

impl Decl {
    /// Source span, or `None` for synthesized declarations.
    pub fn span(&self) -> Option<Span> {
        match self {
            Decl::Import(import) => import.span,
            Decl::Func(func) => func.span,
            Decl::Other(span) => Some(*span),
        }
    }
}

/// `import "path"` or a grouped `import ( ... )`.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub specs: Vec<ImportSpec>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name (`f`, `.`, `_`) if one was given.
    pub name: Option<String>,
    /// The path literal exactly as written, quotes included.
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver parameter list text for methods.
    pub receiver: Option<String>,
    /// One entry per parameter declaration, as written.
    pub params: Vec<String>,
    /// Result type or result list text.
    pub result: Option<String>,
    /// Missing for functions implemented outside Go (assembly stubs).
    pub body: Option<Block>,
    pub span: Option<Span>,
}

/// A braced statement list.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    /// Span from `{` to `}` inclusive.
    pub span: Option<Span>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts, span: None }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Block),
    Assign(AssignStmt),
    If(IfStmt),
    Expr(Expr),
    Return(Vec<Expr>),
    Defer(CallExpr),
    /// A parsed statement kept as its source text.
    Verbatim(Span),
}

impl Stmt {
    /// Source span, or `None` for synthesized statements.
    pub fn span(&self) -> Option<Span> {
        match self {
            Stmt::Verbatim(span) => Some(*span),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub tok: AssignTok,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignTok {
    /// `:=`
    Define,
    /// `=`
    Assign,
}

impl AssignTok {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignTok::Define => ":=",
            AssignTok::Assign => "=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(String),
    /// A literal as it appears in source, e.g. `"bla.prof"`.
    BasicLit(String),
    Selector(Box<Expr>, String),
    Call(CallExpr),
    Binary(Box<BinaryExpr>),
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident(name.to_string())
    }

    /// A string literal holding `value`, quoted with Go's escaping rules.
    pub fn string(value: &str) -> Self {
        Expr::BasicLit(quote(value))
    }

    pub fn selector(x: Expr, sel: &str) -> Self {
        Expr::Selector(Box::new(x), sel.to_string())
    }

    pub fn call(fun: Expr, args: Vec<Expr>) -> Self {
        Expr::Call(CallExpr::new(fun, args))
    }

    pub fn binary(x: Expr, op: BinaryOp, y: Expr) -> Self {
        Expr::Binary(Box::new(BinaryExpr { x, op, y }))
    }
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
}

impl CallExpr {
    pub fn new(fun: Expr, args: Vec<Expr>) -> Self {
        Self {
            fun: Box::new(fun),
            args,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub x: Expr,
    pub op: BinaryOp,
    pub y: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Neq,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Neq => "!=",
        }
    }
}
