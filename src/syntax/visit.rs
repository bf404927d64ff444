//! Syntax tree traversal.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! visits the node's children. An override that does not call `walk_*` stops
//! the descent at that node.

use super::{Block, Decl, FuncDecl, ImportDecl, ImportSpec, SourceFile, Stmt};

pub trait Visit<'ast> {
    fn visit_file(&mut self, file: &'ast SourceFile) {
        walk_file(self, file);
    }

    fn visit_decl(&mut self, decl: &'ast Decl) {
        walk_decl(self, decl);
    }

    fn visit_import_decl(&mut self, import: &'ast ImportDecl) {
        walk_import_decl(self, import);
    }

    fn visit_import_spec(&mut self, _spec: &'ast ImportSpec) {}

    fn visit_func_decl(&mut self, func: &'ast FuncDecl) {
        walk_func_decl(self, func);
    }

    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }
}

pub fn walk_file<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, file: &'ast SourceFile) {
    for decl in &file.decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, decl: &'ast Decl) {
    match decl {
        Decl::Import(import) => v.visit_import_decl(import),
        Decl::Func(func) => v.visit_func_decl(func),
        Decl::Other(_) => {}
    }
}

pub fn walk_import_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, import: &'ast ImportDecl) {
    for spec in &import.specs {
        v.visit_import_spec(spec);
    }
}

pub fn walk_func_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, func: &'ast FuncDecl) {
    if let Some(body) = &func.body {
        v.visit_block(body);
    }
}

pub fn walk_block<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, stmt: &'ast Stmt) {
    match stmt {
        Stmt::Block(block) => v.visit_block(block),
        Stmt::If(if_stmt) => v.visit_block(&if_stmt.body),
        _ => {}
    }
}

pub trait VisitMut {
    fn visit_file_mut(&mut self, file: &mut SourceFile) {
        walk_file_mut(self, file);
    }

    fn visit_decl_mut(&mut self, decl: &mut Decl) {
        walk_decl_mut(self, decl);
    }

    fn visit_func_decl_mut(&mut self, func: &mut FuncDecl) {
        walk_func_decl_mut(self, func);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }
}

pub fn walk_file_mut<V: VisitMut + ?Sized>(v: &mut V, file: &mut SourceFile) {
    for decl in &mut file.decls {
        v.visit_decl_mut(decl);
    }
}

pub fn walk_decl_mut<V: VisitMut + ?Sized>(v: &mut V, decl: &mut Decl) {
    if let Decl::Func(func) = decl {
        v.visit_func_decl_mut(func);
    }
}

pub fn walk_func_decl_mut<V: VisitMut + ?Sized>(v: &mut V, func: &mut FuncDecl) {
    if let Some(body) = &mut func.body {
        v.visit_block_mut(body);
    }
}

pub fn walk_block_mut<V: VisitMut + ?Sized>(v: &mut V, block: &mut Block) {
    for stmt in &mut block.stmts {
        v.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match stmt {
        Stmt::Block(block) => v.visit_block_mut(block),
        Stmt::If(if_stmt) => v.visit_block_mut(&mut if_stmt.body),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_file;
    use super::*;

    #[derive(Default)]
    struct Counter {
        funcs: usize,
        specs: usize,
        stmts: usize,
    }

    impl<'ast> Visit<'ast> for Counter {
        fn visit_import_spec(&mut self, _spec: &'ast ImportSpec) {
            self.specs += 1;
        }

        fn visit_func_decl(&mut self, func: &'ast FuncDecl) {
            self.funcs += 1;
            walk_func_decl(self, func);
        }

        fn visit_stmt(&mut self, stmt: &'ast Stmt) {
            self.stmts += 1;
            walk_stmt(self, stmt);
        }
    }

    #[test]
    fn visits_every_node_kind() {
        let file = parse_file(
            "package main\n\nimport (\n\t\"a\"\n\t\"b\"\n)\n\nfunc f() { x(); y() }\nfunc g() {}\n",
        )
        .unwrap();
        let mut counter = Counter::default();
        counter.visit_file(&file);
        assert_eq!(counter.specs, 2);
        assert_eq!(counter.funcs, 2);
        assert_eq!(counter.stmts, 2);
    }

    struct Renamer;

    impl VisitMut for Renamer {
        fn visit_func_decl_mut(&mut self, func: &mut FuncDecl) {
            func.name.push('_');
        }
    }

    #[test]
    fn mutating_visitor_reaches_functions() {
        let mut file = parse_file("package p\n\nfunc a() {}\nfunc b() {}\n").unwrap();
        Renamer.visit_file_mut(&mut file);
        let names: Vec<&str> = file
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Func(f) => Some(f.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["a_", "b_"]);
    }
}
