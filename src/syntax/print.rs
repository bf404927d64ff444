//! Source printer.
//!
//! Parsed nodes are copied from the original text together with the trivia
//! (whitespace, comments, explicit semicolons) that precedes them. Synthesized
//! nodes are rendered gofmt-style and spliced in at the next line break, so
//! they never land inside a trailing comment or on the same line as the code
//! that follows them.

use super::{Block, Decl, Expr, FuncDecl, ImportDecl, SourceFile, Span, Stmt};

pub(super) fn print_file(file: &SourceFile) -> String {
    let src = file.source();
    let mut p = Printer {
        src,
        out: String::with_capacity(src.len() + 512),
    };
    p.out.push_str(&src[..file.package.span.end]);

    let mut cursor = file.package.span.end;
    let mut run = String::new();
    for decl in &file.decls {
        match decl.span() {
            None => {
                if run.is_empty() {
                    // Keep a blank line between the previous code and the
                    // inserted declarations.
                    run.push('\n');
                }
                run.push('\n');
                run.push_str(&render_decl(decl));
            }
            Some(span) => {
                p.flush(&src[cursor..span.start], &mut run, "");
                p.parsed_decl(decl, span);
                cursor = span.end;
            }
        }
    }
    p.flush(&src[cursor..], &mut run, "");
    p.out
}

struct Printer<'a> {
    src: &'a str,
    out: String,
}

impl Printer<'_> {
    /// Emit `pending` trivia, splicing any queued synthesized text into it.
    /// `next_indent` is the indentation of whatever follows the trivia.
    fn flush(&mut self, pending: &str, run: &mut String, next_indent: &str) {
        if run.is_empty() {
            self.out.push_str(pending);
            return;
        }
        match first_line_break(pending) {
            Some(nl) => {
                // Splice before a CRLF pair and match the file's line endings.
                let (brk, crlf) = match pending[..nl].strip_suffix('\r') {
                    Some(line) => (line.len(), true),
                    None => (nl, false),
                };
                self.out
                    .push_str(pending[..brk].trim_end_matches([' ', '\t']));
                if crlf {
                    self.out.push_str(&run.replace('\n', "\r\n"));
                } else {
                    self.out.push_str(run);
                }
                self.out.push_str(&pending[brk..]);
            }
            None => {
                self.out.push_str(run);
                let rest = pending.trim_start();
                if rest.starts_with(';') {
                    self.out.push_str(pending);
                } else {
                    self.out.push('\n');
                    self.out.push_str(next_indent);
                    self.out.push_str(rest);
                }
            }
        }
        run.clear();
    }

    fn parsed_decl(&mut self, decl: &Decl, span: Span) {
        let src = self.src;
        if let Decl::Func(FuncDecl {
            body: Some(body), ..
        }) = decl
            && let Some(body_span) = body.span
        {
            self.out.push_str(&src[span.start..body_span.start]);
            self.parsed_block(body, body_span, "");
            self.out.push_str(&src[body_span.end..span.end]);
            return;
        }
        self.out.push_str(span.text(src));
    }

    /// Print a parsed block whose statement list may contain synthesized
    /// statements. `indent` is the indentation of the block's braces.
    fn parsed_block(&mut self, block: &Block, span: Span, indent: &str) {
        let src = self.src;
        let inner = format!("{indent}\t");
        self.out.push('{');
        let mut cursor = span.start + 1;
        let mut run = String::new();
        for stmt in &block.stmts {
            match stmt.span() {
                None => {
                    run.push('\n');
                    run.push_str(&inner);
                    run.push_str(&render_stmt(stmt, &inner, src));
                }
                Some(stmt_span) => {
                    self.flush(&src[cursor..stmt_span.start], &mut run, &inner);
                    self.out.push_str(stmt_span.text(src));
                    cursor = stmt_span.end;
                }
            }
        }
        let close = span.end - 1;
        self.flush(&src[cursor..close], &mut run, indent);
        self.out.push('}');
    }
}

/// Offset of the first newline in `trivia` that is not inside a block comment.
fn first_line_break(trivia: &str) -> Option<usize> {
    let bytes = trivia.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => return Some(i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = trivia[i + 2..].find("*/")?;
                i += end + 4;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i += trivia[i..].find('\n')?;
            }
            _ => i += 1,
        }
    }
    None
}

fn render_decl(decl: &Decl) -> String {
    match decl {
        Decl::Import(import) => render_import(import),
        // Only imports are ever synthesized.
        Decl::Func(_) | Decl::Other(_) => String::new(),
    }
}

fn render_import(import: &ImportDecl) -> String {
    let spec = |s: &super::ImportSpec| match &s.name {
        Some(name) => format!("{name} {}", s.path),
        None => s.path.clone(),
    };
    match import.specs.as_slice() {
        [single] => format!("import {}", spec(single)),
        specs => {
            let mut out = String::from("import (");
            for s in specs {
                out.push_str("\n\t");
                out.push_str(&spec(s));
            }
            out.push_str("\n)");
            out
        }
    }
}

fn render_block(block: &Block, indent: &str, src: &str) -> String {
    if block.stmts.is_empty() {
        return "{\n".to_string() + indent + "}";
    }
    let inner = format!("{indent}\t");
    let mut out = String::from("{");
    for stmt in &block.stmts {
        out.push('\n');
        out.push_str(&inner);
        out.push_str(&render_stmt(stmt, &inner, src));
    }
    out.push('\n');
    out.push_str(indent);
    out.push('}');
    out
}

fn render_stmt(stmt: &Stmt, indent: &str, src: &str) -> String {
    match stmt {
        Stmt::Block(block) => render_block(block, indent, src),
        Stmt::Assign(assign) => format!(
            "{} {} {}",
            render_list(&assign.lhs),
            assign.tok.as_str(),
            render_list(&assign.rhs)
        ),
        Stmt::If(if_stmt) => format!(
            "if {} {}",
            render_expr(&if_stmt.cond),
            render_block(&if_stmt.body, indent, src)
        ),
        Stmt::Expr(expr) => render_expr(expr),
        Stmt::Return(results) if results.is_empty() => "return".to_string(),
        Stmt::Return(results) => format!("return {}", render_list(results)),
        Stmt::Defer(call) => format!("defer {}", render_call(&call.fun, &call.args)),
        Stmt::Verbatim(span) => span.text(src).to_string(),
    }
}

fn render_list(exprs: &[Expr]) -> String {
    exprs.iter().map(render_expr).collect::<Vec<_>>().join(", ")
}

fn render_call(fun: &Expr, args: &[Expr]) -> String {
    format!("{}({})", render_expr(fun), render_list(args))
}

fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::BasicLit(value) => value.clone(),
        Expr::Selector(x, sel) => format!("{}.{sel}", render_expr(x)),
        Expr::Call(call) => render_call(&call.fun, &call.args),
        Expr::Binary(bin) => format!(
            "{} {} {}",
            render_expr(&bin.x),
            bin.op.as_str(),
            render_expr(&bin.y)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{AssignStmt, AssignTok, BinaryOp, CallExpr, IfStmt, parse_file};
    use super::*;

    fn call_stmt(name: &str) -> Stmt {
        Stmt::Expr(Expr::call(Expr::ident(name), vec![]))
    }

    fn main_body(file: &mut SourceFile) -> &mut Block {
        file.decls
            .iter_mut()
            .find_map(|d| match d {
                Decl::Func(f) if f.name == "main" => f.body.as_mut(),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn untouched_file_prints_verbatim() {
        let src = "// Package doc.\npackage main\n\nimport (\n\t\"fmt\" // fmt\n)\n\n/* block */\nfunc main() {\n\tfmt.Println(\"x\")   // odd spacing\n}\n";
        let file = parse_file(src).unwrap();
        assert_eq!(file.to_source(), src);
    }

    #[test]
    fn inserted_statement_goes_on_its_own_line() {
        let mut file = parse_file("package main\n\nfunc main() {\n\tprintln(1)\n}\n").unwrap();
        main_body(&mut file).stmts.insert(0, call_stmt("start"));
        assert_eq!(
            file.to_source(),
            "package main\n\nfunc main() {\n\tstart()\n\tprintln(1)\n}\n"
        );
    }

    #[test]
    fn insertion_into_single_line_body() {
        let mut file = parse_file("package main; func main(){ print(\"abc\") }").unwrap();
        main_body(&mut file).stmts.insert(0, call_stmt("start"));
        assert_eq!(
            file.to_source(),
            "package main; func main(){\n\tstart()\n\tprint(\"abc\") }"
        );
    }

    #[test]
    fn insertion_into_empty_body() {
        let mut file = parse_file("package main\n\nfunc main() {}\n").unwrap();
        main_body(&mut file).stmts.insert(0, call_stmt("start"));
        assert_eq!(
            file.to_source(),
            "package main\n\nfunc main() {\n\tstart()\n}\n"
        );
    }

    #[test]
    fn insertion_keeps_trailing_comment_on_brace_line() {
        let mut file =
            parse_file("package main\n\nfunc main() { // entry\n\tprintln(1)\n}\n").unwrap();
        main_body(&mut file).stmts.insert(0, call_stmt("start"));
        assert_eq!(
            file.to_source(),
            "package main\n\nfunc main() { // entry\n\tstart()\n\tprintln(1)\n}\n"
        );
    }

    #[test]
    fn insertion_skips_newlines_inside_block_comments() {
        let mut file =
            parse_file("package main\n\nfunc main() { /* a\nb */ println(1)\n}\n").unwrap();
        main_body(&mut file).stmts.insert(0, call_stmt("start"));
        assert_eq!(
            file.to_source(),
            "package main\n\nfunc main() {\n\tstart()\n\t/* a\nb */ println(1)\n}\n"
        );
    }

    #[test]
    fn inserted_imports_follow_package_line() {
        let mut file = parse_file("package main // cmd\n\nfunc main() {}\n").unwrap();
        file.decls.insert(
            0,
            Decl::Import(ImportDecl {
                specs: vec![super::super::ImportSpec {
                    name: None,
                    path: "\"os\"".into(),
                }],
                span: None,
            }),
        );
        assert_eq!(
            file.to_source(),
            "package main // cmd\n\nimport \"os\"\n\nfunc main() {}\n"
        );
    }

    #[test]
    fn crlf_line_endings_are_kept() {
        let mut file =
            parse_file("package main\r\n\r\nfunc main() {\r\n\tprintln(1)\r\n}\r\n").unwrap();
        main_body(&mut file).stmts.insert(
            0,
            Stmt::Block(Block {
                stmts: vec![call_stmt("start"), call_stmt("stop")],
                span: None,
            }),
        );
        file.decls.insert(
            0,
            Decl::Import(ImportDecl {
                specs: vec![super::super::ImportSpec {
                    name: None,
                    path: "\"os\"".into(),
                }],
                span: None,
            }),
        );
        let out = file.to_source();
        assert_eq!(
            out,
            "package main\r\n\r\nimport \"os\"\r\n\r\nfunc main() {\r\n\t{\r\n\t\tstart()\r\n\t\tstop()\r\n\t}\r\n\tprintln(1)\r\n}\r\n"
        );
        assert!(!out.replace("\r\n", "").contains(['\r', '\n']), "Got:\n{out:?}");
    }

    #[test]
    fn renders_nested_synthesized_blocks() {
        let stmt = Stmt::Block(Block::new(vec![
            Stmt::Assign(AssignStmt {
                lhs: vec![Expr::ident("x")],
                tok: AssignTok::Define,
                rhs: vec![Expr::string("a\"b")],
            }),
            Stmt::If(IfStmt {
                cond: Expr::binary(Expr::ident("x"), BinaryOp::Neq, Expr::string("")),
                body: Block::new(vec![Stmt::Return(vec![])]),
            }),
            Stmt::Defer(CallExpr::new(
                Expr::selector(Expr::ident("pkg"), "Done"),
                vec![],
            )),
        ]));
        assert_eq!(
            render_stmt(&stmt, "\t", ""),
            "{\n\t\tx := \"a\\\"b\"\n\t\tif x != \"\" {\n\t\t\treturn\n\t\t}\n\t\tdefer pkg.Done()\n\t}"
        );
    }

    #[test]
    fn line_break_detection() {
        assert_eq!(first_line_break(" // c\n\t"), Some(5));
        assert_eq!(first_line_break(" /* a\nb */ "), None);
        assert_eq!(first_line_break(" /* a\nb */\n"), Some(10));
        assert_eq!(first_line_break("; "), None);
    }
}
