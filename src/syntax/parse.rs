use tree_sitter::{Node, Parser};

use super::{Block, Decl, FuncDecl, ImportDecl, ImportSpec, PackageClause, SourceFile, Span, Stmt};

/// Why a source file could not be turned into a [`SourceFile`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("{line}:{column}: {message}")]
    Invalid {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("1:1: expected 'package', found {found}")]
    MissingPackage { found: String },

    #[error("failed to load the Go grammar: {0}")]
    Grammar(String),
}

/// Parse Go source into the crate's syntax tree.
///
/// The whole file must be free of syntax errors; the first error (or missing
/// token) the grammar reports is returned with its 1-based position.
pub fn parse_file(source: impl Into<String>) -> Result<SourceFile, SyntaxError> {
    let source = source.into();
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| SyntaxError::Grammar(e.to_string()))?;
    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| SyntaxError::Grammar("parser returned no tree".into()))?;

    let root = tree.root_node();
    if root.has_error()
        && let Some(err) = first_error(root, &source)
    {
        return Err(err);
    }

    let lower = Lower { src: &source };
    let mut package = None;
    let mut decls = Vec::new();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "comment" => {}
            "package_clause" => package = Some(lower.package(node)),
            _ if package.is_none() => {
                return Err(SyntaxError::MissingPackage {
                    found: node.kind().to_string(),
                });
            }
            "import_declaration" => decls.push(Decl::Import(lower.import(node))),
            "function_declaration" | "method_declaration" => {
                decls.push(Decl::Func(lower.func(node)))
            }
            _ => decls.push(Decl::Other(span_of(node))),
        }
    }

    let package = package.ok_or_else(|| SyntaxError::MissingPackage {
        found: "EOF".into(),
    })?;
    Ok(SourceFile::new(source, package, decls))
}

/// Depth-first search for the first error or missing node.
fn first_error(node: Node<'_>, src: &str) -> Option<SyntaxError> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("expected {}", node.kind())
        } else {
            let text = &src[node.byte_range()];
            let token = text.split_whitespace().next().unwrap_or("EOF");
            format!("unexpected {token}")
        };
        return Some(SyntaxError::Invalid {
            line: pos.row + 1,
            column: pos.column + 1,
            message,
        });
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(|child| first_error(child, src))
}

fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Lowers tree-sitter nodes into the owned model.
struct Lower<'a> {
    src: &'a str,
}

impl Lower<'_> {
    fn text(&self, node: Node<'_>) -> String {
        self.src[node.byte_range()].to_string()
    }

    fn field(&self, node: Node<'_>, name: &str) -> Option<String> {
        node.child_by_field_name(name).map(|n| self.text(n))
    }

    fn package(&self, node: Node<'_>) -> PackageClause {
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_identifier")
            .map(|n| self.text(n))
            .unwrap_or_default();
        PackageClause {
            name,
            span: span_of(node),
        }
    }

    fn import(&self, node: Node<'_>) -> ImportDecl {
        let mut specs = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => specs.push(self.import_spec(child)),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    specs.extend(
                        child
                            .named_children(&mut inner)
                            .filter(|n| n.kind() == "import_spec")
                            .map(|n| self.import_spec(n)),
                    );
                }
                _ => {}
            }
        }
        ImportDecl {
            specs,
            span: Some(span_of(node)),
        }
    }

    fn import_spec(&self, node: Node<'_>) -> ImportSpec {
        ImportSpec {
            name: self.field(node, "name"),
            path: self.field(node, "path").unwrap_or_default(),
        }
    }

    fn func(&self, node: Node<'_>) -> FuncDecl {
        let params = node
            .child_by_field_name("parameters")
            .map(|list| {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|n| {
                        matches!(
                            n.kind(),
                            "parameter_declaration" | "variadic_parameter_declaration"
                        )
                    })
                    .map(|n| self.text(n))
                    .collect()
            })
            .unwrap_or_default();

        FuncDecl {
            name: self.field(node, "name").unwrap_or_default(),
            receiver: self.field(node, "receiver"),
            params,
            result: self.field(node, "result"),
            body: node.child_by_field_name("body").map(|b| self.block(b)),
            span: Some(span_of(node)),
        }
    }

    fn block(&self, node: Node<'_>) -> Block {
        let mut stmts = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "comment" => {}
                // Newer grammars wrap the statements in a list node.
                "statement_list" => {
                    let mut inner = child.walk();
                    stmts.extend(
                        child
                            .named_children(&mut inner)
                            .filter(|n| n.kind() != "comment")
                            .map(|n| Stmt::Verbatim(span_of(n))),
                    );
                }
                _ => stmts.push(Stmt::Verbatim(span_of(child))),
            }
        }
        Block {
            stmts,
            span: Some(span_of(node)),
        }
    }
}
