//! Closure-driven traversal helpers
//!
//! Checks are plain functions over the tree; these helpers only enumerate
//! nested expressions and statements. Traversal never enters class bodies
//! (anonymous classes, local types): those belong to a different type.

use super::nodes::*;

/// Visit `expr` and its subexpressions in pre-order. Returning `false` from the
/// callback skips the children of that node.
pub fn walk_expr<'a>(expr: &'a Expr, f: &mut dyn FnMut(&'a Expr) -> bool) {
    if !f(expr) {
        return;
    }
    match expr {
        Expr::Literal(_) | Expr::Identifier(_) | Expr::This(_) | Expr::Super(_) | Expr::ClassLiteral(_) | Expr::Erroneous(_) => {}
        Expr::FieldAccess(fa) => walk_expr(&fa.target, f),
        Expr::MethodCall(mc) => {
            if let Some(t) = &mc.target {
                walk_expr(t, f);
            }
            mc.arguments.iter().for_each(|a| walk_expr(a, f));
        }
        Expr::Binary(b) => {
            walk_expr(&b.left, f);
            walk_expr(&b.right, f);
        }
        Expr::Unary(u) => walk_expr(&u.operand, f),
        Expr::Assignment(a) => {
            walk_expr(&a.target, f);
            walk_expr(&a.value, f);
        }
        Expr::ArrayAccess(a) => {
            walk_expr(&a.array, f);
            walk_expr(&a.index, f);
        }
        Expr::Cast(c) => walk_expr(&c.expr, f),
        Expr::InstanceOf(i) => walk_expr(&i.expr, f),
        Expr::Conditional(c) => {
            walk_expr(&c.condition, f);
            walk_expr(&c.then_expr, f);
            walk_expr(&c.else_expr, f);
        }
        Expr::New(n) => {
            if let Some(o) = &n.outer {
                walk_expr(o, f);
            }
            n.arguments.iter().for_each(|a| walk_expr(a, f));
        }
        Expr::NewArray(n) => {
            n.dimensions.iter().for_each(|d| walk_expr(d, f));
            if let Some(init) = &n.initializer {
                init.elements.iter().for_each(|e| walk_expr(e, f));
            }
        }
        Expr::ArrayInitializer(init) => init.elements.iter().for_each(|e| walk_expr(e, f)),
        Expr::Lambda(l) => match &l.body {
            LambdaBody::Expr(e) => walk_expr(e, f),
            LambdaBody::Block(b) => walk_block(b, f),
        },
        Expr::MethodRef(m) => {
            if let MethodRefTarget::Expr(e) = &m.target {
                walk_expr(e, f);
            }
        }
        Expr::Switch(s) => walk_switch(s, f),
        Expr::Parenthesized(p) => walk_expr(&p.expr, f),
    }
}

pub fn walk_block<'a>(block: &'a Block, f: &mut dyn FnMut(&'a Expr) -> bool) {
    for stmt in &block.statements {
        walk_stmt(stmt, f);
    }
}

fn walk_switch<'a>(s: &'a SwitchBlock, f: &mut dyn FnMut(&'a Expr) -> bool) {
    walk_expr(&s.selector, f);
    for case in &s.cases {
        for label in &case.labels {
            for element in &label.elements {
                if let CaseLabelElement::Constant(c) = element {
                    walk_expr(c, f);
                }
            }
            if let Some(g) = &label.guard {
                walk_expr(g, f);
            }
        }
        match &case.body {
            CaseBody::Statements(stmts) => stmts.iter().for_each(|s| walk_stmt(s, f)),
            CaseBody::Expression(e) => walk_expr(e, f),
            CaseBody::Block(b) => walk_block(b, f),
            CaseBody::Throw(t) => walk_expr(&t.expr, f),
        }
    }
}

/// Visit every expression reachable from a statement
pub fn walk_stmt<'a>(stmt: &'a Stmt, f: &mut dyn FnMut(&'a Expr) -> bool) {
    match stmt {
        Stmt::Expression(e) => walk_expr(&e.expr, f),
        Stmt::Declaration(d) => {
            for v in &d.variables {
                if let Some(init) = &v.initializer {
                    walk_expr(init, f);
                }
            }
        }
        Stmt::TypeDecl(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
        Stmt::If(i) => {
            walk_expr(&i.condition, f);
            walk_stmt(&i.then_branch, f);
            if let Some(e) = &i.else_branch {
                walk_stmt(e, f);
            }
        }
        Stmt::While(w) => {
            walk_expr(&w.condition, f);
            walk_stmt(&w.body, f);
        }
        Stmt::DoWhile(d) => {
            walk_stmt(&d.body, f);
            walk_expr(&d.condition, f);
        }
        Stmt::For(fs) => {
            fs.init.iter().for_each(|s| walk_stmt(s, f));
            if let Some(c) = &fs.condition {
                walk_expr(c, f);
            }
            fs.update.iter().for_each(|u| walk_expr(u, f));
            walk_stmt(&fs.body, f);
        }
        Stmt::ForEach(fe) => {
            walk_expr(&fe.iterable, f);
            walk_stmt(&fe.body, f);
        }
        Stmt::Switch(s) => walk_switch(s, f),
        Stmt::Return(r) => {
            if let Some(v) = &r.value {
                walk_expr(v, f);
            }
        }
        Stmt::Yield(y) => walk_expr(&y.value, f),
        Stmt::Try(t) => {
            for r in &t.resources {
                match r {
                    TryResource::Var { initializer, .. } => walk_expr(initializer, f),
                    TryResource::Expr { expr, .. } => walk_expr(expr, f),
                }
            }
            walk_block(&t.try_block, f);
            t.catch_clauses.iter().for_each(|c| walk_block(&c.block, f));
            if let Some(fin) = &t.finally_block {
                walk_block(fin, f);
            }
        }
        Stmt::Throw(t) => walk_expr(&t.expr, f),
        Stmt::Assert(a) => {
            walk_expr(&a.condition, f);
            if let Some(m) = &a.message {
                walk_expr(m, f);
            }
        }
        Stmt::Synchronized(s) => {
            walk_expr(&s.lock, f);
            walk_block(&s.body, f);
        }
        Stmt::Labeled(l) => walk_stmt(&l.statement, f),
        Stmt::Block(b) => walk_block(b, f),
    }
}

/// Nested statements of a statement, one level deep, in source order
pub fn child_statements(stmt: &Stmt) -> Vec<&Stmt> {
    match stmt {
        Stmt::If(i) => {
            let mut v = vec![i.then_branch.as_ref()];
            if let Some(e) = &i.else_branch {
                v.push(e.as_ref());
            }
            v
        }
        Stmt::While(w) => vec![w.body.as_ref()],
        Stmt::DoWhile(d) => vec![d.body.as_ref()],
        Stmt::For(f) => f.init.iter().chain(std::iter::once(f.body.as_ref())).collect(),
        Stmt::ForEach(f) => vec![f.body.as_ref()],
        Stmt::Labeled(l) => vec![l.statement.as_ref()],
        Stmt::Block(b) => b.statements.iter().collect(),
        Stmt::Synchronized(s) => s.body.statements.iter().collect(),
        Stmt::Try(t) => t
            .try_block
            .statements
            .iter()
            .chain(t.catch_clauses.iter().flat_map(|c| c.block.statements.iter()))
            .chain(t.finally_block.iter().flat_map(|b| b.statements.iter()))
            .collect(),
        Stmt::Switch(s) => s
            .cases
            .iter()
            .flat_map(|c| match &c.body {
                CaseBody::Statements(stmts) => stmts.iter().collect::<Vec<_>>(),
                CaseBody::Block(b) => b.statements.iter().collect(),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeId, Span};

    fn ident(name: &str, id: u32) -> Expr {
        Expr::Identifier(IdentifierExpr { name: name.into(), id: NodeId(id), span: Span::default() })
    }

    #[test]
    fn walk_visits_nested_identifiers_in_order() {
        let e = Expr::Binary(BinaryExpr {
            left: Box::new(ident("a", 1)),
            operator: BinaryOp::Add,
            right: Box::new(Expr::Parenthesized(ParenExpr { expr: Box::new(ident("b", 2)), span: Span::default() })),
            span: Span::default(),
        });
        let mut names = Vec::new();
        walk_expr(&e, &mut |x| {
            if let Expr::Identifier(id) = x {
                names.push(id.name.clone());
            }
            true
        });
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn returning_false_prunes_children() {
        let e = Expr::Parenthesized(ParenExpr { expr: Box::new(ident("a", 1)), span: Span::default() });
        let mut count = 0;
        walk_expr(&e, &mut |_| {
            count += 1;
            false
        });
        assert_eq!(count, 1);
    }
}
