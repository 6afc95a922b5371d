//! Flow phase - constant folding and normal-completion analysis
//!
//! Corresponds to the parts of JavaC's `Flow` that the checker needs:
//! - constant expressions (JLS 15.29) and their values
//! - whether a statement can complete normally (JLS 14.22), used for
//!   switch fall-through, switch expression arms and pattern binding scope

use std::collections::HashSet;
use std::fmt;

use crate::ast::{BinaryOp, Block, CaseBody, Expr, Literal, Stmt, SwitchBlock, UnaryOp};

/// Value of a compile-time constant expression
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
}

impl ConstValue {
    /// Integral view used to compare `case` constants of int-like switches
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) => Some(*v as i64),
            ConstValue::Long(v) => Some(*v),
            ConstValue::Char(c) => Some(*c as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Float(v) => Some(*v as f64),
            ConstValue::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ConstValue::Int(_) | ConstValue::Char(_) => 0,
            ConstValue::Long(_) => 1,
            ConstValue::Float(_) => 2,
            ConstValue::Double(_) => 3,
            ConstValue::Bool(_) | ConstValue::Str(_) => 4,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{}", v),
            ConstValue::Long(v) => write!(f, "{}", v),
            ConstValue::Float(v) => write!(f, "{}", v),
            ConstValue::Double(v) => write!(f, "{}", v),
            ConstValue::Bool(v) => write!(f, "{}", v),
            ConstValue::Char(c) => write!(f, "{}", c),
            ConstValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Whether `expr` is a constant expression. Names (simple `X` or dotted
/// `T.X`) are constant when `is_constant_name` says so.
pub fn is_constant_expression(expr: &Expr, is_constant_name: &dyn Fn(&str) -> bool) -> bool {
    match expr {
        Expr::Literal(l) => l.value != Literal::Null,
        Expr::Identifier(id) => is_constant_name(&id.name),
        Expr::FieldAccess(_) => expr.as_qualified_name().map(|n| is_constant_name(&n)).unwrap_or(false),
        Expr::Parenthesized(p) => is_constant_expression(&p.expr, is_constant_name),
        Expr::Unary(u) => !u.operator.is_increment() && is_constant_expression(&u.operand, is_constant_name),
        Expr::Binary(b) => {
            is_constant_expression(&b.left, is_constant_name) && is_constant_expression(&b.right, is_constant_name)
        }
        Expr::Conditional(c) => {
            is_constant_expression(&c.condition, is_constant_name)
                && is_constant_expression(&c.then_expr, is_constant_name)
                && is_constant_expression(&c.else_expr, is_constant_name)
        }
        Expr::Cast(c) => {
            (c.target_type.is_primitive() || c.target_type.name == "String" || c.target_type.name == "java.lang.String")
                && is_constant_expression(&c.expr, is_constant_name)
        }
        _ => false,
    }
}

/// Fold an expression built from literals; `None` when it is not constant or
/// folding would fail at run time (integer division by zero)
pub fn constant_value(expr: &Expr) -> Option<ConstValue> {
    constant_value_with(expr, &|_| None)
}

/// Fold an expression, asking `lookup` for the value of names
pub fn constant_value_with(expr: &Expr, lookup: &dyn Fn(&str) -> Option<ConstValue>) -> Option<ConstValue> {
    match expr {
        Expr::Literal(l) => match &l.value {
            Literal::Int(v) => Some(ConstValue::Int(*v as i32)),
            Literal::Long(v) => Some(ConstValue::Long(*v)),
            Literal::Float(v) => Some(ConstValue::Float(*v as f32)),
            Literal::Double(v) => Some(ConstValue::Double(*v)),
            Literal::Boolean(b) => Some(ConstValue::Bool(*b)),
            Literal::Char(c) => Some(ConstValue::Char(*c)),
            Literal::String(s) => Some(ConstValue::Str(s.clone())),
            Literal::Null => None,
        },
        Expr::Identifier(id) => lookup(&id.name),
        Expr::FieldAccess(_) => expr.as_qualified_name().and_then(|n| lookup(&n)),
        Expr::Parenthesized(p) => constant_value_with(&p.expr, lookup),
        Expr::Unary(u) => fold_unary(u.operator, constant_value_with(&u.operand, lookup)?),
        Expr::Binary(b) => {
            let left = constant_value_with(&b.left, lookup)?;
            let right = constant_value_with(&b.right, lookup)?;
            fold_binary(b.operator, left, right)
        }
        Expr::Conditional(c) => {
            let cond = constant_value_with(&c.condition, lookup)?.as_bool()?;
            let then_v = constant_value_with(&c.then_expr, lookup)?;
            let else_v = constant_value_with(&c.else_expr, lookup)?;
            Some(if cond { then_v } else { else_v })
        }
        Expr::Cast(c) => cast(&c.target_type.name, c.target_type.array_dims, constant_value_with(&c.expr, lookup)?),
        _ => None,
    }
}

fn cast(target: &str, dims: usize, v: ConstValue) -> Option<ConstValue> {
    if dims > 0 {
        return None;
    }
    let f = v.as_f64();
    let i = v.as_i64();
    Some(match target {
        "int" => ConstValue::Int(i.map(|x| x as i32).or_else(|| f.map(|x| x as i32))?),
        "long" => ConstValue::Long(i.or_else(|| f.map(|x| x as i64))?),
        "short" => ConstValue::Int(i.map(|x| x as i16 as i32).or_else(|| f.map(|x| x as i32 as i16 as i32))?),
        "byte" => ConstValue::Int(i.map(|x| x as i8 as i32).or_else(|| f.map(|x| x as i32 as i8 as i32))?),
        "char" => ConstValue::Char(char::from_u32(i.or_else(|| f.map(|x| x as i64))? as u16 as u32)?),
        "float" => ConstValue::Float(f? as f32),
        "double" => ConstValue::Double(f?),
        "boolean" => ConstValue::Bool(v.as_bool()?),
        "String" | "java.lang.String" => match v {
            ConstValue::Str(s) => ConstValue::Str(s),
            _ => return None,
        },
        _ => return None,
    })
}

fn fold_unary(op: UnaryOp, v: ConstValue) -> Option<ConstValue> {
    match (op, v) {
        (UnaryOp::Plus, ConstValue::Char(c)) => Some(ConstValue::Int(c as i32)),
        (UnaryOp::Plus, v @ (ConstValue::Int(_) | ConstValue::Long(_) | ConstValue::Float(_) | ConstValue::Double(_))) => {
            Some(v)
        }
        (UnaryOp::Minus, ConstValue::Int(x)) => Some(ConstValue::Int(x.wrapping_neg())),
        (UnaryOp::Minus, ConstValue::Char(c)) => Some(ConstValue::Int(-(c as i32))),
        (UnaryOp::Minus, ConstValue::Long(x)) => Some(ConstValue::Long(x.wrapping_neg())),
        (UnaryOp::Minus, ConstValue::Float(x)) => Some(ConstValue::Float(-x)),
        (UnaryOp::Minus, ConstValue::Double(x)) => Some(ConstValue::Double(-x)),
        (UnaryOp::Not, ConstValue::Bool(b)) => Some(ConstValue::Bool(!b)),
        (UnaryOp::BitNot, ConstValue::Int(x)) => Some(ConstValue::Int(!x)),
        (UnaryOp::BitNot, ConstValue::Char(c)) => Some(ConstValue::Int(!(c as i32))),
        (UnaryOp::BitNot, ConstValue::Long(x)) => Some(ConstValue::Long(!x)),
        _ => None,
    }
}

fn fold_binary(op: BinaryOp, l: ConstValue, r: ConstValue) -> Option<ConstValue> {
    use BinaryOp::*;
    if op == Add && (matches!(l, ConstValue::Str(_)) || matches!(r, ConstValue::Str(_))) {
        return Some(ConstValue::Str(format!("{}{}", l, r)));
    }
    if let (ConstValue::Bool(a), ConstValue::Bool(b)) = (&l, &r) {
        let (a, b) = (*a, *b);
        return Some(ConstValue::Bool(match op {
            LogicalAnd | And => a && b,
            LogicalOr | Or => a || b,
            Xor | Ne => a != b,
            Eq => a == b,
            _ => return None,
        }));
    }
    if matches!(op, LShift | RShift | URShift) {
        let shift = r.as_i64()?;
        return match l {
            ConstValue::Int(_) | ConstValue::Char(_) => {
                let a = l.as_i64()? as i32;
                let s = (shift & 0x1f) as u32;
                Some(ConstValue::Int(match op {
                    LShift => a.wrapping_shl(s),
                    RShift => a.wrapping_shr(s),
                    _ => ((a as u32).wrapping_shr(s)) as i32,
                }))
            }
            ConstValue::Long(a) => {
                let s = (shift & 0x3f) as u32;
                Some(ConstValue::Long(match op {
                    LShift => a.wrapping_shl(s),
                    RShift => a.wrapping_shr(s),
                    _ => ((a as u64).wrapping_shr(s)) as i64,
                }))
            }
            _ => None,
        };
    }
    let rank = l.rank().max(r.rank());
    if rank == 4 {
        // string comparison is not a constant operation apart from concatenation
        return None;
    }
    if rank >= 2 {
        let (a, b) = (l.as_f64()?, r.as_f64()?);
        let wrap = |v: f64| if rank == 2 { ConstValue::Float(v as f32) } else { ConstValue::Double(v) };
        return Some(match op {
            Add => wrap(a + b),
            Sub => wrap(a - b),
            Mul => wrap(a * b),
            Div => wrap(a / b),
            Mod => wrap(a % b),
            Lt => ConstValue::Bool(a < b),
            Le => ConstValue::Bool(a <= b),
            Gt => ConstValue::Bool(a > b),
            Ge => ConstValue::Bool(a >= b),
            Eq => ConstValue::Bool(a == b),
            Ne => ConstValue::Bool(a != b),
            _ => return None,
        });
    }
    let (a, b) = (l.as_i64()?, r.as_i64()?);
    let compare = match op {
        Lt => Some(a < b),
        Le => Some(a <= b),
        Gt => Some(a > b),
        Ge => Some(a >= b),
        Eq => Some(a == b),
        Ne => Some(a != b),
        _ => None,
    };
    if let Some(c) = compare {
        return Some(ConstValue::Bool(c));
    }
    if matches!(op, Div | Mod) && b == 0 {
        return None;
    }
    if rank == 1 {
        Some(ConstValue::Long(match op {
            Add => a.wrapping_add(b),
            Sub => a.wrapping_sub(b),
            Mul => a.wrapping_mul(b),
            Div => a.wrapping_div(b),
            Mod => a.wrapping_rem(b),
            And => a & b,
            Or => a | b,
            Xor => a ^ b,
            _ => return None,
        }))
    } else {
        let (a, b) = (a as i32, b as i32);
        Some(ConstValue::Int(match op {
            Add => a.wrapping_add(b),
            Sub => a.wrapping_sub(b),
            Mul => a.wrapping_mul(b),
            Div => a.wrapping_div(b),
            Mod => a.wrapping_rem(b),
            And => a & b,
            Or => a | b,
            Xor => a ^ b,
            _ => return None,
        }))
    }
}

fn is_constant_true(expr: &Expr) -> bool {
    constant_value(expr).and_then(|v| v.as_bool()) == Some(true)
}

/// Whether execution can fall off the end of a statement sequence
pub fn statements_can_complete_normally(stmts: &[Stmt]) -> bool {
    stmts.iter().all(can_complete_normally)
}

pub fn block_can_complete_normally(block: &Block) -> bool {
    statements_can_complete_normally(&block.statements)
}

/// JLS 14.22, conservatively: unknown situations count as completing normally
pub fn can_complete_normally(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) | Stmt::Throw(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Yield(_) => false,
        Stmt::Block(b) => block_can_complete_normally(b),
        Stmt::If(i) => match &i.else_branch {
            Some(e) => can_complete_normally(&i.then_branch) || can_complete_normally(e),
            None => true,
        },
        Stmt::While(w) => !is_constant_true(&w.condition) || has_exiting_break(&w.body),
        Stmt::DoWhile(d) => {
            (can_complete_normally(&d.body) && !is_constant_true(&d.condition)) || has_exiting_break(&d.body)
        }
        Stmt::For(f) => {
            let infinite = f.condition.as_ref().map(is_constant_true).unwrap_or(true);
            !infinite || has_exiting_break(&f.body)
        }
        Stmt::Labeled(l) => can_complete_normally(&l.statement) || breaks_to_label(&l.statement, &l.label),
        Stmt::Synchronized(s) => block_can_complete_normally(&s.body),
        Stmt::Try(t) => {
            if let Some(fin) = &t.finally_block {
                if !block_can_complete_normally(fin) {
                    return false;
                }
            }
            block_can_complete_normally(&t.try_block) || t.catch_clauses.iter().any(|c| block_can_complete_normally(&c.block))
        }
        Stmt::Switch(s) => switch_statement_can_complete_normally(s),
        _ => true,
    }
}

fn switch_statement_can_complete_normally(s: &SwitchBlock) -> bool {
    if !s.has_default() && !s.has_patterns() {
        return true;
    }
    let body_breaks = s.cases.iter().any(|c| match &c.body {
        CaseBody::Statements(stmts) => stmts.iter().any(has_exiting_break),
        CaseBody::Block(b) => b.statements.iter().any(has_exiting_break),
        _ => false,
    });
    if body_breaks {
        return true;
    }
    match s.cases.last() {
        None => true,
        Some(_) if s.uses_arrows() => s.cases.iter().any(|c| match &c.body {
            CaseBody::Expression(_) => true,
            CaseBody::Block(b) => block_can_complete_normally(b),
            CaseBody::Statements(stmts) => statements_can_complete_normally(stmts),
            CaseBody::Throw(_) => false,
        }),
        Some(last) => match &last.body {
            CaseBody::Statements(stmts) => statements_can_complete_normally(stmts),
            _ => true,
        },
    }
}

/// Whether `stmt` contains a `break` that leaves the loop or switch whose
/// body it is
pub fn has_exiting_break(stmt: &Stmt) -> bool {
    let inner_labels = collect_inner_labels(stmt);
    breaks_out(stmt, &inner_labels, 0)
}

fn breaks_out(s: &Stmt, inner_labels: &HashSet<String>, depth: usize) -> bool {
    match s {
        Stmt::Break(b) => match &b.label {
            Some(label) => !inner_labels.contains(label),
            None => depth == 0,
        },
        Stmt::Block(b) => b.statements.iter().any(|sub| breaks_out(sub, inner_labels, depth)),
        Stmt::If(i) => {
            breaks_out(&i.then_branch, inner_labels, depth)
                || i.else_branch.as_ref().map(|e| breaks_out(e, inner_labels, depth)).unwrap_or(false)
        }
        Stmt::Labeled(l) => breaks_out(&l.statement, inner_labels, depth),
        Stmt::While(w) => breaks_out(&w.body, inner_labels, depth + 1),
        Stmt::DoWhile(d) => breaks_out(&d.body, inner_labels, depth + 1),
        Stmt::For(f) => breaks_out(&f.body, inner_labels, depth + 1),
        Stmt::ForEach(f) => breaks_out(&f.body, inner_labels, depth + 1),
        Stmt::Synchronized(sy) => sy.body.statements.iter().any(|sub| breaks_out(sub, inner_labels, depth)),
        Stmt::Try(t) => t
            .try_block
            .statements
            .iter()
            .chain(t.catch_clauses.iter().flat_map(|c| c.block.statements.iter()))
            .chain(t.finally_block.iter().flat_map(|f| f.statements.iter()))
            .any(|sub| breaks_out(sub, inner_labels, depth)),
        Stmt::Switch(sw) => sw.cases.iter().any(|c| match &c.body {
            CaseBody::Statements(stmts) => stmts.iter().any(|sub| breaks_out(sub, inner_labels, depth + 1)),
            CaseBody::Block(b) => b.statements.iter().any(|sub| breaks_out(sub, inner_labels, depth + 1)),
            _ => false,
        }),
        _ => false,
    }
}

fn breaks_to_label(stmt: &Stmt, label: &str) -> bool {
    let mut found = false;
    visit_statements(stmt, &mut |s| {
        if let Stmt::Break(b) = s {
            if b.label.as_deref() == Some(label) {
                found = true;
            }
        }
    });
    found
}

fn collect_inner_labels(stmt: &Stmt) -> HashSet<String> {
    let mut labels = HashSet::new();
    visit_statements(stmt, &mut |s| {
        if let Stmt::Labeled(l) = s {
            labels.insert(l.label.clone());
        }
    });
    labels
}

fn visit_statements<'a>(stmt: &'a Stmt, f: &mut dyn FnMut(&'a Stmt)) {
    f(stmt);
    for child in crate::ast::child_statements(stmt) {
        visit_statements(child, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassMember, Expr, Stmt};
    use crate::config::Config;
    use crate::parser::parse_source;

    fn method_body(src: &str) -> Vec<Stmt> {
        let (unit, diagnostics) = parse_source(src, &Config::default());
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        match &unit.type_decls[0].members()[0] {
            ClassMember::Method(m) => m.body.clone().expect("body").statements,
            _ => panic!("expected method"),
        }
    }

    fn field_init(src: &str) -> Expr {
        let (unit, _) = parse_source(src, &Config::default());
        match &unit.type_decls[0].members()[0] {
            ClassMember::Field(f) => f.initializer.clone().expect("initializer"),
            _ => panic!("expected field"),
        }
    }

    #[test]
    fn test_folds_int_arithmetic_with_wrapping() {
        let e = field_init("class A { int x = 2147483647 + 1; }");
        assert_eq!(constant_value(&e), Some(ConstValue::Int(i32::MIN)));
        let e = field_init("class A { String s = \"a\" + 1 + 'c'; }");
        assert_eq!(constant_value(&e), Some(ConstValue::Str("a1c".into())));
        let e = field_init("class A { int x = 1 / 0; }");
        assert_eq!(constant_value(&e), None);
    }

    #[test]
    fn test_constant_expression_names() {
        let e = field_init("class A { int x = Y * 2 + A.Z; }");
        assert!(is_constant_expression(&e, &|n| n == "Y" || n == "A.Z"));
        assert!(!is_constant_expression(&e, &|n| n == "Y"));
        let e = field_init("class A { Object o = null; }");
        assert!(!is_constant_expression(&e, &|_| true));
    }

    #[test]
    fn test_completion_of_common_statements() {
        let body = method_body("class A { void m(int x) { if (x > 0) return; else throw new RuntimeException(); } }");
        assert!(!statements_can_complete_normally(&body));
        let body = method_body("class A { void m() { while (true) { } } }");
        assert!(!statements_can_complete_normally(&body));
        let body = method_body("class A { void m() { while (true) { break; } } }");
        assert!(statements_can_complete_normally(&body));
        let body = method_body("class A { void m() { for (;;) { for (;;) { break; } } } }");
        assert!(!statements_can_complete_normally(&body));
        let body = method_body("class A { void m() { out: for (;;) { for (;;) { break out; } } } }");
        assert!(statements_can_complete_normally(&body));
    }

    #[test]
    fn test_try_finally_completion() {
        let body = method_body("class A { void m() { try { return; } finally { } } }");
        assert!(!statements_can_complete_normally(&body));
        let body = method_body("class A { void m() { try { return; } catch (RuntimeException e) { } } }");
        assert!(statements_can_complete_normally(&body));
    }
}
