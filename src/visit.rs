//! Double dispatch over the syntax tree.
//!
//! [`Visitor`] computes a value per node and must handle every variant.
//! [`Visit`] only traverses: its default methods descend into children in
//! field order, so an implementation overrides just the nodes it cares
//! about and calls the matching `walk_*` function to keep descending.

use super::ast::{Binary, Call, Expr, For, Function, If, Number, Prototype, Unary, VarBinding, Variable};

pub trait Visitor {
    type Output;

    fn visit_number(&mut self, node: &Number) -> Self::Output;
    fn visit_variable(&mut self, node: &Variable) -> Self::Output;
    fn visit_unary(&mut self, node: &Unary) -> Self::Output;
    fn visit_binary(&mut self, node: &Binary) -> Self::Output;
    fn visit_call(&mut self, node: &Call) -> Self::Output;
    fn visit_if(&mut self, node: &If) -> Self::Output;
    fn visit_for(&mut self, node: &For) -> Self::Output;
    fn visit_var(&mut self, node: &VarBinding) -> Self::Output;
    fn visit_prototype(&mut self, node: &Prototype) -> Self::Output;
    fn visit_function(&mut self, node: &Function) -> Self::Output;
}

pub trait Visit {
    fn visit_expr(&mut self, node: &Expr) {
        walk_expr(self, node)
    }

    fn visit_number(&mut self, _node: &Number) {}

    fn visit_variable(&mut self, _node: &Variable) {}

    fn visit_unary(&mut self, node: &Unary) {
        walk_unary(self, node)
    }

    fn visit_binary(&mut self, node: &Binary) {
        walk_binary(self, node)
    }

    fn visit_call(&mut self, node: &Call) {
        walk_call(self, node)
    }

    fn visit_if(&mut self, node: &If) {
        walk_if(self, node)
    }

    fn visit_for(&mut self, node: &For) {
        walk_for(self, node)
    }

    fn visit_var(&mut self, node: &VarBinding) {
        walk_var(self, node)
    }

    fn visit_prototype(&mut self, _node: &Prototype) {}

    fn visit_function(&mut self, node: &Function) {
        walk_function(self, node)
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, node: &Expr) {
    match node {
        Expr::Number(n) => v.visit_number(n),
        Expr::Variable(n) => v.visit_variable(n),
        Expr::Unary(n) => v.visit_unary(n),
        Expr::Binary(n) => v.visit_binary(n),
        Expr::Call(n) => v.visit_call(n),
        Expr::If(n) => v.visit_if(n),
        Expr::For(n) => v.visit_for(n),
        Expr::Var(n) => v.visit_var(n),
    }
}

pub fn walk_unary<V: Visit + ?Sized>(v: &mut V, node: &Unary) {
    v.visit_expr(&node.operand);
}

pub fn walk_binary<V: Visit + ?Sized>(v: &mut V, node: &Binary) {
    v.visit_expr(&node.lhs);
    v.visit_expr(&node.rhs);
}

pub fn walk_call<V: Visit + ?Sized>(v: &mut V, node: &Call) {
    for arg in &node.args {
        v.visit_expr(arg);
    }
}

pub fn walk_if<V: Visit + ?Sized>(v: &mut V, node: &If) {
    v.visit_expr(&node.cond);
    v.visit_expr(&node.then);
    v.visit_expr(&node.otherwise);
}

pub fn walk_for<V: Visit + ?Sized>(v: &mut V, node: &For) {
    v.visit_expr(&node.start);
    v.visit_expr(&node.end);
    if let Some(step) = &node.step {
        v.visit_expr(step);
    }
    v.visit_expr(&node.body);
}

pub fn walk_var<V: Visit + ?Sized>(v: &mut V, node: &VarBinding) {
    for (_, init) in &node.bindings {
        if let Some(init) = init {
            v.visit_expr(init);
        }
    }
    v.visit_expr(&node.body);
}

pub fn walk_function<V: Visit + ?Sized>(v: &mut V, node: &Function) {
    v.visit_prototype(&node.proto);
    v.visit_expr(&node.body);
}

impl Expr {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Number(n) => visitor.visit_number(n),
            Expr::Variable(n) => visitor.visit_variable(n),
            Expr::Unary(n) => visitor.visit_unary(n),
            Expr::Binary(n) => visitor.visit_binary(n),
            Expr::Call(n) => visitor.visit_call(n),
            Expr::If(n) => visitor.visit_if(n),
            Expr::For(n) => visitor.visit_for(n),
            Expr::Var(n) => visitor.visit_var(n),
        }
    }

    pub fn walk<V: Visit + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_expr(self)
    }
}

impl Prototype {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_prototype(self)
    }

    pub fn walk<V: Visit + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_prototype(self)
    }
}

impl Function {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_function(self)
    }

    pub fn walk<V: Visit + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_function(self)
    }
}
