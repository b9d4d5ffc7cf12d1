//! Syntax tree produced by the parser.
//!
//! Every compound node owns its children; nothing in the tree is shared or
//! mutated once the parser has returned it.

use super::session::DEFAULT_BINARY_PRECEDENCE;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Number),
    Variable(Variable),
    Unary(Unary),
    Binary(Binary),
    Call(Call),
    If(If),
    For(For),
    Var(VarBinding),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: char,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: char,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub cond: Box<Expr>,
    pub then: Box<Expr>,
    pub otherwise: Box<Expr>,
}

/// `for var = start, end [, step] in body`; a missing step means 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub var: String,
    pub start: Box<Expr>,
    pub end: Box<Expr>,
    pub step: Option<Box<Expr>>,
    pub body: Box<Expr>,
}

/// `var a [= init], b [= init] in body`; a missing initializer means 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBinding {
    pub bindings: Vec<(String, Option<Expr>)>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    None,
    Prefix,
    Infix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub kind: OperatorKind,
    pub precedence: i32,
}

impl Prototype {
    pub fn new(name: String, params: Vec<String>) -> Self {
        Prototype {
            name,
            params,
            kind: OperatorKind::None,
            precedence: DEFAULT_BINARY_PRECEDENCE,
        }
    }

    pub fn is_unary_op(&self) -> bool {
        self.kind == OperatorKind::Prefix
    }

    pub fn is_binary_op(&self) -> bool {
        self.kind == OperatorKind::Infix
    }

    /// The declared operator character, for `unary`/`binary` prototypes.
    pub fn operator_name(&self) -> Option<char> {
        match self.kind {
            OperatorKind::None => None,
            _ => self.name.chars().last(),
        }
    }

    /// Number of operands an operator of this kind takes.
    pub fn operand_count(&self) -> Option<usize> {
        match self.kind {
            OperatorKind::None => None,
            OperatorKind::Prefix => Some(1),
            OperatorKind::Infix => Some(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
}

/// Name of the function a top-level expression is wrapped in. `_` cannot
/// start or appear in an identifier, so no user definition can clash.
pub const ANONYMOUS_FUNCTION_NAME: &str = "__anon_expr";

pub fn unary_function_name(op: char) -> String {
    format!("unary{}", op)
}

pub fn binary_function_name(op: char) -> String {
    format!("binary{}", op)
}

// Shorthand constructors, mostly for building expected trees.
impl Expr {
    pub fn number(value: f64) -> Expr {
        Expr::Number(Number { value })
    }

    pub fn variable(name: &str) -> Expr {
        Expr::Variable(Variable {
            name: name.to_owned(),
        })
    }

    pub fn unary(op: char, operand: Expr) -> Expr {
        Expr::Unary(Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: char, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
        Expr::Call(Call {
            callee: callee.to_owned(),
            args,
        })
    }
}
