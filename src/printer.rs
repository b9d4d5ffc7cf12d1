//! S-expression rendering of syntax trees, used by `Display`.

use super::ast::{
    Binary, Call, Expr, For, Function, If, Number, OperatorKind, Prototype, Unary, VarBinding,
    Variable,
};
use super::visit::Visitor;
use std::fmt;

pub struct Printer;

impl Visitor for Printer {
    type Output = String;

    fn visit_number(&mut self, node: &Number) -> String {
        node.value.to_string()
    }

    fn visit_variable(&mut self, node: &Variable) -> String {
        node.name.clone()
    }

    fn visit_unary(&mut self, node: &Unary) -> String {
        format!("({} {})", node.op, node.operand.accept(self))
    }

    fn visit_binary(&mut self, node: &Binary) -> String {
        format!(
            "({} {} {})",
            node.op,
            node.lhs.accept(self),
            node.rhs.accept(self)
        )
    }

    fn visit_call(&mut self, node: &Call) -> String {
        let mut out = format!("(call {}", node.callee);
        for arg in &node.args {
            out.push(' ');
            out.push_str(&arg.accept(self));
        }
        out.push(')');
        out
    }

    fn visit_if(&mut self, node: &If) -> String {
        format!(
            "(if {} {} {})",
            node.cond.accept(self),
            node.then.accept(self),
            node.otherwise.accept(self)
        )
    }

    fn visit_for(&mut self, node: &For) -> String {
        let step = match &node.step {
            Some(step) => format!(" {}", step.accept(self)),
            None => String::new(),
        };
        format!(
            "(for ({} {} {}{}) {})",
            node.var,
            node.start.accept(self),
            node.end.accept(self),
            step,
            node.body.accept(self)
        )
    }

    fn visit_var(&mut self, node: &VarBinding) -> String {
        let bindings: Vec<String> = node
            .bindings
            .iter()
            .map(|(name, init)| match init {
                Some(init) => format!("({} {})", name, init.accept(self)),
                None => format!("({})", name),
            })
            .collect();
        format!("(var ({}) {})", bindings.join(" "), node.body.accept(self))
    }

    fn visit_prototype(&mut self, node: &Prototype) -> String {
        let precedence = match node.kind {
            OperatorKind::Infix => format!(" {}", node.precedence),
            _ => String::new(),
        };
        format!(
            "(proto {}{} ({}))",
            node.name,
            precedence,
            node.params.join(" ")
        )
    }

    fn visit_function(&mut self, node: &Function) -> String {
        format!(
            "(def {} {})",
            node.proto.accept(self),
            node.body.accept(self)
        )
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.accept(&mut Printer))
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.accept(&mut Printer))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.accept(&mut Printer))
    }
}
