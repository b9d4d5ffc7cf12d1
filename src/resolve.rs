//! Name resolution over completed top-level forms.
//!
//! [`Resolver`] is a [`Listener`] that checks every form the parser hands
//! over: variables must be bound by an enclosing function parameter, `var`
//! or `for`; calls must name a known function with the right number of
//! arguments; operators must be built in or declared by a `unary`/`binary`
//! function. Nothing is evaluated or generated.

use super::ast::{
    binary_function_name, unary_function_name, Binary, Call, For, Function, If, Number,
    Prototype, Unary, VarBinding, Variable,
};
use super::error::{ErrorKind, Result};
use super::listener::{FormKind, Listener};
use super::scope::ScopeStack;
use super::session::BUILTIN_OPERATORS;
use super::visit::Visitor;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Parameter,
    Local,
    Induction,
}

/// Outcome of resolving one top-level form.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub kind: FormKind,
    pub name: String,
    pub result: std::result::Result<(), ErrorKind>,
}

#[derive(Debug, Default)]
pub struct Resolver {
    scopes: ScopeStack<Binding>,
    functions: HashMap<String, Prototype>,
    defined: HashSet<String>,
    resolutions: Vec<Resolution>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver::default()
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn prototype(&self, name: &str) -> Option<&Prototype> {
        self.functions.get(name)
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    fn declare(&mut self, proto: &Prototype) -> Result<()> {
        if let Some(known) = self.functions.get(&proto.name) {
            if known.params.len() != proto.params.len() {
                return Err(ErrorKind::ArityMismatch {
                    callee: proto.name.clone(),
                    expected: known.params.len(),
                    found: proto.params.len(),
                }
                .into());
            }
        }
        self.functions.insert(proto.name.clone(), proto.clone());
        Ok(())
    }

    fn define(&mut self, function: &Function) -> Result<()> {
        let name = &function.proto.name;
        if self.defined.contains(name) {
            return Err(ErrorKind::Redefinition(name.clone()).into());
        }
        let previous = self.functions.get(name).cloned();
        // Declared first so the body may call itself.
        self.declare(&function.proto)?;
        match function.accept(self) {
            Ok(()) => {
                self.defined.insert(name.clone());
                Ok(())
            }
            Err(e) => {
                match previous {
                    Some(proto) => self.functions.insert(name.clone(), proto),
                    None => self.functions.remove(name),
                };
                Err(e)
            }
        }
    }

    fn record(&mut self, kind: FormKind, name: &str, result: Result<()>) {
        let result = result.map_err(|e| e.kind().clone());
        match &result {
            Ok(()) => debug!(?kind, name, "resolved"),
            Err(e) => warn!(?kind, name, "{}", e),
        }
        self.resolutions.push(Resolution {
            kind,
            name: name.to_owned(),
            result,
        });
    }

    fn is_binary_operator(&self, op: char) -> bool {
        BUILTIN_OPERATORS.iter().any(|(builtin, _)| *builtin == op)
            || self.functions.contains_key(&binary_function_name(op))
    }
}

impl Visitor for Resolver {
    type Output = Result<()>;

    fn visit_number(&mut self, _node: &Number) -> Result<()> {
        Ok(())
    }

    fn visit_variable(&mut self, node: &Variable) -> Result<()> {
        match self.scopes.lookup(&node.name) {
            Some(_) => Ok(()),
            None => Err(ErrorKind::UnknownVariable(node.name.clone()).into()),
        }
    }

    fn visit_unary(&mut self, node: &Unary) -> Result<()> {
        node.operand.accept(self)?;
        if !self.functions.contains_key(&unary_function_name(node.op)) {
            return Err(ErrorKind::UnknownUnaryOperator(node.op).into());
        }
        Ok(())
    }

    fn visit_binary(&mut self, node: &Binary) -> Result<()> {
        node.lhs.accept(self)?;
        node.rhs.accept(self)?;
        if !self.is_binary_operator(node.op) {
            return Err(ErrorKind::UnknownBinaryOperator(node.op).into());
        }
        Ok(())
    }

    fn visit_call(&mut self, node: &Call) -> Result<()> {
        let expected = match self.functions.get(&node.callee) {
            Some(proto) => proto.params.len(),
            None => return Err(ErrorKind::UnknownFunction(node.callee.clone()).into()),
        };
        if expected != node.args.len() {
            return Err(ErrorKind::ArityMismatch {
                callee: node.callee.clone(),
                expected,
                found: node.args.len(),
            }
            .into());
        }
        for arg in &node.args {
            arg.accept(self)?;
        }
        Ok(())
    }

    fn visit_if(&mut self, node: &If) -> Result<()> {
        node.cond.accept(self)?;
        node.then.accept(self)?;
        node.otherwise.accept(self)
    }

    fn visit_for(&mut self, node: &For) -> Result<()> {
        node.start.accept(self)?;

        let _scope = self.scopes.enter_scope();
        self.scopes.bind(&node.var, Binding::Induction);
        node.end.accept(self)?;
        if let Some(step) = &node.step {
            step.accept(self)?;
        }
        node.body.accept(self)
    }

    fn visit_var(&mut self, node: &VarBinding) -> Result<()> {
        let _scope = self.scopes.enter_scope();
        for (name, init) in &node.bindings {
            // The initializer cannot see the name it initializes.
            if let Some(init) = init {
                init.accept(self)?;
            }
            self.scopes.bind(name, Binding::Local);
        }
        node.body.accept(self)
    }

    fn visit_prototype(&mut self, _node: &Prototype) -> Result<()> {
        Ok(())
    }

    fn visit_function(&mut self, node: &Function) -> Result<()> {
        node.proto.accept(self)?;
        let _scope = self.scopes.enter_scope();
        for param in &node.proto.params {
            self.scopes.bind(param, Binding::Parameter);
        }
        node.body.accept(self)
    }
}

impl Listener for Resolver {
    fn exit_definition(&mut self, function: Function) {
        let result = self.define(&function);
        self.record(FormKind::Definition, &function.proto.name, result);
    }

    fn exit_extern(&mut self, proto: Prototype) {
        let result = self.declare(&proto);
        self.record(FormKind::Extern, &proto.name, result);
    }

    fn exit_top_level_expression(&mut self, function: Function) {
        let result = function.accept(self);
        self.record(FormKind::TopLevelExpression, &function.proto.name, result);
    }
}
