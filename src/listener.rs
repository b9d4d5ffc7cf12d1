//! Enter/exit notifications for completed top-level forms.

use super::ast::{Function, Prototype};
use super::error::{ErrorKind, Result};
use std::collections::VecDeque;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Definition,
    Extern,
    TopLevelExpression,
}

/// A successfully parsed top-level form.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Definition(Function),
    Extern(Prototype),
    TopLevelExpression(Function),
}

impl Form {
    pub fn kind(&self) -> FormKind {
        match self {
            Form::Definition(_) => FormKind::Definition,
            Form::Extern(_) => FormKind::Extern,
            Form::TopLevelExpression(_) => FormKind::TopLevelExpression,
        }
    }
}

/// Reactions of a semantic consumer to completed top-level forms.
///
/// `enter_*` sees the node first, then `exit_*` receives it by value; the
/// parser keeps nothing once the exit call returns.
pub trait Listener {
    fn enter_definition(&mut self, _function: &Function) {}

    fn exit_definition(&mut self, _function: Function) {}

    fn enter_extern(&mut self, _proto: &Prototype) {}

    fn exit_extern(&mut self, _proto: Prototype) {}

    fn enter_top_level_expression(&mut self, _function: &Function) {}

    fn exit_top_level_expression(&mut self, _function: Function) {}
}

/// Collects every completed form in order.
impl Listener for Vec<Form> {
    fn exit_definition(&mut self, function: Function) {
        self.push(Form::Definition(function));
    }

    fn exit_extern(&mut self, proto: Prototype) {
        self.push(Form::Extern(proto));
    }

    fn exit_top_level_expression(&mut self, function: Function) {
        self.push(Form::TopLevelExpression(function));
    }
}

pub(crate) struct ParseEvents<'l> {
    descent: Vec<FormKind>,
    pending: VecDeque<Form>,
    listener: Option<&'l mut dyn Listener>,
}

impl<'l> ParseEvents<'l> {
    pub(crate) fn new(listener: Option<&'l mut dyn Listener>) -> Self {
        ParseEvents {
            descent: Vec::new(),
            pending: VecDeque::new(),
            listener,
        }
    }

    pub(crate) fn set_listener(&mut self, listener: &'l mut dyn Listener) {
        self.listener = Some(listener);
    }

    pub(crate) fn enter_rule(&mut self, kind: FormKind) {
        trace!(?kind, "enter rule");
        self.descent.push(kind);
    }

    /// Closes the innermost open rule. `None` means the rule failed to parse
    /// and nothing will be delivered for it.
    pub(crate) fn exit_rule(&mut self, result: Option<Form>) -> Result<()> {
        let kind = self
            .descent
            .pop()
            .ok_or_else(|| ErrorKind::Internal("exit_rule without enter_rule".to_owned()))?;
        trace!(?kind, success = result.is_some(), "exit rule");
        match result {
            Some(form) if form.kind() != kind => Err(ErrorKind::Internal(format!(
                "rule {:?} produced a {:?}",
                kind,
                form.kind()
            ))
            .into()),
            Some(form) => {
                self.pending.push_back(form);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Delivers queued forms to the listener, enter before exit.
    pub(crate) fn listen(&mut self) {
        let listener = match self.listener.as_mut() {
            Some(listener) => listener,
            None => {
                self.pending.clear();
                return;
            }
        };
        while let Some(form) = self.pending.pop_front() {
            match form {
                Form::Definition(function) => {
                    listener.enter_definition(&function);
                    listener.exit_definition(function);
                }
                Form::Extern(proto) => {
                    listener.enter_extern(&proto);
                    listener.exit_extern(proto);
                }
                Form::TopLevelExpression(function) => {
                    listener.enter_top_level_expression(&function);
                    listener.exit_top_level_expression(function);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.pending.len()
    }
}
