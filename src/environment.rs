use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Scopes are shared: a closure and the block that created it hold the same
/// frame, so writes through either are visible to both.
pub type SharedEnv = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<SharedEnv>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: SharedEnv) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn into_shared(self) -> SharedEnv {
        Rc::new(RefCell::new(self))
    }

    /// Binds `name` in this frame, replacing any binding it already has here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The frame `distance` hops up the chain from `env`.
    pub fn ancestor(env: &SharedEnv, distance: usize, name: &Token) -> Result<SharedEnv> {
        let mut current = Rc::clone(env);

        for _ in 0..distance {
            let parent = current.borrow().enclosing.clone();
            current = parent.ok_or_else(|| {
                LoxError::runtime(name, format!("Scope for '{}' is missing.", name.lexeme))
            })?;
        }

        Ok(current)
    }

    /// Reads `name` from exactly the frame `distance` hops up; no search.
    pub fn get_at(env: &SharedEnv, distance: usize, name: &Token) -> Result<Value> {
        let frame = Self::ancestor(env, distance, name)?;
        let value = frame.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| undefined(name))
    }

    /// Writes `name` in exactly the frame `distance` hops up; no search.
    pub fn assign_at(env: &SharedEnv, distance: usize, name: &Token, value: Value) -> Result<()> {
        let frame = Self::ancestor(env, distance, name)?;
        let mut frame = frame.borrow_mut();

        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
