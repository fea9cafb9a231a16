use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::Value;

/// One lexical frame: a binding table chained to an optional parent.
/// Frames are shared through `Rc` so a closure can keep its defining
/// frame alive after the call that created it returns.
#[derive(Debug, Default)]
pub struct Environment {
  record: HashMap<String, Value>,
  parent: Option<Rc<RefCell<Environment>>>
}

impl Environment {
  pub fn new(parent: Option<Rc<RefCell<Environment>>>) -> Self {
    Environment {
      record: HashMap::new(),
      parent
    }
  }

  /// A fresh empty frame chained to `parent`.
  pub fn extend(parent: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
    Rc::new(RefCell::new(Environment::new(Some(Rc::clone(parent)))))
  }

  // (let x 10)
  // Bindings are single-assignment within a frame; shadowing an
  // ancestor is allowed.
  pub fn define(&mut self, id: &str, value: Value) -> Result<(), RuntimeError> {
    if self.record.contains_key(id) {
      return Err(RuntimeError::rebind_error(id));
    }
    self.record.insert(id.to_string(), value);
    Ok(())
  }

  // x
  pub fn lookup(&self, id: &str) -> Result<Value, RuntimeError> {
    match self.record.get(id) {
      Some(value) => Ok(value.clone()),
      None => match &self.parent {
        Some(parent_env) => parent_env.borrow().lookup(id),
        None => Err(RuntimeError::unbound_name(id))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use super::Environment;
  use crate::error::RuntimeErrorKind;
  use crate::Value;

  #[test]
  fn define_and_lookup() {
    let mut env = Environment::new(None);

    let x = env.define("x", Value::Int(10));
    assert!(matches!(x, Ok(())));

    let x = env.lookup("x");
    assert!(matches!(x, Ok(Value::Int(10))));
  }

  #[test]
  fn rebind_in_same_frame() {
    let mut env = Environment::new(None);

    let _ = env.define("x", Value::Int(10));
    let rebound = env.define("x", Value::Int(20));
    assert_eq!(rebound.unwrap_err().kind, RuntimeErrorKind::Rebind);

    // the original binding is untouched
    assert!(matches!(env.lookup("x"), Ok(Value::Int(10))));
  }

  #[test]
  fn lookup_walks_the_parent_chain() {
    let global = Rc::new(RefCell::new(Environment::new(None)));
    let _ = global.borrow_mut().define("x", Value::Int(1));

    let child = Environment::extend(&global);
    let grandchild = Environment::extend(&child);

    assert!(matches!(grandchild.borrow().lookup("x"), Ok(Value::Int(1))));
  }

  #[test]
  fn shadowing_resolves_to_the_innermost_frame() {
    let global = Rc::new(RefCell::new(Environment::new(None)));
    let _ = global.borrow_mut().define("x", Value::Int(1));

    let child = Environment::extend(&global);
    let shadowed = child.borrow_mut().define("x", Value::Int(2));
    assert!(matches!(shadowed, Ok(())));

    assert!(matches!(child.borrow().lookup("x"), Ok(Value::Int(2))));
    assert!(matches!(global.borrow().lookup("x"), Ok(Value::Int(1))));
  }

  #[test]
  fn unbound_name() {
    let env = Environment::new(None);
    let missing = env.lookup("nope");
    assert_eq!(missing.unwrap_err().kind, RuntimeErrorKind::UnboundName);
  }
}
