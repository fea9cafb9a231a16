use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
  Syntax,
  UnknownForm,
  Arity,
  DuplicateParam,
  Rebind,
  UnboundName,
  NotCallable,
  Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
  pub kind: RuntimeErrorKind,
  pub message: String,
}

impl RuntimeError {
  pub fn new(kind: RuntimeErrorKind, message: String) -> Self {
    RuntimeError {
      kind,
      message
    }
  }

  pub fn syntax_error(details: String) -> Self {
    Self::new(RuntimeErrorKind::Syntax, format!("Syntax error: {}", details))
  }

  pub fn unknown_form(details: String) -> Self {
    Self::new(RuntimeErrorKind::UnknownForm, format!("Unknown form: {}", details))
  }

  pub fn arity_error(details: String) -> Self {
    Self::new(RuntimeErrorKind::Arity, format!("Arity error: {}", details))
  }

  pub fn duplicate_param(name: &str) -> Self {
    Self::new(
      RuntimeErrorKind::DuplicateParam,
      format!("duplicate parameter \"{}\" in parameter list.", name))
  }

  pub fn rebind_error(name: &str) -> Self {
    Self::new(
      RuntimeErrorKind::Rebind,
      format!("identifier \"{}\" has already been defined.", name))
  }

  pub fn unbound_name(name: &str) -> Self {
    Self::new(
      RuntimeErrorKind::UnboundName,
      format!("Reference error: variable \"{}\" is not defined.", name))
  }

  pub fn not_callable(details: String) -> Self {
    Self::new(RuntimeErrorKind::NotCallable, format!("Not callable: {}", details))
  }

  pub fn type_error(details: String) -> Self {
    Self::new(RuntimeErrorKind::Type, format!("Type error: {}", details))
  }
}

impl fmt::Display for RuntimeError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl std::error::Error for RuntimeError {}
