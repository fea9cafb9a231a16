use common::error::RuntimeError;
use common::{Expr, ParsedExpr, Value};

/// Maps raw s-expressions onto the core forms, rejecting malformed
/// shapes before anything is evaluated.
#[derive(Debug)]
pub struct Transformer {}

impl Transformer {
  pub fn new() -> Self {
    Transformer {}
  }

  pub fn transform(&self, parsed_exp: &ParsedExpr) -> Result<Expr, RuntimeError> {
    match parsed_exp {
      ParsedExpr::Int(n) => Ok(Expr::Literal(Value::Int(*n))),
      ParsedExpr::Symbol(name) => Ok(Expr::Identifier(name.clone())),
      ParsedExpr::List(elements) => self.transform_list(elements),
    }
  }

  fn transform_list(&self, elements: &[ParsedExpr]) -> Result<Expr, RuntimeError> {
    let (head, rest) = elements
      .split_first()
      .ok_or_else(|| RuntimeError::unknown_form("() is not an expression".to_string()))?;
    if let ParsedExpr::Symbol(keyword) = head {
      match keyword.as_str() {
        "do" => return self.transform_do(rest),
        "defn" => return self.transform_defn(rest),
        "fn" => return self.transform_fn(rest),
        "let" => return self.transform_let(rest),
        "if" => return self.transform_if(rest),
        _ => {}
      }
    }
    // Any other list is an application; the callee is a full form, so
    // ((fn (x) x) 1) works.
    let callee = self.transform(head)?;
    let args = rest
      .iter()
      .map(|element| self.transform(element))
      .collect::<Result<Vec<Expr>, RuntimeError>>()?;
    Ok(Expr::CallExpression(Box::new(callee), args))
  }

  // (do expr...)
  fn transform_do(&self, rest: &[ParsedExpr]) -> Result<Expr, RuntimeError> {
    if rest.is_empty() {
      return Err(RuntimeError::arity_error("do expects at least one expression".to_string()));
    }
    Ok(Expr::BlockStatement(self.transform_body(rest)?))
  }

  // (defn name (param...) body...)
  fn transform_defn(&self, rest: &[ParsedExpr]) -> Result<Expr, RuntimeError> {
    if rest.len() < 3 {
      return Err(RuntimeError::arity_error(
        "defn expects a name, a parameter list and a body".to_string(),
      ));
    }
    let name = self.symbol_name(&rest[0], "function name")?;
    let params = self.param_names(&rest[1])?;
    let body = self.transform_body(&rest[2..])?;
    Ok(Expr::FunctionDeclaration(name, params, body))
  }

  // (fn (param...) body...)
  fn transform_fn(&self, rest: &[ParsedExpr]) -> Result<Expr, RuntimeError> {
    if rest.len() < 2 {
      return Err(RuntimeError::arity_error(
        "fn expects a parameter list and a body".to_string(),
      ));
    }
    let params = self.param_names(&rest[0])?;
    let body = self.transform_body(&rest[1..])?;
    Ok(Expr::LambdaExpression(params, body))
  }

  // (let name value)
  fn transform_let(&self, rest: &[ParsedExpr]) -> Result<Expr, RuntimeError> {
    if rest.len() != 2 {
      return Err(RuntimeError::arity_error("let expects a name and a value".to_string()));
    }
    let name = self.symbol_name(&rest[0], "let binding name")?;
    let value = self.transform(&rest[1])?;
    Ok(Expr::VariableDeclaration(name, Box::new(value)))
  }

  // (if test consequent alternative)
  fn transform_if(&self, rest: &[ParsedExpr]) -> Result<Expr, RuntimeError> {
    if rest.len() != 3 {
      return Err(RuntimeError::arity_error(
        "if expects a test, a consequent and an alternative".to_string(),
      ));
    }
    Ok(Expr::IfExpression(
      Box::new(self.transform(&rest[0])?),
      Box::new(self.transform(&rest[1])?),
      Box::new(self.transform(&rest[2])?),
    ))
  }

  fn transform_body(&self, body: &[ParsedExpr]) -> Result<Vec<Expr>, RuntimeError> {
    body.iter().map(|element| self.transform(element)).collect()
  }

  fn symbol_name(&self, parsed_exp: &ParsedExpr, what: &str) -> Result<String, RuntimeError> {
    match parsed_exp {
      ParsedExpr::Symbol(name) => Ok(name.clone()),
      other => Err(RuntimeError::syntax_error(format!("{} must be a symbol, got \"{}\"", what, other))),
    }
  }

  fn param_names(&self, parsed_exp: &ParsedExpr) -> Result<Vec<String>, RuntimeError> {
    let elements = match parsed_exp {
      ParsedExpr::List(elements) => elements,
      other => {
        return Err(RuntimeError::syntax_error(format!(
          "parameter list must be a list of symbols, got \"{}\"",
          other
        )))
      }
    };
    let mut params = Vec::with_capacity(elements.len());
    for element in elements {
      let name = self.symbol_name(element, "function parameter")?;
      if params.contains(&name) {
        return Err(RuntimeError::duplicate_param(&name));
      }
      params.push(name);
    }
    Ok(params)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use common::error::RuntimeErrorKind;
  use syntax::Parser;

  fn transform_source(source: &str) -> Result<Expr, RuntimeError> {
    let mut parser = Parser::new();
    let parsed = parser.parse(source).expect("parse failed");
    Transformer::new().transform(&parsed[0])
  }

  fn kind_of(source: &str) -> RuntimeErrorKind {
    transform_source(source).unwrap_err().kind
  }

  #[test]
  fn atoms() {
    assert_eq!(transform_source("42"), Ok(Expr::Literal(Value::Int(42))));
    assert_eq!(transform_source("foo"), Ok(Expr::Identifier("foo".to_string())));
  }

  #[test]
  fn do_block() {
    assert_eq!(
      transform_source("(do 1 2)"),
      Ok(Expr::BlockStatement(vec![
        Expr::Literal(Value::Int(1)),
        Expr::Literal(Value::Int(2)),
      ]))
    );
    assert_eq!(kind_of("(do)"), RuntimeErrorKind::Arity);
  }

  #[test]
  fn defn_shape() {
    assert_eq!(
      transform_source("(defn inc (x) (add x 1))"),
      Ok(Expr::FunctionDeclaration(
        "inc".to_string(),
        vec!["x".to_string()],
        vec![Expr::CallExpression(
          Box::new(Expr::Identifier("add".to_string())),
          vec![Expr::Identifier("x".to_string()), Expr::Literal(Value::Int(1))],
        )],
      ))
    );

    assert_eq!(kind_of("(defn inc)"), RuntimeErrorKind::Arity);
    assert_eq!(kind_of("(defn inc (x))"), RuntimeErrorKind::Arity);
    assert_eq!(kind_of("(defn 1 (x) x)"), RuntimeErrorKind::Syntax);
    assert_eq!(kind_of("(defn inc x x)"), RuntimeErrorKind::Syntax);
  }

  #[test]
  fn fn_shape() {
    assert_eq!(
      transform_source("(fn (a b) a b)"),
      Ok(Expr::LambdaExpression(
        vec!["a".to_string(), "b".to_string()],
        vec![Expr::Identifier("a".to_string()), Expr::Identifier("b".to_string())],
      ))
    );

    assert_eq!(kind_of("(fn (a))"), RuntimeErrorKind::Arity);
    assert_eq!(kind_of("(fn (a 1) a)"), RuntimeErrorKind::Syntax);
  }

  #[test]
  fn duplicate_params() {
    assert_eq!(kind_of("(fn (a a) a)"), RuntimeErrorKind::DuplicateParam);
    assert_eq!(kind_of("(defn f (x y x) y)"), RuntimeErrorKind::DuplicateParam);
  }

  #[test]
  fn let_shape() {
    assert_eq!(
      transform_source("(let x 1)"),
      Ok(Expr::VariableDeclaration(
        "x".to_string(),
        Box::new(Expr::Literal(Value::Int(1))),
      ))
    );

    assert_eq!(kind_of("(let x)"), RuntimeErrorKind::Arity);
    assert_eq!(kind_of("(let x 1 2)"), RuntimeErrorKind::Arity);
    assert_eq!(kind_of("(let 5 1)"), RuntimeErrorKind::Syntax);
  }

  #[test]
  fn if_shape() {
    assert_eq!(
      transform_source("(if true 1 2)"),
      Ok(Expr::IfExpression(
        Box::new(Expr::Identifier("true".to_string())),
        Box::new(Expr::Literal(Value::Int(1))),
        Box::new(Expr::Literal(Value::Int(2))),
      ))
    );
    assert_eq!(kind_of("(if true 1)"), RuntimeErrorKind::Arity);
  }

  #[test]
  fn applications() {
    assert_eq!(
      transform_source("(inc 1)"),
      Ok(Expr::CallExpression(
        Box::new(Expr::Identifier("inc".to_string())),
        vec![Expr::Literal(Value::Int(1))],
      ))
    );

    // the callee may itself be any form
    assert!(matches!(
      transform_source("((fn (x) x) 1)"),
      Ok(Expr::CallExpression(callee, _)) if matches!(*callee, Expr::LambdaExpression(..))
    ));
  }

  #[test]
  fn empty_list_is_not_an_expression() {
    assert_eq!(kind_of("()"), RuntimeErrorKind::UnknownForm);
  }
}
