use std::{cell::RefCell, rc::Rc};

use common::environment::Environment;
use common::error::RuntimeError;
use common::{Builtin, Expr, Func, NativeFn, Value};
use syntax::Parser;

use crate::transformer::Transformer;

#[derive(Debug)]
pub struct Interp {
  pub global: Rc<RefCell<Environment>>
}

impl Interp {
  // Create global environment
  // Predefined values: true, false, the builtin library
  pub fn new() -> Self {
    let interp = Interp {
      global: Rc::new(RefCell::new(Environment::new(None))),
    };
    {
      let mut global = interp.global.borrow_mut();
      let _ = global.define("true", Value::Boolean(true));
      let _ = global.define("false", Value::Boolean(false));
    }
    let _ = interp.define_builtin("add", 2, builtin_add);
    let _ = interp.define_builtin("sub", 2, builtin_sub);
    let _ = interp.define_builtin("mul", 2, builtin_mul);
    let _ = interp.define_builtin("div", 2, builtin_div);
    let _ = interp.define_builtin("gt", 2, builtin_gt);
    let _ = interp.define_builtin("gte", 2, builtin_gte);
    let _ = interp.define_builtin("lt", 2, builtin_lt);
    let _ = interp.define_builtin("lte", 2, builtin_lte);
    let _ = interp.define_builtin("eq", 2, builtin_eq);
    let _ = interp.define_builtin("neq", 2, builtin_neq);
    let _ = interp.define_builtin("and", 2, builtin_and);
    let _ = interp.define_builtin("or", 2, builtin_or);
    let _ = interp.define_builtin("not", 1, builtin_not);
    interp
  }

  /// Registers a native operation in the global frame. Hosts extend the
  /// builtin library through this without touching the evaluator.
  pub fn define_builtin(&self, name: &str, arity: usize, apply: NativeFn) -> Result<(), RuntimeError> {
    self.global.borrow_mut().define(
      name,
      Value::Builtin(Builtin {
        name: name.to_string(),
        arity,
        apply,
      }),
    )
  }

  /// Reads, validates and evaluates every top-level form in `source`,
  /// returning the value of the last one. Definitions made by earlier
  /// top-level forms stay visible to later ones.
  pub fn eval_program(&self, source: &str) -> Result<Value, RuntimeError> {
    let mut parser = Parser::new();
    let transformer = Transformer::new();
    let parsed = parser.parse(source)?;
    let mut result = Err(RuntimeError::syntax_error("empty program".to_string()));
    for parsed_exp in &parsed {
      let exp = transformer.transform(parsed_exp)?;
      result = Ok(self.eval(&exp, None)?);
    }
    result
  }

  pub fn eval(&self, exp: &Expr, current_env: Option<Rc<RefCell<Environment>>>) -> Result<Value, RuntimeError> {
    let env = current_env.map_or(Rc::clone(&self.global), |e| e);
    match exp {
      Expr::Literal(value) => Ok(value.clone()),
      Expr::Identifier(id) => env.borrow().lookup(id),
      Expr::BlockStatement(body) => {
        // one child frame for the whole sequence
        let block_env = Environment::extend(&env);
        self.eval_sequence(body, block_env)
      }
      Expr::VariableDeclaration(id, value_exp) => {
        let value = self.eval(value_exp, Some(Rc::clone(&env)))?;
        env.borrow_mut().define(id, value.clone())?;
        Ok(value)
      }
      Expr::FunctionDeclaration(id, params, body) => {
        // The closure captures the frame it is declared in, so a
        // recursive call resolves the function's own name.
        let function = Value::Function(Func {
          params: params.clone(),
          body: body.clone(),
          env: Rc::clone(&env),
        });
        env.borrow_mut().define(id, function.clone())?;
        Ok(function)
      }
      Expr::LambdaExpression(params, body) => Ok(Value::Function(Func {
        params: params.clone(),
        body: body.clone(),
        env: Rc::clone(&env),
      })),
      Expr::IfExpression(test, consequent, alternative) => {
        match self.eval(test, Some(Rc::clone(&env)))? {
          Value::Boolean(true) => self.eval(consequent, Some(env)),
          Value::Boolean(false) => self.eval(alternative, Some(env)),
          other => Err(RuntimeError::type_error(format!(
            "if condition must be a boolean, got {}",
            other
          ))),
        }
      }
      Expr::CallExpression(callee, arg_exps) => {
        let callee_value = self.eval(callee, Some(Rc::clone(&env)))?;
        // Arguments are evaluated left to right in the caller's frame.
        let mut args = Vec::with_capacity(arg_exps.len());
        for arg_exp in arg_exps {
          args.push(self.eval(arg_exp, Some(Rc::clone(&env)))?);
        }
        self.apply(callee_value, args)
      }
    }
  }

  fn apply(&self, callee: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match callee {
      Value::Function(function) => {
        if args.len() != function.params.len() {
          return Err(RuntimeError::arity_error(format!(
            "<fn ({})> expects {} arguments, got {}",
            function.params.join(" "),
            function.params.len(),
            args.len()
          )));
        }
        // The activation frame chains to the frame captured at the
        // fn/defn site, not to the caller's frame.
        let activation_env = Environment::extend(&function.env);
        {
          let mut frame = activation_env.borrow_mut();
          for (param, arg) in function.params.iter().zip(args) {
            frame.define(param, arg)?;
          }
        }
        self.eval_sequence(&function.body, activation_env)
      }
      Value::Builtin(builtin) => {
        if args.len() != builtin.arity {
          return Err(RuntimeError::arity_error(format!(
            "{} expects {} arguments, got {}",
            builtin.name, builtin.arity, args.len()
          )));
        }
        (builtin.apply)(&args)
      }
      other => Err(RuntimeError::not_callable(format!("{} is not a function", other))),
    }
  }

  fn eval_sequence(&self, body: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
    // The transformer rejects empty bodies; this is the runtime's own guard.
    let (last, init) = body
      .split_last()
      .ok_or_else(|| RuntimeError::arity_error("empty sequence".to_string()))?;
    for exp in init {
      self.eval(exp, Some(Rc::clone(&env)))?;
    }
    self.eval(last, Some(env))
  }
}

// Natives assume the evaluator has already checked their arity.

fn int_pair(name: &str, args: &[Value]) -> Result<(isize, isize), RuntimeError> {
  match (&args[0], &args[1]) {
    (Value::Int(left), Value::Int(right)) => Ok((*left, *right)),
    _ => Err(RuntimeError::type_error(format!("{} expects integer operands", name))),
  }
}

fn bool_pair(name: &str, args: &[Value]) -> Result<(bool, bool), RuntimeError> {
  match (&args[0], &args[1]) {
    (Value::Boolean(left), Value::Boolean(right)) => Ok((*left, *right)),
    _ => Err(RuntimeError::type_error(format!("{} expects boolean operands", name))),
  }
}

fn builtin_add(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("add", args)?;
  Ok(Value::Int(left + right))
}

fn builtin_sub(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("sub", args)?;
  Ok(Value::Int(left - right))
}

fn builtin_mul(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("mul", args)?;
  Ok(Value::Int(left * right))
}

fn builtin_div(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("div", args)?;
  if right == 0 {
    return Err(RuntimeError::type_error("Attempt to divide by zero.".to_string()));
  }
  Ok(Value::Int(left / right))
}

fn builtin_gt(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("gt", args)?;
  Ok(Value::Boolean(left > right))
}

fn builtin_gte(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("gte", args)?;
  Ok(Value::Boolean(left >= right))
}

fn builtin_lt(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("lt", args)?;
  Ok(Value::Boolean(left < right))
}

fn builtin_lte(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = int_pair("lte", args)?;
  Ok(Value::Boolean(left <= right))
}

// eq and neq accept an integer pair or a boolean pair.
fn builtin_eq(args: &[Value]) -> Result<Value, RuntimeError> {
  match (&args[0], &args[1]) {
    (Value::Int(left), Value::Int(right)) => Ok(Value::Boolean(left == right)),
    (Value::Boolean(left), Value::Boolean(right)) => Ok(Value::Boolean(left == right)),
    _ => Err(RuntimeError::type_error("eq expects two integers or two booleans".to_string())),
  }
}

fn builtin_neq(args: &[Value]) -> Result<Value, RuntimeError> {
  match (&args[0], &args[1]) {
    (Value::Int(left), Value::Int(right)) => Ok(Value::Boolean(left != right)),
    (Value::Boolean(left), Value::Boolean(right)) => Ok(Value::Boolean(left != right)),
    _ => Err(RuntimeError::type_error("neq expects two integers or two booleans".to_string())),
  }
}

// and/or are ordinary functions, both operands are evaluated.
fn builtin_and(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = bool_pair("and", args)?;
  Ok(Value::Boolean(left && right))
}

fn builtin_or(args: &[Value]) -> Result<Value, RuntimeError> {
  let (left, right) = bool_pair("or", args)?;
  Ok(Value::Boolean(left || right))
}

fn builtin_not(args: &[Value]) -> Result<Value, RuntimeError> {
  match &args[0] {
    Value::Boolean(b) => Ok(Value::Boolean(!b)),
    _ => Err(RuntimeError::type_error("not expects a boolean operand".to_string())),
  }
}
