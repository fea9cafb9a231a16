pub mod environment;
pub mod error;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use environment::Environment;
use error::RuntimeError;

/// A raw s-expression as produced by the reader: an atom or a list.
#[derive(Debug,PartialEq,Clone)]
pub enum ParsedExpr {
    Symbol(String),
    Int(isize),
    List(Vec<ParsedExpr>),
}

/// A user-defined function together with the frame chain that was
/// visible where its `fn`/`defn` form was evaluated. The frame is held
/// by `Rc`, so it stays alive for as long as the function does.
#[derive(Clone)]
pub struct Func {
    pub params: Vec<String>,
    pub body: Vec<Expr>,
    pub env: Rc<RefCell<Environment>>,
}

// The captured frame is compared by identity and omitted from debug
// output: a `defn` closure's chain contains the closure itself, so a
// structural walk would never terminate.
impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.body == other.body
            && Rc::ptr_eq(&self.env, &other.env)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_struct("Func")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

pub type NativeFn = fn(&[Value]) -> Result<Value, RuntimeError>;

/// A host-provided operation callable like any function. The evaluator
/// checks `arity` before invoking `apply`.
#[derive(Debug,PartialEq,Clone)]
pub struct Builtin {
    pub name: String,
    pub arity: usize,
    pub apply: NativeFn,
}

#[derive(Debug,PartialEq,Clone)]
pub enum Value {
    Int(isize),
    Boolean(bool),
    Function(Func),
    Builtin(Builtin),
}

/// A validated core form, ready for evaluation.
#[derive(Debug,PartialEq,Clone)]
pub enum Expr {
    Literal(Value),
    Identifier(String),
    BlockStatement(Vec<Expr>),
    VariableDeclaration(String, Box<Expr>),
    FunctionDeclaration(String, Vec<String>, Vec<Expr>),
    LambdaExpression(Vec<String>, Vec<Expr>),
    IfExpression(Box<Expr>, Box<Expr>, Box<Expr>),
    CallExpression(Box<Expr>, Vec<Expr>),
}

impl fmt::Display for ParsedExpr {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsedExpr::Symbol(s) => write!(formatter, "{}", s),
            ParsedExpr::Int(n) => write!(formatter, "{}", n),
            ParsedExpr::List(list) => {
                let elements: Vec<String> = list.iter().map(|e| e.to_string()).collect();
                write!(formatter, "({})", elements.join(" "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(n) => write!(formatter, "{}", n),
            Value::Boolean(b) => write!(formatter, "{}", b),
            Value::Function(func) => write!(formatter, "<fn ({})>", func.params.join(" ")),
            Value::Builtin(builtin) => write!(formatter, "<builtin {}>", builtin.name),
        }
    }
}
