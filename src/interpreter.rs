//! Tree-walking evaluator.
//!
//! Expressions produce [`Value`]s; statements produce side effects.  The
//! interpreter owns the globals frame, the current-environment pointer, and
//! the resolver's binding-distance map (keyed by [`ExprId`]).
//!
//! Control flow that leaves an evaluation early travels through [`Unwind`]:
//! runtime errors surface to the [`Interpreter::interpret`] boundary, while
//! `Return` is caught by the innermost function call.  The two never share a
//! representation with static errors.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use vec_map::VecMap;

use crate::callable::{LoxFunction, NativeFunction};
use crate::class::LoxClass;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId};
use crate::instance::LoxInstance;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Non-local exit from an evaluation.
///
/// `Return` is not an error: it is the only mechanism that carries a value
/// out of nested statements back to the function-call protocol, and nothing
/// but that protocol may swallow it.
#[derive(Debug)]
pub enum Unwind {
    Error(LoxError),
    Return(Value),
}

impl From<LoxError> for Unwind {
    fn from(err: LoxError) -> Self {
        Unwind::Error(err)
    }
}

pub struct Interpreter<W: Write> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: VecMap<usize>,
    output: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock_native,
            }),
        );

        let environment: Rc<RefCell<Environment>> = Rc::clone(&globals);

        Interpreter {
            globals,
            environment,
            locals: VecMap::new(),
            output,
        }
    }

    /// Resolver callback: record that `id` binds `depth` scopes out.
    /// Unrecorded references resolve against globals.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("note_local: id={:?} depth={}", id, depth);

        self.locals.insert(id.0, depth);
    }

    /// Run a program.  This is the catch boundary for runtime errors.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        info!("Interpreting {} statement(s)", statements.len());

        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}

                Err(Unwind::Error(e)) => return Err(e),

                // The resolver rejects top-level 'return'.
                Err(Unwind::Return(_)) => unreachable!("return unwound past all calls"),
            }
        }

        Ok(())
    }

    /// Reclaim the output sink (used by tests to read captured prints).
    pub fn into_output(self) -> W {
        self.output
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> std::result::Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value).map_err(LoxError::Io)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Function(declaration) => {
                let function: LoxFunction = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Block(statements) => {
                let child: Environment = Environment::with_enclosing(Rc::clone(&self.environment));

                self.execute_block(statements, Rc::new(RefCell::new(child)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Return { keyword: _, value } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Unwind::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> std::result::Result<(), Unwind> {
        let superclass_value: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    let at: &Token = expr.variable_name().unwrap_or(name);

                    return Err(Unwind::Error(LoxError::runtime(
                        at,
                        "Superclass must be a class.",
                    )));
                }
            },

            None => None,
        };

        // Two-step: the name exists (as nil) while methods are built, so a
        // method body may refer to the enclosing class.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let method_closure: Rc<RefCell<Environment>> = match &superclass_value {
            Some(superclass) => {
                let mut env: Environment =
                    Environment::with_enclosing(Rc::clone(&self.environment));
                env.define("super", Value::Class(Rc::clone(superclass)));
                Rc::new(RefCell::new(env))
            }

            None => Rc::clone(&self.environment),
        };

        let mut method_map: HashMap<String, Rc<LoxFunction>> = HashMap::new();

        for method in methods {
            let is_initializer: bool = method.name.lexeme == "init";

            let function: LoxFunction = LoxFunction::new(
                Rc::clone(method),
                Rc::clone(&method_closure),
                is_initializer,
            );

            method_map.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class: LoxClass = LoxClass::new(name.lexeme.clone(), superclass_value, method_map);

        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Class(Rc::new(class)));

        Ok(())
    }

    /// Run `statements` with `environment` as the current frame, restoring
    /// the previous frame on every exit path.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> std::result::Result<(), Unwind> {
        let previous: Rc<RefCell<Environment>> =
            std::mem::replace(&mut self.environment, environment);

        let mut result: std::result::Result<(), Unwind> = Ok(());

        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    fn evaluate(&mut self, expr: &Expr) -> std::result::Result<Value, Unwind> {
        match expr {
            Expr::Literal(token) => self.evaluate_literal(token),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_value: Value = self.evaluate(left)?;

                match operator.token_type {
                    TokenType::OR => {
                        if is_truthy(&left_value) {
                            Ok(left_value)
                        } else {
                            self.evaluate(right)
                        }
                    }

                    TokenType::AND => {
                        if !is_truthy(&left_value) {
                            Ok(left_value)
                        } else {
                            self.evaluate(right)
                        }
                    }

                    _ => Err(Unwind::Error(LoxError::runtime(
                        operator,
                        "Invalid logical operator.",
                    ))),
                }
            }

            Expr::Variable(id, name) => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                let assigned: bool = match self.locals.get(id.0).copied() {
                    Some(distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                    ),

                    None => self.globals.borrow_mut().assign(&name.lexeme, value.clone()),
                };

                if !assigned {
                    return Err(Unwind::Error(undefined_variable(name)));
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    LoxInstance::get(&instance, name).map_err(Unwind::Error)
                }

                _ => Err(Unwind::Error(LoxError::runtime(
                    name,
                    "Only instances have properties.",
                ))),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value: Value = self.evaluate(value)?;

                    instance.set(name, value.clone());

                    Ok(value)
                }

                _ => Err(Unwind::Error(LoxError::runtime(
                    name,
                    "Only instances have fields.",
                ))),
            },

            Expr::This(id, keyword) => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_literal(&self, token: &Token) -> std::result::Result<Value, Unwind> {
        match &token.token_type {
            TokenType::NUMBER(n) => Ok(Value::Number(*n)),

            TokenType::STRING(s) => Ok(Value::String(s.clone())),

            TokenType::TRUE => Ok(Value::Bool(true)),

            TokenType::FALSE => Ok(Value::Bool(false)),

            TokenType::NIL => Ok(Value::Nil),

            _ => Err(Unwind::Error(LoxError::runtime(token, "Invalid literal."))),
        }
    }

    fn evaluate_unary(
        &mut self,
        operator: &Token,
        right: &Expr,
    ) -> std::result::Result<Value, Unwind> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(Unwind::Error(LoxError::runtime(
                    operator,
                    "Operand must be a number.",
                ))),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(Unwind::Error(LoxError::runtime(
                operator,
                "Invalid unary operator.",
            ))),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> std::result::Result<Value, Unwind> {
        // Both operands evaluate before any type check runs.
        let left_value: Value = self.evaluate(left)?;
        let right_value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(Unwind::Error(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                ))),
            },

            TokenType::MINUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(Unwind::Error(numbers_expected(operator))),
            },

            TokenType::STAR => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(Unwind::Error(numbers_expected(operator))),
            },

            TokenType::SLASH => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => {
                    if b == 0.0 {
                        Err(Unwind::Error(LoxError::runtime(
                            operator,
                            "Division by zero.",
                        )))
                    } else {
                        Ok(Value::Number(a / b))
                    }
                }

                _ => Err(Unwind::Error(numbers_expected(operator))),
            },

            TokenType::GREATER => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(Unwind::Error(numbers_expected(operator))),
            },

            TokenType::GREATER_EQUAL => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(Unwind::Error(numbers_expected(operator))),
            },

            TokenType::LESS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(Unwind::Error(numbers_expected(operator))),
            },

            TokenType::LESS_EQUAL => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(Unwind::Error(numbers_expected(operator))),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left_value, &right_value))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left_value, &right_value))),

            _ => Err(Unwind::Error(LoxError::runtime(
                operator,
                "Invalid binary operator.",
            ))),
        }
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        paren: &Token,
        arguments: &[Expr],
    ) -> std::result::Result<Value, Unwind> {
        let callee_value: Value = self.evaluate(callee)?;

        let mut argument_values: Vec<Value> = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argument_values.push(self.evaluate(argument)?);
        }

        match callee_value {
            Value::Function(function) => {
                check_arity(function.arity(), argument_values.len(), paren)?;

                function.call(self, &argument_values)
            }

            Value::NativeFunction(native) => {
                check_arity(native.arity, argument_values.len(), paren)?;

                (native.func)(&argument_values).map_err(Unwind::Error)
            }

            Value::Class(class) => {
                check_arity(class.arity(), argument_values.len(), paren)?;

                let instance: Rc<LoxInstance> = Rc::new(LoxInstance::new(Rc::clone(&class)));

                if let Some(initializer) = class.find_method("init") {
                    initializer
                        .bind(Rc::clone(&instance))
                        .call(self, &argument_values)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(Unwind::Error(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            ))),
        }
    }

    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token,
        method: &Token,
    ) -> std::result::Result<Value, Unwind> {
        let distance: usize = self
            .locals
            .get(id.0)
            .copied()
            .ok_or_else(|| Unwind::Error(undefined_variable(keyword)))?;

        let superclass: Rc<LoxClass> =
            match Environment::get_at(&self.environment, distance, "super") {
                Some(Value::Class(class)) => class,

                _ => return Err(Unwind::Error(undefined_variable(keyword))),
            };

        // The receiver lives one frame inside the 'super' frame.
        let object: Rc<LoxInstance> =
            match Environment::get_at(&self.environment, distance - 1, "this") {
                Some(Value::Instance(instance)) => instance,

                _ => return Err(Unwind::Error(undefined_variable(keyword))),
            };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(object)))),

            None => Err(Unwind::Error(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            ))),
        }
    }

    fn look_up_variable(
        &mut self,
        id: ExprId,
        name: &Token,
    ) -> std::result::Result<Value, Unwind> {
        let value: Option<Value> = match self.locals.get(id.0).copied() {
            Some(distance) => Environment::get_at(&self.environment, distance, &name.lexeme),

            None => self.globals.borrow().get(&name.lexeme),
        };

        value.ok_or_else(|| Unwind::Error(undefined_variable(name)))
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> std::result::Result<(), Unwind> {
    if expected != got {
        return Err(Unwind::Error(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        )));
    }

    Ok(())
}

fn undefined_variable(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

fn numbers_expected(operator: &Token) -> LoxError {
    LoxError::runtime(operator, "Operands must be numbers.")
}

/// Only `nil` and `false` are falsey.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

/// Structural equality for value types, reference identity for objects.
/// Numbers follow IEEE-754, so `NaN != NaN`.
fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,

        (Value::Bool(a), Value::Bool(b)) => a == b,

        (Value::Number(a), Value::Number(b)) => a == b,

        (Value::String(a), Value::String(b)) => a == b,

        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),

        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),

        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),

        _ => false,
    }
}

fn clock_native(_args: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LoxError::Runtime {
            message: format!("Clock error: {}.", e),
            line: 0,
        })?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
