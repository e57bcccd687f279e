//! Runtime function values: user-declared functions and native built-ins.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::instance::LoxInstance;
use crate::interpreter::{Interpreter, Unwind};
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A user-declared function: its declaration, the environment chain captured
/// where the declaration was evaluated, and whether it is a class `init`.
#[derive(Debug)]
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this function whose closure is one frame deeper, with
    /// `this` bound to the receiver.  Method access returns these.
    pub fn bind(&self, instance: Rc<LoxInstance>) -> LoxFunction {
        debug!("Binding method '{}' to an instance", self.name());

        let mut environment: Environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    /// The call protocol: parameters bind in a fresh child of the closure,
    /// the body runs, and a `Return` unwind becomes the call's value.
    /// Fall-through yields `nil`; initializers yield `this` on both paths.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: &[Value],
    ) -> std::result::Result<Value, Unwind> {
        debug!(
            "Calling <fn {}> with {} argument(s)",
            self.name(),
            arguments.len()
        );

        let mut environment: Environment = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments.iter()) {
            environment.define(&param.lexeme, argument.clone());
        }

        let result: std::result::Result<(), Unwind> =
            interpreter.execute_block(&self.declaration.body, Rc::new(RefCell::new(environment)));

        match result {
            Err(Unwind::Return(value)) => {
                if self.is_initializer {
                    self.this_from_closure()
                } else {
                    Ok(value)
                }
            }

            Err(other) => Err(other),

            Ok(()) => {
                if self.is_initializer {
                    self.this_from_closure()
                } else {
                    Ok(Value::Nil)
                }
            }
        }
    }

    // Initializers always run bound, so `this` sits in the closure itself.
    fn this_from_closure(&self) -> std::result::Result<Value, Unwind> {
        Environment::get_at(&self.closure, 0, "this").ok_or_else(|| {
            Unwind::Error(LoxError::runtime(
                &self.declaration.name,
                "Undefined variable 'this'.",
            ))
        })
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

/// A built-in function backed by a plain function pointer.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> Result<Value>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}
