//! Lexical environments: name → value frames chained to the globals root.
//!
//! Frames are shared (`Rc<RefCell<..>>`): a closure keeps its declaring chain
//! alive, and writes through one sharer are visible to all of them.  Resolved
//! references use [`Environment::get_at`] / [`Environment::assign_at`] to hit
//! the frame exactly `distance` hops out; unresolved references go straight
//! to the globals frame through the plain accessors, so there is no
//! chain-walking lookup at all.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::value::Value;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// The root frame: globals.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this frame, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value) {
        debug!("Defining '{}'", name);

        self.values.insert(name.to_string(), value);
    }

    /// Read from this frame only.  Used for globals.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Write to this frame only; `false` when the name is unbound.  Used for
    /// globals.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Read `name` from the frame exactly `distance` hops out.  `None` only
    /// if the resolver's distance does not match the runtime chain, which a
    /// sound resolve pass rules out.
    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Option<Value> {
        let frame: Rc<RefCell<Environment>> = Self::ancestor(env, distance)?;
        let value: Option<Value> = frame.borrow().values.get(name).cloned();

        debug!("get_at({}, '{}') -> hit={}", distance, name, value.is_some());

        value
    }

    /// Write `name` in the frame exactly `distance` hops out; `false` when
    /// the slot does not exist there.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
    ) -> bool {
        match Self::ancestor(env, distance) {
            Some(frame) => frame.borrow_mut().assign(name, value),
            None => false,
        }
    }

    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut frame: Rc<RefCell<Environment>> = Rc::clone(env);

        for _ in 0..distance {
            let enclosing: Option<Rc<RefCell<Environment>>> = frame.borrow().enclosing.clone();
            frame = enclosing?;
        }

        Some(frame)
    }
}
