//! Environment: an immutable mapping from bound name to value. New bindings
//! create a new frame rather than mutating the current one, so a closure
//! that captures `self.clone()` at creation time sees exactly the bindings
//! visible then, regardless of what the call site binds afterward — a
//! mutable, in-place scope stack cannot offer that guarantee without a
//! defensive snapshot-copy at every closure creation.

use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::value::Value;

struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<Rc<Frame>>,
}

#[derive(Clone)]
pub struct Environment {
    frame: Option<Rc<Frame>>,
}

impl Environment {
    pub fn empty() -> Self {
        Environment { frame: None }
    }

    /// Returns a new environment extending `self` with a single binding.
    pub fn bind(&self, name: impl Into<String>, value: Value) -> Environment {
        let mut bindings = HashMap::with_capacity(1);
        bindings.insert(name.into(), value);
        Environment {
            frame: Some(Rc::new(Frame {
                bindings,
                parent: self.frame.clone(),
            })),
        }
    }

    /// Returns a new environment extending `self` with every binding in
    /// `pairs` installed into a single new frame (used by `let` and lambda
    /// application, where all bindings of one form are simultaneous).
    pub fn bind_all(&self, pairs: impl IntoIterator<Item = (String, Value)>) -> Environment {
        let bindings: HashMap<String, Value> = pairs.into_iter().collect();
        Environment {
            frame: Some(Rc::new(Frame {
                bindings,
                parent: self.frame.clone(),
            })),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut cur = self.frame.clone();
        while let Some(frame) = cur {
            if let Some(v) = frame.bindings.get(name) {
                return Some(v.clone());
            }
            cur = frame.parent.clone();
        }
        None
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut depth = 0;
        let mut cur = self.frame.clone();
        while let Some(frame) = cur {
            depth += 1;
            cur = frame.parent.clone();
        }
        write!(f, "Environment({} frame(s))", depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_innermost_binding() {
        let env = Environment::empty().bind("x", Value::Bool(true));
        let env = env.bind("x", Value::Bool(false));
        assert_eq!(env.lookup("x"), Some(Value::Bool(false)));
    }

    #[test]
    fn lookup_falls_through_to_parent() {
        let env = Environment::empty().bind("x", Value::Bool(true));
        let env = env.bind("y", Value::Bool(false));
        assert_eq!(env.lookup("x"), Some(Value::Bool(true)));
    }

    #[test]
    fn unbound_name_is_none() {
        let env = Environment::empty();
        assert_eq!(env.lookup("z"), None);
    }

    #[test]
    fn extending_does_not_mutate_the_original() {
        let base = Environment::empty().bind("x", Value::Bool(true));
        let _extended = base.bind("x", Value::Bool(false));
        assert_eq!(base.lookup("x"), Some(Value::Bool(true)));
    }

    #[test]
    fn bind_all_installs_simultaneously() {
        let env = Environment::empty().bind_all(vec![
            ("a".to_string(), Value::Bool(true)),
            ("b".to_string(), Value::Bool(false)),
        ]);
        assert_eq!(env.lookup("a"), Some(Value::Bool(true)));
        assert_eq!(env.lookup("b"), Some(Value::Bool(false)));
    }
}
