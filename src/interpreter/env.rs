use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

/// One link of the runtime scope chain: a name-to-value map plus an optional
/// enclosing environment. Closures keep their defining link alive by holding
/// an `EnvRef` to it.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Inserts or overwrites a binding in this environment.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Looks a name up through the chain, innermost first.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        self.enclosing
            .as_ref()
            .and_then(|enclosing| enclosing.borrow().get(name))
    }

    /// Updates the innermost existing binding. Returns false when the name is
    /// bound nowhere in the chain; assignment never creates a binding.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_ref(environment: Environment) -> EnvRef {
        Rc::new(RefCell::new(environment))
    }

    fn number_binding(environment: &Environment, name: &str) -> Option<f64> {
        match environment.get(name) {
            Some(Value::Number(value)) => Some(value),
            Some(other) => panic!("expected a number for '{name}', got {other:?}"),
            None => None,
        }
    }

    #[test]
    fn define_overwrites_locally() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.define("x", Value::Number(2.0));
        assert_eq!(number_binding(&env, "x"), Some(2.0));
    }

    #[test]
    fn get_walks_the_chain() {
        let globals = env_ref(Environment::new());
        globals.borrow_mut().define("x", Value::Number(1.0));

        let inner = Environment::with_enclosing(globals.clone());
        assert_eq!(number_binding(&inner, "x"), Some(1.0));
        assert!(inner.get("y").is_none());
    }

    #[test]
    fn assign_updates_innermost_binding_only() {
        let globals = env_ref(Environment::new());
        globals.borrow_mut().define("x", Value::Number(1.0));

        let mut inner = Environment::with_enclosing(globals.clone());
        inner.define("x", Value::Number(2.0));
        assert!(inner.assign("x", Value::Number(3.0)));

        assert_eq!(number_binding(&inner, "x"), Some(3.0));
        assert_eq!(number_binding(&globals.borrow(), "x"), Some(1.0));
    }

    #[test]
    fn assign_reaches_outward_but_never_creates() {
        let globals = env_ref(Environment::new());
        globals.borrow_mut().define("x", Value::Number(1.0));

        let mut inner = Environment::with_enclosing(globals.clone());
        assert!(inner.assign("x", Value::Number(5.0)));
        assert_eq!(number_binding(&globals.borrow(), "x"), Some(5.0));

        assert!(!inner.assign("missing", Value::Nil));
        assert!(inner.get("missing").is_none());
    }
}
