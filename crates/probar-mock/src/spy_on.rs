//! Replacing an object's method with a mock.
//!
//! Rust objects have no dynamic property table, so the binder works against
//! a capability: anything that can hand out the callable stored under a name
//! (already bound to its receiver) and accept a replacement. [`MethodTable`]
//! is a ready-made host.

use crate::deferred::MockReturn;
use crate::engine::MockFn;
use crate::result::{MockError, MockResult};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// A receiver-bound method
pub type Method<A, R> = Rc<dyn Fn(A) -> R>;

/// An object whose methods can be looked up and replaced by name
pub trait MethodHost<A, R> {
    /// The callable stored under `name`, bound to its receiver.
    /// `None` when the property is missing or is not callable.
    fn method(&self, name: &str) -> Option<Method<A, R>>;

    /// Store `method` under `name`
    fn replace_method(&mut self, name: &str, method: Method<A, R>);
}

/// Replace `host`'s method `name` with a mock whose base implementation is
/// the original method, and return the mock.
///
/// The original callable is only kept as the mock's base implementation;
/// [`MockFn::restore`] brings that behavior back but the host keeps calling
/// through the mock.
pub fn spy_on<H, A, R>(host: &mut H, name: &str) -> MockResult<MockFn<A, R>>
where
    H: MethodHost<A, R> + ?Sized,
    A: Clone + 'static,
    R: MockReturn,
{
    let Some(original) = host.method(name) else {
        warn!(method = name, "spy target is not a method");
        return Err(MockError::invalid_target(name));
    };

    let mock: MockFn<A, R> = MockFn::new(move |args| original(args));
    mock.set_name(name);
    host.replace_method(name, Rc::new(mock.as_fn()));
    debug!(method = name, id = %mock.id(), "method replaced by mock");
    Ok(mock)
}

/// A property of a [`MethodTable`]
pub enum Property<A, R> {
    /// Plain data
    Value(serde_json::Value),
    /// Callable
    Method(Method<A, R>),
}

impl<A, R> Clone for Property<A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Method(method) => Self::Method(Rc::clone(method)),
        }
    }
}

impl<A, R> fmt::Debug for Property<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// Named properties, some of them callable
pub struct MethodTable<A, R> {
    properties: BTreeMap<String, Property<A, R>>,
}

impl<A, R> Default for MethodTable<A, R> {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
        }
    }
}

impl<A, R> fmt::Debug for MethodTable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.properties.iter()).finish()
    }
}

impl<A, R> MethodTable<A, R> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data property
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        let _ = self.properties.insert(name.into(), Property::Value(value));
        self
    }

    /// Add a method
    #[must_use]
    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(A) -> R + 'static,
    {
        let _ = self
            .properties
            .insert(name.into(), Property::Method(Rc::new(f)));
        self
    }

    /// Look up a property
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property<A, R>> {
        self.properties.get(name)
    }

    /// Data stored under `name`, if it is a data property
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&serde_json::Value> {
        match self.properties.get(name)? {
            Property::Value(value) => Some(value),
            Property::Method(_) => None,
        }
    }

    /// Invoke the method stored under `name`
    pub fn call(&self, name: &str, args: A) -> MockResult<R> {
        match self.properties.get(name) {
            Some(Property::Method(method)) => Ok(method(args)),
            _ => Err(MockError::invalid_target(name)),
        }
    }

    /// Number of properties
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the table has no properties
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<A, R> MethodHost<A, R> for MethodTable<A, R> {
    fn method(&self, name: &str) -> Option<Method<A, R>> {
        match self.properties.get(name)? {
            Property::Method(method) => Some(Rc::clone(method)),
            Property::Value(_) => None,
        }
    }

    fn replace_method(&mut self, name: &str, method: Method<A, R>) {
        let _ = self
            .properties
            .insert(name.to_string(), Property::Method(method));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn cart(apples: Rc<Cell<u32>>) -> MethodTable<(), u32> {
        MethodTable::new()
            .with_method("get_apples", move |()| apples.get())
            .with_value("owner", json!("ana"))
    }

    #[test]
    fn test_spy_on_returns_mock() {
        let apples = Rc::new(Cell::new(0));
        let mut cart = cart(Rc::new(Cell::new(42)));

        let spy = spy_on(&mut cart, "get_apples").unwrap();
        let source = Rc::clone(&apples);
        spy.set_implementation(move |()| source.get());
        apples.set(1);

        assert_eq!(cart.call("get_apples", ()).unwrap(), 1);
        assert!(spy.called());
        assert_eq!(spy.call_count(), 1);
        assert_eq!(spy.calls(), vec![()]);
        assert_eq!(spy.returns(), vec![Some(1)]);

        apples.set(2);
        assert_eq!(spy.call(()), 2);
        assert_eq!(spy.call_count(), 2);
        assert_eq!(spy.returns(), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_spy_on_keeps_original_behavior_as_base() {
        let apples = Rc::new(Cell::new(42));
        let mut cart = cart(Rc::clone(&apples));

        let spy = spy_on(&mut cart, "get_apples").unwrap();
        assert_eq!(spy.name(), "get_apples");
        assert_eq!(cart.call("get_apples", ()).unwrap(), 42);

        spy.return_value_always(0);
        assert_eq!(cart.call("get_apples", ()).unwrap(), 0);

        spy.restore();
        apples.set(7);
        assert_eq!(cart.call("get_apples", ()).unwrap(), 7);
        assert_eq!(spy.returns(), vec![Some(7)]);
    }

    #[test]
    fn test_spy_on_rejects_data_property() {
        let mut cart = cart(Rc::new(Cell::new(0)));
        let err = spy_on(&mut cart, "owner").unwrap_err();
        assert!(matches!(err, MockError::InvalidTarget { ref name } if name == "owner"));
        assert_eq!(cart.value("owner"), Some(&json!("ana")));
    }

    #[test]
    fn test_spy_on_rejects_missing_property() {
        let mut cart = cart(Rc::new(Cell::new(0)));
        let err = spy_on(&mut cart, "get_pears").unwrap_err();
        assert_eq!(err.to_string(), "spy target must be a method: get_pears");
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_call_on_value_fails() {
        let cart = cart(Rc::new(Cell::new(0)));
        assert!(cart.call("owner", ()).is_err());
        assert!(matches!(cart.get("owner"), Some(Property::Value(_))));
    }

    struct Counter {
        step: Rc<Cell<i64>>,
        add: Option<Method<(i64,), i64>>,
    }

    impl MethodHost<(i64,), i64> for Counter {
        fn method(&self, name: &str) -> Option<Method<(i64,), i64>> {
            match name {
                "add" => self.add.clone(),
                _ => None,
            }
        }

        fn replace_method(&mut self, name: &str, method: Method<(i64,), i64>) {
            if name == "add" {
                self.add = Some(method);
            }
        }
    }

    #[test]
    fn test_custom_host() {
        let step = Rc::new(Cell::new(3));
        let bound = Rc::clone(&step);
        let mut counter = Counter {
            step,
            add: Some(Rc::new(move |(x,): (i64,)| x + bound.get())),
        };

        let spy = spy_on(&mut counter, "add").unwrap();
        let add = counter.add.clone().unwrap();
        assert_eq!(add((1,)), 4);
        counter.step.set(10);
        assert_eq!(add((1,)), 11);
        assert_eq!(spy.calls(), vec![(1,), (1,)]);
    }
}
