//! Helpers and supporting types.
//!
//! Helpers are functions that templates invoke to transform data during
//! a render, either with a leading call such as `(( default name "-" ))`
//! or through a pipe such as `(( name | uppercase ))`. When an expression
//! is piped, the output of the upstream expression arrives as the first
//! argument of the helper.
//!
//! # Examples
//!
//! Registering a custom helper:
//!
//! ```
//! use imbue::{helper::Registry, Error, Renderer};
//! use serde_json::{json, Value};
//!
//! fn exclaim(_: &Renderer, args: &[Value]) -> Result<Value, Error> {
//!     let text = args.first().and_then(Value::as_str).unwrap_or_default();
//!     Ok(json!(format!("{text}!")))
//! }
//!
//! let mut registry = Registry::with_common();
//! registry.register("exclaim", exclaim).unwrap();
//!
//! assert!(registry.contains("exclaim"));
//! ```
mod common;

pub use crate::{
    log::{Error, Pointer, Visual},
    region::Region,
};

use crate::{log::INVALID_HELPER, render::Renderer};
use serde_json::Value;
use std::collections::HashMap;

/// Category assigned to helpers registered without an explicit one.
pub const CATEGORY_EXTENSIONS: &str = "Extensions";

/// Describes a type that may be called from a template expression.
///
/// The `state` argument exposes the active render, which allows a helper
/// to compile and render further templates on the fly.
pub trait Helper: Sync + Send {
    /// Execute the helper with the given arguments, returning a new value.
    fn call(&self, state: &Renderer<'_>, arguments: &[Value]) -> Result<Value, Error>;
}

impl<F> Helper for F
where
    F: Fn(&Renderer<'_>, &[Value]) -> Result<Value, Error> + Sync + Send,
{
    fn call(&self, state: &Renderer<'_>, arguments: &[Value]) -> Result<Value, Error> {
        self(state, arguments)
    }
}

/// A named helper stored in a [`Registry`], with descriptive metadata.
pub struct Entry {
    name: String,
    category: String,
    description: String,
    function: Box<dyn Helper>,
}

impl Entry {
    /// Return the name of the helper.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the category of the helper.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Return the description of the helper.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Return the callable function.
    pub(crate) fn function(&self) -> &dyn Helper {
        self.function.as_ref()
    }
}

/// A set of helpers, indexed by name.
pub struct Registry {
    helpers: HashMap<String, Entry>,
}

impl Registry {
    /// Create a new, empty Registry.
    pub fn new() -> Self {
        Registry {
            helpers: HashMap::new(),
        }
    }

    /// Create a new Registry populated with the common helpers.
    pub fn with_common() -> Self {
        let mut registry = Registry::new();
        common::register_common(&mut registry);

        registry
    }

    /// Store a helper with the given name.
    ///
    /// An existing helper with the same name is silently replaced, and
    /// the helper is filed under the [`CATEGORY_EXTENSIONS`] category.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the name is empty.
    pub fn register<T>(&mut self, name: &str, helper: T) -> Result<(), Error>
    where
        T: Helper + 'static,
    {
        self.register_with(name, CATEGORY_EXTENSIONS, "", helper)
    }

    /// Store a helper with the given name, category and description.
    ///
    /// An existing helper with the same name is silently replaced.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the name is empty.
    pub fn register_with<T>(
        &mut self,
        name: &str,
        category: &str,
        description: &str,
        helper: T,
    ) -> Result<(), Error>
    where
        T: Helper + 'static,
    {
        if name.is_empty() {
            return Err(
                Error::build(INVALID_HELPER).with_help("the helper name cannot be empty")
            );
        }

        self.helpers.insert(
            name.to_owned(),
            Entry {
                name: name.to_owned(),
                category: category.to_owned(),
                description: description.to_owned(),
                function: Box::new(helper),
            },
        );

        Ok(())
    }

    /// Return the helper with the given name.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.helpers.get(name)
    }

    /// Return true when a helper with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Remove the helper with the given name.
    ///
    /// Removing a name that is not present does nothing.
    pub fn remove(&mut self, name: &str) {
        self.helpers.remove(name);
    }

    /// Return every registered helper, in no particular order.
    pub fn all(&self) -> Vec<&Entry> {
        self.helpers.values().collect()
    }

    /// Return every registered helper in the given category, in no
    /// particular order.
    pub fn by_category(&self, category: &str) -> Vec<&Entry> {
        self.helpers
            .values()
            .filter(|entry| entry.category == category)
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Registry, CATEGORY_EXTENSIONS};
    use crate::{log::Error, render::Renderer};
    use serde_json::{json, Value};

    fn shout(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
        let text = arguments.first().and_then(Value::as_str).unwrap_or_default();

        Ok(json!(text.to_uppercase()))
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = Registry::new();
        registry.register("shout", shout).unwrap();

        assert!(registry.contains("shout"));
        let entry = registry.get("shout").unwrap();
        assert_eq!(entry.name(), "shout");
        assert_eq!(entry.category(), CATEGORY_EXTENSIONS);
    }

    #[test]
    fn test_register_empty_name() {
        let mut registry = Registry::new();

        assert!(registry.register("", shout).is_err());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::new();
        registry
            .register_with("shout", "One", "first", shout)
            .unwrap();
        registry
            .register_with("shout", "Two", "second", shout)
            .unwrap();

        assert_eq!(registry.get("shout").unwrap().category(), "Two");
        assert_eq!(registry.all().len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut registry = Registry::new();
        registry.register("shout", shout).unwrap();
        registry.remove("shout");
        registry.remove("shout");

        assert!(!registry.contains("shout"));
    }

    #[test]
    fn test_by_category() {
        let mut registry = Registry::new();
        registry.register_with("a", "One", "", shout).unwrap();
        registry.register_with("b", "One", "", shout).unwrap();
        registry.register_with("c", "Two", "", shout).unwrap();

        assert_eq!(registry.by_category("One").len(), 2);
        assert_eq!(registry.by_category("Two").len(), 1);
        assert!(registry.by_category("Three").is_empty());
    }

    #[test]
    fn test_with_common_is_populated() {
        let registry = Registry::with_common();

        for name in ["uppercase", "default", "parse", "mapGet", "invoke"] {
            assert!(registry.contains(name), "missing helper {name}");
        }
    }
}
