use crate::{
    log::{Error, INVALID_SOURCE},
    path,
};
use serde::Serialize;
use serde_json::{to_value, Map, Value};
use std::fmt::Display;

/// Layered data that templates are rendered against.
///
/// The root is always an object. Additional sources may be merged in
/// with [`load`][`Store::load`], where scalar values from later sources
/// win and objects are combined additively.
///
/// # Examples
///
/// ```
/// use imbue::Store;
///
/// let store = Store::new().with_must("name", "taylor");
///
/// assert_eq!(store.get("name").unwrap().as_str(), Some("taylor"));
/// ```
pub struct Store {
    data: Value,
}

impl Store {
    /// Create a new, empty Store.
    pub fn new() -> Self {
        Store {
            data: Value::Object(Map::new()),
        }
    }

    /// Insert a key and value into the Store.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the value cannot be serialized.
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize + Display,
    {
        let serialized = to_value(&value)
            .map_err(|_| Error::build(format!("value `{value}` is unserializable")))?;
        self.root_mut().insert(key.into(), serialized);

        Ok(())
    }

    /// Insert a key and value into the Store.
    ///
    /// # Panics
    ///
    /// Panics when the value cannot be serialized.
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize + Display,
    {
        self.insert(key, value)
            .expect("value should be serializable")
    }

    /// Insert a key and value into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the value cannot be serialized.
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize + Display,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Insert a key and value into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics when the value cannot be serialized.
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize + Display,
    {
        self.insert_must(key, value);

        self
    }

    /// Merge a serialized source into the Store.
    ///
    /// The `kind` tag selects the format, and accepts `json`, `yml` and
    /// `yaml` in any casing. The top level value of the source must be
    /// an object.
    ///
    /// Sources accumulate. Loading several sources in a row merges each
    /// one over the previous data, where scalars from the newest source
    /// win and objects combine.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the tag is unknown, the contents do not
    /// parse, or the top level value is not an object.
    pub fn load(&mut self, contents: &[u8], kind: &str) -> Result<(), Error> {
        let value = match kind.to_lowercase().as_str() {
            "json" => serde_json::from_slice::<Value>(contents).map_err(|error| {
                Error::build(INVALID_SOURCE)
                    .with_help(format!("failed to unmarshal json, {error}"))
            })?,
            "yml" | "yaml" => {
                let parsed =
                    serde_yaml::from_slice::<serde_yaml::Value>(contents).map_err(|error| {
                        Error::build(INVALID_SOURCE)
                            .with_help(format!("failed to unmarshal yaml, {error}"))
                    })?;
                from_yaml(parsed)?
            }
            _ => {
                return Err(Error::build(INVALID_SOURCE)
                    .with_help(format!("unknown file type `{kind}`")))
            }
        };

        match value {
            Value::Object(source) => {
                merge(self.root_mut(), source);

                Ok(())
            }
            _ => Err(Error::build(INVALID_SOURCE)
                .with_help("the top level value of a source must be an object")),
        }
    }

    /// Merge a serialized source into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source cannot be loaded.
    pub fn with_source(mut self, contents: &[u8], kind: &str) -> Result<Self, Error> {
        self.load(contents, kind)?;

        Ok(self)
    }

    /// Return the value of the given key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Resolve the value at the given dotted path.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the path cannot be resolved.
    pub fn get_path(&self, path: &str) -> Result<&Value, Error> {
        path::get(&self.data, path)
    }

    /// Return true when a value is present at the given dotted path.
    pub fn contains_path(&self, path: &str) -> bool {
        path::contains(&self.data, path)
    }

    /// Assign a value at the given dotted path.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the path cannot be assigned to.
    pub fn set_path(&mut self, path: &str, value: Value, create_missing: bool) -> Result<(), Error> {
        path::set(&mut self.data, path, value, create_missing)
    }

    /// Return a reference to the underlying data.
    pub(crate) fn as_value(&self) -> &Value {
        &self.data
    }

    /// Return a mutable reference to the root object.
    fn root_mut(&mut self) -> &mut Map<String, Value> {
        self.data
            .as_object_mut()
            .expect("store root is always an object")
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the source object into the accumulator.
///
/// When a key holds an object in both places and the accumulator's copy
/// is non-empty, the two are merged recursively. In every other case the
/// source value replaces whatever the accumulator held, so scalars from
/// the source always win.
pub fn merge(accumulator: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(object) => match accumulator.get_mut(&key) {
                Some(Value::Object(existing)) if !existing.is_empty() => {
                    merge(existing, object);
                }
                _ => {
                    accumulator.insert(key, Value::Object(object));
                }
            },
            other => {
                accumulator.insert(key, other);
            }
        }
    }
}

/// Normalize a yaml value into tree shaped data.
///
/// # Errors
///
/// Returns an [`Error`] when a mapping contains a key that is not a
/// string, or a number cannot be represented.
pub(crate) fn from_yaml(value: serde_yaml::Value) -> Result<Value, Error> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(value) => Ok(Value::Bool(value)),
        serde_yaml::Value::Number(number) => {
            let number = if let Some(value) = number.as_i64() {
                serde_json::Number::from(value)
            } else if let Some(value) = number.as_u64() {
                serde_json::Number::from(value)
            } else {
                let value = number.as_f64().unwrap_or(0.0);
                serde_json::Number::from_f64(value).ok_or_else(|| {
                    Error::build(INVALID_SOURCE)
                        .with_help(format!("the number `{value}` cannot be represented"))
                })?
            };

            Ok(Value::Number(number))
        }
        serde_yaml::Value::String(value) => Ok(Value::String(value)),
        serde_yaml::Value::Sequence(sequence) => Ok(Value::Array(
            sequence
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(key) => key,
                    other => {
                        return Err(Error::build(INVALID_SOURCE).with_help(format!(
                            "mapping keys must be strings, found `{other:?}`"
                        )))
                    }
                };
                object.insert(key, from_yaml(value)?);
            }

            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::{merge, Store};
    use serde_json::{json, Map, Value};

    #[test]
    fn test_insert() {
        let mut store = Store::new();
        store.insert("name", "taylor").unwrap();

        assert_eq!(store.get("name").unwrap(), &json!("taylor"));
    }

    #[test]
    fn test_with_must() {
        let store = Store::new().with_must("one", 1).with_must("two", 2);

        assert_eq!(store.get("one").unwrap(), &json!(1));
        assert_eq!(store.get("two").unwrap(), &json!(2));
    }

    #[test]
    fn test_load_json() {
        let mut store = Store::new();
        store.load(br#"{"name": "taylor"}"#, "json").unwrap();

        assert_eq!(store.get("name").unwrap(), &json!("taylor"));
    }

    #[test]
    fn test_load_yaml() {
        let mut store = Store::new();
        store.load(b"person:\n  name: taylor\n", "yaml").unwrap();

        assert_eq!(
            store.get("person").unwrap(),
            &json!({"name": "taylor"})
        );
    }

    #[test]
    fn test_load_kind_case_insensitive() {
        let mut store = Store::new();
        store.load(b"name: taylor\n", "YML").unwrap();

        assert_eq!(store.get("name").unwrap(), &json!("taylor"));
    }

    #[test]
    fn test_load_unknown_kind() {
        let mut store = Store::new();
        let error = store.load(b"name = 1", "toml").unwrap_err();

        assert!(error.get_help().unwrap().contains("unknown file type"));
    }

    #[test]
    fn test_load_non_object_root() {
        let mut store = Store::new();

        assert!(store.load(b"[1, 2, 3]", "json").is_err());
    }

    #[test]
    fn test_load_non_string_key() {
        let mut store = Store::new();

        assert!(store.load(b"1: one\n", "yaml").is_err());
    }

    #[test]
    fn test_load_layered_precedence() {
        let mut store = Store::new();
        store
            .load(br#"{"x": 1, "nested": {"a": 1}}"#, "json")
            .unwrap();
        store
            .load(b"x: 2\nnested:\n  b: 2\n", "yaml")
            .unwrap();

        assert_eq!(store.get("x").unwrap(), &json!(2));
        assert_eq!(
            store.get("nested").unwrap(),
            &json!({"a": 1, "b": 2})
        );
    }

    #[test]
    fn test_merge_scalar_overwrites_object() {
        let mut accumulator = as_map(json!({"value": {"a": 1}}));
        merge(&mut accumulator, as_map(json!({"value": 2})));

        assert_eq!(Value::Object(accumulator), json!({"value": 2}));
    }

    #[test]
    fn test_merge_object_overwrites_scalar() {
        let mut accumulator = as_map(json!({"value": 2}));
        merge(&mut accumulator, as_map(json!({"value": {"a": 1}})));

        assert_eq!(Value::Object(accumulator), json!({"value": {"a": 1}}));
    }

    #[test]
    fn test_merge_replaces_empty_object() {
        let mut accumulator = as_map(json!({"value": {}}));
        merge(&mut accumulator, as_map(json!({"value": {"a": 1}})));

        assert_eq!(Value::Object(accumulator), json!({"value": {"a": 1}}));
    }

    #[test]
    fn test_merge_idempotent() {
        let source = as_map(json!({"x": 2, "nested": {"a": 1, "b": 2}}));
        let mut accumulator = as_map(json!({"x": 1, "nested": {"a": 1}}));
        merge(&mut accumulator, source.clone());
        let once = accumulator.clone();
        merge(&mut accumulator, source);

        assert_eq!(accumulator, once);
    }

    #[test]
    fn test_paths() {
        let mut store = Store::new();
        store
            .load(br#"{"person": {"name": "taylor"}}"#, "json")
            .unwrap();

        assert!(store.contains_path("person.name"));
        assert_eq!(
            store.get_path("person.name").unwrap(),
            &json!("taylor")
        );

        store.set_path("person.age", json!(30), true).unwrap();
        assert_eq!(store.get_path("person.age").unwrap(), &json!(30));
    }

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }
}
