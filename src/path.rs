//! Dotted path access over tree shaped data.
//!
//! A path is a sequence of keys separated by `.` characters, where each
//! key may carry an index suffix such as `items[2]` to descend into an
//! array. Empty segments are skipped, so `a..b` is equal to `a.b`.

use crate::log::{Error, INVALID_PATH};
use serde_json::Value;

/// A single piece of a path, with an optional array index.
struct Segment<'path> {
    name: &'path str,
    index: Option<usize>,
}

/// Split a path into segments, skipping empty pieces.
fn split(path: &str) -> Vec<Segment<'_>> {
    path.split('.')
        .filter(|piece| !piece.is_empty())
        .map(parse_segment)
        .collect()
}

/// Parse one piece of a path.
///
/// A piece ending in `[N]`, where N is one or more ascii digits, is an
/// indexed segment. Anything else is treated as a plain key, so `items[]`
/// and `items[x]` look up keys with those exact names.
fn parse_segment(piece: &str) -> Segment<'_> {
    if let Some(open) = piece.find('[') {
        if let Some(digits) = piece[open + 1..].strip_suffix(']') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(index) = digits.parse() {
                    return Segment {
                        name: &piece[..open],
                        index: Some(index),
                    };
                }
            }
        }
    }

    Segment { name: piece, index: None }
}

/// Resolve the value at the given path.
///
/// An empty path resolves to `tree` itself. A null value at the final
/// segment resolves successfully, but a null anywhere earlier is an error
/// since there is nothing to descend into.
///
/// # Errors
///
/// Returns an [`Error`] naming the failing segment when the path cannot
/// be resolved.
pub fn get<'tree>(tree: &'tree Value, path: &str) -> Result<&'tree Value, Error> {
    let segments = split(path);
    let last = segments.len().saturating_sub(1);
    let mut current = tree;

    for (position, segment) in segments.iter().enumerate() {
        let map = current.as_object().ok_or_else(|| {
            error_get(path, format!(
                "the piece `{}` does not represent an object",
                segment.name
            ))
        })?;

        let mut value = map.get(segment.name).ok_or_else(|| {
            error_get(path, format!(
                "the value for `{}` is not present",
                segment.name
            ))
        })?;

        if value.is_null() {
            if position < last {
                return Err(error_get(path, format!(
                    "the value for `{}` is null and cannot be descended",
                    segment.name
                )));
            }
            return Ok(value);
        }

        if let Some(index) = segment.index {
            let array = value.as_array().ok_or_else(|| {
                error_get(path, format!(
                    "the piece `{}` does not refer to an array",
                    segment.name
                ))
            })?;
            value = array.get(index).ok_or_else(|| {
                error_get(path, format!(
                    "index {index} is out of range for `{}` (length: {})",
                    segment.name,
                    array.len()
                ))
            })?;
        }

        current = value;
    }

    Ok(current)
}

/// Return true when a value is present at the given path.
///
/// A path with no separators and no index suffix is checked with a direct
/// key lookup, so this can report membership of explicitly null values.
/// Deeper paths delegate to [`get`].
pub fn contains(tree: &Value, path: &str) -> bool {
    if !path.contains('.') && !path.contains('[') {
        return tree
            .as_object()
            .map(|map| map.contains_key(path))
            .unwrap_or(false);
    }

    get(tree, path).is_ok()
}

/// Resolve the value at the given path, falling back to `default` when
/// the path is missing or resolves to null.
pub fn get_or_default(tree: &Value, path: &str, default: Value) -> Value {
    match get(tree, path) {
        Ok(value) if !value.is_null() => value.clone(),
        _ => default,
    }
}

/// Assign a value at the given path.
///
/// Each piece of the path is treated as a plain key, index suffixes are
/// not interpreted on assignment. When `create_missing` is true, absent
/// intermediate objects are created on the way down.
///
/// # Errors
///
/// Returns an [`Error`] when the path is empty, when an intermediate key
/// is absent and `create_missing` is false, or when an intermediate value
/// is not an object.
pub fn set(tree: &mut Value, path: &str, value: Value, create_missing: bool) -> Result<(), Error> {
    let segments: Vec<&str> = path.split('.').filter(|piece| !piece.is_empty()).collect();
    let (name, parents) = segments.split_last().ok_or_else(|| {
        Error::build(INVALID_PATH).with_help("cannot set a value with an empty path")
    })?;

    let mut current = tree;
    for parent in parents {
        let map = current.as_object_mut().ok_or_else(|| {
            error_set(path, format!(
                "the piece `{parent}` does not represent an object"
            ))
        })?;

        if !map.contains_key(*parent) {
            if !create_missing {
                return Err(error_set(path, format!(
                    "the value for `{parent}` is not present"
                )));
            }
            map.insert(parent.to_string(), Value::Object(serde_json::Map::new()));
        }

        current = map
            .get_mut(*parent)
            .expect("key is present after insertion");
    }

    let map = current.as_object_mut().ok_or_else(|| {
        error_set(path, format!(
            "the parent of `{name}` does not represent an object"
        ))
    })?;
    map.insert(name.to_string(), value);

    Ok(())
}

fn error_get(path: &str, detail: String) -> Error {
    Error::build(INVALID_PATH).with_help(format!(
        "unable to get value by path `{path}`, {detail}"
    ))
}

fn error_set(path: &str, detail: String) -> Error {
    Error::build(INVALID_PATH).with_help(format!(
        "unable to set value by path `{path}`, {detail}"
    ))
}

#[cfg(test)]
mod tests {
    use super::{contains, get, get_or_default, set};
    use serde_json::{json, Value};

    #[test]
    fn test_get_nested() {
        let tree = json!({"person": {"name": "taylor"}});

        assert_eq!(get(&tree, "person.name").unwrap(), &json!("taylor"));
    }

    #[test]
    fn test_get_empty_path_is_root() {
        let tree = json!({"one": 1});

        assert_eq!(get(&tree, "").unwrap(), &tree);
    }

    #[test]
    fn test_get_skips_empty_segments() {
        let tree = json!({"a": {"b": 2}});

        assert_eq!(get(&tree, "a..b").unwrap(), &json!(2));
    }

    #[test]
    fn test_get_indexed() {
        let tree = json!({"items": [10, 20, 30]});

        assert_eq!(get(&tree, "items[1]").unwrap(), &json!(20));
    }

    #[test]
    fn test_get_indexed_nested() {
        let tree = json!({"sets": {"primes": [{"value": 2}, {"value": 3}]}});

        assert_eq!(get(&tree, "sets.primes[1].value").unwrap(), &json!(3));
    }

    #[test]
    fn test_get_index_out_of_range() {
        let tree = json!({"items": [10, 20, 30]});
        let error = get(&tree, "items[5]").unwrap_err();

        assert!(error.get_help().unwrap().contains("out of range"));
        assert!(error.get_help().unwrap().contains("length: 3"));
    }

    #[test]
    fn test_get_missing_names_segment() {
        let tree = json!({"person": {"name": "taylor"}});
        let error = get(&tree, "person.age").unwrap_err();

        assert!(error.get_help().unwrap().contains("`age`"));
    }

    #[test]
    fn test_get_null_terminal_is_ok() {
        let tree = json!({"person": {"name": null}});

        assert_eq!(get(&tree, "person.name").unwrap(), &Value::Null);
    }

    #[test]
    fn test_get_null_intermediate_is_error() {
        let tree = json!({"person": null});

        assert!(get(&tree, "person.name").is_err());
    }

    #[test]
    fn test_get_scalar_intermediate_is_error() {
        let tree = json!({"person": "taylor"});

        assert!(get(&tree, "person.name").is_err());
    }

    #[test]
    fn test_odd_index_suffix_is_plain_key() {
        let tree = json!({"items[]": 1, "items[x]": 2});

        assert_eq!(get(&tree, "items[]").unwrap(), &json!(1));
        assert_eq!(get(&tree, "items[x]").unwrap(), &json!(2));
    }

    #[test]
    fn test_contains() {
        let tree = json!({"person": {"name": "taylor"}, "empty": null});

        assert!(contains(&tree, "person"));
        assert!(contains(&tree, "empty"));
        assert!(contains(&tree, "person.name"));
        assert!(!contains(&tree, "person.age"));
        assert!(!contains(&tree, "absent"));
    }

    #[test]
    fn test_contains_agrees_with_get() {
        let tree = json!({"a": {"b": [1, 2]}});
        for path in ["a.b", "a.b[0]", "a.b[9]", "a.c", "a.b.c"] {
            assert_eq!(contains(&tree, path), get(&tree, path).is_ok());
        }
    }

    #[test]
    fn test_get_or_default() {
        let tree = json!({"person": {"name": "taylor", "nick": null}});

        assert_eq!(
            get_or_default(&tree, "person.name", json!("nobody")),
            json!("taylor")
        );
        assert_eq!(
            get_or_default(&tree, "person.nick", json!("nobody")),
            json!("nobody")
        );
        assert_eq!(
            get_or_default(&tree, "person.age", json!(0)),
            json!(0)
        );
    }

    #[test]
    fn test_set_creates_missing() {
        let mut tree = json!({});
        set(&mut tree, "a.b.c", json!(1), true).unwrap();

        assert_eq!(tree, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_set_roundtrip() {
        let mut tree = json!({});
        set(&mut tree, "person.name", json!("taylor"), true).unwrap();

        assert_eq!(get(&tree, "person.name").unwrap(), &json!("taylor"));
    }

    #[test]
    fn test_set_without_create_missing() {
        let mut tree = json!({});

        assert!(set(&mut tree, "a.b", json!(1), false).is_err());
    }

    #[test]
    fn test_set_overwrites() {
        let mut tree = json!({"a": {"b": 1}});
        set(&mut tree, "a.b", json!(2), false).unwrap();

        assert_eq!(tree, json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_set_empty_path_is_error() {
        let mut tree = json!({});

        assert!(set(&mut tree, "", json!(1), true).is_err());
    }

    #[test]
    fn test_set_through_scalar_is_error() {
        let mut tree = json!({"a": 1});

        assert!(set(&mut tree, "a.b", json!(2), true).is_err());
    }
}
