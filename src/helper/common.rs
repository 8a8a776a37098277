//! The common helpers.
//!
//! Every engine starts with this set. They are grouped into the
//! "Strings", "Data", "Maps" and "Templates" categories, which is
//! visible through [`Registry::by_category`].

use super::Registry;
use crate::{
    log::{Error, INVALID_ARGUMENTS},
    path,
    render::Renderer,
};
use serde_json::{json, Map, Value};

const STRINGS: &str = "Strings";
const DATA: &str = "Data";
const MAPS: &str = "Maps";
const TEMPLATES: &str = "Templates";

/// Store the common helpers in the given [`Registry`].
pub fn register_common(registry: &mut Registry) {
    let entries: Vec<(&str, &str, &str, fn(&Renderer, &[Value]) -> Result<Value, Error>)> = vec![
        (
            "string",
            STRINGS,
            "convert a value to its string representation",
            string,
        ),
        ("uppercase", STRINGS, "convert a string to upper case", uppercase),
        ("lowercase", STRINGS, "convert a string to lower case", lowercase),
        ("title", STRINGS, "convert a string to title case", title),
        (
            "format",
            STRINGS,
            "substitute values into a pattern with printf style verbs",
            format,
        ),
        (
            "replace",
            STRINGS,
            "replace occurrences of a substring, an optional count limits replacements",
            replace,
        ),
        (
            "split",
            STRINGS,
            "split a string into an array by a separator",
            split,
        ),
        (
            "join",
            STRINGS,
            "join the elements of an array with a separator",
            join,
        ),
        (
            "trim",
            STRINGS,
            "remove the given characters from both ends of a string",
            trim,
        ),
        (
            "trimLeft",
            STRINGS,
            "remove the given characters from the beginning of a string",
            trim_left,
        ),
        (
            "trimRight",
            STRINGS,
            "remove the given characters from the end of a string",
            trim_right,
        ),
        (
            "trimSpace",
            STRINGS,
            "remove surrounding whitespace from a string",
            trim_space,
        ),
        (
            "substr",
            STRINGS,
            "take a substring by offset and optional length",
            substr,
        ),
        (
            "startsWith",
            STRINGS,
            "report whether a string starts with a prefix",
            starts_with,
        ),
        (
            "endsWith",
            STRINGS,
            "report whether a string ends with a suffix",
            ends_with,
        ),
        (
            "default",
            DATA,
            "return the last non-empty argument, or the first when all fall through",
            default,
        ),
        ("map", DATA, "build an object from key and value pairs", map),
        ("dict", DATA, "build an object from key and value pairs", map),
        (
            "set",
            DATA,
            "return a copy of an object with a key assigned",
            set,
        ),
        (
            "stringArray",
            DATA,
            "build an array of strings from the arguments",
            string_array,
        ),
        ("in", DATA, "report whether an array contains a value", contains),
        ("json", DATA, "serialize a value to json", to_json),
        ("yaml", DATA, "serialize a value to yaml", to_yaml),
        (
            "loadJson",
            DATA,
            "parse a json object from a string",
            load_json,
        ),
        (
            "env",
            DATA,
            "read an environment variable, empty when unset",
            env,
        ),
        (
            "rem",
            TEMPLATES,
            "discard the arguments, useful for comments",
            rem,
        ),
        (
            "br",
            TEMPLATES,
            "wrap a value in expression markers for a later render pass",
            br,
        ),
        ("mapGet", MAPS, "resolve a path within an object", map_get),
        (
            "mapSet",
            MAPS,
            "return a copy of an object with a path assigned",
            map_set,
        ),
        (
            "mapContains",
            MAPS,
            "report whether a path resolves within an object",
            map_contains,
        ),
        (
            "invoke",
            TEMPLATES,
            "render a named definition against the given data",
            invoke,
        ),
        (
            "parse",
            TEMPLATES,
            "render a template fragment against the given data",
            parse,
        ),
        (
            "parsePath",
            TEMPLATES,
            "render the template fragment found at a path within the given data",
            parse_path,
        ),
    ];

    for (name, category, description, function) in entries {
        registry
            .register_with(name, category, description, function)
            .expect("common helper names are not empty");
    }
}

/// Coerce a value to display text.
///
/// Strings pass through without quotes, null becomes empty, and
/// everything else is rendered as compact json.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_argument<'value>(
    name: &str,
    arguments: &'value [Value],
    position: usize,
) -> Result<&'value str, Error> {
    arguments
        .get(position)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::build(INVALID_ARGUMENTS).with_help(format!(
                "helper `{name}` expects a string at argument {position}"
            ))
        })
}

fn object_argument<'value>(
    name: &str,
    arguments: &'value [Value],
    position: usize,
) -> Result<&'value Value, Error> {
    match arguments.get(position) {
        Some(value) if value.is_object() => Ok(value),
        _ => Err(Error::build(INVALID_ARGUMENTS).with_help(format!(
            "helper `{name}` expects an object at argument {position}"
        ))),
    }
}

fn string(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    Ok(json!(stringify(arguments.first().unwrap_or(&Value::Null))))
}

fn uppercase(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("uppercase", arguments, 0)?;

    Ok(json!(text.to_uppercase()))
}

fn lowercase(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("lowercase", arguments, 0)?;

    Ok(json!(text.to_lowercase()))
}

fn title(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("title", arguments, 0)?;
    let mut result = String::with_capacity(text.len());
    let mut boundary = true;
    for character in text.chars() {
        if character.is_whitespace() {
            boundary = true;
            result.push(character);
        } else if boundary {
            result.extend(character.to_uppercase());
            boundary = false;
        } else {
            result.push(character);
        }
    }

    Ok(json!(result))
}

/// Substitute the arguments after the pattern into the pattern, one per
/// verb. The `%s`, `%v` and `%d` verbs all stringify the next value,
/// and `%%` produces a literal percent sign.
fn format(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let pattern = string_argument("format", arguments, 0)?;
    let mut values = arguments.iter().skip(1);
    let mut output = String::with_capacity(pattern.len());
    let mut characters = pattern.chars();

    while let Some(character) = characters.next() {
        if character != '%' {
            output.push(character);
            continue;
        }
        match characters.next() {
            Some('%') => output.push('%'),
            Some('s' | 'v' | 'd') => {
                let value = values.next().ok_or_else(|| {
                    Error::build(INVALID_ARGUMENTS).with_help(
                        "helper `format` received fewer values than verbs in the pattern",
                    )
                })?;
                output.push_str(&stringify(value));
            }
            _ => {
                return Err(Error::build(INVALID_ARGUMENTS)
                    .with_help("helper `format` supports the verbs `%s`, `%v`, `%d` and `%%`"))
            }
        }
    }

    Ok(json!(output))
}

fn replace(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("replace", arguments, 0)?;
    let from = string_argument("replace", arguments, 1)?;
    let to = string_argument("replace", arguments, 2)?;
    let count = arguments.get(3).and_then(Value::as_i64).unwrap_or(-1);

    let replaced = if count < 0 {
        text.replace(from, to)
    } else {
        text.replacen(from, to, count as usize)
    };

    Ok(json!(replaced))
}

fn split(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("split", arguments, 0)?;
    let separator = string_argument("split", arguments, 1)?;
    let pieces: Vec<&str> = text.split(separator).collect();

    Ok(json!(pieces))
}

fn join(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let array = arguments.first().and_then(Value::as_array).ok_or_else(|| {
        Error::build(INVALID_ARGUMENTS)
            .with_help("helper `join` expects an array at argument 0")
    })?;
    let separator = string_argument("join", arguments, 1)?;
    let joined = array
        .iter()
        .map(stringify)
        .collect::<Vec<_>>()
        .join(separator);

    Ok(json!(joined))
}

fn trim(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("trim", arguments, 0)?;
    let cutset = string_argument("trim", arguments, 1)?;

    Ok(json!(text.trim_matches(|c: char| cutset.contains(c))))
}

fn trim_left(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("trimLeft", arguments, 0)?;
    let cutset = string_argument("trimLeft", arguments, 1)?;

    Ok(json!(text.trim_start_matches(|c: char| cutset.contains(c))))
}

fn trim_right(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("trimRight", arguments, 0)?;
    let cutset = string_argument("trimRight", arguments, 1)?;

    Ok(json!(text.trim_end_matches(|c: char| cutset.contains(c))))
}

fn trim_space(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("trimSpace", arguments, 0)?;

    Ok(json!(text.trim()))
}

fn substr(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("substr", arguments, 0)?;
    let from = arguments
        .get(1)
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            Error::build(INVALID_ARGUMENTS)
                .with_help("helper `substr` expects a number at argument 1")
        })?
        .max(0) as usize;

    let taken: String = match arguments.get(2).and_then(Value::as_i64) {
        Some(length) if length >= 0 => text.chars().skip(from).take(length as usize).collect(),
        _ => text.chars().skip(from).collect(),
    };

    Ok(json!(taken))
}

fn starts_with(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("startsWith", arguments, 0)?;
    let prefix = string_argument("startsWith", arguments, 1)?;

    Ok(json!(text.starts_with(prefix)))
}

fn ends_with(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("endsWith", arguments, 0)?;
    let suffix = string_argument("endsWith", arguments, 1)?;

    Ok(json!(text.ends_with(suffix)))
}

/// Scan the arguments after the first from right to left, returning the
/// first value that is not empty. Null, empty strings, empty arrays and
/// empty objects all fall through. When everything falls through, the
/// first argument is returned as the fallback.
fn default(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let fallback = arguments.first().ok_or_else(|| {
        Error::build(INVALID_ARGUMENTS)
            .with_help("helper `default` expects at least one argument")
    })?;

    for value in arguments.iter().skip(1).rev() {
        let empty = match value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            Value::Array(array) => array.is_empty(),
            Value::Object(object) => object.is_empty(),
            _ => false,
        };
        if !empty {
            return Ok(value.clone());
        }
    }

    Ok(fallback.clone())
}

fn map(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    if arguments.len() % 2 != 0 {
        return Err(Error::build(INVALID_ARGUMENTS).with_help(
            "helper `map` expects key and value pairs, \
            the number of keys does not match the number of values",
        ));
    }

    let mut object = Map::new();
    for pair in arguments.chunks(2) {
        object.insert(stringify(&pair[0]), pair[1].clone());
    }

    Ok(Value::Object(object))
}

fn set(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let mut object = match arguments.first() {
        Some(Value::Object(map)) => map.clone(),
        _ => {
            return Err(Error::build(INVALID_ARGUMENTS)
                .with_help("helper `set` expects an object at argument 0"))
        }
    };
    let key = arguments.get(1).map(stringify).ok_or_else(|| {
        Error::build(INVALID_ARGUMENTS).with_help("helper `set` expects a key at argument 1")
    })?;
    let value = arguments.get(2).cloned().unwrap_or(Value::Null);
    object.insert(key, value);

    Ok(Value::Object(object))
}

fn string_array(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let strings: Vec<String> = arguments.iter().map(stringify).collect();

    Ok(json!(strings))
}

fn contains(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let array = arguments.first().and_then(Value::as_array).ok_or_else(|| {
        Error::build(INVALID_ARGUMENTS)
            .with_help("attempting to use `in` with a value that is not an array")
    })?;
    let needle = arguments.get(1).cloned().unwrap_or(Value::Null);

    Ok(json!(array.contains(&needle)))
}

fn to_json(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let value = arguments.first().unwrap_or(&Value::Null);
    let text = serde_json::to_string(value).map_err(|error| {
        Error::build(INVALID_ARGUMENTS)
            .with_help(format!("helper `json` failed to serialize, {error}"))
    })?;

    Ok(json!(text))
}

fn to_yaml(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let value = arguments.first().unwrap_or(&Value::Null);
    let text = serde_yaml::to_string(value).map_err(|error| {
        Error::build(INVALID_ARGUMENTS)
            .with_help(format!("helper `yaml` failed to serialize, {error}"))
    })?;

    Ok(json!(text))
}

fn load_json(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let text = string_argument("loadJson", arguments, 0)?;
    let value = serde_json::from_str::<Value>(text).map_err(|error| {
        Error::build(INVALID_ARGUMENTS)
            .with_help(format!("helper `loadJson` failed to parse, {error}"))
    })?;

    if !value.is_object() {
        return Err(Error::build(INVALID_ARGUMENTS)
            .with_help("helper `loadJson` expects the text to contain a json object"));
    }

    Ok(value)
}

fn env(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let name = string_argument("env", arguments, 0)?;

    Ok(json!(std::env::var(name).unwrap_or_default()))
}

fn rem(_: &Renderer, _: &[Value]) -> Result<Value, Error> {
    Ok(json!(""))
}

fn br(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let inner = stringify(arguments.first().unwrap_or(&Value::Null));

    Ok(json!(format!("(({inner}))")))
}

fn map_get(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let object = object_argument("mapGet", arguments, 0)?;
    let location = string_argument("mapGet", arguments, 1)?;

    match arguments.get(2) {
        Some(fallback) => Ok(path::get_or_default(object, location, fallback.clone())),
        None => path::get(object, location).map(|value| value.clone()),
    }
}

fn map_set(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let mut object = object_argument("mapSet", arguments, 0)?.clone();
    let location = string_argument("mapSet", arguments, 1)?;
    let value = arguments.get(2).cloned().unwrap_or(Value::Null);
    let create_missing = arguments.get(3).and_then(Value::as_bool).unwrap_or(true);
    path::set(&mut object, location, value, create_missing)?;

    Ok(object)
}

fn map_contains(_: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let object = object_argument("mapContains", arguments, 0)?;
    let location = string_argument("mapContains", arguments, 1)?;

    Ok(json!(path::contains(object, location)))
}

fn invoke(state: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let name = string_argument("invoke", arguments, 0)?;
    let data = arguments.get(1).cloned().unwrap_or(Value::Null);
    let output = state.render_named(name, &data)?;

    Ok(json!(output))
}

fn parse(state: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let data = arguments.first().cloned().unwrap_or(Value::Null);
    let text = string_argument("parse", arguments, 1)?;
    let fail_on_empty = arguments.get(2).and_then(Value::as_bool).unwrap_or(false);

    render_fragment(state, &data, text, fail_on_empty, "parse")
}

fn parse_path(state: &Renderer, arguments: &[Value]) -> Result<Value, Error> {
    let data = arguments.first().cloned().unwrap_or(Value::Null);
    let location = string_argument("parsePath", arguments, 1)?;
    let text = path::get(&data, location)?.as_str().ok_or_else(|| {
        Error::build(INVALID_ARGUMENTS).with_help(format!(
            "the provided object does not contain a string at `{location}`"
        ))
    })?;
    let fail_on_empty = arguments.get(2).and_then(Value::as_bool).unwrap_or(false);

    render_fragment(state, &data, text, fail_on_empty, "parsePath")
}

/// Compile and render a template fragment within the active render.
fn render_fragment(
    state: &Renderer,
    data: &Value,
    text: &str,
    fail_on_empty: bool,
    name: &str,
) -> Result<Value, Error> {
    if text.is_empty() {
        if fail_on_empty {
            return Err(Error::build(INVALID_ARGUMENTS)
                .with_help(format!("helper `{name}` received an empty template")));
        }
        return Ok(json!(""));
    }

    let output = state.render_text(text, data)?;
    if fail_on_empty && output.is_empty() {
        return Err(Error::build(INVALID_ARGUMENTS)
            .with_help(format!("helper `{name}` produced an empty result")));
    }

    Ok(json!(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile::compile, helper::Registry, render::Renderer, Builder};
    use morel::Finder;

    /// Run a test against a scratch render state.
    fn with_state<T>(test: impl FnOnce(&Renderer) -> T) -> T {
        let finder = Finder::new(Builder::new().to_syntax());
        let template = compile(&finder, None, "").unwrap();
        let registry = Registry::with_common();
        let root = json!({});
        let state = Renderer::new(&registry, &template, &finder, &root, 8);

        test(&state)
    }

    #[test]
    fn test_string() {
        with_state(|state| {
            assert_eq!(string(state, &[json!("x")]).unwrap(), json!("x"));
            assert_eq!(string(state, &[json!(10)]).unwrap(), json!("10"));
            assert_eq!(string(state, &[Value::Null]).unwrap(), json!(""));
        });
    }

    #[test]
    fn test_title() {
        with_state(|state| {
            assert_eq!(
                title(state, &[json!("hello  there world")]).unwrap(),
                json!("Hello  There World")
            );
        });
    }

    #[test]
    fn test_format() {
        with_state(|state| {
            assert_eq!(
                format(state, &[json!("%s is at %d%%"), json!("load"), json!(80)]).unwrap(),
                json!("load is at 80%")
            );
            assert!(format(state, &[json!("%s")]).is_err());
            assert!(format(state, &[json!("%q"), json!(1)]).is_err());
        });
    }

    #[test]
    fn test_replace_count() {
        with_state(|state| {
            assert_eq!(
                replace(state, &[json!("aaa"), json!("a"), json!("b")]).unwrap(),
                json!("bbb")
            );
            assert_eq!(
                replace(state, &[json!("aaa"), json!("a"), json!("b"), json!(2)]).unwrap(),
                json!("bba")
            );
        });
    }

    #[test]
    fn test_split_and_join() {
        with_state(|state| {
            let pieces = split(state, &[json!("a,b,c"), json!(",")]).unwrap();
            assert_eq!(pieces, json!(["a", "b", "c"]));
            assert_eq!(
                join(state, &[pieces, json!("-")]).unwrap(),
                json!("a-b-c")
            );
        });
    }

    #[test]
    fn test_trim_variants() {
        with_state(|state| {
            assert_eq!(
                trim(state, &[json!("__x__"), json!("_")]).unwrap(),
                json!("x")
            );
            assert_eq!(
                trim_left(state, &[json!("__x__"), json!("_")]).unwrap(),
                json!("x__")
            );
            assert_eq!(
                trim_right(state, &[json!("__x__"), json!("_")]).unwrap(),
                json!("__x")
            );
            assert_eq!(trim_space(state, &[json!("  x ")]).unwrap(), json!("x"));
        });
    }

    #[test]
    fn test_substr() {
        with_state(|state| {
            assert_eq!(
                substr(state, &[json!("template"), json!(0), json!(4)]).unwrap(),
                json!("temp")
            );
            assert_eq!(
                substr(state, &[json!("template"), json!(4)]).unwrap(),
                json!("late")
            );
        });
    }

    #[test]
    fn test_default_scans_right_to_left() {
        with_state(|state| {
            assert_eq!(
                default(state, &[json!(1), json!(""), Value::Null, json!("last")]).unwrap(),
                json!("last")
            );
            assert_eq!(
                default(state, &[json!("fallback"), json!(""), Value::Null]).unwrap(),
                json!("fallback")
            );
            assert_eq!(default(state, &[json!("fallback")]).unwrap(), json!("fallback"));
            assert!(default(state, &[]).is_err());
        });
    }

    #[test]
    fn test_map_pairs() {
        with_state(|state| {
            assert_eq!(
                map(state, &[json!("a"), json!(1), json!("b"), json!(2)]).unwrap(),
                json!({"a": 1, "b": 2})
            );
            assert!(map(state, &[json!("a")]).is_err());
        });
    }

    #[test]
    fn test_set_returns_updated_copy() {
        with_state(|state| {
            let original = json!({"a": 1});
            let updated = set(state, &[original.clone(), json!("b"), json!(2)]).unwrap();

            assert_eq!(updated, json!({"a": 1, "b": 2}));
            assert_eq!(original, json!({"a": 1}));
        });
    }

    #[test]
    fn test_in() {
        with_state(|state| {
            assert_eq!(
                contains(state, &[json!([1, 2, 3]), json!(2)]).unwrap(),
                json!(true)
            );
            assert_eq!(
                contains(state, &[json!([1, 2, 3]), json!(5)]).unwrap(),
                json!(false)
            );
            assert!(contains(state, &[json!("not array"), json!(1)]).is_err());
        });
    }

    #[test]
    fn test_json_round() {
        with_state(|state| {
            let text = to_json(state, &[json!({"a": 1})]).unwrap();
            assert_eq!(load_json(state, &[text]).unwrap(), json!({"a": 1}));
            assert!(load_json(state, &[json!("[1, 2]")]).is_err());
        });
    }

    #[test]
    fn test_env_unset_is_empty() {
        with_state(|state| {
            assert_eq!(
                env(state, &[json!("IMBUE_TEST_UNSET_VARIABLE")]).unwrap(),
                json!("")
            );
        });
    }

    #[test]
    fn test_rem_and_br() {
        with_state(|state| {
            assert_eq!(rem(state, &[json!("anything")]).unwrap(), json!(""));
            assert_eq!(br(state, &[json!("name")]).unwrap(), json!("((name))"));
        });
    }

    #[test]
    fn test_map_get() {
        with_state(|state| {
            let object = json!({"person": {"name": "taylor"}});
            assert_eq!(
                map_get(state, &[object.clone(), json!("person.name")]).unwrap(),
                json!("taylor")
            );
            assert!(map_get(state, &[object.clone(), json!("person.age")]).is_err());
            assert_eq!(
                map_get(state, &[object, json!("person.age"), json!(0)]).unwrap(),
                json!(0)
            );
        });
    }

    #[test]
    fn test_map_set_copies() {
        with_state(|state| {
            let object = json!({"a": 1});
            let updated =
                map_set(state, &[object.clone(), json!("b.c"), json!(2)]).unwrap();

            assert_eq!(updated, json!({"a": 1, "b": {"c": 2}}));
            assert_eq!(object, json!({"a": 1}));
        });
    }

    #[test]
    fn test_map_contains() {
        with_state(|state| {
            let object = json!({"a": {"b": 1}});
            assert_eq!(
                map_contains(state, &[object.clone(), json!("a.b")]).unwrap(),
                json!(true)
            );
            assert_eq!(
                map_contains(state, &[object, json!("a.c")]).unwrap(),
                json!(false)
            );
        });
    }

    #[test]
    fn test_parse_renders_fragment() {
        with_state(|state| {
            let data = json!({"name": "taylor"});
            assert_eq!(
                parse(state, &[data, json!("hello, (( name ))")]).unwrap(),
                json!("hello, taylor")
            );
        });
    }

    #[test]
    fn test_parse_empty() {
        with_state(|state| {
            assert_eq!(
                parse(state, &[json!({}), json!("")]).unwrap(),
                json!("")
            );
            assert!(parse(state, &[json!({}), json!(""), json!(true)]).is_err());
        });
    }

    #[test]
    fn test_parse_path() {
        with_state(|state| {
            let data = json!({"snippet": "(( title | uppercase ))", "title": "intro"});
            assert_eq!(
                parse_path(state, &[data, json!("snippet")]).unwrap(),
                json!("INTRO")
            );
        });
    }

    #[test]
    fn test_parse_path_non_string() {
        with_state(|state| {
            let data = json!({"snippet": 10});
            assert!(parse_path(state, &[data, json!("snippet")]).is_err());
        });
    }

    #[test]
    fn test_invoke_missing_definition() {
        with_state(|state| {
            assert!(invoke(state, &[json!("missing"), json!({})]).is_err());
        });
    }
}
