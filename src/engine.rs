use crate::{
    compile::{compile, Builder},
    helper::Registry,
    log::{error_write, Error, UNKNOWN_DIALECT},
    render::Renderer,
    store::Store,
};
use morel::Finder;
use std::{collections::HashMap, io::Write};

/// Default depth at which a render is abandoned.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A named template body with its named definitions.
///
/// A Unit is plain storage. The [`Engine`] holding it decides how the
/// pieces are assembled for compilation.
pub struct Unit {
    name: String,
    body: String,
    definitions: HashMap<String, String>,
}

impl Unit {
    /// Create a new Unit with the given name and no content.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            body: String::new(),
            definitions: HashMap::new(),
        }
    }

    /// Return the name of the Unit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the body text.
    pub fn set_body(&mut self, text: &str) {
        self.body = text.to_owned();
    }

    /// Store a named definition, replacing any previous text under the
    /// same name.
    pub fn add_definition(&mut self, name: &str, text: &str) {
        self.definitions.insert(name.to_owned(), text.to_owned());
    }

    /// Return the stored definitions.
    pub fn definitions(&self) -> &HashMap<String, String> {
        &self.definitions
    }
}

/// A template engine for one dialect.
///
/// An Engine owns one [`Unit`] and a [`Registry`] of helpers, and knows
/// how to assemble and render the unit in its own dialect.
pub trait Engine {
    /// Return the dialect identifier, such as "tag".
    fn kind(&self) -> &'static str;

    /// Return the name of the template.
    fn name(&self) -> &str;

    /// Return the helpers available to this engine.
    fn helpers(&self) -> &Registry;

    /// Return the helpers available to this engine, mutably.
    fn helpers_mut(&mut self) -> &mut Registry;

    /// Validate and store the template body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the text is not a valid template, in
    /// which case the previous body is kept.
    fn load_body(&mut self, text: &str) -> Result<(), Error>;

    /// Validate and store a named definition.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the text is not a valid template, in
    /// which case the definition is not stored.
    fn load_definition(&mut self, name: &str, text: &str) -> Result<(), Error>;

    /// Assemble the full source text that will be compiled by
    /// [`render`][`Engine::render`].
    fn prepare(&self) -> String;

    /// Set the depth at which a render is abandoned.
    fn set_max_depth(&mut self, depth: usize);

    /// Render the template against the given Store, writing the result
    /// to the given writer.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the assembled template does not
    /// compile, the render fails, or the writer fails.
    fn render(&self, writer: &mut dyn Write, store: &Store) -> Result<(), Error>;
}

/// The composing dialect.
///
/// Expressions are delimited with `((` and `))`, blocks with `(*` and
/// `*)`. Definitions are composed into the template during
/// [`prepare`][`Engine::prepare`] by wrapping each one in a `define`
/// block ahead of the body, so the body may `invoke` any of them. A
/// definition sharing the name of the unit itself is skipped, since the
/// body already represents that name.
pub struct TagEngine {
    unit: Unit,
    finder: Finder,
    registry: Registry,
    max_depth: usize,
}

impl TagEngine {
    /// The dialect identifier.
    pub const KIND: &'static str = "tag";

    /// Create a new TagEngine with the given template name.
    pub fn new(name: &str) -> Self {
        Self {
            unit: Unit::new(name),
            finder: Finder::new(Builder::new().to_syntax()),
            registry: Registry::with_common(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Engine for TagEngine {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn name(&self) -> &str {
        self.unit.name()
    }

    fn helpers(&self) -> &Registry {
        &self.registry
    }

    fn helpers_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn load_body(&mut self, text: &str) -> Result<(), Error> {
        validate(&self.finder, self.unit.name(), text)?;
        self.unit.set_body(text);

        Ok(())
    }

    fn load_definition(&mut self, name: &str, text: &str) -> Result<(), Error> {
        validate(&self.finder, name, text)?;
        self.unit.add_definition(name, text);

        Ok(())
    }

    fn prepare(&self) -> String {
        let mut source = String::new();
        for (name, body) in self.unit.definitions() {
            if name == self.unit.name() {
                continue;
            }
            source.push_str("(* define \"");
            source.push_str(name);
            source.push_str("\" *)");
            source.push_str(body);
            source.push_str("(* end *)");
        }
        source.push_str(self.unit.body());

        source
    }

    fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    fn render(&self, writer: &mut dyn Write, store: &Store) -> Result<(), Error> {
        render_unit(
            &self.finder,
            &self.registry,
            self.unit.name(),
            &self.prepare(),
            self.max_depth,
            store,
            writer,
        )
    }
}

/// The non-composing dialect.
///
/// Expressions are delimited with `{{` and `}}`, blocks with `{%` and
/// `%}`. Definitions are validated and stored but never composed into
/// the template, [`prepare`][`Engine::prepare`] returns the body alone.
pub struct MustacheEngine {
    unit: Unit,
    finder: Finder,
    registry: Registry,
    max_depth: usize,
}

impl MustacheEngine {
    /// The dialect identifier.
    pub const KIND: &'static str = "mustache";

    /// Create a new MustacheEngine with the given template name.
    pub fn new(name: &str) -> Self {
        Self {
            unit: Unit::new(name),
            finder: Finder::new(
                Builder::new()
                    .with_expression("{{", "}}")
                    .with_block("{%", "%}")
                    .to_syntax(),
            ),
            registry: Registry::with_common(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Engine for MustacheEngine {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn name(&self) -> &str {
        self.unit.name()
    }

    fn helpers(&self) -> &Registry {
        &self.registry
    }

    fn helpers_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn load_body(&mut self, text: &str) -> Result<(), Error> {
        validate(&self.finder, self.unit.name(), text)?;
        self.unit.set_body(text);

        Ok(())
    }

    fn load_definition(&mut self, name: &str, text: &str) -> Result<(), Error> {
        validate(&self.finder, name, text)?;
        self.unit.add_definition(name, text);

        Ok(())
    }

    fn prepare(&self) -> String {
        self.unit.body().to_owned()
    }

    fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    fn render(&self, writer: &mut dyn Write, store: &Store) -> Result<(), Error> {
        render_unit(
            &self.finder,
            &self.registry,
            self.unit.name(),
            &self.prepare(),
            self.max_depth,
            store,
            writer,
        )
    }
}

/// Compile the given text, discarding the result.
fn validate(finder: &Finder, name: &str, text: &str) -> Result<(), Error> {
    compile(finder, Some(name), text)
        .map(|_| ())
        .map_err(|error| error.with_name(name))
}

/// Compile and render assembled source against the given Store.
fn render_unit(
    finder: &Finder,
    registry: &Registry,
    name: &str,
    source: &str,
    max_depth: usize,
    store: &Store,
    writer: &mut dyn Write,
) -> Result<(), Error> {
    let template =
        compile(finder, Some(name), source).map_err(|error| error.with_name(name))?;
    let output = Renderer::new(registry, &template, finder, store.as_value(), max_depth)
        .render()
        .map_err(|error| error.with_name(name))?;

    writer.write_all(output.as_bytes()).map_err(|_| error_write())
}

type Constructor = Box<dyn Fn(&str) -> Box<dyn Engine> + Send + Sync>;

/// Creates [`Engine`] instances by dialect.
///
/// A new Factory starts out with the "tag" and "mustache" dialects, and
/// further constructors may be registered at runtime.
///
/// # Examples
///
/// ```
/// use imbue::Factory;
///
/// let factory = Factory::new();
/// let engine = factory.create("mustache", "page").unwrap();
///
/// assert_eq!(engine.kind(), "mustache");
/// assert!(factory.create("nonsense", "page").is_err());
/// ```
pub struct Factory {
    constructors: HashMap<String, Constructor>,
    default_kind: String,
}

impl Factory {
    /// Create a new Factory with the built in dialects.
    pub fn new() -> Self {
        let mut factory = Factory {
            constructors: HashMap::new(),
            default_kind: TagEngine::KIND.to_owned(),
        };
        factory.register(TagEngine::KIND, |name| Box::new(TagEngine::new(name)));
        factory.register(MustacheEngine::KIND, |name| {
            Box::new(MustacheEngine::new(name))
        });

        factory
    }

    /// Store a constructor under the given dialect identifier, replacing
    /// any previous constructor for that dialect.
    pub fn register<T>(&mut self, kind: &str, constructor: T)
    where
        T: Fn(&str) -> Box<dyn Engine> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.to_owned(), Box::new(constructor));
    }

    /// Create an [`Engine`] of the given dialect.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when no dialect with the given identifier
    /// is registered.
    pub fn create(&self, kind: &str, name: &str) -> Result<Box<dyn Engine>, Error> {
        match self.constructors.get(kind) {
            Some(constructor) => Ok(constructor(name)),
            None => Err(Error::build(UNKNOWN_DIALECT).with_help(format!(
                "no template dialect is registered under `{kind}`, expected one of {:?}",
                self.kinds()
            ))),
        }
    }

    /// Create an [`Engine`] of the default dialect.
    ///
    /// When the configured default is not registered, an arbitrary
    /// registered dialect is used instead, so the dialect received here
    /// is only guaranteed when the default is known to be present.
    ///
    /// # Panics
    ///
    /// Panics when no dialects are registered at all.
    pub fn new_default(&self, name: &str) -> Box<dyn Engine> {
        if let Some(constructor) = self.constructors.get(&self.default_kind) {
            return constructor(name);
        }

        let constructor = self
            .constructors
            .values()
            .next()
            .expect("factory should have at least one registered dialect");

        constructor(name)
    }

    /// Set the default dialect identifier.
    pub fn set_default(&mut self, kind: &str) {
        self.default_kind = kind.to_owned();
    }

    /// Set the default dialect identifier.
    ///
    /// Returns the Factory, so additional methods may be chained.
    pub fn with_default(mut self, kind: &str) -> Self {
        self.set_default(kind);

        self
    }

    /// Return true when a dialect with the given identifier is
    /// registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Return every registered dialect identifier, in no particular
    /// order.
    pub fn kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}
