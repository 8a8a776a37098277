use crate::{
    compile::{
        compile,
        tree::{Base, Call, Expression, Tree, Variable},
        Scope, Template,
    },
    helper::Registry,
    log::{error_missing_template, error_write, Error, EXCEEDED_DEPTH, INVALID_HELPER},
    pipe::Pipe,
};
use morel::Finder;
use serde_json::Value;
use std::{borrow::Cow, fmt::Write};

/// The state of an active render.
///
/// A Renderer walks the Abstract Syntax Tree of a [`Template`] and
/// writes the result. Helpers receive a reference to the Renderer,
/// which allows them to start nested renders over new data with
/// [`render_text`][`Renderer::render_text`] and
/// [`render_named`][`Renderer::render_named`]. Every nested render
/// increases the depth, and the render fails when the depth passes
/// the configured maximum.
#[derive(Clone, Copy)]
pub struct Renderer<'render> {
    /// Helpers available to expressions.
    registry: &'render Registry,
    /// The template being rendered.
    template: &'render Template,
    /// The template that began the render, which holds the loaded
    /// definitions. Fragments compiled mid-render resolve names here
    /// when their own template has none.
    origin: &'render Template,
    /// Marker search used to compile ad hoc fragments.
    finder: &'render Finder,
    /// The data that variables resolve against.
    root: &'render Value,
    /// Current nesting depth.
    depth: usize,
    /// Depth at which the render is abandoned.
    max_depth: usize,
}

impl<'render> Renderer<'render> {
    /// Create a new Renderer.
    pub(crate) fn new(
        registry: &'render Registry,
        template: &'render Template,
        finder: &'render Finder,
        root: &'render Value,
        max_depth: usize,
    ) -> Self {
        Self {
            registry,
            template,
            origin: template,
            finder,
            root,
            depth: 0,
            max_depth,
        }
    }

    /// Render the template body to a new string.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an expression cannot be evaluated, or
    /// the maximum depth is exceeded.
    pub(crate) fn render(&self) -> Result<String, Error> {
        self.guard()?;

        let mut buffer = String::with_capacity(self.template.source.len());
        let mut pipe = Pipe::new(&mut buffer);
        self.render_scope(&self.template.scope, &mut pipe)?;

        Ok(buffer)
    }

    /// Return the current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Compile the given text and render it against the given data.
    ///
    /// The nested render counts against the maximum depth.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the text is not a valid template, the
    /// render fails, or the maximum depth is exceeded.
    pub fn render_text(&self, text: &str, data: &Value) -> Result<String, Error> {
        let template = compile(self.finder, None, text)?;
        let child = Renderer {
            registry: self.registry,
            template: &template,
            origin: self.origin,
            finder: self.finder,
            root: data,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        };

        child.render()
    }

    /// Render a named definition against the given data.
    ///
    /// The name is resolved against the current template first, and then
    /// against the template that began the render, so fragments compiled
    /// mid-render may still invoke any loaded definition.
    ///
    /// The nested render counts against the maximum depth.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when no definition with the given name
    /// exists, the render fails, or the maximum depth is exceeded.
    pub fn render_named(&self, name: &str, data: &Value) -> Result<String, Error> {
        let (template, scope) = match self.template.definitions.get(name) {
            Some(scope) => (self.template, scope),
            None => self
                .origin
                .definitions
                .get(name)
                .map(|scope| (self.origin, scope))
                .ok_or_else(|| error_missing_template(name))?,
        };

        let child = Renderer {
            template,
            root: data,
            depth: self.depth + 1,
            ..*self
        };
        child.guard()?;

        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer);
        child.render_scope(scope, &mut pipe)?;

        Ok(buffer)
    }

    /// Fail when the depth has passed the maximum.
    fn guard(&self) -> Result<(), Error> {
        if self.depth > self.max_depth {
            return Err(Error::build(EXCEEDED_DEPTH).with_help(format!(
                "render exceeded the maximum depth of {}, \
                a template may be rendering itself",
                self.max_depth
            )));
        }

        Ok(())
    }

    /// Render every Tree in the Scope to the given Pipe.
    fn render_scope(&self, scope: &'render Scope, pipe: &mut Pipe) -> Result<(), Error> {
        for tree in &scope.data {
            match tree {
                Tree::Raw(region) => pipe
                    .write_str(region.literal(&self.template.source))
                    .map_err(|_| error_write())?,
                Tree::Output(output) => {
                    let value = self.evaluate(&output.expression)?;
                    pipe.write_value(&value).map_err(|_| error_write())?;
                }
            }
        }

        Ok(())
    }

    /// Evaluate an Expression to a Value.
    fn evaluate(&self, expression: &'render Expression) -> Result<Cow<'render, Value>, Error> {
        match expression {
            Expression::Base(base) => self.evaluate_base(base),
            Expression::Call(call) => self.evaluate_call(call),
        }
    }

    /// Evaluate a Call, and everything piped into it, to a Value.
    fn evaluate_call(&self, call: &'render Call) -> Result<Cow<'render, Value>, Error> {
        // Unwind the receiver chain so the calls can run left to right.
        let mut chain = vec![call];
        let mut begin = call.receiver.as_deref();
        while let Some(expression) = begin {
            match expression {
                Expression::Call(inner) => {
                    chain.push(inner);
                    begin = inner.receiver.as_deref();
                }
                Expression::Base(_) => break,
            }
        }

        let mut value: Option<Cow<'render, Value>> = match begin {
            Some(Expression::Base(base)) => Some(self.evaluate_base(base)?),
            _ => None,
        };

        for call in chain.into_iter().rev() {
            let name = call.name.region.literal(&self.template.source);
            let entry = self.registry.get(name).ok_or_else(|| {
                Error::build(INVALID_HELPER)
                    .with_pointer(&self.template.source, call.name.region)
                    .with_help(format!(
                        "template wants to use the `{name}` helper, but a helper with \
                        that name was not found, did you register it with `.register`?"
                    ))
            })?;

            let mut arguments = Vec::with_capacity(call.arguments.len() + 1);
            if let Some(previous) = value.take() {
                arguments.push(previous.into_owned());
            }
            for base in &call.arguments {
                arguments.push(self.evaluate_base(base)?.into_owned());
            }

            let returned = entry
                .function()
                .call(self, &arguments)
                .map_err(|error| error.with_pointer(&self.template.source, call.name.region))?;
            value = Some(Cow::Owned(returned));
        }

        Ok(value.expect("call chain always produces a value"))
    }

    /// Evaluate a Base to a Value.
    fn evaluate_base(&self, base: &'render Base) -> Result<Cow<'render, Value>, Error> {
        match base {
            Base::Literal(literal) => Ok(Cow::Borrowed(&literal.value)),
            Base::Variable(variable) => self.evaluate_variable(variable),
        }
    }

    /// Resolve a Variable against the root data.
    ///
    /// A path that cannot be fully resolved produces null, which renders
    /// as no output, so missing data falls through quietly and can be
    /// patched up with the `default` helper.
    fn evaluate_variable(&self, variable: &'render Variable) -> Result<Cow<'render, Value>, Error> {
        let mut keys = variable.path.iter();
        let first = keys.next().expect("variable path should not be empty");

        let mut value = match self.root.get(first.region.literal(&self.template.source)) {
            Some(value) => value,
            None => return Ok(Cow::Owned(Value::Null)),
        };
        for key in keys {
            value = match value.get(key.region.literal(&self.template.source)) {
                Some(value) => value,
                None => return Ok(Cow::Owned(Value::Null)),
            };
        }

        Ok(Cow::Borrowed(value))
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use crate::{compile::compile, helper::Registry, log::Error, Builder};
    use morel::Finder;
    use serde_json::{json, Value};

    #[test]
    fn test_render_raw() {
        assert_eq!(render("hello!", json!({})).unwrap(), "hello!");
    }

    #[test]
    fn test_render_variable() {
        assert_eq!(
            render("hello, (( name ))!", json!({"name": "taylor"})).unwrap(),
            "hello, taylor!"
        );
    }

    #[test]
    fn test_render_dotted_variable() {
        assert_eq!(
            render("(( person.name ))", json!({"person": {"name": "taylor"}})).unwrap(),
            "taylor"
        );
    }

    #[test]
    fn test_render_missing_variable_is_empty() {
        assert_eq!(render("x(( missing ))y", json!({})).unwrap(), "xy");
        assert_eq!(
            render("x(( a.b.c ))y", json!({"a": {"b": 1}})).unwrap(),
            "xy"
        );
    }

    #[test]
    fn test_render_pipe() {
        assert_eq!(
            render("(( name | uppercase ))", json!({"name": "taylor"})).unwrap(),
            "TAYLOR"
        );
    }

    #[test]
    fn test_render_pipe_chain_with_arguments() {
        assert_eq!(
            render(
                r#"(( name | replace "a" "o" | uppercase ))"#,
                json!({"name": "taylar"})
            )
            .unwrap(),
            "TAYLOR"
        );
    }

    #[test]
    fn test_render_literal_receiver() {
        assert_eq!(render(r#"(( "hi" | uppercase ))"#, json!({})).unwrap(), "HI");
    }

    #[test]
    fn test_render_leading_call() {
        assert_eq!(
            render(r#"(( default missing "fallback" ))"#, json!({})).unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_render_unknown_helper() {
        let error = render("(( name | nonsense ))", json!({"name": "x"})).unwrap_err();

        assert_eq!(error.get_reason(), "invalid helper");
    }

    #[test]
    fn test_render_parse_fragment() {
        assert_eq!(
            render(
                r#"(( parse ctx "inner (( name ))" ))"#,
                json!({"ctx": {"name": "x"}})
            )
            .unwrap(),
            "inner x"
        );
    }

    #[test]
    fn test_render_parse_fragment_reaches_definitions() {
        assert_eq!(
            render(
                r#"(* define "header" *)== (( title ))(* end *)(( parse data snippet ))"#,
                json!({
                    "data": {"inner": {"title": "intro"}},
                    "snippet": r#"(( invoke "header" inner ))"#
                })
            )
            .unwrap(),
            "== intro"
        );
    }

    #[test]
    fn test_render_invoke_definition() {
        assert_eq!(
            render(
                r#"(* define "greet" *)hi (( who ))(* end *)(( invoke "greet" ctx ))"#,
                json!({"ctx": {"who": "you"}})
            )
            .unwrap(),
            "hi you"
        );
    }

    #[test]
    fn test_render_self_invoking_definition_hits_depth() {
        let error = render(
            r#"(* define "loop" *)(( invoke "loop" 0 ))(* end *)(( invoke "loop" 0 ))"#,
            json!({}),
        )
        .unwrap_err();

        assert_eq!(error.get_reason(), "exceeded maximum depth");
    }

    fn render(text: &str, root: Value) -> Result<String, Error> {
        let finder = Finder::new(Builder::new().to_syntax());
        let registry = Registry::with_common();
        let template = compile(&finder, None, text)?;

        Renderer::new(&registry, &template, &finder, &root, 16).render()
    }
}
