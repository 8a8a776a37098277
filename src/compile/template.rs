use super::parse::scope::Scope;
use std::collections::HashMap;

/// A compiled template.
///
/// The `scope` field contains the Abstract Syntax Tree of the template
/// body, and `definitions` holds the named fragments that were hoisted
/// out of the body by the parser.
#[derive(Debug, Clone)]
pub struct Template {
    /// Name of the template, if one was given during compilation.
    pub(crate) name: Option<String>,
    /// The Abstract Syntax Tree of the template body.
    pub(crate) scope: Scope,
    /// Named fragments, indexed by name.
    pub(crate) definitions: HashMap<String, Scope>,
    /// The source text that the regions within `scope` refer to.
    pub(crate) source: String,
}

impl Template {
    /// Return the name of the Template.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return true when the Template contains a definition with the
    /// given name.
    pub fn has_definition(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }
}
