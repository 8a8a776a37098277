//! Imbue is a template engine for rendering text against layered JSON
//! and YAML data.
//!
//! # Usage
//!
//! A [`Factory`] creates an [`Engine`] for a dialect, the engine holds
//! a template body and named definitions, and a [`Store`] holds the
//! data that the template is rendered against.
//!
//! ```
//! use imbue::{Factory, Store};
//!
//! let factory = Factory::new();
//! let mut engine = factory.create("tag", "greeting").unwrap();
//! engine.load_body("hello, (( name | uppercase ))!").unwrap();
//!
//! let store = Store::new().with_must("name", "taylor");
//! let mut buffer = Vec::new();
//! engine.render(&mut buffer, &store).unwrap();
//!
//! assert_eq!(String::from_utf8(buffer).unwrap(), "hello, TAYLOR!");
//! ```
//!
//! # Dialects
//!
//! Two dialects are built in.
//!
//! The "tag" dialect delimits expressions with `((` and `))` and blocks
//! with `(*` and `*)`. It is composing, every definition loaded into the
//! engine is assembled ahead of the body inside a `define` block, so the
//! body can reach any of them with the `invoke` helper.
//!
//! The "mustache" dialect delimits expressions with `{{` and `}}` and
//! blocks with `{%` and `%}`. Definitions are stored but never composed
//! into the template.
//!
//! Additional dialects may be registered on a [`Factory`] at runtime.
//!
//! # Data
//!
//! A [`Store`] accumulates data from serialized sources, merging each
//! new source over the previous data. Scalars from the newest source
//! win, objects combine.
//!
//! ```
//! use imbue::Store;
//!
//! let store = Store::new()
//!     .with_source(br#"{"service": {"host": "localhost", "port": 80}}"#, "json")
//!     .unwrap()
//!     .with_source(b"service:\n  port: 8080\n", "yaml")
//!     .unwrap();
//!
//! assert_eq!(store.get_path("service.port").unwrap(), &serde_json::json!(8080));
//! assert_eq!(store.get_path("service.host").unwrap(), &serde_json::json!("localhost"));
//! ```
//!
//! # Helpers
//!
//! Expressions transform data by piping it through helpers, or by
//! calling a helper directly with arguments. Every engine starts with
//! the common set described in the [`helper`] module, and new helpers
//! may be registered through [`Engine::helpers_mut`].
mod compile;
mod engine;
mod log;
mod pipe;
mod region;
mod render;
mod store;

pub mod helper;
pub mod path;

pub use compile::{Builder, Marker, Template};
pub use engine::{Engine, Factory, MustacheEngine, TagEngine, Unit, DEFAULT_MAX_DEPTH};
pub use log::Error;
pub use region::Region;
pub use render::Renderer;
pub use store::{merge, Store};
