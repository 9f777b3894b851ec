//! Rendering HTML parts from templates
//!
//! The message builder does not know about any template engine: it asks a
//! [`Render`] implementation for the bytes of the HTML part. A
//! [`TeraRenderer`] is provided with the `tera` feature.

use std::error::Error as StdError;

use serde::Serialize;

/// Renders a template against a data context
pub trait Render {
    /// Error produced when a template is missing, malformed, or does not fit the data
    type Error: StdError + Send + Sync + 'static;

    /// Renders `template` with `data`
    ///
    /// What `template` identifies (a file path, a registered name...) is up to
    /// the implementation.
    fn render<T>(&self, template: &str, data: &T) -> Result<Vec<u8>, Self::Error>
    where
        T: Serialize + ?Sized;
}

impl<R: Render + ?Sized> Render for &R {
    type Error = R::Error;

    fn render<T>(&self, template: &str, data: &T) -> Result<Vec<u8>, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        (**self).render(template, data)
    }
}

#[cfg(feature = "tera")]
#[cfg_attr(docsrs, doc(cfg(feature = "tera")))]
pub use self::tera_engine::TeraRenderer;

#[cfg(feature = "tera")]
mod tera_engine {
    use serde::Serialize;
    use tera::{Context, Tera};

    use super::Render;

    /// Renders templates with [tera](https://keats.github.io/tera/)
    ///
    /// A template is looked up by name among the templates loaded into the
    /// renderer first. Otherwise the name is read as a file path and the file
    /// is rendered on its own. Output is HTML-escaped in both cases.
    ///
    /// The data must serialize to a map (a struct or a JSON object).
    #[derive(Debug, Default)]
    pub struct TeraRenderer {
        tera: Tera,
    }

    impl TeraRenderer {
        /// Creates a renderer without preloaded templates, every template
        /// is read from the filesystem
        pub fn new() -> Self {
            Self::default()
        }

        /// Loads all templates matching a glob, such as `"templates/**/*.html"`
        pub fn from_glob(glob: &str) -> Result<Self, tera::Error> {
            Ok(Self {
                tera: Tera::new(glob)?,
            })
        }

        /// Adds a named template from a string
        pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), tera::Error> {
            self.tera.add_raw_template(name, source)
        }
    }

    impl From<Tera> for TeraRenderer {
        fn from(tera: Tera) -> Self {
            Self { tera }
        }
    }

    impl Render for TeraRenderer {
        type Error = tera::Error;

        fn render<T>(&self, template: &str, data: &T) -> Result<Vec<u8>, tera::Error>
        where
            T: Serialize + ?Sized,
        {
            let context = Context::from_serialize(data)?;

            let rendered = if self.tera.get_template_names().any(|name| name == template) {
                self.tera.render(template, &context)?
            } else {
                let source = std::fs::read_to_string(template).map_err(|e| {
                    tera::Error::chain(format!("could not read template `{template}`"), e)
                })?;
                Tera::one_off(&source, &context, true)?
            };

            Ok(rendered.into_bytes())
        }
    }

}
