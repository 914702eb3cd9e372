//! Template lookup across an ordered list of view paths.

use crate::error::Result;
use crate::format::Format;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A pre-rendered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    mime_type: Option<String>,
    locale: Option<String>,
    body: String,
}

impl Template {
    /// Creates an untyped template; it takes the mailer's default content type.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            mime_type: None,
            locale: None,
            body: body.into(),
        }
    }

    /// Creates a `text/plain` template.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(body).with_mime_type(Format::Text.mime_type())
    }

    /// Creates a `text/html` template.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(body).with_mime_type(Format::Html.mime_type())
    }

    /// Sets the mime type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into().to_ascii_lowercase());
        self
    }

    /// Restricts the template to one locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Returns the mime type, if the template declares one.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Returns the locale, if the template is locale-specific.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Returns the rendered body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// One source of templates.
pub trait ViewPath: Debug + Send + Sync {
    /// Returns every template for `<mailer>/<action>`, in any locale.
    ///
    /// # Errors
    ///
    /// Returns an error if the templates exist but cannot be read.
    fn templates(&self, mailer: &str, action: &str) -> Result<Vec<Template>>;
}

/// View path backed by templates registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryViewPath {
    entries: Vec<(String, String, Template)>,
}

impl MemoryViewPath {
    /// Creates an empty view path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template for `<mailer>/<action>`.
    #[must_use]
    pub fn with_template(
        mut self,
        mailer: impl Into<String>,
        action: impl Into<String>,
        template: Template,
    ) -> Self {
        self.add(mailer, action, template);
        self
    }

    /// Registers a template for `<mailer>/<action>`.
    pub fn add(
        &mut self,
        mailer: impl Into<String>,
        action: impl Into<String>,
        template: Template,
    ) {
        self.entries.push((mailer.into(), action.into(), template));
    }
}

impl ViewPath for MemoryViewPath {
    fn templates(&self, mailer: &str, action: &str) -> Result<Vec<Template>> {
        Ok(self
            .entries
            .iter()
            .filter(|(m, a, _)| m == mailer && a == action)
            .map(|(_, _, template)| template.clone())
            .collect())
    }
}

/// View path reading `<root>/<mailer>/<action>[.<locale>][.<format>]` files,
/// where `<format>` is `text`, `html` or `enriched`.
#[derive(Debug, Clone)]
pub struct DirectoryViewPath {
    root: PathBuf,
}

impl DirectoryViewPath {
    /// Creates a view path rooted at `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ViewPath for DirectoryViewPath {
    fn templates(&self, mailer: &str, action: &str) -> Result<Vec<Template>> {
        let dir = self.root.join(mailer);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut templates = Vec::new();
        for name in names {
            let Some(rest) = name.strip_prefix(action) else {
                continue;
            };
            if !rest.is_empty() && !rest.starts_with('.') {
                continue;
            }
            let Some((locale, format)) = parse_suffix(rest) else {
                warn!(
                    file = %name,
                    dir = %dir.display(),
                    "Ignoring template with unrecognized name"
                );
                continue;
            };

            let mut template = Template::new(fs::read_to_string(dir.join(&name))?);
            if let Some(format) = format {
                template = template.with_mime_type(format.mime_type());
            }
            if let Some(locale) = locale {
                template = template.with_locale(locale);
            }
            templates.push(template);
        }
        Ok(templates)
    }
}

/// Splits `[.<locale>][.<format>]`.
fn parse_suffix(rest: &str) -> Option<(Option<&str>, Option<Format>)> {
    let segments: Vec<&str> = rest.split('.').skip(1).collect();
    match segments.as_slice() {
        [] => Some((None, None)),
        [one] => Some(Format::from_extension(one).map_or((Some(*one), None), |f| (None, Some(f)))),
        [locale, format] => Format::from_extension(format).map(|f| (Some(*locale), Some(f))),
        _ => None,
    }
}

/// Resolves the implicit templates of an action.
///
/// The first view path with a usable template wins. Per mime type a
/// template for `locale` is preferred over a generic one; templates for
/// other locales are ignored. Mime types keep the order in which the path
/// lists them.
pub(crate) fn resolve_implicit(
    paths: &[Box<dyn ViewPath>],
    mailer: &str,
    action: &str,
    locale: &str,
) -> Result<Vec<Template>> {
    for (index, path) in paths.iter().enumerate() {
        let selected = select_for_locale(path.templates(mailer, action)?, locale);
        if selected.is_empty() {
            debug!(mailer, action, index, "No templates in view path, trying next");
            continue;
        }
        debug!(mailer, action, index, count = selected.len(), "Resolved implicit templates");
        return Ok(selected);
    }
    Ok(Vec::new())
}

/// Resolves the template of one explicit format, searching every view path.
pub(crate) fn resolve_format(
    paths: &[Box<dyn ViewPath>],
    mailer: &str,
    action: &str,
    mime_type: &str,
    locale: &str,
) -> Result<Option<Template>> {
    for path in paths {
        let candidates = path
            .templates(mailer, action)?
            .into_iter()
            .filter(|t| t.mime_type() == Some(mime_type));
        if let Some(template) = select_for_locale(candidates.collect(), locale).into_iter().next() {
            return Ok(Some(template));
        }
    }
    Ok(None)
}

fn select_for_locale(templates: Vec<Template>, locale: &str) -> Vec<Template> {
    let mut selected: Vec<Template> = Vec::new();
    for template in templates {
        if template.locale().is_some_and(|l| l != locale) {
            continue;
        }
        match selected.iter_mut().find(|t| t.mime_type() == template.mime_type()) {
            Some(existing) if existing.locale().is_none() && template.locale().is_some() => {
                *existing = template;
            }
            Some(_) => {}
            None => selected.push(template),
        }
    }
    selected
}
