//! Template resolution.
//!
//! # Responsibilities
//! - Locate page templates in the configured directory
//! - Compile them into one Tera instance per request
//! - Pick the entry point used for rendering
//!
//! # Design Decisions
//! - Nothing is cached: edits to the theme show up on the next request
//! - Templates are named after their file names so they can include each other
//!   (`{% include "styles.css" %}`)
//! - Autoescaping is off: values are inserted verbatim and themes escape
//!   echoed metadata themselves with the `escape` filter

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use thiserror::Error;

use crate::config::{PagesConfig, TemplatePolicy};
use crate::pages::data::ErrorPageData;

/// File stem of the entry template under the directory policy.
pub const ENTRY_TEMPLATE: &str = "index";

/// Optional stylesheet loaded next to per-code pages.
pub const STYLESHEET: &str = "styles.css";

/// Failure to produce a template set.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template directory {}: {source}", .directory.display())]
    ReadDirectory {
        directory: PathBuf,
        source: io::Error,
    },

    #[error("no templates found in {}", .0.display())]
    Empty(PathBuf),

    /// Only produced by the per-code policy; callers answer with JSON instead.
    #[error("no page template for status {code} in {}", .directory.display())]
    NoPageForCode { code: u16, directory: PathBuf },

    #[error("invalid template: {0}")]
    Syntax(#[from] tera::Error),
}

/// Loads templates from disk on every call.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    directory: PathBuf,
    policy: TemplatePolicy,
}

impl TemplateResolver {
    pub fn new(directory: impl Into<PathBuf>, policy: TemplatePolicy) -> Self {
        Self {
            directory: directory.into(),
            policy,
        }
    }

    pub fn from_config(config: &PagesConfig) -> Self {
        Self::new(config.template_directory.clone(), config.template_policy)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn policy(&self) -> TemplatePolicy {
        self.policy
    }

    /// Build the template set used to render a page for `code`.
    pub fn resolve(&self, code: u16) -> Result<TemplateSet, TemplateError> {
        match self.policy {
            TemplatePolicy::Directory => self.resolve_directory(),
            TemplatePolicy::PerCode => self.resolve_per_code(code),
        }
    }

    fn resolve_directory(&self) -> Result<TemplateSet, TemplateError> {
        let read_error = |source| TemplateError::ReadDirectory {
            directory: self.directory.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push((path, Some(name)));
        }

        if files.is_empty() {
            return Err(TemplateError::Empty(self.directory.clone()));
        }
        files.sort();

        let entry = files
            .iter()
            .filter_map(|(_, name)| name.as_deref())
            .find(|name| Path::new(name).file_stem() == Some(OsStr::new(ENTRY_TEMPLATE)))
            .map(str::to_owned);

        tracing::debug!(
            directory = %self.directory.display(),
            templates = files.len(),
            entry = ?entry,
            "Loaded template directory"
        );

        let mut tera = verbatim_tera();
        tera.add_template_files(files)?;
        Ok(TemplateSet { tera, entry })
    }

    fn resolve_per_code(&self, code: u16) -> Result<TemplateSet, TemplateError> {
        let candidates = [format!("{}.html", code), format!("{}xx.html", code / 100)];
        let page = candidates
            .into_iter()
            .find(|name| self.directory.join(name).is_file())
            .ok_or_else(|| TemplateError::NoPageForCode {
                code,
                directory: self.directory.clone(),
            })?;

        let mut files = vec![(self.directory.join(&page), Some(page.clone()))];
        let styles = self.directory.join(STYLESHEET);
        if styles.is_file() {
            files.push((styles, Some(STYLESHEET.to_string())));
        } else {
            tracing::debug!(path = %styles.display(), "No stylesheet, rendering without it");
        }

        tracing::debug!(code, page = %page, "Loaded per-code template");

        let mut tera = verbatim_tera();
        tera.add_template_files(files)?;
        Ok(TemplateSet {
            tera,
            entry: Some(page),
        })
    }
}

fn verbatim_tera() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    tera
}

/// A compiled set of templates with its entry point.
#[derive(Debug)]
pub struct TemplateSet {
    tera: Tera,
    entry: Option<String>,
}

impl TemplateSet {
    /// Name of the template rendered by [`execute`](Self::execute), if there is one.
    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// Render the entry template into a fully buffered string.
    pub fn execute(&self, data: &ErrorPageData) -> Result<String, tera::Error> {
        let entry = self.entry.as_deref().ok_or_else(|| {
            tera::Error::msg(format!("no template named `{}` in set", ENTRY_TEMPLATE))
        })?;
        let context = Context::from_serialize(data)?;
        self.tera.render(entry, &context)
    }
}
