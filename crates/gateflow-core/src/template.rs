//! Schema template processor
//!
//! Custom integration targets ship an OpenAPI template next to the
//! deployment config, named `{type}-open-api.json`, with the target's base
//! URL left as a `{{BASE_URL}}` placeholder. Materialization is purely
//! local; both failure modes here fire before any control-plane call.

use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

/// Locates and materializes schema templates from a directory
pub struct SchemaTemplates {
    dir: PathBuf,
}

impl SchemaTemplates {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path the template for a target type is expected at
    pub fn template_path(&self, short_type: &str) -> PathBuf {
        self.dir.join(format!("{short_type}-open-api.json"))
    }

    /// Read the template for `short_type` and substitute every occurrence
    /// of the `{{BASE_URL}}` placeholder with `base_url`.
    ///
    /// A document without the placeholder renders unchanged.
    pub fn materialize(&self, short_type: &str, base_url: &str) -> Result<String> {
        let path = self.template_path(short_type);
        if !path.exists() {
            return Err(CoreError::TemplateNotFound(path));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut context = Context::new();
        context.insert("BASE_URL", base_url);

        Tera::one_off(&content, &context, false).map_err(|e| CoreError::TemplateRender {
            file: path,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn templates_with(name: &str, content: &str) -> (tempfile::TempDir, SchemaTemplates) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(name), content).unwrap();
        let templates = SchemaTemplates::new(dir.path());
        (dir, templates)
    }

    #[test]
    fn test_substitutes_all_occurrences() {
        let (_dir, templates) = templates_with(
            "jira-open-api.json",
            r#"{"servers":[{"url":"{{BASE_URL}}/a"},{"url":"{{BASE_URL}}/b"}]}"#,
        );

        let rendered = templates.materialize("jira", "https://x").unwrap();
        assert_eq!(rendered, r#"{"servers":[{"url":"https://x/a"},{"url":"https://x/b"}]}"#);
    }

    #[test]
    fn test_identity_without_placeholder() {
        let input = r#"{"openapi":"3.0.0","paths":{"/issues/{id}":{}}}"#;
        let (_dir, templates) = templates_with("jira-open-api.json", input);

        let rendered = templates.materialize("jira", "https://x").unwrap();
        assert_eq!(rendered, input);
    }

    #[test]
    fn test_missing_template() {
        let dir = tempdir().unwrap();
        let templates = SchemaTemplates::new(dir.path());

        let err = templates.materialize("jira", "https://x").unwrap_err();
        assert!(matches!(err, CoreError::TemplateNotFound(_)));
        assert!(err.to_string().contains("jira-open-api.json"));
    }
}
