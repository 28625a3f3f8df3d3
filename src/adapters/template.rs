use crate::domain::ports::TemplateRenderer;
use crate::utils::error::{OperatorError, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const BUILTIN_AUSF_CONF: &str = include_str!("../../templates/ausf.conf.tmpl");
const TEMPLATE_EXTENSION: &str = "tmpl";

/// Renders `{{ name }}` placeholders. Unknown placeholders are an error, and a
/// single trailing newline of the template is dropped from the output.
pub struct PlaceholderRenderer {
    templates: BTreeMap<String, String>,
    placeholder: Regex,
}

impl PlaceholderRenderer {
    pub fn new() -> Result<Self> {
        let placeholder = Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").map_err(|e| {
            OperatorError::TemplateError {
                template: "*".to_string(),
                message: format!("Invalid placeholder pattern: {}", e),
            }
        })?;
        Ok(Self {
            templates: BTreeMap::new(),
            placeholder,
        })
    }

    /// Renderer preloaded with the templates shipped in the binary.
    pub fn builtin() -> Result<Self> {
        let mut renderer = Self::new()?;
        renderer.register("ausf.conf", BUILTIN_AUSF_CONF);
        Ok(renderer)
    }

    /// Builtin templates, overridden by any `<name>.tmpl` found in `dir`.
    pub fn with_overrides<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut renderer = Self::builtin()?;
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                tracing::debug!("Loading template override {}", path.display());
                renderer.register(name, &fs::read_to_string(&path)?);
            }
        }
        Ok(renderer)
    }

    pub fn register(&mut self, name: &str, source: &str) {
        self.templates.insert(name.to_string(), source.to_string());
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template_name: &str, bindings: &BTreeMap<String, String>) -> Result<String> {
        let source =
            self.templates
                .get(template_name)
                .ok_or_else(|| OperatorError::TemplateError {
                    template: template_name.to_string(),
                    message: "template not found".to_string(),
                })?;

        let mut unbound = Vec::new();
        let rendered = self.placeholder.replace_all(source, |caps: &Captures| {
            let name = &caps[1];
            match bindings.get(name) {
                Some(value) => value.clone(),
                None => {
                    unbound.push(name.to_string());
                    String::new()
                }
            }
        });

        if !unbound.is_empty() {
            return Err(OperatorError::TemplateError {
                template: template_name.to_string(),
                message: format!("unbound variables: {}", unbound.join(", ")),
            });
        }

        let rendered = rendered.into_owned();
        Ok(match rendered.strip_suffix('\n') {
            Some(trimmed) => trimmed.to_string(),
            None => rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bindings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let mut renderer = PlaceholderRenderer::new().unwrap();
        renderer.register("greeting", "PORT = {{port}};\nNAME = \"{{ name }}\";\n");

        let rendered = renderer
            .render("greeting", &bindings(&[("port", "80"), ("name", "OAI_AUSF")]))
            .unwrap();
        assert_eq!(rendered, "PORT = 80;\nNAME = \"OAI_AUSF\";");
    }

    #[test]
    fn test_unbound_variable_is_an_error() {
        let mut renderer = PlaceholderRenderer::new().unwrap();
        renderer.register("partial", "{{ nrf_port }} {{ udm_port }}");

        let err = renderer
            .render("partial", &bindings(&[("nrf_port", "81")]))
            .unwrap_err();
        assert!(err.to_string().contains("udm_port"));
    }

    #[test]
    fn test_builtin_config_template_is_registered() {
        let renderer = PlaceholderRenderer::builtin().unwrap();
        let err = renderer.render("ausf.conf", &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("nrf_ipv4_address"));
        assert!(renderer.render("missing", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_directory_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("ausf.conf.tmpl"), "ID = {{ instance }}\n").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let renderer = PlaceholderRenderer::with_overrides(temp_dir.path()).unwrap();
        let rendered = renderer
            .render("ausf.conf", &bindings(&[("instance", "0")]))
            .unwrap();
        assert_eq!(rendered, "ID = 0");
    }
}
