//! Case transforms selected by key suffix.
//!
//! `t("title_upper")` looks up `title` and upper-cases the result. The
//! suffix is stripped in `before_translate` and the chosen transform is
//! carried to `after_translate` in `context.data["transform"]`.

use bakery_core::{ContextPatch, Plugin, PluginContext, PluginKind, PluginMetadata};
use serde_json::Value;

const TRANSFORM_FIELD: &str = "transform";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Upper,
    Lower,
    Capitalize,
    Title,
}

impl Transform {
    const ALL: [Self; 4] = [Self::Upper, Self::Lower, Self::Capitalize, Self::Title];

    const fn name(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Capitalize => "capitalize",
            Self::Title => "title",
        }
    }

    fn suffix(self) -> String {
        format!("_{}", self.name())
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|transform| transform.name() == name)
    }

    fn apply(self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Capitalize => capitalize(text),
            Self::Title => text.split(' ').map(capitalize).collect::<Vec<_>>().join(" "),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Processor plugin applying case transforms.
#[derive(Debug, Clone)]
pub struct CapitalizePlugin {
    metadata: PluginMetadata,
}

impl CapitalizePlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self {
            metadata: PluginMetadata::new("capitalize", "1.0.0", PluginKind::Processor)
                .with_description("Provides text transformation (uppercase, lowercase, capitalize)")
                .with_author("i18n-bakery"),
        }
    }
}

impl Default for CapitalizePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for CapitalizePlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn before_translate(&self, context: &PluginContext) -> anyhow::Result<Option<ContextPatch>> {
        let Some(key) = context.key.as_deref() else {
            return Ok(None);
        };

        for transform in Transform::ALL {
            if let Some(base) = key.strip_suffix(transform.suffix().as_str()) {
                let mut data = context.data.clone();
                data.insert(
                    TRANSFORM_FIELD.to_string(),
                    Value::String(transform.name().to_string()),
                );
                return Ok(Some(ContextPatch::default().key(base).data(data)));
            }
        }
        Ok(None)
    }

    fn after_translate(&self, context: &PluginContext) -> anyhow::Result<Option<String>> {
        let Some(result) = context.result.as_deref() else {
            return Ok(None);
        };
        let transform = context
            .data
            .get(TRANSFORM_FIELD)
            .and_then(Value::as_str)
            .and_then(Transform::from_name);
        Ok(transform.map(|transform| transform.apply(result)))
    }
}
