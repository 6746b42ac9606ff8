//! Page templates compiled into the binary.

use super::{Result, TemplateEngine};

/// Built-in page templates, by name.
pub const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("login", include_str!("../../templates/login.html")),
    ("review", include_str!("../../templates/review.html")),
    ("error", include_str!("../../templates/error.html")),
];

/// Engine with every built-in template parsed.
pub fn embedded_engine() -> Result<TemplateEngine> {
    let mut engine = TemplateEngine::new();
    for (name, content) in EMBEDDED_TEMPLATES {
        engine.load(*name, content)?;
    }
    Ok(engine)
}
