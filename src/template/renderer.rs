//! Template rendering.
//!
//! `{{#each}}` pushes a frame per item. A named loop (`as app`) binds the
//! item under that name; an unnamed loop exposes the item's fields directly.
//! Lookups try frames innermost first, then the root context.

use super::parser::{Arg, Node};
use super::{Result, TemplateContext, TemplateError, Value};

/// Escape text for HTML element and attribute content.
///
/// ```
/// use intake::template::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

struct Frame<'v> {
    alias: Option<&'v str>,
    item: &'v Value,
}

impl<'v> Frame<'v> {
    fn resolve(&self, head: &str, rest: Option<&str>) -> Option<&'v Value> {
        let base = match self.alias {
            Some(alias) if alias == head => self.item,
            Some(_) => return None,
            None => match self.item {
                Value::Object(fields) => fields.get(head)?,
                _ => return None,
            },
        };
        match rest {
            Some(rest) => base.get_path(rest),
            None => Some(base),
        }
    }
}

/// Render parsed nodes against a context.
pub fn render(nodes: &[Node], context: &TemplateContext) -> Result<String> {
    let mut out = String::new();
    let mut frames = Vec::new();
    render_into(nodes, context, &mut frames, &mut out)?;
    Ok(out)
}

fn render_into<'v>(
    nodes: &'v [Node],
    context: &'v TemplateContext,
    frames: &mut Vec<Frame<'v>>,
    out: &mut String,
) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Variable(path) => {
                if let Some(value) = lookup(path, context, frames) {
                    out.push_str(&escape_html(&value.to_display_string()));
                }
            }
            Node::Translation { key, args } => {
                let text = translate(key, args, context, frames);
                out.push_str(&escape_html(&text));
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if truthy(condition, context, frames) {
                    then_branch
                } else {
                    else_branch
                };
                render_into(branch, context, frames, out)?;
            }
            Node::Unless { condition, body } => {
                if !truthy(condition, context, frames) {
                    render_into(body, context, frames, out)?;
                }
            }
            Node::Each { list, alias, body } => {
                let items = match lookup(list, context, frames) {
                    Some(Value::List(items)) => items,
                    Some(Value::Null) | None => continue,
                    Some(_) => {
                        return Err(TemplateError::Render(format!("'{list}' is not a list")));
                    }
                };
                for item in items {
                    frames.push(Frame {
                        alias: alias.as_deref(),
                        item,
                    });
                    let rendered = render_into(body, context, frames, out);
                    frames.pop();
                    rendered?;
                }
            }
        }
    }
    Ok(())
}

fn lookup<'v>(
    path: &str,
    context: &'v TemplateContext,
    frames: &[Frame<'v>],
) -> Option<&'v Value> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    frames
        .iter()
        .rev()
        .find_map(|frame| frame.resolve(head, rest))
        .or_else(|| context.get(path))
}

fn truthy(path: &str, context: &TemplateContext, frames: &[Frame<'_>]) -> bool {
    lookup(path, context, frames).is_some_and(Value::is_truthy)
}

fn translate(
    key: &str,
    args: &[(String, Arg)],
    context: &TemplateContext,
    frames: &[Frame<'_>],
) -> String {
    let i18n = context.i18n();
    if args.is_empty() {
        return i18n.t(key).to_string();
    }

    let values: Vec<(&str, String)> = args
        .iter()
        .map(|(name, arg)| {
            let value = match arg {
                Arg::Literal(text) => text.clone(),
                Arg::Path(path) => lookup(path, context, frames)
                    .map(Value::to_display_string)
                    .unwrap_or_default(),
            };
            (name.as_str(), value)
        })
        .collect();
    let pairs: Vec<(&str, &str)> = values.iter().map(|(n, v)| (*n, v.as_str())).collect();
    i18n.t_with(key, &pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::I18n;
    use crate::template::parser::parse;
    use std::sync::Arc;

    fn render_str(template: &str, context: &TemplateContext) -> String {
        render(&parse(template).unwrap(), context).unwrap()
    }

    fn context() -> TemplateContext {
        let i18n = I18n::from_str(
            "fr",
            r#"
[status]
received = "Reçue"

[review]
count = "{{count}} candidature(s)"
"#,
        )
        .unwrap();
        TemplateContext::new(Arc::new(i18n))
    }

    fn option(value: &str, selected: bool) -> Value {
        [("value", Value::from(value)), ("selected", Value::from(selected))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_variables_are_escaped() {
        let mut ctx = context();
        ctx.set("name", "<script>alert('x')</script>");
        assert_eq!(
            render_str("{{name}}", &ctx),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(render_str("[{{missing}}]", &ctx), "[]");
    }

    #[test]
    fn test_translation() {
        let mut ctx = context();
        ctx.set("total", 3usize);
        assert_eq!(render_str(r#"{{t "status.received"}}"#, &ctx), "Reçue");
        assert_eq!(render_str(r#"{{t "review.count" count=total}}"#, &ctx), "3 candidature(s)");
        assert_eq!(
            render_str(r#"{{t "review.count" count="<b>"}}"#, &ctx),
            "&lt;b&gt; candidature(s)"
        );
        assert_eq!(render_str(r#"{{t "unknown.key"}}"#, &ctx), "unknown.key");
    }

    #[test]
    fn test_if_unless() {
        let mut ctx = context();
        ctx.set("yes", true);
        ctx.set("empty", Value::List(vec![]));
        assert_eq!(render_str("{{#if yes}}A{{else}}B{{/if}}", &ctx), "A");
        assert_eq!(render_str("{{#if empty}}A{{else}}B{{/if}}", &ctx), "B");
        assert_eq!(render_str("{{#unless missing}}C{{/unless}}", &ctx), "C");
    }

    #[test]
    fn test_each_exposes_item_fields() {
        let mut ctx = context();
        ctx.set(
            "statuses",
            Value::List(vec![option("received", false), option("accepted", true)]),
        );
        assert_eq!(
            render_str("{{#each statuses}}{{value}}{{#if selected}}*{{/if}};{{/each}}", &ctx),
            "received;accepted*;"
        );
        assert_eq!(render_str("{{#each nothing}}x{{/each}}", &ctx), "");
    }

    #[test]
    fn test_named_loop_with_nested_list() {
        let mut ctx = context();
        let app: Value = [
            ("id", Value::from("a1")),
            ("statuses", Value::List(vec![option("received", true)])),
        ]
        .into_iter()
        .collect();
        ctx.set("applications", Value::List(vec![app]));
        ctx.set("lang", "fr");

        let template = "{{#each applications as app}}{{app.id}}:\
                        {{#each app.statuses}}{{value}}/{{app.id}}/{{lang}}{{/each}}{{/each}}";
        assert_eq!(render_str(template, &ctx), "a1:received/a1/fr");
    }

    #[test]
    fn test_inner_item_shadows_root() {
        let mut ctx = context();
        ctx.set("value", "root");
        ctx.set("statuses", Value::List(vec![option("inner", false)]));
        assert_eq!(
            render_str("{{#each statuses}}{{value}}{{/each}}|{{value}}", &ctx),
            "inner|root"
        );
    }

    #[test]
    fn test_each_on_non_list_fails() {
        let mut ctx = context();
        ctx.set("name", "x");
        let nodes = parse("{{#each name}}{{/each}}").unwrap();
        assert!(matches!(render(&nodes, &ctx), Err(TemplateError::Render(_))));
    }
}
