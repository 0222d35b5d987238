//! Hand-compiled templates shipped with the `tkrender` binary. They
//! are written the way the template compiler emits code: literal text
//! goes through `append`, expression values through
//! `append_escaped`, attributes through `render_attributes`.

use anyhow::{anyhow, Result};
use serde_json::{json, Map, Value};

use crate::{buffer::{render_attributes, AttrValue, Buffer},
            registry::Registry,
            scope::{foreach, Globals, Scope},
            template::Template};

fn greeting(_deps: &[Template]) -> Result<Template> {
    Ok(Template::new("greeting", |scope, _| {
        let mut b = Buffer::new();
        b.append("<p class=\"greeting\">Hello, ");
        b.append_escaped(scope.bind_or_null("name")?);
        b.append("!</p>");
        Ok(b)
    }))
}

fn list(_deps: &[Template]) -> Result<Template> {
    Ok(Template::new("list", |scope, _| {
        let items = scope.bind_or_null("items")?;
        let items = items.as_array().ok_or_else(
            || anyhow!("list: `items` must be an array, got: {items}"))?;
        let mut b = Buffer::new();
        b.append("<ul>");
        foreach(items, |item, i| -> Result<()> {
            b.append("<li");
            b.render_attribute("class", (i % 2 == 1).then(|| "odd"));
            b.append(">");
            b.append_escaped(item);
            b.append("</li>");
            Ok(())
        })?;
        b.append("</ul>");
        Ok(b)
    }))
}

fn field(_deps: &[Template]) -> Result<Template> {
    Ok(Template::new("field", |scope, _| {
        let mut b = Buffer::new();
        b.append("<input type=\"");
        b.append_escaped(scope.bind("type")?.unwrap_or(&json!("text")));
        b.append("\"");
        b.append(render_attributes([
            ("name", AttrValue::from(scope.bind("name")?)),
            ("value", AttrValue::from(scope.bind("value")?)),
            ("checked", AttrValue::from(scope.bind("checked")?)),
            ("disabled", AttrValue::from(scope.bind("disabled")?)),
        ]));
        b.append(">");
        Ok(b)
    }))
}

fn page(_deps: &[Template]) -> Result<Template> {
    Ok(Template::new("page", |scope, _| {
        let mut b = Buffer::new();
        b.append("<!DOCTYPE html>\n<html><head><title>");
        b.append(scope.call("title", &[])?);
        b.append("</title></head><body>");
        b.append(scope.call("content", &[])?);
        b.append("</body></html>");
        Ok(b)
    })
    .with_def("title", |scope, _| {
        let mut b = Buffer::new();
        match scope.bind("title")? {
            Some(title) => b.append_escaped(title),
            None => b.append("Untitled"),
        }
        Ok(b)
    })
    .with_def("content", |_, _| Ok(Buffer::new())))
}

fn article(deps: &[Template]) -> Result<Template> {
    let (page, greeting) = match deps {
        [page, greeting] => (page, greeting.clone()),
        _ => return Err(anyhow!("article: expected 2 dependencies, got {}", deps.len())),
    };
    Ok(Template::extending("article", page)
       .with_def("title", |scope, _| {
           let mut b = Buffer::new();
           b.append_escaped(scope.bind_or_null("headline")?);
           Ok(b)
       })
       .with_def("content", move |scope, _| {
           let mut b = Buffer::new();
           b.append("<article><h1>");
           b.append_escaped(scope.bind_or_null("headline")?);
           b.append("</h1>");
           let mut vars = Map::new();
           vars.insert("name".into(), scope.bind_or_null("author")?.clone());
           b.append(greeting.include(scope, vars)?);
           b.append("<div class=\"body\">");
           b.append_escaped(scope.bind_or_null("body")?);
           b.append("</div></article>");
           Ok(b)
       }))
}

/// A registry holding all builtin templates.
pub fn registry() -> Result<Registry> {
    let mut r = Registry::new();
    r.define_module("greeting", &[], greeting)?;
    r.define_module("list", &[], list)?;
    r.define_module("field", &[], field)?;
    r.define_module("page", &[], page)?;
    r.define_module("article", &["page", "greeting"], article)?;
    Ok(r)
}

/// Render builtin template `id` against `vars` with no globals.
pub fn render(id: &str, vars: Value) -> Result<String> {
    let vars = match vars {
        Value::Object(m) => m,
        v => return Err(anyhow!("vars must be an object, got: {v}")),
    };
    let mut bound = registry()?.load(id)?
        .bind(Scope::new(vars, Globals::empty()));
    bound.render()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_ids() {
        assert_eq!(registry().unwrap().ids(),
                   ["article", "field", "greeting", "list", "page"]);
    }

    #[test]
    fn t_greeting() {
        assert_eq!(render("greeting", json!({"name": "<Bob>"})).unwrap(),
                   "<p class=\"greeting\">Hello, &lt;Bob&gt;!</p>");
        assert_eq!(render("greeting", json!({"name": 1.0})).unwrap(),
                   "<p class=\"greeting\">Hello, 1!</p>");
        // lenient: undefined renders like null
        assert_eq!(render("greeting", json!({})).unwrap(),
                   "<p class=\"greeting\">Hello, null!</p>");
    }

    #[test]
    fn t_list() {
        assert_eq!(render("list", json!({"items": ["a", "<b>", 3]})).unwrap(),
                   "<ul><li>a</li><li class=\"odd\">&lt;b&gt;</li><li>3</li></ul>");
        assert_eq!(render("list", json!({"items": []})).unwrap(), "<ul></ul>");
        let e = render("list", json!({})).unwrap_err();
        assert_eq!(e.to_string(), "list: `items` must be an array, got: null");
    }

    #[test]
    fn t_field() {
        assert_eq!(
            render("field", json!({"name": "q", "value": "\"quoted\"",
                                   "checked": true, "disabled": false})).unwrap(),
            "<input type=\"text\" name=\"q\" value=\"&#34;quoted&#34;\" checked=\"checked\">");
        assert_eq!(render("field", json!({"type": "checkbox", "checked": null})).unwrap(),
                   "<input type=\"checkbox\">");
    }

    #[test]
    fn t_page() {
        assert_eq!(render("page", json!({})).unwrap(),
                   "<!DOCTYPE html>\n<html><head><title>Untitled</title></head>\
                    <body></body></html>");
        assert_eq!(render("page", json!({"title": "A & B"})).unwrap(),
                   "<!DOCTYPE html>\n<html><head><title>A &amp; B</title></head>\
                    <body></body></html>");
    }

    #[test]
    fn t_article() {
        let s = render("article", json!({
            "headline": "News <today>",
            "author": "Ann",
            "body": "It's here."
        })).unwrap();
        assert_eq!(s,
                   "<!DOCTYPE html>\n<html><head><title>News &lt;today&gt;</title></head>\
                    <body><article><h1>News &lt;today&gt;</h1>\
                    <p class=\"greeting\">Hello, Ann!</p>\
                    <div class=\"body\">It&#39;s here.</div></article></body></html>");
    }
}
