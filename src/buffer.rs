//! The output buffer compiled templates write into.

use std::{borrow::Cow, fmt};

use kstring::KString;
use serde_json::Value;

use crate::markup::{escape, Content, Markup};

/// Append-only list of output fragments. Nested buffers are spliced
/// in where they are appended, so flattening is a single
/// concatenation at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    fragments: Vec<KString>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> &[KString] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|s| s.is_empty())
    }

    fn splice(&mut self, nested: Cow<'_, Buffer>) {
        match nested {
            Cow::Owned(b) => self.fragments.extend(b.fragments),
            Cow::Borrowed(b) => self.fragments.extend_from_slice(&b.fragments),
        }
    }

    /// Output `value` without escaping.
    pub fn append<'a>(&mut self, value: impl Into<Content<'a>>) {
        match value.into() {
            Content::Buffer(b) => self.splice(b),
            Content::Markup(m) => self.fragments.push(m.into_kstring()),
            Content::Text(s) => self.fragments.push(KString::from_ref(&s)),
        }
    }

    pub fn append_all<'a, I>(&mut self, values: I)
    where I: IntoIterator,
          I::Item: Into<Content<'a>>
    {
        for v in values {
            self.append(v);
        }
    }

    /// Output `value`, escaping it unless it is already safe.
    pub fn append_escaped<'a>(&mut self, value: impl Into<Content<'a>>) {
        match value.into() {
            Content::Buffer(b) => self.splice(b),
            other => self.fragments.push(escape(other).into_kstring()),
        }
    }

    pub fn append_escaped_all<'a, I>(&mut self, values: I)
    where I: IntoIterator,
          I::Item: Into<Content<'a>>
    {
        for v in values {
            self.append_escaped(v);
        }
    }

    /// Output ` name="..."` for a valued attribute, ` name="name"` for
    /// a true flag, nothing for a false flag or absent value. `name`
    /// is never escaped, it must not come from user input.
    pub fn render_attribute<'a>(&mut self, name: &str, value: impl Into<AttrValue<'a>>) {
        match value.into() {
            AttrValue::Flag(true) => {
                self.fragments.push(KString::from_string(
                    format!(" {name}=\"{name}\"")));
            }
            AttrValue::Flag(false) | AttrValue::Absent => (),
            AttrValue::Value(v) => {
                let v = escape(v);
                self.fragments.push(KString::from_string(
                    format!(" {name}=\"{v}\"")));
            }
        }
    }

    /// The concatenation of all fragments.
    pub fn flatten(&self) -> String {
        self.fragments.concat()
    }

    /// A buffer is composed of literal template text and escaped
    /// values, hence is safe as a whole.
    pub fn to_markup(&self) -> Markup {
        Markup::from_kstring(KString::from_string(self.flatten()))
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.fragments {
            f.write_str(s)?;
        }
        Ok(())
    }
}


/// The value side of an attribute. Booleans and absent values select
/// boolean-attribute rendering, anything else is rendered escaped.
#[derive(Debug, Clone)]
pub enum AttrValue<'a> {
    Flag(bool),
    Absent,
    Value(Content<'a>),
}

impl<'a> From<bool> for AttrValue<'a> {
    fn from(b: bool) -> Self {
        AttrValue::Flag(b)
    }
}

impl<'a, T: Into<AttrValue<'a>>> From<Option<T>> for AttrValue<'a> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => AttrValue::Absent,
        }
    }
}

impl<'a> From<Content<'a>> for AttrValue<'a> {
    fn from(c: Content<'a>) -> Self {
        AttrValue::Value(c)
    }
}

/// JSON `null` counts as absent and JSON booleans as flags; they
/// never render as the strings "null", "true" or "false".
impl<'a> From<&'a Value> for AttrValue<'a> {
    fn from(v: &'a Value) -> Self {
        match v {
            Value::Null => AttrValue::Absent,
            Value::Bool(b) => AttrValue::Flag(*b),
            v => AttrValue::Value(v.into()),
        }
    }
}

macro_rules! attrvalue_via_content {
    ($($t:ty)*) => {
        $(
            impl<'a> From<$t> for AttrValue<'a> {
                fn from(v: $t) -> Self {
                    AttrValue::Value(Content::from(v))
                }
            }
        )*
    }
}
attrvalue_via_content!(String Markup Buffer i32 i64 u32 u64 usize f64);

impl<'a> From<&'a str> for AttrValue<'a> {
    fn from(v: &'a str) -> Self {
        AttrValue::Value(v.into())
    }
}

impl<'a> From<&'a String> for AttrValue<'a> {
    fn from(v: &'a String) -> Self {
        AttrValue::Value(v.into())
    }
}

impl<'a> From<&'a KString> for AttrValue<'a> {
    fn from(v: &'a KString) -> Self {
        AttrValue::Value(v.into())
    }
}

impl<'a> From<&'a Markup> for AttrValue<'a> {
    fn from(v: &'a Markup) -> Self {
        AttrValue::Value(v.into())
    }
}

impl<'a> From<&'a Buffer> for AttrValue<'a> {
    fn from(v: &'a Buffer) -> Self {
        AttrValue::Value(v.into())
    }
}


/// Render a sequence of attributes into a fresh buffer, in order. No
/// pairs give an empty buffer.
pub fn render_attributes<'a, I, N, V>(pairs: I) -> Buffer
where I: IntoIterator<Item = (N, V)>,
      N: AsRef<str>,
      V: Into<AttrValue<'a>>
{
    let mut buf = Buffer::new();
    for (name, value) in pairs {
        buf.render_attribute(name.as_ref(), value);
    }
    buf
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn t_append_and_flatten() {
        let mut b = Buffer::new();
        assert_eq!(b.flatten(), "");
        assert!(b.is_empty());
        b.append("asdf");
        assert_eq!(b.flatten(), "asdf");
        b.append("foo");
        assert_eq!(b.flatten(), "asdffoo");
        // flattening doesn't change anything
        assert_eq!(b.flatten(), "asdffoo");
        assert_eq!(b.to_string(), "asdffoo");
        assert_eq!(b.fragments().len(), 2);
    }

    #[test]
    fn t_append_does_not_escape() {
        let mut b = Buffer::new();
        b.append("<div>");
        b.append(&json!("&"));
        assert_eq!(b.flatten(), "<div>&");
    }

    #[test]
    fn t_nested_buffer_is_spliced_in_place() {
        let mut inner = Buffer::new();
        inner.append("B1");
        inner.append("B2");

        let mut b = Buffer::new();
        b.append("A");
        b.append(&inner);
        b.append("C");
        assert_eq!(b.flatten(), "AB1B2C");
        assert_eq!(b.fragments().len(), 4);

        let mut b2 = Buffer::new();
        b2.append_all(["A"]);
        b2.append(inner);
        b2.append("C");
        assert_eq!(b2, b);
    }

    #[test]
    fn t_append_escaped() {
        let mut b = Buffer::new();
        b.append_escaped("& is as dangerous as < or so");
        assert_eq!(b.flatten(), "&amp; is as dangerous as &lt; or so");
    }

    #[test]
    fn t_append_escaped_never_double_escapes() {
        let mut inner = Buffer::new();
        inner.append("<i>");
        inner.append_escaped("&");
        inner.append("</i>");

        let mut b = Buffer::new();
        b.append_escaped(&inner);
        b.append_escaped(Markup::literal("kukkuu! ALASTON & & &"));
        b.append_escaped(escape("<"));
        assert_eq!(b.flatten(), "<i>&amp;</i>kukkuu! ALASTON & & &&lt;");
    }

    #[test]
    fn t_append_escaped_all() {
        let mut b = Buffer::new();
        b.append_escaped_all(vec![Content::from("<"), Markup::literal("<").into(), 1i64.into()]);
        assert_eq!(b.flatten(), "&lt;<1");
    }

    #[test]
    fn t_render_attribute() {
        let t = |name: &str, value: AttrValue| {
            let mut b = Buffer::new();
            b.render_attribute(name, value);
            b.flatten()
        };
        assert_eq!(t("checked", true.into()), " checked=\"checked\"");
        assert_eq!(t("checked", false.into()), "");
        assert_eq!(t("checked", AttrValue::Absent), "");
        assert_eq!(t("checked", None::<&str>.into()), "");
        assert_eq!(t("checked", (&json!(null)).into()), "");
        assert_eq!(t("checked", (&json!(true)).into()), " checked=\"checked\"");
        assert_eq!(t("checked", (&json!(false)).into()), "");
        assert_eq!(t("title", "a&b".into()), " title=\"a&amp;b\"");
        assert_eq!(t("title", Some("x").into()), " title=\"x\"");
        assert_eq!(t("size", 3i64.into()), " size=\"3\"");
        assert_eq!(t("size", (&json!(3)).into()), " size=\"3\"");
        // an empty string is a value, not a false flag
        assert_eq!(t("alt", "".into()), " alt=\"\"");
        assert_eq!(t("title", Markup::literal("&amp;").into()), " title=\"&amp;\"");
    }

    #[test]
    fn t_render_attribute_is_one_fragment() {
        let mut b = Buffer::new();
        b.render_attribute("baz", "bar");
        b.render_attribute("nope", false);
        b.render_attribute("yes", true);
        assert_eq!(b.fragments().len(), 2);
    }

    #[test]
    fn t_end_to_end() {
        let mut b = Buffer::new();
        b.append("asdf");
        b.append("foo");
        b.append_escaped("& is as dangerous as < or so");
        b.append("<div");
        b.render_attribute("baz", "bar ' \" & < >");
        b.render_attribute("nope", AttrValue::Absent);
        b.render_attribute("nope", None::<&str>);
        b.render_attribute("nope", false);
        b.render_attribute("yehees", true);
        b.append(">");
        assert_eq!(
            b.flatten(),
            "asdffoo&amp; is as dangerous as &lt; or so<div baz=\"bar &#39; &#34; \
             &amp; &lt; &gt;\" yehees=\"yehees\">");
    }

    #[test]
    fn t_render_attributes() {
        let none: [(&str, bool); 0] = [];
        assert_eq!(render_attributes(none).flatten(), "");

        let b = render_attributes([
            ("id", AttrValue::from("x")),
            ("hidden", AttrValue::from(false)),
            ("checked", AttrValue::from(true)),
            ("title", AttrValue::from("<>")),
        ]);
        assert_eq!(b.flatten(), " id=\"x\" checked=\"checked\" title=\"&lt;&gt;\"");
    }

    #[test]
    fn t_render_attributes_from_json_object() {
        let v = json!({"value": "a\"b", "disabled": true, "readonly": null});
        let map = v.as_object().expect("object");
        // serde_json maps iterate sorted by key
        assert_eq!(render_attributes(map).flatten(),
                   " disabled=\"disabled\" value=\"a&#34;b\"");
    }
}
