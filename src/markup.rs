//! Safe markup and the values that can be written into a `Buffer`.

use std::{borrow::Cow, fmt};

use itertools::Itertools;
use kstring::KString;
use serde_json::Value;

use crate::buffer::Buffer;

/// A string that is already valid HTML and must never be escaped
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Markup(KString);

impl Markup {
    /// Trust `s` as HTML as is. Only use with strings that don't
    /// come from untrusted input.
    pub fn literal(s: impl AsRef<str>) -> Self {
        Markup(KString::from_ref(s.as_ref()))
    }

    pub(crate) fn from_kstring(s: KString) -> Self {
        Markup(s)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_kstring(self) -> KString {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Anything a template can output. Only `Markup` and `Buffer` are
/// trusted; everything converted from plain data (including all JSON
/// values from a context) ends up as `Text` and gets escaped.
#[derive(Debug, Clone)]
pub enum Content<'a> {
    Text(Cow<'a, str>),
    Markup(Markup),
    Buffer(Cow<'a, Buffer>),
}

impl<'a> Content<'a> {
    pub fn is_safe(&self) -> bool {
        match self {
            Content::Text(_) => false,
            Content::Markup(_) | Content::Buffer(_) => true,
        }
    }
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(s: &'a str) -> Self {
        Content::Text(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for Content<'a> {
    fn from(s: &'a String) -> Self {
        Content::Text(Cow::Borrowed(s.as_str()))
    }
}

impl<'a> From<String> for Content<'a> {
    fn from(s: String) -> Self {
        Content::Text(Cow::Owned(s))
    }
}

impl<'a> From<&'a KString> for Content<'a> {
    fn from(s: &'a KString) -> Self {
        Content::Text(Cow::Borrowed(s.as_str()))
    }
}

impl<'a> From<Markup> for Content<'a> {
    fn from(m: Markup) -> Self {
        Content::Markup(m)
    }
}

impl<'a> From<&'a Markup> for Content<'a> {
    fn from(m: &'a Markup) -> Self {
        Content::Markup(m.clone())
    }
}

impl<'a> From<Buffer> for Content<'a> {
    fn from(b: Buffer) -> Self {
        Content::Buffer(Cow::Owned(b))
    }
}

impl<'a> From<&'a Buffer> for Content<'a> {
    fn from(b: &'a Buffer) -> Self {
        Content::Buffer(Cow::Borrowed(b))
    }
}

impl<'a> From<&'a Value> for Content<'a> {
    fn from(v: &'a Value) -> Self {
        Content::Text(value_to_str(v))
    }
}

impl<'a> From<Value> for Content<'a> {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Content::Text(Cow::Owned(s)),
            v => Content::Text(Cow::Owned(value_to_str(&v).into_owned())),
        }
    }
}

macro_rules! content_from_display {
    ($($t:ty)*) => {
        $(
            impl<'a> From<$t> for Content<'a> {
                fn from(v: $t) -> Self {
                    Content::Text(Cow::Owned(v.to_string()))
                }
            }
        )*
    }
}
content_from_display!(bool char i32 i64 u32 u64 usize f64);


/// The string form of a JSON value as used for output: strings
/// verbatim, `null` as "null", arrays comma-joined, objects as
/// compact JSON.
pub fn value_to_str(v: &Value) -> Cow<'_, str> {
    match v {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => Cow::Owned(float_to_str(f)),
            _ => Cow::Owned(n.to_string()),
        },
        Value::Array(vs) => Cow::Owned(vs.iter().map(value_to_str).join(",")),
        Value::Object(_) => Cow::Owned(v.to_string()),
    }
}

/// Floats print like JavaScript numbers: no fractional part when
/// integral, exponent form from 1e21 up and below 1e-6.
fn float_to_str(f: f64) -> String {
    if f == 0.0 {
        return "0".into();
    }
    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let s = format!("{f:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        }
    } else {
        f.to_string()
    }
}


fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\'' => Some("&#39;"),
        '"' => Some("&#34;"),
        _ => None
    }
}

/// Replace the five HTML-reserved characters by entities, leave
/// everything else alone.
pub fn escape_str(s: &str) -> Cow<'_, str> {
    let first = match s.find(|c| entity(c).is_some()) {
        Some(i) => i,
        None => return Cow::Borrowed(s),
    };
    let mut out = String::with_capacity(s.len() + 16);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match entity(c) {
            Some(e) => out.push_str(e),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Turn any content into markup: safe content passes through as is,
/// text is escaped.
pub fn escape<'a>(value: impl Into<Content<'a>>) -> Markup {
    match value.into() {
        Content::Markup(m) => m,
        Content::Buffer(b) => b.to_markup(),
        Content::Text(s) => Markup(KString::from_ref(&escape_str(&s))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn t_escape_str() {
        assert_eq!(escape_str(""), "");
        assert_eq!(escape_str("plain"), "plain");
        assert!(matches!(escape_str("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_str("a&b"), "a&amp;b");
        assert_eq!(escape_str("<a href='x'>\"</a>"),
                   "&lt;a href=&#39;x&#39;&gt;&#34;&lt;/a&gt;");
        assert_eq!(escape_str("äöü & €"), "äöü &amp; €");
    }

    #[test]
    fn t_escape_short_circuits_on_markup() {
        let m = Markup::literal("<b>bold</b>");
        assert_eq!(escape(&m), m);
        assert_eq!(escape(m.clone()).as_str(), "<b>bold</b>");
        assert_eq!(escape("<b>").as_str(), "&lt;b&gt;");
    }

    #[test]
    fn t_escape_json_values() {
        assert_eq!(escape(&json!("<x>")).as_str(), "&lt;x&gt;");
        assert_eq!(escape(&json!(null)).as_str(), "null");
        assert_eq!(escape(&json!(12.5)).as_str(), "12.5");
        assert_eq!(escape(&json!(1.0)).as_str(), "1");
        assert_eq!(escape(&json!([1, "<", true])).as_str(), "1,&lt;,true");
        assert_eq!(escape(&json!({"a": "&"})).as_str(), "{&#34;a&#34;:&#34;&amp;&#34;}");
        // JSON strings never become trusted markup
        assert!(!Content::from(&json!("<b>")).is_safe());
    }

    #[test]
    fn t_escape_numbers_and_bools() {
        assert_eq!(escape(42i64).as_str(), "42");
        assert_eq!(escape(true).as_str(), "true");
        assert_eq!(escape('<').as_str(), "&lt;");
    }

    #[test]
    fn t_float_to_str() {
        assert_eq!(value_to_str(&json!(1.0)), "1");
        assert_eq!(value_to_str(&json!(-2.0)), "-2");
        assert_eq!(value_to_str(&json!(-0.0)), "0");
        assert_eq!(value_to_str(&json!(0.1)), "0.1");
        assert_eq!(value_to_str(&json!(1e21)), "1e+21");
        assert_eq!(value_to_str(&json!(1.5e-7)), "1.5e-7");
        assert_eq!(value_to_str(&json!(123456789.25)), "123456789.25");
        assert_eq!(value_to_str(&json!(42)), "42");
        assert_eq!(value_to_str(&json!(-7)), "-7");
        assert_eq!(value_to_str(&json!([1.0, 2.5])), "1,2.5");
    }

    fn decode_with_html_tokenizer(escaped: &str) -> String {
        use html5gum::{Token, Tokenizer};
        let mut out = Vec::new();
        for token in Tokenizer::new(escaped).infallible() {
            match token {
                Token::String(s) => out.extend_from_slice(&s),
                Token::Error(_) => (),
                t => panic!("unexpected token {t:?} for {escaped:?}"),
            }
        }
        String::from_utf8(out).expect("tokenizer output is UTF-8")
    }

    #[test]
    fn t_decode_with_html_tokenizer() {
        let s = "bar ' \" & < >";
        assert_eq!(decode_with_html_tokenizer(escape(s).as_str()), s);
    }

    proptest! {
        #[test]
        fn p_escape_idempotent_on_literal(s in ".*") {
            let once = escape(Markup::literal(&s));
            let twice = escape(escape(Markup::literal(&s)));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn p_escaped_has_no_reserved_chars(s in ".*") {
            let e = escape(s.as_str());
            prop_assert!(!e.as_str().contains(['<', '>', '\'', '"']));
            // every remaining '&' starts one of our entities
            for (i, _) in e.as_str().match_indices('&') {
                let rest = &e.as_str()[i..];
                prop_assert!(["&amp;", "&lt;", "&gt;", "&#39;", "&#34;"]
                             .iter().any(|ent| rest.starts_with(ent)));
            }
        }

        #[test]
        fn p_only_reserved_chars_change(s in "[^&<>'\"]*") {
            let e = escape(s.as_str());
            prop_assert_eq!(e.as_str(), s.as_str());
        }

        #[test]
        fn p_round_trips_through_html_tokenizer(s in "[a-zA-Z0-9 &<>'\"]*") {
            prop_assert_eq!(decode_with_html_tokenizer(escape(s.as_str()).as_str()), s);
        }
    }
}
