//! Namespace-agnostic XML scraping for ONVIF SOAP responses.
//!
//! Cameras disagree on namespace prefixes (`tt:`, `tds:`, `trt:`, none), so
//! elements are matched on their local name only.

struct OpenTag<'a> {
    /// Index of the opening `<`.
    start: usize,
    /// Raw attribute text after the element name.
    attrs: &'a str,
    /// Index just past `>`; `None` for self-closing tags.
    body_start: Option<usize>,
}

fn open_tags<'a>(xml: &'a str, local: &str) -> Vec<OpenTag<'a>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(rel) = xml[pos..].find('<') {
        let start = pos + rel;
        let rest = &xml[start + 1..];
        let Some(end_rel) = rest.find('>') else {
            break;
        };
        let inner = &rest[..end_rel];
        pos = start + 1 + end_rel + 1;

        if inner.starts_with('/') || inner.starts_with('?') || inner.starts_with('!') {
            continue;
        }
        let name_end = inner
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(inner.len());
        let name = &inner[..name_end];
        let local_name = name.rsplit(':').next().unwrap_or(name);
        if local_name != local {
            continue;
        }
        let self_closing = inner.ends_with('/');
        out.push(OpenTag {
            start,
            attrs: &inner[name_end..],
            body_start: (!self_closing).then_some(pos),
        });
    }
    out
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Trimmed text content of the first element with this local name.
pub fn element_text(xml: &str, local: &str) -> Option<String> {
    open_tags(xml, local).into_iter().find_map(|tag| {
        let body_start = tag.body_start?;
        let body = &xml[body_start..];
        let end = body.find("</").unwrap_or(body.len());
        let value = body[..end].trim();
        (!value.is_empty()).then(|| unescape(value))
    })
}

/// Value of `attr` on every element with this local name, in document order.
pub fn attribute_values(xml: &str, local: &str, attr: &str) -> Vec<String> {
    open_tags(xml, local)
        .into_iter()
        .filter_map(|tag| attribute(tag.attrs, attr))
        .collect()
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=");
    for (idx, _) in attrs.match_indices(&needle) {
        let preceded_by_space = attrs[..idx]
            .chars()
            .last()
            .is_some_and(char::is_whitespace);
        if !preceded_by_space {
            continue;
        }
        let after = &attrs[idx + needle.len()..];
        let quote = after.chars().next()?;
        if quote != '"' && quote != '\'' {
            continue;
        }
        let value = &after[1..];
        let end = value.find(quote)?;
        return Some(unescape(&value[..end]));
    }
    None
}

/// `XAddr` inside a `GetCapabilities` section such as `Media` or `Device`.
pub fn capability_xaddr(xml: &str, capability: &str) -> Option<String> {
    open_tags(xml, capability)
        .into_iter()
        .find_map(|tag| element_text(&xml[tag.start..], "XAddr"))
}

/// Human-readable reason of a SOAP fault, if the body is one.
pub fn fault_reason(xml: &str) -> Option<String> {
    if open_tags(xml, "Fault").is_empty() {
        return None;
    }
    let reason = element_text(xml, "Text")
        .or_else(|| element_text(xml, "faultstring"))
        .or_else(|| element_text(xml, "Value"))
        .unwrap_or_else(|| "SOAP fault".to_string());
    Some(reason)
}
