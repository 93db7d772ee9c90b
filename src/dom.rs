use std::rc::Rc;

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

pub fn select_first(root: &NodeRef, selector: &str) -> Option<NodeRef> {
    root.select_first(selector)
        .ok()
        .map(|node| node.as_node().clone())
}

pub fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
    root.select(selector)
        .map(|nodes| nodes.map(|node| node.as_node().clone()).collect())
        .unwrap_or_default()
}

pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    Rc::ptr_eq(&a.0, &b.0)
}

/// The document a node belongs to, whether attached to the page or a detached parse.
pub fn owner_document(node: &NodeRef) -> NodeRef {
    node.inclusive_ancestors()
        .last()
        .unwrap_or_else(|| node.clone())
}

/// Parses `markup` and detaches the first element matching `selector`.
pub fn fragment(markup: &str, selector: &str) -> Option<NodeRef> {
    let doc = kuchiki::parse_html().one(markup);
    let node = select_first(&doc, selector)?;
    node.detach();
    Some(node)
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()?
        .attributes
        .borrow()
        .get(name)
        .map(|v| v.to_string())
}

pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .map(|el| el.attributes.borrow().contains(name))
        .unwrap_or(false)
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.to_string());
    }
}

pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().remove(name);
    }
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class")
        .map(|c| c.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

pub fn set_class(node: &NodeRef, class: &str, on: bool) {
    let current = attr(node, "class").unwrap_or_default();
    let mut classes: Vec<&str> = current
        .split_whitespace()
        .filter(|c| *c != class)
        .collect();
    if on {
        classes.push(class);
    }
    set_attr(node, "class", &classes.join(" "));
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            if prop.is_empty() {
                return None;
            }
            Some((prop.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Reads one property from the inline `style` attribute.
pub fn style(node: &NodeRef, prop: &str) -> Option<String> {
    let style = attr(node, "style")?;
    parse_style(&style)
        .into_iter()
        .find(|(p, _)| p == prop)
        .map(|(_, v)| v)
}

/// Sets one inline style property; an empty value removes it.
pub fn set_style(node: &NodeRef, prop: &str, value: &str) {
    let mut decls = parse_style(&attr(node, "style").unwrap_or_default());
    decls.retain(|(p, _)| p != prop);
    if !value.is_empty() {
        decls.push((prop.to_string(), value.to_string()));
    }
    if decls.is_empty() {
        remove_attr(node, "style");
        return;
    }
    let style = decls
        .iter()
        .map(|(p, v)| format!("{p}: {v}"))
        .collect::<Vec<_>>()
        .join("; ");
    set_attr(node, "style", &style);
}

pub fn set_displayed(node: &NodeRef, shown: bool) {
    set_style(node, "display", if shown { "" } else { "none" });
}

pub fn is_displayed(node: &NodeRef) -> bool {
    style(node, "display").as_deref() != Some("none")
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn option_value(option: &NodeRef) -> String {
    attr(option, "value").unwrap_or_else(|| collapse_whitespace(&option.text_contents()))
}

pub fn options(select: &NodeRef) -> Vec<NodeRef> {
    select_all(select, "option")
}

/// Index of the option a single-select reports as selected: the first one
/// carrying `selected`, else the first option.
pub fn selected_index(options: &[NodeRef]) -> Option<usize> {
    if options.is_empty() {
        return None;
    }
    Some(
        options
            .iter()
            .position(|o| has_attr(o, "selected"))
            .unwrap_or(0),
    )
}

pub fn has_option(select: &NodeRef, value: &str) -> bool {
    options(select).iter().any(|o| option_value(o) == value)
}

pub fn select_value(select: &NodeRef) -> String {
    let options = options(select);
    selected_index(&options)
        .map(|idx| option_value(&options[idx]))
        .unwrap_or_default()
}

/// Marks the option with `value` as selected. Returns false (leaving no option
/// marked) when nothing matches.
pub fn set_select_value(select: &NodeRef, value: &str) -> bool {
    let mut found = false;
    for option in options(select) {
        if !found && option_value(&option) == value {
            set_attr(&option, "selected", "");
            found = true;
        } else {
            remove_attr(&option, "selected");
        }
    }
    found
}

/// Checks `radio` and unchecks the rest of its name group under `root`.
pub fn check_radio(root: &NodeRef, radio: &NodeRef) {
    let name = attr(radio, "name").unwrap_or_default();
    for other in select_all(root, r#"input[type="radio"]"#) {
        if attr(&other, "name").unwrap_or_default() == name {
            remove_attr(&other, "checked");
        }
    }
    set_attr(radio, "checked", "");
}

pub fn serialize(node: &NodeRef) -> anyhow::Result<String> {
    use anyhow::Context as _;

    let mut out = Vec::new();
    node.serialize(&mut out).context("serialize node")?;
    String::from_utf8(out).context("serialized html not utf-8")
}
