//! Injection of the versions dropdown into the navigation bar of a page.
//!
//! Every page is parsed into a tree, the navigation bar is located with CSS
//! selectors and the dropdown is either inserted after the last navigation
//! item or, when the page already has one or more dropdowns from earlier
//! runs, the first of them is replaced in place and the others are removed.
//! Running the injection again with the same markup yields the same page.

use crate::error::UnitError;
use crate::markup::WIDGET_MARKER;
use crate::utils;
use ego_tree::{NodeId, Tree};
use indexmap::IndexSet;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::path::Path;

/// Document type declaration written at the top of every processed page.
pub const DOCTYPE: &str = "<!DOCTYPE html>\n";

/// Attribution comment written after the document type declaration.
pub const GENERATOR_COMMENT: &str =
    "<!-- Generated by pkgdown + https://github.com/insightsengineering/r-pkgdown-multiversion -->\n";

lazy_static! {
    /// The navigation list inside the navbar region
    static ref CONTAINER_SELECTOR: Selector =
        Selector::parse("div#navbar ul.navbar-nav.me-auto").unwrap();

    /// Navigation items, at least one must exist in the container
    static ref NAV_ITEM_SELECTOR: Selector = Selector::parse("li.nav-item").unwrap();

    /// Menu of a dropdown inserted by this tool; its parent `<li>` is the widget
    static ref WIDGET_MENU_SELECTOR: Selector =
        Selector::parse(&format!("div[aria-labelledby=\"{}\"]", WIDGET_MARKER)).unwrap();
}

/// What happened to the navigation bar of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Injection {
    /// No dropdown was present, a new one was added.
    Inserted,
    /// An existing dropdown was replaced; `removed` duplicates were dropped.
    Replaced { removed: usize },
}

/// Result of injecting the dropdown into one page.
#[derive(Debug, Clone)]
pub struct InjectedPage {
    pub html: String,
    pub injection: Injection,
}

/// Inject `markup` into the navigation bar of `page` and serialize the result.
pub fn inject_versions_dropdown(page: &str, markup: &str) -> Result<InjectedPage, UnitError> {
    let mut document = Html::parse_document(page);

    let (anchor, existing) = {
        let container = locate_container(&document)?;
        (last_item(container)?, locate_existing(container))
    };

    let widget = graft_widget(&mut document.tree, markup)?;

    let injection = match existing.split_first() {
        None => {
            if let Some(mut anchor) = document.tree.get_mut(anchor) {
                anchor.insert_id_after(widget);
            }
            Injection::Inserted
        }
        Some((first, duplicates)) => {
            for duplicate in duplicates {
                if let Some(mut node) = document.tree.get_mut(*duplicate) {
                    node.detach();
                }
            }
            if let Some(mut slot) = document.tree.get_mut(*first) {
                slot.insert_id_before(widget);
                slot.detach();
            }
            Injection::Replaced {
                removed: duplicates.len(),
            }
        }
    };

    Ok(InjectedPage {
        html: serialize(&mut document),
        injection,
    })
}

/// Inject the dropdown into the page at `path` and write the page back.
pub fn process_page(path: &Path, markup: &str) -> Result<Injection, UnitError> {
    let page = utils::read_text(path)?;
    let injected = inject_versions_dropdown(&page, markup)?;
    utils::write_atomic(path, &injected.html)?;

    log::debug!("{:?} versions dropdown in {}", injected.injection, path.display());
    Ok(injected.injection)
}

fn locate_container(document: &Html) -> Result<ElementRef<'_>, UnitError> {
    let container = document.select(&CONTAINER_SELECTOR).next().ok_or_else(|| {
        UnitError::Structural(
            "no <ul class=\"navbar-nav me-auto\"> inside <div id=\"navbar\">".to_string(),
        )
    })?;

    if container.select(&NAV_ITEM_SELECTOR).next().is_none() {
        return Err(UnitError::Structural(
            "navigation bar has no <li class=\"nav-item\"> items".to_string(),
        ));
    }

    Ok(container)
}

/// The container's last element child, after which a new dropdown goes.
fn last_item(container: ElementRef<'_>) -> Result<NodeId, UnitError> {
    container
        .children()
        .filter(|node| node.value().is_element())
        .last()
        .map(|node| node.id())
        .ok_or_else(|| UnitError::Structural("navigation bar has no child elements".to_string()))
}

/// Dropdowns from earlier runs, in document order.
fn locate_existing(container: ElementRef<'_>) -> Vec<NodeId> {
    container
        .select(&WIDGET_MENU_SELECTOR)
        .filter_map(|menu| menu.parent())
        .filter_map(ElementRef::wrap)
        .filter(|item| item.value().name() == "li")
        .map(|item| item.id())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Parse `markup` on its own and copy its first element into `tree` as an
/// orphan subtree. Nodes cannot move between trees, so each page gets its own
/// copy.
fn graft_widget(tree: &mut Tree<Node>, markup: &str) -> Result<NodeId, UnitError> {
    let fragment = Html::parse_fragment(markup);
    let widget = fragment
        .root_element()
        .children()
        .find(|node| node.value().is_element())
        .ok_or_else(|| {
            UnitError::Parse("versions dropdown markup contains no element".to_string())
        })?;

    let root = tree.orphan(widget.value().clone()).id();
    let mut pending = vec![(widget, root)];

    while let Some((source, target)) = pending.pop() {
        for child in source.children() {
            if let Some(mut parent) = tree.get_mut(target) {
                let id = parent.append(child.value().clone()).id();
                pending.push((child, id));
            }
        }
    }

    Ok(root)
}

/// Render the page. Only the `<html>` element is serialized, so a document
/// type or attribution comment left by an earlier run is never duplicated.
fn serialize(document: &mut Html) -> String {
    restore_leading_newlines(&mut document.tree);

    let mut output = String::from(DOCTYPE);
    output.push_str(GENERATOR_COMMENT);
    output.push_str(&document.root_element().html());
    output
}

/// The parser drops a newline directly after the start tag of these elements.
const NEWLINE_ELEMENTS: [&str; 3] = ["pre", "textarea", "listing"];

/// Double the leading newline of text that opens a `<pre>`, `<textarea>` or
/// `<listing>`, so the content reads the same once the page is parsed again.
fn restore_leading_newlines(tree: &mut Tree<Node>) {
    let texts: Vec<NodeId> = tree
        .root()
        .descendants()
        .filter(|node| {
            node.value()
                .as_element()
                .map(|element| NEWLINE_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        })
        .filter_map(|node| node.first_child())
        .filter(|child| {
            child
                .value()
                .as_text()
                .map(|text| text.starts_with('\n'))
                .unwrap_or(false)
        })
        .map(|child| child.id())
        .collect();

    for id in texts {
        if let Some(mut node) = tree.get_mut(id) {
            if let Node::Text(text) = node.value() {
                let rest = std::mem::take(&mut text.text);
                text.text.push_slice("\n");
                text.text.push_tendril(&rest);
            }
        }
    }
}
