//! Markup of the versions dropdown widget.

use crate::ordering::OrderedReferences;

/// Attribute value reserved for the widget. Pages are scanned for it to find
/// widgets inserted by previous runs.
pub const WIDGET_MARKER: &str = "dropdown-versions";

/// Label of the dropdown toggle.
pub const WIDGET_LABEL: &str = "Versions";

/// Render the dropdown `<li>` listing every reference, linking each one to
/// `base_url` followed by the reference name.
pub fn render_versions_dropdown(references: &OrderedReferences, base_url: &str) -> String {
    let mut html = String::from("<li class=\"nav-item dropdown\">\n");

    html.push_str(&format!(
        "<a href=\"#\" class=\"nav-link dropdown-toggle\" data-bs-toggle=\"dropdown\" \
         role=\"button\" aria-expanded=\"false\" aria-haspopup=\"true\" id=\"{}\">{}</a>\n",
        WIDGET_MARKER, WIDGET_LABEL
    ));
    html.push_str(&format!(
        "<div class=\"dropdown-menu\" aria-labelledby=\"{}\">\n",
        WIDGET_MARKER
    ));

    for reference in references.iter() {
        let href = format!("{}{}", base_url, reference);
        html.push_str(&format!(
            "<a class=\"dropdown-item\" data-toggle=\"tooltip\" title=\"\" href=\"{}\">{}</a>\n",
            html_escape::encode_double_quoted_attribute(&href),
            html_escape::encode_text(reference)
        ));
    }

    html.push_str("</div></li>");
    html
}
