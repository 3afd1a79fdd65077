//! Script payloads pushed into the panel page.
//!
//! Everything here is a pure string builder, so identical input yields
//! byte-identical payloads and nothing needs a live renderer to test.

use crate::models::StructureOption;

/// `<option>` fragment for the structure picker, in enumeration order.
/// Empty string when there is nothing to pick.
pub fn options_fragment(options: &[StructureOption]) -> String {
    options
        .iter()
        .map(|option| {
            format!(
                r#"<option value="{}">{}</option>"#,
                html_escape(&option.value),
                html_escape(&option.label)
            )
        })
        .collect()
}

/// Value assigned to the `disabled` property of `.submit` controls.
pub fn disabled_flag(options: &[StructureOption]) -> &'static str {
    if options.is_empty() { "true" } else { "false" }
}

/// Payload replacing the `#model` picker contents and toggling submit
/// controls. The fragment goes in as a JSON string literal so the page
/// receives it unmangled.
pub fn model_update_script(options: &[StructureOption]) -> String {
    let fragment = serde_json::to_string(&options_fragment(options))
        .expect("an options fragment is a plain string and always serializes");
    format!(
        r#"document.getElementById("model").innerHTML = {fragment};
var buttons = document.getElementsByClassName("submit");
for (var i = 0; i != buttons.length; ++i) {{
    buttons[i].disabled = {disabled};
}}
"#,
        disabled = disabled_flag(options)
    )
}

/// Payload handing a record-oriented results serialization to the
/// page-defined `load_database` hook. `records_json` is embedded
/// verbatim.
pub fn load_database_script(records_json: &str) -> String {
    format!("tm_info={records_json};\nload_database(tm_info);\n")
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
