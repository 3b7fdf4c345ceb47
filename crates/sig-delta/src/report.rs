//! Text and JSON renderers for delta trees.

use crate::concept::SigDelta;
use crate::error::{DeltaError, DeltaResult};
use crate::model::{ApiDelta, ElementDelta};

const INDENT: &str = "  ";

/// Render a delta tree as an indented, human-readable listing.
///
/// Every line starts with a `+` (added), `-` (removed) or `~` (changed)
/// marker after its indentation.
pub fn render_text(api: &ApiDelta) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "API delta {} ({}) -> {} ({})\n",
        api.from_label, api.from_digest, api.to_label, api.to_digest
    ));

    if api.is_empty() {
        out.push_str("No API changes.\n");
        return out;
    }

    for package in &api.package_deltas {
        element_line(&mut out, 0, package, "package", &package.name);
        leaf_lines(&mut out, 1, &package.changes);

        for class in &package.class_deltas {
            let label = class.delta.latest().kind.to_string();
            element_line(&mut out, 1, class, &label, &class.name);
            leaf_lines(&mut out, 2, &class.changes);

            for field in &class.field_deltas {
                element_line(&mut out, 2, field, "field", &field.name);
                leaf_lines(&mut out, 3, &field.changes);
            }
            for ctor in &class.constructor_deltas {
                let name = format!("{}{}", class.name, ctor.signature);
                element_line(&mut out, 2, ctor, "constructor", &name);
                leaf_lines(&mut out, 3, &ctor.changes);
            }
            for method in &class.method_deltas {
                element_line(&mut out, 2, method, "method", &method.signature);
                leaf_lines(&mut out, 3, &method.changes);
            }
        }
    }
    out
}

/// Render a delta tree as pretty-printed JSON.
pub fn render_json(api: &ApiDelta) -> DeltaResult<String> {
    serde_json::to_string_pretty(api).map_err(|e| DeltaError::Serialization(e.to_string()))
}

fn element_line(out: &mut String, depth: usize, element: &impl ElementDelta, label: &str, key: &str) {
    out.push_str(&format!(
        "{}{} {label} {key}\n",
        INDENT.repeat(depth),
        element.kind().symbol()
    ));
}

fn leaf_lines(out: &mut String, depth: usize, changes: &[SigDelta]) {
    for change in changes {
        out.push_str(&format!(
            "{}{} {}\n",
            INDENT.repeat(depth),
            change.kind().symbol(),
            change.describe()
        ));
    }
}
