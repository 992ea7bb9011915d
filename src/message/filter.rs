use super::kind::MessageKind;
use crate::error::FilterError;
use crate::schema::parsing::element_name;
use tracing::{debug, warn};
use xot::{Node, Xot};

/// Root tag names (compared case-insensitively) that only wrap the real messages.
const GENERIC_WRAPPERS: [&str; 4] = ["sourcemessage", "targetmessage", "message", "root"];

/// Derives the sub-document of a combined structure that belongs to `kind`.
///
/// Direct children of the root whose tag names match the kind's patterns are kept
/// under the original root (tag and attributes preserved). A single match under a
/// generic wrapper root becomes the new root instead. When nothing matches, or the
/// document cannot be processed, the input is returned unchanged.
pub fn filter_xml_by_message_type(xml: &str, kind: MessageKind) -> String {
    match try_filter(xml, kind) {
        Ok(Some(filtered)) => filtered,
        Ok(None) => {
            debug!(%kind, "no root child matched message kind, keeping original document");
            xml.to_string()
        }
        Err(e) => {
            warn!(%kind, error = %e, "message filter failed, keeping original document");
            xml.to_string()
        }
    }
}

/// The fallible core of [`filter_xml_by_message_type`]. `Ok(None)` means no child
/// matched.
pub fn try_filter(xml: &str, kind: MessageKind) -> Result<Option<String>, FilterError> {
    let mut xot = Xot::new();
    let doc = xot
        .parse(xml)
        .map_err(|e| FilterError::ParseError(e.to_string()))?;
    let root = xot
        .document_element(doc)
        .map_err(|e| FilterError::MissingRoot(e.to_string()))?;
    let root_name = element_name(&xot, root)
        .ok_or_else(|| FilterError::MissingRoot("document element has no name".to_string()))?;

    let (matched, rest): (Vec<Node>, Vec<Node>) = xot
        .children(root)
        .collect::<Vec<_>>()
        .into_iter()
        .partition(|&child| element_name(&xot, child).is_some_and(|name| kind.matches(&name)));

    if matched.is_empty() {
        return Ok(None);
    }
    debug!(%kind, root = %root_name, matched = matched.len(), "filtered message children");

    if let [only] = matched.as_slice() {
        if is_generic_wrapper(&root_name) {
            return xot
                .to_string(*only)
                .map(Some)
                .map_err(|e| FilterError::TreeError(e.to_string()));
        }
    }

    for node in rest {
        xot.detach(node)
            .map_err(|e| FilterError::TreeError(e.to_string()))?;
    }
    xot.to_string(doc)
        .map(Some)
        .map_err(|e| FilterError::TreeError(e.to_string()))
}

fn is_generic_wrapper(root_name: &str) -> bool {
    let lowered = root_name.to_lowercase();
    GENERIC_WRAPPERS.contains(&lowered.as_str())
}
