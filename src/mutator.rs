/// Cosmetic anchor rewriting: new-tab hints on existing and inserted links
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, MutationRecord};

/// Not required for correctness (the capture-phase listener hijacks the
/// click either way), but keeps hover cues and middle-click behavior
/// consistent with what actually happens.
pub fn install(document: &Document) -> Result<(), JsValue> {
    retarget_existing(document)?;
    observe_insertions(document)
}

/// An explicit non-self target is respected; everything else gets `_blank`.
fn wants_blank_target(current: Option<&str>) -> bool {
    match current {
        Some(target) => target.is_empty() || target == "_self",
        None => true,
    }
}

fn retarget_anchor(anchor: &Element) {
    let current = anchor.get_attribute("target");
    if wants_blank_target(current.as_deref()) {
        let _ = anchor.set_attribute("target", "_blank");
    }
}

fn retarget_existing(document: &Document) -> Result<(), JsValue> {
    let anchors = document.query_selector_all("a")?;
    for i in 0..anchors.length() {
        if let Some(anchor) = anchors.item(i).and_then(|node| node.dyn_into::<Element>().ok()) {
            retarget_anchor(&anchor);
        }
    }
    Ok(())
}

fn observe_insertions(document: &Document) -> Result<(), JsValue> {
    let body = match document.body() {
        Some(body) => body,
        None => return Ok(()),
    };

    let callback = Closure::wrap(Box::new(move |records: js_sys::Array, _observer: JsValue| {
        for record in records.iter() {
            let record: MutationRecord = record.unchecked_into();
            let added = record.added_nodes();
            for i in 0..added.length() {
                let element = match added.item(i).and_then(|node| node.dyn_into::<Element>().ok())
                {
                    Some(element) => element,
                    None => continue,
                };
                if element.tag_name() == "A" {
                    retarget_anchor(&element);
                } else if let Ok(nested) = element.query_selector_all("a") {
                    for j in 0..nested.length() {
                        if let Some(anchor) =
                            nested.item(j).and_then(|node| node.dyn_into::<Element>().ok())
                        {
                            retarget_anchor(&anchor);
                        }
                    }
                }
            }
        }
    }) as Box<dyn FnMut(js_sys::Array, JsValue)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    callback.forget();

    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&body, &init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_blank_target() {
        assert!(wants_blank_target(None));
        assert!(wants_blank_target(Some("")));
        assert!(wants_blank_target(Some("_self")));
        assert!(!wants_blank_target(Some("_blank")));
        assert!(!wants_blank_target(Some("sidebar")));
    }
}
