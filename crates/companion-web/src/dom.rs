use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlTextAreaElement};

/// Largest height the composer grows to before scrolling
pub const MAX_INPUT_HEIGHT_PX: i32 = 140;

/// Get element by ID
pub fn get_element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element not found: {}", id)))
}

/// Get HTML element by ID
pub fn get_html_element_by_id(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlElement: {}", id)))
}

/// Get textarea element by ID
pub fn get_textarea_by_id(document: &Document, id: &str) -> Result<HtmlTextAreaElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlTextAreaElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlTextAreaElement: {}", id)))
}

/// Get button element by ID
pub fn get_button_by_id(document: &Document, id: &str) -> Result<HtmlButtonElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlButtonElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlButtonElement: {}", id)))
}

/// Create element with class
pub fn create_element_with_class(
    document: &Document,
    tag: &str,
    class: &str,
) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    Ok(element)
}

/// Add click listener to element
pub fn add_click_listener<F>(element: &Element, callback: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
    element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget(); // Keep the closure alive
    Ok(())
}

/// Clear element content
pub fn clear_element(element: &Element) {
    element.set_inner_html("");
}

/// Scroll element to bottom, then the page, once the next frame is laid out
pub fn scroll_to_bottom(element: &Element) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let target = element.clone();
    let callback = Closure::once_into_js(move || scroll_now(&target));
    if let Err(e) = window.request_animation_frame(callback.unchecked_ref()) {
        log::warn!("requestAnimationFrame failed: {:?}", e);
        scroll_now(element);
    }
}

fn scroll_now(element: &Element) {
    if let Ok(html_element) = element.clone().dyn_into::<HtmlElement>() {
        html_element.set_scroll_top(html_element.scroll_height());
    }
    if let Some(window) = web_sys::window() {
        let page_height = window
            .document()
            .and_then(|d| d.body())
            .map(|b| b.scroll_height())
            .unwrap_or(0);
        window.scroll_to_with_x_and_y(0.0, page_height as f64);
    }
}

/// Fit the textarea to its content, capped at `MAX_INPUT_HEIGHT_PX`
pub fn autosize_textarea(textarea: &HtmlTextAreaElement) {
    let style = textarea.style();
    let _ = style.set_property("height", "auto");
    let height = textarea.scroll_height().min(MAX_INPUT_HEIGHT_PX);
    let _ = style.set_property("height", &format!("{}px", height));
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn overflowing_list(document: &Document) -> HtmlElement {
        let list: HtmlElement = create_element_with_class(document, "div", "messages")
            .unwrap()
            .dyn_into()
            .unwrap();
        list.style().set_property("height", "40px").unwrap();
        list.style().set_property("overflow-y", "auto").unwrap();
        for i in 0..30 {
            let row = create_element_with_class(document, "div", "message").unwrap();
            row.set_text_content(Some(&format!("row {}", i)));
            list.append_child(&row).unwrap();
        }
        document.body().unwrap().append_child(&list).unwrap();
        list
    }

    #[wasm_bindgen_test]
    async fn test_scroll_to_bottom_runs_on_next_frame() {
        let list = overflowing_list(&document());

        scroll_to_bottom(&list);
        assert_eq!(list.scroll_top(), 0);

        gloo_timers::future::TimeoutFuture::new(100).await;
        assert!(list.scroll_top() > 0);
        assert!(list.scroll_top() + list.client_height() >= list.scroll_height() - 1);
    }

    #[wasm_bindgen_test]
    fn test_autosize_caps_height() {
        let document = document();
        let textarea: HtmlTextAreaElement = document
            .create_element("textarea")
            .unwrap()
            .dyn_into()
            .unwrap();
        document.body().unwrap().append_child(&textarea).unwrap();

        textarea.set_value(&"line\n".repeat(50));
        autosize_textarea(&textarea);

        assert_eq!(
            textarea.style().get_property_value("height").unwrap(),
            format!("{}px", MAX_INPUT_HEIGHT_PX)
        );
    }
}
