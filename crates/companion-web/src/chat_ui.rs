use std::cell::RefCell;
use std::rc::Rc;

use companion_types::{ChatReply, ChatRequest};
use gloo_net::http::{Request, Response};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AbortController, AbortSignal, Document, Element, HtmlButtonElement, HtmlElement,
    HtmlTextAreaElement,
};

use crate::dom;
use crate::history::{HistoryStore, LocalStorage};
use crate::session::{AbortHandle, Bubble, ChatView, RelayOutcome, Screen, UiSession};

const CHAT_ENDPOINT: &str = "/api/chat";

type Session = UiSession<LocalStorage, DomView, AbortController>;

impl AbortHandle for AbortController {
    fn abort(&self) {
        AbortController::abort(self);
    }
}

/// The page elements the session renders into
pub struct DomView {
    document: Document,
    onboarding: HtmlElement,
    chat: HtmlElement,
    messages: Element,
    input: HtmlTextAreaElement,
    send_btn: HtmlButtonElement,
    overlay: HtmlElement,
}

impl DomView {
    fn new(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            onboarding: dom::get_html_element_by_id(document, "screen-onboarding")?,
            chat: dom::get_html_element_by_id(document, "screen-chat")?,
            messages: dom::get_element_by_id(document, "messages")?,
            input: dom::get_textarea_by_id(document, "input")?,
            send_btn: dom::get_button_by_id(document, "sendBtn")?,
            overlay: dom::get_html_element_by_id(document, "loadingOverlay")?,
        })
    }

    fn render_message(&self, bubble: Bubble, text: &str) -> Result<(), JsValue> {
        let wrap = dom::create_element_with_class(
            &self.document,
            "div",
            &format!("message {}", bubble.class_name()),
        )?;
        let inner = dom::create_element_with_class(&self.document, "div", "bubble")?;
        inner.set_text_content(Some(text));
        wrap.append_child(&inner)?;
        self.messages.append_child(&wrap)?;
        dom::scroll_to_bottom(&self.messages);
        Ok(())
    }
}

impl ChatView for DomView {
    fn show_screen(&mut self, screen: Screen) {
        self.onboarding.set_hidden(screen != Screen::Onboarding);
        self.chat.set_hidden(screen != Screen::Chat);
    }

    fn clear_messages(&mut self) {
        dom::clear_element(&self.messages);
    }

    fn add_message(&mut self, bubble: Bubble, text: &str) {
        if let Err(e) = self.render_message(bubble, text) {
            log::error!("Failed to render message: {:?}", e);
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.overlay.set_hidden(!loading);
        self.send_btn.set_disabled(loading);
        self.input.set_disabled(loading);
        if !loading {
            let _ = self.input.focus();
        }
    }

    fn clear_input(&mut self) {
        self.input.set_value("");
        dom::autosize_textarea(&self.input);
    }
}

pub struct ChatApp {
    document: Document,
    session: Rc<RefCell<Session>>,
}

impl ChatApp {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;

        let view = DomView::new(&document)?;
        dom::autosize_textarea(&view.input);
        let session = UiSession::start(HistoryStore::new(LocalStorage::open()), view);
        log::info!("Loaded {} stored turns", session.history().len());

        Ok(Self {
            document,
            session: Rc::new(RefCell::new(session)),
        })
    }

    pub fn start(self) -> Result<(), JsValue> {
        self.setup_message_input()?;
        self.setup_composer()?;
        self.setup_navigation()?;
        self.setup_stop_controls()?;
        self.setup_resize()?;
        Ok(())
    }

    fn setup_message_input(&self) -> Result<(), JsValue> {
        let input = dom::get_textarea_by_id(&self.document, "input")?;

        // Auto-resize textarea
        let textarea = input.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            dom::autosize_textarea(&textarea);
        }) as Box<dyn FnMut(_)>);
        input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();

        // Enter sends, Shift+Enter keeps the newline
        let session = self.session.clone();
        let textarea = input.clone();
        let closure = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
            if event.key() == "Enter" && !event.shift_key() {
                event.prevent_default();
                submit_message(&session, &textarea);
            }
        }) as Box<dyn FnMut(_)>);
        input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();

        Ok(())
    }

    fn setup_composer(&self) -> Result<(), JsValue> {
        let composer = dom::get_element_by_id(&self.document, "composer")?;
        let input = dom::get_textarea_by_id(&self.document, "input")?;
        let session = self.session.clone();

        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
            submit_message(&session, &input);
        }) as Box<dyn FnMut(_)>);
        composer.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
        closure.forget();

        Ok(())
    }

    fn setup_navigation(&self) -> Result<(), JsValue> {
        let create = dom::get_element_by_id(&self.document, "btn-create")?;
        let input = dom::get_textarea_by_id(&self.document, "input")?;
        let session = self.session.clone();
        dom::add_click_listener(&create, move || {
            session.borrow_mut().create_chat();
            let input = input.clone();
            gloo_timers::callback::Timeout::new(100, move || {
                let _ = input.focus();
            })
            .forget();
        })?;

        let back = dom::get_element_by_id(&self.document, "btn-back")?;
        dom::add_click_listener(&back, || {
            if let Err(e) = go_back() {
                log::warn!("Back navigation failed: {:?}", e);
            }
        })?;

        let exit = dom::get_element_by_id(&self.document, "btn-exit")?;
        let session = self.session.clone();
        dom::add_click_listener(&exit, move || {
            session.borrow_mut().exit();
        })?;

        Ok(())
    }

    fn setup_stop_controls(&self) -> Result<(), JsValue> {
        for id in ["overlayClose", "btnStop"] {
            let button = dom::get_element_by_id(&self.document, id)?;
            let session = self.session.clone();
            dom::add_click_listener(&button, move || {
                session.borrow_mut().stop();
            })?;
        }
        Ok(())
    }

    fn setup_resize(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let messages = dom::get_element_by_id(&self.document, "messages")?;

        let closure = Closure::wrap(Box::new(move || {
            dom::scroll_to_bottom(&messages);
        }) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();

        Ok(())
    }
}

/// Hand the composer text to the session and, if accepted, run the relay call
fn submit_message(session: &Rc<RefCell<Session>>, input: &HtmlTextAreaElement) {
    let controller = match AbortController::new() {
        Ok(controller) => controller,
        Err(e) => {
            log::error!("Failed to create AbortController: {:?}", e);
            return;
        }
    };
    let signal = controller.signal();

    let pending = match session.borrow_mut().submit(&input.value(), controller) {
        Some(pending) => pending,
        None => return,
    };

    let session = session.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = send_to_relay(&pending.body, &signal).await;
        if !session.borrow_mut().complete(pending.id, outcome) {
            log::debug!("Ignoring completion of a stopped request");
        }
    });
}

async fn send_to_relay(body: &ChatRequest, signal: &AbortSignal) -> RelayOutcome {
    let response = match post_chat(body, signal).await {
        Ok(response) => response,
        Err(e) => return outcome_of_error(e),
    };

    if !response.ok() {
        let details = response.text().await.unwrap_or_default();
        return RelayOutcome::from_status(response.status(), &details);
    }

    match response.json::<ChatReply>().await {
        Ok(reply) => RelayOutcome::Reply(reply.text),
        Err(e) => outcome_of_error(e),
    }
}

async fn post_chat(body: &ChatRequest, signal: &AbortSignal) -> Result<Response, gloo_net::Error> {
    Request::post(CHAT_ENDPOINT)
        .abort_signal(Some(signal))
        .json(body)?
        .send()
        .await
}

fn outcome_of_error(err: gloo_net::Error) -> RelayOutcome {
    match err {
        gloo_net::Error::JsError(e) => RelayOutcome::from_js_error(&e.name, &e.message),
        other => RelayOutcome::Failed(other.to_string()),
    }
}

fn go_back() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let history = window.history()?;
    if history.length()? > 1 {
        history.back()?;
    }
    Ok(())
}
