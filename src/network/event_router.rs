use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Push event name such as `prompt_translate_update`.
pub type EventName = String;

/// Handler for one push event. Receives the event's `detail` payload.
pub type EventHandler = Rc<RefCell<dyn FnMut(serde_json::Value)>>;

/// Routes push-channel events to the handlers registered for their name.
#[derive(Default)]
pub struct EventRouter {
    handlers: HashMap<EventName, Vec<EventHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, event: &str, handler: EventHandler) {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Remove one handler (by pointer identity). Returns whether it was found.
    pub fn unsubscribe_handler(&mut self, event: &str, handler_to_remove: &EventHandler) -> bool {
        let Some(handlers) = self.handlers.get_mut(event) else {
            return false;
        };
        let Some(pos) = handlers.iter().position(|h| Rc::ptr_eq(h, handler_to_remove)) else {
            log::warn!("handler not found for event {} during unsubscribe", event);
            return false;
        };
        handlers.remove(pos);
        if handlers.is_empty() {
            debug_log!("last handler removed for event {}", event);
            self.handlers.remove(event);
        }
        true
    }

    pub fn has_subscription(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Handlers registered for `event`, cloned so the caller can release its
    /// borrow of the router before running them. A handler may then
    /// subscribe or unsubscribe without a `BorrowMutError`.
    pub fn handlers_for(&self, event: &str) -> Vec<EventHandler> {
        self.handlers
            .get(event)
            .map(|vec| vec.to_vec())
            .unwrap_or_default()
    }

    /// Route `payload` to every handler of `event`. Returns how many ran.
    ///
    /// Takes the shared router so no borrow is held while handlers execute.
    pub fn route(router: &Rc<RefCell<EventRouter>>, event: &str, payload: serde_json::Value) -> usize {
        let handlers = router.borrow().handlers_for(event);
        if handlers.is_empty() {
            debug_log!("no handlers registered for event: {}", event);
            return 0;
        }
        for handler in &handlers {
            (handler.borrow_mut())(payload.clone());
        }
        handlers.len()
    }
}
