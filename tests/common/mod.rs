//! Shared fixtures: a scripted backend and a status sink that records tips.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

use prompt_widget_frontend::coordinator::OperationCoordinator;
use prompt_widget_frontend::errors::WidgetError;
use prompt_widget_frontend::messages::{ButtonState, StatusKind};
use prompt_widget_frontend::models::{Preset, WidgetConfig, WidgetKey};
use prompt_widget_frontend::network::messages::{ExpandRequest, TranslateRequest, TranslateResult};
use prompt_widget_frontend::network::PromptBackend;
use prompt_widget_frontend::registry::{HostGraph, MemoryBuffer};
use prompt_widget_frontend::state::WidgetServices;
use prompt_widget_frontend::toast::StatusSink;

/// Backend answering from queued replies. A gate, when armed, holds the next
/// translate/expand call open until the returned sender fires.
#[derive(Default)]
pub struct ScriptedBackend {
    translate_replies: RefCell<VecDeque<Result<TranslateResult, WidgetError>>>,
    expand_replies: RefCell<VecDeque<Result<String, WidgetError>>>,
    presets: RefCell<Vec<Preset>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    pub translate_requests: RefCell<Vec<TranslateRequest>>,
    pub expand_requests: RefCell<Vec<ExpandRequest>>,
    pub preset_loads: Cell<usize>,
    pub debug_calls: RefCell<Vec<bool>>,
}

impl ScriptedBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn reply_translation(&self, text: &str) {
        self.translate_replies.borrow_mut().push_back(Ok(TranslateResult {
            text: text.to_string(),
            from_cache: false,
        }));
    }

    pub fn fail_translation(&self, err: WidgetError) {
        self.translate_replies.borrow_mut().push_back(Err(err));
    }

    pub fn reply_expansion(&self, text: &str) {
        self.expand_replies.borrow_mut().push_back(Ok(text.to_string()));
    }

    pub fn set_presets(&self, presets: Vec<Preset>) {
        *self.presets.borrow_mut() = presets;
    }

    /// Hold the next backend call until the sender is fired (or dropped).
    pub fn arm_gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_requests.borrow().len()
    }

    fn gated<T: 'static>(&self, reply: T) -> LocalBoxFuture<'_, T> {
        let gate = self.gate.borrow_mut().take();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            reply
        }
        .boxed_local()
    }
}

impl PromptBackend for ScriptedBackend {
    fn translate(&self, req: TranslateRequest) -> LocalBoxFuture<'_, Result<TranslateResult, WidgetError>> {
        self.translate_requests.borrow_mut().push(req);
        let reply = self
            .translate_replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(WidgetError::Backend("no scripted translation".into())));
        self.gated(reply)
    }

    fn expand(&self, req: ExpandRequest) -> LocalBoxFuture<'_, Result<String, WidgetError>> {
        self.expand_requests.borrow_mut().push(req);
        let reply = self
            .expand_replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(WidgetError::Backend("no scripted expansion".into())));
        self.gated(reply)
    }

    fn load_presets(&self) -> LocalBoxFuture<'_, Result<Vec<Preset>, WidgetError>> {
        self.preset_loads.set(self.preset_loads.get() + 1);
        let presets = self.presets.borrow().clone();
        async move { Ok(presets) }.boxed_local()
    }

    fn save_presets(&self, presets: Vec<Preset>) -> LocalBoxFuture<'_, Result<(), WidgetError>> {
        *self.presets.borrow_mut() = presets;
        async { Ok(()) }.boxed_local()
    }

    fn load_config(&self) -> LocalBoxFuture<'_, Result<WidgetConfig, WidgetError>> {
        async { Ok(WidgetConfig::default()) }.boxed_local()
    }

    fn save_config(&self, _config: WidgetConfig) -> LocalBoxFuture<'_, Result<(), WidgetError>> {
        async { Ok(()) }.boxed_local()
    }

    fn set_debug(&self, debug: bool) -> LocalBoxFuture<'_, Result<(), WidgetError>> {
        self.debug_calls.borrow_mut().push(debug);
        async { Ok(()) }.boxed_local()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tip {
    pub key: Option<WidgetKey>,
    pub kind: StatusKind,
    pub message: String,
}

#[derive(Default)]
pub struct RecordingStatus {
    pub tips: RefCell<Vec<Tip>>,
    pub buttons: RefCell<Vec<(WidgetKey, ButtonState)>>,
}

impl RecordingStatus {
    pub fn last(&self) -> Option<Tip> {
        self.tips.borrow().last().cloned()
    }

    pub fn last_message(&self) -> Option<(StatusKind, String)> {
        self.last().map(|t| (t.kind, t.message))
    }

    pub fn last_buttons(&self, key: &WidgetKey) -> Option<ButtonState> {
        self.buttons
            .borrow()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, s)| *s)
    }
}

impl StatusSink for RecordingStatus {
    fn show(&self, key: &WidgetKey, kind: StatusKind, message: &str) {
        self.tips.borrow_mut().push(Tip {
            key: Some(key.clone()),
            kind,
            message: message.to_string(),
        });
    }

    fn notify(&self, kind: StatusKind, message: &str) {
        self.tips.borrow_mut().push(Tip {
            key: None,
            kind,
            message: message.to_string(),
        });
    }

    fn buttons_changed(&self, key: &WidgetKey, state: ButtonState) {
        self.buttons.borrow_mut().push((key.clone(), state));
    }
}

/// Host graph whose node set the test controls.
#[derive(Default)]
pub struct FakeGraph {
    pub removed: RefCell<Vec<String>>,
}

impl FakeGraph {
    pub fn delete(&self, node_id: &str) {
        self.removed.borrow_mut().push(node_id.to_string());
    }
}

impl HostGraph for FakeGraph {
    fn node_exists(&self, node_id: &str) -> bool {
        !self.removed.borrow().iter().any(|n| n == node_id)
    }
}

pub struct Harness {
    pub services: WidgetServices,
    pub backend: Rc<ScriptedBackend>,
    pub status: Rc<RecordingStatus>,
    pub graph: Rc<FakeGraph>,
    pub clock: Rc<Cell<i64>>,
}

impl Harness {
    pub fn new() -> Self {
        let backend = ScriptedBackend::new();
        let status = Rc::new(RecordingStatus::default());
        let graph = Rc::new(FakeGraph::default());
        let clock = Rc::new(Cell::new(10_000));

        let now = clock.clone();
        let coordinator = OperationCoordinator::new(backend.clone(), status.clone())
            .with_clock(move || now.get());
        let services = WidgetServices::with_coordinator(Rc::new(coordinator), graph.clone());

        Self {
            services,
            backend,
            status,
            graph,
            clock,
        }
    }

    pub fn coordinator(&self) -> &Rc<OperationCoordinator> {
        self.services.coordinator()
    }

    /// Attach a widget backed by a fresh in-memory buffer.
    pub fn attach(&self, node_id: &str, text: &str) -> (WidgetKey, MemoryBuffer) {
        let buffer = MemoryBuffer::new(text);
        let key = self
            .services
            .attach(node_id, "text", Rc::new(buffer.clone()), None)
            .expect("attach");
        (key, buffer)
    }

    pub fn advance(&self, ms: i64) {
        self.clock.set(self.clock.get() + ms);
    }
}
