mod common;

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::{block_on, LocalPool};
use futures::task::LocalSpawnExt;
use serde_json::json;

use common::Harness;
use prompt_widget_frontend::constants::{
    MSG_CONFIG_UPDATED, MSG_EXPAND_BUSY, MSG_HISTORY_CLEARED, MSG_NOTHING_TO_EXPAND, MSG_NO_HISTORY, MSG_NO_PRESETS,
    MSG_PRESET_EXISTS, MSG_PRESET_NOT_FOUND, MSG_RESTORED, MSG_RESTORED_ORIGINAL,
    MSG_RESTORED_TRANSLATION, MSG_THROTTLED, MSG_TRANSLATE_BUSY,
};
use prompt_widget_frontend::coordinator::OperationCoordinator;
use prompt_widget_frontend::errors::WidgetError;
use prompt_widget_frontend::messages::{ActionOutcome, ButtonState, OperationOutcome, StatusKind, WidgetAction};
use prompt_widget_frontend::models::{OperationKind, Preset, WidgetConfig, WidgetKey};
use prompt_widget_frontend::network::messages::{ConfigUpdate, PushEvent, TranslateUpdate};
use prompt_widget_frontend::registry::{MemoryBuffer, OperationState, TextBuffer};
use prompt_widget_frontend::update::dispatch;

type Slot = Rc<RefCell<Option<Result<OperationOutcome, WidgetError>>>>;

fn spawn_translate(pool: &LocalPool, coordinator: Rc<OperationCoordinator>, key: WidgetKey) -> Slot {
    let slot: Slot = Rc::new(RefCell::new(None));
    let out = slot.clone();
    pool.spawner()
        .spawn_local(async move {
            let result = coordinator.translate_text(&key).await;
            *out.borrow_mut() = Some(result);
        })
        .expect("spawn translate");
    slot
}

fn spawn_expand(pool: &LocalPool, coordinator: Rc<OperationCoordinator>, key: WidgetKey) -> Slot {
    let slot: Slot = Rc::new(RefCell::new(None));
    let out = slot.clone();
    pool.spawner()
        .spawn_local(async move {
            let result = coordinator.expand_text(&key).await;
            *out.borrow_mut() = Some(result);
        })
        .expect("spawn expand");
    slot
}

fn push(payload: serde_json::Value) -> TranslateUpdate {
    serde_json::from_value(payload).expect("valid update")
}

fn preset(content: &str) -> Preset {
    Preset {
        kind: "style".into(),
        content: content.into(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Translate
// ---------------------------------------------------------------------------

#[test]
fn translation_is_cached_both_ways_and_restored_without_backend() {
    let h = Harness::new();
    let (key, buffer) = h.attach("7", "hello world");
    h.backend.reply_translation("你好世界");

    let outcome = block_on(h.coordinator().translate_text(&key)).unwrap();
    assert_eq!(
        outcome,
        OperationOutcome::Translated {
            text: "你好世界".into(),
            from_cache: false
        }
    );
    assert_eq!(buffer.value(), "你好世界");
    {
        let requests = h.backend.translate_requests.borrow();
        assert_eq!(requests[0].text, "hello world");
        assert_eq!(requests[0].node_id, "7");
        assert_eq!(requests[0].from_lang, "auto");
        assert_eq!(requests[0].to_lang, "zh");
    }
    {
        let mut cache = h.coordinator().cache_mut();
        assert_eq!(cache.lookup("hello world").as_deref(), Some("你好世界"));
        assert_eq!(cache.lookup("你好世界").as_deref(), Some("hello world"));
    }

    let restored = block_on(h.coordinator().translate_text(&key)).unwrap();
    assert_eq!(
        restored,
        OperationOutcome::Restored {
            text: "hello world".into(),
            to_original: true
        }
    );
    assert_eq!(buffer.value(), "hello world");
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Restore, MSG_RESTORED_ORIGINAL.to_string()))
    );

    let again = block_on(h.coordinator().translate_text(&key)).unwrap();
    assert_eq!(
        again,
        OperationOutcome::Restored {
            text: "你好世界".into(),
            to_original: false
        }
    );
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Restore, MSG_RESTORED_TRANSLATION.to_string()))
    );
    assert_eq!(h.backend.translate_calls(), 1);
}

#[test]
fn cjk_text_is_translated_to_english() {
    let h = Harness::new();
    let (key, _buffer) = h.attach("1", "一只猫在沙发上");
    h.backend.reply_translation("a cat on the sofa");

    block_on(h.coordinator().translate_text(&key)).unwrap();
    assert_eq!(h.backend.translate_requests.borrow()[0].to_lang, "en");
}

#[test]
fn translate_and_expand_exclude_each_other() {
    let h = Harness::new();
    let (key, buffer) = h.attach("3", "a cat");
    h.backend.reply_translation("一只猫");
    let gate = h.backend.arm_gate();

    let mut pool = LocalPool::new();
    let slot = spawn_translate(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();
    assert!(h.coordinator().registry().get(&key).unwrap().is_translating());

    let err = block_on(h.coordinator().expand_text(&key)).unwrap_err();
    assert_eq!(err, WidgetError::Busy(OperationKind::Translate));
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Loading, MSG_TRANSLATE_BUSY.to_string()))
    );
    let err = block_on(h.coordinator().translate_text(&key)).unwrap_err();
    assert_eq!(err, WidgetError::Busy(OperationKind::Translate));
    assert!(h.backend.expand_requests.borrow().is_empty());
    assert_eq!(h.backend.translate_calls(), 1);

    gate.send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(
        slot.borrow().clone(),
        Some(Ok(OperationOutcome::Translated {
            text: "一只猫".into(),
            from_cache: false
        }))
    );
    assert_eq!(buffer.value(), "一只猫");
    assert_eq!(
        h.coordinator().registry().get(&key).unwrap().state,
        OperationState::Idle
    );
}

#[test]
fn expand_in_flight_blocks_translate() {
    let h = Harness::new();
    let (key, _buffer) = h.attach("3", "a cat");
    h.backend.reply_expansion("a fluffy cat");
    let gate = h.backend.arm_gate();

    let mut pool = LocalPool::new();
    let slot = spawn_expand(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();
    assert!(h.coordinator().registry().get(&key).unwrap().is_expanding());

    let err = block_on(h.coordinator().translate_text(&key)).unwrap_err();
    assert_eq!(err, WidgetError::Busy(OperationKind::Expand));
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Loading, MSG_EXPAND_BUSY.to_string()))
    );
    assert_eq!(h.backend.translate_calls(), 0);

    drop(gate);
    pool.run_until_stalled();
    assert_eq!(
        slot.borrow().clone(),
        Some(Ok(OperationOutcome::Expanded {
            text: "a fluffy cat".into()
        }))
    );
}

#[test]
fn push_update_before_response_applies_once() {
    let h = Harness::new();
    let (key, buffer) = h.attach("5", "hello");
    h.backend.reply_translation("你好");
    let gate = h.backend.arm_gate();

    let mut pool = LocalPool::new();
    let slot = spawn_translate(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();

    let update = push(json!({
        "node_id": 5,
        "status": "success",
        "original_text": "hello",
        "translated_text": "你好"
    }));
    assert!(h.coordinator().apply_push_update(&update));
    assert_eq!(buffer.value(), "你好");
    {
        let registry = h.coordinator().registry();
        let record = registry.get(&key).unwrap();
        assert_eq!(record.state, OperationState::Idle);
        assert!(record.settled_generation.is_some());
    }

    gate.send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(
        slot.borrow().clone(),
        Some(Ok(OperationOutcome::Translated {
            text: "你好".into(),
            from_cache: false
        }))
    );

    // Applied twice, recorded once.
    assert_eq!(
        h.coordinator()
            .history()
            .get(&key)
            .unwrap()
            .past()
            .iter()
            .cloned()
            .collect::<Vec<_>>(),
        vec!["", "hello"]
    );
    assert_eq!(h.coordinator().undo(&key).unwrap().as_deref(), Some("hello"));
}

#[test]
fn late_response_after_push_and_undo_keeps_the_undo() {
    let h = Harness::new();
    let (key, buffer) = h.attach("5", "hello");
    h.backend.reply_translation("你好");
    let gate = h.backend.arm_gate();

    let mut pool = LocalPool::new();
    let slot = spawn_translate(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();

    assert!(h.coordinator().apply_push_update(&push(json!({
        "node_id": 5,
        "status": "success",
        "original_text": "hello",
        "translated_text": "你好"
    }))));
    assert_eq!(h.coordinator().undo(&key).unwrap().as_deref(), Some("hello"));
    let tips = h.status.tips.borrow().len();

    gate.send(()).unwrap();
    pool.run_until_stalled();
    assert!(matches!(
        slot.borrow().clone(),
        Some(Ok(OperationOutcome::Translated { .. }))
    ));

    assert_eq!(buffer.value(), "hello");
    let history = h.coordinator().history();
    let entry = history.get(&key).unwrap();
    assert_eq!(entry.current(), "hello");
    assert_eq!(entry.past().iter().cloned().collect::<Vec<_>>(), vec![""]);
    assert_eq!(entry.future().iter().cloned().collect::<Vec<_>>(), vec!["你好"]);
    assert_eq!(h.status.tips.borrow().len(), tips);
    assert!(h.coordinator().registry().get(&key).unwrap().settled_generation.is_none());
}

#[test]
fn settled_translate_response_cannot_land_during_expand() {
    let h = Harness::new();
    let (key, buffer) = h.attach("5", "hello");
    h.backend.reply_translation("你好呀");
    h.backend.reply_expansion("a warm greeting");
    let translate_gate = h.backend.arm_gate();

    let mut pool = LocalPool::new();
    let translated = spawn_translate(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();

    assert!(h.coordinator().apply_push_update(&push(json!({
        "node_id": 5,
        "status": "success",
        "original_text": "hello",
        "translated_text": "你好"
    }))));

    let expand_gate = h.backend.arm_gate();
    let expanded = spawn_expand(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();
    assert!(matches!(
        h.coordinator().registry().get(&key).unwrap().state,
        OperationState::Expanding { .. }
    ));

    translate_gate.send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(
        translated.borrow().clone(),
        Some(Ok(OperationOutcome::Discarded))
    );
    assert_eq!(buffer.value(), "你好");
    assert_eq!(h.coordinator().history().get(&key).unwrap().current(), "你好");
    assert!(matches!(
        h.coordinator().registry().get(&key).unwrap().state,
        OperationState::Expanding { .. }
    ));

    expand_gate.send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(
        expanded.borrow().clone(),
        Some(Ok(OperationOutcome::Expanded {
            text: "a warm greeting".into()
        }))
    );
    assert_eq!(buffer.value(), "a warm greeting");
    assert_eq!(
        h.coordinator().registry().get(&key).unwrap().state,
        OperationState::Idle
    );
}

#[test]
fn translate_status_names_the_direction() {
    let h = Harness::new();
    let (key, _) = h.attach("8", "a quiet lake");
    h.backend.reply_translation("宁静的湖");

    block_on(h.coordinator().translate_text(&key)).unwrap();
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Success, "en->zh complete".to_string()))
    );
}

#[test]
fn applying_the_same_result_twice_is_a_no_op() {
    let h = Harness::new();
    let (key, buffer) = h.attach("2", "good morning");

    assert!(h.coordinator().apply_translation_result(&key, "good morning", "早上好"));
    assert!(!h.coordinator().apply_translation_result(&key, "good morning", "早上好"));
    assert_eq!(buffer.value(), "早上好");
    assert_eq!(h.coordinator().cache_mut().len(), 2);
}

#[test]
fn failed_translation_throttles_immediate_retry() {
    let h = Harness::new();
    let (key, buffer) = h.attach("2", "a dog");
    h.backend
        .fail_translation(WidgetError::Backend("quota exceeded".into()));

    let err = block_on(h.coordinator().translate_text(&key)).unwrap_err();
    assert_eq!(err, WidgetError::Backend("quota exceeded".into()));
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Error, "quota exceeded".to_string()))
    );
    assert_eq!(buffer.value(), "a dog");
    assert!(h.coordinator().cache_mut().is_empty());
    assert!(!h.coordinator().registry().get(&key).unwrap().is_translating());

    let err = block_on(h.coordinator().translate_text(&key)).unwrap_err();
    assert_eq!(err, WidgetError::Throttled);
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Error, MSG_THROTTLED.to_string()))
    );
    assert_eq!(h.backend.translate_calls(), 1);

    h.advance(1_000);
    h.backend.reply_translation("一只狗");
    let outcome = block_on(h.coordinator().translate_text(&key)).unwrap();
    assert_eq!(
        outcome,
        OperationOutcome::Translated {
            text: "一只狗".into(),
            from_cache: false
        }
    );
}

#[test]
fn http_failure_is_reported_with_prefix() {
    let h = Harness::new();
    let (key, _buffer) = h.attach("2", "a bird");
    h.backend.fail_translation(WidgetError::Http { status: 502 });

    block_on(h.coordinator().translate_text(&key)).unwrap_err();
    assert_eq!(
        h.status.last_message(),
        Some((
            StatusKind::Error,
            "Translation failed: HTTP error! status: 502".to_string()
        ))
    );
}

#[test]
fn response_after_removal_is_discarded() {
    let h = Harness::new();
    let (key, buffer) = h.attach("4", "hello");
    h.backend.reply_translation("你好");
    let gate = h.backend.arm_gate();

    let mut pool = LocalPool::new();
    let slot = spawn_translate(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();
    assert!(h.coordinator().registry_mut().remove(&key));

    gate.send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(slot.borrow().clone(), Some(Ok(OperationOutcome::Discarded)));
    assert!(h.coordinator().cache_mut().is_empty());
    assert_eq!(buffer.value(), "hello");
}

#[test]
fn disabled_feature_rejects_without_backend_call() {
    let h = Harness::new();
    let (key, _buffer) = h.attach("1", "hello");
    h.coordinator().flags_mut().translate = false;

    let err = block_on(h.coordinator().translate_text(&key)).unwrap_err();
    assert_eq!(err, WidgetError::FeatureDisabled("translate"));
    assert_eq!(h.backend.translate_calls(), 0);
}

// ---------------------------------------------------------------------------
// Expand
// ---------------------------------------------------------------------------

#[test]
fn expansion_always_creates_a_history_step() {
    let h = Harness::new();
    let (key, buffer) = h.attach("4", "cat");
    h.backend.reply_expansion("a fluffy cat on a sofa");

    let outcome = block_on(h.coordinator().expand_text(&key)).unwrap();
    assert_eq!(
        outcome,
        OperationOutcome::Expanded {
            text: "a fluffy cat on a sofa".into()
        }
    );
    assert_eq!(buffer.value(), "a fluffy cat on a sofa");
    assert_eq!(h.backend.expand_requests.borrow()[0].text, "cat");
    assert_eq!(h.backend.expand_requests.borrow()[0].node_id, "4");

    // Expanding back to an earlier state still counts as a step.
    h.backend.reply_expansion("cat");
    block_on(h.coordinator().expand_text(&key)).unwrap();
    assert_eq!(
        h.coordinator().undo(&key).unwrap().as_deref(),
        Some("a fluffy cat on a sofa")
    );
    assert_eq!(h.coordinator().undo(&key).unwrap().as_deref(), Some("cat"));
}

#[test]
fn expanding_blank_text_is_rejected() {
    let h = Harness::new();
    let (key, _buffer) = h.attach("4", "   ");

    let err = block_on(h.coordinator().expand_text(&key)).unwrap_err();
    assert_eq!(err, WidgetError::EmptyText(OperationKind::Expand));
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Error, MSG_NOTHING_TO_EXPAND.to_string()))
    );
    assert!(h.backend.expand_requests.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[test]
fn undo_and_redo_write_the_buffer() {
    let h = Harness::new();
    let (key, buffer) = h.attach("1", "a");

    buffer.set_value("b");
    assert!(h.coordinator().commit_text(&key).unwrap());
    buffer.set_value("c");
    assert!(h.coordinator().commit_text(&key).unwrap());
    assert!(!h.coordinator().commit_text(&key).unwrap());

    assert_eq!(h.coordinator().undo(&key).unwrap().as_deref(), Some("b"));
    assert_eq!(buffer.value(), "b");
    assert_eq!(
        h.status.last_buttons(&key),
        Some(ButtonState {
            has_past: true,
            has_future: true
        })
    );

    assert_eq!(h.coordinator().redo(&key).unwrap().as_deref(), Some("c"));
    assert_eq!(buffer.value(), "c");
    assert_eq!(
        h.status.last_buttons(&key),
        Some(ButtonState {
            has_past: true,
            has_future: false
        })
    );
}

#[test]
fn history_item_from_another_widget_is_applied() {
    let h = Harness::new();
    let (source, _) = h.attach("1", "a red fox");
    let (target, buffer) = h.attach("2", "");

    let text = h
        .coordinator()
        .apply_history_item(&target, &source, "a red fox")
        .unwrap();
    assert_eq!(text, "a red fox");
    assert_eq!(buffer.value(), "a red fox");
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Success, MSG_RESTORED.to_string()))
    );
}

#[test]
fn empty_history_view_says_so() {
    let h = Harness::new();
    let (key, _) = h.attach("1", "");

    assert!(h.coordinator().show_history(&key).unwrap().is_empty());
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Info, MSG_NO_HISTORY.to_string()))
    );
}

#[test]
fn clearing_history_disables_both_buttons() {
    let h = Harness::new();
    let (key, buffer) = h.attach("1", "a");
    buffer.set_value("b");
    h.coordinator().commit_text(&key).unwrap();

    h.coordinator().clear_history(&key).unwrap();
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Success, MSG_HISTORY_CLEARED.to_string()))
    );
    assert_eq!(h.status.last_buttons(&key), Some(ButtonState::default()));
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

#[test]
fn preset_applies_once() {
    let h = Harness::new();
    let (key, buffer) = h.attach("9", "");

    assert_eq!(
        h.coordinator().apply_preset(&key, "masterpiece").unwrap().as_deref(),
        Some("masterpiece")
    );
    assert_eq!(buffer.value(), "masterpiece");

    assert_eq!(h.coordinator().apply_preset(&key, "masterpiece").unwrap(), None);
    assert_eq!(buffer.value(), "masterpiece");
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Info, MSG_PRESET_EXISTS.to_string()))
    );
}

#[test]
fn preset_is_spliced_at_the_cursor_and_removed_again() {
    let h = Harness::new();
    let buffer = MemoryBuffer::with_cursor("sunset, beach", 7);
    let key = h
        .services
        .attach("9", "text", Rc::new(buffer.clone()), None)
        .unwrap();

    h.coordinator().apply_preset(&key, "golden hour").unwrap();
    assert_eq!(buffer.value(), "sunset, golden hour, beach");
    assert_eq!(buffer.cursor(), Some(19));

    assert_eq!(
        h.coordinator().remove_preset(&key, "golden hour").unwrap().as_deref(),
        Some("sunset, beach")
    );
    assert_eq!(h.coordinator().remove_preset(&key, "golden hour").unwrap(), None);
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Info, MSG_PRESET_NOT_FOUND.to_string()))
    );
}

#[test]
fn preset_list_is_fetched_once_until_saved() {
    let h = Harness::new();
    let (key, _) = h.attach("1", "");
    h.backend.set_presets(vec![preset("masterpiece"), preset("best quality")]);

    assert_eq!(block_on(h.coordinator().show_presets(&key)).unwrap().len(), 2);
    assert_eq!(block_on(h.coordinator().show_presets(&key)).unwrap().len(), 2);
    assert_eq!(h.backend.preset_loads.get(), 1);

    block_on(h.coordinator().save_presets(Vec::new())).unwrap();
    assert!(h.coordinator().cached_presets().is_none());
    assert!(block_on(h.coordinator().show_presets(&key)).unwrap().is_empty());
    assert_eq!(h.backend.preset_loads.get(), 2);
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Info, MSG_NO_PRESETS.to_string()))
    );
}

// ---------------------------------------------------------------------------
// Push updates
// ---------------------------------------------------------------------------

#[test]
fn progress_update_shows_loading_tip() {
    let h = Harness::new();
    let (key, _) = h.attach("5", "a long prompt");
    h.backend.reply_translation("一个长提示");
    let gate = h.backend.arm_gate();

    let mut pool = LocalPool::new();
    let _slot = spawn_translate(&pool, h.coordinator().clone(), key.clone());
    pool.run_until_stalled();

    let update = push(json!({
        "node_id": "5",
        "status": "translating",
        "progress": {"current": 1, "total": 3}
    }));
    assert!(h.coordinator().apply_push_update(&update));
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Loading, "Translating 1/3...".to_string()))
    );
    assert!(h.coordinator().registry().get(&key).unwrap().is_translating());

    gate.send(()).unwrap();
    pool.run_until_stalled();
}

#[test]
fn error_update_is_shown_verbatim() {
    let h = Harness::new();
    h.attach("6", "hello");

    let update = push(json!({"node_id": 6, "status": "error", "message": "invalid appid"}));
    assert!(h.coordinator().apply_push_update(&update));
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Error, "invalid appid".to_string()))
    );
}

#[test]
fn restore_update_to_original_resets_the_original_text() {
    let h = Harness::new();
    let (key, buffer) = h.attach("8", "你好");

    let update = push(json!({
        "node_id": "8",
        "status": "success",
        "original_text": "你好",
        "translated_text": "hello",
        "operation_type": "restore",
        "operation_desc": "恢复原文"
    }));
    assert!(h.coordinator().apply_push_update(&update));
    assert_eq!(buffer.value(), "hello");
    assert_eq!(
        h.coordinator()
            .registry()
            .get(&key)
            .unwrap()
            .original_text
            .as_deref(),
        Some("hello")
    );
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Restore, "恢复原文".to_string()))
    );
}

#[test]
fn success_update_names_direction_and_cache() {
    let h = Harness::new();
    h.attach("8", "你好");

    let update = push(json!({
        "node_id": "8",
        "status": "success",
        "original_text": "你好",
        "translated_text": "hello",
        "translate_direction": "zh->en",
        "from_cache": true
    }));
    assert!(h.coordinator().apply_push_update(&update));
    assert_eq!(
        h.status.last_message(),
        Some((StatusKind::Success, "zh->en complete (cached)".to_string()))
    );
}

#[test]
fn update_for_unknown_node_is_ignored() {
    let h = Harness::new();
    h.attach("1", "hello");

    let update = push(json!({"node_id": 99, "status": "error", "message": "boom"}));
    assert!(!h.coordinator().apply_push_update(&update));
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn button_tags_dispatch_to_the_coordinator() {
    let h = Harness::new();
    let (key, buffer) = h.attach("1", "a");
    buffer.set_value("b");

    let commit = block_on(dispatch(h.coordinator(), &key, "blur".parse().unwrap())).unwrap();
    assert_eq!(commit, ActionOutcome::Done);

    let history = block_on(dispatch(h.coordinator(), &key, WidgetAction::ShowHistory)).unwrap();
    match history {
        ActionOutcome::History(records) => {
            let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
            assert_eq!(texts, vec!["b", "a"]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let undo = block_on(dispatch(h.coordinator(), &key, "undo".parse().unwrap())).unwrap();
    assert_eq!(undo, ActionOutcome::Text(Some("a".into())));

    let preset = block_on(dispatch(
        h.coordinator(),
        &key,
        WidgetAction::ApplyPreset("masterpiece".into()),
    ))
    .unwrap();
    assert_eq!(preset, ActionOutcome::Text(Some("a, masterpiece".into())));
}

#[test]
fn config_push_reloads_presets_only_on_success() {
    let h = Harness::new();
    let loads = h.backend.preset_loads.get();
    let tips = h.status.tips.borrow().len();

    block_on(h.coordinator().handle_push_event(PushEvent::ConfigUpdate(ConfigUpdate {
        status: "error".into(),
        message: Some("disk full".into()),
        config: Some(WidgetConfig::default()),
    })))
    .unwrap();
    assert_eq!(h.backend.preset_loads.get(), loads);
    assert_eq!(h.status.tips.borrow().len(), tips);

    block_on(h.coordinator().handle_push_event(PushEvent::ConfigUpdate(ConfigUpdate {
        status: "success".into(),
        message: None,
        config: Some(WidgetConfig::default()),
    })))
    .unwrap();
    assert_eq!(h.backend.preset_loads.get(), loads + 1);
    let tip = h.status.last().unwrap();
    assert!(tip.key.is_none());
    assert_eq!(tip.kind, StatusKind::Success);
    assert_eq!(tip.message, MSG_CONFIG_UPDATED);
}
