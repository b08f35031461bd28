// src/update.rs
//
// Single entry point for widget button actions. Every `WidgetAction` variant
// is handled here so the presentation layer never reaches into the stores.
//
use crate::coordinator::OperationCoordinator;
use crate::errors::WidgetError;
use crate::messages::{ActionOutcome, WidgetAction};
use crate::models::WidgetKey;

pub async fn dispatch(
    coordinator: &OperationCoordinator,
    key: &WidgetKey,
    action: WidgetAction,
) -> Result<ActionOutcome, WidgetError> {
    debug_log!("[{}] dispatch {:?}", key, action);

    match action {
        WidgetAction::ShowHistory => coordinator.show_history(key).map(ActionOutcome::History),
        WidgetAction::ShowPresets => coordinator
            .show_presets(key)
            .await
            .map(ActionOutcome::Presets),

        WidgetAction::Undo => coordinator.undo(key).map(ActionOutcome::Text),
        WidgetAction::Redo => coordinator.redo(key).map(ActionOutcome::Text),
        WidgetAction::ClearHistory => {
            coordinator.clear_history(key)?;
            Ok(ActionOutcome::Done)
        }
        WidgetAction::CommitText => {
            coordinator.commit_text(key)?;
            Ok(ActionOutcome::Done)
        }
        WidgetAction::ApplyHistoryItem { source, text } => coordinator
            .apply_history_item(key, &source, &text)
            .map(|text| ActionOutcome::Text(Some(text))),

        WidgetAction::Translate => coordinator
            .translate_text(key)
            .await
            .map(ActionOutcome::Operation),
        WidgetAction::Expand => coordinator
            .expand_text(key)
            .await
            .map(ActionOutcome::Operation),

        WidgetAction::ApplyPreset(content) => coordinator
            .apply_preset(key, &content)
            .map(ActionOutcome::Text),
        WidgetAction::RemovePreset(content) => coordinator
            .remove_preset(key, &content)
            .map(ActionOutcome::Text),
    }
}
