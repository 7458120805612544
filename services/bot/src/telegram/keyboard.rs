//! services/bot/src/telegram/keyboard.rs
//!
//! Turns flow choices into inline keyboards, one button per row.

use expense_bot_core::Choice;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

/// Builds the keyboard. Telegram refuses the whole message if any button's
/// callback data is too long, so such buttons are left out.
pub fn keyboard(choices: &[Choice]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(choices.iter().filter_map(|choice| {
        if !choice.selection.fits_callback() {
            warn!(label = %choice.label, callback = %choice.selection, "Callback data exceeds Telegram's limit; button dropped");
            return None;
        }
        Some(vec![InlineKeyboardButton::callback(
            choice.label.clone(),
            choice.selection.encode(),
        )])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use expense_bot_core::{Selection, MAX_CALLBACK_BYTES};
    use teloxide::types::InlineKeyboardButtonKind;

    fn choice(label: &str, id: &str) -> Choice {
        Choice {
            label: label.to_string(),
            selection: Selection::Subcategory(id.to_string()),
        }
    }

    #[test]
    fn one_button_per_row_with_encoded_callbacks() {
        let markup = keyboard(&[choice("Такси", "s-taxi"), choice("Автобус", "s-bus")]);

        assert_eq!(markup.inline_keyboard.len(), 2);
        let first = &markup.inline_keyboard[0];
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].text, "Такси");
        assert!(matches!(
            &first[0].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "subcat_s-taxi"
        ));
    }

    #[test]
    fn oversized_callback_data_is_not_sent() {
        let long_id = "f".repeat(MAX_CALLBACK_BYTES);
        let markup = keyboard(&[choice("Кафе", &long_id), choice("Такси", "s-taxi")]);

        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0][0].text, "Такси");
        for row in &markup.inline_keyboard {
            for button in row {
                if let InlineKeyboardButtonKind::CallbackData(data) = &button.kind {
                    assert!(data.len() <= MAX_CALLBACK_BYTES);
                }
            }
        }
    }
}
