//! services/bot/src/telegram/messages.rs
//!
//! Renders flow outcomes as the (Russian) texts the user sees.

use expense_bot_core::{Choice, FlowError, FlowReply, ParsedEntry, Step};

pub const USAGE: &str = "Привет! Для добавления операции напиши:\n\
сумма название [валюта] [ддммгг]\n\n\
Пример: \"3000.45 Такси до отеля USD\"\n\
или: \"1500 Жевачка\"\n\
или: \"500 Продукты 150425\"\n\n\
Валюты: TRY, GEL, USD, RUB (по умолчанию RUB).\n\
/cancel — отменить текущую операцию.";

pub const UNKNOWN_BUTTON: &str = "Неизвестная кнопка. Введите операцию заново.";
pub const CANCELLED: &str = "Операция отменена.";
pub const NOTHING_TO_CANCEL: &str = "Нет операции для отмены.";
pub const ENTRY_DISCARDED: &str = "Операция не сохранена, отправьте её ещё раз.";

/// Text plus the buttons to attach (none when empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Vec<Choice>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }
}

pub fn render_reply(reply: FlowReply) -> Reply {
    match reply {
        FlowReply::ChooseCategory { entry, choices } => {
            let prompt = if choices.is_empty() {
                "Список категорий пуст. Проверьте настройки базы в Notion.".to_string()
            } else {
                "Выберите категорию:".to_string()
            };
            Reply {
                text: format!("{}\n{}", describe_entry(&entry), prompt),
                choices,
            }
        }
        FlowReply::ChooseSubcategory { category, choices } => Reply {
            text: format!("Категория выбрана: {category}.\nВыберите подкатегорию:"),
            choices,
        },
        FlowReply::ChooseAccount {
            subcategory,
            choices,
        } => {
            let prompt = if choices.is_empty() {
                "Список счетов пуст. Проверьте настройки базы в Notion."
            } else {
                "Теперь выберите счёт:"
            };
            Reply {
                text: format!("Подкатегория выбрана: {subcategory}.\n{prompt}"),
                choices,
            }
        }
        FlowReply::Completed(record) => Reply::text(format!(
            "✅ Запись добавлена в Notion!\n\
             Сумма: {},\nНазвание: {},\nВалюта: {},\nДата: {},\n\
             Категория: {},\nПодкатегория: {},\nСчёт: {}",
            record.amount,
            record.title,
            record.currency,
            record.date.iso_date,
            record.category,
            record.subcategory,
            record.account
        )),
    }
}

pub fn render_error(error: &FlowError) -> String {
    let text = describe_error(error);
    if error.is_recoverable() {
        text
    } else {
        format!("{text}\n{ENTRY_DISCARDED}")
    }
}

fn describe_error(error: &FlowError) -> String {
    match error {
        FlowError::InvalidEntry(_) => {
            "Не удалось распознать данные. Формат: \"3000.45 Название [опц. валюта] [опц. ддммгг]\"."
                .to_string()
        }
        FlowError::SessionNotFound => "Операция не найдена. Введите операцию заново.".to_string(),
        FlowError::SelectionNotFound { step, .. } => {
            let text = match step {
                Step::AwaitingCategory => "Категория не найдена. Введите операцию заново.",
                Step::AwaitingSubcategory => "Подкатегория не найдена. Введите операцию заново.",
                Step::AwaitingAccount => "Счёт не найден. Введите операцию заново.",
            };
            text.to_string()
        }
        FlowError::NoMatchingSubcategories { category } => format!(
            "Для категории «{category}» нет подкатегорий того же цвета. \
             Проверьте настройки базы в Notion и введите операцию заново."
        ),
        FlowError::Incomplete => "Не все поля выбраны. Введите операцию заново.".to_string(),
        FlowError::Sink(_) => "Произошла ошибка при сохранении в Notion.".to_string(),
    }
}

fn describe_entry(entry: &ParsedEntry) -> String {
    let mut text = format!(
        "Сумма: {}, Название: \"{}\", Валюта: {}.",
        entry.amount, entry.title, entry.currency
    );
    if let Some(date) = entry.raw_date.as_deref().and_then(format_short_date) {
        text.push_str(&format!("\nДата: {date}."));
    }
    text
}

/// `150425` -> `15.04.25`.
fn format_short_date(raw: &str) -> Option<String> {
    Some(format!("{}.{}.{}", raw.get(0..2)?, raw.get(2..4)?, raw.get(4..6)?))
}
