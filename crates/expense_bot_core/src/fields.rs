//! Property names of the target collection, plus the constant tags every record carries.

pub const DATE: &str = "Дата";
pub const MONTH: &str = "Месяц";
pub const YEAR: &str = "Год";
pub const TITLE: &str = "Название";
pub const CATEGORY: &str = "Категория";
pub const SUBCATEGORY: &str = "Подкатегория";
pub const AMOUNT: &str = "Сумма";
pub const CURRENCY: &str = "Валюта";
pub const ACCOUNT: &str = "Счёт";
pub const OPERATION_TYPE: &str = "Тип операции";
pub const STATUS: &str = "Статус";

pub const OPERATION_TYPE_EXPENSE: &str = "Расход";
pub const STATUS_PAID: &str = "Оплачено";
