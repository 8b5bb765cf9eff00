//! Message catalogue for client-facing error messages.
//!
//! Errors carry a stable message key; the key is resolved to text here
//! according to the request locale. Unknown keys resolve to themselves.

use serde::{Deserialize, Serialize};

/// Supported response locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Russian.
    #[default]
    Ru,
    /// English.
    En,
}

impl Locale {
    /// Pick the first supported locale named in an `Accept-Language` header.
    ///
    /// Quality values are ignored; the header order is taken as preference order.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .find_map(|tag| {
                let primary = tag.split('-').next().unwrap_or_default();
                match primary {
                    "ru" => Some(Self::Ru),
                    "en" => Some(Self::En),
                    _ => None,
                }
            })
    }
}

/// Translate a message key for the given locale.
#[must_use]
pub fn translate(key: &str, locale: Locale) -> String {
    let text = match (key, locale) {
        ("not_found", Locale::Ru) => "Запись не найдена",
        ("not_found", Locale::En) => "Record not found",
        ("validation_error", Locale::Ru) => "Ошибка валидации данных",
        ("validation_error", Locale::En) => "Validation failed",
        ("internal_error", Locale::Ru) => "Внутренняя ошибка сервера",
        ("internal_error", Locale::En) => "Internal server error",

        ("user_not_found", Locale::Ru) => "Пользователь не найден",
        ("user_not_found", Locale::En) => "User not found",
        ("user_phone_exists", Locale::Ru) => "Пользователь с таким телефоном уже существует",
        ("user_phone_exists", Locale::En) => "A user with this phone already exists",
        ("user_has_orders", Locale::Ru) => "Нельзя удалить пользователя, у которого есть заказы",
        ("user_has_orders", Locale::En) => "Cannot delete a user who has orders",
        ("user_checked_requests", Locale::Ru) => {
            "Нельзя удалить пользователя, проверявшего заявки в группы"
        }
        ("user_checked_requests", Locale::En) => {
            "Cannot delete a user who reviewed group requests"
        }

        ("category_not_found", Locale::Ru) => "Категория не найдена",
        ("category_not_found", Locale::En) => "Category not found",
        ("category_title_exists", Locale::Ru) => "Категория с таким названием уже существует",
        ("category_title_exists", Locale::En) => "A category with this title already exists",
        ("category_has_products", Locale::Ru) => "Нельзя удалить категорию, в которой есть товары",
        ("category_has_products", Locale::En) => "Cannot delete a category that has products",

        ("modification_type_not_found", Locale::Ru) => "Тип модификации не найден",
        ("modification_type_not_found", Locale::En) => "Modification type not found",
        ("modification_type_value_exists", Locale::Ru) => {
            "Тип модификации с таким значением уже существует"
        }
        ("modification_type_value_exists", Locale::En) => {
            "A modification type with this value already exists"
        }
        ("modification_type_in_use", Locale::Ru) => {
            "Нельзя удалить тип модификации, привязанный к категориям"
        }
        ("modification_type_in_use", Locale::En) => {
            "Cannot delete a modification type bound to categories"
        }

        ("category_modification_not_found", Locale::Ru) => "Модификация категории не найдена",
        ("category_modification_not_found", Locale::En) => "Category modification not found",
        ("category_modification_exists", Locale::Ru) => {
            "Такая модификация для категории уже существует"
        }
        ("category_modification_exists", Locale::En) => {
            "This modification is already bound to the category"
        }

        ("product_not_found", Locale::Ru) => "Товар не найден",
        ("product_not_found", Locale::En) => "Product not found",
        ("product_inactive", Locale::Ru) => "Товар недоступен для заказа",
        ("product_inactive", Locale::En) => "Product is not available for ordering",
        ("product_has_orders", Locale::Ru) => "Нельзя удалить товар, на который есть заказы",
        ("product_has_orders", Locale::En) => "Cannot delete a product that has orders",

        ("order_not_found", Locale::Ru) => "Заказ не найден",
        ("order_not_found", Locale::En) => "Order not found",

        ("academy_not_found", Locale::Ru) => "Академия не найдена",
        ("academy_not_found", Locale::En) => "Academy not found",
        ("academy_title_exists", Locale::Ru) => "Академия с таким названием уже существует",
        ("academy_title_exists", Locale::En) => "An academy with this title already exists",

        ("field_not_found", Locale::Ru) => "Поле не найдено",
        ("field_not_found", Locale::En) => "Field not found",
        ("field_title_exists", Locale::Ru) => "В академии уже есть поле с таким названием",
        ("field_title_exists", Locale::En) => "The academy already has a field with this title",

        ("group_not_found", Locale::Ru) => "Группа не найдена",
        ("group_not_found", Locale::En) => "Group not found",
        ("invalid_age_range", Locale::Ru) => {
            "Минимальный возраст не может быть больше максимального"
        }
        ("invalid_age_range", Locale::En) => "Minimum age cannot exceed maximum age",

        ("request_to_group_not_found", Locale::Ru) => "Заявка в группу не найдена",
        ("request_to_group_not_found", Locale::En) => "Group request not found",
        ("checker_not_found", Locale::Ru) => "Проверяющий не найден",
        ("checker_not_found", Locale::En) => "Reviewer not found",
        ("checker_required_for_status_change", Locale::Ru) => {
            "Для смены статуса необходимо указать проверяющего"
        }
        ("checker_required_for_status_change", Locale::En) => {
            "A reviewer is required to change the status"
        }
        ("cannot_reset_reviewed_request", Locale::Ru) => {
            "Нельзя вернуть проверенную заявку без удаления проверяющего"
        }
        ("cannot_reset_reviewed_request", Locale::En) => {
            "Cannot reset a reviewed request without removing its reviewer"
        }

        ("ticket_not_found", Locale::Ru) => "Билет не найден",
        ("ticket_not_found", Locale::En) => "Ticket not found",
        ("image_required", Locale::Ru) => "Файл изображения не передан",
        ("image_required", Locale::En) => "Image file is missing",
        ("image_too_large", Locale::Ru) => "Файл изображения слишком большой",
        ("image_too_large", Locale::En) => "Image file is too large",
        ("unsupported_image_type", Locale::Ru) => "Неподдерживаемый формат изображения",
        ("unsupported_image_type", Locale::En) => "Unsupported image format",

        _ => key,
    };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_known_key() {
        assert_eq!(translate("not_found", Locale::En), "Record not found");
        assert_eq!(translate("not_found", Locale::Ru), "Запись не найдена");
    }

    #[test]
    fn test_delete_refusals_are_translated() {
        for key in [
            "category_has_products",
            "modification_type_in_use",
            "product_has_orders",
            "user_has_orders",
            "user_checked_requests",
        ] {
            for locale in [Locale::Ru, Locale::En] {
                assert_ne!(translate(key, locale), key, "{key} missing for {locale:?}");
            }
        }
    }

    #[test]
    fn test_translate_unknown_key_falls_back_to_key() {
        assert_eq!(translate("no_such_key", Locale::En), "no_such_key");
    }

    #[test]
    fn test_accept_language_picks_first_supported() {
        assert_eq!(
            Locale::from_accept_language("de-DE,en-US;q=0.8,ru;q=0.5"),
            Some(Locale::En)
        );
        assert_eq!(Locale::from_accept_language("ru-RU"), Some(Locale::Ru));
        assert_eq!(Locale::from_accept_language("fr, de"), None);
        assert_eq!(Locale::from_accept_language(""), None);
    }
}
