//! Prompt templates. Both ask for a bare JSON object so the extractor can find it.

use magic_session::Session;
use serde_json::Value;

const UNKNOWN: &str = "не указано";

/// Numerology analysis built from everything remembered about the user.
pub fn analysis_prompt(session: &Session) -> String {
    let previous = Value::Object(session.last_result.clone()).to_string();
    let history = session.history_text();

    format!(
        r#"Ты астролог и нумеролог. Ответь строго одним JSON-объектом без пояснений.

ПАМЯТЬ О ПОЛЬЗОВАТЕЛЕ:
Дата рождения: {birth_date}
Время рождения: {birth_time}

ПРЕДЫДУЩИЕ РАСЧЁТЫ:
{previous}

ИСТОРИЯ ОТВЕТОВ:
{history}

ЗАДАЧА:
1. Рассчитай основные нумерологические числа.
2. Дай краткий разбор личности.
3. Дай карту дня.

ФОРМАТ ОТВЕТА:
{{
  "numbers": {{ "...": 0 }},
  "analysis": "...",
  "dayCard": "..."
}}
"#,
        birth_date = session.birth_date.as_deref().unwrap_or(UNKNOWN),
        birth_time = session.birth_time.as_deref().unwrap_or(UNKNOWN),
        previous = previous,
        history = if history.is_empty() { "пусто" } else { history.as_str() },
    )
}

/// Compatibility between the stored user and a second birth date.
pub fn compatibility_prompt(session: &Session, second_birth_date: &str) -> String {
    let previous = Value::Object(session.last_result.clone()).to_string();

    format!(
        r#"Ты эксперт по совместимости. Ответь строго одним JSON-объектом без пояснений.

Пользователь родился: {user_date}
Партнёр родился: {partner_date}

Известные расчёты пользователя:
{previous}

ФОРМАТ ОТВЕТА:
{{
  "percent": 0,
  "strengths": "...",
  "weaknesses": "...",
  "summary": "..."
}}
Поле percent — целое число от 0 до 100.
"#,
        user_date = session.birth_date.as_deref().unwrap_or(UNKNOWN),
        partner_date = second_birth_date.trim(),
        previous = previous,
    )
}
