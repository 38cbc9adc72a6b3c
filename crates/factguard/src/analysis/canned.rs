//! Canned analysis replayed in demo mode

use serde_json::Value;

use super::AnalysisResult;
use crate::error::{FactGuardError, Result};
use crate::sse::{StreamEvent, event_type};

const CANNED_RESULT_JSON: &str = include_str!("../../fixtures/canned_result.json");

const START_MESSAGE: &str = "🚀 Начинаю проверку...";

const PROGRESS_MESSAGES: &[&str] = &[
    "🌐 Загружаю страницу...",
    "✓ Страница загружена, читаю контент... (7884 символов)",
    "🔬 Начинаю анализ содержимого...",
    "📄 Читаю текст... 7884 символов",
    "🔍 Ищу факты по теме в интернете...",
    "✓ Нашёл дополнительный контекст из сети",
    "🧠 Анализирую текст на манипуляции и дезинформацию... (12656 симв.)",
    "⏳ Проверяю источники, логику и факты...",
    "📊 Обрабатываю результат...",
    "📊 Использовано токенов: 6377 (запрос: 5549, ответ: 828)",
    "📊 Достоверность: 8/10 · манипуляций: 1 · логических ошибок: 1",
    "🟢 Контент выглядит достоверно",
];

const DONE_MESSAGE: &str = "✅ Проверка завершена!";

/// A fixed start/progress/result/done sequence
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct CannedScript {
    start: String,
    progress: Vec<String>,
    result: AnalysisResult,
    done: String,
}

impl CannedScript {
    /// The script bundled with the server
    pub fn builtin() -> Result<Self> {
        let value: Value = serde_json::from_str(CANNED_RESULT_JSON)?;
        let result = AnalysisResult::from_value(value).ok_or_else(|| {
            FactGuardError::Serialization("canned result must be a JSON object".to_string())
        })?;

        Ok(Self::new(
            START_MESSAGE,
            PROGRESS_MESSAGES.iter().map(|m| m.to_string()).collect(),
            result,
            DONE_MESSAGE,
        ))
    }

    pub fn new(
        start: impl Into<String>,
        progress: Vec<String>,
        result: AnalysisResult,
        done: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            progress,
            result,
            done: done.into(),
        }
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn progress(&self) -> &[String] {
        &self.progress
    }

    /// Events replayed for a request about `url`
    ///
    /// Only the result's `url` field depends on the request.
    pub fn events_for(&self, url: &str) -> Result<Vec<StreamEvent>> {
        let result_json = serde_json::to_string(&self.result.with_url(url))?;

        let mut events = Vec::with_capacity(self.progress.len() + 3);
        events.push(StreamEvent::new(event_type::START, self.start.as_str()));
        events.extend(
            self.progress
                .iter()
                .map(|message| StreamEvent::new(event_type::PROGRESS, message.as_str())),
        );
        events.push(StreamEvent::new(event_type::RESULT, result_json));
        events.push(StreamEvent::new(event_type::DONE, self.done.as_str()));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_script_loads() {
        let script = CannedScript::builtin().expect("bundled script must parse");
        assert_eq!(script.progress().len(), PROGRESS_MESSAGES.len());
        assert_eq!(script.result().credibility_score(), Some(8.0));
        assert_eq!(script.result().final_verdict(), Some("PARȚIAL ADEVĂRAT"));
    }

    #[test]
    fn test_event_order() {
        let script = CannedScript::builtin().unwrap();
        let events = script.events_for("https://example.com/story").unwrap();

        assert_eq!(events.len(), PROGRESS_MESSAGES.len() + 3);
        assert_eq!(events[0].event_type, "start");
        for event in &events[1..events.len() - 2] {
            assert_eq!(event.event_type, "progress");
        }
        assert_eq!(events[events.len() - 2].event_type, "result");
        assert_eq!(events[events.len() - 1].event_type, "done");
    }

    #[test]
    fn test_result_payload_is_single_line_with_url_substituted() {
        let script = CannedScript::builtin().unwrap();
        let events = script.events_for("https://example.com/story").unwrap();
        let result = &events[events.len() - 2];

        assert!(!result.data.contains('\n'));
        let payload: Value = serde_json::from_str(&result.data).unwrap();
        assert_eq!(payload["url"], "https://example.com/story");

        let expected = script
            .result()
            .with_url("https://example.com/story")
            .into_value();
        assert_eq!(payload, expected);
    }

    #[test]
    fn test_result_payload_keeps_fixture_field_order() {
        let script = CannedScript::builtin().unwrap();
        let events = script.events_for("https://example.com/story").unwrap();
        let data = &events[events.len() - 2].data;

        let position = |key: &str| data.find(&format!("\"{key}\":")).unwrap();
        assert!(data.starts_with(r#"{"result":"ok","url":"https://example.com/story""#));
        assert!(position("summary") < position("credibility_score"));
        assert!(position("credibility_score") < position("final_verdict"));
        assert!(position("sources") < position("usage"));
    }

    #[test]
    fn test_only_url_differs_between_requests() {
        let script = CannedScript::builtin().unwrap();
        let a = script.events_for("https://a.example").unwrap();
        let b = script.events_for("https://b.example").unwrap();

        assert_eq!(a.len(), b.len());
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.event_type, right.event_type);
            if left.event_type == "result" {
                let mut l: Value = serde_json::from_str(&left.data).unwrap();
                let mut r: Value = serde_json::from_str(&right.data).unwrap();
                assert_ne!(l["url"], r["url"]);
                l.as_object_mut().unwrap().remove("url");
                r.as_object_mut().unwrap().remove("url");
                assert_eq!(l, r);
            } else {
                assert_eq!(left.data, right.data);
            }
        }
    }

    #[test]
    fn test_custom_script() {
        let result = AnalysisResult::from_value(serde_json::json!({"score": 1})).unwrap();
        let script = CannedScript::new("go", vec!["step".to_string()], result, "end");
        let events = script.events_for("u").unwrap();

        assert_eq!(
            events,
            vec![
                StreamEvent::new("start", "go"),
                StreamEvent::new("progress", "step"),
                StreamEvent::new("result", r#"{"score":1,"url":"u"}"#),
                StreamEvent::new("done", "end"),
            ]
        );
    }
}
