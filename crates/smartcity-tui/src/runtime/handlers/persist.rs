use smartcity_core::event::Event;
use smartcity_core::persistence::EventSink;

use crate::events::UiEvent;

/// Writes a submitted event to the sink and reports the outcome.
pub async fn persist_event(sink: EventSink, collection: String, event: Event) -> UiEvent {
    let outcome = sink.persist(&collection, &event).await;
    UiEvent::EventPersisted { event, outcome }
}

#[cfg(test)]
mod tests {
    use smartcity_core::event::{Category, EventId, GeoPoint};
    use smartcity_core::persistence::JsonlSink;
    use smartcity_core::store::PersistOutcome;

    use super::*;

    fn event() -> Event {
        Event {
            id: EventId::from("1700000000000"),
            category: Category::Roadwork,
            description: "Lane closed".to_string(),
            position: GeoPoint::new(41.0, 29.0),
            radius: 100,
            emergency: false,
        }
    }

    #[tokio::test]
    async fn test_jsonl_sink_assigns_new_id() {
        let dir = tempfile::tempdir().unwrap();
        let sink = EventSink::Jsonl(JsonlSink::new(dir.path().join("events.jsonl")));

        let UiEvent::EventPersisted { event, outcome } =
            persist_event(sink, "events".to_string(), event()).await
        else {
            panic!("expected EventPersisted");
        };

        assert_eq!(event.id.as_str(), "1700000000000");
        let PersistOutcome::Stored { id } = outcome else {
            panic!("expected Stored, got {outcome:?}");
        };
        assert_ne!(id, event.id);
    }

    #[tokio::test]
    async fn test_unwritable_path_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let sink = EventSink::Jsonl(JsonlSink::new(dir.path().to_path_buf()));

        let UiEvent::EventPersisted { outcome, .. } =
            persist_event(sink, "events".to_string(), event()).await
        else {
            panic!("expected EventPersisted");
        };

        assert!(matches!(outcome, PersistOutcome::Failed { .. }));
    }
}
