// ============================================================================
// File: src/chat.rs
// Chat transcript driven by /search
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::api_client::Backend;
use crate::models::{ChatMessage, SearchRequest};
use crate::view::{ChatView, StatusLine};

pub struct ChatController {
    backend: Arc<dyn Backend>,
    top_k: usize,
    view: ChatView,
}

impl ChatController {
    pub fn new(backend: Arc<dyn Backend>, top_k: usize) -> Self {
        Self {
            backend,
            top_k,
            view: ChatView::default(),
        }
    }

    pub fn view(&self) -> &ChatView {
        &self.view
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.view.input = text.into();
    }

    /// Send the current input as a query.
    ///
    /// Blank input is ignored. Otherwise the question is echoed into the
    /// transcript and the input cleared before the request goes out; the
    /// answer is appended when it arrives. Failures are logged and shown
    /// as the chat's error state.
    pub async fn submit_query(&mut self) {
        let text = self.view.input.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.view.transcript.push(ChatMessage::user(text.clone()));
        self.view.input.clear();
        self.view.status = None;
        self.view.loading = true;

        let request = SearchRequest { query: text, top_k: self.top_k };
        let start = Instant::now();
        let result = self.backend.search(&request).await;
        self.view.loading = false;

        match result {
            Ok(response) => {
                let elapsed = start.elapsed();
                tracing::debug!(latency_ms = elapsed.as_millis() as u64, "search answered");
                self.view.latency = Some(elapsed);
                self.view
                    .transcript
                    .push(ChatMessage::assistant(response.answer_text(), response.sources()));
            }
            Err(err) => {
                tracing::error!(query = %request.query, error = %err, "search failed");
                self.view.status = Some(StatusLine::from_error(&err, "Search failed."));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResultFragment, Role, SearchResponse};
    use crate::test_support::{FakeBackend, Scripted};
    use std::time::Duration;

    fn fragments(texts: &[&str]) -> SearchResponse {
        SearchResponse::ResultList(
            texts
                .iter()
                .map(|t| ResultFragment { text: Some(t.to_string()), ..Default::default() })
                .collect(),
        )
    }

    #[tokio::test]
    async fn blank_input_sends_nothing() {
        let backend = Arc::new(FakeBackend::new());
        let mut controller = ChatController::new(backend.clone(), 3);

        for input in ["", "   ", "\t\n"] {
            controller.set_input(input);
            controller.submit_query().await;
        }

        assert!(backend.searched().is_empty());
        assert!(controller.view().transcript.is_empty());
    }

    #[tokio::test]
    async fn question_and_answer_are_appended_in_order() {
        let backend = Arc::new(FakeBackend::new().with_search(Scripted::Ok(fragments(&["A", "B"]))));
        let mut controller = ChatController::new(backend.clone(), 3);

        controller.set_input("  what is the land area?  ");
        controller.submit_query().await;

        assert_eq!(
            backend.searched(),
            vec![SearchRequest { query: "what is the land area?".to_string(), top_k: 3 }]
        );
        let view = controller.view();
        assert_eq!(view.input, "");
        assert!(!view.loading);
        assert!(view.latency.is_some());
        assert_eq!(view.status, None);
        assert_eq!(
            view.transcript,
            vec![
                ChatMessage::user("what is the land area?"),
                ChatMessage::assistant("A\n\nB", Vec::new()),
            ]
        );
    }

    #[tokio::test]
    async fn configured_top_k_is_sent() {
        let backend = Arc::new(FakeBackend::new());
        let mut controller = ChatController::new(backend.clone(), 10);

        controller.set_input("parking?");
        controller.submit_query().await;

        assert_eq!(backend.searched()[0].top_k, 10);
    }

    #[tokio::test]
    async fn combined_answer_is_used_verbatim() {
        let backend = Arc::new(FakeBackend::new().with_search(Scripted::Ok(
            SearchResponse::CombinedAnswer("Parking is available for 20 vehicles.".to_string()),
        )));
        let mut controller = ChatController::new(backend, 3);

        controller.set_input("parking?");
        controller.submit_query().await;

        let last = controller.view().transcript.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text, "Parking is available for 20 vehicles.");
    }

    #[tokio::test]
    async fn question_is_echoed_while_the_search_is_in_flight() {
        let backend = Arc::new(FakeBackend::new().with_search(Scripted::Pending));
        let mut controller = ChatController::new(backend.clone(), 3);

        controller.set_input("land area?");
        let outcome =
            tokio::time::timeout(Duration::from_millis(50), controller.submit_query()).await;
        assert!(outcome.is_err());

        assert_eq!(backend.searched().len(), 1);
        let view = controller.view();
        assert_eq!(view.transcript, vec![ChatMessage::user("land area?")]);
        assert_eq!(view.input, "");
        assert!(view.loading);
    }

    /// The echo also survives a failed search.
    #[tokio::test]
    async fn failures_are_visible_and_keep_the_question() {
        let backend = Arc::new(FakeBackend::new().with_search(Scripted::Broken));
        let mut controller = ChatController::new(backend.clone(), 3);

        controller.set_input("zoning?");
        controller.submit_query().await;

        let view = controller.view();
        assert_eq!(view.transcript, vec![ChatMessage::user("zoning?")]);
        assert_eq!(view.status, Some(StatusLine::error("Server error.")));
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn rejection_shows_detail_and_blank_input_keeps_it() {
        let backend = Arc::new(
            FakeBackend::new().with_search(Scripted::Reject(Some("Index is empty"))),
        );
        let mut controller = ChatController::new(backend.clone(), 3);

        controller.set_input("first");
        controller.submit_query().await;
        assert_eq!(controller.view().status, Some(StatusLine::error("Index is empty")));

        controller.set_input("   ");
        controller.submit_query().await;
        assert_eq!(controller.view().status, Some(StatusLine::error("Index is empty")));
        assert_eq!(backend.searched().len(), 1);
    }

    #[tokio::test]
    async fn transcript_grows_across_queries() {
        let backend = Arc::new(FakeBackend::new().with_search(Scripted::Ok(fragments(&["x"]))));
        let mut controller = ChatController::new(backend, 3);

        for question in ["one", "two", "three"] {
            controller.set_input(question);
            controller.submit_query().await;
        }

        let roles: Vec<Role> = controller.view().transcript.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }
}
