//! End-to-end behaviour of the chat widget controller

mod common;

use std::sync::Arc;

use arogya_core::{
    BusyPolicy, Change, ChatWidget, Entry, HttpReplyService, Message, Sender, Submission,
    WidgetConfig,
};
use common::{chat_server, ScriptedService, Step, ERROR_TEXT};
use serde_json::json;

fn widget_with(service: Arc<ScriptedService>, policy: BusyPolicy) -> ChatWidget {
    let config = WidgetConfig {
        busy_policy: policy,
        ..WidgetConfig::default()
    };
    let mut widget = ChatWidget::attach(config, service);
    // drop the welcome message from the journal
    widget.transcript_mut().take_changes();
    widget
}

fn last_ai_text(widget: &ChatWidget) -> String {
    let last = widget.transcript().last_message().expect("transcript has messages");
    assert_eq!(last.sender, Sender::Ai);
    last.text.clone()
}

#[test]
fn attach_renders_welcome_without_network() {
    let service = Arc::new(ScriptedService::default());
    let widget = ChatWidget::attach(WidgetConfig::default(), service.clone());

    assert_eq!(
        widget.transcript().entries(),
        &[Entry::Message(Message::ai(
            "Hello! I'm Arogya AI. What is your primary health goal today?"
        ))]
    );
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn blank_input_does_nothing() {
    let service = Arc::new(ScriptedService::default());
    let mut widget = widget_with(service.clone(), BusyPolicy::Reject);

    for raw in ["", "   ", "\t\n  "] {
        widget.input_mut().set(raw);
        assert!(matches!(widget.submit_input(), Submission::Empty));
        assert!(!widget.send(raw).await);
    }

    assert!(widget.transcript_mut().take_changes().is_empty());
    assert_eq!(widget.transcript().len(), 1);
    assert_eq!(service.call_count(), 0);
    // no UI change, so the input keeps what was typed
    assert_eq!(widget.input().text(), "\t\n  ");
}

#[tokio::test]
async fn user_message_renders_before_the_single_call() {
    let service = Arc::new(ScriptedService::new([Step::Reply("Drink water")]));
    let mut widget = widget_with(service.clone(), BusyPolicy::Reject);

    widget.input_mut().set("  How much water?  ");
    let request = widget.submit_input().into_request().expect("dispatched");

    // rendered and cleared, nothing on the wire yet
    assert_eq!(service.call_count(), 0);
    assert!(widget.input().is_empty());
    assert_eq!(
        widget.transcript_mut().take_changes(),
        vec![
            Change::Appended(Entry::Message(Message::user("How much water?"))),
            Change::Appended(Entry::Placeholder { ticket: request.ticket() }),
        ]
    );
    assert!(widget.is_awaiting_reply());

    let ticket = request.ticket();
    let reply = request.run().await;
    assert_eq!(service.calls(), vec!["How much water?".to_string()]);

    assert!(widget.finish(reply).is_none());
    assert_eq!(
        widget.transcript_mut().take_changes(),
        vec![
            Change::Removed(ticket),
            Change::Appended(Entry::Message(Message::ai("Drink water"))),
        ]
    );
    assert!(!widget.is_awaiting_reply());
    assert!(!widget.transcript().has_placeholder());
}

#[tokio::test]
async fn failures_render_the_fixed_error_message() {
    let service = Arc::new(ScriptedService::new([Step::Status(500), Step::Undecodable]));
    let mut widget = widget_with(service.clone(), BusyPolicy::Reject);

    assert!(widget.send("first").await);
    assert_eq!(last_ai_text(&widget), ERROR_TEXT);

    assert!(widget.send("second").await);
    assert_eq!(last_ai_text(&widget), ERROR_TEXT);

    let changes = widget.transcript_mut().take_changes();
    let removals = changes.iter().filter(|c| matches!(c, Change::Removed(_))).count();
    assert_eq!(removals, 2);
    assert_eq!(widget.stats().failures, 2);
    assert_eq!(widget.stats().sent, 2);
    assert_eq!(service.call_count(), 2);
}

#[tokio::test]
async fn busy_widget_rejects_second_submission() {
    let service = Arc::new(ScriptedService::new([Step::Reply("ok")]));
    let mut widget = widget_with(service.clone(), BusyPolicy::Reject);

    let first = widget.submit("one").into_request().unwrap();
    widget.transcript_mut().take_changes();

    widget.input_mut().set("two");
    assert!(matches!(widget.submit_input(), Submission::Busy));
    assert!(widget.transcript_mut().take_changes().is_empty());
    assert_eq!(widget.input().text(), "two");

    let reply = first.run().await;
    assert!(widget.finish(reply).is_none());
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn queued_submission_waits_for_previous_reply() {
    let service = Arc::new(ScriptedService::new([Step::Reply("first reply"), Step::Reply("second reply")]));
    let mut widget = widget_with(service.clone(), BusyPolicy::Queue);

    let first = widget.submit("one").into_request().unwrap();
    assert!(matches!(widget.submit("two"), Submission::Queued { position: 1 }));
    assert_eq!(widget.queued_len(), 1);

    // only the first user message and one placeholder are on screen
    let users: Vec<_> = widget
        .transcript()
        .messages()
        .filter(|m| m.sender == Sender::User)
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(users, vec!["one"]);

    let second = widget.finish(first.run().await).expect("queued request dispatched");
    assert_eq!(second.message(), "two");
    assert!(widget.finish(second.run().await).is_none());

    let texts: Vec<_> = widget.transcript().messages().skip(1).map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "first reply", "two", "second reply"]);
    assert_eq!(service.calls(), vec!["one".to_string(), "two".to_string()]);
}

#[tokio::test]
async fn mismatched_reply_leaves_outstanding_placeholder() {
    let service = Arc::new(ScriptedService::new([Step::Reply("late")]));
    let mut widget = widget_with(service, BusyPolicy::Reject);

    let request = widget.submit("hello").into_request().unwrap();
    let mut reply = request.run().await;
    reply.ticket += 100;

    widget.finish(reply);
    // the real placeholder is untouched and the widget still awaits its reply
    assert!(widget.transcript().has_placeholder());
    assert!(widget.is_awaiting_reply());
    assert_eq!(last_text(&widget), "late");
}

fn last_text(widget: &ChatWidget) -> &str {
    &widget.transcript().last_message().unwrap().text
}

#[tokio::test]
async fn suggestion_chip_sends_its_text() {
    let service = Arc::new(ScriptedService::new([Step::Reply("Here is a plan")]));
    let mut widget = widget_with(service.clone(), BusyPolicy::Reject);

    let request = widget
        .use_suggestion("Create a meal plan for weight loss")
        .into_request()
        .unwrap();
    widget.finish(request.run().await);

    assert_eq!(service.calls(), vec!["Create a meal plan for weight loss".to_string()]);
    assert_eq!(last_ai_text(&widget), "Here is a plan");
}

#[tokio::test]
async fn rejected_suggestion_keeps_unsent_draft() {
    let service = Arc::new(ScriptedService::new([Step::Reply("ok")]));
    let mut widget = widget_with(service.clone(), BusyPolicy::Reject);

    let first = widget.submit("first").into_request().unwrap();
    widget.transcript_mut().take_changes();

    widget.input_mut().set("my unsent draft");
    assert!(matches!(
        widget.use_suggestion("Create a meal plan for weight loss"),
        Submission::Busy
    ));
    assert_eq!(widget.input().text(), "my unsent draft");
    assert!(widget.transcript_mut().take_changes().is_empty());

    widget.finish(first.run().await);
    assert_eq!(service.calls(), vec!["first".to_string()]);
}

#[tokio::test]
async fn http_backend_reply_is_rendered() {
    let server = chat_server(200, json!({ "reply": "Drink water" })).await;
    let service = Arc::new(HttpReplyService::new(&format!("{}/chat", server.uri())));
    let mut widget = ChatWidget::attach(WidgetConfig::default(), service);

    assert!(widget.send("How much water should I drink?").await);
    assert_eq!(last_ai_text(&widget), "Drink water");
}

#[tokio::test]
async fn http_500_renders_error_regardless_of_body() {
    let server = chat_server(500, json!({ "reply": "this should never be shown" })).await;
    let service = Arc::new(HttpReplyService::new(&format!("{}/chat", server.uri())));
    let mut widget = ChatWidget::attach(WidgetConfig::default(), service);

    assert!(widget.send("hi").await);
    assert_eq!(last_ai_text(&widget), ERROR_TEXT);
    assert!(!widget.transcript().has_placeholder());
}
