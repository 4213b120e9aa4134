//! Conversation history buffer property tests

use parla::history::{ConversationEntry, ConversationHistory, Role};

#[test]
fn test_window_never_exceeds_cap() {
    let cap = 12;
    let mut history = ConversationHistory::new(cap);

    for i in 0..30 {
        history.append(ConversationEntry::user(format!("utterance {i}")));
        assert!(history.len() <= cap);
        assert!(history.window(cap).len() <= cap);
    }

    // Most-recent entries, original chronological order
    let window = history.window(cap);
    assert_eq!(window[0].content, "utterance 18");
    assert_eq!(window[cap - 1].content, "utterance 29");
}

#[test]
fn test_window_smaller_than_buffer() {
    let mut history = ConversationHistory::new(12);
    history.append(ConversationEntry::user("one"));
    history.append(ConversationEntry::assistant("two"));
    history.append(ConversationEntry::user("three"));

    let window = history.window(2);
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].content, "two");
    assert_eq!(window[1].content, "three");

    // Window does not mutate the buffer
    assert_eq!(history.len(), 3);
}

#[test]
fn test_successful_turn_at_cap_evicts_two_oldest() {
    let mut history = ConversationHistory::new(12);
    for i in 0..6 {
        history.append(ConversationEntry::user(format!("u{i}")));
        history.append(ConversationEntry::assistant(format!("a{i}")));
    }
    assert_eq!(history.len(), 12);

    // One more successful turn appends two entries
    history.append(ConversationEntry::user("new question"));
    history.append(ConversationEntry::assistant("new answer"));

    assert_eq!(history.len(), 12);
    assert_eq!(history.entries()[0].content, "u1");
    assert_eq!(history.entries()[11].content, "new answer");
}

#[test]
fn test_deserialize_non_array_yields_empty() {
    for input in ["null", "\"hola\"", "17", "{\"role\":\"user\"}", "", "{{{"] {
        let history = ConversationHistory::deserialize(input, 12);
        assert!(history.is_empty(), "input {input:?} should yield empty");
    }
}

#[test]
fn test_deserialize_keeps_only_valid_entries_in_order() {
    let input = r#"[
        {"role": "user", "content": "primero"},
        {"role": "system", "content": "not a conversation role"},
        {"role": "assistant"},
        {"role": "assistant", "content": "segundo"},
        "just a string"
    ]"#;

    let history = ConversationHistory::deserialize(input, 12);
    assert_eq!(history.len(), 2);
    assert_eq!(history.entries()[0].role, Role::User);
    assert_eq!(history.entries()[0].content, "primero");
    assert_eq!(history.entries()[1].role, Role::Assistant);
    assert_eq!(history.entries()[1].content, "segundo");
}

#[test]
fn test_serialize_deserialize_identity() {
    let mut history = ConversationHistory::new(12);
    history.append(ConversationEntry::user("¿Dónde está la biblioteca?"));
    history.append(ConversationEntry::assistant("Está al lado del parque."));
    history.append(ConversationEntry::user("Gracias"));

    let json = history.serialize();
    let restored = ConversationHistory::deserialize(&json, 12);

    assert_eq!(restored.entries(), history.entries());
}

#[test]
fn test_deserialize_respects_cap() {
    let entries: Vec<String> = (0..20)
        .map(|i| format!("{{\"role\": \"user\", \"content\": \"m{i}\"}}"))
        .collect();
    let input = format!("[{}]", entries.join(","));

    let history = ConversationHistory::deserialize(&input, 12);
    assert_eq!(history.len(), 12);
    assert_eq!(history.entries()[0].content, "m8");
    assert_eq!(history.entries()[11].content, "m19");
}

#[test]
fn test_serialized_shape_is_role_content_objects() {
    let mut history = ConversationHistory::new(12);
    history.append(ConversationEntry::user("hola"));

    let value: serde_json::Value = serde_json::from_str(&history.serialize()).unwrap();
    assert_eq!(value[0]["role"], "user");
    assert_eq!(value[0]["content"], "hola");
}
