use crate::helpers::{
    controller, document_update, failed, fast_policy, running, success, text_update, ApiCall,
    MockCamb, RecordingTransport,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const USER: i64 = 42;
const CHAT: i64 = 4242;

#[tokio::test]
async fn test_createvoice_then_upload_creates_exactly_one_voice() {
    let camb = Arc::new(MockCamb::default());
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/createvoice Alice f 30"))
        .await;
    assert_eq!(
        transport.last_message().unwrap(),
        "Please upload the reference file now."
    );

    bot.handle_update(document_update(2, USER, CHAT, "file-1")).await;

    let creates: Vec<_> = camb
        .recorded_calls()
        .into_iter()
        .filter(|c| matches!(c, ApiCall::CreateVoice { .. }))
        .collect();
    assert_eq!(creates.len(), 1);
    let ApiCall::CreateVoice {
        voice_name,
        gender_code,
        age,
        file_path,
    } = &creates[0]
    else {
        unreachable!();
    };
    assert_eq!(voice_name, "Alice");
    assert_eq!(*gender_code, 2);
    assert_eq!(*age, 30);

    // The reply carries the new voice id and the reference file is gone.
    assert!(transport.last_message().unwrap().contains("v1"));
    assert!(!file_path.exists());
}

#[tokio::test]
async fn test_upload_without_pending_request_is_rejected_before_download() {
    let camb = Arc::new(MockCamb::default());
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(document_update(1, USER, CHAT, "file-1")).await;

    assert_eq!(
        transport.last_message().unwrap(),
        "Please use the /createvoice command first."
    );
    assert!(camb.recorded_calls().is_empty());
    assert!(transport.downloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_entry_is_consumed_even_when_creation_fails() {
    let camb = Arc::new(MockCamb {
        fail_create_voice: true,
        ..MockCamb::default()
    });
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/createvoice Alice f 30"))
        .await;
    bot.handle_update(document_update(2, USER, CHAT, "file-1")).await;
    assert_eq!(
        transport.last_message().unwrap(),
        "Failed to create voice. Please try again later."
    );

    // The failed attempt consumed the entry; a second upload must not
    // silently reuse the stale request.
    bot.handle_update(document_update(3, USER, CHAT, "file-2")).await;
    assert_eq!(
        transport.last_message().unwrap(),
        "Please use the /createvoice command first."
    );

    // Both temp reference files are gone, including the failed attempt's.
    for (_, dest) in transport.downloads.lock().unwrap().iter() {
        assert!(!dest.exists(), "temp file {} was leaked", dest.display());
    }
}

#[tokio::test]
async fn test_createvoice_validates_gender_and_age() {
    let camb = Arc::new(MockCamb::default());
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/createvoice Alice x 30"))
        .await;
    assert_eq!(
        transport.last_message().unwrap(),
        "Invalid gender. Use \"m\" for Male or \"f\" for Female."
    );

    bot.handle_update(text_update(2, USER, CHAT, "/createvoice Alice f thirty"))
        .await;
    assert_eq!(
        transport.last_message().unwrap(),
        "Invalid age. Use a whole number."
    );

    bot.handle_update(text_update(3, USER, CHAT, "/createvoice Alice"))
        .await;
    assert!(transport.last_message().unwrap().starts_with("Usage:"));

    assert!(camb.recorded_calls().is_empty());
}

#[tokio::test]
async fn test_voice_command_drives_the_full_lifecycle() {
    let camb = Arc::new(MockCamb::with_statuses(vec![
        running(),
        running(),
        success("r1"),
    ]));
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/voice \"Hello world\" 7 2 1 25"))
        .await;

    let calls = camb.recorded_calls();
    let ApiCall::CreateTts(request) = &calls[0] else {
        panic!("first call must be the submission, got {:?}", calls[0]);
    };
    assert_eq!(request.text, "Hello world");
    assert_eq!(request.voice_id, 7);
    assert_eq!(request.language, 2);
    assert_eq!(request.gender, 1);
    assert_eq!(request.age, 25);

    assert_eq!(camb.status_call_count(), 3);
    assert_eq!(*calls.last().unwrap(), ApiCall::GetResult("r1".to_string()));

    // Recording indicator shown, audio forwarded, temp file cleaned up.
    assert_eq!(*transport.recording_actions.lock().unwrap(), vec![CHAT]);
    let voice_sends = transport.voice_sends.lock().unwrap();
    assert_eq!(voice_sends.len(), 1);
    let (chat_id, path, bytes) = &voice_sends[0];
    assert_eq!(*chat_id, CHAT);
    assert_eq!(*bytes, camb.audio);
    assert!(!path.exists(), "result temp file {} was leaked", path.display());
}

#[tokio::test]
async fn test_voice_command_reports_remote_failure_generically() {
    let camb = Arc::new(MockCamb::with_statuses(vec![failed()]));
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/voice \"Hello\" 7 2 1 25"))
        .await;

    // Generic message only; no remote detail reaches the chat.
    assert_eq!(
        transport.last_message().unwrap(),
        "Failed to generate voice. Please try again later."
    );
    assert!(transport.voice_sends.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_voice_command_reports_timeout_distinctly() {
    let camb = Arc::new(MockCamb::default()); // always RUNNING
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(3));

    bot.handle_update(text_update(1, USER, CHAT, "/voice \"Hello\" 7 2 1 25"))
        .await;

    assert_eq!(camb.status_call_count(), 3);
    assert_eq!(
        transport.last_message().unwrap(),
        "Voice generation took too long. Please try again later."
    );
}

#[tokio::test]
async fn test_voice_command_usage_error() {
    let camb = Arc::new(MockCamb::default());
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/voice \"Hello\"")).await;

    assert!(transport
        .last_message()
        .unwrap()
        .contains("Usage: /voice \"<text>\" <voice_id> <language> <gender> <age>"));
    assert!(camb.recorded_calls().is_empty());
}

#[tokio::test]
async fn test_listvoices_and_listlanguages_format_entries() {
    let camb = Arc::new(MockCamb::default());
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/listvoices")).await;
    assert_eq!(
        transport.last_message().unwrap(),
        "Available Voices:\nID: 7, Name: Alice\n"
    );

    bot.handle_update(text_update(2, USER, CHAT, "/listlanguages")).await;
    assert_eq!(
        transport.last_message().unwrap(),
        "Available Languages:\nID: 1, Name: English\nID: 2, Name: Spanish\n"
    );
}

#[tokio::test]
async fn test_start_and_help_share_the_usage_text() {
    let camb = Arc::new(MockCamb::default());
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, USER, CHAT, "/start")).await;
    bot.handle_update(text_update(2, USER, CHAT, "/help")).await;

    let messages = transport.messages_for(CHAT);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], messages[1]);
    assert!(messages[0].contains("/createvoice <name> <gender> <age>"));
}

#[tokio::test]
async fn test_concurrent_pending_requests_stay_per_user() {
    let camb = Arc::new(MockCamb::default());
    let transport = Arc::new(RecordingTransport::default());
    let bot = controller(camb.clone(), transport.clone(), fast_policy(10));

    bot.handle_update(text_update(1, 1, 100, "/createvoice Alice f 30"))
        .await;
    bot.handle_update(text_update(2, 2, 200, "/createvoice Bob m 40"))
        .await;

    // User 2's upload must consume Bob's request, not Alice's.
    bot.handle_update(document_update(3, 2, 200, "file-b")).await;

    let creates: Vec<_> = camb
        .recorded_calls()
        .into_iter()
        .filter_map(|c| match c {
            ApiCall::CreateVoice {
                voice_name,
                gender_code,
                age,
                ..
            } => Some((voice_name, gender_code, age)),
            _ => None,
        })
        .collect();
    assert_eq!(creates, vec![("Bob".to_string(), 1, 40)]);

    // Alice's request is still pending for user 1.
    bot.handle_update(document_update(4, 1, 100, "file-a")).await;
    assert!(transport.messages_for(100).last().unwrap().contains("v1"));
}
