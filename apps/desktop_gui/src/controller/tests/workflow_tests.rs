use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};

use super::*;
use crossbeam_channel::bounded;
use shared::protocol::{DecryptRequest, EncryptRequest};

use crate::{
    clipboard::ClipboardError,
    controller::{
        events::UiErrorCategory,
        state::InputField,
    },
    notifications::{Notification, NotificationTiming, Presentation},
};

struct RecordingClipboard {
    writes: Rc<RefCell<Vec<String>>>,
    failure: Option<String>,
}

impl ClipboardSink for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if let Some(failure) = &self.failure {
            return Err(ClipboardError::new(failure.clone()));
        }
        self.writes.borrow_mut().push(text.to_string());
        Ok(())
    }
}

struct Harness {
    controller: WorkflowController,
    cmd_rx: Receiver<BackendCommand>,
    clipboard_writes: Rc<RefCell<Vec<String>>>,
    now: Instant,
}

fn harness_with(queue_capacity: usize, clipboard_failure: Option<&str>) -> Harness {
    let (cmd_tx, cmd_rx) = bounded(queue_capacity);
    let clipboard_writes = Rc::new(RefCell::new(Vec::new()));
    let clipboard = RecordingClipboard {
        writes: Rc::clone(&clipboard_writes),
        failure: clipboard_failure.map(str::to_string),
    };
    Harness {
        controller: WorkflowController::new(
            cmd_tx,
            Box::new(clipboard),
            NotificationCenter::new(NotificationTiming::default(), 16),
        ),
        cmd_rx,
        clipboard_writes,
        now: Instant::now(),
    }
}

fn harness() -> Harness {
    harness_with(16, None)
}

fn pem(kind: &str) -> String {
    format!(
        "-----BEGIN RSA {kind} KEY-----\n{}\n-----END RSA {kind} KEY-----",
        "MIIBCgKCAQEAx".repeat(8)
    )
}

impl Harness {
    fn click(&mut self, control: Control) {
        assert!(self.controller.handle(control, ControlEvent::Click, self.now));
    }

    fn edit_key(&mut self, role: KeyRole, text: &str) {
        let (field, control) = match role {
            KeyRole::Public => (&mut self.controller.state_mut().public_key_input, Control::PublicKeyField),
            KeyRole::Private => (&mut self.controller.state_mut().private_key_input, Control::PrivateKeyField),
        };
        *field = text.to_string();
        assert!(self.controller.handle(control, ControlEvent::Input, self.now));
    }

    fn fill_encrypt(&mut self, message: &str, public_key: &str) {
        let state = self.controller.state_mut();
        state.message_input = message.to_string();
        state.public_key_input = public_key.to_string();
    }

    fn fill_decrypt(&mut self, emojis: &str, private_key: &str) {
        let state = self.controller.state_mut();
        state.emojis_input = emojis.to_string();
        state.private_key_input = private_key.to_string();
    }

    fn queued(&self) -> Vec<BackendCommand> {
        self.cmd_rx.try_iter().collect()
    }

    fn settle(&mut self, operation: Operation, request_id: RequestId, outcome: Result<String, UiError>) {
        self.controller.process_event(
            UiEvent::OperationSettled {
                operation,
                request_id,
                outcome,
            },
            self.now,
        );
    }

    fn notifications(&self) -> Vec<(String, NotificationKind, Presentation)> {
        self.controller
            .notifications()
            .iter()
            .map(|n: &Notification| (n.text().to_string(), n.kind(), n.presentation()))
            .collect()
    }

    fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

fn remote_error(operation: Operation, message: &str) -> UiError {
    UiError::new(UiErrorCategory::Remote, operation.into(), message)
}

#[test]
fn standard_table_binds_every_control() {
    let table = HandlerTable::standard();
    assert_eq!(table.len(), 8);
    for control in [
        Control::EncryptButton,
        Control::DecryptButton,
        Control::CopyEncrypted,
        Control::CopyDecrypted,
        Control::ClearEncrypted,
        Control::ClearDecrypted,
    ] {
        assert!(table.is_bound(control, ControlEvent::Click), "{control:?}");
    }
    assert!(table.is_bound(Control::PublicKeyField, ControlEvent::Input));
    assert!(table.is_bound(Control::PrivateKeyField, ControlEvent::Input));
    assert!(!table.is_bound(Control::EncryptButton, ControlEvent::Input));
}

#[test]
fn unbound_interaction_is_ignored() {
    let mut h = harness();
    assert!(!h
        .controller
        .handle(Control::CopyEncrypted, ControlEvent::Input, h.now));
    assert!(h.controller.notifications().is_empty());
}

#[test]
fn blank_message_never_reaches_the_network() {
    for message in ["", "   ", "\n\t "] {
        let mut h = harness();
        h.fill_encrypt(message, &pem("PUBLIC"));
        h.click(Control::EncryptButton);

        assert!(h.queued().is_empty(), "{message:?}");
        assert!(!h.controller.state().is_busy(Operation::Encrypt));
        assert_eq!(
            h.notifications(),
            vec![(
                "Please enter a message to encrypt".to_string(),
                NotificationKind::Error,
                Presentation::Alert
            )]
        );
    }
}

#[test]
fn blank_public_key_never_reaches_the_network() {
    let mut h = harness();
    h.fill_encrypt("hello", "  ");
    h.click(Control::EncryptButton);

    assert!(h.queued().is_empty());
    assert!(!h.controller.state().is_busy(Operation::Encrypt));
    assert_eq!(h.notifications()[0].0, "Please provide your public key");
}

#[test]
fn missing_private_key_markers_abort_decrypt_and_focus_key_field() {
    let public_pem = pem("PUBLIC");
    for key in ["", "   ", "not a key", public_pem.as_str()] {
        let mut h = harness();
        h.fill_decrypt("🔒🙂", key);
        h.click(Control::DecryptButton);

        assert!(h.queued().is_empty(), "{key:?}");
        assert!(!h.controller.state().is_busy(Operation::Decrypt));
        assert_eq!(
            h.controller.state_mut().take_focus_request(),
            Some(InputField::PrivateKey)
        );
        assert_eq!(h.notifications().len(), 1);
        assert_eq!(h.notifications()[0].1, NotificationKind::Error);
    }
}

#[test]
fn blank_emojis_abort_decrypt_without_moving_focus() {
    let mut h = harness();
    h.fill_decrypt(" ", &pem("PRIVATE"));
    h.click(Control::DecryptButton);

    assert!(h.queued().is_empty());
    assert_eq!(h.controller.state().focus_request(), None);
    assert_eq!(h.notifications()[0].0, "Please enter emojis to decrypt");
}

#[test]
fn successful_encrypt_renders_copies_and_notifies() {
    let mut h = harness();
    h.fill_encrypt("  meet at noon ", &pem("PUBLIC"));
    h.click(Control::EncryptButton);

    let queued = h.queued();
    assert_eq!(queued.len(), 1);
    let request_id = queued[0].request_id();
    assert_eq!(
        queued[0],
        BackendCommand::Encrypt {
            request_id,
            request: EncryptRequest {
                message: "meet at noon".to_string(),
                public_key: pem("PUBLIC"),
            },
        }
    );
    assert!(h.controller.state().is_busy(Operation::Encrypt));
    assert_eq!(
        h.controller.state().button_label(Operation::Encrypt),
        "Processing..."
    );
    assert!(!h.controller.state().encrypted_output.is_visible());

    h.settle(Operation::Encrypt, request_id, Ok("🔒🙂".to_string()));

    let state = h.controller.state();
    assert!(!state.is_busy(Operation::Encrypt));
    assert_eq!(state.button_label(Operation::Encrypt), "Encrypt to Emojis");
    assert!(state.encrypted_output.is_visible());
    assert_eq!(state.encrypted_output.text(), "🔒🙂");
    assert_eq!(*h.clipboard_writes.borrow(), vec!["🔒🙂".to_string()]);
    assert_eq!(
        h.notifications(),
        vec![(
            "Message encrypted and copied to clipboard!".to_string(),
            NotificationKind::Success,
            Presentation::Alert
        )]
    );
}

#[test]
fn clipboard_failure_after_encrypt_keeps_success_notification() {
    let mut h = harness_with(16, Some("clipboard unavailable"));
    h.fill_encrypt("hi", &pem("PUBLIC"));
    h.click(Control::EncryptButton);
    let request_id = h.queued()[0].request_id();

    h.settle(Operation::Encrypt, request_id, Ok("😀".to_string()));

    assert!(h.controller.state().encrypted_output.is_visible());
    assert_eq!(
        h.notifications(),
        vec![(
            "Message encrypted and copied to clipboard!".to_string(),
            NotificationKind::Success,
            Presentation::Alert
        )]
    );
}

#[test]
fn successful_decrypt_renders_without_copying() {
    let mut h = harness();
    h.fill_decrypt("🔒🙂", &pem("PRIVATE"));
    h.click(Control::DecryptButton);

    let queued = h.queued();
    let request_id = queued[0].request_id();
    assert_eq!(
        queued[0],
        BackendCommand::Decrypt {
            request_id,
            request: DecryptRequest {
                emojis: "🔒🙂".to_string(),
                private_key: pem("PRIVATE"),
            },
        }
    );

    h.settle(Operation::Decrypt, request_id, Ok("meet at noon".to_string()));

    let state = h.controller.state();
    assert!(!state.is_busy(Operation::Decrypt));
    assert!(state.decrypted_output.is_visible());
    assert_eq!(state.decrypted_output.text(), "meet at noon");
    assert!(h.clipboard_writes.borrow().is_empty());
    assert_eq!(h.notifications()[0].0, "Message decrypted successfully!");
}

#[test]
fn rejected_decrypt_notifies_reason_and_keeps_panel_hidden() {
    let mut h = harness();
    h.fill_decrypt("🔒🙂", &pem("PRIVATE"));
    h.click(Control::DecryptButton);
    let request_id = h.queued()[0].request_id();

    h.settle(
        Operation::Decrypt,
        request_id,
        Err(remote_error(Operation::Decrypt, "bad key")),
    );

    let state = h.controller.state();
    assert!(!state.is_busy(Operation::Decrypt));
    assert!(!state.decrypted_output.is_visible());
    let notifications = h.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].1, NotificationKind::Error);
    assert!(notifications[0].0.contains("bad key"));
    assert_eq!(notifications[0].0, "Decryption failed: bad key");
}

#[test]
fn transport_failure_clears_busy_state() {
    let mut h = harness();
    h.fill_encrypt("hi", &pem("PUBLIC"));
    h.click(Control::EncryptButton);
    let request_id = h.queued()[0].request_id();

    h.settle(
        Operation::Encrypt,
        request_id,
        Err(UiError::new(
            UiErrorCategory::Transport,
            UiErrorContext::Encrypt,
            "error sending request: connection refused",
        )),
    );

    assert!(!h.controller.state().is_busy(Operation::Encrypt));
    assert!(!h.controller.state().encrypted_output.is_visible());
    assert_eq!(
        h.notifications()[0].0,
        "Encryption failed: error sending request: connection refused"
    );
}

#[test]
fn disconnected_backend_rolls_back_busy_state() {
    let mut h = harness();
    let cmd_rx = std::mem::replace(&mut h.cmd_rx, bounded(1).1);
    drop(cmd_rx);

    h.fill_encrypt("hi", &pem("PUBLIC"));
    h.click(Control::EncryptButton);

    assert!(!h.controller.state().is_busy(Operation::Encrypt));
    let notifications = h.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0]
        .0
        .starts_with("Encryption failed: Backend command processor disconnected"));
}

#[test]
fn full_queue_rolls_back_only_the_rejected_request() {
    let mut h = harness_with(1, None);
    h.fill_encrypt("first", &pem("PUBLIC"));
    h.click(Control::EncryptButton);
    h.fill_encrypt("second", &pem("PUBLIC"));
    h.click(Control::EncryptButton);

    assert_eq!(h.controller.state().encrypt.in_flight(), 1);
    assert!(h.notifications()[0].0.contains("UI command queue is full"));

    let request_id = h.queued()[0].request_id();
    h.settle(Operation::Encrypt, request_id, Ok("😀".to_string()));
    assert!(!h.controller.state().is_busy(Operation::Encrypt));
}

#[test]
fn overlapping_requests_keep_busy_until_all_settle_and_newest_result_wins() {
    let mut h = harness();
    h.fill_encrypt("first", &pem("PUBLIC"));
    h.click(Control::EncryptButton);
    h.fill_encrypt("second", &pem("PUBLIC"));
    h.click(Control::EncryptButton);

    let ids: Vec<_> = h.queued().iter().map(BackendCommand::request_id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids[0] < ids[1]);

    h.settle(Operation::Encrypt, ids[1], Ok("🅱️".to_string()));
    assert!(h.controller.state().is_busy(Operation::Encrypt));
    assert_eq!(h.controller.state().encrypted_output.text(), "🅱️");

    h.settle(Operation::Encrypt, ids[0], Ok("🅰️".to_string()));
    assert!(!h.controller.state().is_busy(Operation::Encrypt));
    assert_eq!(h.controller.state().encrypted_output.text(), "🅱️");
    assert_eq!(*h.clipboard_writes.borrow(), vec!["🅱️".to_string()]);
}

#[test]
fn overlapping_failures_are_each_reported() {
    let mut h = harness();
    h.fill_decrypt("🔒", &pem("PRIVATE"));
    h.click(Control::DecryptButton);
    h.click(Control::DecryptButton);
    let ids: Vec<_> = h.queued().iter().map(BackendCommand::request_id).collect();

    h.settle(
        Operation::Decrypt,
        ids[0],
        Err(remote_error(Operation::Decrypt, "bad key")),
    );
    h.settle(
        Operation::Decrypt,
        ids[1],
        Err(remote_error(Operation::Decrypt, "padding error")),
    );

    let texts: Vec<_> = h.notifications().into_iter().map(|n| n.0).collect();
    assert_eq!(
        texts,
        vec![
            "Decryption failed: bad key".to_string(),
            "Decryption failed: padding error".to_string()
        ]
    );
}

#[test]
fn identical_failures_are_each_reported() {
    let mut h = harness();
    h.fill_decrypt("🔒", &pem("PRIVATE"));
    h.click(Control::DecryptButton);
    h.click(Control::DecryptButton);
    let ids: Vec<_> = h.queued().iter().map(BackendCommand::request_id).collect();

    for request_id in ids {
        h.settle(
            Operation::Decrypt,
            request_id,
            Err(remote_error(Operation::Decrypt, "bad key")),
        );
    }

    assert!(!h.controller.state().is_busy(Operation::Decrypt));
    let texts: Vec<_> = h.notifications().into_iter().map(|n| n.0).collect();
    assert_eq!(
        texts,
        vec![
            "Decryption failed: bad key".to_string(),
            "Decryption failed: bad key".to_string()
        ]
    );
}

#[test]
fn each_rejected_submit_gets_its_own_notification() {
    let mut h = harness();
    h.fill_encrypt("", &pem("PUBLIC"));
    h.click(Control::EncryptButton);
    h.advance(Duration::from_millis(500));
    h.click(Control::EncryptButton);

    assert!(h.queued().is_empty());
    let texts: Vec<_> = h.notifications().into_iter().map(|n| n.0).collect();
    assert_eq!(
        texts,
        vec![
            "Please enter a message to encrypt".to_string(),
            "Please enter a message to encrypt".to_string()
        ]
    );
}

#[test]
fn repeated_successes_each_notify() {
    let mut h = harness();
    h.fill_decrypt("🔒🙂", &pem("PRIVATE"));
    for _ in 0..2 {
        h.click(Control::DecryptButton);
        let request_id = h.queued()[0].request_id();
        h.settle(Operation::Decrypt, request_id, Ok("meet at noon".to_string()));
    }

    let successes = h
        .notifications()
        .into_iter()
        .filter(|n| n.0 == "Message decrypted successfully!")
        .count();
    assert_eq!(successes, 2);
}

#[test]
fn new_controller_starts_idle_while_connecting() {
    let h = harness();
    let state = h.controller.state();
    assert_eq!(state.status, "Connecting to backend worker...");
    assert!(!state.is_busy(Operation::Encrypt));
    assert!(!state.is_busy(Operation::Decrypt));
    assert_eq!(state.focus_request(), None);
    assert!(!state.encrypted_output.is_visible());
}

#[test]
fn settlement_for_unknown_request_is_ignored() {
    let mut h = harness();
    h.settle(Operation::Encrypt, RequestId(99), Ok("😀".to_string()));

    assert!(!h.controller.state().encrypted_output.is_visible());
    assert!(h.notifications().is_empty());
}

#[test]
fn clear_empties_and_hides_panel_every_time() {
    let mut h = harness();
    h.controller
        .state_mut()
        .decrypted_output
        .reveal("secret plan");

    for _ in 0..2 {
        h.click(Control::ClearDecrypted);
        let panel = &h.controller.state().decrypted_output;
        assert_eq!(panel.text(), "");
        assert!(!panel.is_visible());
    }

    h.click(Control::ClearEncrypted);
    assert!(!h.controller.state().encrypted_output.is_visible());
    assert!(h
        .notifications()
        .iter()
        .all(|(_, kind, presentation)| *kind == NotificationKind::Success
            && *presentation == Presentation::Toast));
}

#[test]
fn copy_writes_panel_text_and_confirms_with_toast() {
    let mut h = harness();
    h.controller
        .state_mut()
        .encrypted_output
        .reveal("🔒🙂");
    h.click(Control::CopyEncrypted);

    assert_eq!(*h.clipboard_writes.borrow(), vec!["🔒🙂".to_string()]);
    assert_eq!(
        h.notifications(),
        vec![(
            "Encrypted emojis copied to clipboard!".to_string(),
            NotificationKind::Success,
            Presentation::Toast
        )]
    );
}

#[test]
fn copy_of_empty_panel_does_nothing() {
    let mut h = harness();
    h.click(Control::CopyDecrypted);

    assert!(h.clipboard_writes.borrow().is_empty());
    assert!(h.notifications().is_empty());
}

#[test]
fn copy_failure_is_reported_in_error_toast() {
    let mut h = harness_with(16, Some("no display"));
    h.controller
        .state_mut()
        .decrypted_output
        .reveal("meet at noon");
    h.click(Control::CopyDecrypted);

    assert_eq!(
        h.notifications(),
        vec![(
            "Failed to copy: no display".to_string(),
            NotificationKind::Error,
            Presentation::Toast
        )]
    );
}

#[test]
fn suspicious_key_tints_field_and_warns_without_blocking() {
    let mut h = harness();
    h.edit_key(KeyRole::Public, "-----BEGIN RSA PUBLIC KEY-----");

    assert_eq!(
        h.controller.state().key_indicator(KeyRole::Public),
        KeyIndicator::Invalid
    );
    assert_eq!(
        h.notifications()[0].0,
        "Warning: This doesn't look like a valid public RSA key"
    );

    h.controller.state_mut().message_input = "hi".to_string();
    h.click(Control::EncryptButton);
    assert_eq!(h.queued().len(), 1);
}

#[test]
fn plausible_key_turns_field_valid_silently() {
    let mut h = harness();
    h.edit_key(KeyRole::Private, &pem("PRIVATE"));

    assert_eq!(
        h.controller.state().key_indicator(KeyRole::Private),
        KeyIndicator::Valid
    );
    assert!(h.notifications().is_empty());
}

#[test]
fn blank_key_edit_leaves_indicator_untouched() {
    let mut h = harness();
    h.edit_key(KeyRole::Private, "short");
    h.edit_key(KeyRole::Private, "");

    assert_eq!(
        h.controller.state().key_indicator(KeyRole::Private),
        KeyIndicator::Invalid
    );
    assert_eq!(h.notifications().len(), 1);
}

#[test]
fn repeated_key_warnings_do_not_stack() {
    let mut h = harness();
    for text in ["-", "--", "---", "----"] {
        h.edit_key(KeyRole::Public, text);
        h.advance(Duration::from_millis(120));
    }
    assert_eq!(h.notifications().len(), 1);
}

#[test]
fn backend_startup_error_is_surfaced() {
    let mut h = harness();
    h.controller.process_event(
        UiEvent::Error(UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: failed to build runtime: out of threads",
        )),
        h.now,
    );

    assert!(h.controller.state().status.starts_with("Unexpected error:"));
    assert_eq!(h.notifications()[0].1, NotificationKind::Error);
}

#[test]
fn drained_events_apply_in_order() {
    let mut h = harness();
    let (ui_tx, ui_rx) = bounded(4);
    ui_tx
        .send(UiEvent::Info("Backend worker ready".to_string()))
        .expect("send");
    h.controller.drain_events(&ui_rx, h.now);
    assert_eq!(h.controller.state().status, "Backend worker ready");
}

mod end_to_end {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use client_core::HttpCipherClient;
    use tokio::net::TcpListener;

    use crate::backend_bridge::runtime;

    async fn encrypt_handler(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        let message = body["message"].as_str().unwrap_or_default();
        Json(serde_json::json!({ "emojis": format!("🔒{}", message.len()) }))
    }

    async fn decrypt_handler() -> (StatusCode, Json<serde_json::Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "bad key" })),
        )
    }

    async fn spawn_cipher_server() -> std::io::Result<String> {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new()
            .route("/encrypt", post(encrypt_handler))
            .route("/decrypt", post(decrypt_handler));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}"))
    }

    fn wait_for_settlement(
        controller: &mut WorkflowController,
        ui_rx: &Receiver<UiEvent>,
        operation: Operation,
    ) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while controller.state().is_busy(operation) {
            assert!(Instant::now() < deadline, "{operation} never settled");
            if let Ok(event) = ui_rx.recv_timeout(Duration::from_millis(50)) {
                controller.process_event(event, Instant::now());
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn flows_run_against_http_service() {
        let server_url = spawn_cipher_server().await.expect("spawn server");
        let service = Arc::new(HttpCipherClient::new(server_url).expect("client"));
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = bounded(64);
        let _worker = runtime::launch(service, cmd_rx, ui_tx);

        let clipboard_writes = Rc::new(RefCell::new(Vec::new()));
        let mut controller = WorkflowController::new(
            cmd_tx,
            Box::new(RecordingClipboard {
                writes: Rc::clone(&clipboard_writes),
                failure: None,
            }),
            NotificationCenter::new(NotificationTiming::default(), 16),
        );

        {
            let state = controller.state_mut();
            state.message_input = "hello".to_string();
            state.public_key_input = pem("PUBLIC");
        }
        assert!(controller.handle(Control::EncryptButton, ControlEvent::Click, Instant::now()));
        wait_for_settlement(&mut controller, &ui_rx, Operation::Encrypt);

        assert_eq!(controller.state().encrypted_output.text(), "🔒5");
        assert_eq!(*clipboard_writes.borrow(), vec!["🔒5".to_string()]);

        {
            let state = controller.state_mut();
            state.emojis_input = "🔒5".to_string();
            state.private_key_input = pem("PRIVATE");
        }
        assert!(controller.handle(Control::DecryptButton, ControlEvent::Click, Instant::now()));
        wait_for_settlement(&mut controller, &ui_rx, Operation::Decrypt);

        assert!(!controller.state().decrypted_output.is_visible());
        assert!(controller
            .notifications()
            .iter()
            .any(|n| n.text() == "Decryption failed: bad key"));
    }
}
