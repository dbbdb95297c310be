//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port on its own thread, then drives
//! the client over real HTTP: single calls through the ureq transport,
//! batches through the reqwest pool on a separate Tokio runtime.

use std::io::{Read, Write};

use nylas_core::{params, ApiError, NylasClient, Options, Params};
use serde_json::json;

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// Answer a single request with `response`, verbatim.
fn serve_once(response: Vec<u8>) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(&response).unwrap();
    });

    format!("http://{addr}")
}

/// A base URL nothing listens on: bind, then drop the listener.
fn unreachable_base() -> String {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    format!("http://{addr}")
}

fn client(base_url: &str) -> NylasClient {
    NylasClient::new(
        Options::new(mock_server::CLIENT_ID, "secret")
            .access_token("token-abc")
            .account_id(mock_server::ACCOUNT_ID)
            .api_url(base_url),
    )
    .unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn event_lifecycle() {
    let base = start_server();
    let client = client(&base);
    let rt = runtime();

    // Step 1: list — should be empty.
    let events = client.events().list(&params(json!({}))).unwrap();
    assert_eq!(events, json!([]));

    // Step 2: create two events.
    let mut ids = Vec::new();
    for title in ["Planning", "Retro"] {
        let created = client
            .events()
            .add(&params(json!({
                "calendar_id": mock_server::CALENDAR_ID,
                "title": title,
                "when": {"start_time": 1_625_097_600, "end_time": 1_625_101_200},
                "notify_participants": false,
            })))
            .unwrap();
        assert_eq!(created["title"], title);
        assert!(created.get("notify_participants").is_none());
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    // Step 3: update the first.
    let updated = client
        .events()
        .update(&params(json!({
            "id": ids[0],
            "calendar_id": mock_server::CALENDAR_ID,
            "title": "Planning v2",
        })))
        .unwrap();
    assert_eq!(updated["title"], "Planning v2");

    // Step 4: RSVP with the configured account id.
    let replied = client
        .events()
        .rsvp(&params(json!({"event_id": ids[1], "status": "maybe"})))
        .unwrap();
    assert_eq!(replied["rsvp_status"], "maybe");

    // Step 5: pooled get, one unknown id in the middle.
    let items = vec![
        params(json!({"id": ids[0]})),
        params(json!({"id": "missing"})),
        params(json!({"id": ids[1]})),
    ];
    let outcomes = rt.block_on(client.events().get(&items)).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].id, ids[0]);
    assert_eq!(outcomes[0].result.as_ref().unwrap()["title"], "Planning v2");
    assert_eq!(outcomes[1].id, "missing");
    assert!(matches!(outcomes[1].result, Err(ApiError::NotFound)));
    assert_eq!(outcomes[2].result.as_ref().unwrap()["rsvp_status"], "maybe");

    // Step 6: pooled delete.
    let items: Vec<_> = ids.iter().map(|id| params(json!({"id": id}))).collect();
    let outcomes = rt.block_on(client.events().delete(&items)).unwrap();
    assert!(outcomes.iter().all(|o| o.is_ok()));

    // Step 7: count — should be zero again.
    let count = client.events().list(&params(json!({"view": "count"}))).unwrap();
    assert_eq!(count, json!({"count": 0}));
}

#[test]
fn invalid_params_never_reach_the_server() {
    let base = start_server();
    let client = client(&base);

    let err = client
        .events()
        .add(&params(json!({"calendar_id": mock_server::CALENDAR_ID})))
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(e) if e.path == "when"));

    let events = client.events().list(&params(json!({}))).unwrap();
    assert_eq!(events, json!([]));
}

#[test]
fn server_errors_are_mapped() {
    let base = start_server();
    let client = client(&base);

    let err = client
        .events()
        .add(&params(json!({
            "calendar_id": "unknown-calendar",
            "when": {"time": 1_625_097_600},
        })))
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 400, ref body } if body == "Invalid calendar_id"));

    let err = client.management().get_account("nobody").unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn messages_roundtrip() {
    let base = start_server();
    let client = client(&base);
    let rt = runtime();

    let unread = client.messages().list(&params(json!({"unread": true}))).unwrap();
    assert_eq!(unread.as_array().unwrap().len(), 1);

    let updated = client
        .messages()
        .update(mock_server::MESSAGE_ID, &params(json!({"unread": false, "starred": true})))
        .unwrap();
    assert_eq!(updated["unread"], false);
    assert_eq!(updated["starred"], true);

    let unchanged = client
        .messages()
        .update(mock_server::MESSAGE_ID, &Params::new())
        .unwrap();
    assert_eq!(unchanged["starred"], true);

    let raw = client.messages().raw(mock_server::MESSAGE_ID).unwrap();
    assert_eq!(raw.subject.as_deref(), Some("Quarterly numbers"));
    assert_eq!(raw.from, vec!["jane@example.com"]);
    assert_eq!(raw.raw, mock_server::RAW_MESSAGE.as_bytes());

    let outcomes = rt
        .block_on(client.messages().get(&[mock_server::MESSAGE_ID], true))
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    let message = outcomes[0].result.as_ref().unwrap();
    assert!(message["headers"]["Message-Id"].is_string());
}

#[test]
fn hosted_and_management() {
    let base = start_server();
    let client = client(&base);

    let token = client.hosted().exchange_code("abc").unwrap();
    assert_eq!(token["access_token"], "token-abc");
    assert!(!token["client_id"].as_str().unwrap().is_empty());

    let revoked = client.hosted().revoke().unwrap();
    assert_eq!(revoked["success"], true);

    let account = client.management().account_info().unwrap();
    assert_eq!(account["id"], mock_server::ACCOUNT_ID);

    let accounts = client.management().list_accounts(&params(json!({"limit": 10}))).unwrap();
    assert_eq!(accounts.as_array().unwrap().len(), 1);

    client.management().cancel_account(mock_server::ACCOUNT_ID).unwrap();
    let account = client.management().get_account(mock_server::ACCOUNT_ID).unwrap();
    assert_eq!(account["billing_state"], "cancelled");

    client.management().reactivate_account(mock_server::ACCOUNT_ID).unwrap();
    let account = client.management().get_account(mock_server::ACCOUNT_ID).unwrap();
    assert_eq!(account["billing_state"], "paid");

    let app = client
        .management()
        .update_application(&params(json!({"application_name": "Renamed"})))
        .unwrap();
    assert_eq!(app["application_name"], "Renamed");
    assert_eq!(client.management().application_details().unwrap()["application_name"], "Renamed");
}

#[test]
fn calendars_and_contacts() {
    let base = start_server();
    let client = client(&base);
    let rt = runtime();

    let calendar = client
        .calendars()
        .add(&params(json!({"name": "Side project", "timezone": "Europe/Dublin"})))
        .unwrap();
    let calendar_id = calendar["id"].as_str().unwrap().to_string();

    let renamed = client
        .calendars()
        .update(&calendar_id, &params(json!({"name": "Main project"})))
        .unwrap();
    assert_eq!(renamed["name"], "Main project");

    let busy = client
        .calendars()
        .free_busy(&params(json!({
            "start_time": 1_625_097_600,
            "end_time": 1_625_184_000,
            "emails": ["jane@example.com", "bob@example.com"],
        })))
        .unwrap();
    assert_eq!(busy.as_array().unwrap().len(), 2);

    let outcomes = rt
        .block_on(client.calendars().get(&[mock_server::CALENDAR_ID, calendar_id.as_str()]))
        .unwrap();
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let contact = client
        .contacts()
        .add(&params(json!({
            "given_name": "Bob",
            "emails": [{"type": "work", "email": "bob@example.com"}],
        })))
        .unwrap();
    let contact_id = contact["id"].as_str().unwrap().to_string();

    let outcomes = rt
        .block_on(client.contacts().delete(&[contact_id.as_str(), "missing"]))
        .unwrap();
    assert!(outcomes[0].is_ok());
    assert!(matches!(outcomes[1].result, Err(ApiError::NotFound)));

    let count = client.contacts().list(&params(json!({"view": "count"}))).unwrap();
    assert_eq!(count, json!({"count": 0}));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let client = client(&unreachable_base());

    let err = client.management().account_info().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn pool_reports_transport_errors_per_item() {
    let live = client(&start_server());
    let dead = client(&unreachable_base());

    let mut requests = live.calendars().build_get(&[mock_server::CALENDAR_ID]).unwrap();
    requests.extend(dead.calendars().build_get(&[mock_server::CALENDAR_ID]).unwrap());
    let ids = vec!["live".to_string(), "dead".to_string()];

    let outcomes = runtime().block_on(live.pool(ids, requests)).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].id, "live");
    assert_eq!(outcomes[0].result.as_ref().unwrap()["name"], "Work");
    assert_eq!(outcomes[1].id, "dead");
    assert!(matches!(outcomes[1].result, Err(ApiError::Transport(_))));
}

#[test]
fn raw_message_larger_than_ten_mebibytes() {
    let mut message = b"From: Jane Doe <jane@example.com>\r\n\
To: bob@example.com\r\n\
Subject: Site survey\r\n\
Message-ID: <survey@example.com>\r\n\
Content-Type: text/plain; charset=us-ascii\r\n\
\r\n"
        .to_vec();
    let line = format!("{}\r\n", "x".repeat(76));
    while message.len() <= 11 * 1024 * 1024 {
        message.extend_from_slice(line.as_bytes());
    }

    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: message/rfc822\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        message.len()
    )
    .into_bytes();
    response.extend_from_slice(&message);

    let client = client(&serve_once(response));
    let raw = client.messages().raw("m1").unwrap();
    assert_eq!(raw.subject.as_deref(), Some("Site survey"));
    assert_eq!(raw.from, vec!["jane@example.com"]);
    assert_eq!(raw.raw.len(), message.len());
}
