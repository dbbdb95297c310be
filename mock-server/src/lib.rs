use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const CLIENT_ID: &str = "mock-client";
pub const ACCOUNT_ID: &str = "acc-1";
pub const CALENDAR_ID: &str = "cal-1";
pub const MESSAGE_ID: &str = "msg-1";

pub const RAW_MESSAGE: &str = "From: Jane Doe <jane@example.com>\r\n\
To: bob@example.com\r\n\
Subject: Quarterly numbers\r\n\
Message-ID: <msg-1@example.com>\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Numbers attached.\r\n";

#[derive(Default)]
pub struct Store {
    events: BTreeMap<String, Value>,
    messages: BTreeMap<String, Value>,
    calendars: BTreeMap<String, Value>,
    contacts: BTreeMap<String, Value>,
    accounts: BTreeMap<String, Value>,
    application: Value,
}

impl Store {
    fn seeded() -> Self {
        let mut store = Store {
            application: json!({
                "application_name": "Mock App",
                "redirect_uris": ["http://localhost/callback"],
            }),
            ..Store::default()
        };
        store.accounts.insert(
            ACCOUNT_ID.to_string(),
            json!({
                "id": ACCOUNT_ID,
                "account_id": ACCOUNT_ID,
                "email_address": "jane@example.com",
                "provider": "gmail",
                "billing_state": "paid",
                "sync_state": "running",
            }),
        );
        store.calendars.insert(
            CALENDAR_ID.to_string(),
            json!({
                "id": CALENDAR_ID,
                "object": "calendar",
                "account_id": ACCOUNT_ID,
                "name": "Work",
                "read_only": false,
            }),
        );
        store.messages.insert(
            MESSAGE_ID.to_string(),
            json!({
                "id": MESSAGE_ID,
                "object": "message",
                "account_id": ACCOUNT_ID,
                "subject": "Quarterly numbers",
                "from": [{"email": "jane@example.com", "name": "Jane Doe"}],
                "unread": true,
                "starred": false,
                "label_ids": [],
            }),
        );
        store
    }
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, Json<Value>);
type Reply = Result<Json<Value>, Failure>;

#[derive(Clone, Copy)]
enum Collection {
    Events,
    Calendars,
    Contacts,
}

impl Collection {
    fn object(self) -> &'static str {
        match self {
            Collection::Events => "event",
            Collection::Calendars => "calendar",
            Collection::Contacts => "contact",
        }
    }

    fn records(self, store: &Store) -> &BTreeMap<String, Value> {
        match self {
            Collection::Events => &store.events,
            Collection::Calendars => &store.calendars,
            Collection::Contacts => &store.contacts,
        }
    }

    fn records_mut(self, store: &mut Store) -> &mut BTreeMap<String, Value> {
        match self {
            Collection::Events => &mut store.events,
            Collection::Calendars => &mut store.calendars,
            Collection::Contacts => &mut store.contacts,
        }
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));

    let protected = Router::new()
        .route("/oauth/revoke", post(revoke_token))
        .route("/account", get(account_info))
        .route("/a/{client_id}", get(application_details).put(update_application))
        .route("/a/{client_id}/accounts", get(list_accounts))
        .route("/a/{client_id}/accounts/{account_id}", get(get_account))
        .route("/a/{client_id}/accounts/{account_id}/downgrade", post(downgrade_account))
        .route("/a/{client_id}/accounts/{account_id}/upgrade", post(upgrade_account))
        .route("/a/{client_id}/accounts/{account_id}/revoke-all", post(revoke_all))
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event).put(update_event).delete(delete_event))
        .route("/send-rsvp", post(send_rsvp))
        .route("/messages", get(list_messages))
        .route("/messages/{id}", get(get_message).put(update_message))
        .route("/calendars", get(list_calendars).post(create_calendar))
        .route("/calendars/free-busy", post(free_busy))
        .route(
            "/calendars/{id}",
            get(get_calendar).put(update_calendar).delete(delete_calendar),
        )
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .layer(middleware::from_fn(require_basic_auth));

    Router::new()
        .route("/oauth/token", post(exchange_token))
        .merge(protected)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_basic_auth(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Basic ") && value.len() > "Basic ".len());
    if !authorized {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}

fn failure(status: StatusCode, message: &str) -> Failure {
    (
        status,
        Json(json!({"message": message, "type": "invalid_request_error"})),
    )
}

fn not_found(what: &str, id: &str) -> Failure {
    failure(StatusCode::NOT_FOUND, &format!("Couldn't find {what} with id `{id}`"))
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn merge(target: &mut Value, changes: Map<String, Value>) {
    if let Value::Object(fields) = target {
        fields.extend(changes);
    }
}

fn page(records: Vec<Value>, query: &HashMap<String, String>) -> Value {
    let offset = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(100);
    let records: Vec<Value> = records.into_iter().skip(offset).take(limit).collect();
    match query.get("view").map(String::as_str) {
        Some("count") => json!({"count": records.len()}),
        Some("ids") => Value::Array(records.iter().map(|r| r["id"].clone()).collect()),
        _ => Value::Array(records),
    }
}

// --- oauth ---

#[derive(Deserialize)]
struct TokenRequest {
    client_id: String,
    client_secret: String,
    grant_type: String,
    code: String,
}

async fn exchange_token(Json(input): Json<TokenRequest>) -> Reply {
    if input.grant_type != "authorization_code" || input.code.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid grant"));
    }
    if input.client_id != CLIENT_ID || input.client_secret.is_empty() {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid client credentials"));
    }
    info!(code = %input.code, "exchanged authorization code");
    Ok(Json(json!({
        "client_id": input.client_id,
        "access_token": format!("token-{}", input.code),
        "account_id": ACCOUNT_ID,
        "email_address": "jane@example.com",
        "provider": "gmail",
        "token_type": "bearer",
    })))
}

async fn revoke_token() -> Json<Value> {
    Json(json!({"success": true}))
}

// --- management ---

async fn account_info(State(db): State<Db>) -> Reply {
    let store = db.read().await;
    store
        .accounts
        .get(ACCOUNT_ID)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("account", ACCOUNT_ID))
}

fn check_client(client_id: &str) -> Result<(), Failure> {
    if client_id == CLIENT_ID {
        Ok(())
    } else {
        Err(not_found("application", client_id))
    }
}

async fn application_details(State(db): State<Db>, Path(client_id): Path<String>) -> Reply {
    check_client(&client_id)?;
    Ok(Json(db.read().await.application.clone()))
}

async fn update_application(
    State(db): State<Db>,
    Path(client_id): Path<String>,
    changes: Option<Json<Map<String, Value>>>,
) -> Reply {
    check_client(&client_id)?;
    let mut store = db.write().await;
    merge(&mut store.application, fields(changes));
    Ok(Json(store.application.clone()))
}

async fn list_accounts(
    State(db): State<Db>,
    Path(client_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    check_client(&client_id)?;
    let store = db.read().await;
    Ok(Json(page(store.accounts.values().cloned().collect(), &query)))
}

async fn get_account(State(db): State<Db>, Path((client_id, account_id)): Path<(String, String)>) -> Reply {
    check_client(&client_id)?;
    let store = db.read().await;
    store
        .accounts
        .get(&account_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("account", &account_id))
}

async fn set_billing_state(db: &Db, client_id: &str, account_id: &str, state: &str) -> Reply {
    check_client(client_id)?;
    let mut store = db.write().await;
    let account = store
        .accounts
        .get_mut(account_id)
        .ok_or_else(|| not_found("account", account_id))?;
    account["billing_state"] = Value::from(state);
    Ok(Json(json!({"success": "true"})))
}

async fn downgrade_account(State(db): State<Db>, Path((client_id, account_id)): Path<(String, String)>) -> Reply {
    set_billing_state(&db, &client_id, &account_id, "cancelled").await
}

async fn upgrade_account(State(db): State<Db>, Path((client_id, account_id)): Path<(String, String)>) -> Reply {
    set_billing_state(&db, &client_id, &account_id, "paid").await
}

async fn revoke_all(
    State(db): State<Db>,
    Path((client_id, account_id)): Path<(String, String)>,
) -> Reply {
    check_client(&client_id)?;
    if !db.read().await.accounts.contains_key(&account_id) {
        return Err(not_found("account", &account_id));
    }
    Ok(Json(json!({"success": "true"})))
}

// --- generic collections ---

async fn list_records(db: &Db, collection: Collection, query: &HashMap<String, String>) -> Value {
    let store = db.read().await;
    let records = collection
        .records(&store)
        .values()
        .filter(|record| match query.get("calendar_id") {
            Some(calendar_id) => record["calendar_id"] == Value::from(calendar_id.as_str()),
            None => true,
        })
        .cloned()
        .collect();
    page(records, query)
}

async fn create_record(db: &Db, collection: Collection, fields: Map<String, Value>) -> Value {
    let mut record = Value::Object(fields);
    let id = new_id();
    record["id"] = Value::from(id.as_str());
    record["object"] = Value::from(collection.object());
    record["account_id"] = Value::from(ACCOUNT_ID);
    info!(object = collection.object(), %id, "created");
    let mut store = db.write().await;
    collection.records_mut(&mut store).insert(id, record.clone());
    record
}

async fn fetch_record(db: &Db, collection: Collection, id: &str) -> Reply {
    let store = db.read().await;
    collection
        .records(&store)
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(collection.object(), id))
}

/// A PUT without parameters carries no body; treat it as no changes.
fn fields(body: Option<Json<Map<String, Value>>>) -> Map<String, Value> {
    body.map(|Json(fields)| fields).unwrap_or_default()
}

async fn update_record(db: &Db, collection: Collection, id: &str, changes: Map<String, Value>) -> Reply {
    let mut store = db.write().await;
    let record = collection
        .records_mut(&mut store)
        .get_mut(id)
        .ok_or_else(|| not_found(collection.object(), id))?;
    merge(record, changes);
    Ok(Json(record.clone()))
}

async fn delete_record(db: &Db, collection: Collection, id: &str) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    collection
        .records_mut(&mut store)
        .remove(id)
        .map(|_| StatusCode::OK)
        .ok_or_else(|| not_found(collection.object(), id))
}

// --- events ---

async fn list_events(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(list_records(&db, Collection::Events, &query).await)
}

async fn create_event(State(db): State<Db>, Json(fields): Json<Map<String, Value>>) -> Reply {
    let calendar_id = fields.get("calendar_id").and_then(Value::as_str).unwrap_or_default();
    if !db.read().await.calendars.contains_key(calendar_id) {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid calendar_id"));
    }
    Ok(Json(create_record(&db, Collection::Events, fields).await))
}

async fn get_event(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    fetch_record(&db, Collection::Events, &id).await
}

async fn update_event(
    State(db): State<Db>,
    Path(id): Path<String>,
    changes: Option<Json<Map<String, Value>>>,
) -> Reply {
    update_record(&db, Collection::Events, &id, fields(changes)).await
}

async fn delete_event(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, Failure> {
    delete_record(&db, Collection::Events, &id).await
}

#[derive(Deserialize)]
struct Rsvp {
    event_id: String,
    status: String,
    account_id: String,
}

async fn send_rsvp(State(db): State<Db>, Json(input): Json<Rsvp>) -> Reply {
    if input.account_id != ACCOUNT_ID {
        return Err(failure(StatusCode::FORBIDDEN, "Account does not own this event"));
    }
    let mut store = db.write().await;
    let event = store
        .events
        .get_mut(&input.event_id)
        .ok_or_else(|| not_found("event", &input.event_id))?;
    event["rsvp_status"] = Value::from(input.status);
    Ok(Json(event.clone()))
}

// --- messages ---

async fn list_messages(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let store = db.read().await;
    let records = store
        .messages
        .values()
        .filter(|message| {
            ["unread", "starred"].iter().all(|flag| match query.get(*flag) {
                Some(wanted) => message[*flag].to_string() == *wanted,
                None => true,
            })
        })
        .cloned()
        .collect();
    Json(page(records, &query))
}

async fn get_message(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, Failure> {
    let store = db.read().await;
    let message = store.messages.get(&id).ok_or_else(|| not_found("message", &id))?;

    let wants_raw = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "message/rfc822");
    if wants_raw {
        return Ok(([(header::CONTENT_TYPE, "message/rfc822")], RAW_MESSAGE).into_response());
    }

    let mut message = message.clone();
    if query.get("view").map(String::as_str) == Some("expanded") {
        message["headers"] = json!({"Message-Id": format!("<{id}@example.com>")});
    }
    Ok(Json(message).into_response())
}

async fn update_message(
    State(db): State<Db>,
    Path(id): Path<String>,
    changes: Option<Json<Map<String, Value>>>,
) -> Reply {
    let mut store = db.write().await;
    let message = store.messages.get_mut(&id).ok_or_else(|| not_found("message", &id))?;
    merge(message, fields(changes));
    Ok(Json(message.clone()))
}

// --- calendars ---

async fn list_calendars(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(list_records(&db, Collection::Calendars, &query).await)
}

async fn create_calendar(State(db): State<Db>, Json(mut fields): Json<Map<String, Value>>) -> Json<Value> {
    fields.insert("read_only".to_string(), Value::Bool(false));
    Json(create_record(&db, Collection::Calendars, fields).await)
}

async fn get_calendar(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    fetch_record(&db, Collection::Calendars, &id).await
}

async fn update_calendar(
    State(db): State<Db>,
    Path(id): Path<String>,
    changes: Option<Json<Map<String, Value>>>,
) -> Reply {
    update_record(&db, Collection::Calendars, &id, fields(changes)).await
}

async fn delete_calendar(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, Failure> {
    delete_record(&db, Collection::Calendars, &id).await
}

#[derive(Deserialize)]
struct FreeBusyQuery {
    start_time: u64,
    end_time: u64,
    emails: Vec<String>,
}

async fn free_busy(Json(input): Json<FreeBusyQuery>) -> Reply {
    if input.end_time <= input.start_time {
        return Err(failure(StatusCode::BAD_REQUEST, "end_time must be after start_time"));
    }
    let slots: Vec<Value> = input
        .emails
        .iter()
        .map(|email| {
            json!({
                "object": "free_busy",
                "email": email,
                "time_slots": [],
            })
        })
        .collect();
    Ok(Json(Value::Array(slots)))
}

// --- contacts ---

async fn list_contacts(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(list_records(&db, Collection::Contacts, &query).await)
}

async fn create_contact(State(db): State<Db>, Json(fields): Json<Map<String, Value>>) -> Json<Value> {
    Json(create_record(&db, Collection::Contacts, fields).await)
}

async fn get_contact(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    fetch_record(&db, Collection::Contacts, &id).await
}

async fn update_contact(
    State(db): State<Db>,
    Path(id): Path<String>,
    changes: Option<Json<Map<String, Value>>>,
) -> Reply {
    update_record(&db, Collection::Contacts, &id, fields(changes)).await
}

async fn delete_contact(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, Failure> {
    delete_record(&db, Collection::Contacts, &id).await
}
