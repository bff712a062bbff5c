//! Read side of the ledger: point reads of vote objects and cursor-based
//! polling of the voting module's events over JSON-RPC.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use suivote_shared::constants::VOTING_MODULE;
use suivote_shared::types::canonical_object_id;
use suivote_shared::{now_millis, OptionRecord, PollRecord, VoteId, VoteRecord, VoteStatus, VoteUpdateEvent};

use crate::error::RpcError;

const EVENT_PAGE_LIMIT: usize = 50;
const EVENT_CHANNEL_SIZE: usize = 256;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Position in the event stream (`suix_queryEvents` event id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCursor {
    pub tx_digest: String,
    pub event_seq: String,
}

#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<VoteUpdateEvent>,
    pub next_cursor: Option<EventCursor>,
    pub has_next_page: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventPage {
    #[serde(default)]
    data: Vec<Value>,
    next_cursor: Option<EventCursor>,
    #[serde(default)]
    has_next_page: bool,
}

/// The viewer's relation to one vote, read from its voter and whitelist
/// sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Participation {
    pub has_voted: bool,
    /// `None` when the vote has no whitelist or it could not be read.
    pub is_whitelisted: Option<bool>,
}

/// Where an address set on the vote object keeps its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Inline vector or `VecSet`, already resolved.
    Inline(bool),
    /// `Table<address, _>` held in dynamic fields under this object id.
    Table(String),
}

#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
    package_id: String,
    /// Address of the local account; its own `VoteCast` events mark votes
    /// as voted.
    viewer: Option<String>,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, package_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            package_id: package_id.into(),
            viewer: None,
        }
    }

    pub fn with_viewer(mut self, address: impl Into<String>) -> Self {
        self.viewer = Some(address.into().to_lowercase());
        self
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::Malformed(format!("{method}: no result")))
    }

    async fn get_object(&self, id: &VoteId) -> Result<Value, RpcError> {
        self.call(
            "sui_getObject",
            json!([id.as_str(), { "showContent": true, "showType": true }]),
        )
        .await
    }

    /// Current state of one vote, as seen by the viewer when one is set.
    pub async fn get_vote(&self, id: &VoteId) -> Result<VoteRecord, RpcError> {
        let object = self.get_object(id).await?;
        self.read_vote(id, &object).await
    }

    /// Vote record plus its polls, with fresh stable ids on every option.
    pub async fn get_vote_detail(&self, id: &VoteId) -> Result<(VoteRecord, Vec<PollRecord>), RpcError> {
        let object = self.get_object(id).await?;
        let record = self.read_vote(id, &object).await?;
        let polls = parse_polls(&object)?;
        Ok((record, polls))
    }

    async fn read_vote(&self, id: &VoteId, object: &Value) -> Result<VoteRecord, RpcError> {
        let mut record = parse_vote_object(id, object, now_millis())?;
        let Some(viewer) = self.viewer.as_deref() else {
            return Ok(record);
        };

        let fields = object.pointer("/data/content/fields").unwrap_or(&Value::Null);
        let has_voted = match address_membership(fields, "voters", viewer) {
            Some(m) => self.resolve_membership(m, viewer).await?,
            None => false,
        };
        let is_whitelisted = match address_membership(fields, "whitelist", viewer) {
            Some(m) if record.has_whitelist => Some(self.resolve_membership(m, viewer).await?),
            _ => None,
        };

        apply_participation(
            &mut record,
            Participation {
                has_voted,
                is_whitelisted,
            },
        );
        debug!(vote_id = %id.short(), status = ?record.status, "Read vote for viewer");
        Ok(record)
    }

    async fn resolve_membership(&self, membership: Membership, address: &str) -> Result<bool, RpcError> {
        match membership {
            Membership::Inline(present) => Ok(present),
            Membership::Table(table_id) => {
                let field: Value = self
                    .call(
                        "suix_getDynamicFieldObject",
                        json!([table_id, { "type": "address", "value": address }]),
                    )
                    .await?;
                // A missing key answers with an error object instead of data
                Ok(field.get("data").is_some_and(|d| !d.is_null()))
            }
        }
    }

    /// One page of voting-module events after `cursor`, oldest first.
    pub async fn query_vote_events(&self, cursor: Option<&EventCursor>, limit: usize) -> Result<EventPage, RpcError> {
        let page: RawEventPage = self
            .call("suix_queryEvents", json!([self.event_filter(), cursor, limit, false]))
            .await?;

        let events = page
            .data
            .iter()
            .filter_map(|e| parse_vote_event(e, self.viewer.as_deref()))
            .collect();

        Ok(EventPage {
            events,
            next_cursor: page.next_cursor,
            has_next_page: page.has_next_page,
        })
    }

    /// Cursor of the newest existing event, so polling starts from now.
    pub async fn latest_cursor(&self) -> Result<Option<EventCursor>, RpcError> {
        let page: RawEventPage = self
            .call("suix_queryEvents", json!([self.event_filter(), null, 1, true]))
            .await?;
        Ok(page.data.first().and_then(|e| {
            e.get("id")
                .and_then(|id| serde_json::from_value(id.clone()).ok())
        }))
    }

    fn event_filter(&self) -> Value {
        json!({ "MoveModule": { "package": self.package_id, "module": VOTING_MODULE } })
    }

    /// Poll for new events every `interval` and forward them.
    ///
    /// The task stops once the receiver is dropped. Query failures are
    /// logged and retried on the next tick.
    pub fn spawn_event_poller(self: Arc<Self>, interval: Duration) -> (mpsc::Receiver<VoteUpdateEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);

        let handle = tokio::spawn(async move {
            let mut cursor = match self.latest_cursor().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "Could not read latest event cursor, starting from the beginning");
                    None
                }
            };
            info!(interval_ms = interval.as_millis() as u64, "Vote event poller started");

            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                loop {
                    let page = match self.query_vote_events(cursor.as_ref(), EVENT_PAGE_LIMIT).await {
                        Ok(page) => page,
                        Err(e) => {
                            warn!(error = %e, "Event query failed");
                            break;
                        }
                    };

                    for event in page.events {
                        if tx.send(event).await.is_err() {
                            debug!("Event receiver dropped, stopping poller");
                            return;
                        }
                    }
                    if page.next_cursor.is_some() {
                        cursor = page.next_cursor;
                    }
                    if !page.has_next_page {
                        break;
                    }
                }

                if tx.is_closed() {
                    return;
                }
            }
        });

        (rx, handle)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Build a [`VoteRecord`] from a `sui_getObject` result. Status comes from
/// the voting window unless the object says the vote was closed early.
pub fn parse_vote_object(id: &VoteId, object: &Value, now_ms: u64) -> Result<VoteRecord, RpcError> {
    if object.get("error").is_some() || object.get("data").map_or(true, Value::is_null) {
        return Err(RpcError::NotFound(id.to_string()));
    }
    let fields = object
        .pointer("/data/content/fields")
        .ok_or_else(|| RpcError::Malformed(format!("{id}: object has no content fields")))?;

    let start_timestamp = u64_field(fields, "start_timestamp")
        .ok_or_else(|| RpcError::Malformed(format!("{id}: missing start_timestamp")))?;
    let end_timestamp = u64_field(fields, "end_timestamp")
        .ok_or_else(|| RpcError::Malformed(format!("{id}: missing end_timestamp")))?;

    let mut status = VoteStatus::from_window(start_timestamp, end_timestamp, now_ms);
    if fields.get("is_cancelled").and_then(Value::as_bool) == Some(true) {
        status = VoteStatus::Closed;
    }

    Ok(VoteRecord {
        id: id.clone(),
        title: str_field(fields, "title").unwrap_or_default(),
        description: str_field(fields, "description").unwrap_or_default(),
        status,
        total_votes: u64_field(fields, "total_votes").unwrap_or(0),
        polls_count: u64_field(fields, "polls_count").unwrap_or(0),
        start_timestamp,
        end_timestamp,
        token_requirement: str_field(fields, "token_requirement").filter(|s| !s.is_empty()),
        token_amount: u64_field(fields, "token_amount").filter(|a| *a > 0),
        has_whitelist: fields.get("has_whitelist").and_then(Value::as_bool).unwrap_or(false),
        is_whitelisted: None,
    })
}

/// Locate `address` in the address set stored under `key`. Returns `None`
/// when the field is absent or has an unknown shape.
pub fn address_membership(fields: &Value, key: &str, address: &str) -> Option<Membership> {
    let value = fields.get(key)?;
    let members = value
        .as_array()
        .or_else(|| value.pointer("/fields/contents").and_then(Value::as_array));

    if let Some(members) = members {
        let wanted = canonical_object_id(address);
        let present = members.iter().any(|m| {
            let member = m.as_str().or_else(|| m.pointer("/fields/key").and_then(Value::as_str));
            member.is_some_and(|a| canonical_object_id(a) == wanted)
        });
        return Some(Membership::Inline(present));
    }

    value
        .pointer("/fields/id/id")
        .and_then(Value::as_str)
        .map(|id| Membership::Table(id.to_string()))
}

/// Fold the viewer's participation into a freshly read record.
///
/// Without a whitelist every viewer is eligible; with one whose membership
/// is unknown, the vote is not marked as awaiting the viewer.
pub fn apply_participation(record: &mut VoteRecord, participation: Participation) {
    let eligible = participation.is_whitelisted.unwrap_or(!record.has_whitelist);
    record.status = record.status.for_viewer(participation.has_voted, eligible);
    record.is_whitelisted = participation.is_whitelisted;
}

/// Polls stored inline on the vote object, in ledger order.
pub fn parse_polls(object: &Value) -> Result<Vec<PollRecord>, RpcError> {
    let Some(polls) = object.pointer("/data/content/fields/polls").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    polls
        .iter()
        .enumerate()
        .map(|(index, poll)| {
            let fields = poll.get("fields").unwrap_or(poll);
            let options = fields
                .get("options")
                .and_then(Value::as_array)
                .ok_or_else(|| RpcError::Malformed(format!("poll {index} has no options")))?
                .iter()
                .map(|option| {
                    let f = option.get("fields").unwrap_or(option);
                    OptionRecord::new(
                        str_field(f, "text").unwrap_or_default(),
                        str_field(f, "media_blob_id").filter(|s| !s.is_empty()),
                        u64_field(f, "votes").unwrap_or(0),
                    )
                })
                .collect();

            Ok(PollRecord {
                title: str_field(fields, "title").unwrap_or_default(),
                description: str_field(fields, "description").unwrap_or_default(),
                is_multi_select: fields.get("is_multi_select").and_then(Value::as_bool).unwrap_or(false),
                max_selections: u64_field(fields, "max_selections")
                    .and_then(|m| u32::try_from(m).ok())
                    .unwrap_or(1),
                is_required: fields.get("is_required").and_then(Value::as_bool).unwrap_or(false),
                options,
            })
        })
        .collect()
}

/// Translate one voting-module event. Unknown event types yield `None`.
pub fn parse_vote_event(event: &Value, viewer: Option<&str>) -> Option<VoteUpdateEvent> {
    let event_type = event.get("type")?.as_str()?;
    let name = event_type.rsplit("::").next()?;
    let body = event.get("parsedJson")?;
    let id = VoteId::new(str_field(body, "vote_id")?);

    let mut update = VoteUpdateEvent::new(id);
    match name {
        "VoteCreated" => {
            update.title = str_field(body, "title");
            update.start_timestamp = u64_field(body, "start_timestamp");
            update.end_timestamp = u64_field(body, "end_timestamp");
            update.polls_count = u64_field(body, "polls_count");
        }
        "VoteCast" => {
            update.total_votes = u64_field(body, "total_votes");
            let voter = str_field(body, "voter").map(|v| v.to_lowercase());
            if viewer.is_some() && voter.as_deref() == viewer {
                update.status = Some(VoteStatus::Voted);
            }
        }
        "VoteClosed" => {
            update.status = Some(VoteStatus::Closed);
            update.total_votes = u64_field(body, "total_votes");
        }
        _ => return None,
    }
    Some(update)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

// Move u64 values arrive as JSON strings
fn u64_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    const VIEWER: &str = "0x00000000000000000000000000000000000000000000000000000000000000ee";

    fn vote_object(start: u64, end: u64) -> Value {
        json!({
            "data": {
                "objectId": "0x77",
                "type": "0xab::voting::Vote",
                "content": {
                    "dataType": "moveObject",
                    "fields": {
                        "title": "Budget",
                        "description": "Q3",
                        "start_timestamp": start.to_string(),
                        "end_timestamp": end.to_string(),
                        "total_votes": "12",
                        "polls_count": 1,
                        "token_requirement": "",
                        "token_amount": "0",
                        "has_whitelist": true,
                        "polls": [{
                            "type": "0xab::voting::Poll",
                            "fields": {
                                "title": "Allocate",
                                "description": "",
                                "is_multi_select": true,
                                "max_selections": "2",
                                "is_required": true,
                                "options": [
                                    { "fields": { "text": "Infra", "media_blob_id": "blob-1", "votes": "7" } },
                                    { "fields": { "text": "Events", "media_blob_id": "", "votes": "5" } }
                                ]
                            }
                        }]
                    }
                }
            }
        })
    }

    #[test]
    fn test_parse_vote_object() {
        let id = VoteId::new("0x77");
        let record = parse_vote_object(&id, &vote_object(100, 200), 150).unwrap();

        assert_eq!(record.title, "Budget");
        assert_eq!(record.status, VoteStatus::Active);
        assert_eq!(record.total_votes, 12);
        assert_eq!(record.polls_count, 1);
        assert_eq!(record.token_requirement, None);
        assert_eq!(record.token_amount, None);
        assert!(record.has_whitelist);

        assert_eq!(parse_vote_object(&id, &vote_object(100, 200), 50).unwrap().status, VoteStatus::Upcoming);
        assert_eq!(parse_vote_object(&id, &vote_object(100, 200), 200).unwrap().status, VoteStatus::Closed);
    }

    #[test]
    fn test_parse_missing_object() {
        let id = VoteId::new("0x404");
        let missing = json!({ "error": { "code": "notExists", "object_id": "0x404" } });
        assert!(matches!(parse_vote_object(&id, &missing, 0), Err(RpcError::NotFound(_))));
    }

    #[test]
    fn test_parse_polls() {
        let polls = parse_polls(&vote_object(1, 2)).unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].max_selections, 2);
        assert_eq!(polls[0].options[0].media_reference.as_deref(), Some("blob-1"));
        assert_eq!(polls[0].options[1].media_reference, None);
        assert_eq!(polls[0].options[1].votes, 5);
        assert_ne!(polls[0].options[0].stable_id, polls[0].options[1].stable_id);
    }

    #[test]
    fn test_parse_events() {
        let cast = json!({
            "type": "0xab::voting::VoteCast",
            "parsedJson": { "vote_id": "0x77", "voter": VIEWER.to_uppercase().replace("0X", "0x"), "total_votes": "13" }
        });
        let by_viewer = parse_vote_event(&cast, Some(VIEWER)).unwrap();
        assert_eq!(by_viewer.status, Some(VoteStatus::Voted));
        assert_eq!(by_viewer.total_votes, Some(13));

        let by_other = parse_vote_event(&cast, None).unwrap();
        assert_eq!(by_other.status, None);

        let closed = json!({ "type": "0xab::voting::VoteClosed", "parsedJson": { "vote_id": "0x77" } });
        assert_eq!(parse_vote_event(&closed, None).unwrap().status, Some(VoteStatus::Closed));

        let other = json!({ "type": "0xab::voting::Whatever", "parsedJson": { "vote_id": "0x77" } });
        assert!(parse_vote_event(&other, None).is_none());
    }

    #[test]
    fn test_viewer_participation() {
        let now = now_millis();
        let object = vote_object(now - 1_000, now + 60_000);
        let mut record = parse_vote_object(&VoteId::new("0x77"), &object, now).unwrap();
        assert_eq!(record.is_whitelisted, None);

        // Short and padded forms of the same address match
        let fields = json!({
            "voters": ["0xee"],
            "whitelist": { "fields": { "contents": ["0x01"] } },
            "registry": { "fields": { "id": { "id": "0xf00d" } } }
        });
        assert_eq!(address_membership(&fields, "voters", VIEWER), Some(Membership::Inline(true)));
        assert_eq!(address_membership(&fields, "whitelist", VIEWER), Some(Membership::Inline(false)));
        assert_eq!(
            address_membership(&fields, "registry", VIEWER),
            Some(Membership::Table("0xf00d".into()))
        );
        assert_eq!(address_membership(&fields, "missing", VIEWER), None);

        // Whitelisted elsewhere: stays active and records the exclusion
        let mut excluded = record.clone();
        apply_participation(&mut excluded, Participation { has_voted: false, is_whitelisted: Some(false) });
        assert_eq!(excluded.status, VoteStatus::Active);
        assert_eq!(excluded.is_whitelisted, Some(false));

        let mut eligible = record.clone();
        apply_participation(&mut eligible, Participation { has_voted: false, is_whitelisted: Some(true) });
        assert_eq!(eligible.status, VoteStatus::Pending);

        apply_participation(&mut record, Participation { has_voted: true, is_whitelisted: Some(true) });
        assert_eq!(record.status, VoteStatus::Voted);

        // Open votes without a whitelist await every viewer
        let mut open = parse_vote_object(&VoteId::new("0x77"), &object, now).unwrap();
        open.has_whitelist = false;
        apply_participation(&mut open, Participation::default());
        assert_eq!(open.status, VoteStatus::Pending);

        // A finished vote stays closed whatever the viewer did
        let ended = vote_object(now - 60_000, now - 1_000);
        let mut closed = parse_vote_object(&VoteId::new("0x77"), &ended, now).unwrap();
        apply_participation(&mut closed, Participation { has_voted: true, is_whitelisted: Some(true) });
        assert_eq!(closed.status, VoteStatus::Closed);
    }

    async fn fake_node(reply: Value) -> String {
        let app = Router::new().route(
            "/",
            post(move |Json(req): Json<Value>| {
                let reply = reply.clone();
                async move {
                    let method = req["method"].as_str().unwrap_or_default();
                    let result = reply[method].clone();
                    Json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_get_vote_over_http() {
        let now = now_millis();
        let url = fake_node(json!({ "sui_getObject": vote_object(now - 1_000, now + 60_000) })).await;
        let rpc = RpcClient::new(url, "0xab");

        let (record, polls) = rpc.get_vote_detail(&VoteId::new("0x77")).await.unwrap();
        assert_eq!(record.status, VoteStatus::Active);
        assert_eq!(polls[0].options.len(), 2);
    }

    #[tokio::test]
    async fn test_query_events_over_http() {
        let url = fake_node(json!({
            "suix_queryEvents": {
                "data": [
                    { "id": { "txDigest": "T1", "eventSeq": "0" }, "type": "0xab::voting::VoteClosed", "parsedJson": { "vote_id": "0x77", "total_votes": "3" } },
                    { "id": { "txDigest": "T1", "eventSeq": "1" }, "type": "0xab::other::Thing", "parsedJson": {} }
                ],
                "nextCursor": { "txDigest": "T1", "eventSeq": "1" },
                "hasNextPage": false
            }
        }))
        .await;
        let rpc = RpcClient::new(url, "0xab");

        let page = rpc.query_vote_events(None, 10).await.unwrap();
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].total_votes, Some(3));
        assert_eq!(page.next_cursor.unwrap().event_seq, "1");

        let latest = rpc.latest_cursor().await.unwrap().unwrap();
        assert_eq!(latest.tx_digest, "T1");
    }

    #[tokio::test]
    async fn test_viewer_read_marks_own_ballot() {
        let now = now_millis();
        let mut object = vote_object(now - 1_000, now + 60_000);
        object["data"]["content"]["fields"]["voters"] = json!({
            "type": "0x2::table::Table<address, bool>",
            "fields": { "id": { "id": "0xf00d" }, "size": "3" }
        });
        object["data"]["content"]["fields"]["whitelist"] = json!([VIEWER]);
        let url = fake_node(json!({
            "sui_getObject": object,
            "suix_getDynamicFieldObject": { "data": { "objectId": "0xbeef" } }
        }))
        .await;

        let rpc = RpcClient::new(url, "0xab").with_viewer(VIEWER);
        let record = rpc.get_vote(&VoteId::new("0x77")).await.unwrap();
        assert_eq!(record.status, VoteStatus::Voted);
        assert_eq!(record.is_whitelisted, Some(true));
    }

    #[tokio::test]
    async fn test_viewer_read_without_ballot_is_pending() {
        let now = now_millis();
        let mut object = vote_object(now - 1_000, now + 60_000);
        object["data"]["content"]["fields"]["voters"] = json!({ "fields": { "contents": [] } });
        object["data"]["content"]["fields"]["whitelist"] = json!({ "fields": { "contents": [VIEWER] } });
        let url = fake_node(json!({ "sui_getObject": object })).await;

        let rpc = RpcClient::new(url.clone(), "0xab").with_viewer(VIEWER);
        let record = rpc.get_vote(&VoteId::new("0x77")).await.unwrap();
        assert_eq!(record.status, VoteStatus::Pending);

        // Without a viewer the window alone decides
        let anonymous = RpcClient::new(url, "0xab");
        let record = anonymous.get_vote(&VoteId::new("0x77")).await.unwrap();
        assert_eq!(record.status, VoteStatus::Active);
        assert_eq!(record.is_whitelisted, None);
    }

    #[tokio::test]
    async fn test_rpc_error_surfaces() {
        let app = Router::new().route(
            "/",
            post(|| async { Json(json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32602, "message": "bad params" } })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let rpc = RpcClient::new(format!("http://{addr}"), "0xab");
        let err = rpc.get_vote(&VoteId::new("0x1")).await.unwrap_err();
        assert!(matches!(err, RpcError::Rpc { code: -32602, .. }));
    }
}
