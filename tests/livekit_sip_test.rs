//! LiveKit SIP client tests against a local Twirp stand-in

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use switchboard::domain::platform::{SipTransferService, TransferRequest};
use switchboard::domain::shared::value_objects::{ParticipantIdentity, RoomName};
use switchboard::infrastructure::livekit::{AccessClaims, LiveKitSipClient};
use switchboard::CallError;

const API_KEY: &str = "APItestkey";
const API_SECRET: &str = "test-secret-that-is-long-enough";

#[derive(Clone)]
struct TwirpStub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn transfer_sip_participant(
    State(stub): State<TwirpStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().unwrap().push((auth, body));
    (stub.status, Json(stub.reply.clone()))
}

/// Serve the stub and return a `ws://` URL pointing at it
async fn start_stub(stub: TwirpStub) -> String {
    let app = Router::new()
        .route(
            "/twirp/livekit.SIP/TransferSIPParticipant",
            post(transfer_sip_participant),
        )
        .with_state(stub);

    let tcp = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(tcp, app).await.unwrap();
    });
    format!("ws://{}", addr)
}

fn stub(status: StatusCode, reply: Value) -> TwirpStub {
    TwirpStub {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    }
}

fn request() -> TransferRequest {
    TransferRequest {
        participant_identity: ParticipantIdentity::new("sip_caller"),
        room_name: RoomName::new("call-room-1"),
        transfer_to: "tel:+15550001111".to_string(),
        play_dialtone: true,
    }
}

#[tokio::test]
async fn test_transfer_posts_signed_request() {
    let stub = stub(StatusCode::OK, json!({}));
    let seen = Arc::clone(&stub.seen);
    let url = start_stub(stub).await;

    let client = LiveKitSipClient::new(&url, API_KEY, API_SECRET, Duration::from_secs(2)).unwrap();
    client.transfer_participant(&request()).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];

    assert_eq!(body["participant_identity"], "sip_caller");
    assert_eq!(body["room_name"], "call-room-1");
    assert_eq!(body["transfer_to"], "tel:+15550001111");
    assert_eq!(body["play_dialtone"], true);

    let token = auth
        .as_deref()
        .and_then(|value| value.strip_prefix("Bearer "))
        .expect("bearer token");
    let claims = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(API_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.iss, API_KEY);
    assert_eq!(claims.video.room, "call-room-1");
    assert!(claims.video.room_admin);
    assert!(claims.sip.call);
}

#[tokio::test]
async fn test_twirp_error_becomes_transfer_error() {
    let url = start_stub(stub(
        StatusCode::NOT_FOUND,
        json!({"code": "not_found", "msg": "participant sip_caller not found"}),
    ))
    .await;

    let client = LiveKitSipClient::new(&url, API_KEY, API_SECRET, Duration::from_secs(2)).unwrap();
    let err = client.transfer_participant(&request()).await.unwrap_err();

    match err {
        CallError::Transfer(message) => {
            assert!(message.starts_with("404"));
            assert!(message.contains("not_found"));
            assert!(message.contains("participant sip_caller not found"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transfer_error() {
    // Bind then drop to get a port nobody is listening on
    let tcp = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    drop(tcp);

    let client = LiveKitSipClient::new(
        &format!("ws://{}", addr),
        API_KEY,
        API_SECRET,
        Duration::from_secs(1),
    )
    .unwrap();

    assert!(matches!(
        client.transfer_participant(&request()).await,
        Err(CallError::Transfer(_))
    ));
}
