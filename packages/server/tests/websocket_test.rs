//! Integration tests driving the coordinator over a real socket.
//!
//! Each test serves the router on an ephemeral port inside the test runtime
//! and talks to it through `tokio-tungstenite` and `reqwest`.

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hyoshi_server::{config::ServerConfig, ui::Server};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const QUIET_PERIOD: Duration = Duration::from_millis(500);

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Server::new(ServerConfig::default().build_state()).router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> WsStream {
    let (ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    ws
}

async fn send(ws: &mut WsStream, message: Value) {
    ws.send(Message::Text(message.to_string().into()))
        .await
        .unwrap();
}

async fn send_raw(ws: &mut WsStream, text: &str) {
    ws.send(Message::Text(text.to_string().into())).await.unwrap();
}

/// Next JSON message, failing the test after `RECV_TIMEOUT`
async fn recv(ws: &mut WsStream) -> Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Skip messages until one of the given type arrives
async fn recv_type(ws: &mut WsStream, message_type: &str) -> Value {
    loop {
        let message = recv(ws).await;
        if message["type"] == message_type {
            return message;
        }
    }
}

async fn join(ws: &mut WsStream, room: &str, client_type: &str, bpm: Option<f64>) -> Value {
    let mut request = json!({
        "type": "JOIN_ROOM_REQUEST",
        "roomName": room,
        "clientType": client_type,
    });
    if let Some(bpm) = bpm {
        request["bpm"] = json!(bpm);
    }
    send(ws, request).await;
    let reply = recv_type(ws, "JOIN_ROOM_REPLY").await;
    recv_type(ws, "ROOM_STATE_UPDATE").await;
    reply
}

async fn subscribe(ws: &mut WsStream, room: &str) {
    send(
        ws,
        json!({"type": "SUBSCRIBE_TO_ROOM_REQUEST", "roomName": room}),
    )
    .await;
    let reply = recv_type(ws, "SUBSCRIBE_TO_ROOM_REPLY").await;
    assert_eq!(reply["roomName"], room);
    recv_type(ws, "ROOM_STATE_UPDATE").await;
}

/// Poll the diagnostics endpoint until the room no longer exists
async fn wait_until_room_is_gone(addr: SocketAddr, room: &str) {
    let url = format!("http://{}/api/rooms/{}", addr, room);
    for _ in 0..100 {
        let response = reqwest::get(&url).await.unwrap();
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("room '{}' was never dropped", room);
}

/// Read until the connection stays quiet, returning the last message of the given type
async fn last_of_type(ws: &mut WsStream, message_type: &str) -> Option<Value> {
    let mut last = None;
    while let Ok(Some(Ok(frame))) = tokio::time::timeout(QUIET_PERIOD, ws.next()).await {
        if let Message::Text(text) = frame {
            let message: Value = serde_json::from_str(text.as_str()).unwrap();
            if message["type"] == message_type {
                last = Some(message);
            }
        }
    }
    last
}

#[tokio::test]
async fn test_sync_reply_echoes_t1() {
    // テスト項目: SYNC に対して t1 を返し、t2 <= t3 の SYNC_REPLY が返る
    // given (前提条件):
    let addr = spawn_server().await;
    let mut ws = connect(addr).await;

    // when (操作):
    send(&mut ws, json!({"type": "SYNC", "t1": 1234.5})).await;
    let reply = recv_type(&mut ws, "SYNC_REPLY").await;

    // then (期待する結果):
    assert_eq!(reply["t1"], 1234.5);
    let t2 = reply["t2"].as_f64().unwrap();
    let t3 = reply["t3"].as_f64().unwrap();
    assert!(t2 > 0.0);
    assert!(t2 <= t3);
}

#[tokio::test]
async fn test_output_join_starts_beat() {
    // テスト項目: output の参加で UserId が割り当てられ、指定した bpm の beat が始まる
    // given (前提条件):
    let addr = spawn_server().await;
    let mut ws = connect(addr).await;

    // when (操作):
    let reply = join(&mut ws, "lobby", "output", Some(90.0)).await;

    // then (期待する結果):
    assert!(reply["userId"].as_u64().unwrap() >= 1);
    let state = &reply["roomState"];
    assert_eq!(state["outputClients"], json!([reply["userId"]]));
    assert_eq!(state["inputClients"], json!([]));
    assert_eq!(state["beat"]["bpm"], 90.0);
    assert!(state["beat"]["nextBeatTimestamp"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_motion_input_fan_out() {
    // テスト項目: MOTION_INPUT は output と購読者に届き、他の input には届かない
    // given (前提条件):
    let addr = spawn_server().await;
    let mut output = connect(addr).await;
    let mut input_a = connect(addr).await;
    let mut input_b = connect(addr).await;
    let mut subscriber = connect(addr).await;
    join(&mut output, "stage", "output", None).await;
    let reply_a = join(&mut input_a, "stage", "input", None).await;
    join(&mut input_b, "stage", "input", None).await;
    subscribe(&mut subscriber, "stage").await;

    // when (操作):
    send(
        &mut input_a,
        json!({
            "type": "MOTION_INPUT",
            "roomName": "stage",
            "userId": reply_a["userId"],
            "frontToBack": 0.5,
            "around": -0.25,
            "actionTimestamp": 1000.0,
            "lastBeatNumber": 3,
            "nextBeatTimestamp": 1500.0
        }),
    )
    .await;

    // then (期待する結果):
    let relayed = recv_type(&mut output, "MOTION_INPUT").await;
    assert_eq!(relayed["frontToBack"], 0.5);
    assert_eq!(relayed["around"], -0.25);
    let relayed = recv_type(&mut subscriber, "MOTION_INPUT").await;
    assert_eq!(relayed["userId"], reply_a["userId"]);

    // input_b: SYNC_REPLY より前に MOTION_INPUT が来ていないこと
    send(&mut input_b, json!({"type": "SYNC", "t1": 1.0})).await;
    loop {
        let message = recv(&mut input_b).await;
        assert_ne!(message["type"], "MOTION_INPUT");
        if message["type"] == "SYNC_REPLY" {
            break;
        }
    }
}

#[tokio::test]
async fn test_set_tempo_relay_and_no_beat_error() {
    // テスト項目: SET_TEMPO は他のメンバーに中継され、beat の無いルームではエラーになる
    // given (前提条件):
    let addr = spawn_server().await;
    let mut output = connect(addr).await;
    let mut subscriber = connect(addr).await;
    join(&mut output, "tempo", "output", None).await;
    subscribe(&mut subscriber, "tempo").await;

    // when (操作):
    let set_tempo = json!({
        "type": "SET_TEMPO",
        "roomName": "tempo",
        "bpm": 140.0,
        "actionTimestamp": 1000.0,
        "nextBeatNumber": 8,
        "nextBeatTimestamp": 1200.0
    });
    send(&mut output, set_tempo.clone()).await;

    // then (期待する結果):
    let relayed = recv_type(&mut subscriber, "SET_TEMPO").await;
    assert_eq!(relayed, set_tempo);

    // beat の無いルームへの SET_TEMPO は ERROR
    let mut lonely = connect(addr).await;
    join(&mut lonely, "quiet", "input", None).await;
    let mut without_beat = set_tempo.clone();
    without_beat["roomName"] = json!("quiet");
    send(&mut lonely, without_beat).await;
    let error = recv_type(&mut lonely, "ERROR").await;
    assert_eq!(error["message"], "Room 'quiet' has no running beat");
}

#[tokio::test]
async fn test_sync_beat_relay_carries_bpm() {
    // テスト項目: 中継される SYNC_BEAT にルームの bpm が付く
    // given (前提条件):
    let addr = spawn_server().await;
    let mut output = connect(addr).await;
    let mut subscriber = connect(addr).await;
    join(&mut output, "pulse", "output", Some(100.0)).await;
    subscribe(&mut subscriber, "pulse").await;

    // when (操作):
    send(
        &mut output,
        json!({"type": "SYNC_BEAT", "roomName": "pulse", "beatNumber": 4, "beatTimestamp": 5000.0}),
    )
    .await;

    // then (期待する結果):
    let relayed = recv_type(&mut subscriber, "SYNC_BEAT").await;
    assert_eq!(relayed["beatNumber"], 4);
    assert_eq!(relayed["beatTimestamp"], 5000.0);
    assert_eq!(relayed["bpm"], 100.0);
}

#[tokio::test]
async fn test_malformed_message_gets_error() {
    // テスト項目: 解析できないメッセージには ERROR が返り、接続は続く
    // given (前提条件):
    let addr = spawn_server().await;
    let mut ws = connect(addr).await;

    // when (操作):
    send_raw(&mut ws, "not json").await;

    // then (期待する結果):
    let error = recv_type(&mut ws, "ERROR").await;
    assert!(error["message"].as_str().unwrap().starts_with("Malformed message"));

    send(&mut ws, json!({"type": "SYNC", "t1": 1.0})).await;
    recv_type(&mut ws, "SYNC_REPLY").await;
}

#[tokio::test]
async fn test_drained_room_is_dropped_while_subscription_stays() {
    // テスト項目: 最後の output が抜けると購読者が残っていてもルームは削除され、次の参加はデフォルト 120 bpm で始まり購読者にも届く
    // given (前提条件):
    let addr = spawn_server().await;
    let mut subscriber = connect(addr).await;
    subscribe(&mut subscriber, "cycle").await;
    let mut output = connect(addr).await;
    join(&mut output, "cycle", "output", Some(80.0)).await;
    let update = recv_type(&mut subscriber, "ROOM_STATE_UPDATE").await;
    assert_eq!(update["roomState"]["beat"]["bpm"], 80.0);

    // when (操作):
    output.close(None).await.unwrap();
    wait_until_room_is_gone(addr, "cycle").await;

    // then (期待する結果):
    // 削除後に ROOM_STATE_UPDATE は届かず、削除済みルームへの MOTION_INPUT は ERROR になる
    send(
        &mut subscriber,
        json!({
            "type": "MOTION_INPUT",
            "roomName": "cycle",
            "userId": 1,
            "frontToBack": 0.0,
            "around": 0.0,
            "actionTimestamp": 1000.0,
            "lastBeatNumber": 0,
            "nextBeatTimestamp": 1500.0
        }),
    )
    .await;
    let next = recv(&mut subscriber).await;
    assert_eq!(next["type"], "ERROR");
    assert_eq!(next["message"], "Room 'cycle' not found");

    let mut next_output = connect(addr).await;
    let reply = join(&mut next_output, "cycle", "output", None).await;
    assert_eq!(reply["roomState"]["beat"]["bpm"], 120.0);
    assert_eq!(reply["roomState"]["subscriptionsCount"], 1);
    let update = recv_type(&mut subscriber, "ROOM_STATE_UPDATE").await;
    assert_eq!(update["roomState"]["beat"]["bpm"], 120.0);
}

#[tokio::test]
async fn test_last_room_state_update_matches_room_detail() {
    // テスト項目: 複数の接続が並行に参加・退出しても、メンバーが最後に受け取る ROOM_STATE_UPDATE はルームの最終状態と一致する
    // given (前提条件):
    let addr = spawn_server().await;
    let mut observer = connect(addr).await;
    join(&mut observer, "crowd", "output", None).await;

    // when (操作):
    let mut tasks = Vec::new();
    for i in 0..8 {
        tasks.push(tokio::spawn(async move {
            let mut ws = connect(addr).await;
            join(&mut ws, "crowd", "input", None).await;
            if i % 2 == 0 {
                send(&mut ws, json!({"type": "LEAVE_ROOM", "roomName": "crowd"})).await;
            }
            // 同じ接続のメッセージは順に処理されるので、SYNC_REPLY の時点で退出は反映済み
            send(&mut ws, json!({"type": "SYNC", "t1": 1.0})).await;
            recv_type(&mut ws, "SYNC_REPLY").await;
            ws
        }));
    }
    let mut clients = Vec::new();
    for task in tasks {
        clients.push(task.await.unwrap());
    }

    // then (期待する結果):
    let last = last_of_type(&mut observer, "ROOM_STATE_UPDATE")
        .await
        .expect("observer should see room updates");
    let detail: Value = reqwest::get(format!("http://{}/api/rooms/crowd", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["input_clients"].as_array().unwrap().len(), 4);
    assert_eq!(last["roomState"]["inputClients"], detail["input_clients"]);
    assert_eq!(last["roomState"]["outputClients"], detail["output_clients"]);
    drop(clients);
}

#[tokio::test]
async fn test_http_diagnostics() {
    // テスト項目: ヘルスチェック、ルーム一覧、ルーム詳細（存在しない場合は 404）
    // given (前提条件):
    let addr = spawn_server().await;
    let mut output = connect(addr).await;
    join(&mut output, "lobby", "output", None).await;
    let client = reqwest::Client::new();

    // when (操作):
    let health: Value = client
        .get(format!("http://{}/api/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms: Value = client
        .get(format!("http://{}/api/rooms", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail: Value = client
        .get(format!("http://{}/api/rooms/lobby", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing = client
        .get(format!("http://{}/api/rooms/nowhere", addr))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health["status"], "ok");
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["room_name"], "lobby");
    assert_eq!(rooms[0]["bpm"], 120.0);
    assert_eq!(detail["beat"]["bpm"], 120.0);
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}
