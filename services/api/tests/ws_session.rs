use async_trait::async_trait;
use chrono::DateTime;
use futures_util::{SinkExt, StreamExt};
use axum::{Router, extract::ws::WebSocketUpgrade, routing::get};
use game_chat_api::{
    router::create_router,
    state::AppState,
    ws::{WsChannel, protocol::QuestionMessage},
};
use game_chat_core::{
    answer::AnswerRecord,
    channel::{EventPublisher, SessionChannel},
    error::{PublishError, ReceiveError, SendError},
    question::{Operator, compose},
    session::SessionSettings,
};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Records every published answer and optionally fails each publish.
#[derive(Default)]
struct RecordingPublisher {
    records: Mutex<Vec<AnswerRecord>>,
    fail: bool,
}

impl RecordingPublisher {
    fn records(&self) -> Vec<AnswerRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, record: &AnswerRecord) -> Result<(), PublishError> {
        self.records.lock().unwrap().push(record.clone());
        if self.fail {
            return Err(PublishError::Broker("broker down".into()));
        }
        Ok(())
    }
}

async fn spawn_server(publisher: Arc<RecordingPublisher>, settings: SessionSettings) -> SocketAddr {
    let state = Arc::new(AppState {
        publisher,
        session_settings: settings,
    });
    serve(create_router(state)).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    ws
}

async fn next_question(ws: &mut Client) -> QuestionMessage {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a question")
            .expect("stream ended")
            .expect("read failed");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Drains the client until the server closes the connection.
async fn wait_for_close(ws: &mut Client) {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    })
    .await;
    assert!(result.is_ok(), "server did not close the connection");
}

fn answer_frame(question: &QuestionMessage, user_answer: &str) -> Message {
    let frame = json!({
        "gameId": 12,
        "mode": "sprint",
        "question": question.question,
        "userAnswer": user_answer,
        "correctAnswer": question.correct_answer,
        "isCorrect": user_answer == question.correct_answer,
        "answerTime": "2024-05-01T12:00:00.5+02:00",
    });
    Message::text(frame.to_string())
}

#[tokio::test]
async fn test_answers_flow_to_publisher() {
    let publisher = Arc::new(RecordingPublisher::default());
    let addr = spawn_server(publisher.clone(), SessionSettings::default()).await;
    let mut ws = connect(addr).await;

    let first = next_question(&mut ws).await;
    assert_eq!(first.question.split(' ').count(), 3);
    assert!(first.correct_answer.ends_with(".00"));

    ws.send(answer_frame(&first, &first.correct_answer))
        .await
        .unwrap();

    // The next question only goes out after the previous answer was published.
    let _second = next_question(&mut ws).await;
    let records = publisher.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.game_id, 12);
    assert_eq!(record.mode, "sprint");
    assert_eq!(record.question, first.question);
    assert_eq!(record.correct_answer, first.correct_answer);
    assert!(record.is_correct);
    assert_eq!(
        record.answer_time,
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00.5+02:00").unwrap()
    );

    ws.close(None).await.unwrap();
    wait_for_close(&mut ws).await;
    assert_eq!(publisher.records().len(), 1);
}

#[tokio::test]
async fn test_malformed_answer_keeps_session_alive() {
    let publisher = Arc::new(RecordingPublisher::default());
    let addr = spawn_server(publisher.clone(), SessionSettings::default()).await;
    let mut ws = connect(addr).await;

    let _first = next_question(&mut ws).await;
    ws.send(Message::text("definitely not json".to_string())).await.unwrap();

    let second = next_question(&mut ws).await;
    assert_eq!(publisher.records(), vec![AnswerRecord::default()]);

    ws.send(answer_frame(&second, "0")).await.unwrap();
    let _third = next_question(&mut ws).await;
    let records = publisher.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].user_answer, "0");
}

#[tokio::test]
async fn test_publish_failure_keeps_session_alive() {
    let publisher = Arc::new(RecordingPublisher {
        fail: true,
        ..Default::default()
    });
    let addr = spawn_server(publisher.clone(), SessionSettings::default()).await;
    let mut ws = connect(addr).await;

    let first = next_question(&mut ws).await;
    ws.send(answer_frame(&first, "1")).await.unwrap();
    let second = next_question(&mut ws).await;
    ws.send(answer_frame(&second, "2")).await.unwrap();
    let _third = next_question(&mut ws).await;

    assert_eq!(publisher.records().len(), 2);
}

#[tokio::test]
async fn test_idle_client_is_disconnected_after_deadline() {
    let publisher = Arc::new(RecordingPublisher::default());
    let settings = SessionSettings {
        answer_timeout: Some(Duration::from_millis(100)),
    };
    let addr = spawn_server(publisher.clone(), settings).await;
    let mut ws = connect(addr).await;

    let _first = next_question(&mut ws).await;
    wait_for_close(&mut ws).await;
    assert!(publisher.records().is_empty());
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let publisher = Arc::new(RecordingPublisher::default());
    let addr = spawn_server(publisher.clone(), SessionSettings::default()).await;
    let mut idle = connect(addr).await;
    let mut active = connect(addr).await;

    // One client never answers; the other still completes its cycles.
    let _ = next_question(&mut idle).await;
    let first = next_question(&mut active).await;
    active.send(answer_frame(&first, "7")).await.unwrap();
    let second = next_question(&mut active).await;
    active.send(answer_frame(&second, "8")).await.unwrap();
    let _third = next_question(&mut active).await;

    let answers: Vec<String> = publisher
        .records()
        .into_iter()
        .map(|r| r.user_answer)
        .collect();
    assert_eq!(answers, vec!["7".to_string(), "8".to_string()]);
}

#[tokio::test]
async fn test_abrupt_disconnect_publishes_nothing() {
    let publisher = Arc::new(RecordingPublisher::default());
    let addr = spawn_server(publisher.clone(), SessionSettings::default()).await;
    let mut ws = connect(addr).await;

    let _first = next_question(&mut ws).await;
    // Drop the TCP connection without a closing handshake.
    drop(ws);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(publisher.records().is_empty(), "{:?}", publisher.records());
}

#[tokio::test]
async fn test_binary_answer_is_published() {
    let publisher = Arc::new(RecordingPublisher::default());
    let addr = spawn_server(publisher.clone(), SessionSettings::default()).await;
    let mut ws = connect(addr).await;

    let first = next_question(&mut ws).await;
    let frame = answer_frame(&first, "42").into_data();
    ws.send(Message::binary(frame.to_vec())).await.unwrap();
    let _second = next_question(&mut ws).await;

    let records = publisher.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_answer, "42");
    assert_eq!(records[0].question, first.question);
}

#[tokio::test]
async fn test_ping_before_answer_is_skipped() {
    let publisher = Arc::new(RecordingPublisher::default());
    let addr = spawn_server(publisher.clone(), SessionSettings::default()).await;
    let mut ws = connect(addr).await;

    let first = next_question(&mut ws).await;
    ws.send(Message::Ping(b"are you there".to_vec().into()))
        .await
        .unwrap();
    ws.send(answer_frame(&first, "3")).await.unwrap();
    let _second = next_question(&mut ws).await;

    let records = publisher.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_answer, "3");
}

#[tokio::test]
async fn test_closed_channel_sends_one_close_frame_and_refuses_io() {
    let (result_tx, result_rx) = tokio::sync::oneshot::channel();
    let result_tx = Arc::new(Mutex::new(Some(result_tx)));

    let app = Router::new().route(
        "/ws",
        get(move |ws: WebSocketUpgrade| {
            let result_tx = result_tx.clone();
            async move {
                ws.on_upgrade(move |socket| async move {
                    let mut channel = WsChannel::new(socket);
                    channel.close().await;
                    channel.close().await;
                    let sent = channel.send(&compose(1, Operator::Add, 2)).await;
                    let received = channel.receive().await;
                    let tx = result_tx.lock().unwrap().take();
                    if let Some(tx) = tx {
                        let _ = tx.send((sent, received));
                    }
                })
            }
        }),
    );
    let addr = serve(app).await;
    let mut ws = connect(addr).await;

    let mut close_frames = 0;
    let mut other_frames = 0;
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Close(_)) => close_frames += 1,
                Ok(_) => other_frames += 1,
                Err(_) => break,
            }
        }
    })
    .await;
    assert!(drained.is_ok(), "server did not close the connection");
    assert_eq!(close_frames, 1);
    assert_eq!(other_frames, 0);

    let (sent, received) = tokio::time::timeout(Duration::from_secs(5), result_rx)
        .await
        .expect("channel results not reported")
        .unwrap();
    assert!(matches!(sent, Err(SendError::Closed)));
    assert!(matches!(received, Err(ReceiveError::Closed)));
}
