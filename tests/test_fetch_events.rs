use std::sync::Mutex;
use std::time::Duration;

use chrono::TimeZone;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uust_schedule::calendar::TIMEZONE;
use uust_schedule::error::{ScheduleError, TransportError};
use uust_schedule::models::event_model::Event;
use uust_schedule::models::{FetchOptions, ParticipantType, SemesterType};
use uust_schedule::schedule::Schedule;
use uust_schedule::transport::{ScheduleRequest, Transport};

const SCHEDULE_HTML: &str = include_str!("test.schedule.html");

/// Serves a canned page and remembers every request it got.
pub struct TestTransport {
    pub status: Option<u16>,
    pub requests: Mutex<Vec<ScheduleRequest>>,
}

impl TestTransport {
    fn ok() -> Self {
        TestTransport {
            status: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        TestTransport {
            status: Some(status),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl Transport for TestTransport {
    async fn execute(&self, request: &ScheduleRequest) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.status {
            Some(status) => Err(TransportError::Status {
                status,
                url: request.url.clone(),
            }),
            None => Ok(SCHEDULE_HTML.to_string()),
        }
    }
}

fn expected_events() -> Vec<Event> {
    vec![
        Event {
            title: "name0".to_string(),
            event_type: "event_type0".to_string(),
            participant: "fio0".to_string(),
            location: "location0".to_string(),
            comment: "comment0".to_string(),
            start_datetime: TIMEZONE.with_ymd_and_hms(2023, 8, 28, 8, 0, 0).unwrap(),
            end_datetime: TIMEZONE.with_ymd_and_hms(2023, 8, 28, 9, 20, 0).unwrap(),
        },
        Event {
            title: "name1".to_string(),
            event_type: "event_type1".to_string(),
            participant: "fio1".to_string(),
            location: "location1".to_string(),
            comment: "comment1".to_string(),
            start_datetime: TIMEZONE.with_ymd_and_hms(2024, 8, 24, 22, 55, 0).unwrap(),
            end_datetime: TIMEZONE.with_ymd_and_hms(2024, 8, 24, 23, 0, 0).unwrap(),
        },
    ]
}

#[tokio::test]
async fn test_fetch_group_events() {
    let transport = TestTransport::ok();
    let schedule = Schedule::from_code(1, 2575, 2023).unwrap();

    let page = schedule
        .fetch_events_with(&transport, Some(SemesterType::Autumn), &FetchOptions::default())
        .await
        .unwrap();
    let events = page.events().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(events, expected_events());
    assert_eq!(events[0].daily_number().unwrap(), 1);
    assert_eq!(events[1].daily_number().unwrap(), 10);

    let requests = transport.requests.lock().unwrap();
    assert_eq!(
        *requests,
        vec![ScheduleRequest {
            url: "https://isu.uust.ru/api/new_schedule_api".to_string(),
            query: vec![
                ("WhatShow", "1".to_string()),
                ("schedule_semestr_id", "231".to_string()),
                ("weeks", "0".to_string()),
                ("student_group_id", "2575".to_string()),
            ],
            timeout: Duration::from_secs(60),
        }]
    );
}

#[tokio::test]
async fn test_fetch_teacher_events_with_custom_options() {
    let transport = TestTransport::ok();
    let schedule = Schedule::new(ParticipantType::Teacher, 1234, 2023).unwrap();
    let options = FetchOptions {
        base_url: "http://127.0.0.1:8000/".to_string(),
        request_timeout: 3,
    };

    let page = schedule
        .fetch_events_with(&transport, Some(SemesterType::Spring), &options)
        .await
        .unwrap();
    assert_eq!(page.events().count(), 2);

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].url, "http://127.0.0.1:8000/api/new_schedule_api");
    assert_eq!(requests[0].timeout, Duration::from_secs(3));
    assert!(requests[0]
        .query
        .contains(&("schedule_semestr_id", "232".to_string())));
    assert!(requests[0].query.contains(&("teacher", "1234".to_string())));
}

#[tokio::test]
async fn test_fetch_uses_current_semester_when_omitted() {
    let transport = TestTransport::ok();
    let schedule = Schedule::from_code(1, 2575, 2023).unwrap();
    let current = uust_schedule::calendar::current_semester_type().unwrap();

    schedule
        .fetch_events_with(&transport, None, &FetchOptions::default())
        .await
        .unwrap();

    let requests = transport.requests.lock().unwrap();
    assert!(requests[0]
        .query
        .contains(&("schedule_semestr_id", format!("23{}", current.code()))));
}

#[tokio::test]
async fn test_fetch_is_repeatable() {
    let transport = TestTransport::ok();
    let schedule = Schedule::from_code(2, 77, 2023).unwrap();
    let options = FetchOptions::default();

    let first = schedule
        .fetch_events_with(&transport, Some(SemesterType::Autumn), &options)
        .await
        .unwrap();
    let second = schedule
        .fetch_events_with(&transport, Some(SemesterType::Autumn), &options)
        .await
        .unwrap();

    assert_eq!(
        first.events().collect::<Result<Vec<_>, _>>().unwrap(),
        second.events().collect::<Result<Vec<_>, _>>().unwrap()
    );
    assert_eq!(transport.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_propagates_bad_status() {
    let transport = TestTransport::failing(503);
    let schedule = Schedule::from_code(1, 2575, 2023).unwrap();

    let result = schedule
        .fetch_events_with(&transport, Some(SemesterType::Autumn), &FetchOptions::default())
        .await;

    match result {
        Err(ScheduleError::Transport(TransportError::Status { status, url })) => {
            assert_eq!(status, 503);
            assert_eq!(url, "https://isu.uust.ru/api/new_schedule_api");
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected a transport error"),
    }
}

#[tokio::test]
async fn test_invalid_base_url_fails_before_request() {
    let transport = TestTransport::ok();
    let schedule = Schedule::from_code(1, 2575, 2023).unwrap();
    let options = FetchOptions {
        base_url: "isu.uust.ru".to_string(),
        request_timeout: 60,
    };

    let result = schedule
        .fetch_events_with(&transport, Some(SemesterType::Autumn), &options)
        .await;

    assert!(matches!(result, Err(ScheduleError::InvalidBaseUrl { .. })));
    assert!(transport.requests.lock().unwrap().is_empty());
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

/// Accepts one connection, answers it with `response` (or stays silent for
/// `silence` when there is none) and returns the received request head.
async fn serve_once(
    response: Option<String>,
    silence: Duration,
) -> (FetchOptions, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let options = FetchOptions {
        base_url: format!("http://{}/", listener.local_addr().unwrap()),
        request_timeout: 1,
    };

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = socket.read(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            head.extend_from_slice(&buf[..read]);
        }
        match response {
            Some(response) => {
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            None => tokio::time::sleep(silence).await,
        }
        String::from_utf8(head).unwrap()
    });

    (options, server)
}

#[tokio::test]
async fn test_client_sends_query_and_parses_body() {
    let body = "<html><body><table><tbody><tr class=\"dayheader\"><td>Понедельник</td><td>08:00-09:20</td><td>1</td><td>name0</td><td>event_type0</td><td>fio0</td><td>location0</td><td>comment0</td></tr></tbody></table></body></html>";
    let (options, server) = serve_once(Some(http_response("200 OK", body)), Duration::ZERO).await;
    let schedule = Schedule::from_code(1, 2575, 2023).unwrap();

    let page = schedule
        .fetch_events(Some(SemesterType::Autumn), &options)
        .await
        .unwrap();
    let events = page.events().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(events, expected_events()[..1].to_vec());

    let head = server.await.unwrap();
    assert_eq!(
        head.lines().next().unwrap(),
        "GET /api/new_schedule_api?WhatShow=1&schedule_semestr_id=231&weeks=0&student_group_id=2575 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_client_reports_bad_status() {
    let (options, server) = serve_once(
        Some(http_response("503 Service Unavailable", "busy")),
        Duration::ZERO,
    )
    .await;
    let schedule = Schedule::from_code(1, 2575, 2023).unwrap();

    let result = schedule
        .fetch_events(Some(SemesterType::Autumn), &options)
        .await;

    match result {
        Err(ScheduleError::Transport(TransportError::Status { status, url })) => {
            assert_eq!(status, 503);
            assert!(url.starts_with(&format!("{}api/new_schedule_api?", options.base_url)));
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected a transport error"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_client_times_out() {
    let (options, _server) = serve_once(None, Duration::from_secs(5)).await;
    let schedule = Schedule::from_code(1, 2575, 2023).unwrap();

    let result = schedule
        .fetch_events(Some(SemesterType::Autumn), &options)
        .await;

    match result {
        Err(ScheduleError::Transport(TransportError::Http(err))) => assert!(err.is_timeout()),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected a timeout"),
    }
}
