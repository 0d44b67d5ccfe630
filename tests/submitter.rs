use std::time::{Duration, Instant};
use turnstile::{Document, DocumentSubmitter, ParticipantInn, Quota, RateLimiter, SubmitError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREATE_PATH: &str = "/api/v3/lk/documents/create";

fn sample_document() -> Document {
    Document {
        description: Some(ParticipantInn { participant_inn: "7700000000".into() }),
        doc_id: "doc-1".into(),
        doc_status: "DRAFT".into(),
        doc_type: "LP_INTRODUCE_GOODS".into(),
        import_request: Some(true),
        owner_inn: "7700000000".into(),
        participant_inn: "7700000000".into(),
        producer_inn: "7700000000".into(),
        production_date: "2020-01-23".into(),
        production_type: "OWN_PRODUCTION".into(),
        products: vec![],
        reg_date: "2020-01-23".into(),
        reg_number: "RN-1".into(),
    }
}

fn submitter_against(server: &MockServer, quota: Quota) -> DocumentSubmitter {
    DocumentSubmitter::builder()
        .quota(quota)
        .endpoint(format!("{}{}", server.uri(), CREATE_PATH))
        .build()
        .unwrap()
}

#[tokio::test]
async fn accepted_document_yields_a_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"value\":\"ok\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = submitter_against(&server, Quota::per_second(5).unwrap());
    let receipt = submitter.submit(&sample_document(), "sig-1").await.unwrap();

    assert_eq!(receipt.status.as_u16(), 200);
    assert_eq!(receipt.body, "{\"value\":\"ok\"}");
}

#[tokio::test]
async fn created_status_also_counts_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let submitter = submitter_against(&server, Quota::per_second(5).unwrap());
    let receipt = submitter.submit(&sample_document(), "sig-1").await.unwrap();
    assert_eq!(receipt.status.as_u16(), 201);
}

#[tokio::test]
async fn signature_and_payload_reach_the_wire() {
    let server = MockServer::start().await;
    let document = sample_document();
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .and(header("Signature", "sig-abc"))
        .and(header("content-type", "application/json"))
        .and(body_json(&document))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = submitter_against(&server, Quota::per_second(5).unwrap());
    submitter.submit(&document, "sig-abc").await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_a_rejection_with_the_body_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("malformed inn"))
        .mount(&server)
        .await;

    let submitter = submitter_against(&server, Quota::per_second(5).unwrap());
    let err = submitter.submit(&sample_document(), "sig-1").await.unwrap_err();

    let (status, body) = err.rejection().expect("rejection details");
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, "malformed inn");
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    // Nothing listens on this port.
    let submitter = DocumentSubmitter::builder()
        .quota(Quota::per_second(5).unwrap())
        .endpoint("http://127.0.0.1:9/create")
        .build()
        .unwrap();

    let err = submitter.submit(&sample_document(), "sig-1").await.unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn submissions_are_paced_by_the_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let window = Duration::from_millis(150);
    let submitter = submitter_against(&server, Quota::new(1, window).unwrap());
    let document = sample_document();

    let start = Instant::now();
    for _ in 0..3 {
        submitter.submit(&document, "sig-1").await.unwrap();
    }
    assert!(start.elapsed() >= window * 2, "3 submits took only {:?}", start.elapsed());
}

#[tokio::test]
async fn invalid_input_consumes_no_permit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // A 1-per-30s quota: if the doomed submits below burned permits, the
    // valid one could not complete immediately.
    let submitter = submitter_against(&server, Quota::new(1, Duration::from_secs(30)).unwrap());
    let document = sample_document();

    for _ in 0..3 {
        let err = submitter.submit(&document, "").await.unwrap_err();
        assert!(err.is_invalid_argument());
    }

    let start = Instant::now();
    submitter.submit(&document, "sig-1").await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn one_gate_paces_the_union_of_submitters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let window = Duration::from_millis(150);
    let limiter = RateLimiter::new(Quota::new(1, window).unwrap());
    let endpoint = format!("{}{}", server.uri(), CREATE_PATH);
    let first = DocumentSubmitter::builder()
        .gate(limiter.clone())
        .endpoint(&endpoint)
        .build()
        .unwrap();
    let second = DocumentSubmitter::builder()
        .gate(limiter.clone())
        .endpoint(&endpoint)
        .build()
        .unwrap();
    let document = sample_document();

    let start = Instant::now();
    first.submit(&document, "sig-1").await.unwrap();
    second.submit(&document, "sig-1").await.unwrap();
    assert!(start.elapsed() >= window, "shared gate did not pace across submitters");
}

#[tokio::test]
async fn shutdown_while_queued_surfaces_as_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let limiter = RateLimiter::new(Quota::new(1, Duration::from_secs(30)).unwrap());
    let submitter = DocumentSubmitter::builder()
        .gate(limiter.clone())
        .endpoint(format!("{}{}", server.uri(), CREATE_PATH))
        .build()
        .unwrap();
    let document = sample_document();

    // Saturate the gate, then queue a second submit behind it.
    submitter.submit(&document, "sig-1").await.unwrap();
    let queued = tokio::spawn({
        let document = document.clone();
        async move { submitter.submit(&document, "sig-1").await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    limiter.shutdown();
    let err = queued.await.unwrap().unwrap_err();
    match err {
        SubmitError::Throttle(inner) => assert!(inner.is_cancelled()),
        e => panic!("expected Throttle(Cancelled), got {:?}", e),
    }
}
