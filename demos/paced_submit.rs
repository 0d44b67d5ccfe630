//! 50 concurrent tasks funneled through a 3-per-second gate.
//!
//! Grant pacing is visible in the printed elapsed times: the first three
//! submissions start immediately, then roughly three more per second.
//!
//! By default this posts to the production endpoint (and will be rejected
//! without credentials); point it elsewhere with:
//!
//! ```text
//! TURNSTILE_ENDPOINT=http://127.0.0.1:8080/create cargo run --example paced_submit
//! ```

use std::sync::Arc;
use std::time::Instant;
use turnstile::{Document, DocumentSubmitter, ParticipantInn, Quota, CREATE_DOCUMENT_URL};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::var("TURNSTILE_ENDPOINT")
        .unwrap_or_else(|_| CREATE_DOCUMENT_URL.to_string());
    let submitter = Arc::new(
        DocumentSubmitter::builder()
            .quota(Quota::per_second(3).expect("nonzero limit"))
            .endpoint(endpoint)
            .build()
            .expect("valid endpoint"),
    );

    let document = Document {
        description: Some(ParticipantInn { participant_inn: "1234567890".into() }),
        doc_id: "demo-1".into(),
        doc_status: "DRAFT".into(),
        doc_type: "LP_INTRODUCE_GOODS".into(),
        import_request: Some(true),
        production_date: "2020-01-23".into(),
        reg_date: "2020-01-23".into(),
        ..Document::default()
    };

    let started = Instant::now();
    let mut handles = Vec::new();
    for task in 0..50 {
        let submitter = submitter.clone();
        let document = document.clone();
        handles.push(tokio::spawn(async move {
            let outcome = match submitter.submit(&document, "some signature").await {
                Ok(receipt) => receipt.status.to_string(),
                Err(err) => err.to_string(),
            };
            println!("{:>8.2?}  task {:02}  {}", started.elapsed(), task, outcome);
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }
}
