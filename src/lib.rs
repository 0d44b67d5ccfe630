#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Turnstile
//!
//! Client-side request pacing for the CRPT document-creation API: a
//! rolling-window admission gate in front of an HTTP submitter.
//!
//! ## Features
//!
//! - **Rate limiting** with per-grant expiry: at most `limit` admissions per
//!   rolling `window`, callers suspended (never dropped) while saturated
//! - **Strict FIFO fairness** among waiting callers
//! - **Prompt shutdown** that cancels queued waiters with a distinct error
//! - **Paced HTTP submission** — admission is throttled, execution is not
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turnstile::{DocumentSubmitter, Document, Quota};
//!
//! #[tokio::main]
//! async fn main() {
//!     let submitter = DocumentSubmitter::builder()
//!         .quota(Quota::per_second(3).unwrap())
//!         .build()
//!         .unwrap();
//!
//!     let document = Document { doc_id: "42".into(), ..Document::default() };
//!     match submitter.submit(&document, "signature").await {
//!         Ok(receipt) => println!("created: {}", receipt.status),
//!         Err(err) => eprintln!("submission failed: {err}"),
//!     }
//! }
//! ```

pub mod document;
pub mod error;
pub mod limiter;
pub mod quota;
pub mod submit;

// Re-exports
pub use document::{Document, ParticipantInn, Product};
pub use error::{AcquireError, QuotaError, SubmitError};
pub use limiter::{Admission, RateLimiter};
pub use quota::Quota;
pub use submit::{DocumentSubmitter, DocumentSubmitterBuilder, SubmitReceipt, CREATE_DOCUMENT_URL};
