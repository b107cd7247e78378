//! HTTP round-tripping for conformance assertions
//!
//! Tests talk to the implementation under test through a swappable
//! round-tripper rather than a concrete client.

mod roundtripper;

pub use roundtripper::{DefaultRoundTripper, Request, Response, RoundTripper};
