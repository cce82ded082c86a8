//! Secure request pipeline for the Questgate platform client.
//!
//! Every logical API call flows through [`RequestPipeline`]:
//! - outbound: bearer credentials attached, body sealed with a fresh
//!   session key, the key RSA-wrapped into the query string and stashed in
//!   the key store under the call's correlation id
//! - inbound: the correlated key is loaded, the response body decrypted and
//!   parsed before the caller ever sees it
//! - on a first 401 the pipeline refreshes credentials (single-flight) and
//!   replays the call exactly once; a second 401 or a failed refresh ends
//!   the session
//!
//! Calls without a body bypass encryption entirely; query strings travel in
//! the clear.

mod error;
mod pipeline;
mod request;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{RequestPipeline, REQUEST_ID_HEADER, SESSION_HEADER, WRAPPED_KEY_PARAM};
pub use request::{ApiRequest, Attempt};
