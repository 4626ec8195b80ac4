//! Streaming client for text generation servers.
//!
//! A generation posts one request and reads the response through a small
//! pipeline: the body's bytes are split into lines ([`decoder`]), each line
//! is parsed into a delta ([`parser`]), and chat deltas are merged field by
//! field ([`accumulator`]) until the stream's `[DONE]` marker. Callers see a
//! lazy stream of [`Fragment`]s from [`RemoteModel::generate`].

pub mod accumulator;
pub mod client;
pub mod decoder;
pub mod error;
pub mod models;
pub mod parser;

pub use accumulator::AccumulatedResult;
pub use client::{FragmentStream, HttpClientConfig, LlamaCppClient, RemoteModel};
pub use error::{Result, SlickError};
pub use models::{
    request::{GenerationOptions, GenerationRequest, Protocol, SamplingParams, Stop},
    response::Fragment,
};
