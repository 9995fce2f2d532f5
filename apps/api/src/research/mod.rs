// Research relay.
// Composes the upstream prompt from the caller's request and fans out to the
// language model and the grants database. Upstream semantics stay opaque here.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod service;
