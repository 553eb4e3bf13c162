// Career insights: profile in, model-generated insights out.
// The model's free text goes through `crate::interpret` before it reaches the client.

pub mod handlers;
pub mod models;
pub mod prompts;
