// Post generation: request validation, prompt building, the model call and
// lenient extraction of the posts object from the reply.
// All model calls go through llm_client.

pub mod extractor;
pub mod generator;
pub mod handlers;
pub mod prompts;
