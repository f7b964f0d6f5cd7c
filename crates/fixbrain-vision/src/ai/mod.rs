//! LLM access: prompt construction and chat-completion backends

pub mod backend;
pub mod openai;
pub mod prompts;
