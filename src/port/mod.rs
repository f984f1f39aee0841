//! Collaborator contracts consumed and exposed by the engine.

pub mod outbound;
