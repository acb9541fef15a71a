//! Library surface for the `fbf-server` binary: the protocol dispatcher
//! (component C7) and its transport binding, plus the ambient pieces
//! (configuration, the draft/setup stand-in, the timeout sink) the binary
//! wires together. Split from `main.rs` so integration tests can drive the
//! dispatcher directly without going through a real WebSocket, mirroring the
//! teacher's `lib.rs` + `src/bin/*.rs` split.

pub mod config;
pub mod dispatcher;
pub mod draft;
pub mod hosting;
pub mod sink;
