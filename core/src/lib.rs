//! # Scan Engine
//!
//! Runs external reconnaissance tools as streaming processes and wires their
//! interpreted output back into further scans.
//!
//! * [`runner`]: process launching and line streaming.
//! * [`task`]: one single-flight scanner per protocol.
//! * [`registry`]: lazily created scanner tasks.
//! * [`dispatch`]: open ports to scanners.
//! * [`discovery`]: the subdomain discovery loop.
//! * [`orchestrator`]: the session controller tying it all together.
//! * [`hosts`], [`credentials`]: file-backed stores.

pub mod credentials;
pub mod discovery;
pub mod dispatch;
pub mod hosts;
pub mod orchestrator;
pub mod registry;
pub mod runner;
pub mod task;
