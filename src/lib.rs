//! Distributed numerical integration over an HTTP-shaped line protocol.
//!
//! # Architecture Overview
//!
//! ```text
//!   intclient                                   intserver
//!  ┌──────────────┐                ┌───────────────────────────────────────┐
//!  │ job_line     │                │ net::Listener                         │
//!  │   ↓          │  GET /validate │   ↓                                   │
//!  │ connection ──┼───────────────▶│ server::session (one per connection)  │
//!  │   ↑          │  GET /integrate│   ↓                                   │
//!  │ render  ◀────┼────────────────│ server::handlers                      │
//!  └──────────────┘                │   ↓                                   │
//!                                  │ integration::Coordinator              │
//!                                  │   ↓ admit (global cap)                │
//!                                  │ workers (trapezoid, evaluator)        │
//!                                  │                                       │
//!                                  │ ServerState counters ◀── SIGHUP stats │
//!                                  └───────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod evaluator;
pub mod integration;
pub mod net;
pub mod protocol;
pub mod server;

// Client side
pub mod client;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use integration::Job;
pub use lifecycle::Shutdown;
pub use server::IntegrationServer;
