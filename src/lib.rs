//! Smart-home command interpretation and device dispatch, exposed as agent
//! tools over an authenticated JSON-RPC endpoint.

pub mod camera;
pub mod command;
pub mod config;
pub mod devices;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod server;
pub mod tools;
