//! HTTP gateway that puts several hosted model providers behind three uniform endpoints:
//! inference pass-through, metadata comparison and demo URL lookup.

pub mod api_types;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod demo;
pub mod error;
pub mod inference;
pub mod provider;
pub mod router;
pub mod state;
pub mod upstream;
