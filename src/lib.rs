#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts
)]

//! A one-shot-per-connection HTTP file server. Every accepted connection is
//! handed to a [`worker::ConnectionWorker`], which performs exactly one
//! request/response cycle over the raw byte stream and then closes it.

pub mod config;
pub mod resource;
pub mod server_impl;
pub mod template;
pub mod worker;

pub type AnyResult<T> = eyre::Result<T>;
