//! HTTP gateway for proxy re-encryption
//!
//! | Route | Operation |
//! |-------|-----------|
//! | `POST /newpks` | issue publisher keys |
//! | `POST /newsks` | issue subscriber keys and switching key |
//! | `POST /switchingkey` | derive a switching key (if enabled) |
//! | `POST /encrypt` | encrypt for a publisher |
//! | `POST /reencrypt` | re-encrypt for a subscriber |
//! | `POST /decrypt` | decrypt as a subscriber |
//! | `GET /health` | liveness and parameters |

pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod state;
