//! Integration tests for helpdesk
//!
//! These tests drive a full in-memory helpdesk through realistic flows:
//! open → assign → escalate → resolve → verify, plus the CLI sweep over
//! snapshot files.

#[path = "../common/mod.rs"]
#[allow(dead_code)]
mod common;

mod verification_flow_test;
