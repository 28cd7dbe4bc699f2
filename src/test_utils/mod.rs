#![allow(missing_docs)]

pub(crate) mod alerts;
pub(crate) mod fake_api;

pub(crate) use alerts::{assert_error_alert, assert_success_alert};
pub(crate) use fake_api::FakeApi;
