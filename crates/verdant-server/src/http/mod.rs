// SPDX-License-Identifier: Apache-2.0

pub(crate) mod chat;
pub(crate) mod handlers;
pub(crate) mod identity;
pub(crate) mod profile;
pub(crate) mod proxy;
pub(crate) mod records;
pub(crate) mod reports;
pub(crate) mod request_tracing;
pub(crate) mod response_contract;
pub(crate) mod scenarios;
pub(crate) mod uploads;
