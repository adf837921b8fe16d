//! Caller identity extractor
//!
//! The identity gateway authenticates the user and forwards the id in a
//! header (`X-User-Id` unless configured otherwise). A missing or blank
//! header means the caller is anonymous.

use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use pv_core::domain::OwnerId;
use std::future::{ready, Ready};

use crate::app::AppState;

const DEFAULT_IDENTITY_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity(pub Option<OwnerId>);

impl CallerIdentity {
    pub fn owner(&self) -> Option<&OwnerId> {
        self.0.as_ref()
    }

    pub fn from_request_header(req: &HttpRequest, header_name: &str) -> Self {
        let owner = req
            .headers()
            .get(header_name)
            .and_then(|value| value.to_str().ok())
            .and_then(OwnerId::parse);
        Self(owner)
    }
}

impl FromRequest for CallerIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header_name = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.identity_header.clone())
            .unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.to_string());

        ready(Ok(Self::from_request_header(req, &header_name)))
    }
}
