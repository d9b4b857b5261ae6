//! Staff identification for HTTP requests.
//!
//! Authentication happens upstream (gateway or session layer); handlers only
//! need the acting staff member's id, carried in the `X-Staff-Id` header.
//! Authorization proper lives in the domain, keyed on the actor's role
//! capabilities.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::domain::Error;

/// Header carrying the authenticated staff member's id.
pub const STAFF_ID_HEADER: &str = "X-Staff-Id";

/// The staff member on whose behalf a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffContext {
    pub staff_id: i32,
}

impl FromRequest for StaffContext {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(staff_id_from(req).map(|staff_id| Self { staff_id }))
    }
}

fn staff_id_from(req: &HttpRequest) -> Result<i32, Error> {
    let value = req
        .headers()
        .get(STAFF_ID_HEADER)
        .ok_or_else(|| Error::unauthorized("missing X-Staff-Id header"))?;
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.parse::<i32>().ok())
        .ok_or_else(|| Error::unauthorized("X-Staff-Id header must be an integer id"))
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[actix_web::test]
    async fn header_is_required() {
        let request = TestRequest::default().to_http_request();
        let error = StaffContext::extract(&request).await.expect_err("missing");
        assert_eq!(error.message(), "missing X-Staff-Id header");
    }

    #[actix_web::test]
    async fn non_numeric_header_is_rejected() {
        let request = TestRequest::default()
            .insert_header((STAFF_ID_HEADER, "dana"))
            .to_http_request();
        assert!(StaffContext::extract(&request).await.is_err());
    }

    #[actix_web::test]
    async fn numeric_header_is_accepted() {
        let request = TestRequest::default()
            .insert_header((STAFF_ID_HEADER, "42"))
            .to_http_request();
        let context = StaffContext::extract(&request).await.expect("staff id");
        assert_eq!(context.staff_id, 42);
    }
}
