use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use tracing::debug;

/// Route segment, and fallback query parameter, carrying the device UUID.
pub const DEVICE_UUID_PARAM: &str = "device_uuid";

/// The device a request is about.
///
/// Resolution never fails: a request without an identifier gets a context
/// whose UUID is empty, and handlers decide what that means. Use it as a
/// handler argument; it is resolved once per request and cached in the
/// request extensions, so several extractions see the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceContext {
    device_uuid: String,
}

impl DeviceContext {
    pub fn new(device_uuid: impl Into<String>) -> Self {
        Self {
            device_uuid: device_uuid.into(),
        }
    }

    pub fn device_uuid(&self) -> &str {
        &self.device_uuid
    }

    pub fn is_empty(&self) -> bool {
        self.device_uuid.is_empty()
    }

    pub fn resolve(req: &HttpRequest) -> Self {
        let cached = req.extensions().get::<DeviceContext>().cloned();
        if let Some(context) = cached {
            return context;
        }

        let device_uuid = req
            .match_info()
            .get(DEVICE_UUID_PARAM)
            .map(str::to_owned)
            .or_else(|| query_device_uuid(req.query_string()))
            .unwrap_or_default();

        debug!("Resolved device context {:?} for {}", device_uuid, req.path());

        let context = DeviceContext { device_uuid };
        req.extensions_mut().insert(context.clone());
        context
    }
}

/// First `device_uuid` pair of the query string. Repeated or unrelated
/// parameters do not affect it.
fn query_device_uuid(query_string: &str) -> Option<String> {
    let pairs = match web::Query::<Vec<(String, String)>>::from_query(query_string) {
        Ok(pairs) => pairs.into_inner(),
        Err(err) => {
            debug!("Ignoring undecodable query string {:?}: {}", query_string, err);
            return None;
        }
    };

    pairs
        .into_iter()
        .find(|(key, _)| key == DEVICE_UUID_PARAM)
        .map(|(_, value)| value)
}

impl FromRequest for DeviceContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(DeviceContext::resolve(req)))
    }
}
