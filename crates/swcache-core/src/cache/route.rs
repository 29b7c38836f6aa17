use reqwest::Method;

use crate::config::ResolvedConfig;
use crate::models::Request;

/// Why a request is left to the host untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    NonGet,
    ForeignOrigin,
}

/// What the fetch handler does with a request, decided before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Passthrough(PassReason),
    NetworkFirst,
}

impl Route {
    pub fn for_request(request: &Request, config: &ResolvedConfig) -> Self {
        if request.method != Method::GET {
            return Route::Passthrough(PassReason::NonGet);
        }
        if !config.is_same_origin(&request.url) && !config.is_allowlisted(&request.url) {
            return Route::Passthrough(PassReason::ForeignOrigin);
        }
        Route::NetworkFirst
    }

    pub fn intercepts(&self) -> bool {
        matches!(self, Route::NetworkFirst)
    }
}
