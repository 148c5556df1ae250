mod locale_service;

pub use locale_service::{LocaleOutcome, LocaleRequest, LocaleService, DEBUG_QUERY_PARAM};
