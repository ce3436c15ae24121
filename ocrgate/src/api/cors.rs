use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

fn parse_all<T>(values: &[String], what: &str, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    values
        .iter()
        .filter_map(|v| {
            let parsed = parse(v);
            if parsed.is_none() {
                tracing::warn!("Ignoring invalid CORS {} '{}'", what, v);
            }
            parsed
        })
        .collect()
}

/// Build the CORS layer from configuration.
///
/// Browsers reject `*` together with credentials, so when credentials are
/// enabled a wildcard is served by mirroring the request instead.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mirror = config.credentials;

    let origins = if is_wildcard(&config.origins) {
        if mirror {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::from(Any)
        }
    } else {
        AllowOrigin::list(parse_all(&config.origins, "origin", |v| {
            HeaderValue::from_str(v).ok()
        }))
    };

    let methods = if is_wildcard(&config.methods) {
        if mirror {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::from(Any)
        }
    } else {
        AllowMethods::list(parse_all(&config.methods, "method", |v| {
            Method::from_bytes(v.to_uppercase().as_bytes()).ok()
        }))
    };

    let headers = if is_wildcard(&config.headers) {
        if mirror {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::from(Any)
        }
    } else {
        AllowHeaders::list(parse_all(&config.headers, "header", |v| {
            HeaderName::from_bytes(v.as_bytes()).ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_detection() {
        assert!(is_wildcard(&["*".to_string()]));
        assert!(!is_wildcard(&["https://example.com".to_string()]));
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let parsed = parse_all(
            &["GET".to_string(), "BAD METHOD".to_string()],
            "method",
            |v| Method::from_bytes(v.as_bytes()).ok(),
        );
        assert_eq!(parsed, vec![Method::GET]);
    }
}
