//! Command-line parsing that also works in the browser
//!
//! On web there is no argv: GET parameters prefixed with `cli` become flags
//! (`?climap=route%3Dtrack.gpx` is `--map route=track.gpx`) and parameters prefixed
//! with `env` become environment variables readable through [`get_env`].

use clap::Parser;
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static ENV_MAP: std::cell::RefCell<HashMap<String, String>> = std::cell::RefCell::new(HashMap::new());
}

/// Program name used as argv[0] when building arguments from a query string
const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// Generic function to get environment variable, parsing it to the desired type.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    #[cfg(target_arch = "wasm32")]
    {
        ENV_MAP.with(|map| map.borrow().get(key).and_then(|s| s.parse().ok()))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var(key).ok().and_then(|s| s.parse().ok())
    }
}

/// Split a query string into clap arguments and environment variables
pub fn args_from_query(query: &str) -> (Vec<String>, HashMap<String, String>) {
    let mut args = vec![PROGRAM_NAME.to_string()];
    let mut env = HashMap::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if let Some(flag) = key.strip_prefix("cli") {
            if !flag.is_empty() {
                args.push(format!("--{flag}"));
            }
            if !value.is_empty() {
                args.push(value.into_owned());
            }
        } else if let Some(name) = key.strip_prefix("env") {
            if !name.is_empty() {
                env.insert(name.to_string(), value.into_owned());
            }
        }
    }

    (args, env)
}

/// Full URL of the hosting page
#[cfg(target_arch = "wasm32")]
pub fn page_url() -> Option<String> {
    web_sys::window().and_then(|w| w.location().href().ok())
}

/// Parses from the command line arguments on native and from GET parameters on web.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let (args, env) = query_args();
        ENV_MAP.with(|map| map.borrow_mut().extend(env));
        T::try_parse_from(args)
    }
}

/// Load `env`-prefixed GET parameters early, before logging is configured
#[cfg(target_arch = "wasm32")]
pub fn parse_env() {
    let (_, env) = query_args();
    ENV_MAP.with(|map| map.borrow_mut().extend(env));
}

#[cfg(target_arch = "wasm32")]
fn query_args() -> (Vec<String>, HashMap<String, String>) {
    let location = page_url().unwrap_or_default();
    let query = location
        .split_once('?')
        .map(|(_, query)| query.split('#').next().unwrap_or_default())
        .unwrap_or_default();
    args_from_query(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_query() {
        let (args, env) =
            args_from_query("climap=route%3Dtracks%2Fday1.gpx&clireplace-on-reinit&envLOG_LEVEL=debug");

        assert_eq!(
            args,
            [
                PROGRAM_NAME,
                "--map",
                "route=tracks/day1.gpx",
                "--replace-on-reinit"
            ]
        );
        assert_eq!(env.get("LOG_LEVEL").map(String::as_str), Some("debug"));
    }

    #[test]
    fn test_unprefixed_parameters_are_ignored() {
        let (args, env) = args_from_query("utm_source=mail&&cli=&env");
        assert_eq!(args, [PROGRAM_NAME]);
        assert!(env.is_empty());
    }

    #[test]
    fn test_query_values_are_form_decoded() {
        let (args, _) = args_from_query("climap=trip+1%3Dday%201.gpx");
        assert_eq!(args, [PROGRAM_NAME, "--map", "trip 1=day 1.gpx"]);
    }
}
