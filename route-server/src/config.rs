//! Server configuration from environment variables.
//!
//! | Variable                | Default          |
//! |-------------------------|------------------|
//! | `ROUTE_SERVER_ADDR`     | `127.0.0.1:3000` |
//! | `GRAPH_DIRS`            | `data/graphs`    |
//! | `GRAPH_CACHE_TTL_SECS`  | `300`            |
//! | `GRAPH_CACHE_CAPACITY`  | `64`             |
//! | `SEARCH_MAX_EXPANSIONS` | `1000000`        |
//!
//! `GRAPH_DIRS` is a platform path list (`:`-separated on Unix). Unset or
//! invalid values fall back to the defaults with a warning.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::CacheConfig;
use crate::planner::SearchConfig;

const DEFAULT_GRAPH_DIR: &str = "data/graphs";

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Directories searched, in order, for `<code>.json` graph files.
    pub graph_dirs: Vec<PathBuf>,
    pub cache: CacheConfig,
    pub search: SearchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            graph_dirs: vec![PathBuf::from(DEFAULT_GRAPH_DIR)],
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let addr = parse_or(&lookup, "ROUTE_SERVER_ADDR", defaults.addr, |_| true);

        let graph_dirs = match lookup("GRAPH_DIRS") {
            Some(value) => {
                let dirs: Vec<PathBuf> = std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect();
                if dirs.is_empty() {
                    warn!(value = %value, "GRAPH_DIRS is empty, using {DEFAULT_GRAPH_DIR}");
                    defaults.graph_dirs
                } else {
                    dirs
                }
            }
            None => defaults.graph_dirs,
        };

        let ttl_secs = parse_or(
            &lookup,
            "GRAPH_CACHE_TTL_SECS",
            defaults.cache.ttl.as_secs(),
            |&v| v > 0,
        );
        let max_capacity = parse_or(
            &lookup,
            "GRAPH_CACHE_CAPACITY",
            defaults.cache.max_capacity,
            |&v| v > 0,
        );
        let max_expansions = parse_or(
            &lookup,
            "SEARCH_MAX_EXPANSIONS",
            defaults.search.max_expansions,
            |&v| v > 0,
        );

        Self {
            addr,
            graph_dirs,
            cache: CacheConfig {
                ttl: Duration::from_secs(ttl_secs),
                max_capacity,
            },
            search: defaults.search.with_max_expansions(max_expansions),
        }
    }
}

/// Parse `key` if set, falling back to `default` when it is missing,
/// malformed, or rejected by `valid`.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        Ok(value) => {
            warn!(key, %value, %default, "Out of range, using default");
            default
        }
        Err(e) => {
            warn!(key, value = %raw, %default, error = %e, "Invalid value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[]));

        assert_eq!(config.addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.graph_dirs, vec![PathBuf::from("data/graphs")]);
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.search.max_expansions, 1_000_000);
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ROUTE_SERVER_ADDR", "0.0.0.0:8080"),
            ("GRAPH_DIRS", "/srv/graphs:/opt/graphs"),
            ("GRAPH_CACHE_TTL_SECS", "30"),
            ("GRAPH_CACHE_CAPACITY", "8"),
            ("SEARCH_MAX_EXPANSIONS", " 5000 "),
        ]));

        assert_eq!(config.addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        if cfg!(unix) {
            assert_eq!(
                config.graph_dirs,
                vec![PathBuf::from("/srv/graphs"), PathBuf::from("/opt/graphs")]
            );
        }
        assert_eq!(config.cache.ttl, Duration::from_secs(30));
        assert_eq!(config.cache.max_capacity, 8);
        assert_eq!(config.search.max_expansions, 5000);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ROUTE_SERVER_ADDR", "localhost"),
            ("GRAPH_DIRS", ""),
            ("GRAPH_CACHE_TTL_SECS", "soon"),
            ("GRAPH_CACHE_CAPACITY", "0"),
            ("SEARCH_MAX_EXPANSIONS", "-3"),
        ]));

        assert_eq!(config.addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.graph_dirs, vec![PathBuf::from("data/graphs")]);
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.search.max_expansions, 1_000_000);
    }
}
