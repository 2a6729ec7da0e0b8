//
//  graph-client
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Host Configuration Module
//!
//! Constants for the well-known API hosts and [`Endpoints`], the compiled
//! form of [`ServerConfig`] that the request encoder uses to pick a server
//! and prefix the API version.
//!
//! ## Host Routing
//!
//! | Call option | Host (defaults) |
//! |-------------|-----------------|
//! | none | `graph.facebook.com` |
//! | `rest_api` | `api.facebook.com` |
//! | `video` | `graph-video.facebook.com` |
//! | `beta` | `graph.beta.facebook.com` |
//!
//! Video and beta hosts are derived by replacing the first match of
//! `host_path_matcher` in the base host.
//!
//! ## Usage
//!
//! ```rust
//! use graph_client::api::RequestOptions;
//! use graph_client::config::{Endpoints, ServerConfig};
//!
//! let endpoints = Endpoints::from_config(&ServerConfig::default()).unwrap();
//! assert_eq!(endpoints.server(&RequestOptions::default()), "https://graph.facebook.com");
//! assert_eq!(endpoints.server(&RequestOptions::new().video()), "https://graph-video.facebook.com");
//! assert_eq!(endpoints.server(&RequestOptions::new().beta()), "https://graph.beta.facebook.com");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::ServerConfig;
use crate::api::common::ApiError;
use crate::api::RequestOptions;

/// Default Graph API host.
pub const GRAPH_SERVER: &str = "graph.facebook.com";

/// Default legacy REST API host.
pub const REST_SERVER: &str = "api.facebook.com";

/// Default OAuth dialog host.
pub const DIALOG_HOST: &str = "www.facebook.com";

/// Default matcher for host rewriting.
pub const HOST_PATH_MATCHER: &str = r"\.facebook";

/// Default replacement for video upload routing.
pub const VIDEO_REPLACE: &str = "-video.facebook";

/// Default replacement for beta routing.
pub const BETA_REPLACE: &str = ".beta.facebook";

/// Matches a leading `vN` or `vN.N` path segment.
static API_VERSION_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/?v\d+(?:\.\d+)?/").unwrap_or_else(|e| panic!("invalid version regex: {e}"))
});

static DEFAULT_HOST_MATCHER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(HOST_PATH_MATCHER).unwrap_or_else(|e| panic!("invalid host matcher: {e}"))
});

/// Server configuration with the host matcher compiled.
///
/// Built once per client; building fails if `host_path_matcher` is not a
/// valid regex.
#[derive(Debug, Clone)]
pub struct Endpoints {
    graph_server: String,
    rest_server: String,
    host_matcher: Regex,
    video_replace: String,
    beta_replace: String,
    api_version: Option<String>,
    scheme: &'static str,
}

impl Endpoints {
    /// Compiles a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when `host_path_matcher` does not compile.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ApiError> {
        let host_matcher = Regex::new(&config.host_path_matcher).map_err(|e| {
            ApiError::Config(format!(
                "invalid host_path_matcher {:?}: {e}",
                config.host_path_matcher
            ))
        })?;

        Ok(Self {
            graph_server: config.graph_server.clone(),
            rest_server: config.rest_server.clone(),
            host_matcher,
            video_replace: config.video_replace.clone(),
            beta_replace: config.beta_replace.clone(),
            api_version: config.api_version.clone().filter(|v| !v.is_empty()),
            scheme: if config.use_ssl { "https" } else { "http" },
        })
    }

    /// The configured API version, if any.
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Returns `scheme://host` for a call with the given options.
    pub fn server(&self, options: &RequestOptions) -> String {
        let base = if options.rest_api {
            &self.rest_server
        } else {
            &self.graph_server
        };

        let mut host = base.clone();
        if options.video {
            host = self
                .host_matcher
                .replace(&host, self.video_replace.as_str())
                .into_owned();
        }
        if options.beta {
            host = self
                .host_matcher
                .replace(&host, self.beta_replace.as_str())
                .into_owned();
        }

        format!("{}://{}", self.scheme, host)
    }

    /// Prefixes the API version onto a normalized path.
    ///
    /// The call's own version wins over the configured one. REST calls and
    /// paths that already start with a version segment are left unchanged.
    pub fn versioned_path(&self, path: &str, options: &RequestOptions) -> String {
        if options.rest_api || path_has_version(path) {
            return path.to_string();
        }

        match options.api_version.as_deref().or(self.api_version()) {
            Some(version) if !version.is_empty() => {
                let divider = if path.starts_with('/') { "" } else { "/" };
                format!("/{version}{divider}{path}")
            }
            _ => path.to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graph_server: GRAPH_SERVER.to_string(),
            rest_server: REST_SERVER.to_string(),
            host_matcher: DEFAULT_HOST_MATCHER.clone(),
            video_replace: VIDEO_REPLACE.to_string(),
            beta_replace: BETA_REPLACE.to_string(),
            api_version: None,
            scheme: "https",
        }
    }
}

/// True when the path already starts with a `vN[.N]/` segment.
pub fn path_has_version(path: &str) -> bool {
    API_VERSION_PATH.is_match(path)
}
