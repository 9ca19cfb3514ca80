//! Client-side routing for the quiz platform: a static table of paths, views
//! and access metadata, plus a guard that runs before every navigation. The
//! guard only reads the stored credentials; token validity is the session's
//! concern (see [`crate::session::AuthSession::check_auth`]).

mod guard;
mod routes;

pub use guard::{before_each, GuardDecision};
pub use routes::{
    match_route, normalize_path, RouteDescriptor, RouteMatch, RouteMeta, Target, View, ROUTES,
};

use crate::store::CredentialStore;
use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;
use tracing::{debug, info};

/// Longest redirect chain followed before giving up.
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("too many redirects navigating to {path} (gave up at {last})")]
    RedirectLoop { path: String, last: String },
}

/// A resolved position in the route table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub name: Option<&'static str>,
    pub view: Option<View>,
    pub params: BTreeMap<String, String>,
    pub meta: RouteMeta,
}

impl Location {
    /// Where a router sits before its first navigation.
    #[must_use]
    pub fn start() -> Self {
        Self {
            path: "/".to_string(),
            name: None,
            view: None,
            params: BTreeMap::new(),
            meta: RouteMeta::default(),
        }
    }

    fn resolve(path: &str) -> (Self, Option<RouteMatch>) {
        let path = normalize_path(path);
        match match_route(&path) {
            Some(found) => {
                let view = match found.route.target {
                    Target::View(view) => Some(view),
                    Target::Redirect(_) => None,
                };
                let location = Self {
                    path,
                    name: found.route.name,
                    view,
                    params: found.params.clone(),
                    meta: found.route.meta,
                };
                (location, Some(found))
            }
            None => (
                Self {
                    path,
                    ..Self::start()
                },
                None,
            ),
        }
    }

    /// True when no route matched this path.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.view.is_none() && self.name.is_none()
    }
}

pub struct Router {
    store: Arc<dyn CredentialStore>,
    history: Mutex<Vec<Location>>,
}

impl Router {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            history: Mutex::new(vec![Location::start()]),
        }
    }

    /// Navigates to `path`, following route redirects and guard decisions.
    ///
    /// # Errors
    /// Returns an error if redirects do not settle within a bounded number of hops.
    pub fn push(&self, path: &str) -> Result<Location, NavigationError> {
        let mut target = normalize_path(path);

        for _ in 0..=MAX_REDIRECTS {
            let record = self.store.load();
            let (location, found) = Location::resolve(&target);

            if let Some(RouteMatch { route, .. }) = found {
                if let Target::Redirect(redirect) = route.target {
                    let next = redirect(&record);
                    debug!(from = %location.path, to = next, "route redirect");
                    target = next.to_string();
                    continue;
                }
            }

            match before_each(location.meta, &record) {
                GuardDecision::Proceed => {
                    info!(path = %location.path, "navigated");
                    self.lock().push(location.clone());
                    return Ok(location);
                }
                GuardDecision::Redirect(next) => {
                    debug!(from = %location.path, to = next, "navigation guard redirect");
                    target = next.to_string();
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            path: normalize_path(path),
            last: target,
        })
    }

    #[must_use]
    pub fn current(&self) -> Location {
        self.lock().last().cloned().unwrap_or_else(Location::start)
    }

    #[must_use]
    pub fn current_requires_auth(&self) -> bool {
        self.current().meta.requires_auth
    }

    /// Paths committed so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().iter().map(|location| location.path.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Location>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
