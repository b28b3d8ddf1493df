use crate::{
    error::NavigationError,
    guard::{GuardDecision, RouteGuard},
    routes::{Location, RouteTable},
    session::Session,
};

/// Upper bound on redirects (static records plus guard decisions) per navigation.
pub const MAX_REDIRECTS: usize = 10;

/// NavigationOutcome
///
/// Where a navigation finally landed. Nothing is applied until the whole redirect chain
/// has settled, so a failed navigation leaves no partial state behind.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationOutcome {
    pub location: Location,
    pub route_name: Option<String>,
    /// Page title (`"<title> - Mental Health Assistant"`) of the final route, if it has one.
    pub title: Option<String>,
    /// The originally requested location, when at least one redirect happened.
    pub redirected_from: Option<Location>,
}

impl NavigationOutcome {
    pub fn path(&self) -> &str {
        &self.location.path
    }

    pub fn was_redirected(&self) -> bool {
        self.redirected_from.is_some()
    }
}

/// Navigator
///
/// Drives a navigation attempt: resolves the target against the route table, follows
/// static redirect records and asks the guard about every page it would land on.
#[derive(Debug, Clone)]
pub struct Navigator {
    table: RouteTable,
    guard: RouteGuard,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(RouteTable::standard())
    }
}

impl Navigator {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            guard: RouteGuard::new(),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// navigate
    ///
    /// Static redirects keep the query string of the location they redirect from.
    pub fn navigate(
        &self,
        target: &str,
        session: &Session,
    ) -> Result<NavigationOutcome, NavigationError> {
        let requested = Location::parse(target);
        let mut current = requested.clone();

        for hop in 0..=MAX_REDIRECTS {
            let resolved =
                self.table
                    .resolve(&current)
                    .ok_or_else(|| NavigationError::NoRoute {
                        path: current.path.clone(),
                    })?;

            if let Some(to) = &resolved.descriptor.redirect {
                tracing::debug!(from = %current.path, to = %to, "Following static redirect");
                current = Location {
                    path: Location::new(to).path,
                    query: current.query,
                };
                continue;
            }

            match self.guard.evaluate(&resolved, session) {
                GuardDecision::Allow => {
                    tracing::info!(
                        path = %resolved.path(),
                        hops = hop,
                        "Navigation settled"
                    );
                    return Ok(NavigationOutcome {
                        title: self.guard.page_title(&resolved),
                        route_name: resolved.descriptor.name.clone(),
                        location: resolved.location,
                        redirected_from: (hop > 0).then(|| requested.clone()),
                    });
                }
                GuardDecision::Redirect(location) => {
                    tracing::debug!(
                        from = %resolved.path(),
                        to = %location.full_path(),
                        "Guard redirected navigation"
                    );
                    current = location;
                }
            }
        }

        tracing::warn!(requested = %target, "Navigation exceeded the redirect limit");
        Err(NavigationError::RedirectLoop {
            target: target.to_string(),
            hops: MAX_REDIRECTS,
        })
    }
}
