//! Route Table Index
//!
//! The client's page routes, segregated the same way the guard reasons about them:
//! public frontend pages, the backend management console and the error pages.
//! Each module contributes its descriptors; `RouteTable::standard` stitches them together.
use std::collections::HashMap;

/// Frontend pages, auth pages and the development test pages.
pub mod frontend;

/// The `/back` management console. Only non-USER roles are let in.
pub mod backend;

/// `/404` and the catch-all that sends unknown paths to it.
pub mod errors;

/// Pattern that matches any path. Must be registered last.
pub const CATCH_ALL: &str = "*";

/// Section
///
/// Area of the application a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Frontend,
    Backend,
    Auth,
    Error,
}

/// RouteDescriptor
///
/// Static description of a page route. `path` may contain `:name` segments, or be
/// `CATCH_ALL`. A descriptor with `redirect` set is a pure redirect record and never renders.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    pub path: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub requires_auth: bool,
    pub section: Section,
    pub redirect: Option<String>,
}

impl RouteDescriptor {
    pub fn page(path: &str, name: &str, title: &str, section: Section) -> Self {
        Self {
            path: path.to_string(),
            name: Some(name.to_string()),
            title: Some(title.to_string()),
            requires_auth: false,
            section,
            redirect: None,
        }
    }

    pub fn redirect(path: &str, to: &str, section: Section) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            title: None,
            requires_auth: false,
            section,
            redirect: Some(to.to_string()),
        }
    }

    pub fn requiring_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    fn literal_segments(&self) -> usize {
        split_segments(&self.path)
            .filter(|segment| !segment.starts_with(':'))
            .count()
    }

    /// Matches `path` against this descriptor's pattern, returning the captured params.
    fn capture(&self, path: &str) -> Option<HashMap<String, String>> {
        if self.path == CATCH_ALL {
            return Some(HashMap::new());
        }

        let pattern: Vec<&str> = split_segments(&self.path).collect();
        let actual: Vec<&str> = split_segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, given) in pattern.iter().zip(actual.iter()) {
            if let Some(name) = expected.strip_prefix(':') {
                params.insert(name.to_string(), given.to_string());
            } else if expected != given {
                return None;
            }
        }
        Some(params)
    }
}

/// Location
///
/// A navigation target: a path plus ordered query pairs (decoded).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            query: Vec::new(),
        }
    }

    /// Parses `"/path?a=1&b=2"`, percent-decoding the query.
    pub fn parse(raw: &str) -> Self {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, query),
            None => (raw, ""),
        };

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();

        Self {
            path: normalize_path(path),
            query,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path plus percent-encoded query string.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// ResolvedRoute
///
/// A location matched against the route table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub descriptor: RouteDescriptor,
    pub location: Location,
    pub params: HashMap<String, String>,
}

impl ResolvedRoute {
    pub fn path(&self) -> &str {
        &self.location.path
    }

    pub fn full_path(&self) -> String {
        self.location.full_path()
    }
}

/// RouteTable
///
/// Immutable list of route descriptors, built once at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// The application's route table.
    pub fn standard() -> Self {
        let mut routes = backend::routes();
        routes.extend(frontend::routes());
        routes.extend(errors::routes());
        Self::new(routes)
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes
            .iter()
            .find(|route| route.name.as_deref() == Some(name))
    }

    /// resolve
    ///
    /// Matches a location against the table. An exact literal match wins; otherwise the
    /// `:param` pattern with the most literal segments (earliest registered on ties); the
    /// catch-all only when nothing else matches.
    pub fn resolve(&self, location: &Location) -> Option<ResolvedRoute> {
        let path = normalize_path(&location.path);

        let mut best: Option<(&RouteDescriptor, HashMap<String, String>, usize)> = None;
        for route in self.routes.iter().filter(|route| route.path != CATCH_ALL) {
            let Some(params) = route.capture(&path) else {
                continue;
            };
            let score = route.literal_segments();
            let better = match &best {
                Some((_, _, best_score)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((route, params, score));
            }
        }

        let (descriptor, params) = match best {
            Some((route, params, _)) => (route, params),
            None => {
                let fallback = self.routes.iter().find(|route| route.path == CATCH_ALL)?;
                (fallback, HashMap::new())
            }
        };

        Some(ResolvedRoute {
            descriptor: descriptor.clone(),
            location: Location {
                path,
                query: location.query.clone(),
            },
            params,
        })
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Collapses the path to `/a/b` form: leading slash, no trailing slash (except root).
fn normalize_path(path: &str) -> String {
    let joined = split_segments(path).collect::<Vec<_>>().join("/");
    format!("/{}", joined)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
