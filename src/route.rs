//! Navigable addresses and their mapping to search requests.
//!
//! The client keeps the same address surface as the web UI it replaces:
//! `/` with optional `query` and 1-based `page` parameters for the list
//! view, `/message/:id` for a single message. All view state is rebuilt
//! from the address plus server responses; nothing is persisted.
//!
//! Derivation is one-directional per navigation event: the event loop
//! derives a request from the current address exactly once after each
//! change, and a programmatic push never re-derives on its own. That is
//! what keeps address and request in sync without update loops.

use crate::api::{FieldName, SearchRequest};

/// Carried-forward search state that is not encoded in the address:
/// page size, searched header locations and the "last N days" window
/// (0 means unbounded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDefaults {
    pub limit: u64,
    pub locations: Vec<FieldName>,
    pub days: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            limit: crate::constants::DEFAULT_LIMIT,
            locations: vec![FieldName::From, FieldName::To, FieldName::Subject],
            days: 0,
        }
    }
}

/// A client-side address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Search {
        /// Absent and empty are equivalent; `encode` omits empty queries.
        query: Option<String>,
        /// 1-based page, absent means the first page.
        page: Option<u64>,
    },
    Message {
        id: u64,
    },
}

impl Route {
    pub fn root() -> Self {
        Route::Search {
            query: None,
            page: None,
        }
    }

    pub fn search(query: Option<String>, page: Option<u64>) -> Self {
        let query = query.filter(|q| !q.is_empty());
        let page = page.filter(|p| *p > 1);
        Route::Search { query, page }
    }

    /// The query this address carries, with absent and empty equivalent.
    pub fn query(&self) -> &str {
        match self {
            Route::Search {
                query: Some(query), ..
            } => query,
            _ => "",
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Route::Search { query, page } => {
                let mut params = Vec::new();
                if let Some(query) = query
                    && !query.is_empty()
                {
                    params.push(format!("query={}", encode_component(query)));
                }
                if let Some(page) = page
                    && *page > 1
                {
                    params.push(format!("page={}", page));
                }
                if params.is_empty() {
                    "/".to_string()
                } else {
                    format!("/?{}", params.join("&"))
                }
            }
            Route::Message { id } => format!("/message/{}", id),
        }
    }

    pub fn parse(address: &str) -> Option<Self> {
        if let Some(id) = address.strip_prefix("/message/") {
            return id.parse().ok().map(|id| Route::Message { id });
        }

        let (path, params) = match address.split_once('?') {
            Some((path, params)) => (path, params),
            None => (address, ""),
        };
        if path != "/" && !path.is_empty() {
            return None;
        }

        let mut query = None;
        let mut page = None;
        for pair in params.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "query" => query = Some(decode_component(value)),
                "page" => page = value.parse().ok(),
                _ => {}
            }
        }
        Some(Route::search(query, page))
    }
}

/// Derive the search request a list address stands for. Message addresses
/// derive nothing. `offset = limit * (page - 1)` with an absent page
/// meaning offset 0; everything not in the address comes from the
/// carried-forward defaults.
pub fn derive_request(route: &Route, defaults: &SearchDefaults) -> Option<SearchRequest> {
    let Route::Search { query, page } = route else {
        return None;
    };
    let limit = defaults.limit.max(1);
    let offset = limit * page.unwrap_or(1).max(1).saturating_sub(1);
    Some(SearchRequest {
        query: query.clone().unwrap_or_default(),
        locations: defaults.locations.clone(),
        limit,
        offset,
        start_time: None,
    })
}

/// Outcome of an interactive query edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEdit {
    /// The address already reflects this query; re-run the search without
    /// navigating.
    RerunInPlace,
    /// Push a new address carrying the edited query (and no page).
    Navigate(Route),
}

/// Decide whether an edited query re-runs in place or navigates. Equal
/// query text (with empty and absent equivalent) means no address change.
pub fn decide_query_edit(input: &str, current: &Route) -> QueryEdit {
    if input == current.query() {
        QueryEdit::RerunInPlace
    } else {
        QueryEdit::Navigate(Route::search(Some(input.to_string()), None))
    }
}

/// In-memory address history with back/forward navigation. Pushing while
/// somewhere in the middle of the stack truncates the forward entries,
/// the way browser history behaves.
#[derive(Debug, Clone)]
pub struct Router {
    stack: Vec<Route>,
    index: usize,
}

impl Router {
    pub fn new(initial: Route) -> Self {
        Self {
            stack: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &Route {
        &self.stack[self.index]
    }

    pub fn push(&mut self, route: Route) {
        if *self.current() == route {
            return;
        }
        self.stack.truncate(self.index + 1);
        self.stack.push(route);
        self.index += 1;
    }

    /// Move back one entry. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Move forward one entry. Returns false at the end of history.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.stack.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

/// Minimal percent-encoding for query parameter values. Only the characters
/// that would break the address syntax are escaped.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' | '&' | '=' | '?' | '#' | '+' => {
                out.push('%');
                out.push_str(&format!("{:02X}", c as u32));
            }
            ' ' => out.push('+'),
            _ => out.push(c),
        }
    }
    out
}

fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 3 <= bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                let byte = u8::from_str_radix(&value[i + 1..i + 3], 16).unwrap_or(b'%');
                out.push(byte);
                i += 3;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_empty_query_no_page() {
        let route = Route::search(Some(String::new()), None);
        assert_eq!(route.encode(), "/");
        let parsed = Route::parse(&route.encode()).unwrap();
        assert_eq!(parsed, Route::root());

        let defaults = SearchDefaults::default();
        let request = derive_request(&parsed, &defaults).unwrap();
        assert_eq!(request.query, "");
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_round_trip_query_and_page() {
        let defaults = SearchDefaults {
            limit: 15,
            ..SearchDefaults::default()
        };
        let route = Route::search(Some("invoice".to_string()), Some(3));
        let encoded = route.encode();
        assert_eq!(encoded, "/?query=invoice&page=3");

        let parsed = Route::parse(&encoded).unwrap();
        assert_eq!(parsed, route);
        let request = derive_request(&parsed, &defaults).unwrap();
        assert_eq!(request.query, "invoice");
        assert_eq!(request.limit, 15);
        assert_eq!(request.offset, 30);
    }

    #[test]
    fn test_query_with_spaces_round_trips() {
        let route = Route::search(Some("foo bar&baz".to_string()), None);
        let parsed = Route::parse(&route.encode()).unwrap();
        assert_eq!(parsed.query(), "foo bar&baz");
    }

    #[test]
    fn test_query_with_non_ascii_round_trips() {
        let route = Route::search(Some("grüße 100%".to_string()), None);
        let parsed = Route::parse(&route.encode()).unwrap();
        assert_eq!(parsed.query(), "grüße 100%");
    }

    #[test]
    fn test_message_route_round_trips_and_derives_nothing() {
        let route = Route::Message { id: 42 };
        assert_eq!(route.encode(), "/message/42");
        assert_eq!(Route::parse("/message/42"), Some(route.clone()));
        assert!(derive_request(&route, &SearchDefaults::default()).is_none());
    }

    #[test]
    fn test_query_edit_equal_text_reruns_in_place() {
        let current = Route::search(Some("invoice".to_string()), Some(3));
        assert_eq!(decide_query_edit("invoice", &current), QueryEdit::RerunInPlace);

        // Empty and absent are the same query.
        assert_eq!(decide_query_edit("", &Route::root()), QueryEdit::RerunInPlace);
    }

    #[test]
    fn test_query_edit_new_text_navigates_and_clears_page() {
        let current = Route::search(Some("invoice".to_string()), Some(3));
        let QueryEdit::Navigate(route) = decide_query_edit("receipt", &current) else {
            panic!("expected navigation");
        };
        assert_eq!(route, Route::search(Some("receipt".to_string()), None));

        // Clearing the query navigates to the bare list address.
        let QueryEdit::Navigate(route) = decide_query_edit("", &current) else {
            panic!("expected navigation");
        };
        assert_eq!(route, Route::root());
    }

    #[test]
    fn test_router_push_truncates_forward_history() {
        let mut router = Router::new(Route::root());
        router.push(Route::search(Some("a".to_string()), None));
        router.push(Route::Message { id: 1 });
        assert!(router.back());
        assert!(router.back());
        assert_eq!(router.current(), &Route::root());

        router.push(Route::search(Some("b".to_string()), None));
        assert!(!router.forward());
        assert!(router.back());
        assert_eq!(router.current(), &Route::root());
    }

    #[test]
    fn test_router_push_same_route_is_noop() {
        let mut router = Router::new(Route::root());
        router.push(Route::root());
        assert!(!router.back());
    }
}
