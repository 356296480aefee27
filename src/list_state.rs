use crate::pokemon::TypeName;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid page parameter: {0}")]
    InvalidPage(String),
    #[error("unknown sort key: {0}")]
    UnknownSort(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    IdAsc,
    IdDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::IdAsc,
        SortKey::IdDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::IdAsc => "id-asc",
            SortKey::IdDesc => "id-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::IdAsc => "Lowest number",
            SortKey::IdDesc => "Highest number",
            SortKey::NameAsc => "Name A-Z",
            SortKey::NameDesc => "Name Z-A",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParamError::UnknownSort(s.to_string()))
    }
}

/// Up to two picked entries, oldest first. A third pick evicts the oldest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    first: Option<u32>,
    second: Option<u32>,
}

impl Selection {
    pub fn toggle(&mut self, id: u32) {
        if self.first == Some(id) {
            self.first = self.second.take();
        } else if self.second == Some(id) {
            self.second = None;
        } else {
            match (self.first, self.second) {
                (None, _) => self.first = Some(id),
                (Some(_), None) => self.second = Some(id),
                (Some(_), Some(newer)) => {
                    self.first = Some(newer);
                    self.second = Some(id);
                }
            }
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.first == Some(id) || self.second == Some(id)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.first.into_iter().chain(self.second).collect()
    }

    pub fn len(&self) -> usize {
        usize::from(self.first.is_some()) + usize::from(self.second.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Both picks, once the selection is full.
    pub fn pair(&self) -> Option<(u32, u32)> {
        self.first.zip(self.second)
    }

    pub fn clear(&mut self) {
        *self = Selection::default();
    }
}

/// Holds the latest value until it has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| *deadline <= now);
        if due {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

/// Makes `%`, `_` and `\` match literally inside an `_ilike` pattern.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilterState {
    page: u32,
    search_text: String,
    selected_type: Option<TypeName>,
    sort: SortKey,
    compare_mode: bool,
    selected: Selection,
}

impl Default for ListFilterState {
    fn default() -> Self {
        Self {
            page: 1,
            search_text: String::new(),
            selected_type: None,
            sort: SortKey::default(),
            compare_mode: false,
            selected: Selection::default(),
        }
    }
}

impl ListFilterState {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected_type(&self) -> Option<TypeName> {
        self.selected_type
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn compare_mode(&self) -> bool {
        self.compare_mode
    }

    pub fn selected(&self) -> &Selection {
        &self.selected
    }
}

/// Variables of one list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u32,
    pub name_pattern: String,
    pub type_pattern: String,
    pub sort: SortKey,
}

impl ListQuery {
    pub fn cache_key(&self) -> String {
        format!(
            "list:{}:{}:{}:{}:{}",
            self.limit, self.offset, self.name_pattern, self.type_pattern, self.sort
        )
    }
}

/// A fetch issued against one filter snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub generation: u64,
    pub query: ListQuery,
}

/// State machine behind the list page. Callers pass the current instant in,
/// so debouncing needs no runtime.
#[derive(Debug, Clone)]
pub struct ListController {
    state: ListFilterState,
    effective_search: String,
    search: Debouncer<String>,
    generation: u64,
}

impl ListController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: ListFilterState::default(),
            effective_search: String::new(),
            search: Debouncer::new(debounce),
            generation: 0,
        }
    }

    /// Rebuilds the state encoded in a list URL. The search term in a URL has
    /// already been debounced by the page that produced it.
    pub fn from_params(
        params: &HashMap<String, String>,
        debounce: Duration,
    ) -> Result<Self, ParamError> {
        let mut controller = Self::new(debounce);

        if let Some(raw) = params.get("page") {
            let page = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ParamError::InvalidPage(raw.clone()))?;
            controller.state.page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        }

        if let Some(q) = params.get("q") {
            controller.state.search_text = q.clone();
            controller.effective_search = q.clone();
        }

        if let Some(raw) = params.get("type").filter(|t| !t.is_empty()) {
            match raw.parse::<TypeName>() {
                Ok(t) => controller.state.selected_type = Some(t),
                Err(e) => tracing::debug!("Ignoring type filter: {}", e),
            }
        }

        if let Some(raw) = params.get("sort").filter(|s| !s.is_empty()) {
            match raw.parse::<SortKey>() {
                Ok(sort) => controller.state.sort = sort,
                Err(e) => tracing::debug!("Ignoring sort: {}", e),
            }
        }

        controller.state.compare_mode = params
            .get("compare")
            .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "on"));

        if controller.state.compare_mode {
            if let Some(raw) = params.get("selected") {
                raw.split(',')
                    .filter_map(|id| id.trim().parse::<u32>().ok())
                    .filter(|id| *id > 0)
                    .for_each(|id| controller.state.selected.toggle(id));
            }
        }

        Ok(controller)
    }

    pub fn state(&self) -> &ListFilterState {
        &self.state
    }

    /// The search term queries are built from.
    pub fn effective_search(&self) -> &str {
        &self.effective_search
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn reset_page(&mut self) {
        if self.state.page != 1 {
            self.state.page = 1;
            self.generation += 1;
        }
    }

    pub fn set_search_text(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.state.search_text = text.clone();
        self.search.push(text, now);
        self.reset_page();
    }

    /// Applies the debounced search term once its quiet period has elapsed.
    /// Returns true when the effective term changed and a re-fetch is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(term) if term != self.effective_search => {
                tracing::debug!("Applying debounced search term: {:?}", term);
                self.effective_search = term;
                self.generation += 1;
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Selecting the active type clears the filter.
    pub fn set_type(&mut self, type_name: TypeName) {
        self.state.selected_type = if self.state.selected_type == Some(type_name) {
            None
        } else {
            Some(type_name)
        };
        self.generation += 1;
        self.reset_page();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if self.state.sort != sort {
            self.state.sort = sort;
            self.generation += 1;
        }
        self.reset_page();
    }

    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if self.state.page != page {
            self.state.page = page;
            self.generation += 1;
        }
    }

    pub fn toggle_compare_mode(&mut self) {
        self.state.compare_mode = !self.state.compare_mode;
        if !self.state.compare_mode {
            self.state.selected.clear();
        }
    }

    pub fn toggle_select(&mut self, id: u32) {
        self.state.selected.toggle(id);
    }

    pub fn query(&self, page_size: u32) -> ListQuery {
        let term = self.effective_search.trim();
        ListQuery {
            limit: page_size,
            offset: (self.state.page - 1).saturating_mul(page_size),
            name_pattern: if term.is_empty() {
                "%".to_string()
            } else {
                format!("%{}%", escape_like(term))
            },
            type_pattern: self
                .state
                .selected_type
                .map_or_else(|| "%".to_string(), |t| t.as_str().to_string()),
            sort: self.state.sort,
        }
    }

    pub fn ticket(&self, page_size: u32) -> QueryTicket {
        QueryTicket {
            generation: self.generation,
            query: self.query(page_size),
        }
    }

    /// Hands back a response only if it belongs to the current filter snapshot.
    pub fn accept<T>(&self, ticket: &QueryTicket, response: T) -> Option<T> {
        if ticket.generation == self.generation {
            Some(response)
        } else {
            tracing::debug!(
                "Discarding stale list response (generation {} != {})",
                ticket.generation,
                self.generation
            );
            None
        }
    }

    /// List route URL carrying this state. Default values are left out.
    pub fn href(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if self.state.page != 1 {
            query.append_pair("page", &self.state.page.to_string());
        }
        if !self.effective_search.is_empty() {
            query.append_pair("q", &self.effective_search);
        }
        if let Some(t) = self.state.selected_type {
            query.append_pair("type", t.as_str());
        }
        if self.state.sort != SortKey::default() {
            query.append_pair("sort", self.state.sort.as_str());
        }
        if self.state.compare_mode {
            query.append_pair("compare", "1");
            let ids = self.state.selected.ids();
            if !ids.is_empty() {
                let joined = ids
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                query.append_pair("selected", &joined);
            }
        }
        let encoded = query.finish();
        if encoded.is_empty() {
            "/".to_string()
        } else {
            format!("/?{encoded}")
        }
    }

    /// Returns a copy with one transition applied, for rendering links.
    pub fn with(&self, transition: impl FnOnce(&mut ListController)) -> ListController {
        let mut next = self.clone();
        transition(&mut next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_selection_evicts_oldest() {
        let mut selection = Selection::default();
        selection.toggle(5);
        assert_eq!(selection.ids(), vec![5]);
        selection.toggle(9);
        assert_eq!(selection.ids(), vec![5, 9]);
        selection.toggle(12);
        assert_eq!(selection.ids(), vec![9, 12]);
        assert_eq!(selection.pair(), Some((9, 12)));
    }

    #[test]
    fn test_selection_toggle_removes() {
        let mut selection = Selection::default();
        selection.toggle(1);
        selection.toggle(2);
        selection.toggle(1);
        assert_eq!(selection.ids(), vec![2]);
        assert_eq!(selection.len(), 1);
        selection.toggle(2);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_search_resets_page_but_page_keeps_search() {
        let now = Instant::now();
        let mut controller = ListController::new(DEFAULT_DEBOUNCE);
        controller.set_page(4);
        controller.set_search_text("pika", now);
        assert_eq!(controller.state().page(), 1);
        assert_eq!(controller.state().search_text(), "pika");

        controller.set_page(3);
        assert_eq!(controller.state().page(), 3);
        assert_eq!(controller.state().search_text(), "pika");
    }

    #[test]
    fn test_debounce_coalesces_keystrokes() {
        let start = Instant::now();
        let mut controller = ListController::new(DEFAULT_DEBOUNCE);
        let mut fetches = Vec::new();

        for (offset_ms, text) in [(0, "p"), (100, "pi"), (250, "pik")] {
            let at = start + Duration::from_millis(offset_ms);
            controller.set_search_text(text, at);
            if controller.poll(at) {
                fetches.push(controller.query(10));
            }
        }
        for offset_ms in [400, 600, 649, 650, 700, 2000] {
            if controller.poll(start + Duration::from_millis(offset_ms)) {
                fetches.push(controller.query(10));
            }
        }

        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].name_pattern, "%pik%");
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_type_toggle_and_sort_reset_page() {
        let mut controller = ListController::new(DEFAULT_DEBOUNCE);
        controller.set_page(5);
        controller.set_type(TypeName::Fire);
        assert_eq!(controller.state().selected_type(), Some(TypeName::Fire));
        assert_eq!(controller.state().page(), 1);

        controller.set_page(2);
        controller.set_type(TypeName::Fire);
        assert_eq!(controller.state().selected_type(), None);
        assert_eq!(controller.state().page(), 1);

        controller.set_page(2);
        controller.set_sort(SortKey::NameDesc);
        assert_eq!(controller.state().page(), 1);
        assert_eq!(controller.query(10).sort, SortKey::NameDesc);
    }

    #[test]
    fn test_leaving_compare_mode_clears_selection() {
        let mut controller = ListController::new(DEFAULT_DEBOUNCE);
        controller.toggle_compare_mode();
        controller.toggle_select(3);
        controller.toggle_compare_mode();
        assert!(controller.state().selected().is_empty());

        controller.toggle_select(4);
        controller.toggle_compare_mode();
        assert_eq!(controller.state().selected().ids(), vec![4]);
    }

    #[test]
    fn test_query_variables() {
        let mut controller = ListController::new(DEFAULT_DEBOUNCE);
        let all = controller.query(10);
        assert_eq!(all.name_pattern, "%");
        assert_eq!(all.type_pattern, "%");
        assert_eq!(all.offset, 0);

        controller.set_type(TypeName::Water);
        controller.set_page(3);
        let filtered = controller.query(10);
        assert_eq!(filtered.type_pattern, "water");
        assert_eq!(filtered.offset, 20);
    }

    #[test]
    fn test_search_wildcards_match_literally() {
        let params = params(&[("q", "mr_mime%")]);
        let controller = ListController::from_params(&params, DEFAULT_DEBOUNCE).unwrap();
        assert_eq!(controller.query(10).name_pattern, r"%mr\_mime\%%");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("pika"), "pika");
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let mut controller = ListController::new(DEFAULT_DEBOUNCE);
        let ticket = controller.ticket(10);
        assert_eq!(controller.accept(&ticket, "page 1"), Some("page 1"));

        controller.set_page(2);
        assert_eq!(controller.accept(&ticket, "page 1"), None);
        let fresh = controller.ticket(10);
        assert_eq!(controller.accept(&fresh, "page 2"), Some("page 2"));
    }

    #[test]
    fn test_params_round_trip() {
        let controller = ListController::from_params(
            &params(&[
                ("page", "3"),
                ("q", "mr mime"),
                ("type", "psychic"),
                ("sort", "name-desc"),
                ("compare", "1"),
                ("selected", "5,9,12"),
            ]),
            DEFAULT_DEBOUNCE,
        )
        .unwrap();

        assert_eq!(controller.state().page(), 3);
        assert_eq!(controller.effective_search(), "mr mime");
        assert_eq!(controller.state().selected().ids(), vec![9, 12]);
        assert_eq!(
            controller.href(),
            "/?page=3&q=mr+mime&type=psychic&sort=name-desc&compare=1&selected=9%2C12"
        );
    }

    #[test]
    fn test_params_page_handling() {
        let clamped = ListController::from_params(&params(&[("page", "-4")]), DEFAULT_DEBOUNCE);
        assert_eq!(clamped.unwrap().state().page(), 1);

        let invalid = ListController::from_params(&params(&[("page", "abc")]), DEFAULT_DEBOUNCE);
        assert_eq!(invalid.unwrap_err(), ParamError::InvalidPage("abc".to_string()));

        let defaults = ListController::from_params(&HashMap::new(), DEFAULT_DEBOUNCE).unwrap();
        assert_eq!(defaults.state().page(), 1);
        assert_eq!(defaults.href(), "/");
    }

    #[test]
    fn test_with_builds_link_without_mutating() {
        let controller = ListController::new(DEFAULT_DEBOUNCE);
        let next = controller.with(|c| c.set_type(TypeName::Ghost));
        assert_eq!(next.href(), "/?type=ghost");
        assert_eq!(controller.state().selected_type(), None);
    }
}
