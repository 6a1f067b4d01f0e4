//! View state of the record form and table.
//!
//! [`ClientView`] holds everything the screen shows: the form and its
//! errors, the current page and search term, the loaded page of records and
//! the total used for page links. The pure transitions (`set_page`,
//! `set_search`, `apply_page`, `finish_submit`, ...) are kept separate from
//! the async calls (`reload`, `submit`) so they can be tested without a
//! server.

use std::ops::RangeInclusive;

use tracing::{debug, warn};

use recordbook_shared::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use recordbook_shared::{total_pages, ListQuery, NewRecord, Record, RecordPage};

use crate::api::{ApiClient, ClientError};
use crate::form::{FormErrors, FormField, RecordForm};

/// Page links of the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub pages: RangeInclusive<u64>,
    pub current: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct ClientView {
    pub form: RecordForm,
    pub errors: FormErrors,
    pub is_loading: bool,
    pub is_submitting: bool,
    page: u32,
    limit: u32,
    search: String,
    records: Vec<Record>,
    total: u64,
    /// Generic failure message for errors that do not belong to a field.
    notice: Option<String>,
}

impl Default for ClientView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ClientView {
    pub fn new(limit: u32) -> Self {
        Self {
            form: RecordForm::default(),
            errors: FormErrors::default(),
            is_loading: false,
            is_submitting: false,
            page: DEFAULT_PAGE,
            limit: limit.max(1),
            search: String::new(),
            records: Vec::new(),
            total: 0,
            notice: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.limit)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The listing request for the current page and search.
    pub fn query(&self) -> ListQuery {
        let search = Some(self.search.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        ListQuery::new(self.page, self.limit, search)
    }

    /// Returns `true` when the page changed and a reload is due.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        if u64::from(self.page) >= self.total_pages() {
            return false;
        }
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.set_page(self.page - 1)
    }

    /// Returns `true` when the term changed. A new term starts again at
    /// page 1.
    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search {
            return false;
        }
        self.search = term;
        self.page = DEFAULT_PAGE;
        true
    }

    /// Edit a form field; its error goes away.
    pub fn edit(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
        self.errors.clear(field);
    }

    /// `None` when there is only one page (or none).
    pub fn pagination(&self) -> Option<Pagination> {
        let pages = self.total_pages();
        if pages <= 1 {
            return None;
        }
        let current = u64::from(self.page);
        Some(Pagination {
            pages: 1..=pages,
            current,
            has_prev: current > 1,
            has_next: current < pages,
        })
    }

    /// Show a loaded page. A failed load empties the table instead of
    /// keeping stale rows.
    pub fn apply_page(&mut self, result: Result<RecordPage, ClientError>) {
        match result {
            Ok(page) => {
                debug!(rows = page.data.len(), total = page.total, "page loaded");
                self.records = page.data;
                self.total = page.total;
            }
            Err(e) => {
                warn!(error = %e, "failed to load records");
                self.records.clear();
                self.total = 0;
            }
        }
    }

    /// Check the form. On success the submitting flag is raised and the
    /// trimmed input is returned.
    pub fn begin_submit(&mut self) -> Option<NewRecord> {
        let errors = self.form.validate();
        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }
        self.errors = FormErrors::default();
        self.notice = None;
        self.is_submitting = true;
        Some(self.form.to_input())
    }

    /// Apply the create response. Returns `true` when the record was saved.
    pub fn finish_submit(&mut self, result: Result<Record, ClientError>) -> bool {
        self.is_submitting = false;
        match result {
            Ok(record) => {
                debug!(id = record.id, "record created");
                self.form.clear();
                self.errors = FormErrors::default();
                true
            }
            Err(ClientError::Validation(fields)) => {
                let rest = self.errors.absorb(fields);
                if let Some(first) = rest.first() {
                    self.notice = Some(first.message.clone());
                }
                false
            }
            Err(ClientError::Conflict(message)) => {
                self.errors.set(FormField::Email, message);
                false
            }
            Err(e) => {
                warn!(error = %e, "failed to create record");
                self.notice = Some("Could not save the record. Please try again.".into());
                false
            }
        }
    }

    /// Load the current page and search from the server.
    pub async fn reload(&mut self, api: &ApiClient) {
        self.is_loading = true;
        let result = api.list(&self.query()).await;
        self.apply_page(result);
        self.is_loading = false;
    }

    /// Validate, create, and reload on success.
    pub async fn submit(&mut self, api: &ApiClient) -> bool {
        let Some(input) = self.begin_submit() else {
            return false;
        };
        let result = api.create(&input).await;
        if !self.finish_submit(result) {
            return false;
        }
        self.reload(api).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(id: i64) -> Record {
        let now = Utc::now();
        Record {
            id,
            name: format!("Person {id:02}"),
            email: format!("p{id}@example.com"),
            message: "Hello".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn loaded(total: u64) -> ClientView {
        let mut view = ClientView::default();
        let rows = (1..=total.min(10) as i64).map(record).collect();
        view.apply_page(Ok(RecordPage::new(rows, total, 1, 10)));
        view
    }

    #[test]
    fn starts_on_first_page_without_search() {
        let view = ClientView::default();
        assert_eq!(view.query(), ListQuery::new(1, 10, None));
    }

    #[test]
    fn search_change_resets_page() {
        let mut view = loaded(35);
        assert!(view.set_page(3));
        assert!(view.set_search("foo"));
        assert_eq!(view.page(), 1);
        assert_eq!(view.query().search.as_deref(), Some("foo"));
        assert!(!view.set_search("foo"));
    }

    #[test]
    fn same_page_does_not_reload() {
        let mut view = loaded(35);
        assert!(!view.set_page(1));
        assert!(view.set_page(2));
    }

    #[test]
    fn next_and_prev_respect_bounds() {
        let mut view = loaded(15);
        assert!(!view.prev_page());
        assert!(view.next_page());
        assert_eq!(view.page(), 2);
        assert!(!view.next_page());
        assert!(view.prev_page());
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn pagination_hidden_for_single_page() {
        assert!(loaded(10).pagination().is_none());
        let bar = loaded(15).pagination().unwrap();
        assert_eq!(bar.pages, 1..=2);
        assert!(!bar.has_prev);
        assert!(bar.has_next);
    }

    #[test]
    fn failed_load_empties_the_table() {
        let mut view = loaded(15);
        view.apply_page(Err(ClientError::Server {
            status: 500,
            message: "Internal server error".into(),
        }));
        assert!(view.records().is_empty());
        assert_eq!(view.total(), 0);
    }

    #[test]
    fn invalid_form_is_not_submitted() {
        let mut view = ClientView::default();
        view.edit(FormField::Name, "Ana");
        assert!(view.begin_submit().is_none());
        assert!(view.errors.name.is_some());
        assert!(!view.is_submitting);

        view.edit(FormField::Name, "Ana Maria");
        assert!(view.errors.name.is_none());
    }

    #[test]
    fn conflict_lands_on_email() {
        let mut view = ClientView::default();
        view.form = RecordForm::new("Maria Silva", "maria@example.com", "Hello");
        assert!(view.begin_submit().is_some());
        assert!(view.is_submitting);

        let saved = view.finish_submit(Err(ClientError::Conflict("E-mail already in use".into())));
        assert!(!saved);
        assert!(!view.is_submitting);
        assert_eq!(view.errors.email.as_deref(), Some("E-mail already in use"));
        assert_eq!(view.form.name, "Maria Silva");
    }

    #[test]
    fn not_found_is_a_generic_notice() {
        let mut view = ClientView::default();
        view.finish_submit(Err(ClientError::NotFound("gone".into())));
        assert!(view.errors.is_empty());
        assert!(view.notice().is_some());
    }

    #[test]
    fn success_clears_form() {
        let mut view = ClientView::default();
        view.form = RecordForm::new("Maria Silva", "maria@example.com", "Hello");
        view.begin_submit();
        assert!(view.finish_submit(Ok(record(1))));
        assert_eq!(view.form, RecordForm::default());
        assert!(view.errors.is_empty());
    }
}
