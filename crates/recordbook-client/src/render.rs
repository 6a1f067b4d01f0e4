//! Plain-text rendering of a [`ClientView`] for the terminal.

use std::fmt::Write;

use tabled::builder::Builder;
use tabled::settings::Style;

use recordbook_shared::Record;

use crate::form::FormField;
use crate::state::ClientView;

/// Records as a table: id, name, e-mail, message and creation date.
pub fn records_table(records: &[Record]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "E-mail", "Message", "Created"]);
    for record in records {
        builder.push_record([
            record.id.to_string(),
            record.name.clone(),
            record.email.clone(),
            record.message.clone(),
            record.created_at.format("%d/%m/%Y").to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

/// The whole screen: heading, table or empty message, page bar and any
/// form errors or notice.
pub fn render(view: &ClientView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Records ({})", view.total());
    if !view.search().trim().is_empty() {
        let _ = writeln!(out, "Search: {}", view.search());
    }

    if view.is_loading {
        let _ = writeln!(out, "Loading records...");
    }
    if !view.records().is_empty() {
        let _ = writeln!(out, "{}", records_table(view.records()));
    } else if !view.is_loading {
        let empty = if view.search().trim().is_empty() {
            "No records yet"
        } else {
            "No records match the search"
        };
        let _ = writeln!(out, "{empty}");
    }

    if let Some(bar) = view.pagination() {
        let pages: Vec<String> = bar
            .pages
            .clone()
            .map(|p| {
                if p == bar.current {
                    format!("[{p}]")
                } else {
                    p.to_string()
                }
            })
            .collect();
        let prev = if bar.has_prev { "< prev" } else { "" };
        let next = if bar.has_next { "next >" } else { "" };
        let _ = writeln!(out, "{prev} {} {next}", pages.join(" "));
    }

    for field in [FormField::Name, FormField::Email, FormField::Message] {
        if let Some(message) = view.errors.get(field) {
            let _ = writeln!(out, "! {field:?}: {message}");
        }
    }
    if let Some(notice) = view.notice() {
        let _ = writeln!(out, "! {notice}");
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use recordbook_shared::RecordPage;

    use super::*;

    fn record(id: i64) -> Record {
        let created = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        Record {
            id,
            name: format!("Person {id:02}"),
            email: format!("p{id}@example.com"),
            message: "Hello".into(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn table_lists_rows_with_dates() {
        let table = records_table(&[record(1), record(2)]);
        assert!(table.contains("Person 01"));
        assert!(table.contains("p2@example.com"));
        assert!(table.contains("09/03/2024"));
    }

    #[test]
    fn empty_view_says_so() {
        let view = ClientView::default();
        assert!(render(&view).contains("No records yet"));
    }

    #[test]
    fn loading_keeps_current_rows_on_screen() {
        let mut view = ClientView::default();
        assert!(!render(&view).contains("Loading records..."));

        view.is_loading = true;
        let screen = render(&view);
        assert!(screen.contains("Loading records..."));
        assert!(!screen.contains("No records yet"));

        view.apply_page(Ok(RecordPage::new(vec![record(1)], 1, 1, 10)));
        let screen = render(&view);
        assert!(screen.contains("Loading records..."));
        assert!(screen.contains("Person 01"));
    }

    #[test]
    fn page_bar_marks_current_page() {
        let mut view = ClientView::default();
        let rows = (1..=10).map(record).collect();
        view.apply_page(Ok(RecordPage::new(rows, 25, 1, 10)));
        let screen = render(&view);
        assert!(screen.contains("[1] 2 3 next >"));
    }
}
