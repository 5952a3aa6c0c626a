use crate::data::{CatalogEntry, ItemStatus};
use chrono::DateTime;

fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn colored_status(status: ItemStatus) -> String {
    let code = match status {
        ItemStatus::Published => "\x1b[32m", // green
        ItemStatus::Draft => "\x1b[33m",     // yellow
        ItemStatus::Private => "\x1b[36m",   // cyan
        ItemStatus::Archived => "\x1b[90m",  // gray
    };
    format!("{}{}\x1b[0m", code, status.as_str())
}

fn push_link_list(report: &mut String, label: &str, links: &[String]) {
    if links.is_empty() {
        report.push_str(&format!("  {}: \x1b[90m(none)\x1b[0m\n", label));
        return;
    }
    report.push_str(&format!("  {}:\n", label));
    for link in links {
        report.push_str(&format!("    - {}\n", link));
    }
}

/// Render one catalog page as the text report the `list` command prints.
pub fn generate_catalog_report(
    entries: &[CatalogEntry],
    total: i64,
    page: usize,
    per_page: usize,
) -> String {
    let per_page = per_page.max(1);
    let pages = ((total as usize) + per_page - 1) / per_page;

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Catalog:\n");
    report.push_str(&format!("  Items matching: {}\n", total));
    report.push_str(&format!("  Page: {} of {}\n", page, pages.max(1)));
    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for entry in entries {
        let item = &entry.item;
        report.push_str(&format!(
            "## [{}] {} ({})\n",
            item.id,
            item.title,
            colored_status(item.status)
        ));
        report.push_str(&format!(
            "  {} {} \x1b[90mupdated {}\x1b[0m\n",
            item.item_type,
            item.permalink,
            format_timestamp(item.updated_at)
        ));
        if let Some(ref category) = item.category {
            report.push_str(&format!("  category: {}\n", category));
        }
        push_link_list(&mut report, "significant links", &entry.significant_links);
        push_link_list(&mut report, "related links", &entry.related_links);
        report.push('\n');
    }

    if entries.is_empty() {
        report.push_str("  No items matched.\n\n");
    }

    report
}
