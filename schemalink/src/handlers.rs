use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use schemalink_core::data::{Database, ItemQuery, ItemStatus, NewItem, OrderBy, SearchColumn};
use schemalink_core::report::generate_catalog_report;
use schemalink_core::store::LinkStore;
use schemalink_pipeline::links::LinkField;
use schemalink_pipeline::scan::{self, ResponseContext, ResponseKind};
use schemalink_pipeline::strategy::{Injector, SchemaProvider};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_lowercase()
}

/// Expand the configured database directory and point at the db file in it.
pub fn resolve_db_path(dir: &str) -> PathBuf {
    let expanded = shellexpand::tilde(dir);
    Path::new(expanded.as_ref()).join("schemalink.db")
}

fn open_database(args: &ArgMatches) -> Result<Database> {
    let dir = args.get_one::<String>("database").unwrap();
    let db_path = resolve_db_path(dir);
    if !Database::exists(&db_path) {
        bail!(
            "No database at {} (run `schemalink init` first)",
            db_path.display()
        );
    }
    Database::new(&db_path).context("Failed to open database")
}

fn open_store(args: &ArgMatches) -> Result<LinkStore> {
    Ok(LinkStore::new(open_database(args)?))
}

/// Read the transform input from a file or stdin.
pub fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Wrote {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Classify a fetched response by its content type. Only HTML pages are
/// eligible for the fallback scan; data, feed and unknown payloads are left
/// alone.
pub fn response_kind_for_content_type(content_type: Option<&str>) -> ResponseKind {
    let Some(content_type) = content_type else {
        return ResponseKind::Page;
    };
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("html") {
        ResponseKind::Page
    } else if content_type.contains("json") {
        ResponseKind::Ajax
    } else if content_type.contains("rss")
        || content_type.contains("atom")
        || content_type.contains("xml")
    {
        ResponseKind::Feed
    } else {
        ResponseKind::Ajax
    }
}

/// Inject an item's links into a document. A bare JSON document goes
/// through the flat-hook path; anything else is treated as rendered markup
/// and goes through the response text scan.
pub fn inject_text(store: LinkStore, item_id: i64, input: &str) -> Result<String> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let doc = scan::parse_document(input).context("Input is not a valid JSON-LD document")?;
        let injector = Injector::new(Arc::new(store), Some(SchemaProvider::FlatGenerator));
        let out = injector.transform_flat(item_id, doc);
        Ok(serde_json::to_string_pretty(&out)?)
    } else {
        let injector = Injector::new(Arc::new(store), None);
        Ok(injector.transform_response(item_id, &ResponseContext::page(), input))
    }
}

pub async fn fetch_page(url: &Url) -> Result<(String, Option<String>)> {
    let client = reqwest::Client::builder()
        .user_agent(format!("schemalink/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to create HTTP client");

    debug!("Fetching {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let body = response.text().await?;
    Ok((body, content_type))
}

// Handler functions

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  SCHEMALINK INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let dir = args.get_one::<String>("database").unwrap();
    let force = args.get_flag("force");
    let expanded = shellexpand::tilde(dir);
    let config_dir = Path::new(expanded.as_ref());
    let db_path = config_dir.join("schemalink.db");

    fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    println!(
        "{} Config directory: {}",
        "✓".green().bold(),
        config_dir.display().to_string().bright_white()
    );

    if Database::exists(&db_path) {
        if !force {
            println!("{}", "⚠ WARNING".yellow().bold());
            println!("Database already exists at:");
            println!(
                "  {} {}",
                "•".yellow(),
                db_path.display().to_string().bright_white()
            );
            println!();

            let response = print_prompt("Would you like to overwrite it? [y/N]:");
            println!();

            if response != "y" && response != "yes" {
                println!("{} Keeping existing database", "→".blue());
                return Ok(());
            }
        }
        Database::drop(&db_path);
        println!("{} Existing database removed", "✓".green().bold());
    }

    println!("{} Creating database...", "→".blue());
    Database::new(&db_path).context("Failed to create database")?;
    println!(
        "{} Database initialized: {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    Ok(())
}

pub fn handle_item_add(args: &ArgMatches) -> Result<()> {
    let db = open_database(args)?;

    let title = args.get_one::<String>("title").unwrap();
    let slug = args.get_one::<String>("slug").unwrap();
    let permalink = args.get_one::<Url>("permalink").unwrap();
    let status = args.get_one::<String>("status").unwrap();

    let item = NewItem {
        title: title.clone(),
        slug: slug.clone(),
        permalink: permalink.to_string(),
        item_type: args.get_one::<String>("item-type").unwrap().clone(),
        category: args.get_one::<String>("category").cloned(),
        // the value parser only lets known statuses through
        status: ItemStatus::parse(status).unwrap(),
    };

    let id = db.insert_item(&item).context("Failed to add item")?;
    println!("{} Added item [{}] {}", "✓".green().bold(), id, title);
    Ok(())
}

pub fn handle_item_list(args: &ArgMatches) -> Result<()> {
    let db = open_database(args)?;

    let query = ItemQuery {
        search: args.get_one::<String>("search").cloned(),
        search_column: SearchColumn::parse(args.get_one::<String>("column").unwrap()).unwrap(),
        item_type: args.get_one::<String>("item-type").cloned(),
        category: args.get_one::<String>("category").cloned(),
        status: args
            .get_one::<String>("status")
            .and_then(|s| ItemStatus::parse(s)),
        order_by: OrderBy::parse(args.get_one::<String>("orderby").unwrap()).unwrap(),
        descending: args.get_flag("desc"),
        page: *args.get_one::<usize>("page").unwrap(),
        per_page: *args.get_one::<usize>("per-page").unwrap(),
    };

    let (entries, total) = db.query_items(&query)?;
    print!(
        "{}",
        generate_catalog_report(&entries, total, query.page, query.per_page)
    );
    Ok(())
}

fn link_args(args: &ArgMatches) -> (i64, LinkField) {
    let item_id = *args.get_one::<i64>("item").unwrap();
    // the value parser only lets known field names through
    let field = LinkField::parse(args.get_one::<String>("type").unwrap()).unwrap();
    (item_id, field)
}

pub fn handle_link_add(args: &ArgMatches) -> Result<()> {
    let store = open_store(args)?;
    let (item_id, field) = link_args(args);
    let url = args.get_one::<String>("url").unwrap();

    if store.add_link(item_id, field, url)? {
        println!(
            "{} Added {} link to item {}",
            "✓".green().bold(),
            field.as_str(),
            item_id
        );
    } else {
        println!("{} Link already present, nothing added", "→".yellow());
    }
    Ok(())
}

pub fn handle_link_remove(args: &ArgMatches) -> Result<()> {
    let store = open_store(args)?;
    let (item_id, field) = link_args(args);
    let url = args.get_one::<String>("url").unwrap();

    if store.remove_link(item_id, field, url)? {
        println!(
            "{} Removed {} link from item {}",
            "✓".green().bold(),
            field.as_str(),
            item_id
        );
    } else {
        println!("{} Link not found, nothing removed", "→".yellow());
    }
    Ok(())
}

pub fn handle_link_show(args: &ArgMatches) -> Result<()> {
    let store = open_store(args)?;
    let item_id = *args.get_one::<i64>("item").unwrap();

    let item = store
        .database()
        .get_item(item_id)?
        .with_context(|| format!("Unknown content item: {}", item_id))?;
    println!(
        "{}",
        format!("[{}] {} {}", item.id, item.title, item.permalink).bright_white()
    );
    println!();

    for field in LinkField::ALL {
        let raw = store.get_raw(item_id, field)?;
        let (_, dropped) = store.preview(item_id, field)?;

        println!("{}", format!("{} links:", field.as_str()).bold());
        if raw.trim().is_empty() {
            println!("  {}", "(none)".bright_black());
        } else {
            for line in raw.lines().filter(|l| !l.trim().is_empty()) {
                println!("  - {}", line.trim());
            }
        }
        if dropped > 0 {
            println!(
                "  {} {} line(s) fail validation and will not be injected",
                "⚠".yellow(),
                dropped
            );
        }
        println!();
    }
    Ok(())
}

pub fn handle_link_clear(args: &ArgMatches) -> Result<()> {
    let store = open_store(args)?;
    let item_id = *args.get_one::<i64>("item").unwrap();
    let which = args.get_one::<String>("type").unwrap();

    match LinkField::parse(which) {
        Some(field) => {
            store.clear(item_id, field)?;
            println!(
                "{} Cleared {} links for item {}",
                "✓".green().bold(),
                field.as_str(),
                item_id
            );
        }
        None => {
            store.clear_both(item_id)?;
            println!(
                "{} Cleared all links for item {}",
                "✓".green().bold(),
                item_id
            );
        }
    }
    Ok(())
}

pub fn handle_inject(args: &ArgMatches) -> Result<()> {
    let store = open_store(args)?;
    let item_id = *args.get_one::<i64>("item").unwrap();

    let input = read_input(args.get_one::<PathBuf>("input"))?;
    let output = inject_text(store, item_id, &input)?;
    write_output(args.get_one::<PathBuf>("output"), &output)
}

pub async fn handle_fetch(args: &ArgMatches) -> Result<()> {
    let store = open_store(args)?;
    let item_id = *args.get_one::<i64>("item").unwrap();
    let url = args.get_one::<Url>("url").unwrap();

    let (body, content_type) = fetch_page(url).await?;
    let kind = response_kind_for_content_type(content_type.as_deref());
    if !kind.eligible() {
        println!(
            "{} {} response, schema injection skipped",
            "→".yellow(),
            kind.as_str()
        );
    }

    let injector = Injector::new(Arc::new(store), None);
    let out = injector.transform_response(item_id, &ResponseContext::of(kind), &body);
    write_output(args.get_one::<PathBuf>("output"), &out)
}

pub async fn handle_inspect(args: &ArgMatches) -> Result<()> {
    let html = if let Some(url) = args.get_one::<Url>("url") {
        fetch_page(url).await?.0
    } else if let Some(path) = args.get_one::<PathBuf>("input") {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        bail!("Either --url or --input must be provided");
    };

    let docs = scan::extract_documents(&html);
    if docs.is_empty() {
        println!("{} No JSON-LD documents found", "→".yellow());
        return Ok(());
    }

    println!(
        "{} {} JSON-LD document(s) found\n",
        "✓".green().bold(),
        docs.len()
    );
    for (index, doc) in docs.iter().enumerate() {
        let types = scan::document_types(doc);
        let label = if types.is_empty() {
            "(untyped)".to_string()
        } else {
            types.join(", ")
        };
        println!(
            "{}",
            format!("## Document {} [{}]", index + 1, label)
                .bright_white()
                .bold()
        );
        println!("{}\n", serde_json::to_string_pretty(doc)?);
    }
    Ok(())
}

pub fn handle_uninstall(args: &ArgMatches) -> Result<()> {
    let db = open_database(args)?;
    let total_items = db.count_items()?;
    let store = LinkStore::new(db);

    if !args.get_flag("yes") {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!(
            "This removes both stored link fields from all {} content item(s),",
            total_items
        );
        println!("published or not. The items themselves are kept.");
        println!();

        let response = print_prompt("Do you want to continue? [y/N]:");
        println!();

        if response != "y" && response != "yes" {
            println!("{} Uninstall cancelled.", "✗".red().bold());
            return Ok(());
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut removed = 0;
    for field in LinkField::ALL {
        spinner.set_message(format!("Removing {} links...", field.as_str()));
        removed += store.clear_all(field)?;
    }
    spinner.finish_and_clear();

    println!(
        "{} Removed {} stored link list(s) across {} item(s)",
        "✓".green().bold(),
        removed,
        total_items
    );
    Ok(())
}
