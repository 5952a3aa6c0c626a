use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("schemalink")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("schemalink")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-d --"database" <PATH>)
                .required(false)
                .help("Directory holding the schemalink database")
                .default_value("~/.config/schemalink/")
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the schemalink database on your filesystem")
                .arg(
                    arg!(-f --"force")
                        .help("Forces the overwriting of any existing database at the configured location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("item")
                .about("Manage the content catalog")
                .subcommand(
                    command!("add")
                        .about("Add a content item to the catalog")
                        .arg(
                            arg!(-t --"title" <TITLE>)
                                .required(true)
                                .help("Title of the content item"),
                        )
                        .arg(
                            arg!(-s --"slug" <SLUG>)
                                .required(true)
                                .help("Unique slug for the item"),
                        )
                        .arg(
                            arg!(-p --"permalink" <URL>)
                                .required(true)
                                .help("Public URL the item is rendered at")
                                .value_parser(clap::value_parser!(Url)),
                        )
                        .arg(
                            arg!(--"item-type" <TYPE>)
                                .required(false)
                                .help("Content type of the item")
                                .default_value("post"),
                        )
                        .arg(
                            arg!(-c --"category" <CATEGORY>)
                                .required(false)
                                .help("Optional category label"),
                        )
                        .arg(
                            arg!(--"status" <STATUS>)
                                .required(false)
                                .help("Publication status")
                                .value_parser(["published", "draft", "private", "archived"])
                                .default_value("published"),
                        ),
                )
                .subcommand(
                    command!("list")
                        .about("List catalog items with their stored schema links")
                        .arg(
                            arg!(-s --"search" <TERM>)
                                .required(false)
                                .help("Search term applied to the selected column"),
                        )
                        .arg(
                            arg!(--"column" <COLUMN>)
                                .required(false)
                                .help("Which columns the search term matches against")
                                .value_parser(["all", "title", "url", "schema-links"])
                                .default_value("all"),
                        )
                        .arg(
                            arg!(--"item-type" <TYPE>)
                                .required(false)
                                .help("Only show items of this content type"),
                        )
                        .arg(
                            arg!(-c --"category" <CATEGORY>)
                                .required(false)
                                .help("Only show items in this category"),
                        )
                        .arg(
                            arg!(--"status" <STATUS>)
                                .required(false)
                                .help("Only show items with this status")
                                .value_parser(["published", "draft", "private", "archived"]),
                        )
                        .arg(
                            arg!(--"orderby" <COLUMN>)
                                .required(false)
                                .help("Sort column")
                                .value_parser(["title", "type", "url"])
                                .default_value("title"),
                        )
                        .arg(
                            arg!(--"desc")
                                .required(false)
                                .help("Sort descending")
                                .action(clap::ArgAction::SetTrue),
                        )
                        .arg(
                            arg!(--"page" <N>)
                                .required(false)
                                .help("Page number")
                                .value_parser(clap::value_parser!(usize))
                                .default_value("1"),
                        )
                        .arg(
                            arg!(--"per-page" <N>)
                                .required(false)
                                .help("Items per page")
                                .value_parser(clap::value_parser!(usize))
                                .default_value("20"),
                        ),
                ),
        )
        .subcommand(
            command!("link")
                .about("Edit an item's significant and related links")
                .subcommand(
                    command!("add")
                        .about("Add one link to an item's list")
                        .arg(
                            arg!(-i --"item" <ID>)
                                .required(true)
                                .help("Content item ID")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            arg!(-t --"type" <TYPE>)
                                .required(true)
                                .help("Which list to edit")
                                .value_parser(["significant", "related"]),
                        )
                        .arg(
                            arg!(-u --"url" <URL>)
                                .required(true)
                                .help("Absolute http(s) URL to add"),
                        ),
                )
                .subcommand(
                    command!("remove")
                        .about("Remove one link from an item's list")
                        .arg(
                            arg!(-i --"item" <ID>)
                                .required(true)
                                .help("Content item ID")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            arg!(-t --"type" <TYPE>)
                                .required(true)
                                .help("Which list to edit")
                                .value_parser(["significant", "related"]),
                        )
                        .arg(
                            arg!(-u --"url" <URL>)
                                .required(true)
                                .help("Stored link to remove"),
                        ),
                )
                .subcommand(
                    command!("show")
                        .about("Show an item's stored links and validation state")
                        .arg(
                            arg!(-i --"item" <ID>)
                                .required(true)
                                .help("Content item ID")
                                .value_parser(clap::value_parser!(i64)),
                        ),
                )
                .subcommand(
                    command!("clear")
                        .about("Clear one or both of an item's link lists")
                        .arg(
                            arg!(-i --"item" <ID>)
                                .required(true)
                                .help("Content item ID")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            arg!(-t --"type" <TYPE>)
                                .required(false)
                                .help("Which list to clear")
                                .value_parser(["significant", "related", "all"])
                                .default_value("all"),
                        ),
                ),
        )
        .subcommand(
            command!("inject")
                .about(
                    "Inject an item's links into the JSON-LD of a rendered document. HTML input \
                goes through the response text scan; a bare JSON document is mutated directly.",
                )
                .arg(
                    arg!(-i --"item" <ID>)
                        .required(true)
                        .help("Content item the document belongs to")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    arg!(--"input" <PATH>)
                        .required(false)
                        .help("Input file (default: stdin)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the transformed document here (default: stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("fetch")
                .about("Fetch a live page and preview link injection into its JSON-LD")
                .arg(
                    arg!(-i --"item" <ID>)
                        .required(true)
                        .help("Content item the page belongs to")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to fetch")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the transformed body here (default: stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("inspect")
                .about("Extract and display the JSON-LD documents embedded in a page")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to fetch")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("input"),
                )
                .arg(
                    arg!(--"input" <PATH>)
                        .required(false)
                        .help("Local HTML file to read instead")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                ),
        )
        .subcommand(
            command!("uninstall")
                .about(
                    "Remove both stored link fields from every content item, regardless of \
                type or status",
                )
                .arg(
                    arg!(-y --"yes")
                        .required(false)
                        .help("Skip the confirmation prompt")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
