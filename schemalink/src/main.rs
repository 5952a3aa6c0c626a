use commands::command_argument_builder;
use schemalink::handlers;
use schemalink_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    tracing_subscriber::fmt::init();

    let result = match chosen_command.subcommand() {
        Some(("init", primary_command)) => handlers::handle_init(primary_command),
        Some(("item", primary_command)) => match primary_command.subcommand() {
            Some(("add", secondary_command)) => handlers::handle_item_add(secondary_command),
            Some(("list", secondary_command)) => handlers::handle_item_list(secondary_command),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("link", primary_command)) => match primary_command.subcommand() {
            Some(("add", secondary_command)) => handlers::handle_link_add(secondary_command),
            Some(("remove", secondary_command)) => handlers::handle_link_remove(secondary_command),
            Some(("show", secondary_command)) => handlers::handle_link_show(secondary_command),
            Some(("clear", secondary_command)) => handlers::handle_link_clear(secondary_command),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("inject", primary_command)) => handlers::handle_inject(primary_command),
        Some(("fetch", primary_command)) => handlers::handle_fetch(primary_command).await,
        Some(("inspect", primary_command)) => handlers::handle_inspect(primary_command).await,
        Some(("uninstall", primary_command)) => handlers::handle_uninstall(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
