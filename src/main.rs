use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use restful_admin::audit::AuditLogger;
use restful_admin::cli::{
    build_demo_site, handle_audit_command, handle_docs_command, handle_request_command,
    handle_routes_command, AuditCommands, RequestArgs,
};
use restful_admin::config::{paths::AdminPaths, settings::Settings};

/// Environment variable holding the log filter, e.g. `restful_admin=debug`
const LOG_ENV: &str = "RESTFUL_ADMIN_LOG";

#[derive(Parser)]
#[command(
    name = "restful-admin",
    version,
    about = "Generic REST administration endpoints for data models",
    long_about = "restful-admin exposes registered models through uniform CRUD \
                  endpoints with per-action permissions and an audit trail. \
                  This front end serves a demo site backed by files in the \
                  data directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and settings
    Init,

    /// Show current configuration and paths
    Config,

    /// List every route the demo site serves
    Routes,

    /// Show generated documentation for a model
    Docs {
        /// Model name, e.g. `widget`
        model: String,
    },

    /// Send a request through the demo site
    #[command(alias = "req")]
    Request(RequestArgs),

    /// Audit log commands
    #[command(subcommand)]
    Audit(AuditCommands),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = AdminPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing restful-admin at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Run 'restful-admin routes' to see the demo routes.");
        }
        Some(Commands::Config) => {
            println!("restful-admin Configuration");
            println!("===========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!(
                "Audit entries:    {}",
                AuditLogger::new(paths.audit_log()).entry_count()?
            );
            println!(
                "Initialized:      {}",
                if paths.is_initialized() { "yes" } else { "no (run 'restful-admin init')" }
            );
            println!();
            println!("Settings:");
            println!("  URL prefix:                 {}", settings.mount_point());
            println!(
                "  Page size:                  {}",
                settings
                    .page_size
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "off".to_string())
            );
            println!("  Max page size:              {}", settings.max_page_size);
            println!("  Unmapped action permission: {}", settings.not_found_permission_default);
        }
        Some(Commands::Routes) => {
            let demo = build_demo_site(&paths, &settings)?;
            handle_routes_command(demo.site)?;
        }
        Some(Commands::Docs { model }) => {
            let demo = build_demo_site(&paths, &settings)?;
            handle_docs_command(&demo.site, &model)?;
        }
        Some(Commands::Request(args)) => {
            paths.ensure_directories()?;
            let demo = build_demo_site(&paths, &settings)?;
            let router = demo.site.into_router();
            handle_request_command(&router, args)?;
        }
        Some(Commands::Audit(cmd)) => {
            let demo = build_demo_site(&paths, &settings)?;
            handle_audit_command(&demo.audit, cmd)?;
        }
        None => {
            println!("restful-admin - REST administration endpoints for data models");
            println!();
            println!("Run 'restful-admin --help' for usage information.");
        }
    }

    Ok(())
}
