use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

use daily_log_sync::commands::{
    add_entry, blank_entry, delete_entry, entry_stats, export_config, export_entries, get_config,
    import_config, import_csv_file, list_entries, load_entries, pending_digest, reset_config,
    save_entry, EntryView, LoadResult,
};
use daily_log_sync::core::models::Record;
use daily_log_sync::core::task_log::{
    Notice, SortOrder, StatusFilter, ViewFilter, DATE_COLUMN, DESCRIPTION_COLUMN, STATUS_COLUMN,
    TIMING_COLUMN,
};
use daily_log_sync::utils::{init_tracing, is_valid_endpoint_url};
use daily_log_sync::{AppConfig, AppState, NAME, VERSION};

#[derive(Parser)]
#[command(name = "daily-log")]
#[command(about = "Daily task log kept in a spreadsheet")]
#[command(version)]
struct Cli {
    /// Read entries from a local CSV file instead of the sheet (read-only)
    #[arg(long, global = true)]
    file: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries, newest first by default
    List {
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = StatusCli::All)]
        status: StatusCli,
        #[arg(long, value_enum, default_value_t = SortCli::Desc)]
        sort: SortCli,
    },
    Stats,
    Add {
        #[command(flatten)]
        fields: EntryFields,
        /// Defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    Update {
        position: usize,
        #[arg(long)]
        date: String,
        #[command(flatten)]
        fields: EntryFields,
    },
    Delete {
        position: usize,
    },
    Export {
        path: String,
    },
    /// Print the pending-task reminder digest
    Remind,
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    Reset,
    Export { path: String },
    Import { path: String },
}

#[derive(Args)]
struct EntryFields {
    description: String,
    #[arg(long, default_value = "")]
    timing: String,
    #[arg(long, default_value = "Pending")]
    status: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusCli {
    All,
    Completed,
    Pending,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortCli {
    Asc,
    Desc,
}

impl From<StatusCli> for StatusFilter {
    fn from(value: StatusCli) -> Self {
        match value {
            StatusCli::All => Self::All,
            StatusCli::Completed => Self::Completed,
            StatusCli::Pending => Self::Pending,
        }
    }
}

impl From<SortCli> for SortOrder {
    fn from(value: SortCli) -> Self {
        match value {
            SortCli::Asc => Self::Asc,
            SortCli::Desc => Self::Desc,
        }
    }
}

impl Commands {
    fn is_mutation(&self) -> bool {
        matches!(self, Self::Add { .. } | Self::Update { .. } | Self::Delete { .. })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let state = match AppState::new() {
        Ok(state) => state,
        Err(error) => {
            eprintln!("Error: {error}");
            return ExitCode::FAILURE;
        }
    };

    {
        let config = state.config.read().await;
        if config.advanced.enable_logging {
            init_tracing(Some(&config.advanced.log_level));
        }
    }
    state.report_config_fallback();
    tracing::debug!("{} v{} starting", NAME, VERSION);

    match run(&state, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Positions from a local file do not map onto sheet rows, so edits are refused
fn check_target(file: Option<&str>, command: &Commands) -> Result<(), String> {
    match file {
        Some(path) if command.is_mutation() => Err(format!(
            "--file {path} is read-only; run add, update and delete against the sheet"
        )),
        _ => Ok(()),
    }
}

async fn run(state: &AppState, cli: Cli) -> Result<(), String> {
    check_target(cli.file.as_deref(), &cli.command)?;

    match cli.command {
        Commands::Config { command } => return run_config(state, command).await,
        Commands::Remind => return print_reminder(state).await,
        _ => {}
    }

    let loaded = match cli.file {
        Some(path) => import_csv_file(state, path).await?,
        None => load_entries(state).await?,
    };

    match cli.command {
        Commands::List {
            search,
            status,
            sort,
        } => {
            let filter = ViewFilter {
                search: search.unwrap_or_default(),
                status: status.into(),
                sort: sort.into(),
            };
            print_entries(&list_entries(state, filter).await?);
        }
        Commands::Stats => print_stats(state, &loaded).await?,
        Commands::Add { fields, date } => {
            let mut record = blank_entry().await?;
            if let Some(date) = date {
                record.insert(DATE_COLUMN, date.trim());
            }
            fields.apply_to(&mut record);
            print_notice(&add_entry(state, record).await?);
        }
        Commands::Update {
            position,
            date,
            fields,
        } => {
            let mut record = Record::new();
            record.insert(DATE_COLUMN, date.trim());
            fields.apply_to(&mut record);
            print_notice(&save_entry(state, position, record).await?);
        }
        Commands::Delete { position } => {
            print_notice(&delete_entry(state, position).await?);
        }
        Commands::Export { path } => {
            let count = export_entries(state, path.clone()).await?;
            println!("Exported {count} entries to {path}");
        }
        Commands::Remind | Commands::Config { .. } => {}
    }

    Ok(())
}

impl EntryFields {
    fn apply_to(&self, record: &mut Record) {
        record.insert(DESCRIPTION_COLUMN, self.description.trim());
        record.insert(TIMING_COLUMN, self.timing.trim());
        record.insert(STATUS_COLUMN, self.status.trim());
    }
}

async fn run_config(state: &AppState, command: Option<ConfigCommand>) -> Result<(), String> {
    match command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => print_config(state, &get_config(state).await?),
        ConfigCommand::Reset => {
            reset_config(state).await?;
            println!("Configuration reset to defaults");
        }
        ConfigCommand::Export { path } => {
            export_config(state, path.clone()).await?;
            println!("Configuration exported to {path}");
        }
        ConfigCommand::Import { path } => {
            let config = import_config(state, path).await?;
            print_config(state, &config);
        }
    }
    Ok(())
}

fn print_entries(entries: &[EntryView]) {
    if entries.is_empty() {
        println!("No entries found");
        return;
    }

    for entry in entries {
        let record = &entry.record;
        println!(
            "[{:>3}] {:<18} {:<12} {:<12} {}",
            entry.position,
            record.get_or_empty(DATE_COLUMN),
            record.get_or_empty(TIMING_COLUMN),
            record.get_or_empty(STATUS_COLUMN),
            record.get_or_empty(DESCRIPTION_COLUMN)
        );
    }
}

async fn print_stats(state: &AppState, loaded: &LoadResult) -> Result<(), String> {
    let stats = entry_stats(state).await?;
    println!("Source: {}", loaded.source);
    if let Some(parse) = &loaded.parse {
        println!(
            "Rows: {} read, {} skipped, {} ragged",
            parse.total_rows, parse.skipped_rows, parse.ragged_rows
        );
    }
    println!("Total: {}", stats.total);
    println!("Completed: {}", stats.completed);
    println!("Pending: {}", stats.pending);
    Ok(())
}

fn print_notice(notice: &Notice) {
    println!("{}", notice.message);
}

async fn print_reminder(state: &AppState) -> Result<(), String> {
    match pending_digest(state).await? {
        Some(digest) => {
            println!("To: {}", digest.to.as_deref().unwrap_or("(not configured)"));
            println!("Subject: {}", digest.subject);
            println!();
            println!("{}", digest.body);
        }
        None => println!("No data rows; nothing to send"),
    }
    Ok(())
}

fn print_config(state: &AppState, config: &AppConfig) {
    let endpoint = &config.endpoint.apps_script_url;

    println!("Config file: {}", state.config_path.display());
    println!("Sheet CSV URL: {}", config.sheet.csv_url);
    if config.endpoint.is_mock() {
        println!("Mutation endpoint: (mock mode)");
    } else if is_valid_endpoint_url(endpoint) {
        println!("Mutation endpoint: {endpoint}");
    } else {
        println!("Mutation endpoint: {endpoint} (invalid)");
    }
    println!("Reminder recipient: {:?}", config.reminder.recipient_email);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::CommandFactory;
    use daily_log_sync::{AppError, AppResult, SheetTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use url::Url;

    /// Counts requests and fails every one of them
    #[derive(Default)]
    struct CountingTransport {
        requests: AtomicUsize,
    }

    #[async_trait]
    impl SheetTransport for CountingTransport {
        async fn get_text(&self, _url: &Url) -> AppResult<String> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Endpoint("offline".to_string()))
        }

        async fn send_unconfirmed(&self, _url: &Url) -> AppResult<()> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Endpoint("offline".to_string()))
        }
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("daily-log").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_options() {
        let cli = parse(&["list", "review", "--status", "pending", "--sort", "asc"]);
        let Commands::List {
            search,
            status,
            sort,
        } = cli.command
        else {
            panic!("expected list");
        };
        assert_eq!(search.as_deref(), Some("review"));
        assert_eq!(StatusFilter::from(status), StatusFilter::Pending);
        assert_eq!(SortOrder::from(sort), SortOrder::Asc);
    }

    #[test]
    fn test_global_file_flag_after_subcommand() {
        let cli = parse(&["stats", "--file", "log.csv"]);
        assert_eq!(cli.file.as_deref(), Some("log.csv"));
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        assert!(Cli::try_parse_from(["daily-log", "delete", "first"]).is_err());
        assert!(Cli::try_parse_from(["daily-log", "list", "--status", "done"]).is_err());
        assert!(Cli::try_parse_from(["daily-log", "update", "3", "Fix"]).is_err());
    }

    #[test]
    fn test_mutations_refused_for_local_file() {
        // 本地文件的位置不对应表格行，写操作必须拒绝
        for args in [
            vec!["--file", "log.csv", "add", "Write docs"],
            vec!["--file", "log.csv", "update", "0", "--date", "1 May 2026", "Fix"],
            vec!["delete", "2", "--file", "log.csv"],
        ] {
            let cli = parse(&args);
            let error = check_target(cli.file.as_deref(), &cli.command).unwrap_err();
            assert!(error.contains("read-only"));
        }

        let cli = parse(&["--file", "log.csv", "list"]);
        assert!(check_target(cli.file.as_deref(), &cli.command).is_ok());
        let cli = parse(&["delete", "2"]);
        assert!(check_target(cli.file.as_deref(), &cli.command).is_ok());
    }

    #[tokio::test]
    async fn test_delete_with_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("log.csv");
        std::fs::write(&csv_path, "Date,Description,Timing,Status\n1 May 2026,A,,\n").unwrap();

        let mut config = AppConfig::default();
        config.endpoint.apps_script_url = "https://script.google.com/macros/s/deploy/exec".into();
        let transport = Arc::new(CountingTransport::default());
        let state = AppState::with_config(config, dir.path().join("config.json"), transport.clone());

        let path = csv_path.to_string_lossy().to_string();
        let cli = parse(&["--file", path.as_str(), "delete", "0"]);
        assert!(run(&state, cli).await.is_err());
        assert_eq!(transport.requests.load(Ordering::SeqCst), 0);

        // 读取本地文件仍然可用
        let cli = parse(&["--file", path.as_str(), "stats"]);
        assert!(run(&state, cli).await.is_ok());
        assert_eq!(state.task_log.read().await.len(), 1);
        assert_eq!(transport.requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_entry_fields_fill_record() {
        let cli = parse(&["add", "Write docs", "--timing", "09:00", "--date", "2 May 2026"]);
        let Commands::Add { fields, date } = cli.command else {
            panic!("expected add");
        };
        assert_eq!(date.as_deref(), Some("2 May 2026"));

        let mut record = Record::new();
        fields.apply_to(&mut record);
        assert_eq!(record.get(DESCRIPTION_COLUMN), Some("Write docs"));
        assert_eq!(record.get(TIMING_COLUMN), Some("09:00"));
        assert_eq!(record.get(STATUS_COLUMN), Some("Pending"));
    }
}
