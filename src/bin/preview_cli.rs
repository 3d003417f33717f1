use std::env;

use daily_log_sync::commands::import::{preview_csv_file, CsvPreview};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: preview_cli <file-path> [max-rows]");
        std::process::exit(1);
    }

    let file_path = args[1].clone();
    let max_rows = args
        .get(2)
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(10);

    match preview_csv_file(file_path, Some(max_rows)).await {
        Ok(preview) => print_preview(preview),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

fn print_preview(preview: CsvPreview) {
    println!("Headers: {:?}", preview.headers);
    println!("Encoding: {}", preview.encoding);
    println!(
        "Rows: {} parsed, {} skipped, {} ragged",
        preview.stats.parsed_rows, preview.stats.skipped_rows, preview.stats.ragged_rows
    );
    println!("Preview rows:");

    for record in preview.rows {
        let fields: Vec<String> = record
            .iter()
            .map(|(key, value)| format!("{key}={value:?}"))
            .collect();
        println!("  {}", fields.join(", "));
    }
}
