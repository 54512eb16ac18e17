use std::path::PathBuf;

use clap::Parser;

use report_cards::generate_report_cards;

#[derive(Parser)]
#[command(name = "report-cards")]
#[command(about = "Generate per-student PDF report cards from a score spreadsheet", long_about = None)]
struct Cli {
    /// Spreadsheet with one row per subject score (.xlsx, .xls or .csv)
    #[arg(default_value = "student_data.xlsx")]
    input: PathBuf,

    /// Directory the report cards are written into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let outcomes = generate_report_cards(&cli.input, &cli.out_dir)?;
    if outcomes.is_empty() {
        println!("No student rows found in {}.", cli.input.display());
        return Ok(());
    }

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("Report card generated: {}", path.display()),
            Err(err) => {
                failed += 1;
                eprintln!(
                    "Failed to generate report card for {}: {}",
                    outcome.student_id, err
                );
            }
        }
    }

    println!(
        "Generated {} of {} report cards.",
        outcomes.len() - failed,
        outcomes.len()
    );
    if failed > 0 {
        anyhow::bail!("{failed} report card(s) could not be generated");
    }

    Ok(())
}
