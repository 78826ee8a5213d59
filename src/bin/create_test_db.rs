use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;

use expense_tracker::{
    initialize_db,
    transaction::{Transaction, create_transaction},
};

/// A utility for creating a test database for the REST API server of expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The user ID to create the sample transactions for.
    #[arg(long, short, default_value = "test_user")]
    user_id: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test transactions for {}...", args.user_id);

    let sample_transactions = [
        ("Salary", 320000, "Income"),
        ("Rent", -120000, "Bills"),
        ("Groceries", -8640, "Food & Drinks"),
        ("Bus pass", -4500, "Transportation"),
        ("Cinema", -1850, "Entertainment"),
        ("Coffee", -450, "Food & Drinks"),
    ];

    for (title, cents, category) in sample_transactions {
        create_transaction(
            Transaction::build(&args.user_id, title, Decimal::new(cents, 2), category),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
