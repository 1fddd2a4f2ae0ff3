use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use centime::{NewUser, PasswordHash, ValidatedPassword, create_user, initialize_db};

/// A utility for creating a test database for the REST API server of centime.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
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

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            first_name: "Tester".to_owned(),
            last_name: "Last".to_owned(),
            username: "test".to_owned(),
            email: "test@email.com".parse()?,
            password_hash,
        },
        &conn,
    )?;

    println!("Creating test accounts...");

    conn.execute(
        "INSERT INTO account (user_id, name, balance) VALUES (?1, 'Checking', '1234.56')",
        (user.id.as_i64(),),
    )?;
    let checking_id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO account (user_id, name, balance) VALUES (?1, 'Savings', '25000.00')",
        (user.id.as_i64(),),
    )?;

    println!("Creating test transactions...");

    conn.execute(
        "INSERT INTO \"transaction\" (account_id, description, value, date, kind) \
        VALUES (?1, 'Coffee', '-4.50', '2026-08-01', 'expense')",
        (checking_id,),
    )?;
    conn.execute(
        "INSERT INTO \"transaction\" (account_id, description, value, date, kind) \
        VALUES (?1, 'Salary', '4200.00', '2026-08-01', 'income')",
        (checking_id,),
    )?;

    println!("Success!");

    Ok(())
}
