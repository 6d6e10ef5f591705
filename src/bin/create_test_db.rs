use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rand::Rng;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budget_tracker::{
    Category, NewUser, PasswordHash, Transaction, TransactionType, ValidatedPassword,
    create_default_categories, create_transaction, create_user, initialize_db,
};

/// A utility for creating a demo database for the budget tracker's REST API server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The email address of the demo user.
    #[arg(long, default_value = "demo@example.com")]
    email: String,

    /// The password of the demo user.
    #[arg(long, default_value = "test")]
    password: String,
}

/// The recurring and occasional transactions generated for each month:
/// (category name, description, lowest amount, highest amount, type).
const MONTHLY_TRANSACTIONS: [(&str, &str, f64, f64, TransactionType); 8] = [
    ("Salary", "Monthly salary", 4500.0, 4500.0, TransactionType::Income),
    ("Freelance", "Website project", 200.0, 900.0, TransactionType::Income),
    ("Bills & Utilities", "Rent", 1500.0, 1500.0, TransactionType::Expense),
    ("Bills & Utilities", "Electricity", 80.0, 160.0, TransactionType::Expense),
    ("Food & Dining", "Groceries", 300.0, 550.0, TransactionType::Expense),
    ("Transport", "Fuel", 60.0, 140.0, TransactionType::Expense),
    ("Entertainment", "Cinema", 20.0, 60.0, TransactionType::Expense),
    ("Shopping", "Clothes", 40.0, 250.0, TransactionType::Expense),
];

const MONTHS_OF_HISTORY: i64 = 6;

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

    println!("Creating demo user {}...", args.email);

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(&args.password),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            name: "Demo User".to_owned(),
            email: args.email.to_lowercase(),
            currency: "NZD".to_owned(),
            password_hash,
        },
        &conn,
    )?;

    println!("Creating default categories...");
    let categories = create_default_categories(user.id, &conn)?;

    println!("Creating {MONTHS_OF_HISTORY} months of transactions...");
    let mut rng = rand::thread_rng();
    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for months_ago in (0..MONTHS_OF_HISTORY).rev() {
        // Thirty day steps, so the dates drift a little relative to calendar months.
        let month_start = today - Duration::days(months_ago * 30);

        for (day_offset, (category_name, description, low, high, transaction_type)) in
            MONTHLY_TRANSACTIONS.iter().enumerate()
        {
            let date = month_start - Duration::days(day_offset as i64 * 3);

            let amount = if low == high {
                *low
            } else {
                (rng.gen_range(*low..*high) * 100.0).round() / 100.0
            };

            let builder = Transaction::build(amount, date, *transaction_type)
                .description(description)
                .category_id(find_category(&categories, category_name));
            create_transaction(user.id, builder, &conn)?;
            count += 1;
        }
    }

    // A couple of uncategorised transactions so the "Unknown" bucket shows up.
    for (days_ago, description) in [(2, "Cash withdrawal"), (40, "Gift")] {
        let date = today - Duration::days(days_ago);
        let builder =
            Transaction::build(50.0, date, TransactionType::Expense).description(description);
        create_transaction(user.id, builder, &conn)?;
        count += 1;
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}

fn find_category(categories: &[Category], name: &str) -> Option<i64> {
    categories
        .iter()
        .find(|category| category.name.as_ref() == name)
        .map(|category| category.id)
}
