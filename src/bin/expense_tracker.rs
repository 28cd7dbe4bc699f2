use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    process::exit,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AlertType, AppState, Category, ClientConfig, ConfigArgs, DEFAULT_MONTHLY_LIMIT, ExpenseID,
    FileStorage, HttpExpenseApi, NewExpense, Notices, ProfileForm, SeriesPoint, SignUpForm,
    SyncOutcome, View, charts, currency::format_currency, parse_amount,
};

/// A command line client for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with your email and password.
    Login {
        /// The email address you signed up with.
        #[arg(long)]
        email: Option<String>,
    },
    /// Create a new account.
    Signup,
    /// Log out and forget the saved session.
    Logout,
    /// Show who is logged in.
    Whoami,
    /// List your expenses and their total.
    List,
    /// Record a new expense.
    Add {
        /// What the money was spent on.
        name: String,
        /// How much was spent, e.g. 12.50.
        #[arg(value_parser = parse_amount)]
        amount: f64,
        /// Food, Transportation, Entertainment, Utilities, Shopping, Healthcare or Other.
        #[arg(short, long, default_value_t = Category::Other)]
        category: Category,
    },
    /// Delete an expense.
    Delete {
        /// The ID shown by `list`.
        id: ExpenseID,
        /// Delete without asking first.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show spending by category and by month.
    Analytics {
        /// Write interactive HTML charts to this directory.
        #[arg(long)]
        chart_dir: Option<PathBuf>,
    },
    /// Change your user name, email, mobile number or monthly limit.
    UpdateProfile,
    /// Delete your account and all of its expenses.
    DeleteAccount {
        /// Delete without asking first.
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = match args.config.into_config() {
        Ok(config) => config,
        Err(error) => {
            print_error(error);
            exit(2);
        }
    };

    setup_logging(&config.data_dir);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if !runtime.block_on(run(args.command, &config))? {
        exit(1);
    }

    Ok(())
}

fn setup_logging(data_dir: &Path) {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    let debug_log = open_log_file(data_dir).map(|log_file| {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(false)
            .with_writer(Arc::new(log_file))
            .with_filter(filter::LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(debug_log)
        .init();
}

/// Logging to a file is best effort, the client works without it.
fn open_log_file(data_dir: &Path) -> Option<File> {
    let log_file = fs::create_dir_all(data_dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join("debug.log"))
    });

    match log_file {
        Ok(log_file) => Some(log_file),
        Err(error) => {
            print_error(format!("Could not create log file in {data_dir:?}: {error}"));
            None
        }
    }
}

/// Run `command` and report whether it succeeded.
async fn run(command: Command, config: &ClientConfig) -> Result<bool, Box<dyn Error>> {
    let api = HttpExpenseApi::new(&config.base_url, config.request_timeout)?;
    let mut state = AppState::new(FileStorage::new(&config.data_dir), Arc::new(api));
    state.restore();

    let outcome = match command {
        Command::Login { email } => {
            let email = match email {
                Some(email) => email,
                None => input("Email", None)?,
            };
            let Some(password) = prompt_password("Password: ") else {
                return Ok(false);
            };

            let outcome = state.log_in(&email, &password).await;
            if outcome == SyncOutcome::Done {
                print_notices(state.notices());
                print_expenses(&state);
            }
            outcome
        }
        Command::Signup => {
            if state.navigate(View::SignUp) != View::SignUp {
                print_error("You are already logged in. Run `expense-tracker logout` first.");
                return Ok(false);
            }

            let Some(form) = prompt_sign_up_form()? else {
                return Ok(false);
            };
            state.sign_up(&form).await
        }
        Command::Logout => {
            state.log_out();
            println!("Logged out.");
            SyncOutcome::Done
        }
        Command::Whoami => {
            print_profile(&state);
            SyncOutcome::Done
        }
        Command::List => {
            if !require_login(&mut state, View::Dashboard) {
                return Ok(false);
            }

            let outcome = state.load_expenses().await;
            print_notices(state.notices());
            print_expenses(&state);
            outcome
        }
        Command::Add {
            name,
            amount,
            category,
        } => {
            if !require_login(&mut state, View::Dashboard) {
                return Ok(false);
            }

            let expense = match NewExpense::new(&name, amount, category) {
                Ok(expense) => expense,
                Err(error) => {
                    print_error(error);
                    return Ok(false);
                }
            };
            state.add_expense(expense).await
        }
        Command::Delete { id, yes } => {
            if !require_login(&mut state, View::Dashboard) {
                return Ok(false);
            }

            state
                .delete_expense(id, |prompt: &str| yes || confirm(prompt))
                .await
        }
        Command::Analytics { chart_dir } => {
            if !require_login(&mut state, View::Analytics) {
                return Ok(false);
            }

            let outcome = state.load_analytics().await;
            print_notices(state.notices());

            let analytics = state.analytics();
            print_series("Spending by category", analytics.categories());
            print_series("Spending by month", analytics.months());

            if let Some(chart_dir) = chart_dir {
                write_charts(&chart_dir, &state)?;
            }
            outcome
        }
        Command::UpdateProfile => {
            if !require_login(&mut state, View::Settings) {
                return Ok(false);
            }

            let profile = state
                .session_store()
                .session()
                .map(|session| session.profile.clone())
                .unwrap_or_default();

            let form = ProfileForm {
                user_name: input("Username", profile.username)?,
                email: input("Email", profile.email)?,
                mobile_number: input("Mobile number", None)?,
                monthly_limit: input("Monthly limit", Some(DEFAULT_MONTHLY_LIMIT.to_string()))?,
            };
            state.update_profile(&form).await
        }
        Command::DeleteAccount { yes } => {
            if !require_login(&mut state, View::Settings) {
                return Ok(false);
            }

            state
                .delete_account(|prompt: &str| yes || confirm(prompt))
                .await
        }
    };

    print_notices(state.notices());

    Ok(match outcome {
        SyncOutcome::Done => true,
        SyncOutcome::Cancelled => {
            println!("Nothing was changed.");
            true
        }
        SyncOutcome::Waiting => {
            print_error("Your saved session has no user ID. Log in again.");
            false
        }
        SyncOutcome::Failed => false,
    })
}

/// Check the route gate for `view`, telling the user to log in if it is closed.
fn require_login(state: &mut AppState<FileStorage>, view: View) -> bool {
    if state.navigate(view) == view {
        return true;
    }

    print_error("You are not logged in. Run `expense-tracker login` first.");
    false
}

fn prompt_sign_up_form() -> Result<Option<SignUpForm>, Box<dyn Error>> {
    let user_name = input("Username", None)?;
    let email = input("Email", None)?;
    let mobile_number = input("Mobile number", None)?;
    let monthly_limit = input("Monthly limit", Some(DEFAULT_MONTHLY_LIMIT.to_string()))?;

    let Some(password) = prompt_new_password() else {
        return Ok(None);
    };

    Ok(Some(SignUpForm {
        user_name,
        email,
        mobile_number,
        password,
        monthly_limit,
    }))
}

fn input(prompt: &str, default: Option<String>) -> Result<String, dialoguer::Error> {
    let mut input = dialoguer::Input::<String>::new().with_prompt(prompt);

    if let Some(default) = default {
        input = input.default(default);
    }

    input.interact_text()
}

fn confirm(prompt: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or_else(|error| {
            print_error(format!("Could not read your answer: {error}"));
            false
        })
}

fn prompt_new_password() -> Option<String> {
    loop {
        let first_password = prompt_password("Password: ")?;
        let second_password = prompt_password("Enter the same password again: ")?;

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        return Some(first_password);
    }
}

fn prompt_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn print_profile(state: &AppState<FileStorage>) {
    let Some(session) = state.session_store().session() else {
        println!("Not logged in.");
        return;
    };

    let profile = &session.profile;
    println!(
        "Logged in as {} <{}>",
        profile.username.as_deref().unwrap_or("unknown user"),
        profile.email.as_deref().unwrap_or("no email"),
    );

    if let Some(user_id) = profile.user_id() {
        println!("User ID: {user_id}");
    }
}

fn print_expenses(state: &AppState<FileStorage>) {
    let expenses = state.expenses();

    if expenses.records().is_empty() {
        println!("No expenses yet. Add one with `expense-tracker add`.");
    } else {
        println!(
            "{:>6}  {:<30}  {:<14}  {:>12}  Date",
            "ID", "Name", "Category", "Amount"
        );

        for record in expenses.records() {
            let date = record
                .created_at
                .map(|created_at| created_at.date().to_string())
                .unwrap_or_default();

            println!(
                "{:>6}  {:<30}  {:<14}  {:>12}  {date}",
                record.id,
                record.name,
                record.category.as_str(),
                format_currency(record.amount),
            );
        }
    }

    let total = expenses
        .total()
        .map(format_currency)
        .unwrap_or_else(|| "unknown".to_owned());

    println!();
    println!(
        "Expenses: {}{}",
        expenses.count(),
        stale_marker(expenses.records_stale())
    );
    println!("Total:    {total}{}", stale_marker(expenses.total_stale()));
}

fn stale_marker(is_stale: bool) -> &'static str {
    if is_stale { " (out of date)" } else { "" }
}

fn print_series(title: &str, series: &[SeriesPoint]) {
    println!("{title}");

    if series.is_empty() {
        println!("  No data yet.");
        return;
    }

    for (point, color) in charts::colored_series(series) {
        println!(
            "  {:<20} {:>12}  {color}",
            point.key,
            format_currency(point.value)
        );
    }
}

fn write_charts(chart_dir: &Path, state: &AppState<FileStorage>) -> io::Result<()> {
    fs::create_dir_all(chart_dir)?;

    let analytics = state.analytics();
    let pages = [
        (
            "category.html",
            charts::render_html(
                "Spending by category",
                &charts::category_chart(analytics.categories()),
            ),
        ),
        (
            "monthly.html",
            charts::render_html(
                "Spending by month",
                &charts::monthly_chart(analytics.months()),
            ),
        ),
    ];

    for (file_name, html) in pages {
        let path = chart_dir.join(file_name);
        fs::write(&path, html)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn print_notices(notices: &Notices) {
    for alert in notices.drain() {
        match alert.alert_type {
            AlertType::Success => println!("\x1b[32;1m{}\x1b[0m", alert.message),
            AlertType::Error => print_error(&alert.message),
        }

        if !alert.details.is_empty() {
            println!("  {}", alert.details);
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
