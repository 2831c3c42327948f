//! CLI front end: search hotels, compare a selection, manage accounts.

use std::io::{self, BufRead as _, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use hotel_compare::admin::{
    AdminGate, DeleteConfirmation, DeleteStep, StaticAdminPolicy, UserDirectory,
};
use hotel_compare::auth::{
    AuthAdminBlockingClient, AuthBlockingClient, forget_session, store_session, stored_session,
};
use hotel_compare::city::CityResolver;
use hotel_compare::client::HotelApiBlockingClient;
use hotel_compare::comparison::{ComparisonView, PricePoint, RatingBucket};
use hotel_compare::error::HotelError;
use hotel_compare::models::{
    AuthUser, CityCode, DATE_FORMAT, FilterUpdate, Hotel, HotelCode, NaiveDate, SearchFilters,
    SignUpResponse, UserId,
};
use hotel_compare::navigation::{Route, resolve};
use hotel_compare::normalize::{SearchContext, normalize};
use hotel_compare::search::{HotelSearchBlocking, StayDates, local_today};
use hotel_compare::storage::{FileStorage, Storage};
use hotel_compare::store::{FilterStore, SearchSession, SelectionStore};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use secrecy::SecretString;

/// Environment variable holding the provider client id.
const CLIENT_ID_ENV: &str = "HOTEL_API_CLIENT_ID";

/// Environment variable holding the provider client secret.
const CLIENT_SECRET_ENV: &str = "HOTEL_API_CLIENT_SECRET";

/// Optional environment variable overriding the provider base URL.
const BASE_URL_ENV: &str = "HOTEL_API_BASE_URL";

/// Environment variable holding the auth provider URL.
const AUTH_URL_ENV: &str = "AUTH_URL";

/// Environment variable holding the auth provider's public key.
const AUTH_ANON_KEY_ENV: &str = "AUTH_ANON_KEY";

/// Environment variable holding the auth provider's service-role key.
const AUTH_SERVICE_ROLE_KEY_ENV: &str = "AUTH_SERVICE_ROLE_KEY";

/// Width of the text bars in comparison charts.
const BAR_WIDTH: u32 = 30;

/// Hotel search and comparison from the terminal.
#[derive(Debug, Parser)]
#[command(name = "hotels", version, about)]
struct Cli {
    /// Override the storage directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Search hotels; flags are merged into the saved filters.
    Search(SearchArgs),
    /// Show the next page of the last search.
    More,
    /// Show or reset the saved filters.
    Filters {
        /// Filter action.
        #[command(subcommand)]
        action: FilterAction,
    },
    /// Toggle a hotel from the last search in the comparison selection.
    Select {
        /// Hotel code.
        code: String,
    },
    /// Remove a hotel from the comparison selection.
    Remove {
        /// Hotel code.
        code: String,
    },
    /// Empty the comparison selection.
    ClearSelection,
    /// Compare the selected hotels.
    Compare,
    /// List recognised destinations.
    Destinations,
    /// Fetch the current offer for one hotel.
    Details {
        /// Hotel code.
        code: String,
    },
    /// Create an account.
    Signup(CredentialArgs),
    /// Sign in.
    Login(CredentialArgs),
    /// Sign out.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Admin panel.
    Admin {
        /// Admin action.
        #[command(subcommand)]
        action: AdminCommand,
    },
}

/// Filter subcommands.
#[derive(Debug, Subcommand)]
enum FilterAction {
    /// Print the saved filters.
    Show,
    /// Restore the default filters.
    Reset,
}

/// Admin subcommands.
#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// Sign in as administrator.
    Login(CredentialArgs),
    /// Sign out of the admin panel.
    Logout,
    /// List registered users.
    Users {
        /// Case-insensitive filter on email or id.
        #[arg(long)]
        search: Option<String>,
    },
    /// Delete a registered user.
    Delete {
        /// User id.
        id: String,
        /// Skip the interactive confirmation.
        #[arg(long)]
        yes: bool,
    },
}

/// Arguments for the `search` subcommand.
#[derive(Debug, Default, Args)]
struct SearchArgs {
    /// Destination, e.g. "Paris".
    destination: Option<String>,
    /// Check-in date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    check_in: Option<NaiveDate>,
    /// Check-out date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    check_out: Option<NaiveDate>,
    /// Number of adults.
    #[arg(long)]
    adults: Option<u32>,
    /// Number of children.
    #[arg(long)]
    children: Option<u32>,
    /// Number of rooms.
    #[arg(long)]
    rooms: Option<u32>,
    /// Minimum star rating.
    #[arg(long)]
    rating: Option<u32>,
    /// Lower price bound.
    #[arg(long)]
    min_price: Option<f64>,
    /// Upper price bound.
    #[arg(long)]
    max_price: Option<f64>,
}

impl SearchArgs {
    /// Converts the flags into a filter edit.
    fn to_update(&self) -> FilterUpdate {
        let date = |value: Option<NaiveDate>| value.map(|d| d.format(DATE_FORMAT).to_string());
        FilterUpdate {
            destination: self.destination.clone(),
            check_in: date(self.check_in),
            check_out: date(self.check_out),
            adults: self.adults.map(|n| n.to_string()),
            children: self.children.map(|n| n.to_string()),
            rooms: self.rooms.map(|n| n.to_string()),
            rating: self.rating.map(|n| n.to_string()),
            min_price: self.min_price.map(|p| p.to_string()),
            max_price: self.max_price.map(|p| p.to_string()),
        }
    }
}

/// Email and password.
#[derive(Debug, Args)]
struct CredentialArgs {
    /// Account email.
    email: String,
    /// Password; prompted for when omitted.
    #[arg(long)]
    password: Option<String>,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|err| format!("{err}"))
}

/// Reads a required environment variable, printing a hint when missing.
fn require_env(name: &str) -> io::Result<Option<String>> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => Ok(Some(val)),
        _ => {
            let mut err = io::stderr().lock();
            writeln!(
                err,
                "{} {} environment variable is not set",
                "error:".red().bold(),
                name.bold()
            )?;
            writeln!(
                err,
                "  {} add {}=<value> to your .env file",
                "hint:".cyan(),
                name
            )?;
            Ok(None)
        }
    }
}

/// Prints an error line and returns a failing exit code.
fn fail(context: &str, err: &HotelError) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {}",
        "error:".red().bold(),
        err.user_message()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Prints a plain error line and returns a failing exit code.
fn fail_with(message: &str) -> io::Result<ExitCode> {
    writeln!(io::stderr().lock(), "{} {message}", "error:".red().bold())?;
    Ok(ExitCode::FAILURE)
}

/// Uses `given` or prompts on stdin.
fn read_password(given: Option<String>) -> io::Result<SecretString> {
    if let Some(password) = given {
        return Ok(SecretString::from(password));
    }
    write!(io::stderr().lock(), "Password: ")?;
    io::stderr().flush()?;
    let mut line = String::new();
    let _read = io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_owned()))
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to initialize storage: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    dispatch(&storage, cli.command)
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> hotel_compare::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: Storage>(storage: &S, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Search(args) => cmd_search(storage, &args),
        Command::More => cmd_more(storage),
        Command::Filters { action } => cmd_filters(storage, &action),
        Command::Select { code } => cmd_select(storage, &HotelCode::new(code)),
        Command::Remove { code } => cmd_remove(storage, &HotelCode::new(code)),
        Command::ClearSelection => cmd_clear_selection(storage),
        Command::Compare => cmd_compare(storage),
        Command::Destinations => cmd_destinations(),
        Command::Details { code } => cmd_details(storage, &HotelCode::new(code)),
        Command::Signup(args) => cmd_signup(storage, args),
        Command::Login(args) => cmd_login(storage, args),
        Command::Logout => cmd_logout(storage),
        Command::Whoami => cmd_whoami(storage),
        Command::Admin { action } => cmd_admin(storage, action),
    }
}

// ── Guards and clients ───────────────────────────────────────────────

/// Returns `true` if a live user session exists; prints a hint otherwise.
fn require_user<S: Storage>(storage: &S) -> io::Result<bool> {
    let route = resolve(Route::Hotels, storage, &StaticAdminPolicy, Utc::now());
    if route == Route::Hotels {
        return Ok(true);
    }
    writeln!(
        io::stderr().lock(),
        "{} not signed in\n  {} run `hotels login <email>` first",
        "error:".red().bold(),
        "hint:".cyan()
    )?;
    Ok(false)
}

/// Returns `true` if an authorized admin session exists; prints a hint
/// otherwise.
fn require_admin<S: Storage>(storage: &S) -> io::Result<bool> {
    let route = resolve(Route::AdminDashboard, storage, &StaticAdminPolicy, Utc::now());
    if route == Route::AdminDashboard {
        return Ok(true);
    }
    writeln!(
        io::stderr().lock(),
        "{} admin access required\n  {} run `hotels admin login <email>` first",
        "error:".red().bold(),
        "hint:".cyan()
    )?;
    Ok(false)
}

/// Builds the provider client from the environment.
fn hotel_client() -> io::Result<Option<HotelApiBlockingClient>> {
    let Some(client_id) = require_env(CLIENT_ID_ENV)? else {
        return Ok(None);
    };
    let Some(client_secret) = require_env(CLIENT_SECRET_ENV)? else {
        return Ok(None);
    };
    let mut builder = HotelApiBlockingClient::builder().credentials(client_id, client_secret);
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        builder = builder.base_url(base_url);
    }
    match builder.build() {
        Ok(client) => Ok(Some(client)),
        Err(err) => {
            let _code = fail("failed to build hotel client", &err)?;
            Ok(None)
        }
    }
}

/// Builds the end-user auth client from the environment.
fn auth_client() -> io::Result<Option<AuthBlockingClient>> {
    let Some(url) = require_env(AUTH_URL_ENV)? else {
        return Ok(None);
    };
    let Some(anon_key) = require_env(AUTH_ANON_KEY_ENV)? else {
        return Ok(None);
    };
    match AuthBlockingClient::builder().base_url(url).anon_key(anon_key).build() {
        Ok(client) => Ok(Some(client)),
        Err(err) => {
            let _code = fail("failed to build auth client", &err)?;
            Ok(None)
        }
    }
}

/// Builds the admin auth client from the environment.
fn admin_client() -> io::Result<Option<AuthAdminBlockingClient>> {
    let Some(url) = require_env(AUTH_URL_ENV)? else {
        return Ok(None);
    };
    let Some(service_key) = require_env(AUTH_SERVICE_ROLE_KEY_ENV)? else {
        return Ok(None);
    };
    match AuthBlockingClient::builder()
        .base_url(url)
        .service_role_key(service_key)
        .build_admin()
    {
        Ok(client) => Ok(Some(client)),
        Err(err) => {
            let _code = fail("failed to build admin client", &err)?;
            Ok(None)
        }
    }
}

// ── Hotel commands ───────────────────────────────────────────────────

/// Executes the `search` subcommand.
fn cmd_search<S: Storage>(storage: &S, args: &SearchArgs) -> io::Result<ExitCode> {
    if !require_user(storage)? {
        return Ok(ExitCode::FAILURE);
    }
    let mut filters = FilterStore::load(storage);
    if let Err(err) = filters.update(args.to_update()) {
        return fail("failed to save filters", &err);
    }
    let Some(client) = hotel_client()? else {
        return Ok(ExitCode::FAILURE);
    };
    let search = match HotelSearchBlocking::builder()
        .client(client)
        .resolver(CityResolver::new())
        .build()
    {
        Ok(search) => search,
        Err(err) => return fail("failed to build search", &err),
    };

    let spinner = make_spinner("Searching hotels...");
    let outcome = search.search(filters.filters());
    spinner.finish_and_clear();

    let mut session = SearchSession::load(storage);
    if let Err(err) = session.apply(outcome) {
        return fail("failed to save results", &err);
    }
    print_session(storage, &session)
}

/// Executes the `more` subcommand.
fn cmd_more<S: Storage>(storage: &S) -> io::Result<ExitCode> {
    if !require_user(storage)? {
        return Ok(ExitCode::FAILURE);
    }
    let mut session = SearchSession::load(storage);
    match session.load_more() {
        Ok(true) => print_session(storage, &session),
        Ok(false) => {
            writeln!(io::stdout().lock(), "All hotels are already shown.")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to save results", &err),
    }
}

/// Executes the `filters` subcommand.
fn cmd_filters<S: Storage>(storage: &S, action: &FilterAction) -> io::Result<ExitCode> {
    let mut store = FilterStore::load(storage);
    if matches!(action, FilterAction::Reset) {
        if let Err(err) = store.reset() {
            return fail("failed to reset filters", &err);
        }
    }
    print_filters(store.filters())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `select` subcommand: toggles a hotel from the last search.
fn cmd_select<S: Storage>(storage: &S, code: &HotelCode) -> io::Result<ExitCode> {
    if !require_user(storage)? {
        return Ok(ExitCode::FAILURE);
    }
    let session = SearchSession::load(storage);
    let Some(hotel) = session.hotels().iter().find(|h| &h.code == code) else {
        return fail_with(&format!("hotel {code} is not in the last search results"));
    };
    let mut selection = SelectionStore::load(storage);
    match selection.toggle(hotel.clone()) {
        Ok(selected) => {
            let verb = if selected { "Selected" } else { "Deselected" };
            writeln!(
                io::stdout().lock(),
                "{} {} ({} selected)",
                verb.green().bold(),
                hotel.name,
                selection.len()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to save selection", &err),
    }
}

/// Executes the `remove` subcommand.
fn cmd_remove<S: Storage>(storage: &S, code: &HotelCode) -> io::Result<ExitCode> {
    let mut selection = SelectionStore::load(storage);
    match selection.remove(code) {
        Ok(true) => {
            writeln!(io::stdout().lock(), "{} {code}", "Removed".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => {
            writeln!(io::stdout().lock(), "{code} was not selected")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to save selection", &err),
    }
}

/// Executes the `clear-selection` subcommand.
fn cmd_clear_selection<S: Storage>(storage: &S) -> io::Result<ExitCode> {
    let mut selection = SelectionStore::load(storage);
    match selection.clear() {
        Ok(()) => {
            writeln!(io::stdout().lock(), "Selection cleared.")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to save selection", &err),
    }
}

/// Executes the `compare` subcommand.
fn cmd_compare<S: Storage>(storage: &S) -> io::Result<ExitCode> {
    if !require_user(storage)? {
        return Ok(ExitCode::FAILURE);
    }
    let selection = SelectionStore::load(storage);
    let view = ComparisonView::from_hotels(selection.hotels());
    print_comparison(&view)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `destinations` subcommand.
fn cmd_destinations() -> io::Result<ExitCode> {
    let resolver = CityResolver::new();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Destination").fg(Color::Cyan),
        Cell::new("City code").fg(Color::Cyan),
    ]);
    for destination in resolver.destinations() {
        _ = table.add_row(vec![
            Cell::new(&destination.name),
            Cell::new(destination.code.as_inner()),
        ]);
    }
    writeln!(io::stdout().lock(), "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `details` subcommand: fetches the current offer for one
/// hotel, using the dates of the last search when there is one.
fn cmd_details<S: Storage>(storage: &S, code: &HotelCode) -> io::Result<ExitCode> {
    if !require_user(storage)? {
        return Ok(ExitCode::FAILURE);
    }
    let stay = SearchSession::load(storage).stay().map_or_else(
        || StayDates::default_for(local_today()),
        |(check_in, check_out)| StayDates {
            check_in,
            check_out,
        },
    );
    let Some(client) = hotel_client()? else {
        return Ok(ExitCode::FAILURE);
    };

    let spinner = make_spinner("Fetching hotel offer...");
    let outcome = client.hotel_details(code, stay);
    spinner.finish_and_clear();

    match outcome {
        Ok(Some(record)) => {
            let city_code = record
                .hotel
                .city_code
                .clone()
                .unwrap_or_else(|| CityCode::from(""));
            let ctx = SearchContext {
                destination: "",
                city_code: &city_code,
            };
            print_hotel_details(&normalize(record, ctx))?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            writeln!(
                io::stdout().lock(),
                "No offers for {code} between {} and {}.",
                stay.check_in,
                stay.check_out
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to fetch hotel details", &err),
    }
}

// ── Account commands ─────────────────────────────────────────────────

/// Executes the `signup` subcommand.
fn cmd_signup<S: Storage>(storage: &S, args: CredentialArgs) -> io::Result<ExitCode> {
    let Some(client) = auth_client()? else {
        return Ok(ExitCode::FAILURE);
    };
    let password = read_password(args.password)?;
    let spinner = make_spinner("Creating account...");
    let outcome = client.sign_up(&args.email, &password);
    spinner.finish_and_clear();

    match outcome {
        Ok(SignUpResponse::Session(session)) => {
            if let Err(err) = store_session(storage, &session) {
                return fail("failed to save session", &err);
            }
            writeln!(
                io::stdout().lock(),
                "{} signed in as {}",
                "Account created:".green().bold(),
                args.email
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(SignUpResponse::Pending(_)) => {
            writeln!(
                io::stdout().lock(),
                "{} check {} for a confirmation link, then run `hotels login`",
                "Account created:".green().bold(),
                args.email
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("sign-up failed", &err),
    }
}

/// Executes the `login` subcommand.
fn cmd_login<S: Storage>(storage: &S, args: CredentialArgs) -> io::Result<ExitCode> {
    let Some(client) = auth_client()? else {
        return Ok(ExitCode::FAILURE);
    };
    let password = read_password(args.password)?;
    let spinner = make_spinner("Signing in...");
    let outcome = client.sign_in(&args.email, &password);
    spinner.finish_and_clear();

    match outcome {
        Ok(session) => {
            if let Err(err) = store_session(storage, &session) {
                return fail("failed to save session", &err);
            }
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Signed in as".green().bold(),
                session.user.email.as_deref().unwrap_or(&args.email)
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("sign-in failed", &err),
    }
}

/// Executes the `logout` subcommand.
///
/// The local session is dropped even when the provider call fails.
fn cmd_logout<S: Storage>(storage: &S) -> io::Result<ExitCode> {
    let Some(session) = stored_session(storage) else {
        writeln!(io::stdout().lock(), "Not signed in.")?;
        return Ok(ExitCode::SUCCESS);
    };
    if let Some(client) = auth_client()? {
        if let Err(err) = client.sign_out(&session) {
            tracing::warn!(error = %err, "provider sign-out failed");
        }
    }
    if let Err(err) = forget_session(storage) {
        return fail("failed to clear session", &err);
    }
    writeln!(io::stdout().lock(), "Signed out.")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `whoami` subcommand.
fn cmd_whoami<S: Storage>(storage: &S) -> io::Result<ExitCode> {
    let session = match stored_session(storage) {
        Some(session) if session.is_live_at(Utc::now()) => session,
        Some(_) | None => {
            writeln!(io::stdout().lock(), "Not signed in.")?;
            return Ok(ExitCode::SUCCESS);
        }
    };
    let Some(client) = auth_client()? else {
        return Ok(ExitCode::FAILURE);
    };
    match client.current_user(&session) {
        Ok(user) => {
            print_users_table(&[&user])?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to fetch current user", &err),
    }
}

// ── Admin commands ───────────────────────────────────────────────────

/// Dispatches admin subcommands.
fn cmd_admin<S: Storage>(storage: &S, action: AdminCommand) -> io::Result<ExitCode> {
    match action {
        AdminCommand::Login(args) => cmd_admin_login(storage, args),
        AdminCommand::Logout => cmd_admin_logout(storage),
        AdminCommand::Users { search } => cmd_admin_users(storage, search.as_deref()),
        AdminCommand::Delete { id, yes } => cmd_admin_delete(storage, &UserId::new(id), yes),
    }
}

/// Executes `admin login`.
fn cmd_admin_login<S: Storage>(storage: &S, args: CredentialArgs) -> io::Result<ExitCode> {
    let password = read_password(args.password)?;
    let gate = AdminGate::new(storage, StaticAdminPolicy);
    match gate.login(&args.email, &password, Utc::now()) {
        Ok(session) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Admin signed in:".green().bold(),
                session.email
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("admin sign-in failed", &err),
    }
}

/// Executes `admin logout`.
fn cmd_admin_logout<S: Storage>(storage: &S) -> io::Result<ExitCode> {
    match AdminGate::new(storage, StaticAdminPolicy).logout() {
        Ok(()) => {
            writeln!(io::stdout().lock(), "Admin signed out.")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to clear admin session", &err),
    }
}

/// Executes `admin users`.
fn cmd_admin_users<S: Storage>(storage: &S, search: Option<&str>) -> io::Result<ExitCode> {
    if !require_admin(storage)? {
        return Ok(ExitCode::FAILURE);
    }
    let Some(client) = admin_client()? else {
        return Ok(ExitCode::FAILURE);
    };
    let spinner = make_spinner("Fetching users...");
    let outcome = client.list_users();
    spinner.finish_and_clear();

    match outcome {
        Ok(users) => {
            let directory = UserDirectory::new(users);
            print_users_table(&directory.search(search.unwrap_or_default()))?;
            let stats = directory.stats();
            writeln!(
                io::stdout().lock(),
                "Total: {}  Verified: {}  Pending: {}",
                stats.total.bold(),
                stats.verified.green(),
                stats.pending.yellow()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to list users", &err),
    }
}

/// Executes `admin delete`: arms a confirmation, then deletes once it is
/// confirmed inside the window.
fn cmd_admin_delete<S: Storage>(storage: &S, id: &UserId, yes: bool) -> io::Result<ExitCode> {
    if !require_admin(storage)? {
        return Ok(ExitCode::FAILURE);
    }
    let mut confirmation = DeleteConfirmation::new();
    let _armed = confirmation.request(id, Utc::now());
    if !yes {
        write!(
            io::stderr().lock(),
            "Delete user {id}? Type y within 3 seconds to confirm: "
        )?;
        io::stderr().flush()?;
        let mut answer = String::new();
        let _read = io::stdin().lock().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            writeln!(io::stdout().lock(), "Cancelled.")?;
            return Ok(ExitCode::SUCCESS);
        }
    }
    if let DeleteStep::Armed(_) = confirmation.request(id, Utc::now()) {
        return fail_with("confirmation expired; run the command again");
    }

    let Some(client) = admin_client()? else {
        return Ok(ExitCode::FAILURE);
    };
    let spinner = make_spinner("Deleting user...");
    let outcome = client.delete_user(id);
    spinner.finish_and_clear();
    match outcome {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{} {id}", "Deleted".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to delete user", &err),
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Creates a spinner for long-running operations.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Prints the visible page of the last search, or its error banner.
fn print_session<S: Storage, T: Storage>(
    storage: &S,
    session: &SearchSession<T>,
) -> io::Result<ExitCode> {
    if let Some(message) = session.error() {
        return fail_with(message);
    }
    let selection = SelectionStore::load(storage);
    print_hotels_table(session.visible(), |hotel| selection.is_selected(&hotel.code))?;
    let mut out = io::stdout().lock();
    if let Some((check_in, check_out)) = session.stay() {
        writeln!(out, "Stay: {check_in} \u{2192} {check_out}")?;
    }
    writeln!(
        out,
        "Showing {} of {} hotels",
        session.visible().len(),
        session.total()
    )?;
    if session.has_more() {
        writeln!(out, "  {} run `hotels more` for the next page", "hint:".cyan())?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints hotels in a table, marking selected ones.
fn print_hotels_table<F: Fn(&Hotel) -> bool>(hotels: &[Hotel], is_selected: F) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if hotels.is_empty() {
        writeln!(out, "No hotels match your filters.")?;
        return Ok(());
    }
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("").fg(Color::Cyan),
        Cell::new("Code").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("City").fg(Color::Cyan),
        Cell::new("Price").fg(Color::Cyan),
        Cell::new("Board").fg(Color::Cyan),
    ]);
    for hotel in hotels {
        let mark = if is_selected(hotel) { "\u{2713}" } else { "" };
        let category = if hotel.has_stars() {
            hotel.stars()
        } else {
            hotel.category_name.clone()
        };
        _ = table.add_row(vec![
            Cell::new(mark).fg(Color::Green),
            Cell::new(hotel.code.as_inner()),
            Cell::new(&hotel.name),
            Cell::new(category),
            Cell::new(&hotel.city),
            Cell::new(format!("{} {}", hotel.min_rate, hotel.currency)),
            Cell::new(hotel.board_name()),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the saved filters.
fn print_filters(filters: &SearchFilters) -> io::Result<()> {
    let or_dash = |value: &str| {
        if value.is_empty() {
            "\u{2014}".to_owned()
        } else {
            value.to_owned()
        }
    };
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Filter").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    for (name, value) in [
        ("Destination", &filters.destination),
        ("Check-in", &filters.check_in),
        ("Check-out", &filters.check_out),
        ("Adults", &filters.adults),
        ("Children", &filters.children),
        ("Rooms", &filters.rooms),
        ("Min rating", &filters.rating),
        ("Min price", &filters.min_price),
        ("Max price", &filters.max_price),
    ] {
        _ = table.add_row(vec![Cell::new(name), Cell::new(or_dash(value))]);
    }
    writeln!(io::stdout().lock(), "{table}")
}

/// Prints comparison cards and, from two hotels up, the charts.
fn print_comparison(view: &ComparisonView) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if view.is_empty() {
        writeln!(out, "No hotels selected.")?;
        writeln!(out, "  {} run `hotels select <code>` after a search", "hint:".cyan())?;
        return Ok(());
    }
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Code").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("City").fg(Color::Cyan),
        Cell::new("Rating").fg(Color::Cyan),
        Cell::new("Price").fg(Color::Cyan),
        Cell::new("Board").fg(Color::Cyan),
        Cell::new("Amenities").fg(Color::Cyan),
    ]);
    for card in &view.cards {
        _ = table.add_row(vec![
            Cell::new(card.code.as_inner()),
            Cell::new(&card.name),
            Cell::new(&card.city),
            Cell::new(format!("{} {}", card.rating, card.stars)),
            Cell::new(format!("{} {}", card.price, card.currency)),
            Cell::new(&card.board_name),
            Cell::new(card.amenities.join(", ")),
        ]);
    }
    writeln!(out, "{table}")?;

    if !view.charts_available() {
        writeln!(out, "  {} select another hotel to see charts", "hint:".cyan())?;
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", "Price".bold())?;
    print_price_chart(&mut out, &view.price_series)?;
    writeln!(out)?;
    writeln!(out, "{}", "Ratings".bold())?;
    print_rating_chart(&mut out, &view.rating_histogram)
}

/// Prints one bar per hotel, scaled to the highest price.
fn print_price_chart<W: io::Write>(out: &mut W, series: &[PricePoint]) -> io::Result<()> {
    let max = series.iter().map(|point| point.price).fold(0.0_f64, f64::max);
    for point in series {
        let ratio = if max > 0.0_f64 { point.price / max } else { 0.0_f64 };
        writeln!(
            out,
            "  {:<23} {} {:.2}",
            point.label,
            "\u{2588}".repeat(bar_width(ratio)).cyan(),
            point.price
        )?;
    }
    Ok(())
}

/// Prints one bar per rating bucket, scaled to the largest bucket.
fn print_rating_chart<W: io::Write>(out: &mut W, histogram: &[RatingBucket]) -> io::Result<()> {
    let max = histogram.iter().map(|bucket| bucket.count).max().unwrap_or(0);
    for bucket in histogram {
        let ratio = u32::try_from(bucket.count)
            .ok()
            .zip(u32::try_from(max).ok())
            .filter(|&(_, top)| top > 0)
            .map_or(0.0_f64, |(count, top)| f64::from(count) / f64::from(top));
        writeln!(
            out,
            "  {:<10} {} {}",
            bucket.label,
            "\u{2588}".repeat(bar_width(ratio)).magenta(),
            bucket.count
        )?;
    }
    Ok(())
}

/// Number of bar cells for a `0.0..=1.0` ratio.
fn bar_width(ratio: f64) -> usize {
    let target = ratio.clamp(0.0_f64, 1.0_f64) * f64::from(BAR_WIDTH);
    (0..BAR_WIDTH)
        .take_while(|&step| f64::from(step) + 0.5_f64 < target)
        .count()
}

/// Prints one hotel's details.
fn print_hotel_details(hotel: &Hotel) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", hotel.name.green().bold())?;
    let category = if hotel.category_is_fallback {
        format!("{} (unrated)", hotel.category_name)
    } else {
        format!("{} {}", hotel.category_name, hotel.stars())
    };
    writeln!(out, "  {} {category}", "Category:".bold())?;
    if !hotel.address.is_empty() || !hotel.city.is_empty() {
        writeln!(out, "  {} {} {}", "Address:".bold(), hotel.address, hotel.city)?;
    }
    writeln!(
        out,
        "  {} {} {}",
        "Best rate:".bold(),
        hotel.min_rate,
        hotel.currency
    )?;
    for room in &hotel.rooms {
        writeln!(out, "  {} {} ({})", "Room:".bold(), room.name, room.code)?;
        for rate in &room.rates {
            writeln!(out, "    {} {} {}", rate.board_name, rate.net, hotel.currency)?;
        }
    }
    if !hotel.amenities.is_empty() {
        writeln!(out, "  {} {}", "Amenities:".bold(), hotel.amenities.join(", "))?;
    }
    if !hotel.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", hotel.description)?;
    }
    Ok(())
}

/// Prints users in a table.
fn print_users_table(users: &[&AuthUser]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if users.is_empty() {
        writeln!(out, "No users found.")?;
        return Ok(());
    }
    let format_time = |value: Option<chrono::DateTime<Utc>>| {
        value.map_or_else(
            || "\u{2014}".to_owned(),
            |time| time.format("%Y-%m-%d %H:%M").to_string(),
        )
    };
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Email").fg(Color::Cyan),
        Cell::new("Id").fg(Color::Cyan),
        Cell::new("Created").fg(Color::Cyan),
        Cell::new("Last sign-in").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
    ]);
    for user in users {
        let status = if user.is_verified() {
            Cell::new("\u{2713} Verified").fg(Color::Green)
        } else {
            Cell::new("Pending").fg(Color::Yellow)
        };
        _ = table.add_row(vec![
            Cell::new(user.email.as_deref().unwrap_or("\u{2014}")),
            Cell::new(user.id.as_inner()),
            Cell::new(format_time(user.created_at)),
            Cell::new(format_time(user.last_sign_in_at)),
            status,
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output; if stderr itself failed, nothing
            // we can do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hotel_compare::search::SearchResults;
    use hotel_compare::storage::{InMemoryStorage, USER_SESSION_KEY};

    /// Creates a test hotel.
    fn test_hotel(code: &str, rating: u32, min_rate: &str) -> Hotel {
        Hotel {
            code: HotelCode::from(code),
            name: format!("Hotel {code}"),
            city_code: Some(CityCode::from("PAR")),
            latitude: None,
            longitude: None,
            rating,
            category_name: format!("{rating} Stars"),
            category_is_fallback: false,
            address: "1 Rue de Test".to_owned(),
            city: "Paris".to_owned(),
            min_rate: min_rate.to_owned(),
            currency: "USD".to_owned(),
            rooms: Vec::new(),
            amenities: vec!["WIFI".to_owned()],
            description: String::new(),
        }
    }

    /// Storage with a signed-in user and a stored search.
    fn signed_in_storage(hotels: Vec<Hotel>) -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage
            .set(
                USER_SESSION_KEY,
                r#"{"access_token":"t","user":{"id":"u-1","email":"guest@example.com"}}"#,
            )
            .unwrap();
        let stay = StayDates::default_for(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let mut session = SearchSession::load(&storage);
        session.apply(Ok(SearchResults::new(hotels, stay))).unwrap();
        storage
    }

    #[test]
    fn parse_date_valid_and_invalid() {
        assert_eq!(
            parse_date("2025-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
        assert!(parse_date("15/01/2025").is_err());
    }

    #[test]
    fn search_args_become_text_update() {
        let args = SearchArgs {
            destination: Some("Paris".to_owned()),
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1),
            adults: Some(3),
            max_price: Some(250.0),
            ..SearchArgs::default()
        };
        let update = args.to_update();
        assert_eq!(update.destination.as_deref(), Some("Paris"));
        assert_eq!(update.check_in.as_deref(), Some("2025-06-01"));
        assert_eq!(update.adults.as_deref(), Some("3"));
        assert_eq!(update.max_price.as_deref(), Some("250"));
        assert!(update.rooms.is_none());
    }

    #[test]
    fn bar_width_scales() {
        assert_eq!(bar_width(0.0), 0);
        assert_eq!(bar_width(1.0), 30);
        assert_eq!(bar_width(0.5), 15);
        assert_eq!(bar_width(7.0), 30);
    }

    #[test]
    fn make_spinner_creates_spinner() {
        let spinner = make_spinner("Testing...");
        spinner.finish_and_clear();
    }

    #[test]
    fn cmd_destinations_lists_table() {
        assert_eq!(cmd_destinations().unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_filters_reset_restores_defaults() {
        let storage = InMemoryStorage::new();
        let mut store = FilterStore::load(&storage);
        store
            .update(FilterUpdate {
                destination: Some("Rome".to_owned()),
                ..FilterUpdate::default()
            })
            .unwrap();
        assert_eq!(
            cmd_filters(&storage, &FilterAction::Reset).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(FilterStore::load(&storage).filters(), &SearchFilters::default());
    }

    #[test]
    fn hotel_commands_need_sign_in() {
        let storage = InMemoryStorage::new();
        assert_eq!(cmd_more(&storage).unwrap(), ExitCode::FAILURE);
        assert_eq!(cmd_compare(&storage).unwrap(), ExitCode::FAILURE);
        assert_eq!(
            cmd_select(&storage, &HotelCode::from("A")).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn cmd_select_toggles_hotel_from_last_search() {
        let storage = signed_in_storage(vec![test_hotel("A", 4, "120"), test_hotel("B", 3, "80")]);
        assert_eq!(
            cmd_select(&storage, &HotelCode::from("B")).unwrap(),
            ExitCode::SUCCESS
        );
        assert!(SelectionStore::load(&storage).is_selected(&HotelCode::from("B")));
        assert_eq!(
            cmd_select(&storage, &HotelCode::from("B")).unwrap(),
            ExitCode::SUCCESS
        );
        assert!(SelectionStore::load(&storage).is_empty());
    }

    #[test]
    fn cmd_select_unknown_code_fails() {
        let storage = signed_in_storage(vec![test_hotel("A", 4, "120")]);
        assert_eq!(
            cmd_select(&storage, &HotelCode::from("Z")).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn cmd_remove_and_clear() {
        let storage = signed_in_storage(vec![test_hotel("A", 4, "120"), test_hotel("B", 5, "300")]);
        let _a = cmd_select(&storage, &HotelCode::from("A")).unwrap();
        let _b = cmd_select(&storage, &HotelCode::from("B")).unwrap();
        assert_eq!(
            cmd_remove(&storage, &HotelCode::from("A")).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(SelectionStore::load(&storage).len(), 1);
        assert_eq!(cmd_clear_selection(&storage).unwrap(), ExitCode::SUCCESS);
        assert!(SelectionStore::load(&storage).is_empty());
    }

    #[test]
    fn cmd_compare_with_charts() {
        let storage = signed_in_storage(vec![test_hotel("A", 4, "120"), test_hotel("B", 5, "300")]);
        let _a = cmd_select(&storage, &HotelCode::from("A")).unwrap();
        let _b = cmd_select(&storage, &HotelCode::from("B")).unwrap();
        assert_eq!(cmd_compare(&storage).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_more_pages_through_results() {
        let hotels: Vec<Hotel> = (0..8).map(|i| test_hotel(&format!("H{i}"), 3, "90")).collect();
        let storage = signed_in_storage(hotels);
        assert_eq!(cmd_more(&storage).unwrap(), ExitCode::SUCCESS);
        assert_eq!(SearchSession::load(&storage).visible().len(), 8);
        assert_eq!(cmd_more(&storage).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn admin_commands_need_admin_session() {
        let storage = InMemoryStorage::new();
        assert_eq!(cmd_admin_users(&storage, None).unwrap(), ExitCode::FAILURE);
        assert_eq!(
            cmd_admin_delete(&storage, &UserId::from("u-1"), true).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn admin_login_and_logout() {
        let storage = InMemoryStorage::new();
        let args = CredentialArgs {
            email: StaticAdminPolicy::EMAIL.to_owned(),
            password: Some("Hello@123".to_owned()),
        };
        assert_eq!(cmd_admin_login(&storage, args).unwrap(), ExitCode::SUCCESS);
        assert!(AdminGate::new(&storage, StaticAdminPolicy).current().is_some());
        assert_eq!(cmd_admin_logout(&storage).unwrap(), ExitCode::SUCCESS);
        assert!(AdminGate::new(&storage, StaticAdminPolicy).current().is_none());
    }

    #[test]
    fn admin_login_rejects_wrong_password() {
        let storage = InMemoryStorage::new();
        let args = CredentialArgs {
            email: StaticAdminPolicy::EMAIL.to_owned(),
            password: Some("nope".to_owned()),
        };
        assert_eq!(cmd_admin_login(&storage, args).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn whoami_and_logout_without_session() {
        let storage = InMemoryStorage::new();
        assert_eq!(cmd_whoami(&storage).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_logout(&storage).unwrap(), ExitCode::SUCCESS);
    }
}
