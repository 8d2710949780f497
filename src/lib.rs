pub mod app;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use app::api::types::Credentials;
use app::api::{ApiClient, ApiError};
use app::config::{AppConfig, ConfigError};
use app::favorites::debounce::SearchDebouncer;
use app::favorites::{
    ControllerError, FavoriteEntry, FavoriteFormValues, FavoriteKind, FavoritesController,
    FilterCriteria, Mutation, Viewport,
};
use app::notice::Notice;
use app::session::auth::{self, AuthState, SignupForm};
use app::session::{SessionError, SessionStore, SqliteSessionStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

pub use app::config::load_env_files;

const WINDOW_ROWS: u32 = 24;

const HELP: &str = "\
commands:
  signup <email> <password> [name]
  login <email> <password>
  logout
  list                      reload from the first page
  more                      scroll to the end of the list
  filter key=value ...      keys: search type year min max (empty value clears)
  search <text>             update the search filter
  clear                     drop all filters
  add key=value ...         keys: title type director budget location duration year poster
  edit <id> key=value ...   unspecified fields keep their current value
  delete <id>
  help
  quit";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("terminal io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Signup {
        email: String,
        password: String,
        name: Option<String>,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    List,
    More,
    Filter(Vec<(String, String)>),
    Search(String),
    Clear,
    Add(Vec<(String, String)>),
    Edit {
        id: i64,
        fields: Vec<(String, String)>,
    },
    Delete(i64),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDelete {
    id: i64,
    title: String,
}

pub struct Shell<S: SessionStore + ?Sized> {
    api: ApiClient,
    session: Arc<S>,
    controller: FavoritesController<S>,
    debouncer: SearchDebouncer,
    pending_delete: Option<PendingDelete>,
    authenticated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub text: String,
    pub quit: bool,
}

impl ShellOutput {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

impl<S: SessionStore + ?Sized> Shell<S> {
    pub fn new(config: &AppConfig, api: ApiClient, session: Arc<S>) -> Self {
        let controller = FavoritesController::new(
            api.clone(),
            session.clone(),
            config.page_size,
            config.scroll_threshold,
        );
        Self {
            api,
            session,
            controller,
            debouncer: SearchDebouncer::new(config.search_debounce),
            pending_delete: None,
            authenticated: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub async fn start(&mut self) -> Result<ShellOutput, SessionError> {
        match auth::check_session(&self.api, self.session.as_ref()).await? {
            AuthState::Authenticated(session) => {
                self.authenticated = true;
                let who = session
                    .user
                    .map(|user| user.name.unwrap_or(user.email))
                    .unwrap_or_else(|| "back".to_string());
                self.controller.fetch_page(0, true).await;
                Ok(ShellOutput::text(format!("Welcome {who}\n{}", self.render())))
            }
            AuthState::LoginRequired => {
                self.authenticated = false;
                Ok(ShellOutput::text(
                    "Please log in: login <email> <password> (or signup <email> <password> [name])",
                ))
            }
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> ShellOutput {
        if let Some(pending) = self.pending_delete.take() {
            return self.confirm_delete(pending, line).await;
        }

        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return ShellOutput::default(),
            Err(message) => return ShellOutput::text(message),
        };

        match command {
            Command::Help => ShellOutput::text(HELP),
            Command::Quit => ShellOutput {
                text: String::new(),
                quit: true,
            },
            Command::Signup {
                email,
                password,
                name,
            } => {
                let form = SignupForm {
                    name,
                    email,
                    password,
                };
                match auth::signup(&self.api, self.session.as_ref(), &form).await {
                    Ok(_) => self.enter("Account created").await,
                    Err(error) => ShellOutput::text(
                        Notice::error(error.user_message("Could not create account")).to_string(),
                    ),
                }
            }
            Command::Login { email, password } => {
                let credentials = Credentials { email, password };
                match auth::login(&self.api, self.session.as_ref(), &credentials).await {
                    Ok(_) => self.enter("Logged in").await,
                    Err(error) => ShellOutput::text(
                        Notice::error(error.user_message("Could not log in")).to_string(),
                    ),
                }
            }
            command if !self.authenticated => {
                tracing::debug!(?command, "command rejected without session");
                ShellOutput::text("Please log in first")
            }
            Command::Logout => match auth::logout(self.session.as_ref()).await {
                Ok(()) => {
                    self.authenticated = false;
                    self.debouncer.cancel();
                    self.controller.reset();
                    ShellOutput::text(Notice::success("Logged out successfully").to_string())
                }
                Err(error) => {
                    tracing::error!(error = %error, "failed to clear session");
                    ShellOutput::text(Notice::error("Could not log out").to_string())
                }
            },
            Command::List => {
                self.controller.fetch_page(0, true).await;
                self.with_notices(self.render())
            }
            Command::More => {
                let rows = self.controller.state().favorites().len() as u32;
                let viewport = Viewport::scrolled_to_end(rows + 2, WINDOW_ROWS);
                match self.controller.on_scroll(viewport).await {
                    Some(_) => self.with_notices(self.render()),
                    None => ShellOutput::text("No more favorites to load"),
                }
            }
            Command::Filter(pairs) => {
                let mut filters = self.controller.state().filters().clone();
                for (key, value) in &pairs {
                    if let Err(message) = apply_filter_field(&mut filters, key, value) {
                        return ShellOutput::text(message);
                    }
                }
                self.debouncer.cancel();
                self.controller.on_filter_change(filters).await;
                self.with_notices(self.render())
            }
            Command::Search(text) => match self.debouncer.push(text, Instant::now()) {
                Some(text) => self.apply_search(text).await,
                None => ShellOutput::default(),
            },
            Command::Clear => {
                self.debouncer.cancel();
                self.controller.on_filter_change(FilterCriteria::default()).await;
                self.with_notices(self.render())
            }
            Command::Add(pairs) => {
                let mut values = FavoriteFormValues::default();
                if let Err(message) = apply_form_fields(&mut values, &pairs) {
                    return ShellOutput::text(message);
                }
                self.mutate(Mutation::Create(values)).await
            }
            Command::Edit { id, fields } => {
                let Some(entry) = self.controller.state().find(id) else {
                    return ShellOutput::text(format!("No loaded favorite with id {id}"));
                };
                let mut values = FavoriteFormValues::from_entry(entry);
                if let Err(message) = apply_form_fields(&mut values, &fields) {
                    return ShellOutput::text(message);
                }
                self.mutate(Mutation::Update { id, values }).await
            }
            Command::Delete(id) => {
                let Some(entry) = self.controller.state().find(id) else {
                    return ShellOutput::text(format!("No loaded favorite with id {id}"));
                };
                let prompt = format!(
                    "Delete \"{}\"? This action cannot be undone. [y/N]",
                    entry.title
                );
                self.pending_delete = Some(PendingDelete {
                    id,
                    title: entry.title.clone(),
                });
                ShellOutput::text(prompt)
            }
        }
    }

    pub async fn flush_search(&mut self) -> Option<ShellOutput> {
        let text = self.debouncer.poll(Instant::now())?;
        Some(self.apply_search(text).await)
    }

    async fn apply_search(&mut self, text: String) -> ShellOutput {
        let mut filters = self.controller.state().filters().clone();
        filters.search = Some(text).filter(|text| !text.is_empty());
        self.controller.on_filter_change(filters).await;
        self.with_notices(self.render())
    }

    async fn enter(&mut self, greeting: &str) -> ShellOutput {
        self.authenticated = true;
        self.controller.fetch_page(0, true).await;
        let mut notices = vec![Notice::success(greeting)];
        notices.extend(self.controller.take_notices());
        ShellOutput::text(join_output(&notices, self.render()))
    }

    async fn mutate(&mut self, mutation: Mutation) -> ShellOutput {
        match self.controller.trigger_mutation(mutation).await {
            Ok(_) => self.with_notices(self.render()),
            Err(ControllerError::Validation(errors)) => {
                let notices = self.controller.take_notices();
                let fields = app::favorites::form::field_errors(&errors)
                    .into_iter()
                    .map(|error| format!("  {error}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                ShellOutput::text(join_output(&notices, fields))
            }
            Err(_) => self.with_notices(String::new()),
        }
    }

    async fn confirm_delete(&mut self, pending: PendingDelete, answer: &str) -> ShellOutput {
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            return ShellOutput::text(format!("Kept \"{}\"", pending.title));
        }
        self.mutate(Mutation::Delete(pending.id)).await
    }

    fn with_notices(&mut self, body: String) -> ShellOutput {
        let notices = self.controller.take_notices();
        ShellOutput::text(join_output(&notices, body))
    }

    fn render(&self) -> String {
        let state = self.controller.state();
        let mut table = render_table(state.favorites());
        if state.has_more() && !state.favorites().is_empty() {
            table.push_str("\n(more available: type `more`)");
        }
        table
    }
}

fn join_output(notices: &[Notice], body: String) -> String {
    let mut lines: Vec<String> = notices.iter().map(ToString::to_string).collect();
    if !body.is_empty() {
        lines.push(body);
    }
    lines.join("\n")
}

pub fn render_table(favorites: &[FavoriteEntry]) -> String {
    if favorites.is_empty() {
        return "No favorites yet\nAdd your first movie or TV show to get started!".to_string();
    }

    let header = [
        "ID", "Title", "Type", "Director", "Year", "Budget", "Location", "Duration", "Poster",
    ];
    let rows: Vec<[String; 9]> = favorites
        .iter()
        .map(|entry| {
            [
                entry.id.to_string(),
                entry.title.clone(),
                entry.kind.to_string(),
                entry.director.clone(),
                entry.year.clone(),
                entry.budget.clone(),
                entry.location.clone(),
                entry.duration.clone(),
                if entry.poster_url.as_deref().is_some_and(|url| !url.is_empty()) {
                    "yes".to_string()
                } else {
                    "-".to_string()
                },
            ]
        })
        .collect();

    let mut widths = header.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header = header.map(ToString::to_string);
    let mut lines = vec![format_row(header.as_slice())];
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines.join("\n")
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "signup" => match args {
            [email, password] => Command::Signup {
                email: email.clone(),
                password: password.clone(),
                name: None,
            },
            [email, password, name @ ..] if !name.is_empty() => Command::Signup {
                email: email.clone(),
                password: password.clone(),
                name: Some(name.join(" ")),
            },
            _ => return Err("usage: signup <email> <password> [name]".to_string()),
        },
        "login" => match args {
            [email, password] => Command::Login {
                email: email.clone(),
                password: password.clone(),
            },
            _ => return Err("usage: login <email> <password>".to_string()),
        },
        "logout" => Command::Logout,
        "list" | "reload" => Command::List,
        "more" => Command::More,
        "filter" => Command::Filter(parse_pairs(args)?),
        "search" => Command::Search(args.join(" ")),
        "clear" => Command::Clear,
        "add" => Command::Add(parse_pairs(args)?),
        "edit" => {
            let (id, rest) = args
                .split_first()
                .ok_or_else(|| "usage: edit <id> key=value ...".to_string())?;
            Command::Edit {
                id: parse_id(id)?,
                fields: parse_pairs(rest)?,
            }
        }
        "delete" => match args {
            [id] => Command::Delete(parse_id(id)?),
            _ => return Err("usage: delete <id>".to_string()),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> Result<i64, String> {
    raw.parse().map_err(|_| format!("invalid favorite id: {raw}"))
}

fn parse_pairs(args: &[String]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(key, value)| (key.trim().to_lowercase(), value.to_string()))
                .ok_or_else(|| format!("expected key=value, got: {arg}"))
        })
        .collect()
}

/// Splits on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn apply_filter_field(filters: &mut FilterCriteria, key: &str, value: &str) -> Result<(), String> {
    let text = || Some(value.to_string()).filter(|value| !value.trim().is_empty());
    let value = value.trim();
    match key {
        "search" => filters.search = text(),
        "year" => filters.year = text(),
        "min" | "budgetmin" => filters.budget_min = text(),
        "max" | "budgetmax" => filters.budget_max = text(),
        "type" => {
            filters.kind = if value.is_empty() || value.eq_ignore_ascii_case("all") {
                None
            } else {
                Some(value.parse::<FavoriteKind>().map_err(|error| error.to_string())?)
            };
        }
        other => return Err(format!("unknown filter: {other}")),
    }
    Ok(())
}

fn apply_form_fields(
    values: &mut FavoriteFormValues,
    pairs: &[(String, String)],
) -> Result<(), String> {
    for (key, value) in pairs {
        let value = value.trim().to_string();
        match key.as_str() {
            "title" => values.title = value,
            "type" => {
                values.kind = value
                    .parse::<FavoriteKind>()
                    .map_err(|error| error.to_string())?
            }
            "director" => values.director = value,
            "budget" => values.budget = value,
            "location" => values.location = value,
            "duration" => values.duration = value,
            "year" => values.year = value,
            "poster" | "posterurl" => values.poster_url = value,
            other => return Err(format!("unknown field: {other}")),
        }
    }
    Ok(())
}

pub async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let session = Arc::new(SqliteSessionStore::connect(&config.database_url).await?);
    let api = ApiClient::new(&config.api_url, config.request_timeout)?;
    tracing::info!(api_url = %api.base_url(), page_size = config.page_size, "starting favorites shell");

    let mut shell = Shell::new(&config, api, session);
    print_output(&shell.start().await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = shell.search_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let output = shell.handle_line(&line).await;
                print_output(&output);
                if output.quit {
                    break;
                }
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(output) = shell.flush_search().await {
                    print_output(&output);
                }
            }
        }
    }

    tracing::info!("favorites shell stopped");
    Ok(())
}

fn print_output(output: &ShellOutput) {
    if !output.text.is_empty() {
        println!("{}", output.text);
    }
}
