use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_client::api::{AuthApi, HttpClient};
use course_client::auth_form::{AuthForm, AuthMode, AuthOutcome};
use course_client::config::ClientConfig;
use course_client::form::{FormController, FormMode, FormOptions, SubmitOutcome};
use course_client::listing::{DeleteOutcome, ListController};
use course_client::models::{CourseField, CredentialField};
use course_client::session::Session;
use course_client::ui::{NotifyLevel, UiHost};

#[derive(Parser)]
#[command(name = "course-client", about = "Manage courses on a course REST backend")]
struct Cli {
    /// Overrides COURSE_API_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List courses, filtered and paginated
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        teacher: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one course
    Show { id: i64 },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        credit: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        teacher: String,
    },
    /// Edit a course; fields left out keep their current value
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        credit: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        teacher: Option<String>,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Log in and print the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

struct ConsoleUi {
    assume_yes: bool,
}

impl UiHost for ConsoleUi {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Success => println!("✓ {}", message),
            NotifyLevel::Error => eprintln!("✗ {}", message),
        }
    }

    fn navigate(&self, path: &str) {
        debug!("navigate to {}", path);
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_client=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = ClientConfig::new_from_env()?;
    if let Some(url) = cli.base_url {
        config = config.with_base_url(&url)?;
    }
    info!("using backend {}", config.base_url);

    let session = Session::new();
    let client = Arc::new(HttpClient::new(config.clone(), session.clone())?);
    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let ui = Arc::new(ConsoleUi { assume_yes });

    match cli.command {
        Command::List {
            search,
            teacher,
            page,
        } => {
            let list = ListController::new(client, ui, config.page_size);
            if !list.load().await {
                return Ok(false);
            }
            list.set_search(&search);
            list.set_teacher_filter(&teacher);
            list.go_to_page(page);
            let view = list.view();
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(true)
        }
        Command::Show { id } => {
            let form = FormController::new(client, ui, FormMode::Edit(id), FormOptions::default());
            if !form.open().await {
                return Ok(false);
            }
            let draft = form.draft();
            println!(
                "#{} {} | {} tín chỉ | {} | {}",
                id,
                draft.name,
                draft.credit.unwrap_or_default(),
                draft.category,
                draft.teacher
            );
            Ok(true)
        }
        Command::Add {
            name,
            credit,
            category,
            teacher,
        } => {
            let form = FormController::new(client, ui, FormMode::Create, FormOptions::from(&config));
            form.set_field(CourseField::Name, &name);
            form.set_field(CourseField::Credit, &credit);
            form.set_field(CourseField::Category, &category);
            form.set_field(CourseField::Teacher, &teacher);
            Ok(report_submit(form.submit().await))
        }
        Command::Edit {
            id,
            name,
            credit,
            category,
            teacher,
        } => {
            let form = FormController::new(client, ui, FormMode::Edit(id), FormOptions::from(&config));
            if !form.open().await {
                return Ok(false);
            }
            let changes = [
                (CourseField::Name, name),
                (CourseField::Credit, credit),
                (CourseField::Category, category),
                (CourseField::Teacher, teacher),
            ];
            for (field, value) in changes {
                if let Some(value) = value {
                    form.set_field(field, &value);
                }
            }
            Ok(report_submit(form.submit().await))
        }
        Command::Delete { id, .. } => {
            let list = ListController::new(client, ui, config.page_size);
            Ok(list.delete(id).await == DeleteOutcome::Deleted)
        }
        Command::Login { email, password } => {
            let outcome = auth_submit(client.clone(), ui, AuthMode::Login, &email, &password).await;
            if outcome != AuthOutcome::LoggedIn {
                return Ok(false);
            }
            if let Some(token) = client.session().token() {
                println!("{}", token);
            }
            Ok(true)
        }
        Command::Register { email, password } => {
            let outcome = auth_submit(client, ui, AuthMode::Register, &email, &password).await;
            Ok(outcome == AuthOutcome::Registered)
        }
    }
}

async fn auth_submit(
    auth: Arc<dyn AuthApi>,
    ui: Arc<dyn UiHost>,
    mode: AuthMode,
    email: &str,
    password: &str,
) -> AuthOutcome {
    let form = AuthForm::new(auth, ui, mode);
    form.set_field(CredentialField::Email, email);
    form.set_field(CredentialField::Password, password);
    let outcome = form.submit().await;
    if let AuthOutcome::Invalid(violations) = &outcome {
        for v in violations.iter() {
            eprintln!("{}: {}", v.field, v.message);
        }
    }
    outcome
}

fn report_submit(outcome: SubmitOutcome) -> bool {
    match outcome {
        SubmitOutcome::Saved(course) => {
            println!("#{} {}", course.id, course.name);
            true
        }
        SubmitOutcome::Invalid(violations) => {
            for v in violations.iter() {
                eprintln!("{}: {}", v.field, v.message);
            }
            false
        }
        SubmitOutcome::Busy | SubmitOutcome::Failed(_) | SubmitOutcome::Detached => false,
    }
}
