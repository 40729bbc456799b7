use anyhow::{bail, Error};
use avtoshkola::{
    endpoints::{self, Drivings, Exams, Timetables, Users},
    models::{
        Driving, DrivingDraft, DrivingStatus, DrivingType, Exam, ExamDraft, ExamStatus,
        ExamType, RegisterDraft, StudyStatus, Timetable, TimetableDraft, User, UserUpdate,
    },
    policies, ApiClient, AuthGate, Config, Id, Session, SessionStore,
};
use chrono::{DateTime, Utc};
use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};
use structopt::StructOpt;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting application with {:#?}", args);

    let store = match &args.config_dir {
        Some(dir) => SessionStore::open(dir),
        None => SessionStore::open_default(),
    };
    let session = Arc::new(Session::new(store));
    let client = ApiClient::new(Config::from_env(), session)?;

    let gate = if args.admins_only {
        AuthGate::with_policy(client.clone(), Box::new(policies::admin_only))
    } else {
        AuthGate::new(client.clone())
    };

    match args.command {
        Command::Login {
            identifier,
            password,
        } => {
            let user = gate.login(&identifier, &password).await?;
            println!("Вход выполнен: {}", user.username);
        }
        Command::Logout => {
            gate.logout();
            println!("Сессия завершена");
        }
        Command::Health => {
            if client.health_check().await {
                println!("Сервер доступен");
            } else {
                println!("Сервер недоступен");
            }
        }
        Command::Status => {
            gate.initialize().await;
            match gate.state() {
                state if state.is_authenticated() => {
                    if let Some(user) = client.session().user() {
                        println!("Вход выполнен: {}", user.username);
                    }
                }
                _ => println!("Вход не выполнен"),
            }
        }
        command => {
            // everything below needs a live session
            gate.initialize().await;
            if !gate.state().is_authenticated() {
                bail!("Вход не выполнен. Сначала выполните `login`.");
            }

            run(command, &gate, &client).await?;
        }
    }

    Ok(())
}

async fn run(command: Command, gate: &AuthGate, client: &ApiClient) -> Result<(), Error> {
    match command {
        Command::Login { .. }
        | Command::Logout
        | Command::Health
        | Command::Status => unreachable!("handled before initialization"),
        Command::Whoami => {
            let user = gate.refresh().await?;
            println!("{} <{}>", user.username, user.email.as_deref().unwrap_or("—"));
            if let Some(role) = &user.role {
                let role = role
                    .name
                    .as_deref()
                    .or_else(|| role.kind.as_deref())
                    .unwrap_or("—");
                println!("Роль: {}", role);
            }
        }
        Command::Users(command) => run_users(command, client).await?,
        Command::Drivings(command) => run_drivings(command, client).await?,
        Command::Exams(command) => run_exams(command, client).await?,
        Command::Timetables(command) => run_timetables(command, client).await?,
    }

    Ok(())
}

async fn run_users(command: UsersCommand, client: &ApiClient) -> Result<(), Error> {
    match command {
        UsersCommand::List => print_users(&endpoints::list::<Users>(client).await?),
        UsersCommand::Register {
            username,
            email,
            password,
            name,
            surname,
            phone,
            adress,
            study_status,
        } => {
            let draft = RegisterDraft {
                username,
                email,
                password,
                name,
                surname,
                phone,
                adress,
                study_status,
                blocked: false,
            };
            endpoints::register(client, &draft).await?;
            print_users(&endpoints::list::<Users>(client).await?);
        }
        UsersCommand::Block { id } => {
            endpoints::update::<Users>(client, id, &UserUpdate::blocked(true)).await?;
            print_users(&endpoints::list::<Users>(client).await?);
        }
        UsersCommand::Unblock { id } => {
            endpoints::update::<Users>(client, id, &UserUpdate::blocked(false)).await?;
            print_users(&endpoints::list::<Users>(client).await?);
        }
        UsersCommand::Delete { id, yes } => {
            if confirm_delete(yes)? {
                endpoints::delete::<Users>(client, id).await?;
                print_users(&endpoints::list::<Users>(client).await?);
            }
        }
    }

    Ok(())
}

async fn run_drivings(command: DrivingsCommand, client: &ApiClient) -> Result<(), Error> {
    match command {
        DrivingsCommand::List => {
            // the screen needs both lists; fetch them together and render
            // only when both arrive
            let (drivings, users) = tokio::try_join!(
                endpoints::list::<Drivings>(client),
                endpoints::list::<Users>(client),
            )?;
            print_drivings(&drivings, &users);
        }
        DrivingsCommand::Create {
            driving_type,
            start,
            end,
            status,
            student,
        } => {
            let draft = DrivingDraft {
                driving_type,
                start,
                end,
                driving_status: status,
                users_permissions_user: student,
            };
            endpoints::create::<Drivings>(client, &draft).await?;
            refetch_drivings(client).await?;
        }
        DrivingsCommand::Update {
            id,
            driving_type,
            start,
            end,
            status,
            student,
        } => {
            let draft = DrivingDraft {
                driving_type,
                start,
                end,
                driving_status: status,
                users_permissions_user: student,
            };
            endpoints::update::<Drivings>(client, id, &draft).await?;
            refetch_drivings(client).await?;
        }
        DrivingsCommand::Delete { id, yes } => {
            if confirm_delete(yes)? {
                endpoints::delete::<Drivings>(client, id).await?;
                refetch_drivings(client).await?;
            }
        }
    }

    Ok(())
}

async fn refetch_drivings(client: &ApiClient) -> Result<(), Error> {
    let (drivings, users) = tokio::try_join!(
        endpoints::list::<Drivings>(client),
        endpoints::list::<Users>(client),
    )?;
    print_drivings(&drivings, &users);
    Ok(())
}

async fn run_exams(command: ExamsCommand, client: &ApiClient) -> Result<(), Error> {
    match command {
        ExamsCommand::List => refetch_exams(client).await?,
        ExamsCommand::Create {
            exam_type,
            start,
            status,
            student,
        } => {
            let draft = ExamDraft {
                exam_type,
                start,
                exam_status: status,
                users_permissions_user: student,
            };
            endpoints::create::<Exams>(client, &draft).await?;
            refetch_exams(client).await?;
        }
        ExamsCommand::Update {
            id,
            exam_type,
            start,
            status,
            student,
        } => {
            let draft = ExamDraft {
                exam_type,
                start,
                exam_status: status,
                users_permissions_user: student,
            };
            endpoints::update::<Exams>(client, id, &draft).await?;
            refetch_exams(client).await?;
        }
        ExamsCommand::Delete { id, yes } => {
            if confirm_delete(yes)? {
                endpoints::delete::<Exams>(client, id).await?;
                refetch_exams(client).await?;
            }
        }
    }

    Ok(())
}

async fn refetch_exams(client: &ApiClient) -> Result<(), Error> {
    let (exams, users) = tokio::try_join!(
        endpoints::list::<Exams>(client),
        endpoints::list::<Users>(client),
    )?;
    print_exams(&exams, &users);
    Ok(())
}

async fn run_timetables(
    command: TimetablesCommand,
    client: &ApiClient,
) -> Result<(), Error> {
    match command {
        TimetablesCommand::List => {
            print_timetables(&endpoints::list::<Timetables>(client).await?);
        }
        TimetablesCommand::Create {
            title,
            description,
            start,
            end,
        } => {
            let draft = TimetableDraft {
                title: title.trim().to_string(),
                description: normalize_description(description),
                start,
                end,
            };
            endpoints::create::<Timetables>(client, &draft).await?;
            print_timetables(&endpoints::list::<Timetables>(client).await?);
        }
        TimetablesCommand::Update {
            id,
            title,
            description,
            start,
            end,
        } => {
            let draft = TimetableDraft {
                title: title.trim().to_string(),
                description: normalize_description(description),
                start,
                end,
            };
            endpoints::update::<Timetables>(client, id, &draft).await?;
            print_timetables(&endpoints::list::<Timetables>(client).await?);
        }
        TimetablesCommand::Delete { id, yes } => {
            if confirm_delete(yes)? {
                endpoints::delete::<Timetables>(client, id).await?;
                print_timetables(&endpoints::list::<Timetables>(client).await?);
            }
        }
    }

    Ok(())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn print_users(users: &[User]) {
    println!(
        "{:<6} {:<20} {:<28} {:<16} {}",
        "ID", "Имя", "Email", "Статус обучения", "Заблокирован"
    );
    for user in users {
        println!(
            "{:<6} {:<20} {:<28} {:<16} {}",
            user.id,
            user.display_name(),
            user.email,
            user.study_status.map(StudyStatus::as_str).unwrap_or("—"),
            if user.blocked.unwrap_or(false) { "да" } else { "нет" },
        );
    }
}

fn print_drivings(drivings: &[Driving], users: &[User]) {
    println!(
        "{:<6} {:<12} {:<20} {:<20} {:<12} {}",
        "ID", "Тип", "Начало", "Окончание", "Статус", "Ученик"
    );
    for driving in drivings {
        println!(
            "{:<6} {:<12} {:<20} {:<20} {:<12} {}",
            driving.id,
            driving.driving_type,
            format_time(Some(driving.start)),
            format_time(driving.end),
            driving.driving_status,
            student_name(driving.users_permissions_user.as_ref(), users),
        );
    }
}

fn print_exams(exams: &[Exam], users: &[User]) {
    println!(
        "{:<6} {:<14} {:<20} {:<12} {}",
        "ID", "Тип", "Начало", "Статус", "Ученик"
    );
    for exam in exams {
        println!(
            "{:<6} {:<14} {:<20} {:<12} {}",
            exam.id,
            exam.exam_type,
            format_time(Some(exam.start)),
            exam.exam_status,
            student_name(exam.users_permissions_user.as_ref(), users),
        );
    }
}

fn print_timetables(timetables: &[Timetable]) {
    println!(
        "{:<6} {:<28} {:<20} {:<20} {}",
        "ID", "Название", "Начало", "Окончание", "Описание"
    );
    for event in timetables {
        println!(
            "{:<6} {:<28} {:<20} {:<20} {}",
            event.id,
            event.title,
            format_time(Some(event.start)),
            format_time(Some(event.end)),
            event.description.as_deref().unwrap_or("—"),
        );
    }
}

/// Resolve the student column from the expanded relation, falling back to
/// the separately fetched users list.
fn student_name(student: Option<&User>, users: &[User]) -> String {
    match student {
        Some(student) => users
            .iter()
            .find(|user| user.id == student.id)
            .unwrap_or(student)
            .display_name(),
        None => String::from("—"),
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
        None => String::from("—"),
    }
}

fn confirm_delete(yes: bool) -> Result<bool, Error> {
    if yes {
        return Ok(true);
    }

    print!("Вы уверены, что хотите удалить эту запись? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();

    Ok(answer == "y" || answer == "yes" || answer == "д" || answer == "да")
}

#[derive(Debug, StructOpt)]
#[structopt(name = "avtoshkola-admin", about = "Administer the driving-school backend")]
struct Args {
    /// Keep the session under this directory instead of the default.
    #[structopt(long = "config-dir")]
    config_dir: Option<PathBuf>,
    /// Require an administrative role instead of any authenticated account.
    #[structopt(long = "admins-only")]
    admins_only: bool,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Log in and persist the session
    Login {
        identifier: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show who is currently logged in, refreshing from the backend
    Whoami,
    /// Validate the stored session and report its state
    Status,
    /// Probe whether the backend is reachable
    Health,
    /// Manage accounts
    Users(UsersCommand),
    /// Manage lesson bookings
    Drivings(DrivingsCommand),
    /// Manage exam bookings
    Exams(ExamsCommand),
    /// Manage timetable events
    Timetables(TimetablesCommand),
}

#[derive(Debug, StructOpt)]
enum UsersCommand {
    /// List every account
    List,
    /// Register a new account
    Register {
        #[structopt(long)]
        username: String,
        #[structopt(long)]
        email: String,
        #[structopt(long)]
        password: String,
        #[structopt(long)]
        name: Option<String>,
        #[structopt(long)]
        surname: Option<String>,
        #[structopt(long)]
        phone: Option<String>,
        #[structopt(long)]
        adress: Option<String>,
        #[structopt(long = "study-status")]
        study_status: Option<StudyStatus>,
    },
    /// Block an account
    Block { id: Id },
    /// Unblock an account
    Unblock { id: Id },
    /// Delete an account
    Delete {
        id: Id,
        /// Skip the confirmation prompt
        #[structopt(long)]
        yes: bool,
    },
}

#[derive(Debug, StructOpt)]
enum DrivingsCommand {
    /// List lesson bookings together with the students
    List,
    /// Book a lesson
    Create {
        #[structopt(long = "type")]
        driving_type: DrivingType,
        #[structopt(long)]
        start: DateTime<Utc>,
        #[structopt(long)]
        end: Option<DateTime<Utc>>,
        #[structopt(long, default_value = "В процессе")]
        status: DrivingStatus,
        /// Id of the booked student
        #[structopt(long)]
        student: Option<Id>,
    },
    /// Replace a booking
    Update {
        id: Id,
        #[structopt(long = "type")]
        driving_type: DrivingType,
        #[structopt(long)]
        start: DateTime<Utc>,
        #[structopt(long)]
        end: Option<DateTime<Utc>>,
        #[structopt(long, default_value = "В процессе")]
        status: DrivingStatus,
        #[structopt(long)]
        student: Option<Id>,
    },
    /// Delete a booking
    Delete {
        id: Id,
        #[structopt(long)]
        yes: bool,
    },
}

#[derive(Debug, StructOpt)]
enum ExamsCommand {
    /// List exam bookings together with the students
    List,
    /// Book an exam
    Create {
        #[structopt(long = "type")]
        exam_type: ExamType,
        #[structopt(long)]
        start: DateTime<Utc>,
        #[structopt(long, default_value = "В процессе")]
        status: ExamStatus,
        #[structopt(long)]
        student: Option<Id>,
    },
    /// Replace a booking
    Update {
        id: Id,
        #[structopt(long = "type")]
        exam_type: ExamType,
        #[structopt(long)]
        start: DateTime<Utc>,
        #[structopt(long, default_value = "В процессе")]
        status: ExamStatus,
        #[structopt(long)]
        student: Option<Id>,
    },
    /// Delete a booking
    Delete {
        id: Id,
        #[structopt(long)]
        yes: bool,
    },
}

#[derive(Debug, StructOpt)]
enum TimetablesCommand {
    /// List timetable events
    List,
    /// Create an event
    Create {
        #[structopt(long)]
        title: String,
        #[structopt(long)]
        description: Option<String>,
        #[structopt(long)]
        start: DateTime<Utc>,
        #[structopt(long)]
        end: DateTime<Utc>,
    },
    /// Replace an event
    Update {
        id: Id,
        #[structopt(long)]
        title: String,
        #[structopt(long)]
        description: Option<String>,
        #[structopt(long)]
        start: DateTime<Utc>,
        #[structopt(long)]
        end: DateTime<Utc>,
    },
    /// Delete an event
    Delete {
        id: Id,
        #[structopt(long)]
        yes: bool,
    },
}
