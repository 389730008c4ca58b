use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use hr_desk::auth::capabilities_for;
use hr_desk::db::SnapshotHealth;
use hr_desk::modules::Governed;
use hr_desk::{
    AppState, FeatureModule, StorageBackend, export, print_banner, seed, setup_environment,
};
use shared::models::{Credentials, Role, SignupRequest};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "hr-desk", version, about = "HR Desk command line")]
struct Cli {
    /// Data directory (file / redb backends)
    #[arg(long, env = "HR_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend: memory | file | redb
    #[arg(long, env = "HR_STORAGE", global = true)]
    storage: Option<StorageBackend>,

    /// Skip demo data on startup
    #[arg(long, global = true)]
    no_seed: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write demo accounts and records into empty collections
    Seed,
    /// Create an account (does not sign in)
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    /// Sign in under the given role
    Login {
        email: String,
        password: String,
        #[arg(long)]
        role: Role,
    },
    Logout,
    /// Show the signed-in identity and its capabilities
    Whoami,
    ResetPassword {
        email: String,
        new_password: String,
    },
    /// Print the records of a module visible to the current identity
    List { module: String },
    /// Write the visible records of a module to CSV
    Export {
        module: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Capability table, for one role or all of them
    Capabilities {
        #[arg(long)]
        role: Option<Role>,
    },
    /// Snapshot health of every collection
    Health,
}

/// Dispatch a generic function over the module named at runtime
macro_rules! with_module {
    ($state:expr, $name:expr, $f:ident $(, $arg:expr)*) => {{
        let modules = $state.modules();
        match $name {
            "tasks" => $f(&modules.tasks $(, $arg)*),
            "vendors" => $f(&modules.vendors $(, $arg)*),
            "freelancers" => $f(&modules.freelancers $(, $arg)*),
            "freelancer_contracts" => $f(&modules.freelancer_contracts $(, $arg)*),
            "payroll" => $f(&modules.payroll $(, $arg)*),
            "time_entries" => $f(&modules.time_entries $(, $arg)*),
            "daily_status" => $f(&modules.daily_status $(, $arg)*),
            "employees" => $f(&modules.employees $(, $arg)*),
            "leave_policies" => $f(&modules.leave_policies $(, $arg)*),
            "leave_requests" => $f(&modules.leave_requests $(, $arg)*),
            other => bail!(
                "unknown module '{other}', expected one of: {}",
                hr_desk::Modules::NAMES.join(", ")
            ),
        }
    }};
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = setup_environment();

    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }
    // seed 子命令自己决定何时写入
    if cli.no_seed || matches!(cli.command, Command::Seed) {
        config.seed_demo = false;
    }

    if config.is_development() && matches!(cli.command, Command::Health) {
        print_banner();
    }

    let state = AppState::initialize(config).context("failed to open HR Desk state")?;
    run(&state, cli.command)
}

fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    let session = state.session();
    match command {
        Command::Seed => {
            let report = seed::seed_demo(state)?;
            if report.is_empty() {
                println!("Nothing to seed, every collection already has data");
            } else {
                println!(
                    "Seeded {} account(s) and: {}",
                    report.identities,
                    report.collections.join(", ")
                );
                println!("Demo password: {}", seed::DEMO_PASSWORD);
            }
        }
        Command::Signup {
            name,
            email,
            password,
            role,
        } => {
            let info = session.signup(SignupRequest {
                name,
                email,
                password,
                role,
            })?;
            println!("Account created for {} ({})", info.email, info.role);
        }
        Command::Login {
            email,
            password,
            role,
        } => {
            let info = session.login(&Credentials::new(email, password), role)?;
            println!("Signed in as {} ({})", info.name, info.role);
        }
        Command::Logout => {
            session.logout()?;
            println!("Signed out");
        }
        Command::Whoami => match session.current() {
            Some(info) => {
                println!("{} <{}> ({})", info.name, info.email, info.role);
                for capability in capabilities_for(info.role) {
                    println!("  {capability}");
                }
            }
            None => println!("Not signed in"),
        },
        Command::ResetPassword {
            email,
            new_password,
        } => {
            session.reset_password(&email, &new_password)?;
            println!("Password updated for {email}");
        }
        Command::List { module } => {
            let json = with_module!(state, module.as_str(), list_json)?;
            println!("{json}");
        }
        Command::Export { module, out } => {
            let path = with_module!(state, module.as_str(), export_module, &out, &module)?;
            println!("Exported to {}", path.display());
        }
        Command::Capabilities { role } => {
            let roles = role.map(|r| vec![r]).unwrap_or_else(|| Role::ALL.to_vec());
            for role in roles {
                let names: Vec<String> = capabilities_for(role)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!("{role}: {}", names.join(", "));
            }
        }
        Command::Health => {
            println!("storage: {}", state.store().backend());
            println!("identities: {}", health_label(session.directory().health()));
            for (name, health) in state.modules().health() {
                println!("{name}: {}", health_label(health));
            }
        }
    }
    Ok(())
}

fn list_json<T: Governed>(module: &FeatureModule<T>) -> anyhow::Result<String> {
    let records = module.list()?;
    Ok(serde_json::to_string_pretty(&records)?)
}

fn export_module<T: Governed>(
    module: &FeatureModule<T>,
    out: &Path,
    name: &str,
) -> anyhow::Result<PathBuf> {
    let records = module.list()?;
    Ok(export::export_csv_file(&records, out, name)?)
}

fn health_label(health: SnapshotHealth) -> &'static str {
    match health {
        SnapshotHealth::Absent => "empty",
        SnapshotHealth::Healthy => "ok",
        SnapshotHealth::Corrupt => "corrupt (not overwritten)",
    }
}
