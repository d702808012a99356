use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use brain_repository::{
    BrainCreatePayload, BrainProjection, BrainRepository, BrainStatus, BrainType,
    BrainUpdatableProperties, DeleteOutcome,
};
use postgrest_client::{PostgrestClient, PostgrestConfig, QueryExecutor};

#[derive(Debug, Parser)]
#[command(name = "brain-admin")]
#[command(about = "Inspect and maintain brains in the backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List public brains with subscriber counts
    ListPublic,

    /// Show one brain
    Get {
        brain_id: Uuid,

        /// Select `id` alongside all columns
        #[arg(long)]
        aliased: bool,
    },

    /// Create a brain
    Create(CreateArgs),

    /// Update the given fields of a brain
    Update(UpdateArgs),

    /// Set a brain's last update time to now
    Touch { brain_id: Uuid },

    /// Delete a brain
    Delete { brain_id: Uuid },

    /// Delete a secret a user stored for a brain
    DeleteSecret {
        #[arg(long)]
        user: Uuid,

        #[arg(long)]
        brain: Uuid,

        /// Secret name as declared by the brain definition
        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Public,
    Private,
}

impl From<StatusArg> for BrainStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Public => BrainStatus::Public,
            StatusArg::Private => BrainStatus::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeArg {
    Doc,
    Api,
    Composite,
}

impl From<TypeArg> for BrainType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Doc => BrainType::Doc,
            TypeArg::Api => BrainType::Api,
            TypeArg::Composite => BrainType::Composite,
        }
    }
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, value_enum, default_value = "private")]
    status: StatusArg,

    #[arg(long = "brain-type", value_enum, default_value = "doc")]
    brain_type: TypeArg,

    #[arg(long)]
    model: Option<String>,
}

impl CreateArgs {
    fn into_payload(self) -> BrainCreatePayload {
        BrainCreatePayload {
            name: self.name,
            description: self.description,
            status: self.status.into(),
            brain_type: self.brain_type.into(),
            model: self.model,
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
struct UpdateArgs {
    brain_id: Uuid,

    #[arg(long)]
    name: Option<String>,

    #[arg(long, conflicts_with = "clear_description")]
    description: Option<String>,

    /// Set the description to null
    #[arg(long)]
    clear_description: bool,

    #[arg(long, value_enum)]
    status: Option<StatusArg>,
}

impl UpdateArgs {
    fn to_properties(&self) -> BrainUpdatableProperties {
        let description = if self.clear_description {
            Some(None)
        } else {
            self.description.clone().map(Some)
        };

        BrainUpdatableProperties {
            name: self.name.clone(),
            description,
            status: self.status.map(BrainStatus::from),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct DeleteReport {
    brain_id: Uuid,
    deleted: bool,
    rows_affected: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run<E: QueryExecutor>(
    command: Command,
    brains: &BrainRepository<E>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::ListPublic => {
            let public = brains.list_public().await?;
            info!("{} public brains", public.len());
            print_json(&public)?;
        }
        Command::Get { brain_id, aliased } => {
            let projection = if aliased {
                BrainProjection::Aliased
            } else {
                BrainProjection::AllColumns
            };
            match brains.get(&brain_id, projection).await? {
                Some(brain) => print_json(&brain)?,
                None => return Err(format!("brain not found: {}", brain_id).into()),
            }
        }
        Command::Create(args) => {
            let brain = brains.create(&args.into_payload()).await?;
            info!("Created brain {}", brain.brain_id);
            print_json(&brain)?;
        }
        Command::Update(args) => {
            let properties = args.to_properties();
            if properties.is_empty() {
                return Err("nothing to update".into());
            }
            match brains.update_by_id(&args.brain_id, &properties).await? {
                Some(brain) => print_json(&brain)?,
                None => return Err(format!("brain not found: {}", args.brain_id).into()),
            }
        }
        Command::Touch { brain_id } => {
            brains.touch_last_update(&brain_id).await?;
            info!("Touched brain {}", brain_id);
        }
        Command::Delete { brain_id } => {
            let outcome = brains.delete(&brain_id).await?;
            print_json(&DeleteReport {
                brain_id,
                deleted: outcome.is_deleted(),
                rows_affected: outcome.rows_affected(),
            })?;
            if outcome == DeleteOutcome::NotFound {
                return Err(format!("brain not found: {}", brain_id).into());
            }
        }
        Command::DeleteSecret { user, brain, name } => {
            let deleted = brains.delete_secret(&user, &brain, &name).await?;
            print_json(&serde_json::json!({ "deleted": deleted }))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = PostgrestClient::new(PostgrestConfig::from_env()?)?;
    info!("Using backend at {}", client.config().url);
    let brains = BrainRepository::new(client);

    run(cli.command, &brains).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args.iter().copied()).unwrap().command
    }

    #[test]
    fn test_create_defaults() {
        let Command::Create(args) = parse(&["brain-admin", "create", "--name", "Recipes"]) else {
            panic!("expected create");
        };
        let payload = args.into_payload();
        assert_eq!(payload.name, "Recipes");
        assert_eq!(payload.status, BrainStatus::Private);
        assert_eq!(payload.brain_type, BrainType::Doc);
    }

    #[test]
    fn test_update_sets_only_given_fields() {
        let id = Uuid::new_v4().to_string();
        let Command::Update(args) = parse(&["brain-admin", "update", id.as_str(), "--status", "public"])
        else {
            panic!("expected update");
        };
        let props = args.to_properties();
        assert_eq!(props.status, Some(BrainStatus::Public));
        assert_eq!(props.name, None);
        assert_eq!(props.description, None);
    }

    #[test]
    fn test_update_clear_description() {
        let id = Uuid::new_v4().to_string();
        let Command::Update(args) = parse(&["brain-admin", "update", id.as_str(), "--clear-description"])
        else {
            panic!("expected update");
        };
        assert_eq!(args.to_properties().description, Some(None));
    }

    #[test]
    fn test_update_rejects_conflicting_description_flags() {
        let id = Uuid::new_v4().to_string();
        let result = Cli::try_parse_from([
            "brain-admin",
            "update",
            id.as_str(),
            "--description",
            "x",
            "--clear-description",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_brain_id() {
        assert!(Cli::try_parse_from(["brain-admin", "touch", "not-a-uuid"]).is_err());
    }
}
