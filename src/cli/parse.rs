//! CLI parse: clap types for nimbus. No behavior; definitions only.

use crate::globalflags::GlobalArgs;
use clap::{Args, Parser, Subcommand};

/// Nimbus CLI - manage Nimbus Cloud resources from the command line
#[derive(Parser)]
#[command(name = "nimbus")]
#[command(version)]
#[command(about = "Manage Nimbus Cloud resources from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute volumes
    Volume(VolumeCommand),

    /// Managed database instances
    Database(DatabaseCommand),

    /// Data-ingestion pipelines
    Intake(IntakeCommand),

    /// Early-access commands
    Beta(BetaCommand),

    /// CLI configuration
    Config(ConfigCommand),

    /// Authentication
    Auth(AuthCommand),
}

// ============ Volume ============

#[derive(Args)]
pub struct VolumeCommand {
    #[command(subcommand)]
    pub action: VolumeAction,
}

#[derive(Subcommand)]
pub enum VolumeAction {
    /// Creates a volume
    #[command(after_help = "Examples:
  nimbus volume create --availability-zone eu01-1 --size 64
  nimbus volume create --availability-zone eu01-1 --size 64 --labels key=value,foo=bar
  nimbus volume create --availability-zone eu01-1 --name volume-1 --source-id xxx --source-type image")]
    Create(VolumeCreateArgs),

    /// Lists all volumes of a project
    #[command(after_help = "Examples:
  nimbus volume list
  nimbus volume list --limit 10
  nimbus volume list --output-format json")]
    List(VolumeListArgs),

    /// Shows details of a volume
    #[command(after_help = "Examples:
  nimbus volume describe xxx
  nimbus volume describe xxx --output-format yaml")]
    Describe(VolumeDescribeArgs),

    /// Updates a volume
    #[command(after_help = "Examples:
  nimbus volume update xxx --name volume-2
  nimbus volume update xxx --labels key=value")]
    Update(VolumeUpdateArgs),

    /// Deletes a volume
    #[command(after_help = "Examples:
  nimbus volume delete xxx
  nimbus volume delete xxx --async")]
    Delete(VolumeDeleteArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct VolumeCreateArgs {
    /// Availability zone
    #[arg(long = "availability-zone")]
    pub availability_zone: String,

    /// Volume name
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Volume description
    #[arg(long)]
    pub description: Option<String>,

    /// Labels as key=value pairs, e.g. --labels key1=value1,key2=value2
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Performance class
    #[arg(long = "performance-class")]
    pub performance_class: Option<String>,

    /// Volume size (GB). Either size or the source flags must be given
    #[arg(long)]
    pub size: Option<i64>,

    /// ID of the source object of the volume
    #[arg(long = "source-id")]
    pub source_id: Option<String>,

    /// Type of the source object of the volume (image, snapshot, backup, volume)
    #[arg(long = "source-type")]
    pub source_type: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VolumeListArgs {
    /// Maximum number of entries to list
    #[arg(long)]
    pub limit: Option<i64>,

    /// Filter by label, e.g. --label-selector env=prod
    #[arg(long = "label-selector")]
    pub label_selector: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VolumeDescribeArgs {
    /// Volume ID
    #[arg(value_name = "VOLUME_ID")]
    pub volume_id: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VolumeUpdateArgs {
    /// Volume ID
    #[arg(value_name = "VOLUME_ID")]
    pub volume_id: String,

    /// New volume name
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// New volume description
    #[arg(long)]
    pub description: Option<String>,

    /// Labels as key=value pairs; replaces the current labels
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VolumeDeleteArgs {
    /// Volume ID
    #[arg(value_name = "VOLUME_ID")]
    pub volume_id: String,
}

// ============ Database ============

#[derive(Args)]
pub struct DatabaseCommand {
    #[command(subcommand)]
    pub action: DatabaseAction,
}

#[derive(Subcommand)]
pub enum DatabaseAction {
    /// Database instances
    Instance(DatabaseInstanceCommand),
}

#[derive(Args)]
pub struct DatabaseInstanceCommand {
    #[command(subcommand)]
    pub action: DatabaseInstanceAction,
}

#[derive(Subcommand)]
pub enum DatabaseInstanceAction {
    /// Creates a database instance
    #[command(after_help = "Examples:
  nimbus database instance create --name db-1 --flavor-id xxx
  nimbus database instance create --name db-1 --cpu 4 --ram 16
  nimbus database instance create --name db-1 --cpu 4 --ram 16 --acl 1.2.3.0/24")]
    Create(DatabaseInstanceCreateArgs),

    /// Lists all database instances of a project
    #[command(after_help = "Examples:
  nimbus database instance list
  nimbus database instance list --limit 10")]
    List(DatabaseInstanceListArgs),

    /// Updates a database instance
    #[command(after_help = "Examples:
  nimbus database instance update xxx --flavor-id yyy
  nimbus database instance update xxx --acl 1.2.3.0/24")]
    Update(DatabaseInstanceUpdateArgs),

    /// Deletes a database instance
    #[command(after_help = "Examples:
  nimbus database instance delete xxx")]
    Delete(DatabaseInstanceDeleteArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseInstanceCreateArgs {
    /// Instance name
    #[arg(short = 'n', long)]
    pub name: String,

    /// Flavor ID. Alternative to cpu and ram
    #[arg(long = "flavor-id")]
    pub flavor_id: Option<String>,

    /// Number of CPUs. Requires ram; alternative to flavor-id
    #[arg(long)]
    pub cpu: Option<i64>,

    /// Amount of RAM (GB). Requires cpu; alternative to flavor-id
    #[arg(long)]
    pub ram: Option<i64>,

    /// Storage class
    #[arg(long = "storage-class")]
    pub storage_class: Option<String>,

    /// Storage size (GB)
    #[arg(long = "storage-size")]
    pub storage_size: Option<i64>,

    /// Database engine version
    #[arg(long)]
    pub version: Option<String>,

    /// IP networks in CIDR notation allowed to access the instance
    #[arg(long, value_delimiter = ',')]
    pub acl: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseInstanceListArgs {
    /// Maximum number of entries to list
    #[arg(long)]
    pub limit: Option<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseInstanceUpdateArgs {
    /// Instance ID
    #[arg(value_name = "INSTANCE_ID")]
    pub instance_id: String,

    /// New flavor ID. Alternative to cpu and ram
    #[arg(long = "flavor-id")]
    pub flavor_id: Option<String>,

    /// Number of CPUs. Requires ram; alternative to flavor-id
    #[arg(long)]
    pub cpu: Option<i64>,

    /// Amount of RAM (GB). Requires cpu; alternative to flavor-id
    #[arg(long)]
    pub ram: Option<i64>,

    /// Database engine version
    #[arg(long)]
    pub version: Option<String>,

    /// IP networks in CIDR notation allowed to access the instance
    #[arg(long, value_delimiter = ',')]
    pub acl: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseInstanceDeleteArgs {
    /// Instance ID
    #[arg(value_name = "INSTANCE_ID")]
    pub instance_id: String,
}

// ============ Intake ============

#[derive(Args)]
pub struct IntakeCommand {
    #[command(subcommand)]
    pub action: IntakeAction,
}

#[derive(Subcommand)]
pub enum IntakeAction {
    /// Intake pipeline users
    User(IntakeUserCommand),
}

#[derive(Args)]
pub struct IntakeUserCommand {
    #[command(subcommand)]
    pub action: IntakeUserAction,
}

#[derive(Subcommand)]
pub enum IntakeUserAction {
    /// Updates an intake user
    #[command(after_help = "Examples:
  nimbus intake user update xxx --intake-id yyy --display-name \"Jamie\"
  nimbus intake user update xxx --intake-id yyy --labels team=data")]
    Update(IntakeUserUpdateArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct IntakeUserUpdateArgs {
    /// User ID
    #[arg(value_name = "USER_ID")]
    pub user_id: String,

    /// ID of the intake the user belongs to
    #[arg(long = "intake-id")]
    pub intake_id: String,

    /// New display name
    #[arg(long = "display-name")]
    pub display_name: Option<String>,

    /// New contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Labels as key=value pairs; replaces the current labels
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,
}

// ============ Beta ============

/// Early-access tree: the same leaves as the stable tree, mounted under a
/// second path. Declared once, registered twice.
#[derive(Args)]
pub struct BetaCommand {
    #[command(subcommand)]
    pub action: BetaAction,
}

#[derive(Subcommand)]
pub enum BetaAction {
    /// Compute volumes (early access)
    Volume(VolumeCommand),
}

// ============ Config ============

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Sets a configuration value
    #[command(after_help = "Examples:
  nimbus config set project_id a6b4c2de-39a2-4d3f-b3a1-6e1e7c3a9f10
  nimbus config set region eu01")]
    Set {
        /// Configuration key
        #[arg(value_name = "KEY")]
        key: String,

        /// Value to store
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Removes a configuration value
    #[command(after_help = "Examples:
  nimbus config unset region")]
    Unset {
        /// Configuration key
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Lists the effective configuration with value sources
    #[command(after_help = "Examples:
  nimbus config list
  nimbus config list --output-format json")]
    List,
}

// ============ Auth ============

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Authenticates with a service account token
    #[command(after_help = "Examples:
  nimbus auth login --service-account-token xxx
  nimbus auth login --service-account-token xxx --service-account-email robot@example.com")]
    Login(AuthLoginArgs),

    /// Removes the stored credentials
    Logout,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AuthLoginArgs {
    /// Long-lived service account token
    #[arg(long = "service-account-token")]
    pub service_account_token: String,

    /// Email of the service account, for display purposes
    #[arg(long = "service-account-email")]
    pub service_account_email: Option<String>,
}
