//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use inv_db::DeviceFilter;
use inv_models::{DevicePatch, DeviceState, NewDevice};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "inventory")]
#[command(about = "Device inventory administration", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List devices with filters, sorting and pagination
    List(ListArgs),
    /// Show one device
    Get { id: Uuid },
    /// Register a new device
    Create(DeviceArgs),
    /// Overwrite every field of a device
    Replace {
        id: Uuid,
        #[command(flatten)]
        device: DeviceArgs,
    },
    /// Change some fields of a device
    Patch {
        id: Uuid,
        #[command(flatten)]
        patch: PatchArgs,
    },
    /// Remove a device
    Delete { id: Uuid },
    /// Create the devices table if it does not exist
    InitSchema,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only devices of this brand (repeatable)
    #[arg(long = "brand")]
    pub brands: Vec<String>,

    /// Only devices in this state (repeatable)
    #[arg(long = "state")]
    pub states: Vec<DeviceState>,

    /// Full-text search on the device name
    #[arg(long)]
    pub keyword: Option<String>,

    /// Sort key, `-` prefix for descending (repeatable)
    #[arg(long = "sort", allow_hyphen_values = true)]
    pub sort: Vec<String>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub size: Option<u32>,

    /// Token from a previous page's nextCursor or previousCursor
    #[arg(long)]
    pub cursor: Option<String>,
}

impl From<ListArgs> for DeviceFilter {
    fn from(args: ListArgs) -> Self {
        DeviceFilter {
            brands: args.brands,
            states: args.states,
            keyword: args.keyword,
            sort: args.sort,
            page: args.page,
            size: args.size,
            cursor: args.cursor,
        }
    }
}

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub brand: String,

    #[arg(long, default_value = "available")]
    pub state: DeviceState,
}

impl From<DeviceArgs> for NewDevice {
    fn from(args: DeviceArgs) -> Self {
        NewDevice::new(args.name, args.brand).with_state(args.state)
    }
}

#[derive(Debug, Args)]
pub struct PatchArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long)]
    pub state: Option<DeviceState>,
}

impl From<PatchArgs> for DevicePatch {
    fn from(args: PatchArgs) -> Self {
        DevicePatch {
            name: args.name,
            brand: args.brand,
            state: args.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_arguments() {
        let cli = Cli::try_parse_from([
            "inventory",
            "list",
            "--brand",
            "Apple",
            "--brand",
            "Samsung",
            "--state",
            "in-use",
            "--sort",
            "-createdAt",
            "--size",
            "5",
        ])
        .unwrap();

        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        let filter = DeviceFilter::from(args);
        assert_eq!(filter.brands, vec!["Apple", "Samsung"]);
        assert_eq!(filter.states, vec![DeviceState::InUse]);
        assert_eq!(filter.sort, vec!["-createdAt"]);
        assert_eq!(filter.size, Some(5));
        assert_eq!(filter.page, None);
    }

    #[test]
    fn test_create_defaults_state() {
        let cli =
            Cli::try_parse_from(["inventory", "create", "--name", "Pixel 8", "--brand", "Google"])
                .unwrap();
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        let dto = NewDevice::from(args);
        assert_eq!(dto.name, "Pixel 8");
        assert_eq!(dto.state, DeviceState::Available);
    }

    #[test]
    fn test_patch_arguments() {
        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["inventory", "patch", id.as_str(), "--state", "inactive"])
            .unwrap();
        let Commands::Patch { patch, .. } = cli.command else {
            panic!("expected patch");
        };
        let patch = DevicePatch::from(patch);
        assert_eq!(patch.state, Some(DeviceState::Inactive));
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["inventory", "get", "not-a-uuid"]).is_err());
        assert!(Cli::try_parse_from(["inventory", "list", "--state", "broken"]).is_err());
    }
}
