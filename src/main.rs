//! Binary entry point for the `ecs-volumes` CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ecs_volumes::{
    Category, DiskOrchestrator, GatewayConfig, HttpDiskApi, PerformanceLevel, ResizeDiskRequest,
    ResizeKind, VolumeError, VolumeRequest,
};

mod cli;

use cli::{Cli, CreateCommand, ListSnapshotsCommand, ResizeCommand};

const DEFAULT_LOG_FILTER: &str = "ecs_volumes=info";

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error("invalid argument: {0}")]
    Argument(String),
    #[error(transparent)]
    Volume(#[from] VolumeError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling");
            on_interrupt.cancel();
        }
    });

    let exit_code = match dispatch(cli, &cancel).await {
        Ok(rendered) => {
            writeln!(io::stdout(), "{rendered}").ok();
            0
        }
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
}

async fn dispatch(cli: Cli, cancel: &CancellationToken) -> Result<String, CliError> {
    let config =
        GatewayConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let api = HttpDiskApi::new(&config).map_err(|err| CliError::Gateway(err.to_string()))?;
    let mut orchestrator = DiskOrchestrator::new(api);
    if let Some(cluster_id) = config.cluster_id.as_deref() {
        orchestrator = orchestrator.with_cluster_id(cluster_id);
    }

    match cli {
        Cli::Create(command) => {
            let request = volume_request(command, &config)?;
            let supported = config
                .supported_categories()
                .map_err(|err| CliError::Config(err.to_string()))?;
            let created = orchestrator
                .create_volume(&request, &supported, cancel)
                .await?;
            Ok(serde_json::to_string(&created)?)
        }
        Cli::Delete(command) => {
            orchestrator
                .delete_volume(&command.disk_id, cancel)
                .await?;
            Ok(json!({ "disk_id": command.disk_id, "deleted": true }).to_string())
        }
        Cli::Resize(command) => {
            let request = resize_request(command);
            orchestrator.resize_volume(&request, cancel).await?;
            Ok(json!({
                "disk_id": request.disk_id,
                "new_size_gb": request.new_size_gb,
                "kind": request.kind,
            })
            .to_string())
        }
        Cli::ListSnapshots(ListSnapshotsCommand {
            disk_id,
            page_token,
            max_entries,
        }) => {
            let listing = orchestrator
                .list_snapshot_page(&disk_id, &page_token, max_entries, cancel)
                .await?;
            Ok(serde_json::to_string(&listing)?)
        }
    }
}

fn volume_request(command: CreateCommand, config: &GatewayConfig) -> Result<VolumeRequest, CliError> {
    let categories = command
        .categories
        .iter()
        .map(|raw| raw.parse::<Category>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CliError::Argument(err.to_string()))?;
    let levels = command
        .performance_levels
        .iter()
        .map(|raw| raw.parse::<PerformanceLevel>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CliError::Argument(err.to_string()))?;

    let zone_id = command
        .zone_id
        .or_else(|| config.zone_id.clone())
        .ok_or_else(|| {
            CliError::Argument(String::from(
                "no zone: pass --zone-id or set ECSV_ZONE_ID",
            ))
        })?;

    let mut builder = VolumeRequest::builder()
        .name(command.name)
        .size_gb(command.size_gb)
        .categories(categories)
        .performance_levels(levels)
        .zone_id(zone_id)
        .instance_id(command.instance_id.or_else(|| config.instance_id.clone()))
        .virtual_node(config.virtual_node)
        .multi_attach(command.multi_attach)
        .snapshot_id(command.snapshot_id)
        .resource_group_id(command.resource_group_id);
    for raw in &command.tags {
        let (key, value) = parse_tag(raw)?;
        builder = builder.tag(key, value);
    }
    builder
        .build()
        .map_err(|err| CliError::Argument(err.to_string()))
}

fn parse_tag(raw: &str) -> Result<(&str, &str), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(CliError::Argument(format!(
            "tag '{raw}' must have the form KEY=VALUE"
        ))),
    }
}

fn resize_request(command: ResizeCommand) -> ResizeDiskRequest {
    ResizeDiskRequest {
        disk_id: command.disk_id,
        new_size_gb: command.size_gb,
        kind: if command.offline {
            ResizeKind::Offline
        } else {
            ResizeKind::Online
        },
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> GatewayConfig {
        GatewayConfig {
            endpoint: String::from("http://127.0.0.1:7080"),
            region_id: String::from("cn-hangzhou"),
            zone_id: Some(String::from("cn-hangzhou-i")),
            instance_id: Some(String::from("i-node")),
            cluster_id: None,
            supported_categories: None,
            virtual_node: false,
            request_timeout_secs: 30,
        }
    }

    fn create_command() -> CreateCommand {
        CreateCommand {
            name: String::from("pv-1"),
            size_gb: 20,
            categories: vec![String::from("cloud_essd"), String::from("cloud_ssd")],
            performance_levels: vec![String::from("PL1")],
            zone_id: None,
            instance_id: None,
            multi_attach: false,
            tags: vec![String::from("team=storage")],
            snapshot_id: None,
            resource_group_id: None,
        }
    }

    #[rstest]
    fn create_arguments_fall_back_to_config(config: GatewayConfig) {
        let request = volume_request(create_command(), &config).expect("request should build");
        assert_eq!(request.zone_id, "cn-hangzhou-i");
        assert_eq!(request.instance_id.as_deref(), Some("i-node"));
        assert_eq!(request.categories, vec![Category::Essd, Category::Ssd]);
        assert_eq!(request.performance_levels, vec![PerformanceLevel::Pl1]);
        assert_eq!(request.tags.get("team").map(String::as_str), Some("storage"));
    }

    #[rstest]
    fn unknown_category_is_an_argument_error(config: GatewayConfig) {
        let command = CreateCommand {
            categories: vec![String::from("cloud_turbo")],
            ..create_command()
        };
        let err = volume_request(command, &config).expect_err("category should be rejected");
        assert!(matches!(err, CliError::Argument(_)), "{err}");
    }

    #[rstest]
    fn missing_zone_is_reported(config: GatewayConfig) {
        let cfg = GatewayConfig {
            zone_id: None,
            ..config
        };
        let err = volume_request(create_command(), &cfg).expect_err("zone should be required");
        assert!(err.to_string().contains("ECSV_ZONE_ID"), "{err}");
    }

    #[rstest]
    #[case("k=v", Some(("k", "v")))]
    #[case(" k = v=w ", Some(("k", "v=w")))]
    #[case("k=", Some(("k", "")))]
    #[case("=v", None)]
    #[case("novalue", None)]
    fn parses_tags(#[case] raw: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(parse_tag(raw).ok(), expected);
    }

    #[rstest]
    #[case(false, ResizeKind::Online)]
    #[case(true, ResizeKind::Offline)]
    fn resize_kind_follows_flag(#[case] offline: bool, #[case] expected: ResizeKind) {
        let request = resize_request(ResizeCommand {
            disk_id: String::from("d-1"),
            size_gb: 40,
            offline,
        });
        assert_eq!(request.kind, expected);
        assert_eq!(request.new_size_gb, 40);
    }

    #[rstest]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        write_error(&mut buf, &CliError::Volume(VolumeError::Cancelled));
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(rendered.contains("operation cancelled"), "rendered: {rendered}");
    }
}
