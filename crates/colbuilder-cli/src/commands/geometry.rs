use crate::cli::GeometryArgs;
use crate::config::build_geometry_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use colbuilder::engine::progress::ProgressReporter;
use colbuilder::workflows;
use tracing::{info, warn};

pub async fn run(args: GeometryArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_geometry_config(&args)?;
    let config = app_config.core_config;

    std::fs::create_dir_all(&config.output_dir)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building copy system from {}...", config.pdb_path.display());
    info!("Invoking the core geometry workflow...");

    let result = tokio::task::block_in_place(|| workflows::geometry::run(&config, &reporter))?;

    if result.skipped_markers > 0 {
        warn!(
            skipped = result.skipped_markers,
            "Marker records were skipped while reading the crystal unit."
        );
        println!(
            "Warning: {} cross-link marker record(s) could not be read and were skipped.",
            result.skipped_markers
        );
    }

    println!(
        "✓ {} copies, {} connected, {} component(s).",
        result.system.len(),
        result.system.connected_count(),
        result.components.len()
    );
    println!(
        "  Symmetrized contacts written to: {}",
        result.outputs.contacts_path.display()
    );
    println!(
        "  Connect file written to: {}",
        result.outputs.connect_path.display()
    );

    Ok(())
}
