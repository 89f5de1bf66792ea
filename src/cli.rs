//! Command-line entry point
//!
//! Reads an object list and scene description, runs the layout engine and
//! writes `placed_objects.json`, `render_layout.json` and `manifest.json`.
//! With a model provider, constraints and placement order are asked of the
//! model unless they are supplied.

use crate::assets::{prepare_descriptors, AssetCatalog};
use crate::error::LayoutError;
use crate::config::LayoutConfig;
use crate::export::{output_records, render_records, write_json, LayoutManifest};
use crate::layout::LayoutEngine;
use crate::oracle::create_oracle;
use crate::oracle::factory::create_planner;
use crate::types::ObjectDescriptor;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PLACED_OBJECTS_FILE: &str = "placed_objects.json";
pub const RENDER_LAYOUT_FILE: &str = "render_layout.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Parser)]
#[command(name = "scene-layout")]
#[command(about = "Place 3D assets in a scene one at a time and resolve collisions")]
#[command(version)]
pub struct Args {
    /// Free-text description of the scene
    #[arg(short, long)]
    pub scene: String,

    /// JSON array of asset ids
    #[arg(short, long)]
    pub objects: PathBuf,

    /// Text file with placement constraints (generated by the model if omitted)
    #[arg(short = 'k', long)]
    pub constraints: Option<PathBuf>,

    /// Place objects in the order of the object list instead of asking the model
    #[arg(long)]
    pub keep_order: bool,

    /// Path to a scene-layout.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Asset catalog (overrides paths.assets)
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Skip the collision refinement pass
    #[arg(long)]
    pub no_refinement: bool,

    /// Model name (overrides model.model_name)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output directory (overrides paths.output_dir)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl Args {
    fn apply_to(&self, config: &mut LayoutConfig) {
        if self.no_refinement {
            config.layout.skip_refinement = true;
        }
        if let Some(model) = &self.model {
            config.model.model_name = Some(model.clone());
        }
        if let Some(assets) = &self.assets {
            config.paths.assets = assets.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.paths.output_dir = dir.clone();
        }
    }
}

pub async fn run(args: Args) -> Result<()> {
    let mut config = LayoutConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    let catalog = AssetCatalog::from_file(&config.paths.assets)?;
    info!("Loaded {} assets", catalog.len());

    if catalog.is_empty() {
        return Err(LayoutError::Asset(format!(
            "asset catalog {} is empty",
            config.paths.assets.display()
        ))
        .into());
    }

    let asset_ids = read_object_list(&args.objects).await?;
    let mut prepared = prepare_descriptors(&catalog, &asset_ids)?;
    let names: Vec<String> = prepared.iter().map(|p| p.descriptor.name.clone()).collect();
    let planner = create_planner(&config.model)?;

    let constraints = match (&args.constraints, &planner) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read constraints: {}", path.display()))?,
        (None, Some(planner)) => planner
            .constraints
            .generate(&args.scene, &names)
            .await
            .map_err(|cause| LayoutError::Planning {
                step: "constraints",
                cause,
            })?,
        (None, None) => {
            info!("No constraints given and provider cannot generate them");
            String::new()
        }
    };

    match &planner {
        Some(planner) if !args.keep_order => {
            prepared = planner.order.arrange(&constraints, prepared).await?;
        }
        _ => info!("Placing objects in list order"),
    }

    let descriptors: Vec<ObjectDescriptor> =
        prepared.iter().map(|p| p.descriptor.clone()).collect();

    let oracle = create_oracle(&config.model)?;
    let engine = LayoutEngine::new(oracle, config.layout.clone());
    let outcome = engine.run(&descriptors, &args.scene, &constraints).await?;

    let out = &config.paths.output_dir;
    write_json(&out.join(PLACED_OBJECTS_FILE), &output_records(&outcome.placed))?;
    write_json(
        &out.join(RENDER_LAYOUT_FILE),
        &render_records(&outcome.placed, &prepared, &catalog)?,
    )?;
    write_json(
        &out.join(MANIFEST_FILE),
        &LayoutManifest::new(&args.scene, &outcome),
    )?;

    info!("Wrote {} placements to {}", outcome.placed.len(), out.display());
    Ok(())
}

async fn read_object_list(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read object list: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Object list must be a JSON array of asset ids: {}", path.display()))
}
