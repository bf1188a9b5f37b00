//! Command-line driver for pose scoring.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use posecoach::catalog::ReferenceCatalog;
use posecoach::densepose::DensePoseClient;
use posecoach::history::SessionHistory;
use posecoach::scorer::config::{default_config, load_config};
use posecoach::scorer::PoseScorer;
use posecoach::settings::{default_settings_path, Settings};

const USAGE: &str = "Usage:
  posecoach health
  posecoach import <pose-dir>
  posecoach capture <image> <name> <category>
  posecoach list [category]
  posecoach search <query>
  posecoach compare <image> <reference-name>
  posecoach history [reference-name]";

#[tokio::main]
async fn main() -> Result<()> {
    posecoach::init_logging();

    let settings = Settings::load(&default_settings_path())?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("health") => health(&settings).await,
        Some("import") => {
            let dir = args.get(1).ok_or_else(|| anyhow!(USAGE))?;
            import(&settings, Path::new(dir))
        }
        Some("capture") => {
            let [image, name, category] = &args[1..] else {
                bail!(USAGE);
            };
            capture(&settings, Path::new(image), name, category).await
        }
        Some("list") => list(&settings, args.get(1).map(String::as_str)),
        Some("search") => {
            let query = args.get(1).ok_or_else(|| anyhow!(USAGE))?;
            search(&settings, query)
        }
        Some("compare") => {
            let [image, reference] = &args[1..] else {
                bail!(USAGE);
            };
            compare(&settings, Path::new(image), reference).await
        }
        Some("history") => history(&settings, args.get(1).map(String::as_str)),
        _ => bail!(USAGE),
    }
}

async fn health(settings: &Settings) -> Result<()> {
    let client = DensePoseClient::new(&settings.service_url)?;
    if client.health().await? {
        println!("Pose service at {} is up", settings.service_url);
        Ok(())
    } else {
        bail!("Pose service at {} is not healthy", settings.service_url)
    }
}

fn import(settings: &Settings, dir: &Path) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let imported = catalog.import_dir(dir)?;
    println!("Imported {} reference pose(s)", imported);
    Ok(())
}

async fn capture(settings: &Settings, image: &Path, name: &str, category: &str) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let client = DensePoseClient::new(&settings.service_url)?;
    let snapshot = client.detect_pose(&bytes).await?;
    info!("Captured {} landmarks for '{}'", snapshot.landmarks.len(), name);

    let settings = settings.clone();
    let name = name.to_string();
    let category = category.to_string();
    let source = image.display().to_string();
    let stored_name = name.clone();
    let stored_category = category.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let catalog = open_catalog(&settings)?;
        catalog.add(&name, &category, None, &snapshot, &source)?;
        Ok(())
    })
    .await??;
    println!("Stored reference pose '{}' ({})", stored_name, stored_category);
    Ok(())
}

fn list(settings: &Settings, category: Option<&str>) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let poses = catalog.list(category)?;
    if poses.is_empty() {
        println!("No reference poses stored");
        return Ok(());
    }
    for pose in poses {
        println!(
            "{:<40} {:<24} {} landmarks",
            pose.name,
            pose.category,
            pose.snapshot.landmarks.len()
        );
    }
    Ok(())
}

fn search(settings: &Settings, query: &str) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let matches = catalog.search(query, 10)?;
    if matches.is_empty() {
        println!("No matches for '{}'", query);
        return Ok(());
    }
    for m in matches {
        println!("{:<40} {:<24} (score {:.1})", m.pose.name, m.pose.category, m.score);
    }
    Ok(())
}

async fn compare(settings: &Settings, image: &Path, reference_name: &str) -> Result<()> {
    // rusqlite is blocking, so the store work runs off the async runtime.
    let reference = {
        let settings = settings.clone();
        let name = reference_name.to_string();
        tokio::task::spawn_blocking(move || -> Result<_> {
            let catalog = open_catalog(&settings)?;
            Ok(catalog.get_by_name(&name)?)
        })
        .await??
        .ok_or_else(|| anyhow!("No reference pose named '{}'", reference_name))?
    };

    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let client = DensePoseClient::new(&settings.service_url)?;
    let user = client.detect_pose(&bytes).await?;

    let config = match &settings.scoring_config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };
    let scorer = PoseScorer::new(config);
    let result = scorer.compare_in_category(&user, &reference.snapshot, Some(&reference.category))?;

    {
        let db_path = settings.history_db_path();
        let name = reference_name.to_string();
        let category = reference.category.clone();
        let result = result.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let history = SessionHistory::new(&db_path)?;
            history.record(&name, Some(&category), &result)?;
            Ok(())
        })
        .await??;
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn history(settings: &Settings, reference_name: Option<&str>) -> Result<()> {
    let history = SessionHistory::new(&settings.history_db_path())?;
    let sessions = history.list(reference_name)?;
    if sessions.is_empty() {
        println!("No recorded sessions");
        return Ok(());
    }
    for s in sessions {
        println!(
            "#{:<5} {:<40} {:<24} total {:.1}",
            s.id, s.reference_name, s.created_at, s.total_score
        );
    }
    Ok(())
}

fn open_catalog(settings: &Settings) -> Result<ReferenceCatalog> {
    let path: PathBuf = settings.catalog_db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data dir {}", parent.display()))?;
    }
    Ok(ReferenceCatalog::new(&path)?)
}
