use std::path::{Path, PathBuf};

use annotkit_codec::{CodecRegistry, encode_layer, load_into_layer};
use annotkit_core::{DVec2, Tolerance, ViewTransform};
use annotkit_model::{GeometryKind, HitOptions, ItemId, LayerId, Scene, hit_test};
use annotkit_tools::{EditorConfig, Modifiers, ToolController, ToolKind, ToolTarget};
use anyhow::Context;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::CliError;

/// A document loaded into a fresh one-layer scene. `ids[i]` is the item decoded from feature
/// `i`.
pub struct LoadedDocument {
    pub scene: Scene,
    pub layer: LayerId,
    pub ids: Vec<ItemId>,
    pub registry: CodecRegistry,
}

impl LoadedDocument {
    fn item(&self, index: usize) -> Result<ItemId, CliError> {
        self.ids.get(index).copied().ok_or_else(|| {
            CliError::usage(format!(
                "feature index {index} out of range (document has {} features)",
                self.ids.len()
            ))
        })
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.ids.iter().position(|i| *i == id)
    }

    fn encode(&self) -> Result<Value, CliError> {
        let layer = self
            .scene
            .layer(self.layer)
            .ok_or_else(|| CliError::processing("document layer disappeared"))?;
        Ok(encode_layer(layer, &self.registry)?)
    }
}

pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, CliError> {
    match path {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Could not load config {}", path.display()))
            .map_err(CliError::input),
        None => Ok(EditorConfig::default()),
    }
}

pub fn load_document(path: &Path, config: &EditorConfig) -> Result<LoadedDocument, CliError> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read document {}", path.display()))
        .map_err(CliError::input)?;
    let doc: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Could not parse JSON in {}", path.display()))
        .map_err(CliError::input)?;

    let registry = CodecRegistry::default().with_arc_step(config.geometry.arc_step_deg);
    let mut scene = Scene::new();
    let layer = scene.add_layer(path.file_stem().map(|s| s.to_string_lossy().into_owned()));
    let ids = load_into_layer(&mut scene, layer, &doc, &registry)
        .with_context(|| format!("Invalid document {}", path.display()))
        .map_err(CliError::input)?;
    info!(features = ids.len(), path = %path.display(), "loaded document");
    Ok(LoadedDocument {
        scene,
        layer,
        ids,
        registry,
    })
}

pub fn write_json(value: &Value, output: Option<&PathBuf>) -> Result<(), CliError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| CliError::processing(e.to_string()))?;
    match output {
        Some(path) => std::fs::write(path, text + "\n")
            .with_context(|| format!("Could not write {}", path.display()))
            .map_err(|e| CliError::processing(format!("{e:#}"))),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn view(zoom: f64) -> Result<ViewTransform, CliError> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(ViewTransform::with_zoom(zoom))
    } else {
        Err(CliError::usage(format!("zoom must be a positive number, got {zoom}")))
    }
}

/// Re-encode a document in canonical form.
pub fn run_normalize(
    input: &Path,
    output: Option<&PathBuf>,
    config: &EditorConfig,
) -> Result<(), CliError> {
    let doc = load_document(input, config)?;
    write_json(&doc.encode()?, output)
}

pub struct PaintArgs<'a> {
    pub input: &'a Path,
    pub output: Option<&'a PathBuf>,
    pub feature: usize,
    pub points: &'a [DVec2],
    pub radius_px: f64,
    pub zoom: f64,
    pub erase: bool,
}

/// Replay one brush stroke over a region feature through the brush tool.
pub fn run_paint(args: &PaintArgs, config: &EditorConfig) -> Result<(), CliError> {
    let Some((&first, rest)) = args.points.split_first() else {
        return Err(CliError::usage("at least one stroke point is required"));
    };
    let doc = load_document(args.input, config)?;
    let target = doc.item(args.feature)?;
    let kind = doc.scene.item(target).map(|i| i.geometry().kind());
    if kind != Some(GeometryKind::Region) {
        return Err(CliError::processing(format!(
            "feature {} is not a region and cannot be painted",
            args.feature
        )));
    }

    let LoadedDocument {
        scene,
        layer,
        ids,
        registry,
    } = doc;
    let mut controller = ToolController::new(scene, view(args.zoom)?, config.clone());
    controller.brush_mut().set_radius_px(args.radius_px);
    controller.brush_mut().set_erasing(args.erase);
    controller.activate(ToolKind::Brush, Some(ToolTarget::Item(target)));
    let none = Modifiers::default();
    controller.press(first, none);
    for p in rest {
        controller.move_to(*p, none);
    }
    controller.release(rest.last().copied().unwrap_or(first), none);
    controller.deactivate(true);
    debug!(feature = args.feature, erase = args.erase, "stroke applied");

    let doc = LoadedDocument {
        scene: controller.into_scene(),
        layer,
        ids,
        registry,
    };
    write_json(&doc.encode()?, args.output)
}

/// Point hit test; prints the hit feature index and part, or `null`.
pub fn run_hit(
    input: &Path,
    point: DVec2,
    zoom: f64,
    config: &EditorConfig,
) -> Result<(), CliError> {
    let doc = load_document(input, config)?;
    let view = view(zoom)?;
    let options = HitOptions {
        arc_step_deg: config.geometry.arc_step_deg,
        ..HitOptions::new(Tolerance::for_view(config.hit_tolerance_px, &view))
    };
    let result = match hit_test(&doc.scene, point, &options) {
        Some(hit) => json!({
            "feature": doc.index_of(hit.item),
            "kind": format!("{:?}", hit.kind).to_lowercase(),
        }),
        None => Value::Null,
    };
    write_json(&result, None)
}

/// Rubber-band selection between two corners; prints the selected feature indices.
pub fn run_select(
    input: &Path,
    from: DVec2,
    to: DVec2,
    fully_contained: bool,
    config: &EditorConfig,
) -> Result<(), CliError> {
    let mut config = config.clone();
    config.select.fully_contained |= fully_contained;
    let doc = load_document(input, &config)?;
    let mut controller = ToolController::new(doc.scene, ViewTransform::default(), config);
    controller.activate(ToolKind::Select, None);
    let none = Modifiers::default();
    controller.press(from, none);
    controller.move_to(to, none);
    controller.release(to, none);

    let selected: Vec<usize> = controller
        .scene()
        .selected()
        .into_iter()
        .filter_map(|id| doc.ids.iter().position(|i| *i == id))
        .collect();
    write_json(&json!({ "selected": selected }), None)
}
