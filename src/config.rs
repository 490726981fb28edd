use crate::ir::Direction;
use crate::layout::Size;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const NEGATIVE_TOKENS: [&str; 2] = ["false", "no"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeights {
    pub main_path: f32,
    pub negative_branch: f32,
    pub self_loop: f32,
    /// Case-insensitive substrings that mark an edge label as a negative branch.
    pub negative_tokens: Vec<String>,
}

impl Default for EdgeWeights {
    fn default() -> Self {
        Self {
            main_path: 5.0,
            negative_branch: 1.0,
            self_loop: 1.0,
            negative_tokens: NEGATIVE_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingConfig {
    pub layout_default: Size,
    pub layout_decision: Size,
    pub layout_terminal: Size,
    pub visual_default: Size,
    pub visual_decision: Size,
    pub visual_terminal: Size,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            layout_default: Size::new(300.0, 80.0),
            layout_decision: Size::new(300.0, 160.0),
            layout_terminal: Size::new(300.0, 80.0),
            visual_default: Size::new(240.0, 80.0),
            visual_decision: Size::new(280.0, 200.0),
            visual_terminal: Size::new(140.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub edge_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub terminal_spacing: f32,
    pub order_passes: usize,
    pub balance_passes: usize,
    pub weights: EdgeWeights,
    pub sizing: SizingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 140.0,
            rank_spacing: 120.0,
            edge_spacing: 50.0,
            margin_x: 50.0,
            margin_y: 50.0,
            terminal_spacing: 120.0,
            order_passes: 4,
            balance_passes: 4,
            weights: EdgeWeights::default(),
            sizing: SizingConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub direction: Direction,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::flow_builder(),
            layout: LayoutConfig::default(),
            direction: Direction::TopBottom,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    direction: Option<String>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    edge_spacing: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
    terminal_spacing: Option<f32>,
    order_passes: Option<usize>,
    balance_passes: Option<usize>,
    weights: Option<WeightsFile>,
    sizes: Option<SizesFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeightsFile {
    main_path: Option<f32>,
    negative_branch: Option<f32>,
    self_loop: Option<f32>,
    negative_tokens: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SizesFile {
    layout: Option<KindSizesFile>,
    visual: Option<KindSizesFile>,
}

#[derive(Debug, Default, Deserialize)]
struct KindSizesFile {
    default: Option<Size>,
    decision: Option<Size>,
    terminal: Option<Size>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document over the defaults. Strict JSON is tried first,
/// then JSON5 so hand-written files may carry comments and trailing commas.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|err| anyhow::anyhow!("invalid config: {json_err}; as JSON5: {err}"))?,
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = match theme_name {
            "monochrome" | "mono" => Theme::monochrome(),
            "default" | "flow-builder" => Theme::flow_builder(),
            other => anyhow::bail!("unknown theme `{other}`"),
        };
    }
    if let Some(token) = parsed.direction.as_deref() {
        config.direction = Direction::from_token(token)
            .ok_or_else(|| anyhow::anyhow!("unknown direction `{token}` (expected TB or LR)"))?;
    }

    let layout = &mut config.layout;
    if let Some(v) = parsed.node_spacing {
        layout.node_spacing = v;
    }
    if let Some(v) = parsed.rank_spacing {
        layout.rank_spacing = v;
    }
    if let Some(v) = parsed.edge_spacing {
        layout.edge_spacing = v;
    }
    if let Some(v) = parsed.margin_x {
        layout.margin_x = v;
    }
    if let Some(v) = parsed.margin_y {
        layout.margin_y = v;
    }
    if let Some(v) = parsed.terminal_spacing {
        layout.terminal_spacing = v;
    }
    if let Some(v) = parsed.order_passes {
        layout.order_passes = v;
    }
    if let Some(v) = parsed.balance_passes {
        layout.balance_passes = v;
    }

    if let Some(weights) = parsed.weights {
        if let Some(v) = weights.main_path {
            layout.weights.main_path = v;
        }
        if let Some(v) = weights.negative_branch {
            layout.weights.negative_branch = v;
        }
        if let Some(v) = weights.self_loop {
            layout.weights.self_loop = v;
        }
        if let Some(v) = weights.negative_tokens {
            layout.weights.negative_tokens = v;
        }
    }

    if let Some(sizes) = parsed.sizes {
        if let Some(boxes) = sizes.layout {
            apply_sizes(
                boxes,
                &mut layout.sizing.layout_default,
                &mut layout.sizing.layout_decision,
                &mut layout.sizing.layout_terminal,
            );
        }
        if let Some(boxes) = sizes.visual {
            apply_sizes(
                boxes,
                &mut layout.sizing.visual_default,
                &mut layout.sizing.visual_decision,
                &mut layout.sizing.visual_terminal,
            );
        }
    }

    Ok(config)
}

fn apply_sizes(
    boxes: KindSizesFile,
    default: &mut Size,
    decision: &mut Size,
    terminal: &mut Size,
) {
    if let Some(v) = boxes.default {
        *default = v;
    }
    if let Some(v) = boxes.decision {
        *decision = v;
    }
    if let Some(v) = boxes.terminal {
        *terminal = v;
    }
}
