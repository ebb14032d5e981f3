use std::env;
use std::fs;
use std::path::PathBuf;

use controls::{ControlPosition, LevelControlOptions, LevelSwitchControl};
use foundation::level::LevelId;
use layers::{
    DEFAULT_LEVEL_PROPERTY, FeatureData, IndoorLayerSet, IndoorOptions, MapView, Marker,
    SharedMap,
};
use runtime::link::LevelLink;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "levels" => cmd_levels(args),
        "switch" => cmd_switch(args),
        _ => Err(usage()),
    }
}

#[derive(Debug)]
struct CommonArgs {
    input: PathBuf,
    property: String,
    position: ControlPosition,
    rest: Vec<String>,
}

fn parse_common(args: Vec<String>) -> Result<CommonArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut property = DEFAULT_LEVEL_PROPERTY.to_string();
    let mut position = ControlPosition::default();
    let mut rest = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--property" => {
                i += 1;
                property = args
                    .get(i)
                    .cloned()
                    .ok_or_else(|| "--property requires a value".to_string())?;
            }
            "--position" => {
                i += 1;
                position = args
                    .get(i)
                    .ok_or_else(|| "--position requires a value".to_string())?
                    .parse()?;
            }
            s if s.starts_with("--") => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
            _ if input.is_none() => input = Some(PathBuf::from(&args[i])),
            _ => rest.push(args[i].clone()),
        }
        i += 1;
    }

    Ok(CommonArgs {
        input: input.ok_or_else(usage)?,
        property,
        position,
        rest,
    })
}

fn load(args: &CommonArgs) -> Result<IndoorLayerSet, String> {
    let raw = fs::read_to_string(&args.input).map_err(|e| format!("read {:?}: {e}", args.input))?;
    let data: FeatureData =
        serde_json::from_str(&raw).map_err(|e| format!("parse {:?}: {e}", args.input))?;

    // Markers label rooms that carry a `name`, on the room's own floor.
    let options = IndoorOptions::default()
        .with_level_property(args.property.clone())
        .with_marker_for_feature(|feature| {
            let name = feature.property("name")?.as_str()?;
            let at = feature.geometry.as_ref()?.first_position()?;
            Some(Marker::new(at).with_label(name))
        });
    let set = IndoorLayerSet::new(data, options);
    info!(levels = set.levels().len(), "loaded indoor data");
    Ok(set)
}

#[derive(Debug, Serialize)]
struct LevelSummary {
    level: LevelId,
    features: usize,
    markers: usize,
}

fn cmd_levels(args: Vec<String>) -> Result<(), String> {
    // indoor levels <features.json> [--property NAME]
    let args = parse_common(args)?;
    if !args.rest.is_empty() {
        return Err(usage());
    }
    let set = load(&args)?;

    for level in set.levels() {
        let Some(layer) = set.layer(&level) else {
            continue;
        };
        let summary = LevelSummary {
            features: layer.len(),
            markers: layer.markers().len(),
            level,
        };
        println!(
            "{}",
            serde_json::to_string(&summary).map_err(|e| format!("json: {e}"))?
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SwitchStep<'a> {
    requested: &'a str,
    level: Option<&'a LevelId>,
    map_levels: Vec<LevelId>,
    highlighted: Vec<&'a str>,
}

fn cmd_switch(args: Vec<String>) -> Result<(), String> {
    // indoor switch <features.json> <level>... [--property NAME] [--position P]
    let args = parse_common(args)?;
    for line in switch_steps(&args)? {
        println!("{line}");
    }
    Ok(())
}

fn switch_steps(args: &CommonArgs) -> Result<Vec<String>, String> {
    if args.rest.is_empty() {
        return Err("switch requires at least one level".to_string());
    }
    let mut set = load(args)?;
    let mut control = LevelSwitchControl::new(
        LevelControlOptions::from_level_ids(&set.levels()).with_position(args.position),
    )
    .map_err(|e| e.to_string())?;
    let link = LevelLink::connect(&mut set, &mut control);

    let view = MapView::shared();
    let map: SharedMap = view.clone();
    set.attach(map).map_err(|e| e.to_string())?;
    control.render().map_err(|e| e.to_string())?;
    link.pump(&mut set, &mut control)
        .map_err(|e| e.to_string())?;

    let mut lines = Vec::with_capacity(args.rest.len());
    for requested in &args.rest {
        let index = control
            .button_index(requested.as_str())
            .map_err(|e| e.to_string())?;
        control.click(index).map_err(|e| e.to_string())?;
        let hops = link
            .pump(&mut set, &mut control)
            .map_err(|e| e.to_string())?;
        debug!(requested, index, hops, "clicked level button");

        let step = SwitchStep {
            requested,
            level: set.level(),
            map_levels: view.borrow().levels(),
            highlighted: control
                .panel()
                .map(|p| p.highlighted().iter().map(|b| b.label.as_str()).collect())
                .unwrap_or_default(),
        };
        lines.push(serde_json::to_string(&step).map_err(|e| format!("json: {e}"))?);
    }

    link.disconnect(&mut set, &mut control);
    set.detach().map_err(|e| e.to_string())?;
    Ok(lines)
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "indoor".to_string());
    format!(
        "Usage:\n  {exe} levels <features.json> [--property NAME]\n  {exe} switch <features.json> <level> [level ...] [--property NAME] [--position topleft|topright|bottomleft|bottomright]\n\nNotes:\n- Input is a JSON feature list or feature collection already shaped like GeoJSON.\n- `--property` names the feature property holding the level (default `level`).\n- Set RUST_LOG=debug for level switching traces on stderr.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::{load, parse_common, switch_steps};
    use controls::ControlPosition;
    use foundation::level::LevelId;

    fn sample_args(extra: &[&str]) -> Vec<String> {
        let sample = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets/sample_building.json");
        let mut args = vec![sample.to_string_lossy().into_owned()];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }

    #[test]
    fn parses_flags_and_positionals() {
        let args = parse_common(sample_args(&["1", "--position", "topleft", "0"])).unwrap();
        assert_eq!(args.position, ControlPosition::TopLeft);
        assert_eq!(args.property, "level");
        assert_eq!(args.rest, vec!["1".to_string(), "0".to_string()]);
        assert!(parse_common(sample_args(&["--bogus"])).is_err());
        assert!(parse_common(sample_args(&["--property"])).is_err());
    }

    #[test]
    fn loads_sample_building() {
        let set = load(&parse_common(sample_args(&[])).unwrap()).unwrap();
        assert_eq!(
            set.levels(),
            vec![LevelId::from("-1"), LevelId::from("0"), LevelId::from("1")]
        );
        let ground = set.layer(&LevelId::from("0")).unwrap();
        assert_eq!(ground.len(), 2);
        // Lobby and Stairs are named.
        assert_eq!(ground.markers().len(), 2);
    }

    #[test]
    fn switch_clicks_through_the_control() {
        let args = parse_common(sample_args(&["1", "-1", "01"])).unwrap();
        let lines = switch_steps(&args).unwrap();
        assert_eq!(lines.len(), 3);

        let last: serde_json::Value = serde_json::from_str(&lines[2]).unwrap();
        assert_eq!(last["level"], "1");
        assert_eq!(last["map_levels"], serde_json::json!(["1"]));
        assert_eq!(last["highlighted"], serde_json::json!(["1"]));

        let bad = parse_common(sample_args(&["9"])).unwrap();
        assert!(switch_steps(&bad).is_err());
    }
}
