/// plotview terminal viewer
///
/// Shows an STL model, or a demo cube with coordinate axes, as ASCII art.
/// Controls:
///   - Left drag: trackball rotate, right/middle drag: pan
///   - Wheel, +/-: zoom, z then left drag: zoom to box
///   - Arrows: pan, WASD / E/R: rotate about the target
///   - f: fit, 1/2/3: fit to the XY/XZ/YZ plane
///   - Q/ESC: Quit
use std::fs::File;
use std::path::PathBuf;

use nalgebra::Point3;
use plotview_core::{Color, Mesh, Plot, PointSet, Scene, SceneObject};
use plotview_terminal::stl::load_stl;
use plotview_terminal::{AppError, TerminalApp, TerminalConfig};

struct Args {
    config: Option<PathBuf>,
    model: Option<PathBuf>,
}

fn parse_args() -> Result<Args, AppError> {
    let mut args = Args {
        config: None,
        model: None,
    };
    let mut rest = std::env::args().skip(1);

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" | "-c" => match rest.next() {
                Some(path) => args.config = Some(PathBuf::from(path)),
                None => return Err(AppError::Usage("--config needs a file".to_string())),
            },
            flag if flag.starts_with('-') => {
                return Err(AppError::Usage(format!("unknown option {flag}")));
            }
            _ if args.model.is_some() => {
                return Err(AppError::Usage("only one model can be shown".to_string()));
            }
            _ => args.model = Some(PathBuf::from(arg)),
        }
    }

    Ok(args)
}

fn init_logging(config: &TerminalConfig) -> Result<(), AppError> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log.level.as_str()),
    );

    if let Some(path) = &config.log.file {
        let file = File::create(path).map_err(|source| AppError::LogFile {
            path: path.clone(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Cube with coordinate axes and a marker above it
fn demo_scene() -> Scene {
    [
        SceneObject::new(Mesh::cube(2.0)).with_color(Color::GREY, 0),
        SceneObject::new(Plot::axes(2.0)).with_color(Color::YELLOW, 1),
        SceneObject::new(PointSet::new(vec![Point3::new(0.0, 0.0, 2.5)]))
            .with_color(Color::RED, 0),
    ]
    .into_iter()
    .collect()
}

fn run() -> Result<(), AppError> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => TerminalConfig::load(path)?,
        None => TerminalConfig::default(),
    };
    init_logging(&config)?;

    let scene = match &args.model {
        Some(path) => {
            let mesh = load_stl(path)?;
            log::info!("showing {} ({} triangles)", path.display(), mesh.triangles.len());
            [SceneObject::new(mesh)].into_iter().collect()
        }
        None => demo_scene(),
    };

    let mut app = TerminalApp::new(scene, config)?;
    app.run()?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("plotview-terminal: {e}");
        std::process::exit(1);
    }
}
